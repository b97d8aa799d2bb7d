//! ArcGIS geocoding client.
//!
//! Resolves a free-text address to a coordinate via the
//! `findAddressCandidates` operation, biased to the configured province.

use std::error::Error as StdError;
use std::time::Duration;

use common::config::{GeocoderConfig, RegionConfig};
use common::{truncate_body, Coordinate, Error, GeocodeResult};
use serde::Deserialize;
use tracing::{debug, warn};

/// Geocoding client with connection pooling.
#[derive(Debug, Clone)]
pub struct GeocoderClient {
    client: reqwest::Client,
    url: String,
    max_candidates: u32,
    region_name: String,
    country_code: String,
}

// ── ArcGIS response types ─────────────────────────────────────────────

/// Response from `findAddressCandidates`.
#[derive(Debug, Deserialize)]
pub struct CandidatesResponse {
    #[serde(default)]
    pub candidates: Option<Vec<AddressCandidate>>,
    /// ArcGIS reports some failures as HTTP 200 with an `error` body.
    #[serde(default)]
    pub error: Option<ServiceError>,
}

#[derive(Debug, Deserialize)]
pub struct AddressCandidate {
    #[serde(default)]
    pub address: String,
    pub location: CandidateLocation,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Deserialize)]
pub struct CandidateLocation {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Deserialize)]
pub struct ServiceError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
}

fn format_reqwest_error(err: &reqwest::Error) -> String {
    // Keep chained causes so DNS/TLS/socket failures are visible.
    let mut message = err.to_string();
    let mut source = err.source();

    while let Some(cause) = source {
        let cause_msg = cause.to_string();
        if !cause_msg.is_empty() && !message.contains(&cause_msg) {
            message.push_str(": ");
            message.push_str(&cause_msg);
        }
        source = cause.source();
    }

    message
}

/// Pick the highest-ranked candidate. No disambiguation is attempted.
pub fn select_first_candidate(
    response: CandidatesResponse,
    address: &str,
) -> Result<GeocodeResult, Error> {
    if let Some(err) = response.error {
        return Err(Error::GeocodingService(format!(
            "service error (code={}): {}",
            err.code.map(|c| c.to_string()).unwrap_or_else(|| "?".into()),
            err.message
        )));
    }

    let candidate = response
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| Error::AddressNotFound(address.to_string()))?;

    let location = Coordinate::checked(candidate.location.y, candidate.location.x).ok_or_else(|| {
        Error::GeocodingService(format!(
            "candidate for {:?} has out-of-range location ({}, {})",
            address, candidate.location.y, candidate.location.x
        ))
    })?;

    Ok(GeocodeResult {
        location,
        match_score: candidate.score,
        normalized_address: candidate.address,
    })
}

// ── Implementation ────────────────────────────────────────────────────

impl GeocoderClient {
    pub fn new(
        config: &GeocoderConfig,
        region: &RegionConfig,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent("wildfire-watch/0.1")
            .pool_max_idle_per_host(4)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build geocoder HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            max_candidates: config.max_candidates,
            region_name: region.name.clone(),
            country_code: region.country_code.clone(),
        })
    }

    /// The query string sent upstream: the address with the region appended.
    pub fn biased_query(&self, address: &str) -> String {
        let address = address.trim();
        if self.region_name.is_empty() {
            address.to_string()
        } else {
            format!("{}, {}", address, self.region_name)
        }
    }

    /// Resolve an address to its best-matching coordinate.
    ///
    /// Zero candidates is `AddressNotFound`; transport failures, non-2xx
    /// statuses and unreadable bodies are `GeocodingService`.
    pub async fn geocode(&self, address: &str) -> Result<GeocodeResult, Error> {
        let single_line = self.biased_query(address);
        let query = [
            ("SingleLine", single_line.clone()),
            ("f", "json".to_string()),
            ("outSR", "4326".to_string()),
            ("maxLocations", self.max_candidates.to_string()),
            ("countryCode", self.country_code.clone()),
        ];

        debug!("Geocoding {:?} via {}", single_line, self.url);

        let resp = self
            .client
            .get(&self.url)
            .query(&query)
            .send()
            .await
            .map_err(|e| Error::GeocodingService(format_reqwest_error(&e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!("Geocoder returned {} for {:?}", status.as_u16(), single_line);
            return Err(Error::GeocodingService(format!(
                "geocoder returned {}: {}",
                status.as_u16(),
                truncate_body(&body, 500)
            )));
        }

        let payload: CandidatesResponse = resp
            .json()
            .await
            .map_err(|e| Error::GeocodingService(format!("JSON parse error: {}", e)))?;

        let result = select_first_candidate(payload, address.trim())?;
        debug!(
            "Geocoded {:?} -> {} ({:.4}, {:.4}) score={:.1}",
            address,
            result.normalized_address,
            result.location.latitude,
            result.location.longitude,
            result.match_score
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answers one request with a canned response and returns its request line.
    async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 16 * 1024];
            let mut read = 0;
            loop {
                let n = socket.read(&mut buf[read..]).await.unwrap();
                read += n;
                if n == 0 || buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            let request = String::from_utf8_lossy(&buf[..read]).to_string();
            request.lines().next().unwrap_or_default().to_string()
        });
        (base, handle)
    }

    fn parse(raw: &str) -> CandidatesResponse {
        serde_json::from_str(raw).expect("fixture should parse")
    }

    fn client_for(url: &str) -> GeocoderClient {
        let cfg = GeocoderConfig {
            url: url.into(),
            max_candidates: 5,
        };
        GeocoderClient::new(&cfg, &RegionConfig::default(), Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn test_first_candidate_wins() {
        let resp = parse(
            r#"{"candidates": [
                {"address": "10 Water St, St. John's, NL", "location": {"x": -52.7, "y": 47.56}, "score": 98.5},
                {"address": "10 Water St, Carbonear, NL", "location": {"x": -53.2, "y": 47.73}, "score": 99.0}
            ]}"#,
        );
        let result = select_first_candidate(resp, "10 Water St").unwrap();
        assert_eq!(result.normalized_address, "10 Water St, St. John's, NL");
        assert_eq!(result.location, Coordinate::new(47.56, -52.7));
        assert_eq!(result.match_score, 98.5);
    }

    #[test]
    fn test_empty_candidates_is_not_found() {
        let resp = parse(r#"{"spatialReference": {"wkid": 4326}, "candidates": []}"#);
        let err = select_first_candidate(resp, "Nowhere").unwrap_err();
        assert!(matches!(err, Error::AddressNotFound(ref a) if a == "Nowhere"));
    }

    #[test]
    fn test_absent_candidates_is_not_found() {
        let resp = parse(r#"{}"#);
        let err = select_first_candidate(resp, "Nowhere").unwrap_err();
        assert!(matches!(err, Error::AddressNotFound(_)));
    }

    #[test]
    fn test_error_body_is_service_error() {
        let resp = parse(r#"{"error": {"code": 498, "message": "Invalid Token"}}"#);
        let err = select_first_candidate(resp, "10 Water St").unwrap_err();
        assert!(matches!(err, Error::GeocodingService(ref m) if m.contains("498")));
    }

    #[test]
    fn test_region_bias_appended() {
        let client = client_for("http://127.0.0.1:9/geocode");
        assert_eq!(
            client.biased_query("  12 Main Rd "),
            "12 Main Rd, Newfoundland and Labrador"
        );
    }

    #[tokio::test]
    async fn test_transport_failure_is_service_error() {
        // Nothing listens on the discard port locally.
        let client = client_for("http://127.0.0.1:9/geocode");
        let err = client.geocode("10 Water St").await.unwrap_err();
        assert!(
            matches!(err, Error::GeocodingService(_)),
            "expected GeocodingService, got {:?}",
            err
        );
    }

    #[tokio::test]
    async fn test_geocode_sends_biased_query() {
        let body = r#"{"candidates": [
            {"address": "10 Water St, St. John's, NL", "location": {"x": -52.7, "y": 47.56}, "score": 98.5}
        ]}"#;
        let (base, server) = serve_once("200 OK", body.to_string()).await;
        let result = client_for(&format!("{}/geocode", base))
            .geocode("10 Water St")
            .await
            .unwrap();
        let request_line = server.await.unwrap();

        assert!(request_line.starts_with("GET /geocode?"), "got {}", request_line);
        for param in [
            "SingleLine=10+Water+St%2C+Newfoundland+and+Labrador",
            "f=json",
            "outSR=4326",
            "maxLocations=5",
            "countryCode=CAN",
        ] {
            assert!(request_line.contains(param), "missing {} in {}", param, request_line);
        }
        assert_eq!(result.location, Coordinate::new(47.56, -52.7));
        assert_eq!(result.normalized_address, "10 Water St, St. John's, NL");
    }

    #[tokio::test]
    async fn test_non_2xx_is_service_error() {
        let (base, server) = serve_once("500 Internal Server Error", "boom".to_string()).await;
        let err = client_for(&format!("{}/geocode", base))
            .geocode("10 Water St")
            .await
            .unwrap_err();
        server.await.unwrap();
        assert!(
            matches!(err, Error::GeocodingService(ref m) if m.contains("500")),
            "expected GeocodingService, got {:?}",
            err
        );
    }

    #[tokio::test]
    async fn test_multibyte_error_body_is_service_error() {
        let body = format!("{}\u{2014}rest", "x".repeat(499));
        let (base, server) = serve_once("503 Service Unavailable", body).await;
        let err = client_for(&format!("{}/geocode", base))
            .geocode("10 Water St")
            .await
            .unwrap_err();
        server.await.unwrap();
        assert!(matches!(err, Error::GeocodingService(_)));
    }

    #[tokio::test]
    async fn test_no_candidates_over_http_is_not_found() {
        let (base, server) = serve_once("200 OK", r#"{"candidates": []}"#.to_string()).await;
        let err = client_for(&format!("{}/geocode", base))
            .geocode("Nowhere")
            .await
            .unwrap_err();
        server.await.unwrap();
        assert!(matches!(err, Error::AddressNotFound(ref a) if a == "Nowhere"));
    }
}
