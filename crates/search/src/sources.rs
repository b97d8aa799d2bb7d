//! Seams between the orchestrator and the network clients.

use std::sync::Arc;

use async_trait::async_trait;
use common::{Error, FireRecord, GeocodeResult};
use geocoder_client::GeocoderClient;
use wildfire_client::{FetchOutcome, WildfireClient};

/// Resolves an address to its best-matching coordinate.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<GeocodeResult, Error>;
}

/// Supplies wildfire and hotspot records.
#[async_trait]
pub trait FireSource: Send + Sync {
    /// Never fails; failures come back as a degraded outcome.
    async fn fetch_active_fires(&self) -> FetchOutcome;

    /// Never fails; failures come back empty.
    async fn fetch_hotspots(&self) -> Vec<FireRecord>;
}

#[async_trait]
impl Geocoder for GeocoderClient {
    async fn geocode(&self, address: &str) -> Result<GeocodeResult, Error> {
        GeocoderClient::geocode(self, address).await
    }
}

#[async_trait]
impl FireSource for WildfireClient {
    async fn fetch_active_fires(&self) -> FetchOutcome {
        WildfireClient::fetch_active_fires(self).await
    }

    async fn fetch_hotspots(&self) -> Vec<FireRecord> {
        WildfireClient::fetch_hotspots(self).await
    }
}

#[async_trait]
impl<T: Geocoder + ?Sized> Geocoder for Arc<T> {
    async fn geocode(&self, address: &str) -> Result<GeocodeResult, Error> {
        (**self).geocode(address).await
    }
}

#[async_trait]
impl<T: FireSource + ?Sized> FireSource for Arc<T> {
    async fn fetch_active_fires(&self) -> FetchOutcome {
        (**self).fetch_active_fires().await
    }

    async fn fetch_hotspots(&self) -> Vec<FireRecord> {
        (**self).fetch_hotspots().await
    }
}
