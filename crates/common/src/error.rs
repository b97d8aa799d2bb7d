//! Unified error type for wildfire-watch.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Address not found: {0}")]
    AddressNotFound(String),

    #[error("Geocoding service error: {0}")]
    GeocodingService(String),

    #[error("Wildfire data unavailable: {0}")]
    DataUnavailable(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True when the user can fix the failure by editing what they typed.
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Error::InvalidInput(_) | Error::AddressNotFound(_))
    }
}

/// Longest prefix of `body` that fits in `max_bytes` and ends on a char
/// boundary. Used to quote upstream error bodies.
pub fn truncate_body(body: &str, max_bytes: usize) -> &str {
    if body.len() <= max_bytes {
        return body;
    }
    let mut end = max_bytes;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
