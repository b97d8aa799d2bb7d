//! Shared types, config, and error definitions for wildfire-watch.

pub mod config;
pub mod error;
pub mod geo;
pub mod types;

pub use config::AppConfig;
pub use error::{truncate_body, Error};
pub use geo::{distance_km, EARTH_RADIUS_KM};
pub use types::*;

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
