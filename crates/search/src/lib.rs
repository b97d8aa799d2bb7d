//! Search pipeline crate.
//!
//! Turns an address into a distance-ranked, risk-classified list of active
//! wildfires, with a session-scoped cache in front of the wildfire feed.

pub mod cache;
pub mod engine;
pub mod risk;
pub mod sources;
pub mod store;

pub use cache::{spawn_invalidation, CacheEntry, Clock, FireCache, ManualClock, SystemClock};
pub use engine::{Notice, SearchOrchestrator, SearchResult, SearchState};
pub use risk::risk_tier;
pub use sources::{FireSource, Geocoder};
pub use store::{SessionStore, FIRE_CACHE_KEY, HOTSPOTS_KEY};
