//! pickup-radar: pickup location search and recycler tracking
//!
//! A library and CLI for the client side of a waste-collection marketplace:
//! finding pickup points through a places gateway and following a recycler
//! as it drives toward one.
//!
//! ## Features
//!
//! - Debounced location search with stale-response guarding and an offline
//!   catalog fallback
//! - One normalization seam for the gateway's response envelopes
//! - Timer-driven tracking with arrival detection and status reporting
//! - Map marker projection (category to icon and color)
//! - Demo gateway server + CLI interface
//!
//! ## Quick Start
//!
//! ```no_run
//! use pickup_radar::gateway::HttpGateway;
//! use pickup_radar::search::{LocationSearchClient, SearchSettings};
//! use std::time::Duration;
//!
//! # async fn demo() -> pickup_radar::Result<()> {
//! let gateway = HttpGateway::new("http://127.0.0.1:7979/api", Duration::from_secs(8))?;
//! let client = LocationSearchClient::new(gateway, SearchSettings::default());
//!
//! for place in client.search_locations("Unity Oil", None).await? {
//!     println!("{} ({})", place.name, place.address);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod error;
pub mod format;
pub mod gateway;
pub mod markers;
pub mod search;
pub mod server;
pub mod tracking;

// Re-export commonly used types
pub use config::Config;
pub use coord::Coordinate;
pub use error::{Error, Result};
pub use search::{LocationSearchClient, LocationSuggestion, SuggestionKind};
pub use tracking::{CollectionStatus, TrackingHandle, TrackingPoller, TrackingState};
