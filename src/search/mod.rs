//! Location search
//!
//! Turns free-text input into location suggestions. The [`client`] module
//! holds the debounced, failure-tolerant search client; [`catalog`] holds the
//! offline dataset it falls back to.

pub mod catalog;
pub mod client;

use crate::coord::Coordinate;
use crate::error::Result;
use serde::{Deserialize, Serialize};

pub use client::{LocationSearchClient, SearchSettings};

/// Place category reported by the gateway; display only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Establishment,
    #[default]
    Geocode,
    Route,
    StreetAddress,
}

impl std::fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Establishment => write!(f, "establishment"),
            Self::Geocode => write!(f, "geocode"),
            Self::Route => write!(f, "route"),
            Self::StreetAddress => write!(f, "street_address"),
        }
    }
}

impl std::str::FromStr for SuggestionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "establishment" | "point_of_interest" => Ok(Self::Establishment),
            "geocode" => Ok(Self::Geocode),
            "route" => Ok(Self::Route),
            "street_address" | "premise" => Ok(Self::StreetAddress),
            _ => Err(format!("Unknown suggestion kind: {}", s)),
        }
    }
}

/// A single search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSuggestion {
    /// Opaque id, unique within one response
    pub id: String,
    /// Short display label
    pub name: String,
    /// Full human-readable address
    pub address: String,
    /// Position, when the gateway returned geometry with the prediction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<Coordinate>,
    #[serde(default)]
    pub kind: SuggestionKind,
}

impl LocationSuggestion {
    /// Case-insensitive substring match on name or address
    ///
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.address.to_lowercase().contains(needle)
    }
}

/// Backend that answers place searches and geocoding requests
///
/// Implementations return canonical types; envelope sniffing happens
/// inside the implementation, never in the search client.
pub trait PlacesGateway: Send + Sync {
    /// Predictions for a free-text query, optionally biased to a position
    fn search(
        &self,
        query: &str,
        bias: Option<Coordinate>,
    ) -> impl std::future::Future<Output = Result<Vec<LocationSuggestion>>> + Send;

    /// Full details for one place id
    fn details(
        &self,
        place_id: &str,
    ) -> impl std::future::Future<Output = Result<LocationSuggestion>> + Send;

    /// Human-readable address for a coordinate
    fn reverse_geocode(
        &self,
        coordinate: Coordinate,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}
