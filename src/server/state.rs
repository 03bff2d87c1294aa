//! Server shared state
//!
//! Collection statuses and recycler positions reported to the demo gateway.

use crate::coord::Coordinate;
use crate::tracking::CollectionStatus;
use std::collections::HashMap;
use std::time::Instant;
use tokio::sync::RwLock;

/// Shared state for the HTTP server
pub struct AppState {
    /// Maximum predictions per search response
    pub result_limit: usize,

    statuses: RwLock<HashMap<String, CollectionStatus>>,
    positions: RwLock<HashMap<String, Coordinate>>,
    started: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new() -> Self {
        Self::with_result_limit(crate::config::defaults::DEFAULT_FALLBACK_LIMIT)
    }

    pub fn with_result_limit(result_limit: usize) -> Self {
        Self {
            result_limit,
            statuses: RwLock::new(HashMap::new()),
            positions: RwLock::new(HashMap::new()),
            started: Instant::now(),
        }
    }

    pub async fn status_of(&self, collection_id: &str) -> Option<CollectionStatus> {
        self.statuses.read().await.get(collection_id).copied()
    }

    pub async fn set_status(&self, collection_id: &str, status: CollectionStatus) {
        self.statuses
            .write()
            .await
            .insert(collection_id.to_string(), status);
    }

    pub async fn position_of(&self, collection_id: &str) -> Option<Coordinate> {
        self.positions.read().await.get(collection_id).copied()
    }

    pub async fn set_position(&self, collection_id: &str, position: Coordinate) {
        self.positions
            .write()
            .await
            .insert(collection_id.to_string(), position);
    }

    /// Seconds since the state was created
    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
