//! Debounced location search client
//!
//! Every call takes a sequence number and publishes it as the latest.
//! A call only reaches the gateway if no newer call arrives during the
//! debounce window, and its result is only delivered if it is still the
//! latest when the response lands. Superseded calls resolve with
//! [`Error::Cancelled`] instead of lingering.
//!
//! Gateway failures never reach the caller: searches fall back to the
//! built-in catalog, details resolve to `None` and reverse geocoding to
//! the "Unknown Location" sentinel.

use crate::config::Config;
use crate::constants::api::UNKNOWN_LOCATION;
use crate::coord::Coordinate;
use crate::error::{Error, Result};
use crate::search::{catalog, LocationSuggestion, PlacesGateway};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Tunables for [`LocationSearchClient`]
#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// Quiet period before a search fires
    pub debounce: Duration,
    /// Upper bound on a single gateway call
    pub timeout: Duration,
    /// Maximum number of catalog matches on fallback
    pub fallback_limit: usize,
}

impl SearchSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            debounce: Duration::from_millis(config.search.debounce_ms),
            timeout: Duration::from_millis(config.gateway.timeout_ms),
            fallback_limit: config.search.fallback_limit,
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Search client owning one debounce slot
///
/// Two search boxes should use two clients; they never interfere.
pub struct LocationSearchClient<G> {
    gateway: G,
    settings: SearchSettings,
    next_seq: AtomicU64,
    latest: watch::Sender<u64>,
    disposed: AtomicBool,
}

impl<G: PlacesGateway> LocationSearchClient<G> {
    /// Create a client over a gateway
    pub fn new(gateway: G, settings: SearchSettings) -> Self {
        let (latest, _) = watch::channel(0);
        Self {
            gateway,
            settings,
            next_seq: AtomicU64::new(0),
            latest,
            disposed: AtomicBool::new(false),
        }
    }

    /// The underlying gateway
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Search for places matching `query`
    ///
    /// Empty or whitespace-only queries resolve to an empty list without
    /// touching the gateway (they still supersede pending searches).
    ///
    /// # Errors
    /// Only [`Error::Cancelled`], when a newer call, [`cancel`](Self::cancel)
    /// or [`dispose`](Self::dispose) supersedes this one.
    pub async fn search_locations(
        &self,
        query: &str,
        bias: Option<Coordinate>,
    ) -> Result<Vec<LocationSuggestion>> {
        if self.disposed.load(Ordering::SeqCst) {
            return Err(Error::Cancelled);
        }

        let seq = self.advance();

        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut watcher = self.latest.subscribe();
        tokio::select! {
            _ = tokio::time::sleep(self.settings.debounce) => {}
            _ = superseded(&mut watcher, seq) => {
                debug!(seq, query, "search superseded during debounce");
                return Err(Error::Cancelled);
            }
        }

        if !self.is_latest(seq) {
            return Err(Error::Cancelled);
        }

        let results = self.fetch(query, bias).await;

        if !self.is_latest(seq) {
            debug!(seq, query, "discarding stale search response");
            return Err(Error::Cancelled);
        }

        Ok(results)
    }

    /// Fetch details for a place id; `None` on any failure
    pub async fn get_location_details(&self, place_id: &str) -> Option<LocationSuggestion> {
        if place_id.trim().is_empty() {
            return None;
        }

        match self.bounded(self.gateway.details(place_id)).await {
            Ok(details) => Some(details),
            Err(e) => {
                warn!(place_id, error = %e, "location details lookup failed");
                None
            }
        }
    }

    /// Address for a coordinate; "Unknown Location" on any failure
    pub async fn reverse_geocode(&self, coordinate: Coordinate) -> String {
        match self.bounded(self.gateway.reverse_geocode(coordinate)).await {
            Ok(address) if !address.trim().is_empty() => address,
            Ok(_) => {
                warn!(%coordinate, "reverse geocode returned an empty address");
                UNKNOWN_LOCATION.to_string()
            }
            Err(e) => {
                warn!(%coordinate, error = %e, "reverse geocode failed");
                UNKNOWN_LOCATION.to_string()
            }
        }
    }

    /// Supersede every pending search
    pub fn cancel(&self) {
        self.advance();
    }

    /// Supersede every pending search and refuse new ones
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        self.advance();
    }

    /// Whether [`dispose`](Self::dispose) has been called
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    fn advance(&self) -> u64 {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.latest.send_replace(seq);
        seq
    }

    fn is_latest(&self, seq: u64) -> bool {
        *self.latest.borrow() == seq
    }

    async fn fetch(&self, query: &str, bias: Option<Coordinate>) -> Vec<LocationSuggestion> {
        match self.bounded(self.gateway.search(query, bias)).await {
            Ok(results) => results,
            Err(e) => {
                warn!(query, error = %e, "location search failed, using offline catalog");
                catalog::search(query, bias, self.settings.fallback_limit)
            }
        }
    }

    async fn bounded<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.settings.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(self.settings.timeout.as_millis() as u64)),
        }
    }
}

/// Resolves once the published sequence moves past `seq`
async fn superseded(watcher: &mut watch::Receiver<u64>, seq: u64) {
    loop {
        if *watcher.borrow_and_update() != seq {
            return;
        }
        if watcher.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
