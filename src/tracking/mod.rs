//! Pickup tracking
//!
//! A tracking session follows one recycler toward one pickup destination.
//! [`TrackingState`] holds the per-session data and the arrival rule;
//! [`poller`] drives it from a timer; [`source`] supplies positions.

pub mod poller;
pub mod source;

use crate::config::Config;
use crate::coord::{eta_minutes, haversine_km, Coordinate};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use uuid::Uuid;

pub use poller::{TrackingHandle, TrackingPoller};
pub use source::{PositionSource, SimulatedSource};

/// Lifecycle status of a waste collection, as the backend names it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionStatus {
    Pending,
    Accepted,
    InProgress,
    Completed,
    Cancelled,
}

impl std::fmt::Display for CollectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Accepted => write!(f, "accepted"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Receives collection status changes raised by tracking
pub trait StatusReporter: Send + Sync {
    fn update_status(
        &self,
        collection_id: &str,
        status: CollectionStatus,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Phase of a tracking session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingPhase {
    Idle,
    Tracking,
    /// Terminal: the recycler came within the arrival threshold
    Arrived,
    /// Terminal: the session was cancelled or torn down before arrival
    Stopped,
}

impl TrackingPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Arrived | Self::Stopped)
    }
}

/// Tunables for a tracking session
#[derive(Debug, Clone)]
pub struct TrackingSettings {
    pub tick: Duration,
    pub arrival_threshold_km: f64,
    pub average_speed_kmh: f64,
    pub max_trace_len: usize,
}

impl TrackingSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            tick: Duration::from_millis(config.tracking.tick_ms.max(1)),
            arrival_threshold_km: config.tracking.arrival_threshold_km,
            average_speed_kmh: config.tracking.average_speed_kmh,
            max_trace_len: config.tracking.max_trace_len,
        }
    }
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Route trace bounded to the most recent `capacity` points
///
/// Serialize-only: the capacity bound is only upheld through [`push`](Self::push).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteTrace {
    points: VecDeque<Coordinate>,
    capacity: usize,
    /// Points evicted to stay within capacity
    dropped: u64,
}

impl RouteTrace {
    /// A capacity of 0 is treated as 1
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            dropped: 0,
        }
    }

    /// Append a point, evicting the oldest one when full
    pub fn push(&mut self, point: Coordinate) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
            self.dropped += 1;
        }
        self.points.push_back(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total points ever appended
    pub fn total_recorded(&self) -> u64 {
        self.dropped + self.points.len() as u64
    }

    pub fn last(&self) -> Option<&Coordinate> {
        self.points.back()
    }

    /// Points oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Coordinate> {
        self.points.iter()
    }
}

/// State of one tracking session
///
/// Serialize-only: arrival settings are not part of the wire form.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingState {
    pub session_id: Uuid,
    /// Collection/request this session follows
    pub request_id: String,
    pub recycler_position: Coordinate,
    pub destination_position: Coordinate,
    pub route_trace: RouteTrace,
    pub distance_km: f64,
    pub eta_minutes: u32,
    /// Set once, never cleared
    pub has_arrived: bool,
    pub phase: TrackingPhase,
    pub ticks: u64,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    arrival_threshold_km: f64,
    #[serde(skip)]
    average_speed_kmh: f64,
}

impl TrackingState {
    /// Fresh session in the `Idle` phase with the origin as the first trace point
    pub fn new(
        request_id: impl Into<String>,
        recycler_position: Coordinate,
        destination_position: Coordinate,
        settings: &TrackingSettings,
    ) -> Self {
        let mut route_trace = RouteTrace::new(settings.max_trace_len);
        route_trace.push(recycler_position);

        let distance_km = haversine_km(recycler_position, destination_position);

        Self {
            session_id: Uuid::new_v4(),
            request_id: request_id.into(),
            recycler_position,
            destination_position,
            route_trace,
            distance_km,
            eta_minutes: eta_minutes(distance_km, settings.average_speed_kmh),
            has_arrived: false,
            phase: TrackingPhase::Idle,
            ticks: 0,
            updated_at: Utc::now(),
            arrival_threshold_km: settings.arrival_threshold_km,
            average_speed_kmh: settings.average_speed_kmh,
        }
    }

    /// `Idle -> Tracking`; no effect in any other phase
    pub fn start(&mut self) {
        if self.phase == TrackingPhase::Idle {
            self.phase = TrackingPhase::Tracking;
        }
    }

    /// Apply one position update
    ///
    /// Returns true exactly once: on the tick where the distance first
    /// drops below the arrival threshold. Updates after a terminal phase
    /// are ignored.
    pub fn advance(&mut self, position: Coordinate) -> bool {
        if self.phase.is_terminal() {
            return false;
        }
        self.start();

        self.recycler_position = position;
        self.route_trace.push(position);
        self.distance_km = haversine_km(position, self.destination_position);
        self.eta_minutes = eta_minutes(self.distance_km, self.average_speed_kmh);
        self.ticks += 1;
        self.updated_at = Utc::now();

        if !self.has_arrived && self.distance_km < self.arrival_threshold_km {
            self.has_arrived = true;
            self.phase = TrackingPhase::Arrived;
            return true;
        }
        false
    }

    /// Move to `Stopped` unless already terminal; returns whether it changed
    pub fn stop(&mut self) -> bool {
        if self.phase.is_terminal() {
            return false;
        }
        self.phase = TrackingPhase::Stopped;
        self.updated_at = Utc::now();
        true
    }
}
