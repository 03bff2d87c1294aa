//! Recycler position sources
//!
//! The poller asks a [`PositionSource`] for the next recycler position on
//! every tick. [`SimulatedSource`] fabricates movement for demos and tests;
//! [`GatewaySource`] polls the backend. [`ConfiguredSource`] picks one from
//! the `tracking.position_source` setting.

use crate::config::Config;
use crate::coord::Coordinate;
use crate::error::{Error, Result};
use crate::gateway::HttpGateway;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::future::Future;
use std::sync::Mutex;

/// Supplies recycler positions to the tracking poller
pub trait PositionSource: Send + Sync {
    /// Source name for logs
    fn name(&self) -> &'static str;

    /// Next position of the recycler serving `request_id`
    fn next_position(
        &self,
        request_id: &str,
        current: Coordinate,
        destination: Coordinate,
    ) -> impl Future<Output = Result<Coordinate>> + Send;
}

/// Which source to build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Simulated,
    Gateway,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simulated => write!(f, "simulated"),
            Self::Gateway => write!(f, "gateway"),
        }
    }
}

impl std::str::FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "simulated" | "simulator" | "pseudo" => Ok(Self::Simulated),
            "gateway" | "remote" => Ok(Self::Gateway),
            _ => Err(format!("Unknown position source: {}", s)),
        }
    }
}

/// Simulated recycler movement
///
/// Each tick covers `approach_fraction` of the remaining offset to the
/// destination and adds uniform jitter of up to `jitter_degrees` on each
/// axis. An approach fraction of 0 gives a pure random walk.
pub struct SimulatedSource {
    rng: Mutex<StdRng>,
    jitter_degrees: f64,
    approach_fraction: f64,
}

impl SimulatedSource {
    /// Simulator seeded from OS entropy
    pub fn new(jitter_degrees: f64, approach_fraction: f64) -> Self {
        Self::with_rng(StdRng::from_entropy(), jitter_degrees, approach_fraction)
    }

    /// Simulator with a fixed seed; the same seed replays the same route
    pub fn seeded(seed: u64, jitter_degrees: f64, approach_fraction: f64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), jitter_degrees, approach_fraction)
    }

    fn with_rng(rng: StdRng, jitter_degrees: f64, approach_fraction: f64) -> Self {
        Self {
            rng: Mutex::new(rng),
            jitter_degrees: jitter_degrees.abs(),
            approach_fraction: approach_fraction.clamp(0.0, 1.0),
        }
    }

    /// Build from the `[tracking]` config section
    pub fn from_config(config: &Config) -> Self {
        let t = &config.tracking;
        match t.seed {
            Some(seed) => Self::seeded(seed, t.jitter_degrees, t.approach_fraction),
            None => Self::new(t.jitter_degrees, t.approach_fraction),
        }
    }

    fn step(&self, current: Coordinate, destination: Coordinate) -> Coordinate {
        let (jitter_lat, jitter_lng) = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            (
                rng.gen_range(-1.0..=1.0) * self.jitter_degrees,
                rng.gen_range(-1.0..=1.0) * self.jitter_degrees,
            )
        };

        let lat = current.latitude
            + (destination.latitude - current.latitude) * self.approach_fraction
            + jitter_lat;
        let lng = current.longitude
            + (destination.longitude - current.longitude) * self.approach_fraction
            + jitter_lng;

        Coordinate::new(lat.clamp(-90.0, 90.0), lng.clamp(-180.0, 180.0))
    }
}

impl PositionSource for SimulatedSource {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn next_position(
        &self,
        _request_id: &str,
        current: Coordinate,
        destination: Coordinate,
    ) -> Result<Coordinate> {
        Ok(self.step(current, destination))
    }
}

/// Polls the backend for the recycler's reported position
#[derive(Debug, Clone)]
pub struct GatewaySource {
    gateway: HttpGateway,
}

impl GatewaySource {
    pub fn new(gateway: HttpGateway) -> Self {
        Self { gateway }
    }
}

impl PositionSource for GatewaySource {
    fn name(&self) -> &'static str {
        "gateway"
    }

    async fn next_position(
        &self,
        request_id: &str,
        _current: Coordinate,
        _destination: Coordinate,
    ) -> Result<Coordinate> {
        self.gateway.recycler_position(request_id).await
    }
}

/// Source selected by configuration
pub enum ConfiguredSource {
    Simulated(SimulatedSource),
    Gateway(GatewaySource),
}

impl ConfiguredSource {
    pub fn from_config(config: &Config) -> Result<Self> {
        let kind: SourceKind = config
            .tracking
            .position_source
            .parse()
            .map_err(Error::Config)?;

        Ok(match kind {
            SourceKind::Simulated => Self::Simulated(SimulatedSource::from_config(config)),
            SourceKind::Gateway => {
                Self::Gateway(GatewaySource::new(HttpGateway::from_config(config)?))
            }
        })
    }
}

impl PositionSource for ConfiguredSource {
    fn name(&self) -> &'static str {
        match self {
            Self::Simulated(s) => s.name(),
            Self::Gateway(s) => s.name(),
        }
    }

    async fn next_position(
        &self,
        request_id: &str,
        current: Coordinate,
        destination: Coordinate,
    ) -> Result<Coordinate> {
        match self {
            Self::Simulated(s) => s.next_position(request_id, current, destination).await,
            Self::Gateway(s) => s.next_position(request_id, current, destination).await,
        }
    }
}
