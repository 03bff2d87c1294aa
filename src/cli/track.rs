//! Track command handler
//!
//! Follows a recycler toward a pickup point until it arrives or the user
//! presses Ctrl-C, then prints the final session in the chosen format.

use crate::cli::{emit, formatter, resolve_point};
use crate::config::Config;
use crate::coord::Coordinate;
use crate::error::Result;
use crate::gateway::HttpGateway;
use crate::tracking::poller::LogReporter;
use crate::tracking::source::ConfiguredSource;
use crate::tracking::{
    SimulatedSource, StatusReporter, TrackingHandle, TrackingPoller, TrackingSettings,
    TrackingState,
};
use clap::Args;
use std::time::Duration;
use tracing::warn;

/// Track command arguments
#[derive(Args)]
pub struct TrackArgs {
    /// Recycler start point ("lat,lng" or place id)
    #[arg(long, allow_hyphen_values = true)]
    pub from: String,

    /// Pickup point ("lat,lng" or place id)
    #[arg(long, allow_hyphen_values = true)]
    pub to: String,

    /// Collection request id (random if omitted)
    #[arg(long)]
    pub request_id: Option<String>,

    /// Simulate movement and log status changes instead of calling the gateway
    #[arg(long)]
    pub offline: bool,

    /// Tick interval in milliseconds
    #[arg(long)]
    pub tick_ms: Option<u64>,

    /// Seed for simulated movement
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output format
    #[arg(long, short = 'f', default_value = "text")]
    pub format: String,

    /// Write output to file
    #[arg(long, short = 'o')]
    pub output: Option<String>,
}

/// Run the track command
pub async fn run(args: TrackArgs) -> Result<()> {
    let mut config = Config::load()?;
    let formatter = formatter(&args.format)?;

    if let Some(tick_ms) = args.tick_ms {
        config.tracking.tick_ms = tick_ms;
    }
    if args.seed.is_some() {
        config.tracking.seed = args.seed;
    }

    let origin = resolve_point(&args.from)?;
    let destination = resolve_point(&args.to)?;
    let request_id = args
        .request_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let settings = TrackingSettings::from_config(&config);

    let state = if args.offline {
        let source = ConfiguredSource::Simulated(SimulatedSource::from_config(&config));
        follow(source, LogReporter, settings, request_id, origin, destination).await?
    } else {
        let source = ConfiguredSource::from_config(&config)?;
        let reporter = HttpGateway::from_config(&config)?;
        follow(source, reporter, settings, request_id, origin, destination).await?
    };

    let output = formatter.format_tracking(&state)?;
    emit(&output, args.output.as_deref())
}

/// Drive one session to its end, printing progress to stderr
async fn follow<R>(
    source: ConfiguredSource,
    reporter: R,
    settings: TrackingSettings,
    request_id: String,
    origin: Coordinate,
    destination: Coordinate,
) -> Result<TrackingState>
where
    R: StatusReporter + 'static,
{
    let tick = settings.tick;
    let handle = TrackingPoller::new(source, reporter, settings).start(
        request_id,
        origin,
        destination,
    )?;

    let mut updates = handle.subscribe();
    print_progress(&handle.snapshot(), tick);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                print_progress(&state, tick);
                if state.phase.is_terminal() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                eprintln!("Tracking cancelled");
                return Ok(stop(handle).await);
            }
        }
    }

    Ok(handle.finish().await)
}

/// Cancel a session and return its final state
///
/// A failed cancellation report is logged; the session is stopped either way.
async fn stop<R: StatusReporter>(handle: TrackingHandle<R>) -> TrackingState {
    let updates = handle.subscribe();
    let request_id = handle.snapshot().request_id;

    if let Err(e) = handle.cancel().await {
        warn!(%request_id, error = %e, "failed to report cancellation");
    }

    let state = updates.borrow().clone();
    state
}

fn print_progress(state: &TrackingState, tick: Duration) {
    if state.has_arrived {
        eprintln!("Recycler arrived after {} updates", state.ticks);
    } else if !state.phase.is_terminal() {
        eprintln!(
            "[{}] {:.3} km away, ETA {} min (next update in {}s)",
            state.ticks,
            state.distance_km,
            state.eta_minutes,
            tick.as_secs_f64()
        );
    }
}
