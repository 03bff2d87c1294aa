//! Timer-driven tracking poller
//!
//! [`TrackingPoller::start`] spawns one task per session. On every tick it
//! asks the [`PositionSource`] for a new position, applies it to the shared
//! [`TrackingState`] and, on the arrival tick, reports the collection as
//! `in_progress` and exits.
//!
//! The returned [`TrackingHandle`] owns the task: dropping it stops the
//! timer, so a torn-down screen cannot leak a running poller. Once the
//! session has arrived the task only has its status report left, and that
//! report is never aborted.

use crate::coord::Coordinate;
use crate::error::Result;
use crate::tracking::source::PositionSource;
use crate::tracking::{CollectionStatus, StatusReporter, TrackingSettings, TrackingState};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Reporter that only logs status changes
///
/// For offline runs where no backend is listening.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl StatusReporter for LogReporter {
    async fn update_status(&self, collection_id: &str, status: CollectionStatus) -> Result<()> {
        info!(collection_id, %status, "collection status changed");
        Ok(())
    }
}

/// Builds tracking sessions from a position source and a status reporter
pub struct TrackingPoller<S, R> {
    source: S,
    reporter: Arc<R>,
    settings: TrackingSettings,
}

impl<S, R> TrackingPoller<S, R>
where
    S: PositionSource + 'static,
    R: StatusReporter + 'static,
{
    pub fn new(source: S, reporter: R, settings: TrackingSettings) -> Self {
        Self {
            source,
            reporter: Arc::new(reporter),
            settings,
        }
    }

    /// Start tracking `request_id` from `origin` toward `destination`
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        self,
        request_id: impl Into<String>,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<TrackingHandle<R>> {
        origin.validate()?;
        destination.validate()?;

        let mut state = TrackingState::new(request_id, origin, destination, &self.settings);
        state.start();

        info!(
            request_id = %state.request_id,
            session = %state.session_id,
            source = self.source.name(),
            distance_km = state.distance_km,
            "tracking started"
        );

        let state = Arc::new(watch::channel(state).0);
        let task = tokio::spawn(run(
            self.source,
            self.reporter.clone(),
            self.settings,
            state.clone(),
        ));

        Ok(TrackingHandle {
            state,
            task,
            reporter: self.reporter,
        })
    }
}

async fn run<S, R>(
    source: S,
    reporter: Arc<R>,
    settings: TrackingSettings,
    state: Arc<watch::Sender<TrackingState>>,
) where
    S: PositionSource,
    R: StatusReporter,
{
    let mut ticker = interval_at(Instant::now() + settings.tick, settings.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let (request_id, current, destination) = {
            let s = state.borrow();
            if s.phase.is_terminal() {
                return;
            }
            (s.request_id.clone(), s.recycler_position, s.destination_position)
        };

        let next = match source.next_position(&request_id, current, destination).await {
            Ok(position) => position,
            Err(e) => {
                warn!(%request_id, source = source.name(), error = %e, "position update failed");
                continue;
            }
        };

        let mut arrived = false;
        state.send_modify(|s| arrived = s.advance(next));

        if arrived {
            let snapshot = state.borrow().clone();
            info!(
                %request_id,
                ticks = snapshot.ticks,
                distance_km = snapshot.distance_km,
                "recycler has arrived"
            );
            if let Err(e) = reporter
                .update_status(&request_id, CollectionStatus::InProgress)
                .await
            {
                warn!(%request_id, error = %e, "failed to report arrival");
            }
            return;
        }

        debug!(%request_id, %next, distance_km = state.borrow().distance_km, "tracking tick");
    }
}

/// Owner of a running tracking session
///
/// Dropping the handle stops a live poller without reporting anything. A
/// session that has already arrived is left to finish its arrival report.
pub struct TrackingHandle<R> {
    state: Arc<watch::Sender<TrackingState>>,
    task: JoinHandle<()>,
    reporter: Arc<R>,
}

impl<R: StatusReporter> TrackingHandle<R> {
    /// Latest state
    pub fn snapshot(&self) -> TrackingState {
        self.state.borrow().clone()
    }

    /// Receiver that sees every state change, including teardown
    pub fn subscribe(&self) -> watch::Receiver<TrackingState> {
        self.state.subscribe()
    }

    /// Resolve once the session ends: `Some` on arrival, `None` if stopped
    pub async fn wait_for_arrival(&self) -> Option<TrackingState> {
        let mut rx = self.state.subscribe();
        let state = rx.wait_for(|s| s.phase.is_terminal()).await.ok()?.clone();
        state.has_arrived.then_some(state)
    }

    /// Wait for the session to end and for its arrival report to be sent
    pub async fn finish(mut self) -> TrackingState {
        let mut rx = self.state.subscribe();
        let _ = rx.wait_for(|s| s.phase.is_terminal()).await;
        self.join().await;
        self.snapshot()
    }

    /// Stop the poller and report the collection as cancelled
    ///
    /// Nothing is reported if the session had already arrived or stopped;
    /// an arrival report still in flight is awaited instead.
    pub async fn cancel(mut self) -> Result<()> {
        if !self.halt() {
            self.join().await;
            return Ok(());
        }

        let request_id = self.state.borrow().request_id.clone();
        info!(%request_id, "tracking cancelled");
        self.reporter
            .update_status(&request_id, CollectionStatus::Cancelled)
            .await
    }
}

impl<R> TrackingHandle<R> {
    /// Mark the session stopped and abort the task; true if it was live
    ///
    /// A terminal session keeps its task so the arrival report completes.
    fn halt(&self) -> bool {
        let stopped = self.state.send_if_modified(|s| s.stop());
        if stopped {
            self.task.abort();
        }
        stopped
    }

    async fn join(&mut self) {
        if let Err(e) = (&mut self.task).await {
            if !e.is_cancelled() {
                warn!(error = %e, "tracking task failed");
            }
        }
    }
}

impl<R> Drop for TrackingHandle<R> {
    fn drop(&mut self) {
        self.halt();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::tracking::{SimulatedSource, TrackingPhase};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::sleep;

    /// Replays a fixed list of positions, then holds the last one
    struct ScriptedSource {
        positions: Mutex<VecDeque<Coordinate>>,
    }

    impl ScriptedSource {
        fn new(positions: Vec<Coordinate>) -> Self {
            Self {
                positions: Mutex::new(positions.into()),
            }
        }
    }

    impl PositionSource for ScriptedSource {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn next_position(
            &self,
            _request_id: &str,
            current: Coordinate,
            _destination: Coordinate,
        ) -> Result<Coordinate> {
            Ok(self.positions.lock().unwrap().pop_front().unwrap_or(current))
        }
    }

    struct FailingSource;

    impl PositionSource for FailingSource {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn next_position(
            &self,
            _request_id: &str,
            _current: Coordinate,
            _destination: Coordinate,
        ) -> Result<Coordinate> {
            Err(Error::Gateway("no fix".to_string()))
        }
    }

    #[derive(Clone, Default)]
    struct RecordingReporter {
        calls: Arc<Mutex<Vec<(String, CollectionStatus)>>>,
    }

    impl RecordingReporter {
        fn calls(&self) -> Vec<(String, CollectionStatus)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl StatusReporter for RecordingReporter {
        async fn update_status(&self, collection_id: &str, status: CollectionStatus) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push((collection_id.to_string(), status));
            Ok(())
        }
    }

    /// Records like [`RecordingReporter`] after a network-like delay
    #[derive(Clone, Default)]
    struct SlowReporter {
        inner: RecordingReporter,
    }

    impl StatusReporter for SlowReporter {
        async fn update_status(&self, collection_id: &str, status: CollectionStatus) -> Result<()> {
            sleep(Duration::from_millis(50)).await;
            self.inner.update_status(collection_id, status).await
        }
    }

    struct RejectingReporter;

    impl StatusReporter for RejectingReporter {
        async fn update_status(&self, _collection_id: &str, _status: CollectionStatus) -> Result<()> {
            Err(Error::Gateway("status endpoint down".to_string()))
        }
    }

    const TICK: Duration = Duration::from_millis(3000);

    fn destination() -> Coordinate {
        Coordinate::new(6.6734, -1.5714)
    }

    fn origin() -> Coordinate {
        Coordinate::new(6.7000, -1.6000)
    }

    fn settings() -> TrackingSettings {
        TrackingSettings {
            tick: TICK,
            ..TrackingSettings::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_follow_period() {
        let poller = TrackingPoller::new(
            ScriptedSource::new(vec![]),
            RecordingReporter::default(),
            settings(),
        );
        let handle = poller.start("req-1", origin(), destination()).unwrap();

        assert_eq!(handle.snapshot().phase, TrackingPhase::Tracking);
        assert_eq!(handle.snapshot().ticks, 0);

        sleep(TICK * 3 + Duration::from_millis(100)).await;

        let state = handle.snapshot();
        assert_eq!(state.ticks, 3);
        assert_eq!(state.route_trace.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_arrival_reports_once_and_stops() {
        let reporter = RecordingReporter::default();
        let near = Coordinate::new(6.6735, -1.5714);
        let source = ScriptedSource::new(vec![
            Coordinate::new(6.69, -1.59),
            near,
            near,
            destination(),
        ]);
        let handle = TrackingPoller::new(source, reporter.clone(), settings())
            .start("req-7", origin(), destination())
            .unwrap();

        let arrived = handle.wait_for_arrival().await.unwrap();
        assert!(arrived.has_arrived);
        assert_eq!(arrived.ticks, 2);

        sleep(TICK * 5).await;

        let state = handle.snapshot();
        assert_eq!(state.phase, TrackingPhase::Arrived);
        assert!(state.has_arrived);
        assert_eq!(state.ticks, 2);
        assert_eq!(
            reporter.calls(),
            vec![("req-7".to_string(), CollectionStatus::InProgress)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_trace_growth() {
        let source = SimulatedSource::seeded(9, 0.0005, 0.0);
        let handle = TrackingPoller::new(source, RecordingReporter::default(), settings())
            .start("req-2", origin(), destination())
            .unwrap();
        let watcher = handle.subscribe();

        sleep(TICK * 4 + Duration::from_millis(100)).await;
        let before = watcher.borrow().route_trace.len();
        assert_eq!(before, 5);

        drop(handle);
        sleep(TICK * 10).await;

        let after = watcher.borrow();
        assert_eq!(after.route_trace.len(), before);
        assert_eq!(after.phase, TrackingPhase::Stopped);
        assert!(!after.has_arrived);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trace_respects_cap() {
        let source = SimulatedSource::seeded(11, 0.0005, 0.0);
        let settings = TrackingSettings {
            max_trace_len: 5,
            ..settings()
        };
        let handle = TrackingPoller::new(source, RecordingReporter::default(), settings)
            .start("req-3", origin(), destination())
            .unwrap();

        sleep(TICK * 20 + Duration::from_millis(100)).await;

        let state = handle.snapshot();
        assert_eq!(state.ticks, 20);
        assert_eq!(state.route_trace.len(), 5);
        assert_eq!(state.route_trace.total_recorded(), 21);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_reports_cancelled() {
        let reporter = RecordingReporter::default();
        let handle = TrackingPoller::new(ScriptedSource::new(vec![]), reporter.clone(), settings())
            .start("req-4", origin(), destination())
            .unwrap();
        let watcher = handle.subscribe();

        sleep(TICK + Duration::from_millis(100)).await;
        handle.cancel().await.unwrap();

        assert_eq!(watcher.borrow().phase, TrackingPhase::Stopped);
        assert_eq!(
            reporter.calls(),
            vec![("req-4".to_string(), CollectionStatus::Cancelled)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_arrival_reports_nothing_more() {
        let reporter = RecordingReporter::default();
        let source = ScriptedSource::new(vec![destination()]);
        let handle = TrackingPoller::new(source, reporter.clone(), settings())
            .start("req-5", origin(), destination())
            .unwrap();

        assert!(handle.wait_for_arrival().await.is_some());
        handle.cancel().await.unwrap();

        assert_eq!(
            reporter.calls(),
            vec![("req-5".to_string(), CollectionStatus::InProgress)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_source_errors_skip_ticks() {
        let handle = TrackingPoller::new(FailingSource, LogReporter, settings())
            .start("req-6", origin(), destination())
            .unwrap();

        sleep(TICK * 3 + Duration::from_millis(100)).await;

        let state = handle.snapshot();
        assert_eq!(state.ticks, 0);
        assert_eq!(state.phase, TrackingPhase::Tracking);
        assert_eq!(state.recycler_position, origin());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_arrival_none_when_stopped() {
        let handle = TrackingPoller::new(FailingSource, LogReporter, settings())
            .start("req-8", origin(), destination())
            .unwrap();
        let watcher = handle.subscribe();

        let (outcome, _) = tokio::join!(handle.wait_for_arrival(), async {
            sleep(TICK).await;
            handle.halt();
        });

        assert!(outcome.is_none());
        assert_eq!(watcher.borrow().phase, TrackingPhase::Stopped);
    }

    #[tokio::test]
    async fn test_start_rejects_invalid_coordinates() {
        let poller = TrackingPoller::new(FailingSource, LogReporter, settings());
        assert!(poller
            .start("req-9", Coordinate::new(120.0, 0.0), destination())
            .is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_after_arrival_keeps_report() {
        let reporter = SlowReporter::default();
        let handle = TrackingPoller::new(
            ScriptedSource::new(vec![destination()]),
            reporter.clone(),
            settings(),
        )
        .start("req-10", origin(), destination())
        .unwrap();

        let mut watcher = handle.subscribe();
        watcher.wait_for(|s| s.has_arrived).await.unwrap();
        drop(handle);

        sleep(Duration::from_millis(200)).await;
        assert_eq!(
            reporter.inner.calls(),
            vec![("req-10".to_string(), CollectionStatus::InProgress)]
        );
        assert_eq!(watcher.borrow().phase, TrackingPhase::Arrived);
    }

    #[tokio::test(start_paused = true)]
    async fn test_finish_waits_for_arrival_report() {
        let reporter = SlowReporter::default();
        let handle = TrackingPoller::new(
            ScriptedSource::new(vec![destination()]),
            reporter.clone(),
            settings(),
        )
        .start("req-11", origin(), destination())
        .unwrap();

        let state = handle.finish().await;

        assert!(state.has_arrived);
        assert_eq!(
            reporter.inner.calls(),
            vec![("req-11".to_string(), CollectionStatus::InProgress)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_arrival_report() {
        let reporter = SlowReporter::default();
        let handle = TrackingPoller::new(
            ScriptedSource::new(vec![destination()]),
            reporter.clone(),
            settings(),
        )
        .start("req-12", origin(), destination())
        .unwrap();

        let mut watcher = handle.subscribe();
        watcher.wait_for(|s| s.has_arrived).await.unwrap();
        handle.cancel().await.unwrap();

        assert_eq!(
            reporter.inner.calls(),
            vec![("req-12".to_string(), CollectionStatus::InProgress)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_surfaces_report_failure() {
        let handle = TrackingPoller::new(ScriptedSource::new(vec![]), RejectingReporter, settings())
            .start("req-13", origin(), destination())
            .unwrap();
        let watcher = handle.subscribe();

        assert!(matches!(handle.cancel().await, Err(Error::Gateway(_))));
        assert_eq!(watcher.borrow().phase, TrackingPhase::Stopped);
    }
}
