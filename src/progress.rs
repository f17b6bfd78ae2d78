//! Simulated progress for opaque remote calls, and the observer trait
//! through which the pipeline reports state changes.
//!
//! # Why simulate progress at all?
//!
//! The transcription call offers no progress channel: one request goes out,
//! one response comes back seconds later. Showing a frozen bar for that long
//! reads as a hang. The simulator emits a smooth, monotonically increasing
//! value that approaches (but never reaches) a ceiling while the call is
//! pending; when the real call resolves, the caller forces a final 100.
//!
//! # Cancellation contract
//!
//! The ticker is a spawned task that must stop on *both* exit paths of the
//! awaited call. [`ProgressSimulator`] aborts its task in `Drop`, so binding
//! the simulator to the await's scope guarantees cancellation even when the
//! call errors — an uncancelled ticker would keep emitting stale progress
//! after the run has logically moved on.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::trace;

use crate::state::ProcessingState;

/// Receives every progress value emitted by a [`ProgressSimulator`].
pub type ProgressSink = Arc<dyn Fn(u8) + Send + Sync>;

/// Receives pipeline state transitions.
///
/// The callback approach is the least-invasive integration point: callers can
/// forward states to a channel, a WebSocket, or a terminal progress bar
/// without the library knowing how the host application communicates. The
/// default implementation ignores everything, so observers override only what
/// they care about.
pub trait PipelineObserver: Send + Sync {
    /// Called after every state transition, including per-tick progress
    /// updates during transcription.
    fn on_state_change(&self, state: &ProcessingState) {
        let _ = state;
    }
}

/// A no-op observer for callers that don't need state events.
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// A cancellable ticker that emits asymptotic fake progress.
///
/// Each tick moves the current value 10% of the remaining distance to the
/// ceiling, so the emitted sequence rises quickly at first and flattens out,
/// never reaching the ceiling on its own. Call [`complete`](Self::complete)
/// when the real operation resolves to emit the final 100; dropping the
/// simulator instead (the failure path) cancels silently.
pub struct ProgressSimulator {
    handle: JoinHandle<()>,
    sink: ProgressSink,
}

impl ProgressSimulator {
    /// Spawn the ticker. The first value is emitted one `tick` after start.
    pub fn start(ceiling: f64, tick: Duration, sink: ProgressSink) -> Self {
        let task_sink = Arc::clone(&sink);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // An interval's first tick resolves immediately; consume it so
            // the sequence starts after one full period.
            interval.tick().await;
            let mut current = 0.0_f64;
            loop {
                interval.tick().await;
                current += (ceiling - current) * 0.1;
                let value = current.floor() as u8;
                trace!(value, "simulated progress tick");
                task_sink(value);
            }
        });
        Self { handle, sink }
    }

    /// Stop the ticker and emit the terminal 100.
    ///
    /// Aborting alone is not enough: a tick that has already passed its await
    /// point keeps running until the next one, so a slow sink invocation could
    /// land *after* the terminal value. Awaiting the aborted task first
    /// guarantees the ticker has fully wound down before 100 is emitted.
    pub async fn complete(mut self) {
        self.handle.abort();
        let _ = (&mut self.handle).await;
        (self.sink)(100);
    }
}

impl Drop for ProgressSimulator {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recording_sink() -> (ProgressSink, Arc<Mutex<Vec<u8>>>) {
        let values = Arc::new(Mutex::new(Vec::new()));
        let v = Arc::clone(&values);
        let sink: ProgressSink = Arc::new(move |p| v.lock().unwrap().push(p));
        (sink, values)
    }

    #[tokio::test(start_paused = true)]
    async fn values_are_monotone_and_bounded_below_ceiling() {
        let (sink, values) = recording_sink();
        let sim = ProgressSimulator::start(90.0, Duration::from_millis(300), sink);

        tokio::time::sleep(Duration::from_millis(300 * 20 + 10)).await;

        let snapshot = values.lock().unwrap().clone();
        assert!(snapshot.len() >= 10, "expected many ticks, got {snapshot:?}");
        for pair in snapshot.windows(2) {
            assert!(pair[0] <= pair[1], "not monotone: {snapshot:?}");
        }
        assert!(
            snapshot.iter().all(|&p| p < 90),
            "values must stay below the ceiling: {snapshot:?}"
        );
        drop(sim);
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_reaches_nine_percent_of_ceiling() {
        let (sink, values) = recording_sink();
        let _sim = ProgressSimulator::start(90.0, Duration::from_millis(300), sink);

        tokio::time::sleep(Duration::from_millis(310)).await;

        // 0 + (90 - 0) * 0.1 = 9.0 → floor 9
        assert_eq!(values.lock().unwrap().first().copied(), Some(9));
    }

    #[tokio::test(start_paused = true)]
    async fn complete_emits_exactly_one_hundred_then_silence() {
        let (sink, values) = recording_sink();
        let sim = ProgressSimulator::start(90.0, Duration::from_millis(300), sink);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        sim.complete().await;
        let len_at_completion = values.lock().unwrap().len();
        assert_eq!(values.lock().unwrap().last().copied(), Some(100));

        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(
            values.lock().unwrap().len(),
            len_at_completion,
            "no values may be emitted after completion"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn completing_before_the_first_tick_emits_only_one_hundred() {
        let (sink, values) = recording_sink();
        let sim = ProgressSimulator::start(90.0, Duration::from_millis(300), sink);

        sim.complete().await;
        tokio::time::sleep(Duration::from_millis(3000)).await;

        assert_eq!(*values.lock().unwrap(), vec![100]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn slow_sink_cannot_emit_after_forced_completion() {
        let values = Arc::new(Mutex::new(Vec::new()));
        let v = Arc::clone(&values);
        // A sink slow enough that a tick is usually mid-emission when the
        // forced completion arrives on the other worker thread.
        let sink: ProgressSink = Arc::new(move |p| {
            std::thread::sleep(Duration::from_millis(20));
            v.lock().unwrap().push(p);
        });
        let sim = ProgressSimulator::start(90.0, Duration::from_millis(5), sink);

        tokio::time::sleep(Duration::from_millis(30)).await;
        sim.complete().await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        let snapshot = values.lock().unwrap().clone();
        assert_eq!(snapshot.last().copied(), Some(100));
        assert_eq!(
            snapshot.iter().filter(|&&p| p == 100).count(),
            1,
            "exactly one terminal value, nothing after it: {snapshot:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_without_emitting_terminal_value() {
        let (sink, values) = recording_sink();
        let sim = ProgressSimulator::start(90.0, Duration::from_millis(300), sink);

        tokio::time::sleep(Duration::from_millis(700)).await;
        let len_before_drop = values.lock().unwrap().len();
        drop(sim);
        tokio::time::sleep(Duration::from_millis(3000)).await;

        let snapshot = values.lock().unwrap().clone();
        assert_eq!(snapshot.len(), len_before_drop);
        assert!(!snapshot.contains(&100));
    }
}
