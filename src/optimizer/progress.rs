use tracing::debug;

/// Observer notified between candidate evaluations
pub trait ProgressObserver {
    /// Called before candidate `index` (0-based) of `total` is simulated.
    fn on_candidate(&mut self, index: usize, total: usize, speed_kmh: f64);

    fn on_finished(&mut self, _succeeded: usize, _skipped: usize) {}
}

pub struct NoopProgress;

impl ProgressObserver for NoopProgress {
    fn on_candidate(&mut self, _index: usize, _total: usize, _speed_kmh: f64) {}
}

/// Emits one debug event per candidate
pub struct TracingProgress;

impl ProgressObserver for TracingProgress {
    fn on_candidate(&mut self, index: usize, total: usize, speed_kmh: f64) {
        let pct = (index + 1) as f64 / total.max(1) as f64 * 100.0;
        debug!(speed_kmh, index, total, progress_pct = pct, "evaluating candidate speed");
    }

    fn on_finished(&mut self, succeeded: usize, skipped: usize) {
        debug!(succeeded, skipped, "candidate evaluation finished");
    }
}

/// Records every notification, handy for tests and for UIs that poll
#[derive(Debug, Default)]
pub struct RecordingProgress {
    pub events: Vec<(usize, usize, f64)>,
    pub finished: Option<(usize, usize)>,
}

impl ProgressObserver for RecordingProgress {
    fn on_candidate(&mut self, index: usize, total: usize, speed_kmh: f64) {
        self.events.push((index, total, speed_kmh));
    }

    fn on_finished(&mut self, succeeded: usize, skipped: usize) {
        self.finished = Some((succeeded, skipped));
    }
}
