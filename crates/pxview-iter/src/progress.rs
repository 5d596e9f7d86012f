//! Progress reporting for long-running passes.

/// Progress callback for row and histogram passes.
///
/// Returning `false` asks the caller to stop; the operation then ends with
/// [`IterError::Cancelled`](crate::IterError::Cancelled).
pub trait ProgressMonitor {
    /// Called after each unit of work.
    ///
    /// # Arguments
    ///
    /// * `task` - Short name of the running operation
    /// * `done` - Units completed so far
    /// * `total` - Total units
    fn progress(&mut self, task: &str, done: u64, total: u64) -> bool;
}

impl<F: FnMut(&str, u64, u64) -> bool> ProgressMonitor for F {
    fn progress(&mut self, task: &str, done: u64, total: u64) -> bool {
        self(task, done, total)
    }
}

/// Monitor that ignores progress and never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressMonitor for NoProgress {
    fn progress(&mut self, _task: &str, _done: u64, _total: u64) -> bool {
        true
    }
}
