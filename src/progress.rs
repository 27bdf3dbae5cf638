//! Progress reporting for long batch loops

/// Receives progress of a long-running stage
pub trait Progress {
    fn report(&self, stage: &str, done: usize, total: usize);
}

/// Reporting interval: every tenth of the total, at least every item
pub fn progress_step(total: usize) -> usize {
    (total / 10).max(1)
}

/// Logs at info level roughly every 10%
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl Progress for LogProgress {
    fn report(&self, stage: &str, done: usize, total: usize) {
        if done % progress_step(total) == 0 {
            log::info!("{} {}/{}...", stage, done, total);
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl Progress for SilentProgress {
    fn report(&self, _stage: &str, _done: usize, _total: usize) {}
}
