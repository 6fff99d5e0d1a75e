use super::Package;

/// Receives updates as a batch analysis moves through its packages.
pub trait Progress: Send + Sync {
    /// A batch of `total` packages is starting.
    fn start(&self, total: u64);

    /// One package has been fully analyzed. Called from worker tasks, in completion order.
    fn package_done(&self, package: &Package);

    /// The batch is over; clear any indicator.
    fn finish(&self);
}

/// A [`Progress`] that reports nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn start(&self, _total: u64) {}
    fn package_done(&self, _package: &Package) {}
    fn finish(&self) {}
}
