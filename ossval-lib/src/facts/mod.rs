//! The metrics-collection pipeline.
//!
//! Each dependency is described by a [`PackageSpec`]. The [`Collector`] resolves it to a
//! repository ([`RepoSpec`]), acquires the source through a [`SourceAcquirer`], runs the
//! analyzers that have no cached result, and turns the metrics into a cost estimate. The
//! outcome for each package is a [`Package`], carrying whatever metrics were gathered and
//! the [`Failure`]s that prevented the rest.
//!
//! Analyzer results are kept in a [`MetricsCache`] keyed by repository identity and
//! analyzer version, so repeated runs only do the work that is actually missing. A
//! process-wide lock file keeps concurrent runs from sharing a cache directory.

mod acquirer;
mod cache;
mod cache_lock;
mod collector;
pub(crate) mod git;
mod package;
mod path_utils;
mod progress;
mod repo_spec;

pub use acquirer::{GitAcquirer, SourceAcquirer};
pub use cache::{CacheInfo, MetricsCache, PendingEntry};
pub use cache_lock::{CacheLockGuard, acquire_cache_lock};
pub use collector::{BatchReport, BatchSummary, Collector, RunOptions};
pub use package::{Ecosystem, Failure, Package, PackageSpec, PackageStatus};
pub use path_utils::{checkout_dir, sanitize_path_component};
pub use progress::{NoProgress, Progress};
pub use repo_spec::RepoSpec;
