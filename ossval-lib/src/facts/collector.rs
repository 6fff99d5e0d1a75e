use super::acquirer::SourceAcquirer;
use super::cache::{MetricsCache, PendingEntry};
use super::package::{Failure, Package, PackageSpec, PackageStatus};
use super::path_utils::checkout_dir;
use super::progress::Progress;
use super::repo_spec::RepoSpec;
use crate::Result;
use crate::analyzers::{self, AnalyzerKind, CommitLogSource, GitCommitLog, SourceTree};
use crate::estimate::{CostEstimator, ProjectType, Region};
use crate::metrics::{LexicalComplexity, LineMetrics, RevisionHistory, StructuralComplexity};
use crate::resolve::Resolver;
use core::sync::atomic::{AtomicUsize, Ordering};
use core::time::Duration;
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};
use tokio::sync::OnceCell;
use tokio::task::spawn_blocking;

const LOG_TARGET: &str = " collector";

type CheckoutCell = Arc<OnceCell<Result<SourceTree, Failure>>>;

type CachedMetrics = (
    Option<Option<LineMetrics>>,
    Option<Option<StructuralComplexity>>,
    Option<Option<LexicalComplexity>>,
    Option<Option<RevisionHistory>>,
);

/// Knobs for a single batch run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Maximum number of packages analyzed at once.
    pub concurrency: usize,

    /// Time allowed to acquire one repository.
    pub acquire_timeout: Duration,

    /// When false, only cached metrics are used and nothing is cloned.
    pub clone: bool,

    pub region: Region,

    /// Forces a project type instead of detecting one per package.
    pub project_type: Option<ProjectType>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            acquire_timeout: Duration::from_mins(5),
            clone: true,
            region: Region::default(),
            project_type: None,
        }
    }
}

/// Aggregate figures over a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total_packages: usize,

    /// Packages that produced at least some metrics.
    pub analyzed_packages: usize,
    pub failed_packages: usize,
    pub partial_packages: usize,

    pub total_cost_usd: f64,
    pub total_cost_usd_low: f64,
    pub total_cost_usd_high: f64,
    pub total_effort_person_months: f64,
    pub region: Region,
}

impl BatchSummary {
    #[must_use]
    pub fn from_packages(packages: &[Package], region: Region) -> Self {
        let count = |status: PackageStatus| packages.iter().filter(|p| p.status == status).count();
        let estimates = || packages.iter().filter_map(|p| p.estimate.as_ref());

        Self {
            total_packages: packages.len(),
            analyzed_packages: packages.iter().filter(|p| !p.metrics.is_empty()).count(),
            failed_packages: count(PackageStatus::Failed),
            partial_packages: count(PackageStatus::Partial),
            total_cost_usd: estimates().map(|e| e.cost_usd).sum(),
            total_cost_usd_low: estimates().map(|e| e.cost_usd_low).sum(),
            total_cost_usd_high: estimates().map(|e| e.cost_usd_high).sum(),
            total_effort_person_months: estimates().map(|e| e.effort_person_months).sum(),
            region,
        }
    }
}

/// Result of a batch run. Packages appear in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub packages: Vec<Package>,
    pub summary: BatchSummary,
}

/// Runs the resolve, acquire, analyze, and estimate pipeline over a list of packages.
pub struct Collector {
    pipeline: Arc<Pipeline>,
}

#[derive(Clone)]
struct Pipeline {
    resolver: Arc<dyn Resolver>,
    acquirer: Arc<dyn SourceAcquirer>,
    commit_log: Arc<dyn CommitLogSource>,
    cache: MetricsCache,
    estimator: CostEstimator,
    checkout_root: PathBuf,
    progress: Arc<dyn Progress>,
}

/// State shared by the workers of one run.
struct RunState {
    options: RunOptions,
    checkouts: Mutex<HashMap<RepoSpec, CheckoutCell>>,
}

impl core::fmt::Debug for Collector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Collector")
            .field("cache", &self.pipeline.cache)
            .field("estimator", &self.pipeline.estimator)
            .field("checkout_root", &self.pipeline.checkout_root)
            .finish_non_exhaustive()
    }
}

impl Collector {
    /// Create a collector. Repositories are checked out under `checkout_root`.
    #[must_use]
    pub fn new(
        resolver: Arc<dyn Resolver>,
        acquirer: Arc<dyn SourceAcquirer>,
        cache: MetricsCache,
        estimator: CostEstimator,
        checkout_root: impl Into<PathBuf>,
        progress: Arc<dyn Progress>,
    ) -> Self {
        Self {
            pipeline: Arc::new(Pipeline {
                resolver,
                acquirer,
                commit_log: Arc::new(GitCommitLog),
                cache,
                estimator,
                checkout_root: checkout_root.into(),
                progress,
            }),
        }
    }

    /// Replace the source of commit logs, which defaults to the `git` CLI.
    #[must_use]
    pub fn with_commit_log_source(mut self, commit_log: Arc<dyn CommitLogSource>) -> Self {
        Arc::make_mut(&mut self.pipeline).commit_log = commit_log;
        self
    }

    /// Analyze every package, at most `options.concurrency` at a time.
    ///
    /// Per-package problems are recorded on the packages; this never fails as a whole.
    pub async fn run(&self, specs: Vec<PackageSpec>, options: &RunOptions) -> BatchReport {
        let specs: Arc<[PackageSpec]> = specs.into();
        let total = specs.len();
        let slots: Arc<[OnceLock<Package>]> = (0..total).map(|_| OnceLock::new()).collect();
        let cursor = Arc::new(AtomicUsize::new(0));
        let state = Arc::new(RunState {
            options: options.clone(),
            checkouts: Mutex::new(HashMap::new()),
        });

        self.pipeline.progress.start(total as u64);

        let workers = options.concurrency.max(1).min(total);
        log::info!(target: LOG_TARGET, "Analyzing {total} package(s) with {workers} worker(s)");

        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let pipeline = Arc::clone(&self.pipeline);
                let specs = Arc::clone(&specs);
                let slots = Arc::clone(&slots);
                let cursor = Arc::clone(&cursor);
                let state = Arc::clone(&state);

                tokio::spawn(async move {
                    loop {
                        let index = cursor.fetch_add(1, Ordering::Relaxed);
                        let (Some(spec), Some(slot)) = (specs.get(index), slots.get(index)) else {
                            break;
                        };

                        let package = pipeline.analyze(spec.clone(), &state).await;
                        pipeline.progress.package_done(&package);
                        let _ = slot.set(package);
                    }
                })
            })
            .collect();

        for result in join_all(handles).await {
            if let Err(e) = result {
                log::error!(target: LOG_TARGET, "Worker task failed: {e}");
            }
        }

        self.pipeline.progress.finish();

        let packages: Vec<_> = slots
            .iter()
            .zip(specs.iter())
            .map(|(slot, spec)| {
                slot.get().cloned().unwrap_or_else(|| {
                    let mut package = Package::new(spec.clone());
                    package.fail(Failure::Internal("analysis task terminated unexpectedly".into()));
                    self.pipeline.finish(package, options)
                })
            })
            .collect();

        let summary = BatchSummary::from_packages(&packages, options.region);
        BatchReport { packages, summary }
    }
}

impl Pipeline {
    async fn analyze(&self, spec: PackageSpec, state: &RunState) -> Package {
        let mut package = Package::new(spec);
        log::debug!(target: LOG_TARGET, "Analyzing {}", package.spec);

        let url = match package.spec.repository() {
            Some(url) => Some(url.clone()),
            None => self.resolver.resolve(package.spec.name(), package.spec.ecosystem()).await,
        };

        let Some(url) = url else {
            package.fail(Failure::Resolution);
            return self.finish(package, &state.options);
        };

        let repo = match RepoSpec::parse(&url) {
            Ok(repo) => repo,
            Err(e) => {
                package.fail(Failure::InvalidRepository(format!("{e:#}")));
                return self.finish(package, &state.options);
            }
        };
        package.repo = Some(repo.clone());

        let (mut lines, mut structural, mut lexical, mut history) = self.load_cached(&repo).await;

        let all_cached = lines.is_some() && structural.is_some() && lexical.is_some() && history.is_some();
        if all_cached {
            log::debug!(target: LOG_TARGET, "All metrics for '{repo}' found in cache");
        } else if !state.options.clone {
            log::info!(target: LOG_TARGET, "Skipping acquisition of '{repo}', cloning is disabled");
        } else {
            match self.checkout(&repo, state).await {
                Ok(tree) => {
                    let (l, s, x, h) = tokio::join!(
                        extract_if_missing(lines.as_ref(), || analyzers::lines::extract(&tree)),
                        extract_if_missing(structural.as_ref(), || analyzers::structural::extract(&tree)),
                        extract_if_missing(lexical.as_ref(), || analyzers::lexical::extract(&tree)),
                        extract_if_missing(history.as_ref(), || analyzers::history::extract(self.commit_log.as_ref(), tree.root())),
                    );

                    let pending: Vec<_> = [
                        self.record(&mut package, &repo, AnalyzerKind::Lines, l, &mut lines),
                        self.record(&mut package, &repo, AnalyzerKind::Structural, s, &mut structural),
                        self.record(&mut package, &repo, AnalyzerKind::Lexical, x, &mut lexical),
                        self.record(&mut package, &repo, AnalyzerKind::History, h, &mut history),
                    ]
                    .into_iter()
                    .flatten()
                    .collect();

                    write_cache_entries(pending).await;
                }
                Err(failure) => package.fail(failure),
            }
        }

        package.metrics.lines = lines.flatten();
        package.metrics.structural = structural.flatten();
        package.metrics.lexical = lexical.flatten();
        package.metrics.history = history.flatten();

        self.finish(package, &state.options)
    }

    /// Get the checkout for `repo`, acquiring it at most once per run.
    async fn checkout(&self, repo: &RepoSpec, state: &RunState) -> Result<SourceTree, Failure> {
        let cell = {
            let mut checkouts = state.checkouts.lock().expect("lock poisoned");
            Arc::clone(checkouts.entry(repo.clone()).or_default())
        };

        cell.get_or_init(|| self.acquire(repo, state.options.acquire_timeout)).await.clone()
    }

    async fn acquire(&self, repo: &RepoSpec, limit: Duration) -> Result<SourceTree, Failure> {
        let dest = checkout_dir(&self.checkout_root, repo);
        let start_time = std::time::Instant::now();

        match tokio::time::timeout(limit, self.acquirer.acquire(repo, &dest)).await {
            Ok(Ok(tree)) => {
                log::debug!(target: LOG_TARGET, "Acquired '{repo}' in {:.3}s", start_time.elapsed().as_secs_f64());
                Ok(tree)
            }
            Ok(Err(e)) => {
                log::warn!(target: LOG_TARGET, "Could not acquire '{repo}': {e:#}");
                Err(Failure::Acquisition(format!("{e:#}")))
            }
            Err(_) => {
                log::warn!(target: LOG_TARGET, "Acquiring '{repo}' timed out after {}s", limit.as_secs());
                Err(Failure::Timeout(limit))
            }
        }
    }

    /// Look up every analyzer's cached result on the blocking pool.
    async fn load_cached(&self, repo: &RepoSpec) -> CachedMetrics {
        let cache = self.cache.clone();
        let repo = repo.clone();

        spawn_blocking(move || {
            (
                cache.get::<Option<LineMetrics>>(&repo, AnalyzerKind::Lines),
                cache.get::<Option<StructuralComplexity>>(&repo, AnalyzerKind::Structural),
                cache.get::<Option<LexicalComplexity>>(&repo, AnalyzerKind::Lexical),
                cache.get::<Option<RevisionHistory>>(&repo, AnalyzerKind::History),
            )
        })
        .await
        .unwrap_or_else(|e| {
            log::warn!(target: LOG_TARGET, "Cache lookup task failed: {e:#}");
            (None, None, None, None)
        })
    }

    /// Record an analyzer outcome on the package, returning the cache entry to write.
    fn record<T: Serialize>(
        &self,
        package: &mut Package,
        repo: &RepoSpec,
        kind: AnalyzerKind,
        outcome: Option<Result<Option<T>>>,
        slot: &mut Option<Option<T>>,
    ) -> Option<PendingEntry> {
        match outcome {
            None => None,
            Some(Ok(value)) => {
                let entry = self.cache.prepare(repo, kind, &value).unwrap_or_else(|e| {
                    log::warn!(target: LOG_TARGET, "Could not cache {kind} metrics for '{repo}': {e:#}");
                    None
                });
                *slot = Some(value);
                entry
            }
            Some(Err(e)) => {
                log::warn!(target: LOG_TARGET, "{kind} analysis of '{repo}' failed: {e:#}");
                package.fail(Failure::Analyzer {
                    analyzer: kind,
                    reason: format!("{e:#}"),
                });
                None
            }
        }
    }

    /// Derive the maintainability index, project type, and estimate, then settle the status.
    fn finish(&self, mut package: Package, options: &RunOptions) -> Package {
        package.project_type = options.project_type.unwrap_or_else(|| {
            let detection = ProjectType::detect(package.spec.name(), package.repo.as_ref().map(RepoSpec::url));
            if !detection.keywords.is_empty() {
                log::debug!(
                    target: LOG_TARGET,
                    "Detected {} as {} from {:?}",
                    package.spec,
                    detection.project_type,
                    detection.keywords
                );
            }
            detection.project_type
        });

        let metrics = &mut package.metrics;
        metrics.maintainability =
            analyzers::maintainability::compute(metrics.lines.as_ref(), metrics.lexical.as_ref(), metrics.structural.as_ref());

        package.estimate = Some(self.estimator.estimate(&package.metrics, package.project_type, options.region));

        package.update_status();
        log::debug!(target: LOG_TARGET, "Finished {} with status {}", package.spec, package.status);
        package
    }
}

/// Write cache entries on the blocking pool. Failures are logged, never propagated.
async fn write_cache_entries(entries: Vec<PendingEntry>) {
    if entries.is_empty() {
        return;
    }

    let result = spawn_blocking(move || {
        for entry in entries {
            let path = entry.path().to_path_buf();
            if let Err(e) = entry.write() {
                log::warn!(target: LOG_TARGET, "Could not write cache entry '{}': {e:#}", path.display());
            }
        }
    })
    .await;

    if let Err(e) = result {
        log::warn!(target: LOG_TARGET, "Cache write task failed: {e:#}");
    }
}

/// Run `extract` unless a cached value is already available.
async fn extract_if_missing<T, Fut>(cached: Option<&Option<T>>, extract: impl FnOnce() -> Fut) -> Option<Result<Option<T>>>
where
    Fut: Future<Output = Result<Option<T>>>,
{
    if cached.is_some() {
        return None;
    }
    Some(extract().await)
}
