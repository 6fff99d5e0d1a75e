use super::Host;
use super::common::{ColorMode, LogLevel, init_logging, progress_reporter, resolve_cache_dir};
use super::config::Config;
use crate::Result;
use crate::estimate::{CostEstimator, Methodology, ProjectType, Region};
use crate::facts::{BatchReport, Collector, GitAcquirer, MetricsCache, RunOptions, acquire_cache_lock};
use crate::input;
use crate::reports::{generate_console, generate_csv_packages, generate_csv_summary, generate_json};
use crate::resolve::{RegistryEndpoints, RegistryResolver};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use core::time::Duration;
use ohno::{IntoAppError, bail};
use std::fs;
use std::io::Write;
use std::sync::Arc;

const LOG_TARGET: &str = "   analyze";

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Manifest listing the packages to analyze (Cargo.lock, package.json, requirements.txt, CycloneDX JSON, or a plain list)
    #[arg(value_name = "FILE")]
    pub manifest: Utf8PathBuf,

    /// Labor market used to price effort
    #[arg(long, value_name = "REGION")]
    pub region: Option<Region>,

    /// Parametric model: cocomo2 or sloccount
    #[arg(long, value_name = "MODEL")]
    pub methodology: Option<Methodology>,

    /// Project type to use for every package instead of detecting one
    #[arg(long = "type", value_name = "TYPE")]
    pub project_type: Option<ProjectType>,

    /// Maximum number of packages analyzed at once
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Seconds allowed to clone or update one repository
    #[arg(long, value_name = "SECS")]
    pub acquire_timeout: Option<u64>,

    /// Only use cached metrics; never clone repositories
    #[arg(long)]
    pub no_clone: bool,

    /// Neither read nor write the metrics cache
    #[arg(long)]
    pub no_cache: bool,

    /// Directory where metrics and checkouts are cached
    #[arg(long, value_name = "PATH")]
    pub cache_dir: Option<Utf8PathBuf>,

    /// Path to configuration file (default is `ossval.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Control when to use colored output
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorMode,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none")]
    pub log_level: LogLevel,

    /// Write the full report to a JSON file instead of to the terminal
    #[arg(long, value_name = "PATH", help_heading = "Report Output")]
    pub json: Option<Utf8PathBuf>,

    /// Write `packages.csv` and `summary.csv` into this directory instead of to the terminal
    #[arg(long, value_name = "DIR", help_heading = "Report Output")]
    pub csv: Option<Utf8PathBuf>,
}

impl AnalyzeArgs {
    fn run_options(&self, config: &Config) -> Result<RunOptions> {
        let concurrency = self.concurrency.unwrap_or(config.concurrency);
        if concurrency == 0 {
            bail!("--concurrency must be at least 1");
        }

        Ok(RunOptions {
            concurrency,
            acquire_timeout: self.acquire_timeout.map_or_else(|| config.acquire_timeout(), Duration::from_secs),
            clone: !self.no_clone,
            region: self.region.unwrap_or(config.region),
            project_type: self.project_type,
        })
    }
}

/// Value every package in a manifest and report the results.
///
/// Sets exit status 1 when any package failed outright.
pub async fn analyze<H: Host>(host: &mut H, args: &AnalyzeArgs) -> Result<()> {
    init_logging(args.log_level);

    let config = Config::load(args.config.as_deref())?;
    let options = args.run_options(&config)?;
    let methodology = args.methodology.unwrap_or(config.methodology);

    let specs = input::load(&args.manifest)?;

    let cache_dir = resolve_cache_dir(args.cache_dir.as_deref())?;
    let _lock = acquire_cache_lock(&cache_dir).await?;

    let cache = if args.no_cache {
        MetricsCache::disabled()
    } else {
        MetricsCache::new(&cache_dir)
    };

    let resolver = RegistryResolver::new(RegistryEndpoints::default())?;
    let collector = Collector::new(
        Arc::new(resolver),
        Arc::new(GitAcquirer),
        cache,
        CostEstimator::new(config.cost_model(methodology)),
        cache_dir.join("checkouts"),
        Arc::new(progress_reporter(args.log_level, args.color)),
    );

    log::info!(
        target: LOG_TARGET,
        "Valuing {} package(s) with {} in region {}",
        specs.len(),
        methodology.label(),
        options.region
    );

    let report = collector.run(specs, &options).await;

    if let Some(path) = &args.json {
        let mut json = String::new();
        generate_json(&report, &mut json)?;
        fs::write(path, json).into_app_err_with(|| format!("writing JSON report to '{path}'"))?;
        let _ = writeln!(host.error(), "Wrote report for {} package(s) to '{path}'", report.summary.total_packages);
    }

    if let Some(dir) = &args.csv {
        let files = write_csv_reports(&report, dir)?;
        let _ = writeln!(host.error(), "Generated CSV files:");
        for file in files {
            let _ = writeln!(host.error(), "  {file}");
        }
    }

    if args.json.is_none() && args.csv.is_none() {
        let mut console = String::new();
        generate_console(&report, args.color.for_stdout(), &mut console)?;
        let _ = write!(host.output(), "{console}");
    }

    if report.summary.failed_packages > 0 {
        host.exit(1);
    }

    Ok(())
}

fn write_csv_reports(report: &BatchReport, dir: &Utf8Path) -> Result<[Utf8PathBuf; 2]> {
    fs::create_dir_all(dir).into_app_err_with(|| format!("creating CSV output directory '{dir}'"))?;

    let packages_path = dir.join("packages.csv");
    let mut packages = String::new();
    generate_csv_packages(report, &mut packages)?;
    fs::write(&packages_path, packages).into_app_err_with(|| format!("writing '{packages_path}'"))?;

    let summary_path = dir.join("summary.csv");
    let mut summary = String::new();
    generate_csv_summary(&report.summary, &mut summary)?;
    fs::write(&summary_path, summary).into_app_err_with(|| format!("writing '{summary_path}'"))?;

    log::debug!(target: LOG_TARGET, "Wrote CSV reports to '{dir}'");
    Ok([packages_path, summary_path])
}
