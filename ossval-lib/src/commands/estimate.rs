use super::Host;
use super::common::ColorMode;
use super::config::Config;
use crate::Result;
use crate::estimate::{CostEstimator, Methodology, ProjectType, Region};
use crate::metrics::ComplexityLevel;
use crate::reports::generate_estimate_console;
use camino::Utf8PathBuf;
use clap::Args;
use std::io::Write;

#[derive(Args, Debug)]
pub struct EstimateArgs {
    /// Source lines of code, excluding blanks and comments
    #[arg(long, value_name = "N")]
    pub sloc: u64,

    /// Labor market used to price effort
    #[arg(long, value_name = "REGION")]
    pub region: Option<Region>,

    /// Kind of project being estimated
    #[arg(long = "type", value_name = "TYPE", default_value = "library")]
    pub project_type: ProjectType,

    /// Complexity band of the code, when known
    #[arg(long, value_name = "LEVEL")]
    pub complexity: Option<ComplexityLevel>,

    /// Parametric model: cocomo2 or sloccount
    #[arg(long, value_name = "MODEL")]
    pub methodology: Option<Methodology>,

    /// Path to configuration file (default is `ossval.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Control when to use colored output
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorMode,

    /// Print the estimate as JSON
    #[arg(long)]
    pub json: bool,
}

/// Price a code base from its line count alone.
pub fn estimate<H: Host>(host: &mut H, args: &EstimateArgs) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    let methodology = args.methodology.unwrap_or(config.methodology);
    let region = args.region.unwrap_or(config.region);

    let estimator = CostEstimator::new(config.cost_model(methodology));
    let estimate = estimator.estimate_lines(args.sloc, args.complexity, args.project_type, region);

    let text = if args.json {
        let mut text = serde_json::to_string_pretty(&estimate)?;
        text.push('\n');
        text
    } else {
        let mut text = String::new();
        generate_estimate_console(args.sloc, &estimate, args.color.for_stdout(), &mut text)?;
        text
    };

    let _ = write!(host.output(), "{text}");
    Ok(())
}
