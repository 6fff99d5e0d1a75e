//! Command dispatch logic for ossval

use super::{AnalyzeArgs, CacheArgs, EstimateArgs, analyze, cache, estimate, list_formats};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};
use std::io::Write;

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "ossval", version, author, long_about = None)]
#[command(about = "Estimate what it would cost to rebuild your open-source dependencies")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze every package in a manifest and estimate its replacement cost
    Analyze(Box<AnalyzeArgs>),
    /// Estimate replacement cost from a line count alone
    Estimate(Box<EstimateArgs>),
    /// Inspect or clear the metrics cache
    Cache(CacheArgs),
    /// List the supported manifest formats
    Formats,
}

/// Dispatch command-line arguments to the appropriate handler
///
/// Usage errors, `--help`, and `--version` are written to the host and end with the
/// exit code clap prescribes.
///
/// # Arguments
///
/// * `args` - An iterator of command-line arguments (typically from `std::env::args()`)
///
/// # Errors
///
/// Returns an error if the executed command fails
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            let rendered = e.render();
            if e.use_stderr() {
                let _ = write!(host.error(), "{rendered}");
            } else {
                let _ = write!(host.output(), "{rendered}");
            }
            host.exit(e.exit_code());
            return Ok(());
        }
    };

    match &cli.command {
        Command::Analyze(args) => analyze(host, args).await,
        Command::Estimate(args) => estimate(host, args),
        Command::Cache(args) => cache(host, args).await,
        Command::Formats => {
            list_formats(host);
            Ok(())
        }
    }
}
