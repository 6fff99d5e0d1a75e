//! Command-line interface and orchestration for ossval
//!
//! This module parses arguments, loads configuration, and wires the library
//! components together for each subcommand.
//!
//! ## Commands
//!
//! - **analyze**: Read a manifest, value every package in it, and print a table or
//!   write a JSON report. Exits with status 1 if any package failed outright.
//! - **estimate**: Price a code base from a line count alone
//! - **cache**: Show or clear the on-disk metrics cache
//! - **formats**: List the manifest formats `analyze` understands
//!
//! ## Execution Flow
//!
//! The `run` function parses command-line arguments using clap and routes to the
//! handler. `analyze` then:
//!
//! 1. Initializes logging and loads `ossval.toml` (or the built-in defaults)
//! 2. Parses the manifest into package specs
//! 3. Locks the cache directory and builds the [`Collector`](crate::facts::Collector)
//! 4. Runs the batch and renders the report
//!
//! All output goes through [`Host`], so tests run the whole CLI in-process.

mod analyze;
mod cache;
mod common;
mod config;
mod estimate;
mod formats;
mod host;
mod progress_reporter;
mod run;

#[cfg(debug_assertions)]
pub use config::{Config, CostConfig};

pub use analyze::{AnalyzeArgs, analyze};
pub use cache::{CacheArgs, CacheCommand, cache};
pub use estimate::{EstimateArgs, estimate};
pub use formats::list_formats;
pub use host::Host;
pub use progress_reporter::ProgressReporter;
pub use run::run;
