//! Report generation for batch results.
//!
//! - **Console**: a per-package table and summary, optionally colored
//! - **JSON**: the full [`BatchReport`](crate::facts::BatchReport), for programmatic use
//! - **CSV**: a package table and a summary table, for spreadsheets
//!
//! Generators write to any [`core::fmt::Write`], which keeps them independent of where
//! the output ends up.

mod common;
mod console;
mod csv;
mod json;

pub use console::{generate as generate_console, generate_estimate as generate_estimate_console};
pub use self::csv::{generate_packages as generate_csv_packages, generate_summary as generate_csv_summary};
pub use json::generate as generate_json;
