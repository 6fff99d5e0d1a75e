#![doc(hidden)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for ossval
//!
//! This library consolidates all functionality for the ossval tool, which estimates
//! what it would cost to rebuild a project's open-source dependencies.
//!
//! # Module Organization
//!
//! - [`commands`]: Command-line interface and orchestration
//! - [`input`]: Manifest parsing into package specs
//! - [`resolve`]: Package registry lookups for source repositories
//! - [`facts`]: Source acquisition, caching, and the batch collector
//! - [`analyzers`]: Per-repository metric extraction
//! - [`metrics`]: Metric types and the maintainability index
//! - [`estimate`]: The COCOMO-style cost model
//! - [`reports`]: Console and JSON report generation

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

#[cfg(any(debug_assertions, test))]
pub mod commands;
#[cfg(not(any(debug_assertions, test)))]
mod commands;

pub mod analyzers;
pub mod estimate;
pub mod facts;
pub mod input;
pub mod metrics;
pub mod reports;
pub mod resolve;

pub use crate::commands::{Host, run};
