//! Argument types and helpers shared between subcommands.

use super::ProgressReporter;
use crate::Result;
use camino::Utf8Path;
use clap::{Args, ValueEnum};
use directories::BaseDirs;
use ohno::IntoAppError;
use std::io::IsTerminal;
use std::path::PathBuf;

/// Color mode configuration for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Always use colors
    Always,

    /// Never use colors
    Never,

    /// Use colors if the output is a terminal, otherwise don't use colors
    Auto,
}

impl ColorMode {
    /// Whether to emit ANSI colors on a stream with the given terminal-ness.
    pub const fn use_colors(self, is_terminal: bool) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => is_terminal,
        }
    }

    pub fn for_stdout(self) -> bool {
        self.use_colors(std::io::stdout().is_terminal())
    }

    pub fn for_stderr(self) -> bool {
        self.use_colors(std::io::stderr().is_terminal())
    }
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

/// Arguments for commands that touch the cache directory.
#[derive(Args, Debug, Clone, Default)]
pub struct CacheDirArgs {
    /// Directory where metrics and checkouts are cached
    #[arg(long, value_name = "PATH")]
    pub cache_dir: Option<camino::Utf8PathBuf>,
}

impl CacheDirArgs {
    /// The requested directory, or the platform cache directory.
    pub fn resolve(&self) -> Result<PathBuf> {
        resolve_cache_dir(self.cache_dir.as_deref())
    }
}

/// The cache directory to use, defaulting to `<platform cache dir>/ossval`.
pub fn resolve_cache_dir(cache_dir: Option<&Utf8Path>) -> Result<PathBuf> {
    if let Some(path) = cache_dir {
        return Ok(path.as_std_path().to_path_buf());
    }

    Ok(BaseDirs::new()
        .into_app_err("could not determine cache directory")?
        .cache_dir()
        .join("ossval"))
}

/// Initialize logger based on log level.
///
/// Calling this more than once keeps the first logger.
pub fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .try_init();
}

/// A progress bar that stays hidden while log output is enabled.
pub fn progress_reporter(log_level: LogLevel, color: ColorMode) -> ProgressReporter {
    ProgressReporter::new(log_level == LogLevel::None, color.for_stderr())
}
