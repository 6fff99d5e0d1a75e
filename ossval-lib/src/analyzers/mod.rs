//! Metric extraction from an acquired source tree.
//!
//! The four cacheable analyzers are independent of each other. Each one reads the tree
//! through a shared [`SourceTree`], which scans the directory once and hands the file
//! list to every analyzer that asks for it. The maintainability index is derived from
//! their outputs and is never cached on its own.

pub mod history;
pub mod lexical;
pub mod lines;
pub mod maintainability;
mod python_syntax;
mod rust_syntax;
mod source_tree;
pub mod structural;

pub use history::{CommitLog, CommitLogSource, CommitRecord, GitCommitLog};
pub use source_tree::{Language, SourceFile, SourceTree};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

/// The analyzers whose results are cached per repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Display, EnumIter, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AnalyzerKind {
    Lines,
    Structural,
    Lexical,
    History,
}

impl AnalyzerKind {
    /// Bumped whenever the analyzer's output for the same tree could change, which
    /// invalidates previously cached results.
    #[must_use]
    pub const fn version(self) -> u32 {
        match self {
            Self::Lines | Self::History => 1,
            Self::Structural | Self::Lexical => 2,
        }
    }
}
