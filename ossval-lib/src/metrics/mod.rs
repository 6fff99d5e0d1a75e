//! Metric records produced by the analyzers.
//!
//! Every record here is plain data: it serializes to and from the metrics cache and the
//! JSON report, and carries no behavior beyond deriving values from its own fields.
//!
//! - [`LineMetrics`]: size of a source tree, broken down by language
//! - [`StructuralComplexity`]: branching complexity across functions
//! - [`LexicalComplexity`]: Halstead operator/operand measures
//! - [`RevisionHistory`]: commit log statistics, including the bus factor
//! - [`MaintainabilityIndex`]: composite 0-100 score derived from the others

mod lexical;
mod line_metrics;
mod maintainability;
mod package_metrics;
mod revision_history;
mod structural;

pub use lexical::LexicalComplexity;
pub use line_metrics::LineMetrics;
pub use maintainability::{MaintainabilityIndex, MaintainabilityLevel};
pub use package_metrics::PackageMetrics;
pub use revision_history::RevisionHistory;
pub use structural::{ComplexityLevel, StructuralComplexity};
