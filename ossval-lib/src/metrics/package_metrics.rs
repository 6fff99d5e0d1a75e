use super::{LexicalComplexity, LineMetrics, MaintainabilityIndex, RevisionHistory, StructuralComplexity};
use serde::{Deserialize, Serialize};

/// All metrics gathered for one package. Any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PackageMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<LineMetrics>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub structural: Option<StructuralComplexity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lexical: Option<LexicalComplexity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<RevisionHistory>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintainability: Option<MaintainabilityIndex>,
}

impl PackageMetrics {
    /// Whether any analyzer produced a result.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.lines.is_none() && self.structural.is_none() && self.lexical.is_none() && self.history.is_none()
    }

    #[must_use]
    pub fn code_lines(&self) -> u64 {
        self.lines.as_ref().map_or(0, |l| l.code_lines)
    }
}
