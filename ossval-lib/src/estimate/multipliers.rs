//! Effort and salary multipliers derived from package metrics.

use super::ProjectType;
use crate::metrics::{ComplexityLevel, LexicalComplexity, RevisionHistory};
use serde::{Deserialize, Serialize};

/// Salary and effort premiums for a project category.
///
/// The effort premium is roughly the square root of the salary premium: specialized
/// domains raise pay more than they raise the amount of work.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ProjectTypeFactors {
    pub salary: f64,
    pub effort: f64,
}

impl ProjectTypeFactors {
    pub const NEUTRAL: Self = Self { salary: 1.0, effort: 1.0 };
}

#[must_use]
pub const fn default_project_type_factors(project_type: ProjectType) -> ProjectTypeFactors {
    let (salary, effort) = match project_type {
        ProjectType::Script => (0.7, 0.84),
        ProjectType::Library => (1.0, 1.0),
        ProjectType::Framework => (1.15, 1.07),
        ProjectType::Compiler | ProjectType::OperatingSystem => (1.5, 1.22),
        ProjectType::Database | ProjectType::MachineLearning => (1.4, 1.18),
        ProjectType::Cryptography => (1.6, 1.26),
        ProjectType::Networking | ProjectType::Scientific => (1.2, 1.10),
        ProjectType::Embedded => (1.25, 1.12),
        ProjectType::Graphics => (1.3, 1.14),
        ProjectType::Devtools => (1.1, 1.05),
    };

    ProjectTypeFactors { salary, effort }
}

/// Effort multiplier for a structural complexity band, 1.0 at [`ComplexityLevel::Moderate`].
#[must_use]
pub const fn default_complexity_multiplier(level: ComplexityLevel) -> f64 {
    match level {
        ComplexityLevel::Trivial => 0.7,
        ComplexityLevel::Simple => 0.9,
        ComplexityLevel::Moderate => 1.0,
        ComplexityLevel::Complex => 1.3,
        ComplexityLevel::VeryComplex => 1.7,
    }
}

pub const MATURITY_RANGE: (f64, f64) = (1.0, 2.5);
pub const LEXICAL_RANGE: (f64, f64) = (0.8, 1.8);

/// Difficulty at which the lexical multiplier is neutral.
const NEUTRAL_DIFFICULTY: f64 = 15.0;
const DIFFICULTY_SLOPE: f64 = 0.02;

/// Multiplier for the accumulated refinement of an older, busier project.
///
/// Each of age, commit count, and contributor count contributes a saturating term, so
/// the result rises strictly with each of them and approaches 2.5. Exactly 1.0 without
/// history.
#[must_use]
#[expect(clippy::cast_precision_loss, reason = "commit and contributor counts are far below 2^52")]
pub fn maturity_multiplier(history: Option<&RevisionHistory>) -> f64 {
    let Some(h) = history else {
        return 1.0;
    };

    let saturate = |value: f64, scale: f64| 1.0 - (-value.max(0.0) / scale).exp();

    let multiplier = 1.0
        + 0.6 * saturate(h.age_years, 5.0)
        + 0.5 * saturate(h.commit_count as f64, 5000.0)
        + 0.4 * saturate(h.contributor_count as f64, 50.0);

    multiplier.clamp(MATURITY_RANGE.0, MATURITY_RANGE.1)
}

/// Multiplier for how hard the code is to read, from its mean lexical difficulty.
///
/// Linear around a neutral difficulty of 15, saturating at both ends. Exactly 1.0
/// without lexical data.
#[must_use]
pub fn lexical_multiplier(lexical: Option<&LexicalComplexity>) -> f64 {
    lexical.map_or(1.0, |l| {
        (1.0 + (l.difficulty - NEUTRAL_DIFFICULTY) * DIFFICULTY_SLOPE).clamp(LEXICAL_RANGE.0, LEXICAL_RANGE.1)
    })
}
