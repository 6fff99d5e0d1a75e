use super::multipliers::{
    ProjectTypeFactors, default_complexity_multiplier, default_project_type_factors, lexical_multiplier, maturity_multiplier,
};
use super::{ProjectType, Region};
use crate::metrics::{ComplexityLevel, PackageMetrics};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Parametric model family used to turn size into effort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize, Display, EnumString, EnumIter, IntoStaticStr, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[value(rename_all = "lower")]
pub enum Methodology {
    #[default]
    Cocomo2,
    Sloccount,
}

impl Methodology {
    /// Human-readable name, as shown in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cocomo2 => "COCOMO II",
            Self::Sloccount => "SLOCCount",
        }
    }

    /// Default `(a, b)` calibration.
    #[must_use]
    pub const fn parameters(self) -> (f64, f64) {
        match self {
            Self::Cocomo2 => (2.94, 1.0997),
            Self::Sloccount => (2.4, 1.05),
        }
    }
}

/// Tunable parameters and lookup tables for the cost model.
#[derive(Debug, Clone, PartialEq)]
pub struct CostModel {
    pub methodology: Methodology,
    pub a: f64,
    pub b: f64,

    /// Effort adjustment factor applied on top of every derived multiplier.
    pub eaf: f64,

    /// Half-width of the low/high band as a fraction of the point estimate.
    pub range_fraction: f64,

    pub project_types: HashMap<ProjectType, ProjectTypeFactors>,
    pub complexity: HashMap<ComplexityLevel, f64>,
}

impl CostModel {
    /// The calibrated model for a methodology, with the standard tables.
    #[must_use]
    pub fn new(methodology: Methodology) -> Self {
        let (a, b) = methodology.parameters();
        Self {
            methodology,
            a,
            b,
            eaf: 1.0,
            range_fraction: 0.25,
            project_types: ProjectType::iter().map(|t| (t, default_project_type_factors(t))).collect(),
            complexity: ComplexityLevel::iter().map(|l| (l, default_complexity_multiplier(l))).collect(),
        }
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self::new(Methodology::default())
    }
}

/// Estimated cost and effort of rebuilding a package, with the factors that produced it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CostEstimate {
    pub cost_usd: f64,
    pub cost_usd_low: f64,
    pub cost_usd_high: f64,
    pub effort_person_months: f64,
    pub project_type_multiplier: f64,
    pub project_type_effort_multiplier: f64,
    pub complexity_multiplier: f64,
    pub maturity_multiplier: f64,
    pub lexical_multiplier: f64,
    pub confidence: f64,
    pub region: Region,
    pub methodology: Methodology,
}

impl CostEstimate {
    #[must_use]
    pub fn effort_person_years(&self) -> f64 {
        self.effort_person_months / 12.0
    }
}

const BASE_CONFIDENCE: f64 = 0.1;
const LINES_CONFIDENCE: f64 = 0.4;
const CATEGORY_CONFIDENCE: f64 = 0.2;

/// How much real data backs an estimate, in `[0, 1]`.
///
/// Line counts lift the base; each of structural, lexical, and history data adds a
/// fixed step on top.
#[must_use]
pub fn confidence(metrics: &PackageMetrics) -> f64 {
    let base = if metrics.lines.is_some() { LINES_CONFIDENCE } else { BASE_CONFIDENCE };
    let categories = [metrics.structural.is_some(), metrics.lexical.is_some(), metrics.history.is_some()];
    let extra: f64 = categories.iter().filter(|&&present| present).map(|_| CATEGORY_CONFIDENCE).sum();

    (base + extra).min(1.0)
}

/// Turns package metrics into a [`CostEstimate`].
#[derive(Debug, Clone, Default)]
pub struct CostEstimator {
    model: CostModel,
}

impl CostEstimator {
    #[must_use]
    pub const fn new(model: CostModel) -> Self {
        Self { model }
    }

    #[must_use]
    pub const fn model(&self) -> &CostModel {
        &self.model
    }

    /// Estimate a package from everything that was measured about it.
    #[must_use]
    pub fn estimate(&self, metrics: &PackageMetrics, project_type: ProjectType, region: Region) -> CostEstimate {
        let complexity = metrics
            .structural
            .as_ref()
            .map_or(1.0, |s| self.complexity_multiplier(s.level));

        self.compose(
            metrics.code_lines(),
            Factors {
                project_type: self.project_type_factors(project_type),
                complexity,
                maturity: maturity_multiplier(metrics.history.as_ref()),
                lexical: lexical_multiplier(metrics.lexical.as_ref()),
                confidence: confidence(metrics),
            },
            region,
        )
    }

    /// Estimate from a bare line count, as when no source is available to analyze.
    #[must_use]
    pub fn estimate_lines(&self, code_lines: u64, level: Option<ComplexityLevel>, project_type: ProjectType, region: Region) -> CostEstimate {
        self.compose(
            code_lines,
            Factors {
                project_type: self.project_type_factors(project_type),
                complexity: level.map_or(1.0, |l| self.complexity_multiplier(l)),
                maturity: 1.0,
                lexical: 1.0,
                confidence: if code_lines > 0 { LINES_CONFIDENCE } else { BASE_CONFIDENCE },
            },
            region,
        )
    }

    fn project_type_factors(&self, project_type: ProjectType) -> ProjectTypeFactors {
        self.model
            .project_types
            .get(&project_type)
            .copied()
            .unwrap_or(ProjectTypeFactors::NEUTRAL)
    }

    fn complexity_multiplier(&self, level: ComplexityLevel) -> f64 {
        self.model.complexity.get(&level).copied().unwrap_or(1.0)
    }

    #[expect(clippy::cast_precision_loss, reason = "line counts are far below 2^52")]
    fn compose(&self, code_lines: u64, factors: Factors, region: Region) -> CostEstimate {
        let m = &self.model;

        let (effort, cost) = if code_lines == 0 {
            (0.0, 0.0)
        } else {
            let ksloc = code_lines as f64 / 1000.0;
            let effort = m.a * ksloc.powf(m.b) * m.eaf * factors.project_type.effort * factors.complexity;

            // maturity and lexical difficulty scale cost only
            let cost = effort * region.monthly_rate() * factors.project_type.salary * factors.maturity * factors.lexical;
            (effort, cost)
        };

        CostEstimate {
            cost_usd: cost,
            cost_usd_low: cost * (1.0 - m.range_fraction),
            cost_usd_high: cost * (1.0 + m.range_fraction),
            effort_person_months: effort,
            project_type_multiplier: factors.project_type.salary,
            project_type_effort_multiplier: factors.project_type.effort,
            complexity_multiplier: factors.complexity,
            maturity_multiplier: factors.maturity,
            lexical_multiplier: factors.lexical,
            confidence: factors.confidence,
            region,
            methodology: m.methodology,
        }
    }
}

struct Factors {
    project_type: ProjectTypeFactors,
    complexity: f64,
    maturity: f64,
    lexical: f64,
    confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{LexicalComplexity, LineMetrics, RevisionHistory, StructuralComplexity};
    use chrono::{Duration, Utc};

    fn lines(code: u64) -> LineMetrics {
        LineMetrics {
            total_lines: code + code / 4,
            code_lines: code,
            comment_lines: code / 8,
            blank_lines: code / 8,
            files_analyzed: 10,
            ..LineMetrics::default()
        }
    }

    fn structural(average: f64) -> StructuralComplexity {
        StructuralComplexity {
            average,
            maximum: 40,
            sum: 1000,
            units_analyzed: 100,
            files_analyzed: 10,
            level: ComplexityLevel::from_average(average),
        }
    }

    fn history() -> RevisionHistory {
        let last = Utc::now();
        RevisionHistory {
            commit_count: 10_000,
            contributor_count: 50,
            first_commit_at: last - Duration::days(1825),
            last_commit_at: last,
            age_days: 1825,
            age_years: 5.0,
            release_count: 20,
            commits_per_month: 166.0,
            avg_files_per_commit: 3.0,
            high_churn_files: 30,
            bus_factor: 3,
        }
    }

    fn full_metrics(code: u64) -> PackageMetrics {
        PackageMetrics {
            lines: Some(lines(code)),
            structural: Some(structural(8.0)),
            lexical: LexicalComplexity::from_counts(40, 60, 3000, 4000),
            history: Some(history()),
            maintainability: None,
        }
    }

    #[test]
    fn test_ten_thousand_moderate_lines_in_san_francisco() {
        let metrics = PackageMetrics {
            lines: Some(lines(10_000)),
            structural: Some(structural(8.0)),
            ..PackageMetrics::default()
        };

        let e = CostEstimator::default().estimate(&metrics, ProjectType::Library, Region::UsSf);

        assert!(e.cost_usd > 0.0);
        assert_eq!(e.maturity_multiplier, 1.0);
        assert_eq!(e.lexical_multiplier, 1.0);
        assert_eq!(e.complexity_multiplier, 1.0);
        assert!(e.cost_usd_low < e.cost_usd && e.cost_usd < e.cost_usd_high);
        assert_eq!(e.methodology, Methodology::Cocomo2);
        assert_eq!(e.region, Region::UsSf);

        let expected_effort = 2.94 * 10.0_f64.powf(1.0997);
        assert!((e.effort_person_months - expected_effort).abs() < 1e-9);
        assert!((e.cost_usd - expected_effort * Region::UsSf.monthly_rate()).abs() < 1e-6);
    }

    #[test]
    fn test_zero_lines_short_circuit() {
        let estimator = CostEstimator::default();

        for metrics in [
            PackageMetrics::default(),
            PackageMetrics {
                lines: Some(lines(0)),
                ..full_metrics(0)
            },
        ] {
            let e = estimator.estimate(&metrics, ProjectType::Compiler, Region::UsSf);
            assert_eq!(e.cost_usd, 0.0);
            assert_eq!(e.cost_usd_low, 0.0);
            assert_eq!(e.cost_usd_high, 0.0);
            assert_eq!(e.effort_person_months, 0.0);
        }

        let e = estimator.estimate(&PackageMetrics::default(), ProjectType::Library, Region::UsSf);
        assert_eq!(e.maturity_multiplier, 1.0);
        assert_eq!(e.lexical_multiplier, 1.0);
    }

    #[test]
    fn test_bounds_hold_for_every_region_and_type() {
        use strum::IntoEnumIterator;

        let estimator = CostEstimator::default();
        let metrics = full_metrics(2500);
        for region in Region::iter() {
            for project_type in ProjectType::iter() {
                let e = estimator.estimate(&metrics, project_type, region);
                assert!(e.cost_usd_low < e.cost_usd && e.cost_usd < e.cost_usd_high, "{region} {project_type}");
            }
        }
    }

    #[test]
    fn test_mature_history_raises_cost() {
        let estimator = CostEstimator::default();
        let without = PackageMetrics {
            lines: Some(lines(8000)),
            ..PackageMetrics::default()
        };
        let with = PackageMetrics {
            history: Some(history()),
            ..without.clone()
        };

        let a = estimator.estimate(&without, ProjectType::Library, Region::UsSf);
        let b = estimator.estimate(&with, ProjectType::Library, Region::UsSf);

        assert!(b.maturity_multiplier > 1.0);
        assert!(b.cost_usd > a.cost_usd);
        assert!((b.cost_usd / a.cost_usd - b.maturity_multiplier).abs() < 1e-9);
        assert_eq!(b.effort_person_months, a.effort_person_months);
    }

    #[test]
    fn test_lexical_difficulty_scales_cost_not_effort() {
        let estimator = CostEstimator::default();
        let plain = PackageMetrics {
            lines: Some(lines(8000)),
            ..PackageMetrics::default()
        };
        let dense = PackageMetrics {
            lexical: LexicalComplexity::from_counts(40, 60, 3000, 4000),
            ..plain.clone()
        };

        let a = estimator.estimate(&plain, ProjectType::Library, Region::UsSf);
        let b = estimator.estimate(&dense, ProjectType::Library, Region::UsSf);

        assert_ne!(b.lexical_multiplier, 1.0);
        assert_eq!(b.effort_person_months, a.effort_person_months);
        assert!((b.cost_usd / a.cost_usd - b.lexical_multiplier).abs() < 1e-9);
    }

    #[test]
    fn test_project_type_scales_salary_and_effort() {
        let estimator = CostEstimator::default();
        let metrics = PackageMetrics {
            lines: Some(lines(8000)),
            ..PackageMetrics::default()
        };

        let lib = estimator.estimate(&metrics, ProjectType::Library, Region::Germany);
        let crypto = estimator.estimate(&metrics, ProjectType::Cryptography, Region::Germany);

        assert!((crypto.project_type_multiplier - 1.6).abs() < f64::EPSILON);
        assert!((crypto.effort_person_months / lib.effort_person_months - 1.26).abs() < 1e-9);
        assert!((crypto.cost_usd / lib.cost_usd - 1.6 * 1.26).abs() < 1e-9);
    }

    #[test]
    fn test_confidence() {
        assert!((confidence(&PackageMetrics::default()) - 0.1).abs() < 1e-9);

        let lines_only = PackageMetrics {
            lines: Some(lines(8000)),
            ..PackageMetrics::default()
        };
        assert!((confidence(&lines_only) - 0.4).abs() < 1e-9);

        let full = full_metrics(8000);
        assert!(confidence(&full) > confidence(&lines_only));
        assert!(confidence(&full) <= 1.0);
        assert!((confidence(&full) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_custom_model_and_methodology() {
        let metrics = PackageMetrics {
            lines: Some(lines(8000)),
            ..PackageMetrics::default()
        };

        let base = CostEstimator::default().estimate(&metrics, ProjectType::Library, Region::UsSf);

        let model = CostModel {
            eaf: 1.2,
            ..CostModel::default()
        };
        let adjusted = CostEstimator::new(model).estimate(&metrics, ProjectType::Library, Region::UsSf);
        assert!((adjusted.cost_usd / base.cost_usd - 1.2).abs() < 1e-9);

        let sloccount = CostEstimator::new(CostModel::new(Methodology::Sloccount)).estimate(&metrics, ProjectType::Library, Region::UsSf);
        assert_eq!(sloccount.methodology.label(), "SLOCCount");
        assert!(sloccount.cost_usd < base.cost_usd);
    }

    #[test]
    fn test_estimate_lines() {
        let e = CostEstimator::default().estimate_lines(10_000, Some(ComplexityLevel::Complex), ProjectType::Library, Region::UsSf);

        assert!((e.complexity_multiplier - 1.3).abs() < f64::EPSILON);
        assert!((e.confidence - 0.4).abs() < 1e-9);
        assert!(e.cost_usd > 0.0);
        assert!((e.effort_person_years() - e.effort_person_months / 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_methodology_cli_values() {
        for methodology in Methodology::iter() {
            assert_eq!(methodology.to_possible_value().unwrap().get_name(), methodology.to_string());
        }
        assert_eq!(Methodology::from_str("cocomo2", false), Ok(Methodology::Cocomo2));
        assert_eq!(Methodology::from_str("sloccount", false), Ok(Methodology::Sloccount));
    }
}
