use crate::metrics::{LexicalComplexity, LineMetrics, MaintainabilityIndex, MaintainabilityLevel, StructuralComplexity};

/// Lexical volume assumed per code line when no lexical measures exist.
const VOLUME_PER_LINE: f64 = 25.0;

/// Average complexity assumed when no structural measures exist.
const DEFAULT_COMPLEXITY: f64 = 5.0;

const RAW_MAXIMUM: f64 = 171.0;

/// Composite maintainability score from the other metrics.
///
/// Returns `None` only when there are no line metrics. A tree without code lines is
/// scored as a single line. Missing lexical or structural measures are replaced by
/// estimates.
#[must_use]
#[expect(clippy::cast_precision_loss, reason = "line counts are far below 2^52")]
pub fn compute(
    lines: Option<&LineMetrics>,
    lexical: Option<&LexicalComplexity>,
    structural: Option<&StructuralComplexity>,
) -> Option<MaintainabilityIndex> {
    let lines = lines?;
    let loc = (lines.code_lines as f64).max(1.0);
    let volume = lexical.map_or(loc * VOLUME_PER_LINE, |l| l.volume).max(1.0);
    let complexity = structural.map_or(DEFAULT_COMPLEXITY, |s| s.average);
    let comment_ratio = if lines.total_lines == 0 {
        0.0
    } else {
        lines.comment_lines as f64 / lines.total_lines as f64
    };

    let raw = RAW_MAXIMUM - 5.2 * volume.ln() - 0.23 * complexity - 16.2 * loc.ln() + 50.0 * (2.4 * comment_ratio).sqrt().sin();
    let value = (raw * 100.0 / RAW_MAXIMUM).clamp(0.0, 100.0);

    Some(MaintainabilityIndex {
        value,
        level: MaintainabilityLevel::from_value(value),
        comment_ratio,
        complexity_per_kloc: if lines.code_lines == 0 { 0.0 } else { complexity / loc * 1000.0 },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ComplexityLevel;

    fn lines(total: u64, code: u64, comment: u64) -> LineMetrics {
        LineMetrics {
            total_lines: total,
            code_lines: code,
            comment_lines: comment,
            blank_lines: total - code - comment,
            files_analyzed: 1,
            ..LineMetrics::default()
        }
    }

    fn structural(average: f64) -> StructuralComplexity {
        StructuralComplexity {
            average,
            maximum: 25,
            sum: 800,
            units_analyzed: 100,
            files_analyzed: 10,
            level: ComplexityLevel::from_average(average),
        }
    }

    #[test]
    fn test_lines_only_uses_defaults() {
        let mi = compute(Some(&lines(3000, 2500, 400)), None, None).unwrap();

        assert!((0.0..=100.0).contains(&mi.value));
        assert!((mi.comment_ratio - 400.0 / 3000.0).abs() < f64::EPSILON);
        assert!((mi.complexity_per_kloc - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_complexity_per_kloc() {
        let mi = compute(Some(&lines(5000, 4000, 800)), None, Some(&structural(16.0))).unwrap();
        assert!((mi.complexity_per_kloc - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_inputs() {
        let lexical = LexicalComplexity::from_counts(20, 30, 400, 600).unwrap();
        let mi = compute(Some(&lines(10_000, 8000, 1500)), Some(&lexical), Some(&structural(8.0))).unwrap();

        assert!((0.0..=100.0).contains(&mi.value));
        assert_eq!(mi.level, MaintainabilityLevel::from_value(mi.value));
    }

    #[test]
    fn test_small_well_commented_code_is_high() {
        let mi = compute(Some(&lines(100, 50, 40)), None, Some(&structural(1.0))).unwrap();
        assert_eq!(mi.level, MaintainabilityLevel::High);
    }

    #[test]
    fn test_value_is_clamped_at_zero() {
        let lexical = LexicalComplexity::from_counts(500, 5000, 10_000_000, 10_000_000).unwrap();
        let mi = compute(Some(&lines(5_000_000, 5_000_000, 0)), Some(&lexical), Some(&structural(200.0))).unwrap();

        assert!(mi.value.abs() < f64::EPSILON);
        assert_eq!(mi.level, MaintainabilityLevel::Low);
    }

    #[test]
    fn test_index_needs_line_metrics() {
        assert!(compute(None, None, None).is_none());
    }

    #[test]
    fn test_comment_only_tree_still_has_an_index() {
        let mi = compute(Some(&lines(10, 0, 5)), None, None).unwrap();

        assert!((mi.value - 100.0).abs() < f64::EPSILON);
        assert_eq!(mi.level, MaintainabilityLevel::High);
        assert!((mi.comment_ratio - 0.5).abs() < f64::EPSILON);
        assert!(mi.complexity_per_kloc.abs() < f64::EPSILON);
    }

    #[test]
    fn test_levels() {
        assert_eq!(MaintainabilityLevel::from_value(85.0), MaintainabilityLevel::High);
        assert_eq!(MaintainabilityLevel::from_value(20.0), MaintainabilityLevel::High);
        assert_eq!(MaintainabilityLevel::from_value(15.0), MaintainabilityLevel::Medium);
        assert_eq!(MaintainabilityLevel::from_value(5.0), MaintainabilityLevel::Low);
    }
}
