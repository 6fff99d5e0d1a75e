use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Line counts for a source tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LineMetrics {
    pub total_lines: u64,
    pub code_lines: u64,
    pub comment_lines: u64,
    pub blank_lines: u64,
    pub files_analyzed: u64,

    /// Code lines per language tag.
    pub by_language: BTreeMap<String, u64>,
}

impl LineMetrics {
    /// Thousands of code lines.
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "line counts are far below 2^52")]
    pub fn ksloc(&self) -> f64 {
        self.code_lines as f64 / 1000.0
    }

    /// Fold the counts of another tree or file into this one.
    pub fn merge(&mut self, other: &Self) {
        self.total_lines += other.total_lines;
        self.code_lines += other.code_lines;
        self.comment_lines += other.comment_lines;
        self.blank_lines += other.blank_lines;
        self.files_analyzed += other.files_analyzed;

        for (lang, lines) in &other.by_language {
            *self.by_language.entry(lang.clone()).or_default() += lines;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_sums_counts_and_languages() {
        let mut a = LineMetrics {
            total_lines: 10,
            code_lines: 7,
            comment_lines: 2,
            blank_lines: 1,
            files_analyzed: 1,
            by_language: BTreeMap::from([("rust".to_string(), 7)]),
        };
        let b = LineMetrics {
            total_lines: 5,
            code_lines: 4,
            comment_lines: 0,
            blank_lines: 1,
            files_analyzed: 1,
            by_language: BTreeMap::from([("rust".to_string(), 1), ("python".to_string(), 3)]),
        };

        a.merge(&b);

        assert_eq!(a.total_lines, 15);
        assert_eq!(a.code_lines, 11);
        assert_eq!(a.files_analyzed, 2);
        assert_eq!(a.by_language["rust"], 8);
        assert_eq!(a.by_language["python"], 3);
    }

    #[test]
    fn test_ksloc() {
        let m = LineMetrics { code_lines: 2500, ..LineMetrics::default() };
        assert!((m.ksloc() - 2.5).abs() < f64::EPSILON);
    }
}
