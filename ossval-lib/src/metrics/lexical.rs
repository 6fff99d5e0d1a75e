use serde::{Deserialize, Serialize};

/// Stroud number: elementary mental discriminations per second.
const STROUD_NUMBER: f64 = 18.0;

/// Volume per expected delivered defect.
const VOLUME_PER_DEFECT: f64 = 3000.0;

/// Halstead measures over operators and operands.
///
/// For a single file, the distinct and total counts come straight from the token stream
/// and `effort == difficulty * volume`. For a package, distinct counts are the size of the
/// union across files, totals together with volume, effort, time and defects are summed,
/// and difficulty is the mean of per-file difficulties.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LexicalComplexity {
    pub distinct_operators: u64,
    pub distinct_operands: u64,
    pub total_operators: u64,
    pub total_operands: u64,
    pub vocabulary: u64,
    pub length: u64,
    pub volume: f64,
    pub difficulty: f64,
    pub effort: f64,
    pub time_seconds: f64,
    pub estimated_defects: f64,
    pub files_analyzed: u64,
}

impl LexicalComplexity {
    /// Measures for one file. `None` when there are no operators or no operands.
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "token counts are far below 2^52")]
    pub fn from_counts(distinct_operators: u64, distinct_operands: u64, total_operators: u64, total_operands: u64) -> Option<Self> {
        if distinct_operators == 0 || distinct_operands == 0 {
            return None;
        }

        let vocabulary = distinct_operators + distinct_operands;
        let length = total_operators + total_operands;
        let volume = length as f64 * (vocabulary as f64).log2();
        let difficulty = (distinct_operators as f64 / 2.0) * (total_operands as f64 / distinct_operands as f64);

        let effort = difficulty * volume;

        Some(Self {
            distinct_operators,
            distinct_operands,
            total_operators,
            total_operands,
            vocabulary,
            length,
            volume,
            difficulty,
            effort,
            time_seconds: effort / STROUD_NUMBER,
            estimated_defects: volume / VOLUME_PER_DEFECT,
            files_analyzed: 1,
        })
    }

    /// Combine per-file measures into a package measure.
    ///
    /// `distinct_operators` and `distinct_operands` are the sizes of the unions of the
    /// per-file sets, which the caller tracks since they cannot be recovered from counts.
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "file counts are far below 2^52")]
    pub fn aggregate(files: &[Self], distinct_operators: u64, distinct_operands: u64) -> Option<Self> {
        if files.is_empty() {
            return None;
        }

        let total_operators = files.iter().map(|f| f.total_operators).sum();
        let total_operands = files.iter().map(|f| f.total_operands).sum();

        Some(Self {
            distinct_operators,
            distinct_operands,
            total_operators,
            total_operands,
            vocabulary: distinct_operators + distinct_operands,
            length: total_operators + total_operands,
            volume: files.iter().map(|f| f.volume).sum(),
            difficulty: files.iter().map(|f| f.difficulty).sum::<f64>() / files.len() as f64,
            effort: files.iter().map(|f| f.effort).sum(),
            time_seconds: files.iter().map(|f| f.time_seconds).sum(),
            estimated_defects: files.iter().map(|f| f.estimated_defects).sum(),
            files_analyzed: files.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_textbook_values() {
        // n1=4, n2=4, N1=8, N2=8
        let h = LexicalComplexity::from_counts(4, 4, 8, 8).unwrap();

        assert_eq!(h.vocabulary, 8);
        assert_eq!(h.length, 16);
        assert!((h.volume - 48.0).abs() < 1e-9);
        assert!((h.difficulty - 4.0).abs() < 1e-9);
        assert!((h.effort - 192.0).abs() < 1e-9);
    }

    #[test]
    fn test_derived_identities_hold_exactly() {
        let h = LexicalComplexity::from_counts(7, 13, 41, 57).unwrap();

        assert!(h.length >= h.vocabulary);
        assert_eq!(h.effort, h.difficulty * h.volume);
        assert_eq!(h.time_seconds, h.effort / 18.0);
        assert_eq!(h.estimated_defects, h.volume / 3000.0);
    }

    #[test]
    fn test_no_operators_or_operands_is_none() {
        assert!(LexicalComplexity::from_counts(0, 3, 0, 5).is_none());
        assert!(LexicalComplexity::from_counts(3, 0, 5, 0).is_none());
    }

    #[test]
    fn test_aggregate_sums_work_and_averages_difficulty() {
        let a = LexicalComplexity::from_counts(4, 4, 8, 8).unwrap();
        let b = LexicalComplexity::from_counts(2, 2, 2, 2).unwrap();
        let agg = LexicalComplexity::aggregate(&[a.clone(), b.clone()], 5, 5).unwrap();

        assert_eq!(agg.total_operators, 10);
        assert_eq!(agg.total_operands, 10);
        assert_eq!(agg.vocabulary, 10);
        assert_eq!(agg.length, 20);
        assert!((agg.volume - (a.volume + b.volume)).abs() < 1e-9);
        assert!((agg.difficulty - f64::midpoint(a.difficulty, b.difficulty)).abs() < 1e-9);
        assert!((agg.effort - (a.effort + b.effort)).abs() < 1e-9);
        assert!((agg.time_seconds - (a.time_seconds + b.time_seconds)).abs() < 1e-9);
        assert!((agg.estimated_defects - (a.estimated_defects + b.estimated_defects)).abs() < 1e-12);
        assert_eq!(agg.files_analyzed, 2);
    }

    #[test]
    fn test_aggregate_empty_is_none() {
        assert!(LexicalComplexity::aggregate(&[], 0, 0).is_none());
    }
}
