use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Five ordered bands of average per-function complexity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize, Display, EnumString, EnumIter, IntoStaticStr, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum ComplexityLevel {
    Trivial,
    Simple,
    Moderate,
    Complex,
    VeryComplex,
}

impl ComplexityLevel {
    /// Band for an average per-unit complexity.
    #[must_use]
    pub fn from_average(average: f64) -> Self {
        match average {
            a if a <= 2.0 => Self::Trivial,
            a if a <= 5.0 => Self::Simple,
            a if a <= 10.0 => Self::Moderate,
            a if a <= 20.0 => Self::Complex,
            _ => Self::VeryComplex,
        }
    }
}

/// Aggregated branching complexity of the functions in a source tree.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StructuralComplexity {
    pub average: f64,
    pub maximum: u64,
    pub sum: u64,
    pub units_analyzed: u64,
    pub files_analyzed: u64,
    pub level: ComplexityLevel,
}

impl StructuralComplexity {
    /// Build the aggregate from per-unit complexities. Returns `None` when there are no units.
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "unit counts are far below 2^52")]
    pub fn from_units(units: &[u64], files_analyzed: u64) -> Option<Self> {
        let maximum = *units.iter().max()?;
        let sum: u64 = units.iter().sum();
        let average = sum as f64 / units.len() as f64;

        Some(Self {
            average,
            maximum,
            sum,
            units_analyzed: units.len() as u64,
            files_analyzed,
            level: ComplexityLevel::from_average(average),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_level_bands() {
        assert_eq!(ComplexityLevel::from_average(1.0), ComplexityLevel::Trivial);
        assert_eq!(ComplexityLevel::from_average(2.0), ComplexityLevel::Trivial);
        assert_eq!(ComplexityLevel::from_average(4.5), ComplexityLevel::Simple);
        assert_eq!(ComplexityLevel::from_average(10.0), ComplexityLevel::Moderate);
        assert_eq!(ComplexityLevel::from_average(15.0), ComplexityLevel::Complex);
        assert_eq!(ComplexityLevel::from_average(20.5), ComplexityLevel::VeryComplex);
    }

    #[test]
    fn test_level_is_monotone_in_average() {
        let mut previous = ComplexityLevel::Trivial;
        for tenth in 0..400 {
            let level = ComplexityLevel::from_average(f64::from(tenth) / 10.0);
            assert!(level >= previous);
            previous = level;
        }
    }

    #[test]
    fn test_level_string_values() {
        let names: Vec<&str> = ComplexityLevel::iter().map(Into::into).collect();
        assert_eq!(names, ["trivial", "simple", "moderate", "complex", "very_complex"]);
    }

    #[test]
    fn test_from_units() {
        let s = StructuralComplexity::from_units(&[1, 3, 8], 2).unwrap();
        assert_eq!(s.sum, 12);
        assert_eq!(s.maximum, 8);
        assert!((s.average - 4.0).abs() < f64::EPSILON);
        assert_eq!(s.level, ComplexityLevel::Simple);
        assert_eq!(s.units_analyzed, 3);
    }

    #[test]
    fn test_from_no_units() {
        assert!(StructuralComplexity::from_units(&[], 3).is_none());
    }

    #[test]
    fn test_cli_values_match_serialized_names() {
        for level in ComplexityLevel::iter() {
            assert_eq!(level.to_possible_value().unwrap().get_name(), level.to_string());
        }
        assert_eq!(ComplexityLevel::from_str("very_complex", false), Ok(ComplexityLevel::VeryComplex));
    }
}
