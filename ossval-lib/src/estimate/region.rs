use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Labor markets with known developer compensation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize, Display, EnumString, EnumIter, IntoStaticStr,
    ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum Region {
    UsSf,
    UsNyc,
    UsSeattle,
    UsAustin,
    UsAverage,
    Canada,
    Uk,
    Germany,
    Netherlands,
    France,
    Switzerland,
    Poland,
    Ukraine,
    Israel,
    India,
    China,
    Japan,
    Australia,
    Brazil,
    #[default]
    GlobalAverage,
}

/// Annual developer compensation in a region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Salary {
    /// Median annual base salary in USD.
    pub base_salary: f64,

    /// Ratio of fully loaded cost (benefits, office, equipment, management) to base salary.
    pub overhead_multiplier: f64,
}

impl Region {
    #[must_use]
    pub const fn salary(self) -> Salary {
        let (base_salary, overhead_multiplier) = match self {
            Self::UsSf => (220_000.0, 2.3),
            Self::UsNyc => (200_000.0, 2.2),
            Self::UsSeattle => (195_000.0, 2.2),
            Self::UsAustin => (160_000.0, 2.1),
            Self::UsAverage => (140_000.0, 2.0),
            Self::Canada => (115_000.0, 1.9),
            Self::Uk => (105_000.0, 1.9),
            Self::Germany => (95_000.0, 2.0),
            Self::Netherlands => (90_000.0, 1.9),
            Self::France => (75_000.0, 2.1),
            Self::Switzerland => (150_000.0, 1.9),
            Self::Poland => (55_000.0, 1.7),
            Self::Ukraine => (45_000.0, 1.5),
            Self::Israel => (130_000.0, 1.9),
            Self::India => (30_000.0, 1.6),
            Self::China => (50_000.0, 1.7),
            Self::Japan => (75_000.0, 1.8),
            Self::Australia => (115_000.0, 1.9),
            Self::Brazil => (35_000.0, 1.8),
            Self::GlobalAverage => (80_000.0, 1.8),
        };

        Salary {
            base_salary,
            overhead_multiplier,
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::UsSf => "US (San Francisco)",
            Self::UsNyc => "US (New York)",
            Self::UsSeattle => "US (Seattle)",
            Self::UsAustin => "US (Austin)",
            Self::UsAverage => "US (average)",
            Self::Canada => "Canada",
            Self::Uk => "United Kingdom",
            Self::Germany => "Germany",
            Self::Netherlands => "Netherlands",
            Self::France => "France",
            Self::Switzerland => "Switzerland",
            Self::Poland => "Poland",
            Self::Ukraine => "Ukraine",
            Self::Israel => "Israel",
            Self::India => "India",
            Self::China => "China",
            Self::Japan => "Japan",
            Self::Australia => "Australia",
            Self::Brazil => "Brazil",
            Self::GlobalAverage => "Global average",
        }
    }

    /// Fully loaded cost of one developer for one month, in USD.
    #[must_use]
    pub fn monthly_rate(self) -> f64 {
        let salary = self.salary();
        salary.base_salary / 12.0 * salary.overhead_multiplier
    }
}
