use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MaintainabilityLevel {
    Low,
    Medium,
    High,
}

impl MaintainabilityLevel {
    #[must_use]
    pub fn from_value(value: f64) -> Self {
        if value >= 20.0 {
            Self::High
        } else if value >= 10.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Composite maintainability score on a 0-100 scale.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MaintainabilityIndex {
    pub value: f64,
    pub level: MaintainabilityLevel,
    pub comment_ratio: f64,
    pub complexity_per_kloc: f64,
}
