use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Statistics mined from a repository's full commit log.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RevisionHistory {
    pub commit_count: u64,
    pub contributor_count: u64,
    pub first_commit_at: DateTime<Utc>,
    pub last_commit_at: DateTime<Utc>,
    pub age_days: u64,
    pub age_years: f64,
    pub release_count: u64,
    pub commits_per_month: f64,
    pub avg_files_per_commit: f64,

    /// Files modified in more than ten commits.
    pub high_churn_files: u64,

    /// Smallest number of top authors that together made more than half of all commits.
    pub bus_factor: u64,
}
