use super::RepoSpec;
use crate::analyzers::AnalyzerKind;
use crate::estimate::{CostEstimate, ProjectType};
use crate::metrics::PackageMetrics;
use core::fmt::{Display, Formatter};
use core::time::Duration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{EnumIter, EnumString, IntoStaticStr};
use url::Url;

/// Package registry a dependency comes from.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize, strum::Display, EnumString, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Ecosystem {
    Cargo,
    Pypi,
    Npm,
    Maven,
    Go,
    #[default]
    Unknown,
}

/// Identity of one dependency as listed in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct PackageSpec {
    name: Arc<str>,
    ecosystem: Ecosystem,

    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<Arc<str>>,

    /// Repository given by the manifest itself, which takes precedence over registry lookup.
    #[serde(skip_serializing_if = "Option::is_none")]
    repository: Option<Url>,
}

impl PackageSpec {
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, ecosystem: Ecosystem) -> Self {
        Self {
            name: name.into(),
            ecosystem,
            version: None,
            repository: None,
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<Arc<str>>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_repository(mut self, repository: Url) -> Self {
        self.repository = Some(repository);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn ecosystem(&self) -> Ecosystem {
        self.ecosystem
    }

    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    #[must_use]
    pub const fn repository(&self) -> Option<&Url> {
        self.repository.as_ref()
    }
}

impl Display for PackageSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}:{}@{v}", self.ecosystem, self.name),
            None => write!(f, "{}:{}", self.ecosystem, self.name),
        }
    }
}

/// Overall outcome of analyzing one package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, strum::Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PackageStatus {
    /// Every stage succeeded.
    Ok,

    /// Source acquisition or an analyzer failed. The estimate rests on whatever was gathered.
    Partial,

    /// No usable repository, so nothing could be measured.
    Failed,
}

/// A per-package problem. Recorded on the package rather than aborting the batch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Failure {
    /// No repository could be found for the package.
    Resolution,

    /// The repository URL is not one we can work with.
    InvalidRepository(String),

    /// Cloning or updating the repository failed.
    Acquisition(String),

    /// Acquiring the repository took longer than allowed.
    Timeout(Duration),

    /// One analyzer failed; the others may still have produced results.
    Analyzer { analyzer: AnalyzerKind, reason: String },

    /// The analysis task itself failed.
    Internal(String),
}

impl Failure {
    /// Whether this failure leaves the package with no repository to work from.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Resolution | Self::InvalidRepository(_) | Self::Internal(_))
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Resolution => write!(f, "no repository found"),
            Self::InvalidRepository(reason) => write!(f, "invalid repository: {reason}"),
            Self::Acquisition(reason) => write!(f, "could not acquire source: {reason}"),
            Self::Timeout(limit) => write!(f, "source acquisition timed out after {}s", limit.as_secs()),
            Self::Analyzer { analyzer, reason } => write!(f, "{analyzer} analysis failed: {reason}"),
            Self::Internal(reason) => write!(f, "internal error: {reason}"),
        }
    }
}

/// Everything learned about one package during a batch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Package {
    #[serde(flatten)]
    pub spec: PackageSpec,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<RepoSpec>,

    pub project_type: ProjectType,
    pub metrics: PackageMetrics,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<CostEstimate>,

    pub status: PackageStatus,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<Failure>,
}

impl Package {
    #[must_use]
    pub fn new(spec: PackageSpec) -> Self {
        Self {
            spec,
            repo: None,
            project_type: ProjectType::default(),
            metrics: PackageMetrics::default(),
            estimate: None,
            status: PackageStatus::Ok,
            failures: Vec::new(),
        }
    }

    /// A package whose analysis could not run at all.
    #[must_use]
    pub fn failed(spec: PackageSpec, failure: Failure) -> Self {
        let mut package = Self::new(spec);
        package.fail(failure);
        package.update_status();
        package
    }

    pub fn fail(&mut self, failure: Failure) {
        self.failures.push(failure);
    }

    /// Derive the status from the recorded failures.
    ///
    /// Resolution and repository problems fail the package. Acquisition errors, timeouts,
    /// and analyzer errors only degrade it.
    pub fn update_status(&mut self) {
        self.status = if self.failures.is_empty() {
            PackageStatus::Ok
        } else if self.failures.iter().any(Failure::is_fatal) {
            PackageStatus::Failed
        } else {
            PackageStatus::Partial
        };
    }
}
