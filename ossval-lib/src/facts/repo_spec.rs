use crate::Result;
use core::fmt::{Display, Formatter};
use ohno::{IntoAppError, bail};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

/// Canonical identity of a source repository.
///
/// Two references to the same repository (with or without `.git`, with or without
/// a trailing `tree/<branch>/...` path) produce equal specs, which makes this type
/// usable both as a deduplication key for checkouts and as the repository half of
/// a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoSpec {
    url: Arc<Url>,
    host: Arc<str>,
    owner: Arc<str>,
    repo: Arc<str>,
}

impl RepoSpec {
    /// Parse a repository URL into its canonical form.
    ///
    /// Network URLs are reduced to `scheme://host/owner/repo`. Local `file://` URLs keep
    /// their full path, with the last two segments used as owner and repository name.
    pub fn parse(url: &Url) -> Result<Self> {
        if url.scheme() == "file" {
            return Self::parse_local(url);
        }

        let segments: Vec<_> = url.path_segments().map(Iterator::collect).unwrap_or_default();
        let (Some(owner), Some(repo)) = (segments.first().copied(), segments.get(1).copied()) else {
            bail!("invalid repository URL format: {url}");
        };

        let repo = repo.trim_end_matches(".git");
        if owner.is_empty() || repo.is_empty() {
            bail!("invalid repository URL: empty owner or repo name: {url}");
        }

        let Some(host) = url.host_str() else {
            bail!("invalid repository URL: missing host: {url}");
        };

        let scheme = match url.scheme() {
            "http" | "https" => url.scheme(),
            "git" | "ssh" | "git+https" | "git+ssh" => "https",
            other => bail!("unsupported repository URL scheme '{other}': {url}"),
        };

        let clean_url = Url::parse(&format!("{scheme}://{host}/{owner}/{repo}")).into_app_err("reconstructing repository URL")?;

        Ok(Self {
            host: Arc::from(host),
            owner: Arc::from(owner),
            repo: Arc::from(repo),
            url: Arc::new(clean_url),
        })
    }

    fn parse_local(url: &Url) -> Result<Self> {
        let segments: Vec<_> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        let [.., owner, repo] = segments.as_slice() else {
            bail!("invalid local repository URL: {url}");
        };

        let repo = repo.trim_end_matches(".git");
        let mut clean_url = url.clone();
        clean_url.set_query(None);
        clean_url.set_fragment(None);

        Ok(Self {
            host: Arc::from("local"),
            owner: Arc::from(*owner),
            repo: Arc::from(repo),
            url: Arc::new(clean_url),
        })
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub fn repo(&self) -> &str {
        &self.repo
    }
}

impl Display for RepoSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.url)
    }
}
