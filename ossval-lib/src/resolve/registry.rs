use super::Resolver;
use super::git_url::{normalize_forge_url, normalize_git_url};
use super::http::resilient_get;
use crate::Result;
use crate::facts::Ecosystem;
use core::time::Duration;
use futures::future::BoxFuture;
use ohno::IntoAppError;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use url::Url;

const LOG_TARGET: &str = "  resolver";

pub const CRATES_IO_BASE_URL: &str = "https://crates.io";
pub const PYPI_BASE_URL: &str = "https://pypi.org";
pub const NPM_BASE_URL: &str = "https://registry.npmjs.org";

const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

/// `project_urls` keys that point at source code, in order of preference.
const PYPI_SOURCE_KEYS: &[&str] = &["source", "source code", "repository", "code", "github", "homepage", "home"];

/// Base URLs for the registries consulted by [`RegistryResolver`].
#[derive(Debug, Clone)]
pub struct RegistryEndpoints {
    pub crates_io: String,
    pub pypi: String,
    pub npm: String,
}

impl RegistryEndpoints {
    /// Point every registry at the same server, as done in tests.
    #[must_use]
    pub fn all(base_url: &str) -> Self {
        Self {
            crates_io: base_url.to_string(),
            pypi: base_url.to_string(),
            npm: base_url.to_string(),
        }
    }
}

impl Default for RegistryEndpoints {
    fn default() -> Self {
        Self {
            crates_io: CRATES_IO_BASE_URL.to_string(),
            pypi: PYPI_BASE_URL.to_string(),
            npm: NPM_BASE_URL.to_string(),
        }
    }
}

/// Finds repositories by asking the package registries.
#[derive(Debug, Clone)]
pub struct RegistryResolver {
    client: Client,
    endpoints: RegistryEndpoints,
    retry_delay: Duration,
}

impl RegistryResolver {
    pub fn new(endpoints: RegistryEndpoints) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("ossval/", env!("CARGO_PKG_VERSION")))
            .build()
            .into_app_err("unable to create HTTP client")?;

        Ok(Self {
            client,
            endpoints,
            retry_delay: RETRY_BASE_DELAY,
        })
    }

    /// Override the base delay between retries.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    async fn lookup(&self, name: &str, ecosystem: Ecosystem) -> Result<Option<Url>> {
        match ecosystem {
            Ecosystem::Cargo => self.lookup_crates_io(name).await,
            Ecosystem::Pypi => self.lookup_pypi(name).await,
            Ecosystem::Npm => self.lookup_npm(name).await,
            Ecosystem::Go => Ok(go_module_repository(name)),
            Ecosystem::Maven | Ecosystem::Unknown => Ok(None),
        }
    }

    async fn lookup_crates_io(&self, name: &str) -> Result<Option<Url>> {
        let url = format!("{}/api/v1/crates/{name}", self.endpoints.crates_io);
        let Some(resp) = self.fetch_json::<CratesIoResponse>(&url).await? else {
            return Ok(None);
        };

        Ok(resp
            .krate
            .repository
            .as_deref()
            .and_then(normalize_git_url)
            .or_else(|| resp.krate.homepage.as_deref().and_then(normalize_forge_url)))
    }

    async fn lookup_pypi(&self, name: &str) -> Result<Option<Url>> {
        let url = format!("{}/pypi/{name}/json", self.endpoints.pypi);
        let Some(resp) = self.fetch_json::<PypiResponse>(&url).await? else {
            return Ok(None);
        };

        let project_urls: HashMap<String, String> = resp
            .info
            .project_urls
            .unwrap_or_default()
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();

        Ok(PYPI_SOURCE_KEYS
            .iter()
            .filter_map(|key| project_urls.get(*key))
            .find_map(|value| normalize_forge_url(value))
            .or_else(|| resp.info.home_page.as_deref().and_then(normalize_forge_url)))
    }

    async fn lookup_npm(&self, name: &str) -> Result<Option<Url>> {
        let url = format!("{}/{name}", self.endpoints.npm);
        let Some(resp) = self.fetch_json::<NpmResponse>(&url).await? else {
            return Ok(None);
        };

        let repository = match resp.repository {
            Some(NpmRepository::Url(url) | NpmRepository::Object { url }) => normalize_git_url(&url),
            None => None,
        };

        Ok(repository.or_else(|| resp.homepage.as_deref().and_then(normalize_forge_url)))
    }

    /// Fetch and decode a JSON document. A 404 means the package is unknown to the registry.
    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        log::debug!(target: LOG_TARGET, "Querying '{url}'");
        let resp = resilient_get(&self.client, url, self.retry_delay).await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let resp = resp.error_for_status().into_app_err_with(|| format!("querying '{url}'"))?;
        let body = resp.json::<T>().await.into_app_err_with(|| format!("decoding response from '{url}'"))?;
        Ok(Some(body))
    }
}

impl Resolver for RegistryResolver {
    fn resolve<'a>(&'a self, name: &'a str, ecosystem: Ecosystem) -> BoxFuture<'a, Option<Url>> {
        Box::pin(async move {
            match self.lookup(name, ecosystem).await {
                Ok(Some(url)) => {
                    log::debug!(target: LOG_TARGET, "Resolved {ecosystem}:{name} to '{url}'");
                    Some(url)
                }
                Ok(None) => {
                    log::info!(target: LOG_TARGET, "No repository listed for {ecosystem}:{name}");
                    None
                }
                Err(e) => {
                    log::warn!(target: LOG_TARGET, "Could not resolve {ecosystem}:{name}: {e:#}");
                    None
                }
            }
        })
    }
}

/// Go module paths on well-known hosts name their repository directly.
fn go_module_repository(module: &str) -> Option<Url> {
    let mut parts = module.split('/');
    let (host, owner, repo) = (parts.next()?, parts.next()?, parts.next()?);
    match host {
        "github.com" | "gitlab.com" | "bitbucket.org" => normalize_git_url(&format!("https://{host}/{owner}/{repo}")),
        "golang.org" if owner == "x" => normalize_git_url(&format!("https://github.com/golang/{repo}")),
        _ => None,
    }
}

#[derive(Deserialize)]
struct CratesIoResponse {
    #[serde(rename = "crate")]
    krate: CratesIoCrate,
}

#[derive(Deserialize)]
struct CratesIoCrate {
    repository: Option<String>,
    homepage: Option<String>,
}

#[derive(Deserialize)]
struct PypiResponse {
    info: PypiInfo,
}

#[derive(Deserialize)]
struct PypiInfo {
    project_urls: Option<HashMap<String, String>>,
    home_page: Option<String>,
}

#[derive(Deserialize)]
struct NpmResponse {
    repository: Option<NpmRepository>,
    homepage: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NpmRepository {
    Url(String),
    Object { url: String },
}
