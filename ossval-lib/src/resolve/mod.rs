//! Mapping package names to source repositories.
//!
//! Manifests rarely say where a dependency's source lives. A [`Resolver`] fills the gap,
//! typically by asking the package's registry ([`RegistryResolver`]). Resolution is
//! best-effort: any failure reads as "no repository known", which the pipeline records
//! against the package.

mod git_url;
mod http;
mod registry;

pub use git_url::{normalize_forge_url, normalize_git_url};
pub use registry::{CRATES_IO_BASE_URL, NPM_BASE_URL, PYPI_BASE_URL, RegistryEndpoints, RegistryResolver};

use crate::facts::Ecosystem;
use futures::future::BoxFuture;
use url::Url;

/// Finds the repository that hosts a package's source.
pub trait Resolver: Send + Sync {
    /// Look up `name` in `ecosystem`. Returns `None` when no repository could be found.
    fn resolve<'a>(&'a self, name: &'a str, ecosystem: Ecosystem) -> BoxFuture<'a, Option<Url>>;
}
