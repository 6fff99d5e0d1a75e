use crate::Result;
use crate::facts::{Ecosystem, PackageSpec};
use crate::resolve::normalize_git_url;
use ohno::IntoAppError;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageJson {
    #[serde(default)]
    dependencies: BTreeMap<String, String>,

    #[serde(default)]
    dev_dependencies: BTreeMap<String, String>,
}

/// Parse an npm `package.json`, reading `dependencies` then `devDependencies`.
///
/// Range operators are stripped from versions. Dependencies given as git URLs or
/// `owner/repo` shorthands carry that repository instead of a version.
pub fn parse(content: &str) -> Result<Vec<PackageSpec>> {
    let manifest: PackageJson = serde_json::from_str(content).into_app_err("invalid package.json")?;

    Ok(manifest
        .dependencies
        .iter()
        .chain(manifest.dev_dependencies.iter())
        .map(|(name, requirement)| to_spec(name, requirement))
        .collect())
}

fn to_spec(name: &str, requirement: &str) -> PackageSpec {
    let spec = PackageSpec::new(name, Ecosystem::Npm);

    if requirement.contains('/') || requirement.contains(':') {
        return match normalize_git_url(requirement) {
            Some(url) => spec.with_repository(url),
            None => spec,
        };
    }

    let version = requirement.trim().trim_start_matches(['^', '~', '=', '>', '<', 'v', ' ']);
    if version.is_empty() || version == "*" || version == "latest" || version.contains(' ') {
        spec
    } else {
        spec.with_version(version)
    }
}
