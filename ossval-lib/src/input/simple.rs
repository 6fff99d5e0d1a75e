use super::requirements::parse_requirement;
use crate::Result;
use crate::facts::{Ecosystem, PackageSpec};
use ohno::{IntoAppError, bail};
use url::Url;

/// Module path prefixes that identify Go modules.
const GO_HOSTS: &[&str] = &["github.com/", "gitlab.com/", "bitbucket.org/", "golang.org/", "gopkg.in/", "go.uber.org/", "google.golang.org/"];

/// Parse the simple one-package-per-line format.
///
/// Each line holds a package and, optionally, its repository URL separated by whitespace.
/// The ecosystem is inferred from the package's spelling:
///
/// - `name==1.0` (or another pip operator): PyPI
/// - `github.com/owner/repo@v1.2.3`: Go
/// - `name@1.0`, `@scope/name@1.0`: npm
/// - `group:artifact:1.0`: Maven
/// - `name`: unknown
pub fn parse(content: &str) -> Result<Vec<PackageSpec>> {
    let mut packages = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        let mut fields = line.split_whitespace();
        let Some(package) = fields.next() else {
            continue;
        };

        let Some(mut spec) = parse_package(package) else {
            bail!("line {}: could not understand package '{package}'", index + 1);
        };

        if let Some(url) = fields.next() {
            let url = Url::parse(url).into_app_err_with(|| format!("line {}: invalid repository URL '{url}'", index + 1))?;
            spec = spec.with_repository(url);
        }

        packages.push(spec);
    }

    Ok(packages)
}

fn parse_package(package: &str) -> Option<PackageSpec> {
    if package.contains("==") || package.contains(">=") || package.contains("~=") || package.contains("<=") {
        return parse_requirement(package);
    }

    if GO_HOSTS.iter().any(|host| package.starts_with(host)) {
        return Some(with_optional_version(package, Ecosystem::Go));
    }

    if package.contains('@') {
        return Some(with_optional_version(package, Ecosystem::Npm));
    }

    let parts: Vec<_> = package.split(':').collect();
    match parts.as_slice() {
        [group, artifact] if !group.is_empty() && !artifact.is_empty() => {
            return Some(PackageSpec::new(package, Ecosystem::Maven));
        }
        [group, artifact, version, ..] if !group.is_empty() && !artifact.is_empty() => {
            return Some(PackageSpec::new(format!("{group}:{artifact}"), Ecosystem::Maven).with_version(*version));
        }
        [_] => {}
        _ => return None,
    }

    Some(PackageSpec::new(package, Ecosystem::Unknown))
}

/// Split `name@version`, leaving a leading `@` (npm scopes) in the name.
fn with_optional_version(package: &str, ecosystem: Ecosystem) -> PackageSpec {
    match package.rsplit_once('@') {
        Some((name, version)) if !name.is_empty() && !version.is_empty() => PackageSpec::new(name, ecosystem).with_version(version),
        _ => PackageSpec::new(package, ecosystem),
    }
}
