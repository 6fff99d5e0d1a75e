use crate::Result;
use crate::facts::{Ecosystem, PackageSpec};
use crate::resolve::normalize_git_url;
use ohno::IntoAppError;
use serde::Deserialize;

#[derive(Deserialize)]
struct CargoLock {
    #[serde(default, rename = "package")]
    packages: Vec<LockedPackage>,
}

#[derive(Deserialize)]
struct LockedPackage {
    name: String,
    version: String,
    source: Option<String>,
}

/// Parse a `Cargo.lock`.
///
/// Packages without a `source` belong to the local workspace and are skipped. Git
/// sources carry their repository along.
pub fn parse(content: &str) -> Result<Vec<PackageSpec>> {
    let lock: CargoLock = toml::from_str(content).into_app_err("invalid Cargo.lock")?;

    Ok(lock
        .packages
        .into_iter()
        .filter_map(|package| {
            let source = package.source?;
            let spec = PackageSpec::new(package.name, Ecosystem::Cargo).with_version(package.version);

            Some(match source.strip_prefix("git+").and_then(normalize_git_url) {
                Some(url) => spec.with_repository(url),
                None => spec,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCK: &str = r#"
version = 4

[[package]]
name = "my-app"
version = "0.1.0"
dependencies = ["serde", "forked"]

[[package]]
name = "serde"
version = "1.0.228"
source = "registry+https://github.com/rust-lang/crates.io-index"
checksum = "0000000000000000000000000000000000000000000000000000000000000000"

[[package]]
name = "forked"
version = "0.3.0"
source = "git+https://github.com/acme/forked?branch=main#0123456789abcdef"
"#;

    #[test]
    fn test_registry_and_git_packages() {
        let packages = parse(LOCK).unwrap();
        assert_eq!(packages.len(), 2);

        assert_eq!(packages[0].name(), "serde");
        assert_eq!(packages[0].version(), Some("1.0.228"));
        assert_eq!(packages[0].ecosystem(), Ecosystem::Cargo);
        assert!(packages[0].repository().is_none());

        assert_eq!(packages[1].name(), "forked");
        assert_eq!(packages[1].repository().unwrap().as_str(), "https://github.com/acme/forked");
    }

    #[test]
    fn test_invalid_lockfile() {
        let _ = parse("[[package]\nname=").unwrap_err();
        assert!(parse("version = 4\n").unwrap().is_empty());
    }
}
