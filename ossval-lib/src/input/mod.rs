//! Reading the list of dependencies to analyze.
//!
//! [`load`] picks a parser from the file name and, for JSON, the document itself:
//!
//! | Format | Recognized by |
//! |---|---|
//! | `Cargo.lock` | file name |
//! | npm `package.json` | file name |
//! | `CycloneDX` JSON | `*.cdx.json`, `bom.json`, or `"bomFormat": "CycloneDX"` |
//! | pip requirements | `requirements*.txt` |
//! | simple text | anything else |

mod cargo_lock;
mod cyclonedx;
mod package_json;
mod requirements;
mod simple;

use crate::Result;
use crate::facts::PackageSpec;
use ohno::{EnrichableExt, IntoAppError, bail};
use serde::Serialize;
use std::fs;
use std::path::Path;
use strum::{EnumIter, IntoStaticStr};

const LOG_TARGET: &str = "     input";

/// A supported manifest format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, EnumIter, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Format {
    CargoLock,
    PackageJson,
    CycloneDx,
    Requirements,
    Simple,
}

impl Format {
    /// One-line description used by `ossval formats`.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::CargoLock => "Cargo.lock lockfile; registry and git packages",
            Self::PackageJson => "npm package.json; dependencies and devDependencies",
            Self::CycloneDx => "CycloneDX JSON SBOM (*.cdx.json, bom.json); ecosystem from purl",
            Self::Requirements => "pip requirements*.txt; option lines and markers ignored",
            Self::Simple => "one package per line: name==ver, name@ver, group:artifact:ver, module/path@ver, or name",
        }
    }

    /// Choose the format for a file, looking at the content only when the name is ambiguous.
    pub fn detect(path: &Path, content: &str) -> Result<Self> {
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_lowercase();

        let format = match file_name.as_str() {
            "cargo.lock" => Self::CargoLock,
            "package.json" => Self::PackageJson,
            "bom.json" => Self::CycloneDx,
            name if name.ends_with(".cdx.json") => Self::CycloneDx,
            name if name.ends_with(".json") => {
                if cyclonedx::is_cyclonedx(content) {
                    Self::CycloneDx
                } else {
                    bail!("unrecognized JSON manifest '{}'", path.display());
                }
            }
            name if name.starts_with("requirements") && name.ends_with(".txt") => Self::Requirements,
            _ => Self::Simple,
        };

        Ok(format)
    }

    /// Parse manifest text in this format.
    pub fn parse(self, content: &str) -> Result<Vec<PackageSpec>> {
        match self {
            Self::CargoLock => cargo_lock::parse(content),
            Self::PackageJson => package_json::parse(content),
            Self::CycloneDx => cyclonedx::parse(content),
            Self::Requirements => requirements::parse(content),
            Self::Simple => simple::parse(content),
        }
    }
}

/// Read the packages listed in a manifest file.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<PackageSpec>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).into_app_err_with(|| format!("could not read manifest '{}'", path.display()))?;

    let format = Format::detect(path, &content)?;
    let packages = format
        .parse(&content)
        .map_err(|e| e.enrich_with(|| format!("could not parse '{}' as {format}", path.display())))?;

    log::info!(target: LOG_TARGET, "Read {} package(s) from '{}' ({format})", packages.len(), path.display());
    Ok(packages)
}
