use super::LOG_TARGET;
use crate::Result;
use crate::facts::{Ecosystem, PackageSpec};
use ohno::{IntoAppError, bail};
use serde::Deserialize;
use url::Url;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Bom {
    bom_format: Option<String>,

    #[serde(default)]
    components: Vec<Component>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Component {
    #[serde(rename = "type")]
    kind: Option<String>,
    name: String,
    group: Option<String>,
    version: Option<String>,
    purl: Option<String>,

    #[serde(default)]
    external_references: Vec<ExternalReference>,

    #[serde(default)]
    components: Vec<Self>,
}

#[derive(Deserialize)]
struct ExternalReference {
    #[serde(rename = "type")]
    kind: String,
    url: String,
}

/// Whether a JSON document declares itself a `CycloneDX` BOM.
pub fn is_cyclonedx(content: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(content).is_ok_and(|v| v.get("bomFormat").and_then(|f| f.as_str()) == Some("CycloneDX"))
}

/// Parse a `CycloneDX` JSON BOM, including nested components.
///
/// Components of type `application` describe the product itself and are skipped.
pub fn parse(content: &str) -> Result<Vec<PackageSpec>> {
    let bom: Bom = serde_json::from_str(content).into_app_err("invalid CycloneDX document")?;

    if let Some(format) = &bom.bom_format
        && format != "CycloneDX"
    {
        bail!("unsupported BOM format '{format}'");
    }

    let mut packages = Vec::new();
    collect(&bom.components, &mut packages);
    Ok(packages)
}

fn collect(components: &[Component], packages: &mut Vec<PackageSpec>) {
    for component in components {
        if component.kind.as_deref() != Some("application") {
            packages.push(to_spec(component));
        }
        collect(&component.components, packages);
    }
}

fn to_spec(component: &Component) -> PackageSpec {
    let ecosystem = component.purl.as_deref().map_or(Ecosystem::Unknown, purl_ecosystem);

    let name = match (&component.group, ecosystem) {
        (Some(group), Ecosystem::Maven) if !group.is_empty() => format!("{group}:{}", component.name),
        (Some(group), Ecosystem::Npm | Ecosystem::Go) if !group.is_empty() => format!("{group}/{}", component.name),
        _ => component.name.clone(),
    };

    let mut spec = PackageSpec::new(name, ecosystem);
    if let Some(version) = &component.version {
        spec = spec.with_version(version.as_str());
    }

    let vcs = component.external_references.iter().find(|r| r.kind == "vcs");
    if let Some(reference) = vcs {
        match Url::parse(&reference.url) {
            Ok(url) => spec = spec.with_repository(url),
            Err(e) => log::debug!(target: LOG_TARGET, "Ignoring vcs reference '{}' of '{}': {e}", reference.url, component.name),
        }
    }

    spec
}

/// Map a package URL (`pkg:type/namespace/name@version`) to its ecosystem.
fn purl_ecosystem(purl: &str) -> Ecosystem {
    let kind = purl.strip_prefix("pkg:").and_then(|rest| rest.split('/').next()).unwrap_or_default();
    match kind.to_ascii_lowercase().as_str() {
        "cargo" => Ecosystem::Cargo,
        "pypi" => Ecosystem::Pypi,
        "npm" => Ecosystem::Npm,
        "maven" => Ecosystem::Maven,
        "golang" => Ecosystem::Go,
        _ => Ecosystem::Unknown,
    }
}
