use super::source_tree::{Language, SourceTree, analyze_files};
use super::{python_syntax, rust_syntax};
use crate::Result;
use crate::metrics::StructuralComplexity;

const LOG_TARGET: &str = "structural";

const LANGUAGES: &[Language] = &[Language::Rust, Language::Python];

/// Per-unit complexities for one file. `None` when the file does not parse.
#[must_use]
pub fn unit_complexities(language: Language, text: &str) -> Option<Vec<u64>> {
    match language {
        Language::Rust => rust_syntax::unit_complexities(text),
        Language::Python => python_syntax::unit_complexities(text),
        _ => None,
    }
}

/// Branching complexity across every function in the tree's Rust and Python files.
///
/// Returns `None` when no function could be analyzed.
pub async fn extract(tree: &SourceTree) -> Result<Option<StructuralComplexity>> {
    let files = tree.files_of(LANGUAGES).await?;
    if files.is_empty() {
        return Ok(None);
    }

    let per_file = analyze_files(files, |file, text| {
        let units = unit_complexities(file.language, text);
        if units.is_none() {
            log::debug!(target: LOG_TARGET, "Skipping '{}': does not parse", file.path.display());
        }
        units
    })
    .await;

    let files_analyzed = per_file.len() as u64;
    let units: Vec<u64> = per_file.into_iter().flatten().collect();
    let result = StructuralComplexity::from_units(&units, files_analyzed);

    if let Some(r) = &result {
        log::debug!(
            target: LOG_TARGET,
            "Average complexity {:.2} ({}) over {} units under '{}'",
            r.average,
            r.level,
            r.units_analyzed,
            tree.root().display()
        );
    }

    Ok(result)
}
