//! Path helpers for the scratch and cache directories.

use super::RepoSpec;
use std::path::{Path, PathBuf};

/// Make a string safe to use as a single path component.
///
/// `..` sequences and characters that are reserved on common filesystems are replaced by `_`.
#[must_use]
pub fn sanitize_path_component(s: &str) -> String {
    s.replace("..", "__")
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Directory holding the checkout for a repository under the given root.
///
/// The path is unique per repository identity, so concurrently acquired repositories
/// never share a scratch directory.
#[must_use]
pub fn checkout_dir(root: &Path, repo: &RepoSpec) -> PathBuf {
    root.join(sanitize_path_component(repo.host()))
        .join(sanitize_path_component(repo.owner()))
        .join(sanitize_path_component(repo.repo()))
}
