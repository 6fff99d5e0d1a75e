use super::RepoSpec;
use super::git;
use crate::Result;
use crate::analyzers::SourceTree;
use futures::future::BoxFuture;
use std::path::Path;

/// Materializes a repository as a local source tree.
pub trait SourceAcquirer: Send + Sync {
    /// Make the repository available at `dest`, reusing whatever is already there when
    /// possible. `dest` is unique to `repo`.
    fn acquire<'a>(&'a self, repo: &'a RepoSpec, dest: &'a Path) -> BoxFuture<'a, Result<SourceTree>>;
}

/// Acquires repositories with partial `git` clones.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitAcquirer;

impl SourceAcquirer for GitAcquirer {
    fn acquire<'a>(&'a self, repo: &'a RepoSpec, dest: &'a Path) -> BoxFuture<'a, Result<SourceTree>> {
        Box::pin(async move {
            git::sync_repo(dest, repo.url()).await?;
            Ok(SourceTree::new(dest))
        })
    }
}
