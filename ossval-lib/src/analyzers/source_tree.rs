use crate::Result;
use ohno::IntoAppError;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use strum::{Display, EnumIter, IntoStaticStr};
use tokio::sync::{OnceCell, Semaphore};
use tokio::task::spawn_blocking;
use walkdir::{DirEntry, WalkDir};

const LOG_TARGET: &str = "   scanner";

const MAX_FILES: usize = 50_000;
const MAX_FILE_SIZE: u64 = 5_000_000;
const MAX_DEPTH: usize = 50;

/// Directory names that never contain first-party source.
const SKIPPED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".mypy_cache",
    ".svn",
    ".tox",
    ".venv",
    "__pycache__",
    "bower_components",
    "build",
    "dist",
    "env",
    "node_modules",
    "site-packages",
    "target",
    "third_party",
    "vendor",
    "venv",
];

/// Languages recognized by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    C,
    Cpp,
    CSharp,
    Go,
    Haskell,
    Java,
    JavaScript,
    Kotlin,
    Lua,
    Php,
    Python,
    Ruby,
    Rust,
    Scala,
    Shell,
    Swift,
    TypeScript,
}

impl Language {
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Some(match ext {
            "c" | "h" => Self::C,
            "cc" | "cpp" | "cxx" | "hh" | "hpp" | "hxx" => Self::Cpp,
            "cs" => Self::CSharp,
            "go" => Self::Go,
            "hs" => Self::Haskell,
            "java" => Self::Java,
            "js" | "jsx" | "mjs" | "cjs" => Self::JavaScript,
            "kt" | "kts" => Self::Kotlin,
            "lua" => Self::Lua,
            "php" => Self::Php,
            "py" | "pyi" => Self::Python,
            "rb" => Self::Ruby,
            "rs" => Self::Rust,
            "scala" => Self::Scala,
            "sh" | "bash" | "zsh" => Self::Shell,
            "swift" => Self::Swift,
            "ts" | "tsx" | "mts" | "cts" => Self::TypeScript,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub language: Language,
}

/// Handle to a materialized source tree.
///
/// The file listing is computed on first use and shared by every analyzer that runs
/// over the same tree.
#[derive(Debug, Clone)]
pub struct SourceTree {
    root: Arc<Path>,
    files: Arc<OnceCell<Arc<[SourceFile]>>>,
}

impl SourceTree {
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: Arc::from(root.as_ref()),
            files: Arc::new(OnceCell::new()),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All recognized source files, excluding non-source directories.
    pub async fn files(&self) -> Result<Arc<[SourceFile]>> {
        self.files
            .get_or_try_init(|| {
                let root = Arc::clone(&self.root);
                async move {
                    spawn_blocking(move || scan(&root))
                        .await
                        .into_app_err("source scan task panicked")
                }
            })
            .await
            .cloned()
    }

    /// Files of the given languages only.
    pub async fn files_of(&self, languages: &[Language]) -> Result<Vec<SourceFile>> {
        Ok(self.files().await?.iter().filter(|f| languages.contains(&f.language)).cloned().collect())
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry.file_name().to_str().is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

fn scan(root: &Path) -> Arc<[SourceFile]> {
    let files: Vec<_> = WalkDir::new(root)
        .follow_links(false)
        .max_depth(MAX_DEPTH)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e))
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::debug!(target: LOG_TARGET, "Could not walk directory: {err:#}");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .filter_map(|entry| {
            let language = Language::from_path(entry.path())?;
            let len = entry.metadata().map(|m| m.len()).unwrap_or(u64::MAX);
            if len > MAX_FILE_SIZE {
                log::debug!(target: LOG_TARGET, "Skipping large file '{}' ({len} bytes)", entry.path().display());
                return None;
            }

            Some(SourceFile {
                path: entry.into_path(),
                language,
            })
        })
        .take(MAX_FILES)
        .collect();

    if files.len() == MAX_FILES {
        log::debug!(target: LOG_TARGET, "File count limit ({MAX_FILES}) reached in {}, some files were not scanned", root.display());
    }

    log::debug!(target: LOG_TARGET, "Found {} source files under '{}'", files.len(), root.display());
    files.into()
}

/// Run a per-file analysis over `files` in parallel on the blocking pool.
///
/// Files that cannot be read, or for which `analyze` returns `None`, are left out. The
/// output preserves the order of `files`.
pub async fn analyze_files<T, F>(files: Vec<SourceFile>, analyze: F) -> Vec<T>
where
    T: Send + 'static,
    F: Fn(&SourceFile, &str) -> Option<T> + Send + Sync + 'static,
{
    let analyze = Arc::new(analyze);
    let workers = std::thread::available_parallelism().map(core::num::NonZero::get).unwrap_or(4);
    let semaphore = Arc::new(Semaphore::new(workers));

    let mut tasks = Vec::with_capacity(files.len());
    for file in files {
        let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
            break;
        };
        let analyze = Arc::clone(&analyze);

        tasks.push(spawn_blocking(move || {
            let _permit = permit;
            match fs::read(&file.path) {
                Ok(bytes) => analyze(&file, &String::from_utf8_lossy(&bytes)),
                Err(e) => {
                    log::debug!(target: LOG_TARGET, "Could not read source file '{}', skipping: {e:#}", file.path.display());
                    None
                }
            }
        }));
    }

    let mut results = Vec::with_capacity(tasks.len());
    for task in futures_util::future::join_all(tasks).await {
        match task {
            Ok(Some(value)) => results.push(value),
            Ok(None) => {}
            Err(e) => log::warn!(target: LOG_TARGET, "File analysis task failed: {e:#}"),
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_language_from_extension() {
        assert_eq!(Language::from_path(Path::new("a/b.rs")), Some(Language::Rust));
        assert_eq!(Language::from_path(Path::new("x.pyi")), Some(Language::Python));
        assert_eq!(Language::from_path(Path::new("x.tsx")), Some(Language::TypeScript));
        assert_eq!(Language::from_path(Path::new("README.md")), None);
        assert_eq!(Language::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_language_tags() {
        assert_eq!(Language::JavaScript.to_string(), "javascript");
        assert_eq!(Language::CSharp.to_string(), "csharp");
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    async fn test_scan_skips_vendored_directories() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "src/lib.rs", "fn a() {}\n");
        write(tmp.path(), "pkg/mod.py", "x = 1\n");
        write(tmp.path(), "node_modules/dep/index.js", "var x;\n");
        write(tmp.path(), "vendor/x/y.go", "package y\n");
        write(tmp.path(), ".venv/lib/site.py", "y = 2\n");
        write(tmp.path(), "docs/readme.md", "# hi\n");

        let tree = SourceTree::new(tmp.path());
        let files = tree.files().await.unwrap();
        let mut names: Vec<_> = files
            .iter()
            .map(|f| f.path.strip_prefix(tmp.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        names.sort();

        assert_eq!(names, ["pkg/mod.py", "src/lib.rs"]);
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    async fn test_root_named_like_skipped_dir_is_still_scanned() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "build/main.rs", "fn main() {}\n");

        let tree = SourceTree::new(tmp.path().join("build"));
        assert_eq!(tree.files().await.unwrap().len(), 1);
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    async fn test_analyze_files_preserves_order_and_drops_none() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "a.py", "1");
        write(tmp.path(), "b.py", "22");
        write(tmp.path(), "c.py", "333");

        let tree = SourceTree::new(tmp.path());
        let files = tree.files_of(&[Language::Python]).await.unwrap();
        let lens = analyze_files(files, |_, text| (text.len() != 2).then_some(text.len())).await;

        assert_eq!(lens, [1, 3]);
    }
}
