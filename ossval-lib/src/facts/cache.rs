//! Durable per-repository cache of analyzer results.
//!
//! Each entry is one JSON file named after a SHA-256 digest of the repository URL and
//! the analyzer's kind and version. Writes go to a temporary file first and are renamed
//! into place, so a concurrent reader sees either the old entry or the new one and the
//! last writer wins.

use super::RepoSpec;
use crate::Result;
use crate::analyzers::AnalyzerKind;
use chrono::{DateTime, Utc};
use core::sync::atomic::{AtomicU64, Ordering};
use ohno::IntoAppError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

const LOG_TARGET: &str = "     cache";

const ENTRY_EXTENSION: &str = "json";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Deserialize, Serialize)]
struct Envelope<T> {
    analyzer: AnalyzerKind,
    analyzer_version: u32,
    repository: String,
    created_at: DateTime<Utc>,
    payload: T,
}

/// Size of the cache on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheInfo {
    pub entry_count: u64,
    pub total_bytes: u64,
}

/// Directory-backed JSON cache keyed by repository and analyzer.
#[derive(Debug, Clone)]
pub struct MetricsCache {
    dir: Option<PathBuf>,
}

impl MetricsCache {
    /// A cache whose entries live under `<cache_dir>/metrics`.
    #[must_use]
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            dir: Some(cache_dir.join("metrics")),
        }
    }

    /// A cache that never hits and never stores anything.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { dir: None }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    /// Lowercase hex SHA-256 of the repository URL, analyzer kind, and analyzer version.
    #[must_use]
    pub fn key(repo: &RepoSpec, kind: AnalyzerKind) -> String {
        let digest = Sha256::digest(format!("{}\n{kind}\n{}", repo.url(), kind.version()));
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }

    fn entry_path(dir: &Path, repo: &RepoSpec, kind: AnalyzerKind) -> PathBuf {
        dir.join(Self::key(repo, kind)).with_extension(ENTRY_EXTENSION)
    }

    /// Load a cached result. Missing, unreadable, or mismatched entries are misses.
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, repo: &RepoSpec, kind: AnalyzerKind) -> Option<T> {
        let dir = self.dir.as_ref()?;
        let path = Self::entry_path(dir, repo, kind);

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) => {
                log::debug!(target: LOG_TARGET, "Cache miss for {kind} of '{repo}': {e:#}");
                return None;
            }
        };

        let envelope: Envelope<T> = match serde_json::from_reader(BufReader::new(file)) {
            Ok(envelope) => envelope,
            Err(e) => {
                log::debug!(target: LOG_TARGET, "Ignoring corrupt cache entry '{}': {e:#}", path.display());
                return None;
            }
        };

        if envelope.analyzer != kind || envelope.analyzer_version != kind.version() || envelope.repository != repo.url().as_str() {
            log::debug!(target: LOG_TARGET, "Ignoring mismatched cache entry '{}'", path.display());
            return None;
        }

        log::debug!(target: LOG_TARGET, "Cache hit for {kind} of '{repo}' (created {})", envelope.created_at);
        Some(envelope.payload)
    }

    /// Store a result, replacing any previous entry atomically.
    pub fn put<T: Serialize>(&self, repo: &RepoSpec, kind: AnalyzerKind, payload: &T) -> Result<()> {
        match self.prepare(repo, kind, payload)? {
            Some(entry) => entry.write(),
            None => Ok(()),
        }
    }

    /// Serialize a result without touching the disk. `None` when the cache is disabled.
    ///
    /// The returned entry is written with [`PendingEntry::write`], typically from a
    /// blocking task.
    pub fn prepare<T: Serialize>(&self, repo: &RepoSpec, kind: AnalyzerKind, payload: &T) -> Result<Option<PendingEntry>> {
        let Some(dir) = &self.dir else {
            return Ok(None);
        };

        let envelope = Envelope {
            analyzer: kind,
            analyzer_version: kind.version(),
            repository: repo.url().to_string(),
            created_at: Utc::now(),
            payload,
        };

        let bytes = serde_json::to_vec(&envelope).into_app_err_with(|| format!("could not serialize {kind} metrics for '{repo}'"))?;
        Ok(Some(PendingEntry {
            dir: dir.clone(),
            path: Self::entry_path(dir, repo, kind),
            bytes,
        }))
    }

    /// Entry count and total size.
    pub fn info(&self) -> Result<CacheInfo> {
        let mut info = CacheInfo::default();
        for (_, len) in self.entries()? {
            info.entry_count += 1;
            info.total_bytes += len;
        }
        Ok(info)
    }

    /// Delete every entry, returning what was removed.
    pub fn clear(&self) -> Result<CacheInfo> {
        let mut info = CacheInfo::default();
        for (path, len) in self.entries()? {
            fs::remove_file(&path).into_app_err_with(|| format!("could not remove cache entry '{}'", path.display()))?;
            info.entry_count += 1;
            info.total_bytes += len;
        }

        log::info!(target: LOG_TARGET, "Removed {} cache entries ({} bytes)", info.entry_count, info.total_bytes);
        Ok(info)
    }

    fn entries(&self) -> Result<Vec<(PathBuf, u64)>> {
        let Some(dir) = &self.dir else {
            return Ok(Vec::new());
        };

        let read_dir = match fs::read_dir(dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).into_app_err_with(|| format!("could not read cache directory '{}'", dir.display())),
        };

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.into_app_err_with(|| format!("could not read cache directory '{}'", dir.display()))?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == ENTRY_EXTENSION) {
                let len = entry.metadata().map(|m| m.len()).unwrap_or(0);
                entries.push((path, len));
            }
        }

        Ok(entries)
    }
}

/// A serialized cache entry waiting to be written.
#[derive(Debug)]
pub struct PendingEntry {
    dir: PathBuf,
    path: PathBuf,
    bytes: Vec<u8>,
}

impl PendingEntry {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the entry through a temporary file and rename it into place. Blocks.
    pub fn write(self) -> Result<()> {
        fs::create_dir_all(&self.dir).into_app_err_with(|| format!("could not create directory '{}'", self.dir.display()))?;

        let temp = self.path.with_extension(format!(
            "tmp-{}-{}",
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        let result = write_bytes(&temp, &self.bytes).and_then(|()| {
            fs::rename(&temp, &self.path)
                .into_app_err_with(|| format!("could not move cache entry into place at '{}'", self.path.display()))
        });

        if result.is_err() {
            let _ = fs::remove_file(&temp);
        }

        result
    }
}

fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    let file = File::create(path).into_app_err_with(|| format!("could not create cache file '{}'", path.display()))?;
    let mut writer = BufWriter::new(file);

    writer
        .write_all(bytes)
        .into_app_err_with(|| format!("could not write cache file '{}'", path.display()))?;
    writer
        .flush()
        .into_app_err_with(|| format!("could not flush cache file '{}'", path.display()))
}
