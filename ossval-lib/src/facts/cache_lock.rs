use crate::Result;
use fs4::fs_std::FileExt;
use ohno::IntoAppError;
use std::fs::{self, File, OpenOptions};
use std::path::Path;

const LOG_TARGET: &str = "     cache";

const LOCK_FILE: &str = "cache.lock";

/// Holds the cache directory lock until dropped.
#[derive(Debug)]
pub struct CacheLockGuard(File);

impl Drop for CacheLockGuard {
    fn drop(&mut self) {
        if let Err(e) = self.0.unlock() {
            log::warn!(target: LOG_TARGET, "Could not unlock cache: {e:#}");
        }
    }
}

/// Take an exclusive advisory lock on `cache_dir`, creating the directory if needed.
///
/// Waits for as long as another process holds the lock. Checkouts and metric entries
/// under the directory must only be touched while the guard is alive.
pub async fn acquire_cache_lock(cache_dir: &Path) -> Result<CacheLockGuard> {
    fs::create_dir_all(cache_dir).into_app_err_with(|| format!("could not create cache directory '{}'", cache_dir.display()))?;
    let lock_path = cache_dir.join(LOCK_FILE);

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)
        .into_app_err_with(|| format!("could not open cache lock file '{}'", lock_path.display()))?;

    let file = tokio::task::spawn_blocking(move || {
        file.lock_exclusive()
            .into_app_err_with(|| format!("could not lock cache at '{}'", lock_path.display()))?;
        log::debug!(target: LOG_TARGET, "Acquired cache lock at '{}'", lock_path.display());
        Ok::<_, ohno::AppError>(file)
    })
    .await
    .into_app_err("lock task panicked")??;

    Ok(CacheLockGuard(file))
}
