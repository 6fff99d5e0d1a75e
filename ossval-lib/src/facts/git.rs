//! Thin wrapper over the `git` command line.

use crate::Result;
use core::time::Duration;
use ohno::{IntoAppError, bail};
use std::fs;
use std::path::Path;
use std::process::{Output, Stdio};
use tokio::process::Command;
use url::Url;

const LOG_TARGET: &str = "       git";

/// Hard limit on any single git invocation.
pub const GIT_TIMEOUT: Duration = Duration::from_mins(5);

/// Clone `repo_url` into `repo_path`, or bring an existing checkout up to date.
///
/// Clones are partial (`--filter=blob:none`): the whole commit graph is fetched but
/// only the blobs of the checked-out revision.
pub async fn sync_repo(repo_path: &Path, repo_url: &Url) -> Result<()> {
    let start_time = std::time::Instant::now();
    let path_str = repo_path.to_str().into_app_err("invalid UTF-8 in repository path")?;

    if !repo_path.exists() {
        if let Some(parent) = repo_path.parent() {
            fs::create_dir_all(parent).into_app_err_with(|| format!("could not create directory '{}'", parent.display()))?;
        }
        clone_repo(path_str, repo_url).await?;
    } else if !repo_path.join(".git").exists() {
        log::warn!(target: LOG_TARGET, "Checkout '{path_str}' has no .git directory, re-cloning");
        fs::remove_dir_all(repo_path).into_app_err_with(|| format!("could not remove stale checkout '{path_str}'"))?;
        clone_repo(path_str, repo_url).await?;
    } else {
        log::info!(target: LOG_TARGET, "Updating checkout of '{repo_url}'");
        let output = run_git(&["-C", path_str, "fetch", "origin", "--filter=blob:none", "--tags", "--prune", "--force"]).await?;

        let output = if output.status.success() {
            run_git(&["-C", path_str, "reset", "--hard", "origin/HEAD"]).await?
        } else {
            output
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            log::warn!(target: LOG_TARGET, "Could not update checkout ({}), re-cloning", stderr.trim());
            fs::remove_dir_all(repo_path).into_app_err_with(|| format!("could not remove stale checkout '{path_str}'"))?;
            clone_repo(path_str, repo_url).await?;
        }
    }

    log::debug!(target: LOG_TARGET, "Prepared checkout of '{repo_url}' in {:.3}s", start_time.elapsed().as_secs_f64());
    Ok(())
}

async fn clone_repo(repo_path: &str, repo_url: &Url) -> Result<()> {
    log::info!(target: LOG_TARGET, "Cloning '{repo_url}'");
    let output = run_git(&["clone", "--filter=blob:none", "--single-branch", repo_url.as_str(), repo_path]).await?;
    check_git_output(&output, "git clone")
}

pub fn check_git_output(output: &Output, operation: &str) -> Result<()> {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("{operation} failed: {}", stderr.trim());
    }
    Ok(())
}

/// Run git with the given arguments, killing it after [`GIT_TIMEOUT`].
pub async fn run_git(args: &[&str]) -> Result<Output> {
    let child = Command::new("git")
        .args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .into_app_err("could not spawn git command")?;

    match tokio::time::timeout(GIT_TIMEOUT, child.wait_with_output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(e).into_app_err_with(|| format!("'git {}' failed to run", args.join(" "))),
        Err(_) => bail!("'git {}' timed out after {} seconds", args.join(" "), GIT_TIMEOUT.as_secs()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn output(code: i32, stderr: &str) -> Output {
        use std::os::unix::process::ExitStatusExt;
        Output {
            status: std::process::ExitStatus::from_raw(code << 8),
            stdout: vec![],
            stderr: stderr.as_bytes().to_vec(),
        }
    }

    #[test]
    #[cfg(unix)]
    fn test_check_git_output() {
        check_git_output(&output(0, ""), "git clone").unwrap();

        let err = check_git_output(&output(128, "fatal: repository not found\n"), "git clone").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("git clone failed"));
        assert!(msg.contains("repository not found"));
    }
}
