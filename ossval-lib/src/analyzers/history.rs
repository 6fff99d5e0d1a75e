//! Revision history statistics.
//!
//! Reading the log and computing statistics are separate steps: a [`CommitLogSource`]
//! produces a [`CommitLog`], and [`compute`] turns it into a [`RevisionHistory`] without
//! touching the filesystem.

use crate::Result;
use crate::facts::git::{check_git_output, run_git};
use crate::metrics::RevisionHistory;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use ohno::IntoAppError;
use std::collections::{HashMap, HashSet};
use std::path::Path;

const LOG_TARGET: &str = "   history";

/// A file counts as high-churn when more commits than this touched it.
const HIGH_CHURN_THRESHOLD: u64 = 10;

const DAYS_PER_YEAR: f64 = 365.25;
const DAYS_PER_MONTH: f64 = 30.44;

const RECORD_SEPARATOR: char = '\u{1e}';
const FIELD_SEPARATOR: char = '\u{1f}';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub author: String,
    pub timestamp: DateTime<Utc>,
    pub files: Vec<String>,
}

/// The full commit log of a repository, plus its tag count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitLog {
    pub commits: Vec<CommitRecord>,
    pub tag_count: u64,
}

/// Something that can produce the commit log for a source tree.
pub trait CommitLogSource: Send + Sync {
    /// Read the log for the tree at `root`. `Ok(None)` when the tree carries no history.
    fn read<'a>(&'a self, root: &'a Path) -> BoxFuture<'a, Result<Option<CommitLog>>>;
}

/// Reads history by running the `git` command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitCommitLog;

impl CommitLogSource for GitCommitLog {
    fn read<'a>(&'a self, root: &'a Path) -> BoxFuture<'a, Result<Option<CommitLog>>> {
        Box::pin(read_git_log(root))
    }
}

async fn read_git_log(root: &Path) -> Result<Option<CommitLog>> {
    if !root.join(".git").exists() {
        log::debug!(target: LOG_TARGET, "No git metadata under '{}'", root.display());
        return Ok(None);
    }

    let path_str = root.to_str().into_app_err("invalid UTF-8 in repository path")?;
    let format = format!("--format={RECORD_SEPARATOR}%ae{FIELD_SEPARATOR}%aI");

    let output = run_git(&["-C", path_str, "log", "--no-color", "--no-renames", &format, "--name-only"]).await?;
    if !output.status.success() && String::from_utf8_lossy(&output.stderr).contains("does not have any commits") {
        return Ok(Some(CommitLog::default()));
    }
    check_git_output(&output, "git log")?;

    let tags = run_git(&["-C", path_str, "tag", "--list"]).await?;
    check_git_output(&tags, "git tag")?;
    let tag_count = String::from_utf8_lossy(&tags.stdout).lines().filter(|l| !l.trim().is_empty()).count() as u64;

    let commits = tokio::task::spawn_blocking(move || parse_log(&String::from_utf8_lossy(&output.stdout)))
        .await??;

    Ok(Some(CommitLog { commits, tag_count }))
}

fn parse_log(text: &str) -> Result<Vec<CommitRecord>> {
    let mut commits = Vec::new();

    for record in text.split(RECORD_SEPARATOR).filter(|r| !r.trim().is_empty()) {
        let mut lines = record.lines();
        let header = lines.next().unwrap_or_default();
        let Some((author, date)) = header.split_once(FIELD_SEPARATOR) else {
            log::debug!(target: LOG_TARGET, "Ignoring malformed log header '{header}'");
            continue;
        };

        let timestamp = DateTime::parse_from_rfc3339(date.trim())
            .into_app_err_with(|| format!("could not parse commit date '{date}'"))?
            .with_timezone(&Utc);

        commits.push(CommitRecord {
            author: author.trim().to_lowercase(),
            timestamp,
            files: lines.map(str::trim).filter(|l| !l.is_empty()).map(str::to_string).collect(),
        });
    }

    Ok(commits)
}

/// Smallest number of top authors whose commits together exceed half of all commits.
///
/// Always at least 1.
#[must_use]
pub fn bus_factor(mut commits_per_author: Vec<u64>) -> u64 {
    commits_per_author.sort_unstable_by(|a, b| b.cmp(a));
    let total: u64 = commits_per_author.iter().sum();

    let mut cumulative = 0;
    let mut authors = 0;
    for commits in commits_per_author {
        cumulative += commits;
        authors += 1;
        if cumulative * 2 > total {
            break;
        }
    }

    authors.max(1)
}

/// Statistics for a commit log. `None` when the log has no commits.
#[must_use]
#[expect(clippy::cast_precision_loss, reason = "commit and day counts are far below 2^52")]
pub fn compute(log: &CommitLog) -> Option<RevisionHistory> {
    let first_commit_at = log.commits.iter().map(|c| c.timestamp).min()?;
    let last_commit_at = log.commits.iter().map(|c| c.timestamp).max()?;

    let mut per_author: HashMap<&str, u64> = HashMap::new();
    let mut per_file: HashMap<&str, u64> = HashMap::new();
    let mut file_touches = 0_u64;

    for commit in &log.commits {
        *per_author.entry(commit.author.as_str()).or_default() += 1;
        let unique: HashSet<&str> = commit.files.iter().map(String::as_str).collect();
        file_touches += unique.len() as u64;
        for file in unique {
            *per_file.entry(file).or_default() += 1;
        }
    }

    let commit_count = log.commits.len() as u64;
    let age_days = u64::try_from((last_commit_at - first_commit_at).num_days()).unwrap_or(0);
    let months = (age_days as f64 / DAYS_PER_MONTH).max(1.0);

    Some(RevisionHistory {
        commit_count,
        contributor_count: per_author.len() as u64,
        first_commit_at,
        last_commit_at,
        age_days,
        age_years: age_days as f64 / DAYS_PER_YEAR,
        release_count: log.tag_count,
        commits_per_month: commit_count as f64 / months,
        avg_files_per_commit: file_touches as f64 / commit_count as f64,
        high_churn_files: per_file.values().filter(|&&n| n > HIGH_CHURN_THRESHOLD).count() as u64,
        bus_factor: bus_factor(per_author.into_values().collect()),
    })
}

/// Read and summarize the history of the tree at `root`.
pub async fn extract(source: &dyn CommitLogSource, root: &Path) -> Result<Option<RevisionHistory>> {
    let Some(log) = source.read(root).await? else {
        return Ok(None);
    };

    let history = compute(&log);
    if let Some(h) = &history {
        log::debug!(
            target: LOG_TARGET,
            "{} commits by {} authors over {} days under '{}'",
            h.commit_count,
            h.contributor_count,
            h.age_days,
            root.display()
        );
    }

    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::process::Command;

    fn commit(author: &str, day: u32, files: &[&str]) -> CommitRecord {
        CommitRecord {
            author: author.to_string(),
            timestamp: Utc.with_ymd_and_hms(2020, 1, day, 12, 0, 0).unwrap(),
            files: files.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn test_bus_factor() {
        assert_eq!(bus_factor(vec![9, 1]), 1);
        assert_eq!(bus_factor(vec![5, 5]), 2);
        assert_eq!(bus_factor(vec![1, 1, 1, 1]), 3);
        assert_eq!(bus_factor(vec![]), 1);
    }

    #[test]
    fn test_compute_empty_log() {
        assert!(compute(&CommitLog::default()).is_none());
    }

    #[test]
    fn test_compute_statistics() {
        let mut commits: Vec<_> = (1..=12).map(|d| commit("a@x.org", d, &["hot.rs", "hot.rs"])).collect();
        commits.push(commit("b@x.org", 31, &["cold.rs", "hot.rs"]));

        let h = compute(&CommitLog { commits, tag_count: 3 }).unwrap();

        assert_eq!(h.commit_count, 13);
        assert_eq!(h.contributor_count, 2);
        assert_eq!(h.age_days, 30);
        assert_eq!(h.release_count, 3);
        assert_eq!(h.high_churn_files, 1);
        assert_eq!(h.bus_factor, 1);
        assert!((h.avg_files_per_commit - 14.0 / 13.0).abs() < 1e-9);
        // under a month of history counts as one month
        assert!((h.commits_per_month - 13.0).abs() < 1e-9);
        assert!(h.first_commit_at <= h.last_commit_at);
    }

    #[test]
    fn test_parse_log_output() {
        let text = "\u{1e}Dev@Example.com\u{1f}2024-03-01T10:00:00+02:00\n\nsrc/a.rs\nsrc/b.rs\n\
                    \u{1e}dev@example.com\u{1f}2024-02-01T10:00:00Z\n\nREADME.md\n";
        let commits = parse_log(text).unwrap();

        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].author, "dev@example.com");
        assert_eq!(commits[0].files, ["src/a.rs", "src/b.rs"]);
        assert_eq!(commits[0].timestamp, Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap());
        assert_eq!(commits[1].files, ["README.md"]);
    }

    #[test]
    fn test_parse_log_bad_date() {
        let _ = parse_log("\u{1e}a@b\u{1f}yesterday\n").unwrap_err();
    }

    fn git(dir: &Path, args: &[&str]) -> bool {
        Command::new("git").arg("-C").arg(dir).args(args).output().is_ok_and(|o| o.status.success())
    }

    fn commit_as(dir: &Path, email: &str, file: &str) {
        std::fs::write(dir.join(file), email).unwrap();
        assert!(git(dir, &["add", "."]));
        assert!(git(
            dir,
            &[
                "-c",
                &format!("user.email={email}"),
                "-c",
                "user.name=Test",
                "-c",
                "commit.gpgsign=false",
                "commit",
                "-q",
                "-m",
                file
            ]
        ));
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri does not support process spawning")]
    async fn test_git_history_dominant_author() {
        let tmp = tempfile::tempdir().unwrap();
        if !git(tmp.path(), &["init", "-q"]) {
            eprintln!("git unavailable, skipping");
            return;
        }

        for i in 0..9 {
            commit_as(tmp.path(), "main@example.com", &format!("file{i}.txt"));
        }
        commit_as(tmp.path(), "minor@example.com", "file9.txt");
        assert!(git(tmp.path(), &["tag", "v1.0"]));

        let h = extract(&GitCommitLog, tmp.path()).await.unwrap().unwrap();

        assert_eq!(h.commit_count, 10);
        assert_eq!(h.contributor_count, 2);
        assert_eq!(h.bus_factor, 1);
        assert_eq!(h.release_count, 1);
        assert_eq!(h.age_days, 0);
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri does not support process spawning")]
    async fn test_git_history_empty_repository() {
        let tmp = tempfile::tempdir().unwrap();
        if !git(tmp.path(), &["init", "-q"]) {
            eprintln!("git unavailable, skipping");
            return;
        }

        assert!(extract(&GitCommitLog, tmp.path()).await.unwrap().is_none());
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    async fn test_tree_without_git_has_no_history() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(extract(&GitCommitLog, tmp.path()).await.unwrap().is_none());
    }
}
