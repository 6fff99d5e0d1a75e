use crate::facts::RepoSpec;
use url::Url;

/// Hosts whose URLs are treated as repositories even when they only show up as a homepage.
const FORGE_HOSTS: &[&str] = &["github.com", "gitlab.com", "bitbucket.org", "codeberg.org"];

/// Turn the many ways registries spell a repository location into `https://host/owner/repo`.
///
/// Accepts `git+https://`, `git://`, `ssh://git@`, scp-like `git@host:owner/repo`, npm
/// shorthands (`github:owner/repo`, `gitlab:owner/repo`, bare `owner/repo`), trailing
/// `.git`, and deep links into a repository. Returns `None` for anything that does not
/// name a repository.
#[must_use]
pub fn normalize_git_url(raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let candidate = expand_shorthand(raw).unwrap_or_else(|| raw.trim_start_matches("git+").to_string());
    let url = Url::parse(&candidate).ok()?;
    if !matches!(url.scheme(), "http" | "https" | "git" | "ssh") {
        return None;
    }

    let spec = RepoSpec::parse(&url).ok()?;
    Some(spec.url().clone())
}

/// Like [`normalize_git_url`], but only for well-known code hosts.
///
/// Used for fields such as a homepage, which often point at documentation sites.
#[must_use]
pub fn normalize_forge_url(raw: &str) -> Option<Url> {
    normalize_git_url(raw).filter(|url| url.host_str().is_some_and(|host| FORGE_HOSTS.contains(&host)))
}

fn expand_shorthand(raw: &str) -> Option<String> {
    if let Some((prefix, rest)) = raw.split_once(':') {
        let host = match prefix {
            "github" => Some("github.com"),
            "gitlab" => Some("gitlab.com"),
            "bitbucket" => Some("bitbucket.org"),
            _ => None,
        };
        if let Some(host) = host {
            return Some(format!("https://{host}/{rest}"));
        }

        // scp-like syntax: git@host:owner/repo
        if let Some(host) = prefix.strip_prefix("git@")
            && !rest.starts_with("//")
        {
            return Some(format!("https://{host}/{}", rest.trim_start_matches('/')));
        }

        return None;
    }

    // npm's bare `owner/repo` shorthand
    let mut parts = raw.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty() && !owner.contains('.') => {
            Some(format!("https://github.com/{owner}/{repo}"))
        }
        _ => None,
    }
}
