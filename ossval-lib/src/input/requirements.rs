use crate::Result;
use crate::facts::{Ecosystem, PackageSpec};

const VERSION_OPERATORS: &[char] = &['=', '<', '>', '~', '!'];

/// Parse a pip requirements file.
///
/// Option lines (`-r`, `-e`, `--index-url`, ...) are skipped, as are environment markers
/// and extras. Only `==` pins produce a version.
pub fn parse(content: &str) -> Result<Vec<PackageSpec>> {
    Ok(content
        .lines()
        .map(strip_comment)
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('-'))
        .filter_map(parse_requirement)
        .collect())
}

fn strip_comment(line: &str) -> &str {
    line.split('#').next().unwrap_or_default()
}

/// Parse one requirement such as `requests[socks]==2.31.0 ; python_version >= "3.8"`.
pub fn parse_requirement(requirement: &str) -> Option<PackageSpec> {
    let requirement = requirement.split(';').next().unwrap_or_default().trim();

    // PEP 508 direct references: `name @ https://...`
    let requirement = requirement.split(" @ ").next().unwrap_or_default().trim();

    let name_end = requirement.find(|c: char| VERSION_OPERATORS.contains(&c) || c == '[' || c.is_whitespace());
    let (name, rest) = name_end.map_or((requirement, ""), |i| requirement.split_at(i));
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')) {
        return None;
    }

    let rest = rest.trim_start();
    let rest = rest.strip_prefix('[').and_then(|r| r.split_once(']')).map_or(rest, |(_, after)| after);

    let spec = PackageSpec::new(name, Ecosystem::Pypi);
    let pinned = rest
        .split(',')
        .map(str::trim)
        .find_map(|clause| clause.strip_prefix("===").or_else(|| clause.strip_prefix("==")))
        .map(str::trim)
        .filter(|v| !v.is_empty());

    Some(match pinned {
        Some(version) => spec.with_version(version),
        None => spec,
    })
}
