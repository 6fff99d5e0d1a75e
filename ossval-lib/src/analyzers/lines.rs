//! Language-aware physical line counting.

use super::source_tree::{Language, SourceTree, analyze_files};
use crate::Result;
use crate::metrics::LineMetrics;
use std::collections::BTreeMap;

const LOG_TARGET: &str = "     lines";

struct CommentSyntax {
    line: &'static [&'static str],
    block: Option<(&'static str, &'static str)>,

    /// Whether a block comment may open after code on the same line.
    block_after_code: bool,
}

const C_STYLE: CommentSyntax = CommentSyntax {
    line: &["//"],
    block: Some(("/*", "*/")),
    block_after_code: true,
};

const fn syntax(language: Language) -> CommentSyntax {
    match language {
        Language::C
        | Language::Cpp
        | Language::CSharp
        | Language::Go
        | Language::Java
        | Language::JavaScript
        | Language::Kotlin
        | Language::Rust
        | Language::Scala
        | Language::Swift
        | Language::TypeScript => C_STYLE,
        Language::Php => CommentSyntax {
            line: &["//", "#"],
            ..C_STYLE
        },
        Language::Python => CommentSyntax {
            line: &["#"],
            block: Some((r#"""""#, r#"""""#)),
            block_after_code: false,
        },
        Language::Ruby => CommentSyntax {
            line: &["#"],
            block: Some(("=begin", "=end")),
            block_after_code: false,
        },
        Language::Shell => CommentSyntax {
            line: &["#"],
            block: None,
            block_after_code: false,
        },
        Language::Lua => CommentSyntax {
            line: &["--"],
            block: Some(("--[[", "]]")),
            block_after_code: false,
        },
        Language::Haskell => CommentSyntax {
            line: &["--"],
            block: Some(("{-", "-}")),
            block_after_code: true,
        },
    }
}

/// Count the lines of one file.
#[must_use]
pub fn count_lines(language: Language, text: &str) -> LineMetrics {
    let syntax = syntax(language);
    let mut metrics = LineMetrics {
        files_analyzed: 1,
        ..LineMetrics::default()
    };
    let mut in_block = false;

    for line in text.lines() {
        metrics.total_lines += 1;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            metrics.blank_lines += 1;
            continue;
        }

        if in_block {
            metrics.comment_lines += 1;
            if let Some((_, close)) = syntax.block
                && trimmed.contains(close)
            {
                in_block = false;
            }
            continue;
        }

        if let Some((open, close)) = syntax.block
            && let Some(rest) = trimmed.strip_prefix(open)
        {
            metrics.comment_lines += 1;
            in_block = !rest.contains(close);
            continue;
        }

        if syntax.line.iter().any(|marker| trimmed.starts_with(marker)) {
            metrics.comment_lines += 1;
            continue;
        }

        metrics.code_lines += 1;

        if syntax.block_after_code
            && let Some((open, close)) = syntax.block
            && let Some((_, after)) = trimmed.rsplit_once(open)
        {
            in_block = !after.contains(close);
        }
    }

    let _ = metrics.by_language.insert(language.to_string(), metrics.code_lines);
    metrics
}

/// Count lines across every source file in the tree.
///
/// Returns `None` when the tree holds no recognized source files.
pub async fn extract(tree: &SourceTree) -> Result<Option<LineMetrics>> {
    let files = tree.files().await?.to_vec();
    if files.is_empty() {
        log::debug!(target: LOG_TARGET, "No source files under '{}'", tree.root().display());
        return Ok(None);
    }

    let per_file = analyze_files(files, |file, text| Some(count_lines(file.language, text))).await;

    let mut total = LineMetrics {
        by_language: BTreeMap::new(),
        ..LineMetrics::default()
    };
    for m in &per_file {
        total.merge(m);
    }

    log::debug!(
        target: LOG_TARGET,
        "Counted {} code lines in {} files under '{}'",
        total.code_lines,
        total.files_analyzed,
        tree.root().display()
    );

    Ok(Some(total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_lines() {
        let src = "\
// header
use std::io;

/* block
   still block */
fn main() { /* inline */
    let x = 1; // trailing
}
";
        let m = count_lines(Language::Rust, src);

        assert_eq!(m.total_lines, 8);
        assert_eq!(m.blank_lines, 1);
        assert_eq!(m.comment_lines, 3);
        assert_eq!(m.code_lines, 4);
        assert_eq!(m.by_language["rust"], 4);
        assert!(m.code_lines <= m.total_lines);
    }

    #[test]
    fn test_code_then_open_block_comment() {
        let src = "int x; /* starts\ncontinues\nends */\nint y;\n";
        let m = count_lines(Language::C, src);

        assert_eq!(m.code_lines, 2);
        assert_eq!(m.comment_lines, 2);
    }

    #[test]
    fn test_python_docstrings_and_hashes() {
        let src = "\
\"\"\"Module docstring.

More text.
\"\"\"
# comment
def f():
    \"\"\"One-liner.\"\"\"
    return 1
";
        let m = count_lines(Language::Python, src);

        assert_eq!(m.total_lines, 8);
        assert_eq!(m.comment_lines, 5);
        assert_eq!(m.blank_lines, 1);
        assert_eq!(m.code_lines, 2);
    }

    #[test]
    fn test_lua_block_before_line_marker() {
        let src = "--[[ long\ncomment ]]\n-- short\nprint(1)\n";
        let m = count_lines(Language::Lua, src);

        assert_eq!(m.comment_lines, 3);
        assert_eq!(m.code_lines, 1);
    }

    #[test]
    fn test_shell_has_no_block_comments() {
        let m = count_lines(Language::Shell, "#!/bin/sh\necho hi\n\n");
        assert_eq!((m.comment_lines, m.code_lines, m.blank_lines), (1, 1, 1));
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    async fn test_extract_sums_files_by_language() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("a.rs"), "fn a() {}\nfn b() {}\n").unwrap();
        std::fs::write(tmp.path().join("b.py"), "x = 1\n# c\n").unwrap();
        std::fs::create_dir(tmp.path().join("node_modules")).unwrap();
        std::fs::write(tmp.path().join("node_modules/dep.js"), "var a;\n").unwrap();

        let m = extract(&SourceTree::new(tmp.path())).await.unwrap().unwrap();

        assert_eq!(m.files_analyzed, 2);
        assert_eq!(m.code_lines, 3);
        assert_eq!(m.comment_lines, 1);
        assert_eq!(m.by_language.get("rust"), Some(&2));
        assert_eq!(m.by_language.get("python"), Some(&1));
        assert!(!m.by_language.contains_key("javascript"));
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    async fn test_extract_without_sources_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("README.md"), "# readme\n").unwrap();

        assert!(extract(&SourceTree::new(tmp.path())).await.unwrap().is_none());
    }
}
