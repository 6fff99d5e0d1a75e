//! Halstead operator/operand analysis.
//!
//! Each supported grammar provides a dispatch table from syntax-node kind to a [`Rule`].
//! The walker in the grammar module applies the rule for every node it visits, so the
//! classification of operators and operands lives in one table per language rather than
//! being spread across visitor methods.

use super::source_tree::{Language, SourceTree, analyze_files};
use super::{python_syntax, rust_syntax};
use crate::Result;
use crate::metrics::LexicalComplexity;
use std::collections::{HashMap, HashSet};

const LOG_TARGET: &str = "   lexical";

/// How a syntax node contributes to the operator and operand counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Count one occurrence of a fixed operator label, then descend.
    Operator(&'static str),

    /// Count the node's own operator token, then descend.
    OperatorToken,

    /// Count every child in the named field as an operator, then descend.
    OperatorField(&'static str),

    /// Count the node's text as an operand. Children are not visited.
    Operand,

    /// Contributes nothing by itself; visit children.
    Descend,
}

/// Distinct and total operator/operand occurrences for one file.
#[derive(Debug, Default, Clone)]
pub struct TokenCounts {
    operators: HashMap<String, u64>,
    operands: HashMap<String, u64>,
}

impl TokenCounts {
    pub fn operator(&mut self, label: &str) {
        *self.operators.entry(label.to_string()).or_default() += 1;
    }

    pub fn operand(&mut self, text: &str) {
        *self.operands.entry(text.to_string()).or_default() += 1;
    }

    #[must_use]
    pub fn measures(&self) -> Option<LexicalComplexity> {
        LexicalComplexity::from_counts(
            self.operators.len() as u64,
            self.operands.len() as u64,
            self.operators.values().sum(),
            self.operands.values().sum(),
        )
    }
}

const LANGUAGES: &[Language] = &[Language::Rust, Language::Python];

/// Count tokens in one file. `None` when the file does not parse.
#[must_use]
pub fn count_tokens(language: Language, text: &str) -> Option<TokenCounts> {
    match language {
        Language::Rust => rust_syntax::lexical_counts(text),
        Language::Python => python_syntax::lexical_counts(text),
        _ => None,
    }
}

/// Halstead measures across all parseable Rust and Python files in the tree.
pub async fn extract(tree: &SourceTree) -> Result<Option<LexicalComplexity>> {
    let files = tree.files_of(LANGUAGES).await?;
    if files.is_empty() {
        return Ok(None);
    }

    let per_file = analyze_files(files, |file, text| {
        let Some(counts) = count_tokens(file.language, text) else {
            log::debug!(target: LOG_TARGET, "Skipping '{}': does not parse", file.path.display());
            return None;
        };
        let measures = counts.measures()?;
        Some((measures, counts))
    })
    .await;

    let mut operators = HashSet::new();
    let mut operands = HashSet::new();
    let mut measures = Vec::with_capacity(per_file.len());
    for (m, counts) in per_file {
        operators.extend(counts.operators.into_keys());
        operands.extend(counts.operands.into_keys());
        measures.push(m);
    }

    let result = LexicalComplexity::aggregate(&measures, operators.len() as u64, operands.len() as u64);
    if let Some(r) = &result {
        log::debug!(
            target: LOG_TARGET,
            "Lexical difficulty {:.1} over {} files under '{}'",
            r.difficulty,
            r.files_analyzed,
            tree.root().display()
        );
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_to_measures() {
        let mut c = TokenCounts::default();
        c.operator("+");
        c.operator("+");
        c.operator("=");
        c.operand("x");
        c.operand("x");
        c.operand("1");

        let m = c.measures().unwrap();
        assert_eq!((m.distinct_operators, m.distinct_operands), (2, 2));
        assert_eq!((m.total_operators, m.total_operands), (3, 3));
    }

    #[test]
    fn test_unsupported_language_has_no_counts() {
        assert!(count_tokens(Language::Go, "package main").is_none());
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    async fn test_extract_unions_vocabulary_across_files() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("a.py"), "x = y + 1\n").unwrap();
        std::fs::write(tmp.path().join("b.py"), "x = y - 2\n").unwrap();
        std::fs::write(tmp.path().join("broken.py"), "def (:\n").unwrap();

        let m = extract(&SourceTree::new(tmp.path())).await.unwrap().unwrap();

        assert_eq!(m.files_analyzed, 2);
        // {=, +, -} and {x, y, 1, 2}
        assert_eq!(m.distinct_operators, 3);
        assert_eq!(m.distinct_operands, 4);
        assert_eq!(m.total_operators, 4);
        assert_eq!(m.total_operands, 6);
        assert!(m.length >= m.vocabulary);
        // both files have difficulty 1, so summed effort equals summed volume
        assert!((m.difficulty - 1.0).abs() < 1e-9);
        assert!((m.effort - m.volume).abs() < 1e-9);
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    async fn test_extract_without_supported_files_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("main.go"), "package main\n").unwrap();

        assert!(extract(&SourceTree::new(tmp.path())).await.unwrap().is_none());
    }
}
