//! Rust front-end backed by `ra_ap_syntax`.

use super::lexical::{Rule, TokenCounts};
use ra_ap_syntax::{AstNode, Edition, NodeOrToken, SourceFile, SyntaxKind, SyntaxNode, SyntaxToken};

/// Parse Rust source. `None` when the parser reports any error.
fn parse(text: &str) -> Option<SyntaxNode> {
    let parse = SourceFile::parse(text, Edition::CURRENT);
    parse.errors().is_empty().then(|| parse.tree().syntax().clone())
}

const fn rule(kind: SyntaxKind) -> Rule {
    match kind {
        SyntaxKind::BIN_EXPR | SyntaxKind::PREFIX_EXPR => Rule::OperatorToken,
        SyntaxKind::REF_EXPR => Rule::Operator("&"),
        SyntaxKind::TRY_EXPR => Rule::Operator("?"),
        SyntaxKind::RANGE_EXPR => Rule::Operator(".."),
        SyntaxKind::CAST_EXPR => Rule::Operator("as"),
        SyntaxKind::INDEX_EXPR => Rule::Operator("[]"),
        SyntaxKind::FIELD_EXPR => Rule::Operator("."),
        SyntaxKind::CALL_EXPR | SyntaxKind::METHOD_CALL_EXPR => Rule::Operator("call"),
        SyntaxKind::MACRO_CALL => Rule::Operator("macro"),
        SyntaxKind::AWAIT_EXPR => Rule::Operator("await"),
        SyntaxKind::CLOSURE_EXPR => Rule::Operator("closure"),
        SyntaxKind::LET_STMT => Rule::Operator("let"),
        SyntaxKind::IF_EXPR => Rule::Operator("if"),
        SyntaxKind::MATCH_EXPR => Rule::Operator("match"),
        SyntaxKind::FOR_EXPR => Rule::Operator("for"),
        SyntaxKind::WHILE_EXPR => Rule::Operator("while"),
        SyntaxKind::LOOP_EXPR => Rule::Operator("loop"),
        SyntaxKind::BREAK_EXPR => Rule::Operator("break"),
        SyntaxKind::CONTINUE_EXPR => Rule::Operator("continue"),
        SyntaxKind::RETURN_EXPR => Rule::Operator("return"),
        SyntaxKind::FN => Rule::Operator("fn"),
        SyntaxKind::STRUCT => Rule::Operator("struct"),
        SyntaxKind::ENUM => Rule::Operator("enum"),
        SyntaxKind::UNION => Rule::Operator("union"),
        SyntaxKind::TRAIT => Rule::Operator("trait"),
        SyntaxKind::IMPL => Rule::Operator("impl"),
        SyntaxKind::CONST => Rule::Operator("const"),
        SyntaxKind::STATIC => Rule::Operator("static"),
        SyntaxKind::TYPE_ALIAS => Rule::Operator("type"),
        SyntaxKind::MODULE => Rule::Operator("mod"),
        SyntaxKind::NAME | SyntaxKind::NAME_REF | SyntaxKind::LITERAL => Rule::Operand,
        _ => Rule::Descend,
    }
}

/// First non-trivia token directly owned by the node, which for unary and binary
/// expressions is the operator.
fn operator_token(node: &SyntaxNode) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(NodeOrToken::into_token)
        .find(|t| !t.kind().is_trivia())
}

fn count(node: &SyntaxNode, counts: &mut TokenCounts) {
    match rule(node.kind()) {
        Rule::Operand => {
            counts.operand(&node.text().to_string());
            return;
        }
        Rule::Operator(label) => counts.operator(label),
        Rule::OperatorToken => {
            if let Some(token) = operator_token(node) {
                counts.operator(token.text());
            }
        }
        Rule::OperatorField(_) | Rule::Descend => {}
    }

    for child in node.children() {
        count(&child, counts);
    }
}

pub fn lexical_counts(source: &str) -> Option<TokenCounts> {
    let root = parse(source)?;
    let mut counts = TokenCounts::default();
    count(&root, &mut counts);
    Some(counts)
}

fn branch_weight(node: &SyntaxNode) -> u64 {
    match node.kind() {
        SyntaxKind::IF_EXPR | SyntaxKind::WHILE_EXPR | SyntaxKind::FOR_EXPR | SyntaxKind::TRY_EXPR => 1,
        SyntaxKind::MATCH_ARM_LIST => {
            let arms = node.children().filter(|c| c.kind() == SyntaxKind::MATCH_ARM).count() as u64;
            arms.saturating_sub(1)
        }
        SyntaxKind::BIN_EXPR => {
            u64::from(operator_token(node).is_some_and(|t| matches!(t.kind(), SyntaxKind::AMP2 | SyntaxKind::PIPE2)))
        }
        _ => 0,
    }
}

fn branches(node: &SyntaxNode) -> u64 {
    node.children()
        .filter(|child| child.kind() != SyntaxKind::FN)
        .map(|child| branch_weight(&child) + branches(&child))
        .sum()
}

/// Per-function complexity for every `fn` in the file. `None` when the file does not parse.
pub fn unit_complexities(source: &str) -> Option<Vec<u64>> {
    let root = parse(source)?;
    Some(
        root.descendants()
            .filter(|n| n.kind() == SyntaxKind::FN)
            .map(|f| 1 + branches(&f))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg_attr(miri, ignore = "Miri detects UB in external rowan crate")]
    fn test_parse_error_is_none() {
        assert!(lexical_counts("fn broken( {").is_none());
        assert!(unit_complexities("struct {").is_none());
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri detects UB in external rowan crate")]
    fn test_straight_line_fn() {
        assert_eq!(unit_complexities("fn f(x: u32) -> u32 { x + 1 }").unwrap(), [1]);
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri detects UB in external rowan crate")]
    fn test_branches_counted() {
        let src = r"
fn classify(x: i32, v: &[i32]) -> Result<i32, ()> {
    if x > 0 && x < 10 {
        return Ok(1);
    } else if x < 0 || x > 100 {
        return Ok(2);
    }
    for i in v {
        while *i > 0 {}
    }
    let y = match x {
        1 => 1,
        2 => 2,
        _ => 3,
    };
    Ok(parse(y)?)
}
";
        // if, &&, else-if, ||, for, while, two extra match arms, ?
        assert_eq!(unit_complexities(src).unwrap(), [10]);
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri detects UB in external rowan crate")]
    fn test_nested_fns_are_separate_units() {
        let src = r"
fn outer(a: bool) -> u8 {
    fn inner(b: bool) -> u8 {
        if b { 1 } else { 2 }
    }
    if a { inner(a) } else { 0 }
}
";
        assert_eq!(unit_complexities(src).unwrap(), [2, 2]);
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri detects UB in external rowan crate")]
    fn test_lexical_rules() {
        let c = lexical_counts("fn f(a: u32) -> u32 { let b = a + 1; b * 2 }").unwrap();
        let m = c.measures().unwrap();

        // fn, let, +, *
        assert_eq!(m.distinct_operators, 4);
        assert_eq!(m.total_operators, 4);
        // operands: f, a, u32, b, 1, 2
        assert_eq!(m.distinct_operands, 6);
        // f, a, u32, u32, b, a, 1, b, 2
        assert_eq!(m.total_operands, 9);
    }
}
