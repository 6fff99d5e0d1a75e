//! Python front-end backed by tree-sitter.

use super::lexical::{Rule, TokenCounts};
use tree_sitter::{Node, Parser, Tree};

/// Parse Python source. `None` when the grammar cannot be loaded or the tree has errors.
fn parse(text: &str) -> Option<Tree> {
    let mut parser = Parser::new();
    parser.set_language(&tree_sitter_python::LANGUAGE.into()).ok()?;
    let tree = parser.parse(text, None)?;
    (!tree.root_node().has_error()).then_some(tree)
}

fn rule(kind: &str) -> Rule {
    match kind {
        "binary_operator" | "unary_operator" | "boolean_operator" | "augmented_assignment" => Rule::OperatorField("operator"),
        "comparison_operator" => Rule::OperatorField("operators"),
        "not_operator" => Rule::Operator("not"),
        "call" => Rule::Operator("call"),
        "assignment" => Rule::Operator("="),
        "if_statement" | "elif_clause" => Rule::Operator("if"),
        "for_statement" => Rule::Operator("for"),
        "while_statement" => Rule::Operator("while"),
        "return_statement" => Rule::Operator("return"),
        "function_definition" => Rule::Operator("def"),
        "class_definition" => Rule::Operator("class"),
        "identifier" | "integer" | "float" | "string" | "true" | "false" | "none" => Rule::Operand,
        _ => Rule::Descend,
    }
}

fn text<'a>(node: &Node<'_>, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or_default()
}

fn count(node: &Node<'_>, source: &[u8], counts: &mut TokenCounts) {
    match rule(node.kind()) {
        Rule::Operand => {
            counts.operand(text(node, source));
            return;
        }
        Rule::Operator(label) => counts.operator(label),
        Rule::OperatorField(field) => {
            let mut cursor = node.walk();
            for op in node.children_by_field_name(field, &mut cursor) {
                counts.operator(text(&op, source));
            }
        }
        Rule::OperatorToken | Rule::Descend => {}
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        count(&child, source, counts);
    }
}

pub fn lexical_counts(source: &str) -> Option<TokenCounts> {
    let tree = parse(source)?;
    let mut counts = TokenCounts::default();
    count(&tree.root_node(), source.as_bytes(), &mut counts);
    Some(counts)
}

fn branches(node: &Node<'_>) -> u64 {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .map(|child| {
            let own = match child.kind() {
                // nested definitions are units of their own
                "function_definition" => return 0,
                "if_statement" | "elif_clause" | "for_statement" | "while_statement" | "except_clause" | "boolean_operator"
                | "conditional_expression" | "if_clause" | "for_in_clause" | "case_clause" => 1,
                _ => 0,
            };
            own + branches(&child)
        })
        .sum()
}

fn collect_units(node: &Node<'_>, units: &mut Vec<u64>) {
    if node.kind() == "function_definition" {
        units.push(1 + node.child_by_field_name("body").map_or(0, |body| branches(&body)));
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_units(&child, units);
    }
}

/// Per-function complexity for every function in the file. `None` when the file does not parse.
pub fn unit_complexities(source: &str) -> Option<Vec<u64>> {
    let tree = parse(source)?;
    let mut units = Vec::new();
    collect_units(&tree.root_node(), &mut units);
    Some(units)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_is_none() {
        assert!(lexical_counts("def broken(:\n  pass\n").is_none());
        assert!(unit_complexities("class :\n").is_none());
    }

    #[test]
    fn test_straight_line_function() {
        assert_eq!(unit_complexities("def f(x):\n    return x + 1\n").unwrap(), [1]);
    }

    #[test]
    fn test_branches_counted() {
        let src = "\
def classify(x, items):
    if x > 0 and x < 10:
        return 'small'
    elif x < 0:
        return 'neg'
    for i in items:
        while i:
            i -= 1
    try:
        pass
    except ValueError:
        pass
    return [y for y in items if y] if items else None
";
        // if, and, elif, for, while, except, conditional, comprehension for, comprehension if
        assert_eq!(unit_complexities(src).unwrap(), [10]);
    }

    #[test]
    fn test_nested_functions_are_separate_units() {
        let src = "\
def outer(a):
    def inner(b):
        if b:
            return 1
        return 2
    if a:
        return inner(a)
";
        let mut units = unit_complexities(src).unwrap();
        units.sort_unstable();
        assert_eq!(units, [2, 2]);
    }

    #[test]
    fn test_module_without_functions_has_no_units() {
        assert!(unit_complexities("x = 1\nprint(x)\n").unwrap().is_empty());
    }

    #[test]
    fn test_lexical_rules() {
        let c = lexical_counts("def f(a):\n    return a.b(1) == 2\n").unwrap();
        let m = c.measures().unwrap();

        // operators: def, return, call, ==
        assert_eq!(m.distinct_operators, 4);
        // operands: f, a, b, 1, 2
        assert_eq!(m.distinct_operands, 5);
        // a appears twice
        assert_eq!(m.total_operands, 6);
    }
}
