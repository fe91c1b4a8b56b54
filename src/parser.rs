use crate::error::GoboundcheckError;
use tree_sitter::{Language, Parser, Tree};

fn go_language() -> Language {
    tree_sitter_go::language()
}

/// Parse one Go compilation unit into a tree-sitter syntax tree.
pub fn parse_source(source: &str) -> Result<Tree, GoboundcheckError> {
    let mut parser = Parser::new();
    parser
        .set_language(go_language())
        .map_err(|err| GoboundcheckError::Grammar(err.to_string()))?;

    parser.parse(source, None).ok_or(GoboundcheckError::Parse)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contains_error_node(node: tree_sitter::Node) -> bool {
        if node.kind() == "ERROR" {
            return true;
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if contains_error_node(child) {
                return true;
            }
        }
        false
    }

    #[test]
    fn parses_plain_function_without_error_nodes() {
        let src = r#"package p

func demo() int64 {
	x := make([]int64, 4, 16)
	return x[0]
}
"#;

        let tree = parse_source(src).expect("parse should succeed");
        assert!(
            !contains_error_node(tree.root_node()),
            "expected a clean parse for plain Go"
        );
    }

    #[test]
    fn parses_method_declarations_without_error_nodes() {
        let src = r#"package p

type byValue []int

func (s byValue) Len() int           { return len(s) }
func (s byValue) Less(i, j int) bool { return s[i] < s[j] }
func (s byValue) Swap(i, j int)      { s[i], s[j] = s[j], s[i] }
"#;

        let tree = parse_source(src).expect("parse should succeed");
        assert!(!contains_error_node(tree.root_node()));
    }
}
