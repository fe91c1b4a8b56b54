//! Depth-first traversal that carries the chain of enclosing nodes.
//!
//! Rules that reason about a node's context (enclosing conditionals, loops,
//! function declarations) receive the full root-to-parent ancestor stack for
//! every visited node, in document order.

use tree_sitter::Node;

/// Walk the tree rooted at `root`, invoking `visit` for every node together
/// with its ancestor chain (root first, immediate parent last).
///
/// Returning `false` from `visit` prunes the node's children. Every other
/// node is visited exactly once; blocks, expression lists and function bodies
/// get no special treatment.
pub fn walk_with_ancestors<'tree, F>(root: Node<'tree>, visit: &mut F)
where
    F: FnMut(Node<'tree>, &[Node<'tree>]) -> bool,
{
    let mut ancestors: Vec<Node<'tree>> = Vec::new();
    walk_node(root, &mut ancestors, visit);
}

fn walk_node<'tree, F>(node: Node<'tree>, ancestors: &mut Vec<Node<'tree>>, visit: &mut F)
where
    F: FnMut(Node<'tree>, &[Node<'tree>]) -> bool,
{
    if !visit(node, ancestors) {
        return;
    }

    ancestors.push(node);
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_node(child, ancestors, visit);
    }
    ancestors.pop();
}
