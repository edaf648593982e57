//! Persistent green-tree editing. Every helper returns new green nodes; nothing is mutated
//! in place and unmodified subtrees are shared with the input.

use rowan::{GreenNode, NodeOrToken};

use crate::make::GreenElement;
use crate::{SyntaxElement, SyntaxNode};

/// Child-index path from the root to `node` (indices count tokens and nodes).
pub fn path_from_root(node: &SyntaxNode) -> Vec<usize> {
    let mut path: Vec<usize> = node.ancestors().filter(|n| n.parent().is_some()).map(|n| n.index()).collect();
    path.reverse();
    path
}

pub fn node_at_path(root: &SyntaxNode, path: &[usize]) -> Option<SyntaxNode> {
    let mut node = root.clone();
    for &idx in path {
        node = node.children_with_tokens().nth(idx)?.into_node()?;
    }
    Some(node)
}

/// New green for `parent` with the child element at `index` replaced.
pub fn replace_child(parent: &SyntaxNode, index: usize, new_child: GreenElement) -> GreenNode {
    parent.green().replace_child(index, new_child)
}

/// New root green with `node` swapped for `replacement`, which may be of another kind.
pub fn replace_node(node: &SyntaxNode, replacement: GreenNode) -> GreenNode {
    match node.parent() {
        Some(parent) => {
            let spliced = replace_child(&parent, node.index(), NodeOrToken::Node(replacement));
            parent.replace_with(spliced)
        }
        None => replacement,
    }
}

/// New green for `parent` with `children` inserted before child `index`.
pub fn insert_children(
    parent: &SyntaxNode,
    index: usize,
    children: Vec<GreenElement>,
) -> GreenNode {
    parent.green().splice_children(index..index, children)
}

/// Replace the first child node of `parent` accepted by `pred` with `new_child`.
///
/// Returns `None` when no child matches.
pub fn replace_child_node(
    parent: &SyntaxNode,
    pred: impl Fn(&SyntaxNode) -> bool,
    new_child: GreenNode,
) -> Option<GreenNode> {
    let target = parent.children().find(|c| pred(c))?;
    Some(replace_child(parent, target.index(), NodeOrToken::Node(new_child)))
}

pub fn element_green(element: &SyntaxElement) -> GreenElement {
    match element {
        NodeOrToken::Node(node) => NodeOrToken::Node(node.green().into_owned()),
        NodeOrToken::Token(token) => NodeOrToken::Token(token.green().to_owned()),
    }
}
