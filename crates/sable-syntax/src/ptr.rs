use text_size::TextRange;

use crate::{SyntaxKind, SyntaxNode};

/// Tree-independent pointer to a node: its kind and range.
///
/// Resolving against a different tree only succeeds where a node of the same kind still
/// spans exactly the same range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SyntaxNodePtr {
    kind: SyntaxKind,
    range: TextRange,
}

impl SyntaxNodePtr {
    pub fn new(node: &SyntaxNode) -> Self {
        Self {
            kind: node.kind(),
            range: node.text_range(),
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn to_node(&self, root: &SyntaxNode) -> Option<SyntaxNode> {
        let mut node = match root.covering_element(self.range) {
            rowan::NodeOrToken::Node(node) => node,
            rowan::NodeOrToken::Token(token) => token.parent()?,
        };
        // `covering_element` returns the deepest match; walk up through wrappers that span
        // the same range until the kind matches.
        loop {
            if node.kind() == self.kind && node.text_range() == self.range {
                return Some(node);
            }
            match node.parent() {
                Some(parent) if parent.text_range() == self.range => node = parent,
                _ => return None,
            }
        }
    }
}
