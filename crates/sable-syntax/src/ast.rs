use crate::parser::SyntaxNode;
use crate::syntax_kind::SyntaxKind;

pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(syntax: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;
}

pub mod support {
    use crate::ast::AstNode;
    use crate::parser::{SyntaxNode, SyntaxToken};
    use crate::syntax_kind::SyntaxKind;

    pub fn child<N: AstNode>(node: &SyntaxNode) -> Option<N> {
        node.children().find_map(N::cast)
    }

    pub fn children<'a, N: AstNode + 'a>(node: &'a SyntaxNode) -> impl Iterator<Item = N> + 'a {
        node.children().filter_map(N::cast)
    }

    pub fn last_child<N: AstNode>(node: &SyntaxNode) -> Option<N> {
        node.children().filter_map(N::cast).last()
    }

    pub fn token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
        node.children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|tok| tok.kind() == kind)
    }

    /// The first identifier token among the node's direct children: the declared name for
    /// every declaration shape the parser produces.
    pub fn ident_token(node: &SyntaxNode) -> Option<SyntaxToken> {
        token(node, SyntaxKind::Identifier)
    }
}

mod ext;
mod nodes;

pub use ext::text_without_trivia;
pub use nodes::*;

#[cfg(test)]
mod tests;
