//! Syntax factory.
//!
//! Builders return detached green nodes without leading or trailing trivia; callers splice
//! them into an existing tree (see [`crate::edit`]). Identifier texts are taken verbatim.

use rowan::{GreenNode, GreenToken, NodeOrToken};

use crate::parser::{parse_expression_fragment, parse_type_fragment};
use crate::{ParseError, SyntaxKind};

pub type GreenElement = NodeOrToken<GreenNode, GreenToken>;

pub fn token(kind: SyntaxKind, text: &str) -> GreenElement {
    NodeOrToken::Token(GreenToken::new(kind.into(), text))
}

pub fn node(kind: SyntaxKind, children: Vec<GreenElement>) -> GreenNode {
    GreenNode::new(kind.into(), children)
}

fn space() -> GreenElement {
    token(SyntaxKind::Whitespace, " ")
}

pub fn whitespace(text: &str) -> GreenElement {
    token(SyntaxKind::Whitespace, text)
}

pub fn identifier_name(name: &str) -> GreenNode {
    node(
        SyntaxKind::IdentifierName,
        vec![token(SyntaxKind::Identifier, name)],
    )
}

/// `keyword` must be a predefined-type keyword or `void`.
pub fn predefined_type(keyword: SyntaxKind, text: &str) -> GreenNode {
    node(SyntaxKind::PredefinedType, vec![token(keyword, text)])
}

pub fn void_type() -> GreenNode {
    predefined_type(SyntaxKind::VoidKw, "void")
}

pub fn qualified_name(left: GreenNode, right: &str) -> GreenNode {
    node(
        SyntaxKind::QualifiedName,
        vec![
            NodeOrToken::Node(left),
            token(SyntaxKind::Dot, "."),
            NodeOrToken::Node(identifier_name(right)),
        ],
    )
}

pub fn generic_name(name: &str, type_arguments: Vec<GreenNode>) -> GreenNode {
    let mut args = vec![token(SyntaxKind::Less, "<")];
    for (idx, arg) in type_arguments.into_iter().enumerate() {
        if idx > 0 {
            args.push(token(SyntaxKind::Comma, ","));
            args.push(space());
        }
        args.push(NodeOrToken::Node(arg));
    }
    args.push(token(SyntaxKind::Greater, ">"));
    node(
        SyntaxKind::GenericName,
        vec![
            token(SyntaxKind::Identifier, name),
            NodeOrToken::Node(node(SyntaxKind::TypeArgumentList, args)),
        ],
    )
}

pub fn member_access(receiver: GreenNode, name: GreenNode) -> GreenNode {
    node(
        SyntaxKind::MemberAccessExpression,
        vec![
            NodeOrToken::Node(receiver),
            token(SyntaxKind::Dot, "."),
            NodeOrToken::Node(name),
        ],
    )
}

/// `A.B.C` as nested member accesses; at least two segments.
pub fn dotted_member_access(path: &str) -> Option<GreenNode> {
    let mut parts = path.split('.');
    let first = parts.next()?;
    let second = parts.next()?;
    let mut expr = member_access(identifier_name(first), identifier_name(second));
    for part in parts {
        expr = member_access(expr, identifier_name(part));
    }
    Some(expr)
}

pub fn parameter(ty: GreenNode, name: &str) -> GreenNode {
    node(
        SyntaxKind::Parameter,
        vec![
            NodeOrToken::Node(ty),
            space(),
            token(SyntaxKind::Identifier, name),
        ],
    )
}

pub fn parameter_list(parameters: Vec<GreenNode>) -> GreenNode {
    let mut children = vec![token(SyntaxKind::LParen, "(")];
    for (idx, param) in parameters.into_iter().enumerate() {
        if idx > 0 {
            children.push(token(SyntaxKind::Comma, ","));
            children.push(space());
        }
        children.push(NodeOrToken::Node(param));
    }
    children.push(token(SyntaxKind::RParen, ")"));
    node(SyntaxKind::ParameterList, children)
}

/// `public delegate <return_type> <name>(<parameters>);`
pub fn delegate_declaration(
    return_type: GreenNode,
    name: &str,
    parameters: Vec<GreenNode>,
) -> GreenNode {
    node(
        SyntaxKind::DelegateDeclaration,
        vec![
            NodeOrToken::Node(node(
                SyntaxKind::Modifiers,
                vec![token(SyntaxKind::PublicKw, "public")],
            )),
            space(),
            token(SyntaxKind::DelegateKw, "delegate"),
            space(),
            NodeOrToken::Node(return_type),
            space(),
            token(SyntaxKind::Identifier, name),
            NodeOrToken::Node(parameter_list(parameters)),
            token(SyntaxKind::Semicolon, ";"),
        ],
    )
}

pub fn ty(text: &str) -> Result<GreenNode, Vec<ParseError>> {
    parse_type_fragment(text)
}

pub fn expr(text: &str) -> Result<GreenNode, Vec<ParseError>> {
    parse_expression_fragment(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyntaxNode;
    use pretty_assertions::assert_eq;

    #[test]
    fn delegate_declaration_renders_canonically() {
        let string = predefined_type(SyntaxKind::StringKw, "string");
        let decl = delegate_declaration(
            void_type(),
            "Write",
            vec![parameter(string, "firstName"), parameter(identifier_name("T"), "x")],
        );
        assert_eq!(
            SyntaxNode::new_root(decl).to_string(),
            "public delegate void Write(string firstName, T x);"
        );
    }

    #[test]
    fn dotted_member_access_nests_left() {
        let expr = dotted_member_access("System.Collections.Immutable.ImmutableArray.Create")
            .map(SyntaxNode::new_root);
        let expr = expr.map(|e| (e.kind(), e.to_string()));
        assert_eq!(
            expr,
            Some((
                SyntaxKind::MemberAccessExpression,
                "System.Collections.Immutable.ImmutableArray.Create".to_string()
            ))
        );
        assert_eq!(dotted_member_access("Create"), None);
    }

    #[test]
    fn qualified_and_generic_names() {
        let q = qualified_name(identifier_name("Class1"), "Write");
        assert_eq!(SyntaxNode::new_root(q).to_string(), "Class1.Write");
        let g = generic_name(
            "Create",
            vec![predefined_type(SyntaxKind::LongKw, "long")],
        );
        assert_eq!(SyntaxNode::new_root(g).to_string(), "Create<long>");
    }
}
