use pretty_assertions::assert_eq;

use crate::ast::*;
use crate::{parse_csharp, SyntaxKind, SyntaxNode};

fn root(text: &str) -> SyntaxNode {
    let parse = parse_csharp(text);
    assert_eq!(parse.errors, Vec::new());
    parse.syntax()
}

fn first<N: AstNode>(root: &SyntaxNode) -> N {
    root.descendants()
        .find_map(N::cast)
        .unwrap_or_else(|| panic!("missing node"))
}

#[test]
fn method_accessors() {
    let root = root("class C { public static void Method1(Action<string> write, int count = 3) { } }");
    let method = first::<MethodDeclaration>(&root);
    assert_eq!(method.name().as_deref(), Some("Method1"));
    assert!(method.has_modifier(SyntaxKind::PublicKw));
    assert!(method.has_modifier(SyntaxKind::StaticKw));
    assert!(!method.has_modifier(SyntaxKind::AbstractKw));
    assert_eq!(method.return_type().map(|t| t.text()), Some("void".to_string()));

    let params: Vec<_> = method
        .parameters()
        .map(|p| (p.ty().map(|t| t.text()), p.name().map(|n| n.to_string())))
        .collect();
    assert_eq!(
        params,
        vec![
            (Some("Action<string>".to_string()), Some("write".to_string())),
            (Some("int".to_string()), Some("count".to_string())),
        ]
    );
    assert!(method.body().is_some());
}

#[test]
fn generic_name_arity_and_type_arguments() {
    let root = root("class C { void M(Func<int, long, string> f) { } }");
    let generic = first::<GenericName>(&root);
    assert_eq!(generic.text().as_deref(), Some("Func"));
    assert_eq!(generic.arity(), 3);
    let args: Vec<_> = generic
        .type_argument_list()
        .map(|l| l.arguments().map(|t| t.text()).collect())
        .unwrap_or_default();
    assert_eq!(args, vec!["int", "long", "string"]);
}

#[test]
fn type_declaration_members_and_constructor() {
    let root = root(
        "public abstract class Shape { private Shape() { } public sealed class Circle : Shape { public Circle(int r) => R = r; public int R { get; } } }",
    );
    let shape = first::<TypeDeclaration>(&root);
    assert_eq!(shape.name().as_deref(), Some("Shape"));
    assert!(shape.has_modifier(SyntaxKind::AbstractKw));

    let kinds: Vec<_> = shape.members().map(|m| m.kind()).collect();
    assert_eq!(
        kinds,
        vec![SyntaxKind::ConstructorDeclaration, SyntaxKind::ClassDeclaration]
    );

    let circle = shape
        .members()
        .find_map(TypeDeclaration::cast)
        .expect("nested class");
    let bases: Vec<_> = circle
        .base_list()
        .map(|b| b.types().map(|t| t.text()).collect())
        .unwrap_or_default();
    assert_eq!(bases, vec!["Shape"]);

    let ctor = circle
        .members()
        .find_map(ConstructorDeclaration::cast)
        .expect("ctor");
    assert_eq!(ctor.parameters().count(), 1);
    assert!(ctor.expression_body().is_some());

    let prop = circle
        .members()
        .find_map(PropertyDeclaration::cast)
        .expect("property");
    assert_eq!(prop.accessor_list().map(|l| l.accessors().count()), Some(1));
}

#[test]
fn named_arguments_and_unparenthesized() {
    let root = root("class C { void M() { Call(second: ((x)), 1); } }");
    let args: Vec<_> = first::<ArgumentList>(&root).arguments().collect();
    assert_eq!(args[0].name().as_deref(), Some("second"));
    assert_eq!(args[1].name(), None);
    let value = args[0].expression().expect("value").unparenthesized();
    assert_eq!(value.syntax().kind(), SyntaxKind::IdentifierName);
    assert_eq!(text_without_trivia(value.syntax()), "x");
}

#[test]
fn file_scoped_namespace() {
    let root = root("namespace A.B;\nusing System;\nclass C { }\n");
    let ns = first::<NamespaceDeclaration>(&root);
    assert!(ns.is_file_scoped());
    assert_eq!(ns.name().map(|n| n.text()), Some("A.B".to_string()));
    assert_eq!(ns.members().count(), 1);
}

#[test]
fn text_without_trivia_strips_comments() {
    let root = root("class C { void M(List < int /* x */ > a) { } }");
    let param = first::<Parameter>(&root);
    assert_eq!(param.ty().map(|t| t.text()), Some("List<int>".to_string()));
}
