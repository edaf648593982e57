use pretty_assertions::assert_eq;
use sable_hir::{
    find_callers, MethodId, ParameterOwner, SemanticIndex, SemanticModel, Symbol, Ty,
};
use sable_syntax::ast::{self, AstNode};
use sable_syntax::{SyntaxNode, TextSize};
use sable_test_utils::Fixture;
use sable_workspace::Document;

fn node_at<N: AstNode>(document: &Document, offset: TextSize) -> N {
    document
        .syntax()
        .token_at_offset(offset)
        .right_biased()
        .and_then(|tok| tok.parent_ancestors().find_map(N::cast))
        .unwrap_or_else(|| panic!("no node at {offset:?}"))
}

fn declarator_types(model: &SemanticModel<'_>) -> Vec<(String, String)> {
    model
        .document()
        .syntax()
        .descendants()
        .filter_map(ast::VariableDeclarator::cast)
        .map(|decl| {
            let name = decl.name_token().unwrap().text().to_string();
            let value = decl.initializer().and_then(|i| i.value()).unwrap();
            let ty = model
                .type_of_expression(&value)
                .map(|ty| model.display_type(&ty, decl.syntax()))
                .unwrap_or_else(|| "?".to_string());
            (name, ty)
        })
        .collect()
}

fn method_named(model: &SemanticModel<'_>, name: &str, first_param_text: &str) -> MethodId {
    model
        .document()
        .syntax()
        .descendants()
        .filter_map(ast::MethodDeclaration::cast)
        .find(|m| {
            m.name().as_deref() == Some(name)
                && m.parameters()
                    .next()
                    .and_then(|p| p.ty())
                    .map_or(false, |t| t.text() == first_param_text)
        })
        .and_then(|m| model.declared_method(m.syntax()))
        .unwrap_or_else(|| panic!("no method {name}({first_param_text} ...)"))
}

const CLASS1: &str = r#"
using System;

namespace ClassLibrary1
{
    public class Class1
    {
        public delegate void Write(string firstName);

        public void Method1(Action<string /*firstName*/> $0callback)
        {
            callback("x");
        }

        public void Method1(int x) { }

        void CallerInMyDocument()
        {
            Method1(s => Console.WriteLine(s));
        }
    }
}
"#;

const CLASS2: &str = r#"
namespace ClassLibrary1
{
    class Class2
    {
        void Caller(Class1 c)
        {
            c.Method1(x => { });
            c.Method1(3);$1
        }
    }
}

namespace Other
{
    class Class3
    {
        void M() {$2 }
    }
}
"#;

fn two_documents() -> Fixture {
    Fixture::from_documents([("Class1.cs", CLASS1), ("Class2.cs", CLASS2)])
}

#[test]
fn declared_parameter_binds_method_and_generic_type() {
    let fixture = two_documents();
    let index = SemanticIndex::build(&fixture.project);
    let document = fixture.project.document(fixture.marker_document(0)).unwrap();
    let model = SemanticModel::new(&index, document);

    let param: ast::Parameter = node_at(document, fixture.marker_offset(0));
    let symbol = model.declared_parameter(&param).unwrap();

    assert_eq!(symbol.name, "callback");
    assert_eq!(symbol.ordinal, 0);
    assert!(matches!(symbol.owner, ParameterOwner::Method(_)));
    assert_eq!(model.display_type(&symbol.ty, param.syntax()), "Action<string>");
    assert_eq!(
        index.display_qualified(&symbol.ty),
        "System.Action<string>"
    );
}

#[test]
fn parameter_use_in_body_is_the_declared_parameter() {
    let fixture = two_documents();
    let index = SemanticIndex::build(&fixture.project);
    let document = fixture.project.document_by_name("Class1.cs").unwrap();
    let model = SemanticModel::new(&index, document);

    let call = document
        .syntax()
        .descendants()
        .filter_map(ast::InvocationExpression::cast)
        .find(|call| call.syntax().text().to_string() == "callback(\"x\")")
        .unwrap();
    let Some(Symbol::Parameter(param)) = model.symbol_of_expression(&call.callee().unwrap())
    else {
        panic!("callee should bind to the parameter");
    };
    assert_eq!(param.name, "callback");
    assert_eq!(model.type_of_expression(&ast::Expression::cast(call.syntax().clone()).unwrap()), Some(Ty::Void));
}

#[test]
fn find_callers_spans_documents_and_respects_overloads() {
    let fixture = two_documents();
    let index = SemanticIndex::build(&fixture.project);
    let class1 = fixture.project.document_by_name("Class1.cs").unwrap();
    let model = SemanticModel::new(&index, class1);
    let action_overload = method_named(&model, "Method1", "Action<string>");
    let int_overload = method_named(&model, "Method1", "int");

    let token = sable_core::CancellationToken::new();
    let callers = find_callers(&index, &fixture.project, action_overload, &token).unwrap();
    let docs: Vec<_> = callers
        .iter()
        .map(|c| fixture.project.document(c.document).unwrap().name().to_string())
        .collect();
    assert_eq!(docs, vec!["Class1.cs", "Class2.cs"]);

    let callers = find_callers(&index, &fixture.project, int_overload, &token).unwrap();
    assert_eq!(callers.len(), 1);
    let class2 = fixture.project.document(callers[0].document).unwrap();
    let text = callers[0].invocation.to_node(&class2.syntax()).unwrap().text().to_string();
    assert_eq!(text, "c.Method1(3)");
}

#[test]
fn find_callers_stops_when_cancelled() {
    let fixture = two_documents();
    let index = SemanticIndex::build(&fixture.project);
    let class1 = fixture.project.document_by_name("Class1.cs").unwrap();
    let model = SemanticModel::new(&index, class1);
    let method = method_named(&model, "Method1", "int");

    let token = sable_core::CancellationToken::new();
    token.cancel();
    assert_eq!(
        find_callers(&index, &fixture.project, method, &token),
        Err(sable_core::Cancelled)
    );
}

#[test]
fn display_type_uses_shortest_binding_qualification() {
    let fixture = two_documents();
    let index = SemanticIndex::build(&fixture.project);
    let write = index
        .type_by_path("ClassLibrary1", "Class1", 0)
        .and_then(|class1| {
            index
                .type_data(class1)
                .nested
                .iter()
                .copied()
                .find(|&t| index.type_data(t).name == "Write")
        })
        .unwrap();
    let write = Ty::named(write);

    let class1 = fixture.project.document_by_name("Class1.cs").unwrap();
    let class2 = fixture.project.document_by_name("Class2.cs").unwrap();
    let in_class1: ast::Parameter = node_at(class1, fixture_offset(CLASS1, "callback"));
    let at_caller: SyntaxNode = node_at::<ast::Block>(class2, fixture.marker_offset(1)).syntax().clone();
    let at_other: SyntaxNode = node_at::<ast::Block>(class2, fixture.marker_offset(2)).syntax().clone();

    let model1 = SemanticModel::new(&index, class1);
    let model2 = SemanticModel::new(&index, class2);
    assert_eq!(model1.display_type(&write, in_class1.syntax()), "Write");
    assert_eq!(model2.display_type(&write, &at_caller), "Class1.Write");
    assert_eq!(model2.display_type(&write, &at_other), "ClassLibrary1.Class1.Write");
}

fn fixture_offset(text: &str, needle: &str) -> TextSize {
    let (stripped, _) = sable_test_utils::strip_markers(text);
    TextSize::try_from(stripped.find(needle).unwrap()).unwrap()
}

#[test]
fn immutable_array_chains_and_aliases_are_typed() {
    let fixture = Fixture::parse(
        r#"
using System.Collections.Immutable;
using imOfInt = System.Collections.Immutable.ImmutableArray<int>;

class C
{
    void M()
    {
        var array = ImmutableArray<int>.Empty.Add(1);
        var alias = imOfInt.Empty.Add(1);
        var qualified = System.Collections.Immutable.ImmutableArray<long>.Empty;
        var length = array.Length;
        var created = ImmutableArray.Create(1);
        var explicitly = ImmutableArray.Create<string>();
    }
}
"#,
    );
    let index = SemanticIndex::build(&fixture.project);
    let document = fixture.project.document_by_name("Test0.cs").unwrap();
    let model = SemanticModel::new(&index, document);

    assert_eq!(
        declarator_types(&model),
        vec![
            ("array".to_string(), "ImmutableArray<int>".to_string()),
            ("alias".to_string(), "ImmutableArray<int>".to_string()),
            ("qualified".to_string(), "ImmutableArray<long>".to_string()),
            ("length".to_string(), "int".to_string()),
            ("created".to_string(), "ImmutableArray<int>".to_string()),
            ("explicitly".to_string(), "ImmutableArray<string>".to_string()),
        ]
    );
}

#[test]
fn literals_and_foreach_variables_are_typed() {
    let fixture = Fixture::parse(
        r#"
using System.Collections.Generic;

class C
{
    void M()
    {
        var a = 1L;
        var b = 2u;
        var c = 3UL;
        var d = 1.5f;
        var e = 2m;
        var f = 2.5;
        var g = 'c';
        var h = "s";
        var i = true;
        var j = -1;
        var k = 1 + 2L;
        var l = "n" + 1;
        foreach (var item in new List<int>())
        {
            var m = item;
        }
    }
}
"#,
    );
    let index = SemanticIndex::build(&fixture.project);
    let document = fixture.project.document_by_name("Test0.cs").unwrap();
    let model = SemanticModel::new(&index, document);

    let got: Vec<String> = declarator_types(&model)
        .into_iter()
        .map(|(name, ty)| format!("{name}: {ty}"))
        .collect();
    assert_eq!(
        got,
        vec![
            "a: long", "b: uint", "c: ulong", "d: float", "e: decimal", "f: double", "g: char",
            "h: string", "i: bool", "j: int", "k: long", "l: string", "m: int",
        ]
    );
}

#[test]
fn overloads_resolve_by_argument_type() {
    let fixture = Fixture::parse(
        r#"
using System;

class C
{
    void M()
    {
        Console.WriteLine();
        Console.WriteLine("text");
        Console.WriteLine(42);
        Console.WriteLine(4.2);
        Console.WriteLine(null);
    }
}
"#,
    );
    let index = SemanticIndex::build(&fixture.project);
    let document = fixture.project.document_by_name("Test0.cs").unwrap();
    let model = SemanticModel::new(&index, document);

    let got: Vec<String> = document
        .syntax()
        .descendants()
        .filter_map(ast::InvocationExpression::cast)
        .map(|call| match model.invoked_method(&call) {
            Some(method) => {
                let params: Vec<_> = index
                    .method(method)
                    .params
                    .iter()
                    .map(|p| index.display_qualified(&p.ty))
                    .collect();
                format!("WriteLine({})", params.join(", "))
            }
            None => "ambiguous".to_string(),
        })
        .collect();
    assert_eq!(
        got,
        vec![
            "WriteLine()",
            "WriteLine(string)",
            "WriteLine(int)",
            "WriteLine(object)",
            // `string` and `object` both accept null with equal rank.
            "ambiguous",
        ]
    );
}

#[test]
fn params_overload_is_chosen_for_several_arguments() {
    let fixture = Fixture::parse(
        "using System.Collections.Immutable;\nclass C { void M() { ImmutableArray.Create(1, 2, 3); ImmutableArray.Create(1); } }",
    );
    let index = SemanticIndex::build(&fixture.project);
    let document = fixture.project.document_by_name("Test0.cs").unwrap();
    let model = SemanticModel::new(&index, document);

    let shapes: Vec<(usize, bool)> = document
        .syntax()
        .descendants()
        .filter_map(ast::InvocationExpression::cast)
        .map(|call| {
            let method = index.method(model.invoked_method(&call).unwrap());
            (method.params.len(), method.params[0].is_params)
        })
        .collect();
    assert_eq!(shapes, vec![(1, true), (1, false)]);
}

#[test]
fn extension_methods_bind_with_the_receiver_as_first_argument() {
    let fixture = Fixture::parse(
        r#"
//- /Ext.cs
using System;
namespace Lib
{
    public static class TextExtensions
    {
        public static void Send(this string text, Action<string> sink) { }
    }
}
//- /Use.cs
using System;
using Lib;
class C
{
    void M(Action<string> w)
    {
        "x".Send(w);
        TextExtensions.Send("y", w);
        "z".Send();
    }
}
//- /Unimported.cs
using System;
class D
{
    void M(Action<string> w) { "x".Send(w); }
}
"#,
    );
    let index = SemanticIndex::build(&fixture.project);
    let calls = |name: &str| -> Vec<(Option<MethodId>, Vec<Option<String>>)> {
        let document = fixture.project.document_by_name(name).unwrap();
        let model = SemanticModel::new(&index, document);
        document
            .syntax()
            .descendants()
            .filter_map(ast::InvocationExpression::cast)
            .map(|call| {
                let method = model.invoked_method(&call);
                let args = method
                    .map(|m| {
                        (0..2)
                            .map(|ordinal| {
                                model
                                    .argument_for_parameter(&call, m, ordinal)
                                    .map(|e| e.syntax().to_string())
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                (method, args)
            })
            .collect()
    };

    let used = calls("Use.cs");
    let send = used[0].0.expect("reduced call binds");
    assert!(index.method(send).is_extension);
    assert_eq!(
        used,
        vec![
            (Some(send), vec![Some("\"x\"".to_string()), Some("w".to_string())]),
            (Some(send), vec![Some("\"y\"".to_string()), Some("w".to_string())]),
            (None, vec![]),
        ]
    );
    assert_eq!(calls("Unimported.cs"), vec![(None, vec![])]);

    let callers = find_callers(&index, &fixture.project, send, &sable_core::CancellationToken::new()).unwrap();
    assert_eq!(callers.len(), 2);
}
