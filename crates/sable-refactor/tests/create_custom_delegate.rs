use pretty_assertions::assert_eq;
use sable_core::CancellationToken;
use sable_refactor::{
    apply_create_custom_delegate, offer_create_custom_delegate, CreateCustomDelegate,
    DelegateOffer, RefactorError, RefactorPhase, CREATE_CUSTOM_DELEGATE_TITLE,
};
use sable_syntax::ast::{self, AstNode};
use sable_syntax::TextRange;
use sable_test_utils::Fixture;
use sable_workspace::{DocumentId, Project};

/// Two documents, the first parameter of the first document as the selected span, mirroring
/// how an editor asks for refactorings at a parameter name.
struct Setup {
    project: Project,
    first: DocumentId,
    second: DocumentId,
    span: TextRange,
}

fn setup(code: &str, second: &str) -> Setup {
    let fixture = Fixture::from_documents([("Document.cs", code), ("Document2.cs", second)]);
    let first = fixture.document_id("Document.cs");
    let second = fixture.document_id("Document2.cs");
    let span = first_parameter_name(&fixture.project, first);
    Setup {
        project: fixture.project,
        first,
        second,
        span,
    }
}

fn first_parameter_name(project: &Project, document: DocumentId) -> TextRange {
    project
        .document(document)
        .expect("document")
        .syntax()
        .descendants()
        .find_map(ast::Parameter::cast)
        .and_then(|p| p.name_token())
        .expect("a named parameter")
        .text_range()
}

fn offer(setup: &Setup) -> Option<DelegateOffer> {
    offer_create_custom_delegate(
        &setup.project,
        setup.first,
        setup.span,
        &CancellationToken::new(),
    )
    .expect("not cancelled")
}

fn apply_code_refactoring(code: &str, second: &str) -> (String, String) {
    let setup = setup(code, second);
    let offer = offer(&setup).expect("refactoring offered");
    assert_eq!(offer.title(), CREATE_CUSTOM_DELEGATE_TITLE);
    let next = apply_create_custom_delegate(&setup.project, &offer, &CancellationToken::new())
        .expect("refactoring applied");
    let text = |id| next.document(id).expect("document").text().to_string();
    (text(setup.first), text(setup.second))
}

const CLASS1: &str = r#"
using System;
public static class Class1
{
    public static void Method1(Action<string /*firstName*/> write)
    {
        write("Adam");
    }
}"#;

const CLASS1_AFTER: &str = r#"
using System;
public static class Class1
{
    public delegate void Write(string firstName);
    public static void Method1(Write write)
    {
        write("Adam");
    }
}"#;

const CALLER: &str = r#"
using System;
public static class CallerClass1
{
    public static void Method2(Action<string /*firstName*/> write)
    {
        Class1.Method1(write);
    }
}
"#;

const CALLER_AFTER: &str = r#"
using System;
public static class CallerClass1
{
    public static void Method2(Class1.Write write)
    {
        Class1.Method1(write);
    }
}
"#;

#[test]
fn basic_action_parameter() {
    let (actual, second) = apply_code_refactoring(CLASS1, "");
    assert_eq!(actual, CLASS1_AFTER);
    assert_eq!(second, "");
}

#[test]
fn caller_in_another_document() {
    let (actual, caller) = apply_code_refactoring(CLASS1, CALLER);
    assert_eq!(actual, CLASS1_AFTER);
    assert_eq!(caller, CALLER_AFTER);
}

#[test]
fn callers_in_another_and_the_same_document() {
    let code = r#"
using System;
public static class Class1
{
    public static void Method1(Action<string /*firstName*/> write)
    {
        write("Adam");
    }

    public static void CallerInMyDocument(Action<string /*firstName*/> write)
    {
        Method1(write);
    }
}"#;
    let expected = r#"
using System;
public static class Class1
{
    public delegate void Write(string firstName);
    public static void Method1(Write write)
    {
        write("Adam");
    }

    public static void CallerInMyDocument(Write write)
    {
        Method1(write);
    }
}"#;
    let (actual, caller) = apply_code_refactoring(code, CALLER);
    assert_eq!(actual, expected);
    assert_eq!(caller, CALLER_AFTER);
}

#[test]
fn func_uses_last_type_argument_as_return_type() {
    let code = "class C\n{\n    int M(Func<string, int> parse) => parse(\"1\");\n}\n";
    let code = format!("using System;\n{code}");
    let (actual, _) = apply_code_refactoring(&code, "");
    assert_eq!(
        actual,
        "using System;\nclass C\n{\n    public delegate int Parse(string arg);\n    int M(Parse parse) => parse(\"1\");\n}\n"
    );
}

#[test]
fn unannotated_arguments_take_invoke_parameter_names() {
    let code = "using System;\nclass C\n{\n    void M(Action<string /*name*/, int> log, Func<bool> ready) { }\n}\n";
    let (actual, _) = apply_code_refactoring(code, "");
    assert_eq!(
        actual,
        "using System;\nclass C\n{\n    public delegate void Log(string name, int arg2);\n    void M(Log log, Func<bool> ready) { }\n}\n"
    );
}

#[test]
fn parameterless_func_and_namespaced_types() {
    let code = "using System;\nusing System.Collections.Generic;\nnamespace N\n{\n    class C\n    {\n        void M(Func<List<int>> make) { }\n    }\n}\n";
    let (actual, _) = apply_code_refactoring(code, "");
    assert_eq!(
        actual,
        "using System;\nusing System.Collections.Generic;\nnamespace N\n{\n    class C\n    {\n        public delegate List<int> Make();\n        void M(Make make) { }\n    }\n}\n"
    );
}

#[test]
fn arguments_that_are_not_forwarded_parameters_are_left_alone() {
    let caller = r#"
using System;
public static class CallerClass1
{
    public static void Method2(Action<string> write)
    {
        Action<string> local = write;
        Class1.Method1(local);
        Class1.Method1(s => { });
        Class1.Method1(null);
        Class1.Method1(Console.WriteLine);
    }
}
"#;
    let (actual, second) = apply_code_refactoring(CLASS1, caller);
    assert_eq!(actual, CLASS1_AFTER);
    assert_eq!(second, caller);
}

#[test]
fn not_offered_for_other_parameter_types() {
    for ty in [
        "Predicate<string>",
        "System.Action<string>",
        "Action",
        "List<string>",
        "string",
    ] {
        let code = format!(
            "using System;\nusing System.Collections.Generic;\nclass C\n{{\n    void M({ty} p) {{ }}\n}}\n"
        );
        let setup = setup(&code, "");
        assert!(offer(&setup).is_none(), "offered for {ty}");
    }
}

#[test]
fn not_offered_outside_method_parameter_lists() {
    let cases = [
        // Constructor parameter.
        "using System;\nclass C\n{\n    C(Action<string> p) { }\n}\n",
        // Delegate declaration parameter.
        "using System;\ndelegate void D(Action<string> p);\n",
        // Lambda parameter.
        "using System;\nclass C\n{\n    Func<Action<int>, int> f = (Action<int> p) => 0;\n}\n",
    ];
    for code in cases {
        let setup = setup(code, "");
        assert!(offer(&setup).is_none(), "offered for {code}");
    }
}

#[test]
fn offered_span_must_select_the_parameter() {
    let setup = setup(CLASS1, "");
    let doc = setup.project.document(setup.first).expect("document");
    let body_start = doc.text().find("write(\"Adam\")").expect("call");
    let start = u32::try_from(body_start).expect("offset").into();
    let span = TextRange::at(start, 5.into());
    let offer = offer_create_custom_delegate(&setup.project, setup.first, span, &CancellationToken::new())
        .expect("not cancelled");
    assert!(offer.is_none());
}

#[test]
fn offer_describes_the_delegate() {
    let setup = setup(CLASS1, "");
    let offer = offer(&setup).expect("offered");
    let summary = offer.summary();
    assert_eq!(summary.delegate_name, "Write");
    assert_eq!(summary.parameter_names, ["firstName"]);
    assert!(!summary.returns_value);
}

#[test]
fn refactored_parameter_is_not_offered_again() {
    let setup = setup(CLASS1, "");
    let offer = offer(&setup).expect("offered");
    let next = apply_create_custom_delegate(&setup.project, &offer, &CancellationToken::new())
        .expect("applied");
    let span = first_parameter_name(&next, setup.first);
    let again = offer_create_custom_delegate(&next, setup.first, span, &CancellationToken::new())
        .expect("not cancelled");
    assert!(again.is_none());
}

#[test]
fn stale_offer_is_rejected() {
    let setup = setup(CLASS1, CALLER);
    let offer = offer(&setup).expect("offered");
    let edited = setup
        .project
        .with_document_text(setup.first, format!("{CLASS1}\n// edited"))
        .expect("edit");
    let err = apply_create_custom_delegate(&edited, &offer, &CancellationToken::new())
        .expect_err("stale");
    assert_eq!(err, RefactorError::StaleOffer(setup.first));
}

#[test]
fn lifecycle_through_the_orchestrator() {
    let setup = setup(CLASS1, CALLER);
    let token = CancellationToken::new();
    let mut refactoring = CreateCustomDelegate::new();
    assert!(matches!(refactoring.phase(), RefactorPhase::Idle));
    assert_eq!(
        refactoring.accept(&setup.project, &token).expect_err("nothing offered"),
        RefactorError::NotOffered
    );

    let offered = refactoring
        .compute_offer(&setup.project, setup.first, setup.span, &token)
        .expect("not cancelled");
    assert_eq!(offered.map(|o| o.delegate_name.as_str()), Some("Write"));
    assert!(matches!(refactoring.phase(), RefactorPhase::Offered(_)));

    let next = refactoring.accept(&setup.project, &token).expect("applied");
    assert!(matches!(refactoring.phase(), RefactorPhase::Done));
    assert_eq!(next.document(setup.second).expect("doc").text(), CALLER_AFTER);
    assert_eq!(
        refactoring.accept(&next, &token).expect_err("already applied"),
        RefactorError::NotOffered
    );
}

#[test]
fn cancellation_aborts_without_changes() {
    let setup = setup(CLASS1, CALLER);
    let mut refactoring = CreateCustomDelegate::new();
    refactoring
        .compute_offer(&setup.project, setup.first, setup.span, &CancellationToken::new())
        .expect("not cancelled")
        .expect("offered");

    let cancelled = CancellationToken::new();
    cancelled.cancel();
    let err = refactoring
        .accept(&setup.project, &cancelled)
        .expect_err("cancelled");
    assert_eq!(err, RefactorError::Cancelled);
    assert!(matches!(
        refactoring.phase(),
        RefactorPhase::Aborted(RefactorError::Cancelled)
    ));
    assert_eq!(
        setup.project.document(setup.first).expect("doc").text(),
        CLASS1
    );

    assert!(offer_create_custom_delegate(&setup.project, setup.first, setup.span, &cancelled).is_err());
}

/// Applies the refactoring at the parameter whose name follows `$0` and returns every
/// document's text by name.
fn apply_at_marker(fixture: &str) -> Vec<(String, String)> {
    let fixture = Fixture::parse(fixture);
    let document = fixture.marker_document(0);
    let span = fixture
        .project
        .document(document)
        .expect("document")
        .syntax()
        .token_at_offset(fixture.marker_offset(0))
        .right_biased()
        .expect("parameter name")
        .text_range();
    let token = CancellationToken::new();
    let offer = offer_create_custom_delegate(&fixture.project, document, span, &token)
        .expect("not cancelled")
        .expect("refactoring offered");
    let next = apply_create_custom_delegate(&fixture.project, &offer, &token).expect("applied");
    next.documents()
        .map(|doc| (doc.name().to_string(), doc.text().to_string()))
        .collect()
}

#[test]
fn extension_method_called_on_a_receiver() {
    let texts = apply_at_marker(
        r#"
//- /Extensions.cs
using System;
public static class Extensions
{
    public static void Method1(this string s, Action<string /*text*/> $0write) { }
}
//- /B.cs
using System;
public static class B
{
    public static void F(Action<string> w) { "x".Method1(w); }
}
"#,
    );
    assert_eq!(
        texts,
        [
            (
                "Extensions.cs".to_string(),
                "using System;\npublic static class Extensions\n{\n    public delegate void Write(string text);\n    public static void Method1(this string s, Write write) { }\n}".to_string()
            ),
            (
                "B.cs".to_string(),
                "using System;\npublic static class B\n{\n    public static void F(Extensions.Write w) { \"x\".Method1(w); }\n}".to_string()
            ),
        ]
    );
}

#[test]
fn same_document_forwarder_in_another_type_gets_the_simple_name() {
    let texts = apply_at_marker(
        r#"
//- /Class1.cs
using System;
public static class Class1
{
    public static void Method1(Action<string> $0write) { }
}
public static class Other
{
    public static void Forward(Action<string> w) { Class1.Method1(w); }
}
"#,
    );
    assert_eq!(
        texts,
        [(
            "Class1.cs".to_string(),
            "using System;\npublic static class Class1\n{\n    public delegate void Write(string obj);\n    public static void Method1(Write write) { }\n}\npublic static class Other\n{\n    public static void Forward(Write w) { Class1.Method1(w); }\n}".to_string()
        )]
    );
}
