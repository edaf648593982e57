use pretty_assertions::assert_eq;
use sable_config::{DiagnosticLevel, SableConfig};
use sable_core::CancellationToken;
use sable_ide::{code_actions, CodeAction, CodeActionKind};
use sable_test_utils::Fixture;

const CODE: &str = r#"
using System;
using System.Collections.Immutable;
public static class Worker
{
    public static void Run(Action<int> [|callback|])
    {
        var seed = ImmutableArray<int>.Empty.Add(1);
    }
}"#;

fn actions(code: &str, config: &SableConfig) -> (Fixture, Vec<CodeAction>) {
    let fixture = Fixture::parse(code);
    let (document, range) = fixture.range();
    let actions = code_actions(
        &fixture.project,
        document,
        range,
        config,
        &CancellationToken::new(),
    )
    .expect("not cancelled");
    (fixture, actions)
}

fn titles(actions: &[CodeAction]) -> Vec<(&str, CodeActionKind)> {
    actions
        .iter()
        .map(|action| (action.title.as_str(), action.kind))
        .collect()
}

#[test]
fn refactoring_at_parameter() {
    let (fixture, found) = actions(CODE, &SableConfig::default());
    assert_eq!(
        titles(&found),
        [("Create Custom Delegate", CodeActionKind::RefactorRewrite)]
    );

    let (document, _) = fixture.range();
    let next = found[0]
        .apply(&fixture.project, &CancellationToken::new())
        .expect("applied");
    assert_eq!(
        next.document(document).expect("document").text(),
        r#"
using System;
using System.Collections.Immutable;
public static class Worker
{
    public delegate void Callback(int obj);
    public static void Run(Callback callback)
    {
        var seed = ImmutableArray<int>.Empty.Add(1);
    }
}"#
    );
}

#[test]
fn fix_for_selected_diagnostic() {
    let code = r#"
using System.Collections.Immutable;
public static class Worker
{
    public static void Run()
    {
        var seed = [|ImmutableArray|]<int>.Empty.Add(1);
    }
}"#;
    let (fixture, found) = actions(code, &SableConfig::default());
    assert_eq!(
        titles(&found),
        [("Use ImmutableArray.Create", CodeActionKind::QuickFix)]
    );

    let (document, _) = fixture.range();
    let next = found[0]
        .apply(&fixture.project, &CancellationToken::new())
        .expect("applied");
    assert_eq!(
        next.document(document).expect("document").text(),
        r#"
using System.Collections.Immutable;
public static class Worker
{
    public static void Run()
    {
        var seed = ImmutableArray.Create(1);
    }
}"#
    );
}

#[test]
fn diagnostics_outside_the_selection_offer_nothing() {
    let (_, found) = actions(CODE, &SableConfig::default());
    assert!(found
        .iter()
        .all(|action| action.kind != CodeActionKind::QuickFix));
}

#[test]
fn config_switches_providers_off() {
    let mut config = SableConfig::default();
    config.refactor.create_custom_delegate = false;
    let (_, found) = actions(CODE, &config);
    assert_eq!(titles(&found), Vec::new());

    let code = "using System.Collections.Immutable;\nclass W { void R() { var s = [|ImmutableArray<int>.Empty.Add(1)|]; } }";
    config.diagnostics.immutable_array_creation = DiagnosticLevel::Off;
    let (_, found) = actions(code, &config);
    assert_eq!(titles(&found), Vec::new());
}

#[test]
fn kinds_serialize_like_protocol_strings() {
    assert_eq!(
        serde_json::to_string(&[CodeActionKind::RefactorRewrite, CodeActionKind::QuickFix])
            .expect("serialize"),
        r#"["refactor.rewrite","quickfix"]"#
    );
}
