use pretty_assertions::assert_eq;
use sable_config::DiagnosticsConfig;
use sable_core::CancellationToken;
use sable_ide::{
    apply_code_fix, code_fixes, diagnostics, CodeFixError, Diagnostic, Severity,
    BAD_IMMUTABLE_ARRAY_CREATION, USE_IMMUTABLE_ARRAY_CREATE_TITLE,
};
use sable_test_utils::Fixture;
use sable_workspace::Project;

fn analyze(code: &str) -> (Project, Vec<Diagnostic>) {
    let fixture = Fixture::parse(code);
    let document = fixture.document_id("Test0.cs");
    let found = diagnostics(
        &fixture.project,
        document,
        &DiagnosticsConfig::default(),
        &CancellationToken::new(),
    )
    .expect("not cancelled");
    (fixture.project, found)
}

fn start_lines(project: &Project, found: &[Diagnostic]) -> Vec<u32> {
    found
        .iter()
        .map(|d| d.start(project).expect("position").line)
        .collect()
}

fn fix(code: &str) -> String {
    let (project, found) = analyze(code);
    assert_eq!(found.len(), 1, "expected one diagnostic");
    let fixes = code_fixes(&project, &found[0]).expect("fixable");
    assert_eq!(fixes.len(), 1);
    assert_eq!(fixes[0].title, USE_IMMUTABLE_ARRAY_CREATE_TITLE);
    let next = apply_code_fix(&project, &fixes[0], &CancellationToken::new()).expect("applied");
    next.document(found[0].document)
        .expect("document")
        .text()
        .to_string()
}

#[test]
fn empty_method_has_no_diagnostics() {
    let (_, found) = analyze(
        r#"
public static class Program
{
    public static void Main()
    {
    }
}"#,
    );
    assert_eq!(found, Vec::new());
}

#[test]
fn empty_add_with_imported_namespace() {
    let (project, found) = analyze(
        r#"
using System.Collections.Immutable;

public static class Program
{
    public static void Main()
    {
        var array = ImmutableArray<int>.Empty.Add(1);
    }
}"#,
    );
    assert_eq!(start_lines(&project, &found), [7]);
    let diagnostic = &found[0];
    assert_eq!(diagnostic.code, "BadWayOfCreatingImmutableArray");
    assert_eq!(diagnostic.severity, Severity::Error);
    assert_eq!(diagnostic.message, BAD_IMMUTABLE_ARRAY_CREATION.title);
    let document = project.document(diagnostic.document).expect("document");
    assert_eq!(
        &document.text()[diagnostic.range],
        "ImmutableArray<int>.Empty.Add(1)"
    );
}

#[test]
fn empty_add_fully_qualified() {
    let (project, found) = analyze(
        r#"
public static class Program
{
    public static void Main()
    {
        var array = System.Collections.Immutable.ImmutableArray<int>.Empty.Add(1);
    }
}"#,
    );
    assert_eq!(start_lines(&project, &found), [5]);
}

#[test]
fn empty_add_through_alias() {
    let (project, found) = analyze(
        r#"
using imOfInt = System.Collections.Immutable.ImmutableArray<int>;

public static class Program
{
    public static void Main()
    {
        var array = imOfInt.Empty.Add(1);
    }
}"#,
    );
    assert_eq!(start_lines(&project, &found), [7]);
}

#[test]
fn look_alikes_are_not_reported() {
    let (_, found) = analyze(
        r#"
using System.Collections.Generic;
using System.Collections.Immutable;

namespace Mine
{
    public class ImmutableArray<T>
    {
        public static ImmutableArray<T> Empty;
        public ImmutableArray<T> Add(T item) => this;
    }
}

public static class Program
{
    public static void Main(List<int> list)
    {
        var two = ImmutableArray<int>.Empty.AddRange(1, 2);
        var mine = Mine.ImmutableArray<int>.Empty.Add(1);
        var created = ImmutableArray.Create(1);
        list.Add(1);
    }
}"#,
    );
    assert_eq!(found, Vec::new());
}

#[test]
fn fix_without_imported_namespace_keeps_qualification() {
    let actual = fix(r#"
public static class Program
{
    public static void Main()
    {
        var array = System.Collections.Immutable.ImmutableArray<int>.Empty.Add(1);
    }
}"#);
    assert_eq!(
        actual,
        r#"
public static class Program
{
    public static void Main()
    {
        var array = System.Collections.Immutable.ImmutableArray.Create(1);
    }
}"#
    );
}

#[test]
fn fix_with_imported_namespace() {
    let actual = fix("using System.Collections.Immutable;\nclass P { void M() { var a = ImmutableArray<string>.Empty.Add(\"x\"); } }\n");
    assert_eq!(
        actual,
        "using System.Collections.Immutable;\nclass P { void M() { var a = ImmutableArray.Create(\"x\"); } }\n"
    );
}

#[test]
fn fix_makes_implicit_conversions_explicit() {
    let actual = fix("using System.Collections.Immutable;\nclass P { void M() { var a = ImmutableArray<long>.Empty.Add(1); } }\n");
    assert_eq!(
        actual,
        "using System.Collections.Immutable;\nclass P { void M() { var a = ImmutableArray.Create<long>(1); } }\n"
    );
}

#[test]
fn fix_for_alias_spells_the_namespace() {
    let actual = fix("using imOfInt = System.Collections.Immutable.ImmutableArray<int>;\nclass P { void M() { var a = imOfInt.Empty.Add(1); } }\n");
    assert_eq!(
        actual,
        "using imOfInt = System.Collections.Immutable.ImmutableArray<int>;\nclass P { void M() { var a = System.Collections.Immutable.ImmutableArray.Create(1); } }\n"
    );
}

#[test]
fn misplaced_diagnostic_is_rejected() {
    let (project, found) = analyze(
        "using System.Collections.Immutable;\nclass P { void M() { var a = ImmutableArray<int>.Empty.Add(1); } }\n",
    );
    let mut moved = found[0].clone();
    moved.range = moved.range.checked_sub(1.into()).expect("range");
    assert!(matches!(
        code_fixes(&project, &moved),
        Err(CodeFixError::UnexpectedShape { .. })
    ));

    let mut other = found[0].clone();
    other.code = "SomethingElse";
    assert_eq!(
        code_fixes(&project, &other),
        Err(CodeFixError::NotFixable("SomethingElse"))
    );
}
