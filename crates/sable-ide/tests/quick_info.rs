use pretty_assertions::assert_eq;
use sable_config::QuickInfoConfig;
use sable_core::{TextRange, TextSize};
use sable_ide::{quick_info, sum_type_quick_info, QuickInfo};
use sable_test_utils::Fixture;

fn hover(code: &str) -> Option<QuickInfo> {
    let fixture = Fixture::parse(code);
    sum_type_quick_info(
        &fixture.project,
        fixture.marker_document(0),
        fixture.marker_offset(0),
    )
}

fn usage(shape: &str) -> String {
    format!(
        r#"
{shape}

public static class Program
{{
    public static void Main($0Shape shape)
    {{
    }}
}}"#
    )
}

#[test]
fn single_case() {
    let code = usage(
        r#"public abstract class Shape
{
    private Shape() { }
    public sealed class Square : Shape { }
}"#,
    );
    let fixture = Fixture::parse(&code);
    let offset = fixture.marker_offset(0);
    let info = sum_type_quick_info(&fixture.project, fixture.marker_document(0), offset)
        .expect("quick info");
    assert_eq!(info.message, "Sum type cases:\nSquare");
    assert_eq!(
        info.range,
        TextRange::at(offset, TextSize::of("Shape"))
    );
}

#[test]
fn several_cases_in_declaration_order() {
    let info = hover(&usage(
        r#"public abstract class Shape
{
    private Shape() { }
    public sealed class Square : Shape { }
    public sealed class Circle : Shape { }
}"#,
    ));
    assert_eq!(
        info.map(|info| info.message),
        Some("Sum type cases:\nSquare\nCircle".to_string())
    );
}

#[test]
fn not_abstract() {
    let info = hover(&usage(
        r#"public class Shape
{
    private Shape() { }
    public sealed class Square : Shape { }
}"#,
    ));
    assert_eq!(info, None);
}

#[test]
fn generic_case_is_not_listed() {
    let info = hover(&usage(
        r#"public abstract class Shape
{
    private Shape() { }
    public sealed class Square<T> : Shape { }
}"#,
    ));
    assert_eq!(info, None);
}

#[test]
fn public_constructor() {
    let info = hover(&usage(
        r#"public abstract class Shape
{
    public Shape() { }
    public sealed class Square : Shape { }
}"#,
    ));
    assert_eq!(info, None);
}

#[test]
fn implicit_constructor() {
    let info = hover(&usage(
        r#"public abstract class Shape
{
    public sealed class Square : Shape { }
}"#,
    ));
    assert_eq!(info, None);
}

#[test]
fn nested_class_not_deriving() {
    let info = hover(&usage(
        r#"public abstract class Shape
{
    private Shape() { }
    public sealed class Square { }
}"#,
    ));
    assert_eq!(info, None);
}

#[test]
fn only_identifiers_get_quick_info() {
    let info = hover(
        r#"public abstract class Shape
{
    private Shape() { }
    public sealed class Square : Shape { }
}
$0class Program { void M(Shape shape) { } }"#,
    );
    assert_eq!(info, None);
}

#[test]
fn disabled_by_config() {
    let code = usage(
        r#"public abstract class Shape
{
    private Shape() { }
    public sealed class Square : Shape { }
}"#,
    );
    let fixture = Fixture::parse(&code);
    let document = fixture.marker_document(0);
    let offset = fixture.marker_offset(0);

    let enabled = QuickInfoConfig::default();
    assert!(quick_info(&fixture.project, document, offset, &enabled).is_some());
    let disabled = QuickInfoConfig { sum_types: false };
    assert_eq!(quick_info(&fixture.project, document, offset, &disabled), None);
}
