use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use sable_core::CancellationToken;
use sable_refactor::{apply_create_custom_delegate, offer_create_custom_delegate};
use sable_syntax::ast::{self, AstNode};
use sable_syntax::TextRange;
use sable_workspace::{DocumentId, Project};

const TARGET: &str = r#"
using System;
public static class Class1
{
    public static void Method1(Action<string /*firstName*/, int /*age*/> write)
    {
        write("Adam", 42);
    }
}"#;

fn caller(i: usize) -> String {
    format!(
        r#"
using System;
public static class Caller{i}
{{
    public static void Forward(Action<string, int> write)
    {{
        Class1.Method1(write);
    }}

    public static void Inline()
    {{
        Class1.Method1((name, age) => {{ }});
    }}
}}
"#
    )
}

fn project_with_callers(callers: usize) -> (Project, DocumentId, TextRange) {
    let mut sources = vec![("Class1.cs".to_string(), TARGET.to_string())];
    sources.extend((0..callers).map(|i| (format!("Caller{i}.cs"), caller(i))));
    let project = Project::from_sources(sources).expect("project");
    let target = project.document_by_name("Class1.cs").expect("target");
    let span = target
        .syntax()
        .descendants()
        .find_map(ast::Parameter::cast)
        .and_then(|p| p.name_token())
        .expect("parameter")
        .text_range();
    let id = target.id();
    (project, id, span)
}

fn bench_create_custom_delegate(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_custom_delegate");
    let token = CancellationToken::new();

    for callers in [1usize, 32] {
        let (project, document, span) = project_with_callers(callers);

        group.bench_function(format!("offer/{callers}_callers"), |b| {
            b.iter(|| {
                let offer = offer_create_custom_delegate(&project, document, span, &token)
                    .expect("not cancelled");
                black_box(offer);
            })
        });

        let offer = offer_create_custom_delegate(&project, document, span, &token)
            .expect("not cancelled")
            .expect("offered");
        group.bench_function(format!("apply/{callers}_callers"), |b| {
            b.iter_batched(
                || project.clone(),
                |project| {
                    let next = apply_create_custom_delegate(&project, &offer, &token)
                        .expect("applied");
                    black_box(next);
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_create_custom_delegate);
criterion_main!(benches);
