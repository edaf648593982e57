//! Callers that forward one of their own parameters into the refactored parameter.

use std::collections::HashSet;

use sable_core::CancellationToken;
use sable_hir::{
    find_callers, MethodId, ParameterOwner, ParameterSymbol, SemanticIndex, SemanticModel, Symbol,
};
use sable_syntax::ast::{self, AstNode};
use sable_syntax::SyntaxNodePtr;
use sable_workspace::{Document, DocumentId, Project};

use crate::error::RefactorError;

/// A caller parameter passed straight through to the target parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallSite {
    pub document: DocumentId,
    /// The caller's `Parameter` node.
    pub caller_parameter: SyntaxNodePtr,
}

/// Every distinct caller parameter forwarded as the argument for `target`.
///
/// An argument qualifies only when it binds to a parameter of the method containing the
/// call. Literals, locals, lambdas and other expressions are skipped, as is `target` itself
/// when the method calls itself with it.
pub fn find_call_sites(
    index: &SemanticIndex,
    project: &Project,
    target_document: DocumentId,
    target: &ParameterSymbol,
    token: &CancellationToken,
) -> Result<Vec<CallSite>, RefactorError> {
    let ParameterOwner::Method(method) = target.owner else {
        return Ok(Vec::new());
    };

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for caller in find_callers(index, project, method, token)? {
        let document = project
            .document(caller.document)
            .ok_or(RefactorError::UnexpectedCallShape {
                document: caller.document,
            })?;
        let model = SemanticModel::new(index, document);
        let call = invocation(document, caller.invocation)?;
        let Some(parameter) = forwarded_parameter(&model, &call, method, target.ordinal)? else {
            continue;
        };

        if caller.document == target_document && parameter.syntax == target.syntax {
            continue;
        }
        let site = CallSite {
            document: caller.document,
            caller_parameter: parameter.syntax,
        };
        if seen.insert(site) {
            tracing::debug!(
                target: "sable.refactor",
                document = %document.name(),
                parameter = %parameter.name,
                "found forwarding caller"
            );
            out.push(site);
        }
    }
    Ok(out)
}

/// The invocation `ptr` points at in `document`.
fn invocation(
    document: &Document,
    ptr: SyntaxNodePtr,
) -> Result<ast::InvocationExpression, RefactorError> {
    ptr.to_node(&document.syntax())
        .and_then(ast::InvocationExpression::cast)
        .ok_or(RefactorError::UnexpectedCallShape {
            document: document.id(),
        })
}

/// The parameter of the calling method that `call` passes straight through as parameter
/// `ordinal` of `method`, if any.
///
/// `call` is expected to bind to `method`, so every required parameter has an argument.
/// A required parameter without one is a [`RefactorError::MissingArgument`].
fn forwarded_parameter(
    model: &SemanticModel<'_>,
    call: &ast::InvocationExpression,
    method: MethodId,
    ordinal: usize,
) -> Result<Option<ParameterSymbol>, RefactorError> {
    let document = model.document();
    let Some(argument) = model.argument_for_parameter(call, method, ordinal) else {
        let declared = &model.index().method(method).params[ordinal];
        if declared.has_default || declared.is_params || has_expressionless_argument(call) {
            tracing::trace!(target: "sable.refactor", document = %document.name(), "argument omitted");
            return Ok(None);
        }
        return Err(RefactorError::MissingArgument {
            document: document.id(),
            ordinal,
        });
    };

    let caller_method = model.containing_method(call.syntax());
    match model.symbol_of_expression(&argument.clone().unparenthesized()) {
        Some(Symbol::Parameter(p))
            if matches!(p.owner, ParameterOwner::Method(m) if Some(m) == caller_method) =>
        {
            Ok(Some(p))
        }
        _ => {
            tracing::trace!(
                target: "sable.refactor",
                document = %document.name(),
                argument = %argument.syntax(),
                "argument is not a forwarded parameter"
            );
            Ok(None)
        }
    }
}

/// `out var x` and recovered arguments carry no expression to forward.
fn has_expressionless_argument(call: &ast::InvocationExpression) -> bool {
    call.argument_list()
        .map_or(false, |list| list.arguments().any(|arg| arg.expression().is_none()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sable_test_utils::Fixture;

    const FIXTURE: &str = r#"
//- /Class1.cs
using System;
public static class Class1
{
    public static void Method1(Action<string> $0write, int count = 0)
    {
        Method1(write);
    }
}
//- /Callers.cs
using System;
public static class Callers
{
    public static void Forward(Action<string> forward, Action<string> other)
    {
        Class1.Method1(forward);
        Class1.Method1((forward), 2);
        Class1.Method1(count: 1, write: other);
    }

    public static void NotForwarded(Action<string> unused)
    {
        Action<string> local = unused;
        Class1.Method1(local);
        Class1.Method1(s => { });
        Class1.Method1(null);
    }
}
"#;

    fn parameter_names(project: &Project, sites: &[CallSite]) -> Vec<String> {
        sites
            .iter()
            .map(|site| {
                let root = project.document(site.document).expect("document").syntax();
                let param = site
                    .caller_parameter
                    .to_node(&root)
                    .and_then(ast::Parameter::cast)
                    .expect("parameter");
                param.name().expect("name").to_string()
            })
            .collect()
    }

    fn target(fixture: &Fixture, index: &SemanticIndex) -> (DocumentId, ParameterSymbol) {
        let (document, offset) = (fixture.marker_document(0), fixture.marker_offset(0));
        let doc = fixture.project.document(document).expect("document");
        let model = SemanticModel::new(index, doc);
        let param = doc
            .syntax()
            .token_at_offset(offset)
            .right_biased()
            .and_then(|tok| tok.parent_ancestors().find_map(ast::Parameter::cast))
            .expect("parameter");
        (document, model.declared_parameter(&param).expect("symbol"))
    }

    #[test]
    fn forwarded_parameters_are_deduplicated() {
        let fixture = Fixture::parse(FIXTURE);
        let index = SemanticIndex::build(&fixture.project);
        let (document, symbol) = target(&fixture, &index);
        let sites = find_call_sites(
            &index,
            &fixture.project,
            document,
            &symbol,
            &CancellationToken::new(),
        )
        .expect("call sites");
        assert_eq!(parameter_names(&fixture.project, &sites), ["forward", "other"]);
    }

    #[test]
    fn callers_omitting_an_optional_argument_are_skipped() {
        let fixture = Fixture::parse(
            r#"
//- /A.cs
using System;
public static class A
{
    public static void M(int first, Action<string> $0second = null) { }
    public static void Call(Action<string> a) { M(1); M(2, a); }
}
"#,
        );
        let index = SemanticIndex::build(&fixture.project);
        let (document, symbol) = target(&fixture, &index);
        let sites = find_call_sites(
            &index,
            &fixture.project,
            document,
            &symbol,
            &CancellationToken::new(),
        )
        .expect("call sites");
        assert_eq!(parameter_names(&fixture.project, &sites), ["a"]);
    }

    #[test]
    fn reduced_extension_calls_forward_their_arguments() {
        let fixture = Fixture::parse(
            r#"
//- /Extensions.cs
using System;
public static class Extensions
{
    public static void Method1(this string s, Action<string> $0write) { }
}
//- /B.cs
using System;
public static class B
{
    public static void F(Action<string> w) { "x".Method1(w); }
    public static void G(Action<string> v) { Extensions.Method1("y", v); }
}
"#,
        );
        let index = SemanticIndex::build(&fixture.project);
        let (document, symbol) = target(&fixture, &index);
        let sites = find_call_sites(
            &index,
            &fixture.project,
            document,
            &symbol,
            &CancellationToken::new(),
        )
        .expect("call sites");
        assert_eq!(parameter_names(&fixture.project, &sites), ["w", "v"]);
    }

    #[test]
    fn required_parameter_without_argument_is_a_structural_error() {
        let fixture = Fixture::parse(
            r#"
//- /A.cs
using System;
public static class A
{
    public static void M(Action<string> $0write) { }
    public static void Call() { M(); }
}
"#,
        );
        let index = SemanticIndex::build(&fixture.project);
        let (document, symbol) = target(&fixture, &index);
        let ParameterOwner::Method(method) = symbol.owner else {
            panic!("method parameter");
        };
        let doc = fixture.project.document(document).expect("document");
        let model = SemanticModel::new(&index, doc);
        let call = doc
            .syntax()
            .descendants()
            .find_map(ast::InvocationExpression::cast)
            .expect("call");
        // `M()` does not bind, so a caller search never yields it.
        assert_eq!(model.invoked_method(&call), None);
        assert_eq!(
            forwarded_parameter(&model, &call, method, 0),
            Err(RefactorError::MissingArgument {
                document,
                ordinal: 0
            })
        );
    }

    #[test]
    fn pointer_to_a_non_invocation_is_a_structural_error() {
        let fixture = Fixture::parse("//- /A.cs\nclass A { void M(int $0a) { } }");
        let document = fixture.marker_document(0);
        let doc = fixture.project.document(document).expect("document");
        let parameter = doc
            .syntax()
            .descendants()
            .find_map(ast::Parameter::cast)
            .expect("parameter");
        assert_eq!(
            invocation(doc, SyntaxNodePtr::new(parameter.syntax())).map(|_| ()),
            Err(RefactorError::UnexpectedCallShape { document })
        );
    }
}
