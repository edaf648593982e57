//! Fix for [`BAD_IMMUTABLE_ARRAY_CREATION`]: `ImmutableArray<int>.Empty.Add(1)` becomes
//! `ImmutableArray.Create(1)`.

use rowan::{GreenNode, NodeOrToken};
use sable_core::{check_cancelled, CancellationToken};
use sable_hir::{SemanticIndex, SemanticModel};
use sable_refactor::{EditBatches, NodeTag, RefactorError, Rewrite};
use sable_syntax::ast::{self, AstNode};
use sable_syntax::{make, SyntaxKind, SyntaxNode, TextRange};
use sable_workspace::{DocumentId, Project};
use thiserror::Error;

use crate::diagnostics::{
    empty_add_accesses, immutable_array_element, Diagnostic, BAD_IMMUTABLE_ARRAY_CREATION,
};

pub const USE_IMMUTABLE_ARRAY_CREATE_TITLE: &str = "Use ImmutableArray.Create";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeFixError {
    #[error("no code fix for diagnostic {0}")]
    NotFixable(&'static str),
    #[error("unknown document {0:?}")]
    UnknownDocument(DocumentId),
    /// The diagnostic does not point at the syntax its analyzer reports.
    #[error("expected {expected} at {range:?}")]
    UnexpectedShape {
        expected: &'static str,
        range: TextRange,
    },
    #[error("cannot write type `{0}` as syntax")]
    Synthesis(String),
    #[error(transparent)]
    Refactor(#[from] RefactorError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeFix {
    pub title: &'static str,
    pub diagnostic: Diagnostic,
}

/// Fixes for `diagnostic`. The diagnostic's syntax is checked up front.
pub fn code_fixes(project: &Project, diagnostic: &Diagnostic) -> Result<Vec<CodeFix>, CodeFixError> {
    if diagnostic.code != BAD_IMMUTABLE_ARRAY_CREATION.id {
        return Err(CodeFixError::NotFixable(diagnostic.code));
    }
    let document = project
        .document(diagnostic.document)
        .ok_or(CodeFixError::UnknownDocument(diagnostic.document))?;
    FixTarget::find(&document.syntax(), diagnostic.range)?;
    Ok(vec![CodeFix {
        title: USE_IMMUTABLE_ARRAY_CREATE_TITLE,
        diagnostic: diagnostic.clone(),
    }])
}

pub fn apply_code_fix(
    project: &Project,
    fix: &CodeFix,
    token: &CancellationToken,
) -> Result<Project, CodeFixError> {
    check_cancelled(token).map_err(RefactorError::from)?;
    let diagnostic = &fix.diagnostic;
    let document = project
        .document(diagnostic.document)
        .ok_or(CodeFixError::UnknownDocument(diagnostic.document))?;
    let target = FixTarget::find(&document.syntax(), diagnostic.range)?;

    let index = SemanticIndex::build_cancellable(project, token).map_err(RefactorError::from)?;
    let model = SemanticModel::new(&index, document);
    let element = immutable_array_element(&model, &target.receiver).ok_or(
        CodeFixError::UnexpectedShape {
            expected: "an ImmutableArray<T> receiver",
            range: diagnostic.range,
        },
    )?;

    let converted = model.type_of_expression(&target.argument).as_ref() != Some(&element);
    let type_argument = if converted {
        let text = model.display_type(&element, target.call.syntax());
        Some(make::ty(&text).map_err(|_| CodeFixError::Synthesis(text))?)
    } else {
        None
    };
    let receiver_path = if target.receiver.syntax().kind() == SyntaxKind::GenericName {
        "ImmutableArray"
    } else {
        "System.Collections.Immutable.ImmutableArray"
    };

    let mut batches = EditBatches::new();
    batches.record(
        diagnostic.document,
        NodeTag::capture(target.add.syntax()),
        Rewrite::replace_with(create_callee(receiver_path, type_argument)),
    );
    tracing::debug!(
        target: "sable.ide",
        document = %document.name(),
        explicit_type = converted,
        "applying ImmutableArray.Create fix"
    );
    Ok(batches.apply(project, token)?)
}

struct FixTarget {
    call: ast::InvocationExpression,
    /// `X.Empty.Add`.
    add: ast::MemberAccessExpression,
    /// `X`.
    receiver: ast::Expression,
    argument: ast::Expression,
}

impl FixTarget {
    fn find(root: &SyntaxNode, range: TextRange) -> Result<FixTarget, CodeFixError> {
        let shape = |expected| CodeFixError::UnexpectedShape { expected, range };
        let call = invocation_at(root, range).ok_or(shape("an invocation"))?;
        let (add, empty) = empty_add_accesses(&call).ok_or(shape("`X.Empty.Add(...)`"))?;
        let receiver = empty.receiver().ok_or(shape("a receiver of `Empty`"))?;
        let arguments: Vec<ast::Argument> = call
            .argument_list()
            .map(|list| list.arguments().collect())
            .unwrap_or_default();
        let argument = match arguments.as_slice() {
            [argument] => argument.expression(),
            _ => None,
        }
        .ok_or(shape("a single argument"))?;
        Ok(FixTarget {
            call,
            add,
            receiver,
            argument,
        })
    }
}

/// The innermost invocation spanning exactly `range`.
fn invocation_at(root: &SyntaxNode, range: TextRange) -> Option<ast::InvocationExpression> {
    if !root.text_range().contains_range(range) {
        return None;
    }
    let start = match root.covering_element(range) {
        NodeOrToken::Node(node) => node,
        NodeOrToken::Token(token) => token.parent()?,
    };
    start
        .ancestors()
        .take_while(|node| node.text_range() == range)
        .find_map(ast::InvocationExpression::cast)
}

/// `A.B.Create` or `A.B.Create<T>`.
fn create_callee(receiver_path: &str, type_argument: Option<GreenNode>) -> GreenNode {
    let mut segments = receiver_path.split('.');
    let first = segments.next().unwrap_or(receiver_path);
    let receiver = segments.fold(make::identifier_name(first), |receiver, segment| {
        make::member_access(receiver, make::identifier_name(segment))
    });
    let name = match type_argument {
        Some(ty) => make::generic_name("Create", vec![ty]),
        None => make::identifier_name("Create"),
    };
    make::member_access(receiver, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn callee_shapes() {
        let text = |green: GreenNode| SyntaxNode::new_root(green).to_string();
        assert_eq!(text(create_callee("ImmutableArray", None)), "ImmutableArray.Create");
        assert_eq!(
            text(create_callee(
                "System.Collections.Immutable.ImmutableArray",
                Some(make::ty("long").expect("type"))
            )),
            "System.Collections.Immutable.ImmutableArray.Create<long>"
        );
    }
}
