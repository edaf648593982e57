//! Call-site search for source methods.

use sable_core::{check_cancelled, Cancelled, CancellationToken};
use sable_syntax::ast::{self, AstNode};
use sable_syntax::SyntaxNodePtr;
use sable_workspace::{DocumentId, Project};

use crate::ids::MethodId;
use crate::index::SemanticIndex;
use crate::model::SemanticModel;

/// An invocation bound to the searched method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallerRef {
    pub document: DocumentId,
    pub invocation: SyntaxNodePtr,
}

/// Every invocation in `project` that binds to `method`, in document order.
pub fn find_callers(
    index: &SemanticIndex,
    project: &Project,
    method: MethodId,
    token: &CancellationToken,
) -> Result<Vec<CallerRef>, Cancelled> {
    let name = index.method(method).name.clone();
    let mut out = Vec::new();
    for document in project.documents() {
        check_cancelled(token)?;
        if !document.text().contains(name.as_str()) {
            continue;
        }
        let model = SemanticModel::new(index, document);
        for call in document
            .syntax()
            .descendants()
            .filter_map(ast::InvocationExpression::cast)
        {
            if callee_name(&call).as_deref() != Some(name.as_str()) {
                continue;
            }
            if model.invoked_method(&call) == Some(method) {
                out.push(CallerRef {
                    document: document.id(),
                    invocation: SyntaxNodePtr::new(call.syntax()),
                });
            }
        }
    }
    tracing::debug!(
        target: "sable.hir",
        method = %name,
        callers = out.len(),
        "found callers"
    );
    Ok(out)
}

/// Rightmost simple name of the callee: `M` in `a.b.M<T>(...)`.
pub fn callee_name(call: &ast::InvocationExpression) -> Option<smol_str::SmolStr> {
    let callee = call.callee()?.unparenthesized();
    match ast::MemberAccessExpression::cast(callee.syntax().clone()) {
        Some(access) => access.name()?.text(),
        None => ast::SimpleName::cast(callee.syntax().clone())?.text(),
    }
}
