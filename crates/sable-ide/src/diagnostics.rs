//! Analyzers over a document's syntax and semantic model.

use serde::{Deserialize, Serialize};
use sable_config::{DiagnosticLevel, DiagnosticsConfig};
use sable_core::{check_cancelled, Cancelled, CancellationToken, LineCol, TextRange};
use sable_hir::{SemanticIndex, SemanticModel, Symbol, Ty};
use sable_syntax::ast::{self, AstNode};
use sable_workspace::{DocumentId, Project};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Static metadata shared by every diagnostic an analyzer reports.
#[derive(Debug, PartialEq, Eq)]
pub struct DiagnosticDescriptor {
    pub id: &'static str,
    pub title: &'static str,
    pub message: &'static str,
    pub category: &'static str,
    pub default_severity: Severity,
}

pub static BAD_IMMUTABLE_ARRAY_CREATION: DiagnosticDescriptor = DiagnosticDescriptor {
    id: "BadWayOfCreatingImmutableArray",
    title: "Bad way of creating immutable array",
    message: "Bad way of creating immutable array",
    category: "Immutable arrays",
    default_severity: Severity::Error,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    pub document: DocumentId,
    pub range: TextRange,
}

impl Diagnostic {
    fn from_descriptor(
        descriptor: &DiagnosticDescriptor,
        severity: Severity,
        document: DocumentId,
        range: TextRange,
    ) -> Self {
        Self {
            severity,
            code: descriptor.id,
            message: descriptor.message.to_string(),
            document,
            range,
        }
    }

    /// Zero-based start position.
    pub fn start(&self, project: &Project) -> Option<LineCol> {
        let document = project.document(self.document)?;
        Some(document.line_index().line_col(self.range.start()))
    }
}

/// Every enabled analyzer over `document`.
pub fn diagnostics(
    project: &Project,
    document: DocumentId,
    config: &DiagnosticsConfig,
    token: &CancellationToken,
) -> Result<Vec<Diagnostic>, Cancelled> {
    check_cancelled(token)?;
    let Some(severity) = severity_for(config.immutable_array_creation, &BAD_IMMUTABLE_ARRAY_CREATION)
    else {
        return Ok(Vec::new());
    };
    let Some(doc) = project.document(document) else {
        return Ok(Vec::new());
    };
    let index = SemanticIndex::build_cancellable(project, token)?;
    let model = SemanticModel::new(&index, doc);
    let out: Vec<Diagnostic> = doc
        .syntax()
        .descendants()
        .filter_map(ast::InvocationExpression::cast)
        .filter(|call| is_bad_immutable_array_creation(&model, call))
        .map(|call| {
            Diagnostic::from_descriptor(
                &BAD_IMMUTABLE_ARRAY_CREATION,
                severity,
                document,
                call.syntax().text_range(),
            )
        })
        .collect();
    tracing::debug!(
        target: "sable.ide",
        document = %doc.name(),
        count = out.len(),
        "computed diagnostics"
    );
    Ok(out)
}

fn severity_for(level: DiagnosticLevel, descriptor: &DiagnosticDescriptor) -> Option<Severity> {
    match level {
        DiagnosticLevel::Off => None,
        DiagnosticLevel::Warning => Some(Severity::Warning),
        DiagnosticLevel::Error => Some(descriptor.default_severity),
    }
}

/// `ImmutableArray<T>.Empty.Add(x)`, however `ImmutableArray<T>` is spelled.
pub fn is_bad_immutable_array_creation(
    model: &SemanticModel<'_>,
    call: &ast::InvocationExpression,
) -> bool {
    let argument_count = call.argument_list().map_or(0, |l| l.arguments().count());
    if argument_count != 1 {
        return false;
    }
    let Some(empty_receiver) = empty_add_receiver(call) else {
        return false;
    };
    immutable_array_element(model, &empty_receiver).is_some()
}

/// The `X` of `X.Empty.Add(...)`.
pub(crate) fn empty_add_receiver(call: &ast::InvocationExpression) -> Option<ast::Expression> {
    let (_, empty) = empty_add_accesses(call)?;
    empty.receiver()
}

/// The `X.Empty.Add` and `X.Empty` member accesses of `X.Empty.Add(...)`.
pub(crate) fn empty_add_accesses(
    call: &ast::InvocationExpression,
) -> Option<(ast::MemberAccessExpression, ast::MemberAccessExpression)> {
    let add = ast::MemberAccessExpression::cast(call.callee()?.syntax().clone())?;
    if add.name()?.text()? != "Add" {
        return None;
    }
    let empty = ast::MemberAccessExpression::cast(add.receiver()?.syntax().clone())?;
    if empty.name()?.text()? != "Empty" {
        return None;
    }
    Some((add, empty))
}

/// Element type when `expr` names `System.Collections.Immutable.ImmutableArray<T>`.
pub(crate) fn immutable_array_element(
    model: &SemanticModel<'_>,
    expr: &ast::Expression,
) -> Option<Ty> {
    let Some(Symbol::Type(Ty::Named { def, args })) = model.symbol_of_expression(expr) else {
        return None;
    };
    let index = model.index();
    if index.type_data(def).name != "ImmutableArray" || args.len() != 1 {
        return None;
    }
    if index.namespace_full_name(index.containing_namespace(def)) != "System.Collections.Immutable" {
        return None;
    }
    args.into_iter().next()
}
