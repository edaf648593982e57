//! "Create Custom Delegate": replace an `Action<...>`/`Func<...>` parameter type with a
//! named delegate declared next to the method, and retype the callers that forward their
//! own parameter into it.
//!
//! ```text
//! void Method1(Action<string /*firstName*/> write)
//!   =>
//! public delegate void Write(string firstName);
//! void Method1(Write write)
//! ```

use rowan::NodeOrToken;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sable_core::{check_cancelled, CancellationToken, Cancelled};
use sable_hir::{SemanticIndex, SemanticModel, Ty};
use sable_syntax::ast::{self, AstNode};
use sable_syntax::{make, SyntaxKind, SyntaxNode, SyntaxNodePtr, TextRange};
use sable_workspace::{Document, DocumentId, Project};

use crate::call_sites::find_call_sites;
use crate::edit::{EditBatches, NodeTag, Rewrite};
use crate::error::RefactorError;
use crate::shape::{classify, ParameterShape};
use crate::synthesis::{delegate_declaration, delegate_name};

pub const CREATE_CUSTOM_DELEGATE_TITLE: &str = "Create Custom Delegate";

/// An applicable refactoring for one parameter, tied to the document version it was
/// computed on.
#[derive(Debug, Clone)]
pub struct DelegateOffer {
    pub document: DocumentId,
    /// The `Parameter` node.
    pub parameter: SyntaxNodePtr,
    pub delegate_name: String,
    pub shape: ParameterShape,
    snapshot: Document,
}

impl DelegateOffer {
    pub fn title(&self) -> &'static str {
        CREATE_CUSTOM_DELEGATE_TITLE
    }

    pub fn summary(&self) -> OfferSummary {
        OfferSummary {
            title: self.title().to_string(),
            delegate_name: self.delegate_name.clone(),
            parameter_names: self
                .shape
                .parameters()
                .iter()
                .map(|p| p.name.clone())
                .collect(),
            returns_value: self.shape.return_type().is_some(),
        }
    }
}

/// Host-facing description of an offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfferSummary {
    pub title: String,
    pub delegate_name: String,
    pub parameter_names: Vec<String>,
    pub returns_value: bool,
}

#[derive(Debug, Clone)]
pub enum RefactorPhase {
    Idle,
    Offered(DelegateOffer),
    Applying,
    Done,
    Aborted(RefactorError),
}

/// Drives one offer/accept cycle.
#[derive(Debug)]
pub struct CreateCustomDelegate {
    phase: RefactorPhase,
}

impl Default for CreateCustomDelegate {
    fn default() -> Self {
        Self::new()
    }
}

impl CreateCustomDelegate {
    pub fn new() -> Self {
        Self {
            phase: RefactorPhase::Idle,
        }
    }

    pub fn phase(&self) -> &RefactorPhase {
        &self.phase
    }

    /// Compute the offer at `span`. Any previous offer or outcome is discarded.
    pub fn compute_offer(
        &mut self,
        project: &Project,
        document: DocumentId,
        span: TextRange,
        token: &CancellationToken,
    ) -> Result<Option<&DelegateOffer>, RefactorError> {
        self.phase = RefactorPhase::Idle;
        if let Some(offer) = offer_create_custom_delegate(project, document, span, token)? {
            self.phase = RefactorPhase::Offered(offer);
        }
        Ok(match &self.phase {
            RefactorPhase::Offered(offer) => Some(offer),
            _ => None,
        })
    }

    /// Apply the pending offer. On failure the phase records the error and `project` is
    /// untouched.
    pub fn accept(
        &mut self,
        project: &Project,
        token: &CancellationToken,
    ) -> Result<Project, RefactorError> {
        let offer = match std::mem::replace(&mut self.phase, RefactorPhase::Applying) {
            RefactorPhase::Offered(offer) => offer,
            other => {
                self.phase = other;
                return Err(RefactorError::NotOffered);
            }
        };
        match apply_create_custom_delegate(project, &offer, token) {
            Ok(next) => {
                self.phase = RefactorPhase::Done;
                Ok(next)
            }
            Err(err) => {
                tracing::warn!(target: "sable.refactor", error = %err, "create custom delegate aborted");
                self.phase = RefactorPhase::Aborted(err.clone());
                Err(err)
            }
        }
    }
}

/// The refactoring applicable at `span`, if any.
///
/// `span` must select a method parameter (for an editor caret, the parameter's name) whose
/// type is written `Action<...>` or `Func<...>` with at least one type argument.
pub fn offer_create_custom_delegate(
    project: &Project,
    document: DocumentId,
    span: TextRange,
    token: &CancellationToken,
) -> Result<Option<DelegateOffer>, Cancelled> {
    check_cancelled(token)?;
    let Some(doc) = project.document(document) else {
        return Ok(None);
    };
    let Some(param) = node_at_span(&doc.syntax(), span).and_then(ast::Parameter::cast) else {
        return Ok(None);
    };
    if containing_method(&param).is_none() {
        return Ok(None);
    }
    let Some(written) = param.ty() else {
        return Ok(None);
    };

    let index = SemanticIndex::build_cancellable(project, token)?;
    let model = SemanticModel::new(&index, doc);
    let Some(symbol) = model.declared_parameter(&param) else {
        return Ok(None);
    };
    let Some(shape) = classify(&index, &symbol.ty, &written) else {
        return Ok(None);
    };

    let delegate_name = delegate_name(&symbol.name);
    tracing::debug!(
        target: "sable.refactor",
        document = %doc.name(),
        parameter = %symbol.name,
        delegate = %delegate_name,
        "offering create custom delegate"
    );
    Ok(Some(DelegateOffer {
        document,
        parameter: symbol.syntax,
        delegate_name,
        shape,
        snapshot: doc.clone(),
    }))
}

/// Apply `offer` to `project`, returning the new project.
pub fn apply_create_custom_delegate(
    project: &Project,
    offer: &DelegateOffer,
    token: &CancellationToken,
) -> Result<Project, RefactorError> {
    check_cancelled(token)?;
    let not_found = RefactorError::ParameterNotFound(offer.document);
    let doc = project.document(offer.document).ok_or(not_found.clone())?;
    if !Document::shares_text(doc, &offer.snapshot) && doc.text() != offer.snapshot.text() {
        return Err(RefactorError::StaleOffer(offer.document));
    }

    let index = SemanticIndex::build_cancellable(project, token)?;
    let model = SemanticModel::new(&index, doc);
    let root = doc.syntax();
    let param = offer
        .parameter
        .to_node(&root)
        .and_then(ast::Parameter::cast)
        .ok_or(not_found.clone())?;
    let method = containing_method(&param).ok_or(not_found.clone())?;
    let type_decl = method
        .syntax()
        .parent()
        .and_then(ast::TypeDeclaration::cast)
        .ok_or(not_found.clone())?;
    let containing_type = model
        .declared_type(type_decl.syntax())
        .ok_or(not_found.clone())?;
    let symbol = model.declared_parameter(&param).ok_or(not_found.clone())?;
    let written = param.ty().ok_or(not_found.clone())?;
    let shape = classify(&index, &symbol.ty, &written).ok_or(not_found)?;
    let name = &offer.delegate_name;

    let mut batches = EditBatches::new();

    let declaration = delegate_declaration(&model, &shape, name, method.syntax())?;
    let separator = member_separator(doc.text(), method.syntax());
    batches.record(
        offer.document,
        NodeTag::capture(type_decl.syntax()),
        Rewrite::insert_children(
            method.syntax().index(),
            vec![NodeOrToken::Node(declaration), make::whitespace(&separator)],
        ),
    );
    batches.record(
        offer.document,
        NodeTag::capture(written.syntax()),
        Rewrite::replace_with(make::identifier_name(name)),
    );

    for site in find_call_sites(&index, project, offer.document, &symbol, token)? {
        let shape_error = RefactorError::UnexpectedCallShape {
            document: site.document,
        };
        let caller_doc = project.document(site.document).ok_or(shape_error.clone())?;
        let caller_root = caller_doc.syntax();
        let caller_ty = site
            .caller_parameter
            .to_node(&caller_root)
            .and_then(ast::Parameter::cast)
            .and_then(|p| p.ty())
            .ok_or(shape_error)?;
        let replacement = if site.document == offer.document {
            make::identifier_name(name)
        } else {
            let caller_model = SemanticModel::new(&index, caller_doc);
            let container = caller_model.display_type(&Ty::named(containing_type), caller_ty.syntax());
            let text = format!("{container}.{name}");
            make::ty(&text).map_err(|_| RefactorError::Synthesis(text))?
        };
        batches.record(
            site.document,
            NodeTag::capture(caller_ty.syntax()),
            Rewrite::replace_with(replacement),
        );
    }

    tracing::debug!(
        target: "sable.refactor",
        documents = batches.len(),
        edits = batches.edit_count(),
        delegate = %name,
        "applying create custom delegate"
    );
    batches.apply(project, token)
}

/// The outermost node whose range is exactly the node covering `span`.
fn node_at_span(root: &SyntaxNode, span: TextRange) -> Option<SyntaxNode> {
    if !root.text_range().contains_range(span) {
        return None;
    }
    let mut node = match root.covering_element(span) {
        NodeOrToken::Node(node) => node,
        NodeOrToken::Token(token) => token.parent()?,
    };
    while let Some(parent) = node.parent() {
        if parent.text_range() != node.text_range() {
            break;
        }
        node = parent;
    }
    Some(node)
}

/// The method declaring `param` directly in its parameter list.
fn containing_method(param: &ast::Parameter) -> Option<ast::MethodDeclaration> {
    let list = param.syntax().parent()?;
    if list.kind() != SyntaxKind::ParameterList {
        return None;
    }
    ast::MethodDeclaration::cast(list.parent()?)
}

/// Line break plus the method's indentation, or a single space when the method does not
/// start its own line.
fn member_separator(text: &str, method: &SyntaxNode) -> String {
    let start = usize::from(method.text_range().start());
    let before = &text[..start];
    let Some(line_start) = before.rfind('\n') else {
        return " ".to_string();
    };
    let indent = &before[line_start + 1..];
    if !indent.chars().all(|c| c == ' ' || c == '\t') {
        return " ".to_string();
    }
    let newline = if before[..line_start].ends_with('\r') {
        "\r\n"
    } else {
        "\n"
    };
    format!("{newline}{indent}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn separator_follows_line_endings_and_indent() {
        let (project, id) = Project::new()
            .with_new_document("A.cs", "class A\r\n{\r\n\tvoid M() { }\r\n}")
            .expect("document");
        let doc = project.document(id).expect("document");
        let method = doc
            .syntax()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::MethodDeclaration)
            .expect("method");
        assert_eq!(member_separator(doc.text(), &method), "\r\n\t");

        let (project, id) = Project::new()
            .with_new_document("B.cs", "class B { void M() { } }")
            .expect("document");
        let doc = project.document(id).expect("document");
        let method = doc
            .syntax()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::MethodDeclaration)
            .expect("method");
        assert_eq!(member_separator(doc.text(), &method), " ");
    }

    #[test]
    fn summary_serializes_in_camel_case() {
        let summary = OfferSummary {
            title: CREATE_CUSTOM_DELEGATE_TITLE.to_string(),
            delegate_name: "Write".to_string(),
            parameter_names: vec!["firstName".to_string()],
            returns_value: false,
        };
        let json = serde_json::to_value(&summary).expect("json");
        assert_eq!(
            json,
            serde_json::json!({
                "title": "Create Custom Delegate",
                "delegateName": "Write",
                "parameterNames": ["firstName"],
                "returnsValue": false,
            })
        );
    }
}
