//! Everything a host can offer for a selection: refactorings and code fixes.

use serde::{Deserialize, Serialize};
use sable_config::SableConfig;
use sable_core::{Cancelled, CancellationToken, TextRange};
use sable_refactor::{
    apply_create_custom_delegate, offer_create_custom_delegate, DelegateOffer, RefactorError,
};
use sable_workspace::{DocumentId, Project};
use thiserror::Error;

use crate::code_fix::{apply_code_fix, code_fixes, CodeFix, CodeFixError};
use crate::diagnostics::diagnostics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodeActionKind {
    #[serde(rename = "refactor.rewrite")]
    RefactorRewrite,
    #[serde(rename = "quickfix")]
    QuickFix,
}

#[derive(Debug, Clone)]
enum Payload {
    CreateCustomDelegate(DelegateOffer),
    Fix(CodeFix),
}

#[derive(Debug, Clone)]
pub struct CodeAction {
    pub title: String,
    pub kind: CodeActionKind,
    payload: Payload,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeActionError {
    #[error(transparent)]
    Refactor(#[from] RefactorError),
    #[error(transparent)]
    CodeFix(#[from] CodeFixError),
}

impl CodeAction {
    /// Run the action against `project`, which should be the project it was computed on.
    pub fn apply(
        &self,
        project: &Project,
        token: &CancellationToken,
    ) -> Result<Project, CodeActionError> {
        tracing::debug!(target: "sable.ide", title = %self.title, "applying code action");
        match &self.payload {
            Payload::CreateCustomDelegate(offer) => {
                Ok(apply_create_custom_delegate(project, offer, token)?)
            }
            Payload::Fix(fix) => Ok(apply_code_fix(project, fix, token)?),
        }
    }
}

/// Actions for `range` in `document`: the refactoring offer first, then fixes for the
/// diagnostics touching `range`.
///
/// A fix whose diagnostic has an unexpected shape is dropped and logged.
pub fn code_actions(
    project: &Project,
    document: DocumentId,
    range: TextRange,
    config: &SableConfig,
    token: &CancellationToken,
) -> Result<Vec<CodeAction>, Cancelled> {
    let mut actions = Vec::new();

    if config.refactor.create_custom_delegate {
        if let Some(offer) = offer_create_custom_delegate(project, document, range, token)? {
            actions.push(CodeAction {
                title: offer.title().to_string(),
                kind: CodeActionKind::RefactorRewrite,
                payload: Payload::CreateCustomDelegate(offer),
            });
        }
    }

    for diagnostic in diagnostics(project, document, &config.diagnostics, token)? {
        if diagnostic.range.intersect(range).is_none() {
            continue;
        }
        match code_fixes(project, &diagnostic) {
            Ok(fixes) => actions.extend(fixes.into_iter().map(|fix| CodeAction {
                title: fix.title.to_string(),
                kind: CodeActionKind::QuickFix,
                payload: Payload::Fix(fix),
            })),
            Err(err) => {
                tracing::warn!(target: "sable.ide", code = diagnostic.code, error = %err, "code fix unavailable");
            }
        }
    }
    Ok(actions)
}
