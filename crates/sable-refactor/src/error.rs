use sable_core::Cancelled;
use sable_syntax::{SyntaxKind, TextRange};
use sable_workspace::{DocumentId, WorkspaceError};
use thiserror::Error;

/// Failure while applying an edit batch. Nothing is committed when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("edit target {kind:?} at {range:?} not found in document {document:?}")]
    TagNotFound {
        document: DocumentId,
        kind: SyntaxKind,
        range: TextRange,
    },
    #[error("cannot rewrite {kind:?}: {message}")]
    InvalidRewrite { kind: SyntaxKind, message: String },
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefactorError {
    #[error("refactoring was cancelled")]
    Cancelled,
    #[error("no refactoring has been offered")]
    NotOffered,
    #[error("document {0:?} changed since the refactoring was offered")]
    StaleOffer(DocumentId),
    #[error("the offered parameter no longer resolves in document {0:?}")]
    ParameterNotFound(DocumentId),
    #[error("call in document {document:?} has no argument for parameter #{ordinal}")]
    MissingArgument { document: DocumentId, ordinal: usize },
    #[error("caller in document {document:?} is not an invocation")]
    UnexpectedCallShape { document: DocumentId },
    #[error("type `{0}` cannot be written as syntax")]
    Synthesis(String),
    #[error(transparent)]
    Apply(#[from] ApplyError),
}

impl From<Cancelled> for RefactorError {
    fn from(_: Cancelled) -> Self {
        RefactorError::Cancelled
    }
}
