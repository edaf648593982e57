//! Persistent project state.
//!
//! A [`Project`] is an immutable map from [`DocumentId`] to [`Document`]. Every mutation
//! returns a new `Project`; documents that were not touched are shared with the previous
//! value (their text, tree and line index live behind `Arc`s).

mod document;

use std::collections::BTreeMap;
use std::sync::Arc;

use rowan::GreenNode;
use thiserror::Error;

pub use document::{Document, DocumentId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkspaceError {
    #[error("unknown document {0:?}")]
    UnknownDocument(DocumentId),
    #[error("a document named `{0}` already exists")]
    DuplicateDocument(String),
}

#[derive(Debug, Clone, Default)]
pub struct Project {
    documents: Arc<BTreeMap<DocumentId, Document>>,
    next_id: u32,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a project from `(name, text)` pairs. Ids are assigned in iteration order.
    pub fn from_sources<N, T>(sources: impl IntoIterator<Item = (N, T)>) -> Result<Self, WorkspaceError>
    where
        N: Into<String>,
        T: Into<String>,
    {
        let mut project = Project::new();
        for (name, text) in sources {
            let (next, _) = project.with_new_document(name, text)?;
            project = next;
        }
        Ok(project)
    }

    pub fn with_new_document(
        &self,
        name: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<(Project, DocumentId), WorkspaceError> {
        let name = name.into();
        if self.document_by_name(&name).is_some() {
            return Err(WorkspaceError::DuplicateDocument(name));
        }
        let id = DocumentId(self.next_id);
        let doc = Document::parse(id, name, text.into());
        let mut documents = (*self.documents).clone();
        documents.insert(id, doc);
        Ok((
            Project {
                documents: Arc::new(documents),
                next_id: self.next_id + 1,
            },
            id,
        ))
    }

    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(&id)
    }

    pub fn document_by_name(&self, name: &str) -> Option<&Document> {
        self.documents.values().find(|doc| doc.name() == name)
    }

    /// Documents in id order.
    pub fn documents(&self) -> impl Iterator<Item = &Document> + '_ {
        self.documents.values()
    }

    pub fn document_ids(&self) -> impl Iterator<Item = DocumentId> + '_ {
        self.documents.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn with_document_text(
        &self,
        id: DocumentId,
        text: impl Into<String>,
    ) -> Result<Project, WorkspaceError> {
        let doc = self
            .document(id)
            .ok_or(WorkspaceError::UnknownDocument(id))?;
        let replacement = Document::parse(id, doc.name().to_string(), text.into());
        Ok(self.replace(std::iter::once(replacement)))
    }

    /// Replace one document's tree.
    ///
    /// The tree is re-read through the parser so every committed tree has the canonical
    /// shape the parser produces for its text.
    pub fn with_document_root(
        &self,
        id: DocumentId,
        root: GreenNode,
    ) -> Result<Project, WorkspaceError> {
        self.with_document_roots(std::iter::once((id, root)))
    }

    /// Replace several trees at once. Either every id is known and all replacements are
    /// applied, or nothing changes.
    pub fn with_document_roots(
        &self,
        roots: impl IntoIterator<Item = (DocumentId, GreenNode)>,
    ) -> Result<Project, WorkspaceError> {
        let mut replacements = Vec::new();
        for (id, root) in roots {
            let doc = self
                .document(id)
                .ok_or(WorkspaceError::UnknownDocument(id))?;
            let text = sable_syntax::SyntaxNode::new_root(root).to_string();
            replacements.push(Document::parse(id, doc.name().to_string(), text));
        }
        tracing::debug!(
            target: "sable.workspace",
            replaced = replacements.len(),
            "replacing document trees"
        );
        Ok(self.replace(replacements))
    }

    fn replace(&self, replacements: impl IntoIterator<Item = Document>) -> Project {
        let mut documents = (*self.documents).clone();
        for doc in replacements {
            documents.insert(doc.id(), doc);
        }
        Project {
            documents: Arc::new(documents),
            next_id: self.next_id,
        }
    }
}
