use std::fmt;
use std::sync::Arc;

use rowan::GreenNode;
use sable_core::LineIndex;
use sable_syntax::{parse_csharp, ParseError, SyntaxNode};

/// Stable across replacement of the document's tree.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(pub u32);

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    name: Arc<str>,
    text: Arc<str>,
    green: GreenNode,
    errors: Arc<[ParseError]>,
    line_index: Arc<LineIndex>,
}

impl Document {
    pub(crate) fn parse(id: DocumentId, name: String, text: String) -> Self {
        let parse = parse_csharp(&text);
        let line_index = LineIndex::new(&text);
        Self {
            id,
            name: name.into(),
            text: text.into(),
            green: parse.green,
            errors: parse.errors.into(),
            line_index: Arc::new(line_index),
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    /// A fresh red tree over the document's green tree.
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn parse_errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    /// Whether both values hold the same text allocation (the document was not replaced).
    pub fn shares_text(a: &Document, b: &Document) -> bool {
        Arc::ptr_eq(&a.text, &b.text)
    }
}
