use std::collections::HashMap;

use sable_core::{LineCol, TextRange, TextSize};
use sable_workspace::{DocumentId, Project};

use crate::markers::{strip_markers, try_extract_range};

/// Name given to the document of a fixture without `//-` headers.
pub const DEFAULT_DOCUMENT: &str = "Test0.cs";

/// A multi-document C# fixture with `$0`, `$1`, ... markers.
///
/// ```text
/// //- /Class1.cs
/// class Class1 { void M(int $0a) {} }
/// //- /Class2.cs
/// class Class2 {}
/// ```
///
/// Marker IDs must be unique across the entire fixture; duplicate IDs will
/// panic during parsing. At most one `[|...|]` range is allowed per fixture, and a
/// document holding it carries no `$N` markers.
pub struct Fixture {
    pub project: Project,
    markers: HashMap<u32, (DocumentId, TextSize)>,
    range: Option<(DocumentId, TextRange)>,
}

impl Fixture {
    #[must_use]
    pub fn parse(fixture: &str) -> Self {
        Self::from_documents(split_documents(fixture))
    }

    /// Builds a fixture from explicit `(name, text)` pairs, keeping texts byte-exact.
    #[must_use]
    pub fn from_documents<N, T>(documents: impl IntoIterator<Item = (N, T)>) -> Self
    where
        N: Into<String>,
        T: AsRef<str>,
    {
        let mut project = Project::new();
        let mut markers: HashMap<u32, (DocumentId, TextSize)> = HashMap::new();
        let mut range = None;

        for (name, text) in documents {
            let name = name.into();
            let (text, selection) = match try_extract_range(text.as_ref()) {
                Some((text, selection)) => (text, Some(selection)),
                None => (text.as_ref().to_string(), None),
            };
            let (text, file_markers) = strip_markers(&text);
            let (next, id) = project
                .with_new_document(name.as_str(), text.as_str())
                .unwrap_or_else(|err| panic!("invalid fixture document {name}: {err}"));
            project = next;
            if let Some(selection) = selection {
                assert!(
                    file_markers.is_empty(),
                    "document {name} mixes [| ... |] with $N markers"
                );
                assert!(range.is_none(), "fixture has more than one [| ... |] range");
                range = Some((id, selection));
            }
            for (marker, offset) in file_markers {
                if let Some((prev_doc, prev_offset)) = markers.insert(marker, (id, offset)) {
                    panic!(
                        "duplicate fixture marker ${marker} (first at {prev_doc:?}:{prev_offset:?}, again at {name}:{offset:?})"
                    );
                }
            }
        }

        Self {
            project,
            markers,
            range,
        }
    }

    #[must_use]
    pub fn document_id(&self, name: &str) -> DocumentId {
        self.project
            .document_by_name(name)
            .unwrap_or_else(|| panic!("no fixture document {name}"))
            .id()
    }

    #[must_use]
    pub fn text(&self, name: &str) -> &str {
        self.project
            .document_by_name(name)
            .unwrap_or_else(|| panic!("no fixture document {name}"))
            .text()
    }

    #[must_use]
    pub fn marker_document(&self, id: u32) -> DocumentId {
        self.marker(id).0
    }

    #[must_use]
    pub fn marker_offset(&self, id: u32) -> TextSize {
        self.marker(id).1
    }

    #[must_use]
    pub fn marker_line_col(&self, id: u32) -> LineCol {
        let (doc, offset) = self.marker(id);
        let document = self
            .project
            .document(doc)
            .expect("marker document exists");
        document.line_index().line_col(offset)
    }

    /// The `[|...|]` selection and its document.
    #[must_use]
    pub fn range(&self) -> (DocumentId, TextRange) {
        self.range.expect("fixture has no [| ... |] range")
    }

    fn marker(&self, id: u32) -> (DocumentId, TextSize) {
        *self
            .markers
            .get(&id)
            .unwrap_or_else(|| panic!("fixture has no marker ${id}"))
    }
}

fn split_documents(fixture: &str) -> Vec<(String, String)> {
    if !fixture.lines().any(|line| line.starts_with("//-")) {
        return vec![(DEFAULT_DOCUMENT.to_string(), fixture.to_string())];
    }

    let mut current_path: Option<String> = None;
    let mut current_text = String::new();
    let mut files = Vec::new();
    for line in fixture.lines() {
        if let Some(rest) = line.strip_prefix("//-") {
            if let Some(path) = current_path.take() {
                files.push((path, std::mem::take(&mut current_text)));
            }
            current_path = Some(document_name(rest));
            continue;
        }

        if !current_text.is_empty() {
            current_text.push('\n');
        }
        current_text.push_str(line);
    }

    if let Some(path) = current_path.take() {
        files.push((path, current_text));
    }
    files
}

/// `/Class1.cs` -> `Class1.cs`; Windows separators are normalized.
fn document_name(header: &str) -> String {
    header.trim().replace('\\', "/").trim_start_matches('/').to_string()
}
