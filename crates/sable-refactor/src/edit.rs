//! Deferred, tagged tree edits.
//!
//! An [`Edit`] names its target with a [`NodeTag`] captured from the unedited tree and
//! carries a [`Rewrite`] that produces the replacement from the target's *current* form.
//! Edits within a document are applied deepest first, so a rewrite of an ancestor sees its
//! descendants already rewritten. The whole set of documents is committed to the project
//! in one step, or not at all.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use rowan::{GreenNode, Language};
use sable_core::{check_cancelled, CancellationToken};
use sable_syntax::edit::{insert_children, node_at_path, path_from_root, replace_node};
use sable_syntax::make::GreenElement;
use sable_syntax::{CSharpLanguage, SyntaxKind, SyntaxNode, TextRange};
use sable_workspace::{DocumentId, Project};

use crate::error::{ApplyError, RefactorError};

/// Stable identity of a node across rewrites of unrelated parts of its tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeTag {
    path: Vec<usize>,
    kind: SyntaxKind,
    range: TextRange,
}

impl NodeTag {
    pub fn capture(node: &SyntaxNode) -> Self {
        Self {
            path: path_from_root(node),
            kind: node.kind(),
            range: node.text_range(),
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    /// Range in the tree the tag was captured from.
    pub fn range(&self) -> TextRange {
        self.range
    }

    fn depth(&self) -> usize {
        self.path.len()
    }

    /// Look the tag up in the tree it was captured from.
    fn resolve_original(&self, root: &SyntaxNode) -> Option<SyntaxNode> {
        node_at_path(root, &self.path)
            .filter(|node| node.kind() == self.kind && node.text_range() == self.range)
    }

    /// Look the tag up after deeper edits have run. Ranges may have moved. The node must
    /// have `kind`, which differs from the captured kind once an earlier edit replaced it.
    fn resolve_current(&self, root: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxNode> {
        node_at_path(root, &self.path).filter(|node| node.kind() == kind)
    }
}

type RewriteFn = dyn Fn(&SyntaxNode) -> Result<GreenNode, ApplyError> + Send + Sync;

/// Computes the replacement for a node from its current form.
pub struct Rewrite(Box<RewriteFn>);

impl Rewrite {
    pub fn new(
        f: impl Fn(&SyntaxNode) -> Result<GreenNode, ApplyError> + Send + Sync + 'static,
    ) -> Self {
        Rewrite(Box::new(f))
    }

    /// Replace the node wholesale.
    pub fn replace_with(replacement: GreenNode) -> Self {
        Rewrite::new(move |_| Ok(replacement.clone()))
    }

    /// Insert `children` before the child slot `index` (tokens count as slots).
    pub fn insert_children(index: usize, children: Vec<GreenElement>) -> Self {
        Rewrite::new(move |node| {
            let slots = node.children_with_tokens().count();
            if index > slots {
                return Err(ApplyError::InvalidRewrite {
                    kind: node.kind(),
                    message: format!("child slot {index} out of bounds ({slots} slots)"),
                });
            }
            Ok(insert_children(node, index, children.clone()))
        })
    }

    fn run(&self, node: &SyntaxNode) -> Result<GreenNode, ApplyError> {
        (self.0)(node)
    }
}

impl fmt::Debug for Rewrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Rewrite(..)")
    }
}

#[derive(Debug)]
pub struct Edit {
    pub target: NodeTag,
    pub rewrite: Rewrite,
}

/// Edits for one document, in recording order.
#[derive(Debug)]
pub struct DocumentEditBatch {
    pub document: DocumentId,
    pub edits: Vec<Edit>,
}

impl DocumentEditBatch {
    pub fn new(document: DocumentId) -> Self {
        Self {
            document,
            edits: Vec::new(),
        }
    }

    pub fn push(&mut self, target: NodeTag, rewrite: Rewrite) {
        self.edits.push(Edit { target, rewrite });
    }

    /// Apply every edit to `root` and return the new root.
    ///
    /// All tags are checked against `root` before anything is rewritten. Edits run deepest
    /// first; edits at the same depth run in recording order, so two rewrites of one node
    /// compose.
    pub fn apply(&self, root: &SyntaxNode) -> Result<GreenNode, ApplyError> {
        for edit in &self.edits {
            if edit.target.resolve_original(root).is_none() {
                return Err(self.not_found(&edit.target));
            }
        }

        let mut order: Vec<&Edit> = self.edits.iter().collect();
        order.sort_by(|a, b| b.target.depth().cmp(&a.target.depth()));

        // Kind now found at each rewritten path.
        let mut rewritten: HashMap<&[usize], SyntaxKind> = HashMap::new();
        let mut current = root.clone();
        for edit in order {
            let path = edit.target.path.as_slice();
            let kind = rewritten.get(path).copied().unwrap_or(edit.target.kind);
            let node = edit
                .target
                .resolve_current(&current, kind)
                .ok_or_else(|| self.not_found(&edit.target))?;
            let replacement = edit.rewrite.run(&node)?;
            rewritten.insert(path, CSharpLanguage::kind_from_raw(replacement.kind()));
            current = SyntaxNode::new_root(replace_node(&node, replacement));
        }
        Ok(current.green().into_owned())
    }

    fn not_found(&self, tag: &NodeTag) -> ApplyError {
        ApplyError::TagNotFound {
            document: self.document,
            kind: tag.kind,
            range: tag.range,
        }
    }
}

/// Edits across documents.
#[derive(Debug, Default)]
pub struct EditBatches {
    batches: BTreeMap<DocumentId, DocumentEditBatch>,
}

impl EditBatches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, document: DocumentId, target: NodeTag, rewrite: Rewrite) {
        self.batches
            .entry(document)
            .or_insert_with(|| DocumentEditBatch::new(document))
            .push(target, rewrite);
    }

    pub fn batch(&self, document: DocumentId) -> Option<&DocumentEditBatch> {
        self.batches.get(&document)
    }

    pub fn documents(&self) -> impl Iterator<Item = DocumentId> + '_ {
        self.batches.keys().copied()
    }

    /// Number of documents with at least one edit.
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn edit_count(&self) -> usize {
        self.batches.values().map(|b| b.edits.len()).sum()
    }

    /// Apply every batch and commit the results as one new project. On any failure
    /// `project` is left as it was and the error is returned.
    pub fn apply(
        &self,
        project: &Project,
        token: &CancellationToken,
    ) -> Result<Project, RefactorError> {
        let mut roots = Vec::with_capacity(self.batches.len());
        for batch in self.batches.values() {
            check_cancelled(token)?;
            let document = project
                .document(batch.document)
                .ok_or(ApplyError::Workspace(
                    sable_workspace::WorkspaceError::UnknownDocument(batch.document),
                ))?;
            let root = batch.apply(&document.syntax()).map_err(|err| {
                tracing::warn!(target: "sable.refactor", document = %document.name(), error = %err, "edit batch aborted");
                err
            })?;
            tracing::debug!(
                target: "sable.refactor",
                document = %document.name(),
                edits = batch.edits.len(),
                "applied edit batch"
            );
            roots.push((batch.document, root));
        }
        check_cancelled(token)?;
        Ok(project
            .with_document_roots(roots)
            .map_err(ApplyError::from)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sable_syntax::ast::{self, AstNode};
    use sable_syntax::make;

    fn project(text: &str) -> (Project, DocumentId) {
        Project::new()
            .with_new_document("Test0.cs", text)
            .expect("new document")
    }

    fn first<N: AstNode>(project: &Project, id: DocumentId) -> N {
        project
            .document(id)
            .expect("document")
            .syntax()
            .descendants()
            .find_map(N::cast)
            .expect("node")
    }

    fn text(project: &Project, id: DocumentId) -> String {
        project.document(id).expect("document").text().to_string()
    }

    #[test]
    fn ancestor_rewrite_sees_rewritten_descendant() {
        let (project, id) = project("class C { void M(int a) { } }");
        let param: ast::Parameter = first(&project, id);
        let class: ast::TypeDeclaration = first(&project, id);
        let ty = param.ty().expect("type");

        let mut batches = EditBatches::new();
        // Recorded parent first; ordering is by depth, not recording order.
        batches.record(
            id,
            NodeTag::capture(class.syntax()),
            Rewrite::new(|node| {
                assert!(node.to_string().contains("long a"));
                Ok(insert_children(node, 0, vec![make::token(SyntaxKind::PublicKw, "public"), make::whitespace(" ")]))
            }),
        );
        batches.record(
            id,
            NodeTag::capture(ty.syntax()),
            Rewrite::replace_with(make::ty("long").expect("type")),
        );

        let next = batches.apply(&project, &CancellationToken::new()).expect("applied");
        assert_eq!(text(&next, id), "public class C { void M(long a) { } }");
    }

    #[test]
    fn edits_on_the_same_node_compose_in_order() {
        let (project, id) = project("class C { void M(int a) { } }");
        let ty = first::<ast::Parameter>(&project, id).ty().expect("type");
        let tag = NodeTag::capture(ty.syntax());

        let mut batches = EditBatches::new();
        batches.record(id, tag.clone(), Rewrite::replace_with(make::ty("string").expect("type")));
        batches.record(
            id,
            tag,
            Rewrite::new(|node| {
                let wrapped = format!("List<{node}>");
                make::ty(&wrapped).map_err(|_| ApplyError::InvalidRewrite {
                    kind: node.kind(),
                    message: wrapped,
                })
            }),
        );

        let next = batches.apply(&project, &CancellationToken::new()).expect("applied");
        assert_eq!(text(&next, id), "class C { void M(List<string> a) { } }");
    }

    #[test]
    fn replacement_may_change_the_node_kind() {
        let (project, id) = project("class C { void M(Action<int> a) { } }");
        let ty = first::<ast::Parameter>(&project, id).ty().expect("type");
        assert_eq!(ty.syntax().kind(), SyntaxKind::GenericName);
        let tag = NodeTag::capture(ty.syntax());

        let mut batches = EditBatches::new();
        batches.record(id, tag.clone(), Rewrite::replace_with(make::identifier_name("Write")));
        // Second rewrite of the same node sees the identifier name the first one produced.
        batches.record(
            id,
            tag,
            Rewrite::new(|node| {
                assert_eq!(node.kind(), SyntaxKind::IdentifierName);
                let qualified = format!("C.{node}");
                make::ty(&qualified).map_err(|_| ApplyError::InvalidRewrite {
                    kind: node.kind(),
                    message: qualified,
                })
            }),
        );

        let next = batches.apply(&project, &CancellationToken::new()).expect("applied");
        assert_eq!(text(&next, id), "class C { void M(C.Write a) { } }");
        assert_eq!(text(&project, id), "class C { void M(Action<int> a) { } }");
    }

    #[test]
    fn stale_tag_aborts_every_document() {
        let project = Project::from_sources([
            ("A.cs", "class A { void M(int a) { } }"),
            ("B.cs", "class Bee { void M(int b) { } }"),
        ])
        .expect("project");
        let a = project.document_by_name("A.cs").expect("A").id();
        let b = project.document_by_name("B.cs").expect("B").id();
        let ty = first::<ast::Parameter>(&project, a).ty().expect("type");

        let mut batches = EditBatches::new();
        batches.record(a, NodeTag::capture(ty.syntax()), Rewrite::replace_with(make::ty("long").expect("type")));
        // Tag captured from A, applied to B: same path, different range.
        batches.record(b, NodeTag::capture(ty.syntax()), Rewrite::replace_with(make::ty("long").expect("type")));

        let err = batches
            .apply(&project, &CancellationToken::new())
            .expect_err("B's tag does not resolve");
        assert!(matches!(
            err,
            RefactorError::Apply(ApplyError::TagNotFound { document, .. }) if document == b
        ));
        assert_eq!(text(&project, a), "class A { void M(int a) { } }");
    }

    #[test]
    fn cancelled_before_commit() {
        let (project, id) = project("class C { void M(int a) { } }");
        let ty = first::<ast::Parameter>(&project, id).ty().expect("type");
        let mut batches = EditBatches::new();
        batches.record(id, NodeTag::capture(ty.syntax()), Rewrite::replace_with(make::ty("long").expect("type")));

        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(batches.apply(&project, &token).expect_err("cancelled"), RefactorError::Cancelled);
    }

    #[test]
    fn insertion_out_of_bounds_is_rejected() {
        let (project, id) = project("class C { }");
        let class: ast::TypeDeclaration = first(&project, id);
        let mut batches = EditBatches::new();
        batches.record(
            id,
            NodeTag::capture(class.syntax()),
            Rewrite::insert_children(99, vec![make::whitespace(" ")]),
        );
        let err = batches.apply(&project, &CancellationToken::new()).expect_err("out of bounds");
        assert!(matches!(err, RefactorError::Apply(ApplyError::InvalidRewrite { .. })));
    }
}
