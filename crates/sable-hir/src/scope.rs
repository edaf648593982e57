//! Name lookup for types and namespaces at a syntax position.

use sable_syntax::ast::{self, AstNode};
use sable_syntax::{SyntaxKind, SyntaxNode, SyntaxNodePtr};
use sable_workspace::DocumentId;

use crate::ids::{MethodId, NamespaceId, TypeId};
use crate::index::{Decl, SemanticIndex};
use crate::ty::{Ty, TypeParamOwner};

#[derive(Debug, Clone, PartialEq)]
pub enum NameResolution {
    Namespace(NamespaceId),
    Type(Ty),
}

#[derive(Debug, Clone)]
enum ScopeEntry {
    Method(MethodId),
    Type(TypeId),
    /// `usings` is the compilation unit or namespace declaration whose using directives
    /// apply at this level.
    Namespace {
        ns: NamespaceId,
        usings: Option<SyntaxNode>,
    },
}

/// Lookup chain, innermost first.
#[derive(Debug, Clone)]
pub struct Scope<'a> {
    index: &'a SemanticIndex,
    entries: Vec<ScopeEntry>,
}

impl<'a> Scope<'a> {
    pub fn at(index: &'a SemanticIndex, document: DocumentId, node: &SyntaxNode) -> Scope<'a> {
        let mut entries = Vec::new();
        let mut levels: Vec<(NamespaceId, Option<SyntaxNode>)> = Vec::new();
        let mut unit = None;
        for anc in node.ancestors() {
            let decl = || index.decl(document, SyntaxNodePtr::new(&anc));
            match anc.kind() {
                SyntaxKind::MethodDeclaration | SyntaxKind::ConstructorDeclaration => {
                    if let Some(Decl::Method(m)) = decl() {
                        entries.push(ScopeEntry::Method(m));
                    }
                }
                SyntaxKind::ClassDeclaration
                | SyntaxKind::StructDeclaration
                | SyntaxKind::InterfaceDeclaration
                | SyntaxKind::EnumDeclaration
                | SyntaxKind::DelegateDeclaration => {
                    if let Some(Decl::Type(t)) = decl() {
                        entries.push(ScopeEntry::Type(t));
                    }
                }
                SyntaxKind::NamespaceDeclaration | SyntaxKind::FileScopedNamespaceDeclaration => {
                    if let Some(Decl::Namespace(ns)) = decl() {
                        levels.push((ns, Some(anc.clone())));
                    }
                }
                SyntaxKind::CompilationUnit => unit = Some(anc.clone()),
                _ => {}
            }
        }
        levels.push((index.global_namespace(), unit));

        for (i, (ns, usings)) in levels.iter().enumerate() {
            entries.push(ScopeEntry::Namespace {
                ns: *ns,
                usings: usings.clone(),
            });
            // `namespace A.B` also opens `A`, without using directives of its own.
            let stop = levels.get(i + 1).map(|(outer, _)| *outer);
            let mut parent = index.namespace(*ns).parent;
            while let Some(p) = parent {
                if Some(p) == stop {
                    break;
                }
                entries.push(ScopeEntry::Namespace { ns: p, usings: None });
                parent = index.namespace(p).parent;
            }
        }
        Scope { index, entries }
    }

    pub fn index(&self) -> &'a SemanticIndex {
        self.index
    }

    /// Enclosing types, innermost first.
    pub fn enclosing_types(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.entries.iter().filter_map(|e| match e {
            ScopeEntry::Type(t) => Some(*t),
            _ => None,
        })
    }

    pub fn enclosing_method(&self) -> Option<MethodId> {
        match self.entries.first() {
            Some(ScopeEntry::Method(m)) => Some(*m),
            _ => None,
        }
    }

    pub fn resolve_type(&self, ty: &ast::Type) -> Ty {
        match ty {
            ast::Type::Predefined(p) => self.predefined(p),
            ast::Type::Array(array) => {
                let mut element = array
                    .element_type()
                    .map(|e| self.resolve_type(&e))
                    .unwrap_or_else(|| Ty::Error(ty.text().into()));
                for rank in array
                    .syntax()
                    .children()
                    .filter(|n| n.kind() == SyntaxKind::ArrayRankSpecifier)
                {
                    let commas = rank
                        .children_with_tokens()
                        .filter(|el| el.kind() == SyntaxKind::Comma)
                        .count();
                    element = Ty::Array {
                        element: Box::new(element),
                        rank: commas as u32 + 1,
                    };
                }
                element
            }
            ast::Type::Nullable(nullable) => Ty::Nullable(Box::new(
                nullable
                    .element_type()
                    .map(|e| self.resolve_type(&e))
                    .unwrap_or_else(|| Ty::Error(ty.text().into())),
            )),
            _ => match self.resolve_name(ty) {
                Some(NameResolution::Type(resolved)) => resolved,
                _ => Ty::Error(ty.text().into()),
            },
        }
    }

    fn predefined(&self, p: &ast::PredefinedType) -> Ty {
        match p.keyword() {
            Some(kw) if kw.kind() == SyntaxKind::VoidKw => Ty::Void,
            Some(kw) => self
                .index
                .keyword_type(kw.kind())
                .map(Ty::named)
                .unwrap_or_else(|| Ty::Error(kw.text().into())),
            None => Ty::Error("".into()),
        }
    }

    /// Resolve a name-shaped type syntax to a namespace or a type.
    pub fn resolve_name(&self, ty: &ast::Type) -> Option<NameResolution> {
        match ty {
            ast::Type::Identifier(name) => self.lookup(&name.text()?, 0),
            ast::Type::Generic(generic) => {
                let found = self.lookup(&generic.text()?, generic.arity())?;
                Some(self.with_type_args(found, generic.type_argument_list()))
            }
            ast::Type::Qualified(q) => {
                let left = self.resolve_name(&q.left()?)?;
                self.member(left, &q.right()?)
            }
            ast::Type::AliasQualified(aq) => {
                let alias = aq.alias()?.text()?;
                let left = if alias == "global" {
                    NameResolution::Namespace(self.index.global_namespace())
                } else {
                    self.lookup(&alias, 0)?
                };
                self.member(left, &aq.name()?)
            }
            ast::Type::Predefined(p) => Some(NameResolution::Type(self.predefined(p))),
            ast::Type::Array(_) | ast::Type::Nullable(_) => {
                Some(NameResolution::Type(self.resolve_type(ty)))
            }
        }
    }

    /// `left.name` where `left` names a namespace or a type.
    pub fn member(&self, left: NameResolution, name: &ast::SimpleName) -> Option<NameResolution> {
        let text = name.text()?;
        let args = name.type_argument_list();
        let arity = args.as_ref().map_or(0, |l| l.arguments().count());
        let found = match left {
            NameResolution::Namespace(ns) => {
                if let Some(t) = type_in_namespace(self.index, ns, &text, arity) {
                    NameResolution::Type(Ty::named(t))
                } else if arity == 0 {
                    NameResolution::Namespace(self.index.child_namespace(ns, &text)?)
                } else {
                    return None;
                }
            }
            NameResolution::Type(ty) => {
                let nested = nested_type(self.index, ty.def()?, &text, arity)?;
                NameResolution::Type(Ty::named(nested))
            }
        };
        Some(self.with_type_args(found, args))
    }

    fn with_type_args(
        &self,
        found: NameResolution,
        args: Option<ast::TypeArgumentList>,
    ) -> NameResolution {
        match (found, args) {
            (NameResolution::Type(Ty::Named { def, .. }), Some(list)) => {
                NameResolution::Type(Ty::Named {
                    def,
                    args: list.arguments().map(|a| self.resolve_type(&a)).collect(),
                })
            }
            (found, _) => found,
        }
    }

    /// Simple-name lookup for a type, type parameter or namespace.
    pub fn lookup(&self, name: &str, arity: usize) -> Option<NameResolution> {
        for (i, entry) in self.entries.iter().enumerate() {
            match entry {
                ScopeEntry::Method(m) => {
                    if arity == 0 {
                        let method = self.index.method(*m);
                        if let Some(idx) = method.type_params.iter().position(|p| p == name) {
                            return Some(NameResolution::Type(Ty::TypeParam {
                                owner: TypeParamOwner::Method(*m),
                                index: idx as u32,
                                name: name.into(),
                            }));
                        }
                    }
                }
                ScopeEntry::Type(t) => {
                    let data = self.index.type_data(*t);
                    if arity == 0 {
                        if let Some(idx) = data.type_params.iter().position(|p| p == name) {
                            return Some(NameResolution::Type(Ty::TypeParam {
                                owner: TypeParamOwner::Type(*t),
                                index: idx as u32,
                                name: name.into(),
                            }));
                        }
                    }
                    if let Some(nested) = nested_type(self.index, *t, name, arity) {
                        return Some(NameResolution::Type(Ty::named(nested)));
                    }
                }
                ScopeEntry::Namespace { ns, usings } => {
                    if let Some(t) = type_in_namespace(self.index, *ns, name, arity) {
                        return Some(NameResolution::Type(Ty::named(t)));
                    }
                    if arity == 0 {
                        if let Some(child) = self.index.child_namespace(*ns, name) {
                            return Some(NameResolution::Namespace(child));
                        }
                    }
                    if let Some(owner) = usings {
                        if let Some(found) = self.lookup_in_usings(i, *ns, owner, name, arity) {
                            return Some(found);
                        }
                    }
                }
            }
        }
        None
    }

    /// Namespaces searched for extension methods, innermost first: every enclosing namespace
    /// and the namespaces its `using` directives import.
    pub fn extension_namespaces(&self) -> Vec<NamespaceId> {
        let mut out = Vec::new();
        for (i, entry) in self.entries.iter().enumerate() {
            let ScopeEntry::Namespace { ns, usings } = entry else {
                continue;
            };
            if !out.contains(ns) {
                out.push(*ns);
            }
            let Some(owner) = usings else {
                continue;
            };
            let outer = self.outer_for_usings(i, *ns);
            for using in using_directives(owner)
                .iter()
                .filter(|u| u.alias().is_none() && !u.is_static())
            {
                let imported = using.target().and_then(|target| outer.resolve_name(&target));
                if let Some(NameResolution::Namespace(imported)) = imported {
                    if !out.contains(&imported) {
                        out.push(imported);
                    }
                }
            }
        }
        out
    }

    /// Using targets bind in the enclosing context, without this level's directives.
    fn outer_for_usings(&self, level: usize, ns: NamespaceId) -> Scope<'a> {
        let mut entries = vec![ScopeEntry::Namespace { ns, usings: None }];
        entries.extend(self.entries[level + 1..].iter().cloned());
        Scope {
            index: self.index,
            entries,
        }
    }

    fn lookup_in_usings(
        &self,
        level: usize,
        ns: NamespaceId,
        owner: &SyntaxNode,
        name: &str,
        arity: usize,
    ) -> Option<NameResolution> {
        let outer = self.outer_for_usings(level, ns);

        let usings = using_directives(owner);
        if arity == 0 {
            for using in &usings {
                let alias = using.alias();
                if alias.as_ref().map(|a| a.text()) == Some(name) {
                    return outer.resolve_name(&using.target()?);
                }
            }
        }
        for using in usings.iter().filter(|u| u.alias().is_none() && !u.is_static()) {
            let Some(target) = using.target() else {
                continue;
            };
            if let Some(NameResolution::Namespace(imported)) = outer.resolve_name(&target) {
                if let Some(t) = type_in_namespace(self.index, imported, name, arity) {
                    return Some(NameResolution::Type(Ty::named(t)));
                }
            }
        }
        None
    }
}

fn using_directives(owner: &SyntaxNode) -> Vec<ast::UsingDirective> {
    if let Some(unit) = ast::CompilationUnit::cast(owner.clone()) {
        return unit.usings().collect();
    }
    if let Some(ns) = ast::NamespaceDeclaration::cast(owner.clone()) {
        return ns.usings().collect();
    }
    Vec::new()
}

pub(crate) fn type_in_namespace(
    index: &SemanticIndex,
    ns: NamespaceId,
    name: &str,
    arity: usize,
) -> Option<TypeId> {
    index.types_in_namespace(ns).find(|&t| {
        let data = index.type_data(t);
        data.name == name && data.arity() == arity
    })
}

/// Nested type declared in `owner` or inherited from its class bases.
pub(crate) fn nested_type(
    index: &SemanticIndex,
    owner: TypeId,
    name: &str,
    arity: usize,
) -> Option<TypeId> {
    index.base_chain(owner).into_iter().find_map(|t| {
        index.type_data(t).nested.iter().copied().find(|&n| {
            let data = index.type_data(n);
            data.name == name && data.arity() == arity
        })
    })
}
