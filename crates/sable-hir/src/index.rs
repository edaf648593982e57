use std::collections::{BTreeMap, HashMap};

use sable_core::{check_cancelled, Cancelled, CancellationToken};
use sable_syntax::{SyntaxKind, SyntaxNodePtr};
use sable_workspace::{DocumentId, Project};
use smol_str::SmolStr;

use crate::ids::{DeclOrigin, FieldId, MethodId, NamespaceId, PropertyId, TypeId};
use crate::ty::{Accessibility, Ty, TypeKind};
use crate::{builtins, collect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    Namespace(NamespaceId),
    Type(TypeId),
}

#[derive(Debug, Clone)]
pub struct NamespaceData {
    pub name: SmolStr,
    pub parent: Option<NamespaceId>,
    pub(crate) children: BTreeMap<SmolStr, NamespaceId>,
    pub(crate) types: Vec<TypeId>,
}

#[derive(Debug, Clone)]
pub struct TypeData {
    pub name: SmolStr,
    pub kind: TypeKind,
    pub type_params: Vec<SmolStr>,
    pub container: Container,
    pub accessibility: Accessibility,
    pub is_abstract: bool,
    pub is_static: bool,
    /// C# keyword aliasing this type (`int` for `System.Int32`).
    pub keyword: Option<&'static str>,
    pub bases: Vec<Ty>,
    pub nested: Vec<TypeId>,
    pub methods: Vec<MethodId>,
    pub constructors: Vec<MethodId>,
    pub fields: Vec<FieldId>,
    pub properties: Vec<PropertyId>,
    /// `Invoke` signature of a delegate type.
    pub invoke: Option<MethodId>,
    pub origin: Option<DeclOrigin>,
}

impl TypeData {
    pub(crate) fn new(name: impl Into<SmolStr>, kind: TypeKind, container: Container) -> Self {
        Self {
            name: name.into(),
            kind,
            type_params: Vec::new(),
            container,
            accessibility: Accessibility::Public,
            is_abstract: false,
            is_static: false,
            keyword: None,
            bases: Vec::new(),
            nested: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            fields: Vec::new(),
            properties: Vec::new(),
            invoke: None,
            origin: None,
        }
    }

    pub fn arity(&self) -> usize {
        self.type_params.len()
    }

    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }

    pub fn is_reference_type(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Class | TypeKind::Interface | TypeKind::Delegate
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    Ordinary,
    Constructor,
    DelegateInvoke,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterData {
    pub name: SmolStr,
    pub ty: Ty,
    pub has_default: bool,
    pub is_params: bool,
    pub origin: Option<DeclOrigin>,
}

impl ParameterData {
    pub(crate) fn new(name: impl Into<SmolStr>, ty: Ty) -> Self {
        Self {
            name: name.into(),
            ty,
            has_default: false,
            is_params: false,
            origin: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MethodData {
    pub name: SmolStr,
    pub kind: MethodKind,
    pub owner: TypeId,
    pub type_params: Vec<SmolStr>,
    pub params: Vec<ParameterData>,
    pub return_ty: Ty,
    pub is_static: bool,
    /// `static M(this T receiver, ...)`.
    pub is_extension: bool,
    pub accessibility: Accessibility,
    pub origin: Option<DeclOrigin>,
}

impl MethodData {
    pub(crate) fn new(name: impl Into<SmolStr>, kind: MethodKind, owner: TypeId) -> Self {
        Self {
            name: name.into(),
            kind,
            owner,
            type_params: Vec::new(),
            params: Vec::new(),
            return_ty: Ty::Void,
            is_static: false,
            is_extension: false,
            accessibility: Accessibility::Public,
            origin: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldData {
    pub name: SmolStr,
    pub owner: TypeId,
    pub ty: Ty,
    pub is_static: bool,
    pub origin: Option<DeclOrigin>,
}

#[derive(Debug, Clone)]
pub struct PropertyData {
    pub name: SmolStr,
    pub owner: TypeId,
    pub ty: Ty,
    pub is_static: bool,
    pub origin: Option<DeclOrigin>,
}

/// A source declaration keyed by its syntax pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decl {
    Namespace(NamespaceId),
    Type(TypeId),
    Method(MethodId),
    Field(FieldId),
    Property(PropertyId),
}

/// Project-wide symbol tables: the builtin metadata types plus every declaration in the
/// project's documents.
#[derive(Debug, Clone)]
pub struct SemanticIndex {
    namespaces: Vec<NamespaceData>,
    types: Vec<TypeData>,
    methods: Vec<MethodData>,
    fields: Vec<FieldData>,
    properties: Vec<PropertyData>,
    keywords: HashMap<SyntaxKind, TypeId>,
    decls: HashMap<(DocumentId, SyntaxNodePtr), Decl>,
}

impl SemanticIndex {
    pub fn build(project: &Project) -> SemanticIndex {
        // A fresh token is never cancelled.
        match Self::build_cancellable(project, &CancellationToken::new()) {
            Ok(index) => index,
            Err(Cancelled) => Self::with_builtins(),
        }
    }

    pub fn build_cancellable(
        project: &Project,
        token: &CancellationToken,
    ) -> Result<SemanticIndex, Cancelled> {
        let mut index = Self::with_builtins();
        let mut pending = Vec::new();
        for doc in project.documents() {
            check_cancelled(token)?;
            collect::declare_document(&mut index, doc, &mut pending);
        }
        check_cancelled(token)?;
        collect::resolve_bases(&mut index, project, &pending);
        check_cancelled(token)?;
        collect::resolve_signatures(&mut index, project, &pending);
        tracing::debug!(
            target: "sable.hir",
            documents = project.len(),
            types = index.types.len(),
            methods = index.methods.len(),
            "built semantic index"
        );
        Ok(index)
    }

    fn with_builtins() -> SemanticIndex {
        let mut index = SemanticIndex {
            namespaces: vec![NamespaceData {
                name: SmolStr::default(),
                parent: None,
                children: BTreeMap::new(),
                types: Vec::new(),
            }],
            types: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            properties: Vec::new(),
            keywords: HashMap::new(),
            decls: HashMap::new(),
        };
        builtins::register(&mut index);
        index
    }

    pub fn global_namespace(&self) -> NamespaceId {
        NamespaceId(0)
    }

    pub fn namespace(&self, id: NamespaceId) -> &NamespaceData {
        &self.namespaces[id.idx()]
    }

    pub fn type_data(&self, id: TypeId) -> &TypeData {
        &self.types[id.idx()]
    }

    pub fn method(&self, id: MethodId) -> &MethodData {
        &self.methods[id.idx()]
    }

    pub fn field(&self, id: FieldId) -> &FieldData {
        &self.fields[id.idx()]
    }

    pub fn property(&self, id: PropertyId) -> &PropertyData {
        &self.properties[id.idx()]
    }

    pub fn decl(&self, document: DocumentId, ptr: SyntaxNodePtr) -> Option<Decl> {
        self.decls.get(&(document, ptr)).copied()
    }

    pub fn keyword_type(&self, keyword: SyntaxKind) -> Option<TypeId> {
        self.keywords.get(&keyword).copied()
    }

    pub fn object_type(&self) -> Option<TypeId> {
        self.keyword_type(SyntaxKind::ObjectKw)
    }

    pub fn child_namespace(&self, parent: NamespaceId, name: &str) -> Option<NamespaceId> {
        self.namespace(parent).children.get(name).copied()
    }

    pub fn types_in_namespace(&self, ns: NamespaceId) -> impl Iterator<Item = TypeId> + '_ {
        self.namespace(ns).types.iter().copied()
    }

    /// Look a type up by namespace path and simple name, e.g.
    /// `("System.Collections.Immutable", "ImmutableArray", 1)`.
    pub fn type_by_path(&self, namespace: &str, name: &str, arity: usize) -> Option<TypeId> {
        let mut ns = self.global_namespace();
        for segment in namespace.split('.').filter(|s| !s.is_empty()) {
            ns = self.child_namespace(ns, segment)?;
        }
        self.types_in_namespace(ns).find(|&t| {
            let data = self.type_data(t);
            data.name == name && data.arity() == arity
        })
    }

    /// Containing namespace, walking out of nested types.
    pub fn containing_namespace(&self, ty: TypeId) -> NamespaceId {
        let mut current = ty;
        loop {
            match self.type_data(current).container {
                Container::Namespace(ns) => return ns,
                Container::Type(outer) => current = outer,
            }
        }
    }

    /// Dotted namespace name; empty for the global namespace.
    pub fn namespace_full_name(&self, ns: NamespaceId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(ns);
        while let Some(id) = current {
            let data = self.namespace(id);
            if data.parent.is_some() {
                segments.push(data.name.as_str());
            }
            current = data.parent;
        }
        segments.reverse();
        segments.join(".")
    }

    /// `Namespace.Outer.Name` without type arguments or arity.
    pub fn full_name(&self, ty: TypeId) -> String {
        let data = self.type_data(ty);
        let prefix = match data.container {
            Container::Type(outer) => self.full_name(outer),
            Container::Namespace(ns) => self.namespace_full_name(ns),
        };
        if prefix.is_empty() {
            data.name.to_string()
        } else {
            format!("{prefix}.{}", data.name)
        }
    }

    /// Fully qualified rendering with keywords for predefined types, used in diagnostics
    /// and logs.
    pub fn display_qualified(&self, ty: &Ty) -> String {
        match ty {
            Ty::Named { def, args } => {
                let data = self.type_data(*def);
                if let Some(keyword) = data.keyword {
                    return keyword.to_string();
                }
                let mut out = self.full_name(*def);
                if !args.is_empty() {
                    let args: Vec<_> = args.iter().map(|a| self.display_qualified(a)).collect();
                    out.push('<');
                    out.push_str(&args.join(", "));
                    out.push('>');
                }
                out
            }
            Ty::TypeParam { name, .. } => name.to_string(),
            Ty::Array { element, rank } => {
                let commas = ",".repeat(rank.saturating_sub(1) as usize);
                format!("{}[{commas}]", self.display_qualified(element))
            }
            Ty::Nullable(inner) => format!("{}?", self.display_qualified(inner)),
            Ty::Void => "void".to_string(),
            Ty::Null => "null".to_string(),
            Ty::Error(text) => text.to_string(),
        }
    }

    /// The class base of `ty`: the first declared base that is a class, or `object` for
    /// classes and structs without one.
    pub fn class_base(&self, ty: TypeId) -> Option<TypeId> {
        let data = self.type_data(ty);
        let declared = data
            .bases
            .iter()
            .filter_map(Ty::def)
            .find(|&b| self.type_data(b).kind == TypeKind::Class);
        if declared.is_some() {
            return declared;
        }
        let object = self.object_type()?;
        match data.kind {
            TypeKind::Class | TypeKind::Struct | TypeKind::Enum | TypeKind::Delegate
                if ty != object =>
            {
                Some(object)
            }
            _ => None,
        }
    }

    /// `ty` followed by its class bases, guarding against cyclic declarations.
    pub fn base_chain(&self, ty: TypeId) -> Vec<TypeId> {
        let mut chain = vec![ty];
        let mut current = ty;
        while let Some(base) = self.class_base(current) {
            if chain.contains(&base) {
                break;
            }
            chain.push(base);
            current = base;
        }
        chain
    }

    pub fn is_subclass_of(&self, ty: TypeId, base: TypeId) -> bool {
        self.base_chain(ty).contains(&base)
    }

    pub fn direct_bases(&self, ty: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        self.type_data(ty).bases.iter().filter_map(Ty::def)
    }

    // --- arena allocation ---

    pub(crate) fn ensure_namespace(&mut self, parent: NamespaceId, name: &str) -> NamespaceId {
        if let Some(existing) = self.child_namespace(parent, name) {
            return existing;
        }
        let id = NamespaceId(self.namespaces.len() as u32);
        self.namespaces.push(NamespaceData {
            name: name.into(),
            parent: Some(parent),
            children: BTreeMap::new(),
            types: Vec::new(),
        });
        self.namespaces[parent.idx()].children.insert(name.into(), id);
        id
    }

    pub(crate) fn ensure_namespace_path(&mut self, parent: NamespaceId, path: &str) -> NamespaceId {
        path.split('.')
            .filter(|s| !s.is_empty())
            .fold(parent, |ns, segment| self.ensure_namespace(ns, segment))
    }

    pub(crate) fn alloc_type(&mut self, data: TypeData) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        match data.container {
            Container::Namespace(ns) => self.namespaces[ns.idx()].types.push(id),
            Container::Type(outer) => self.types[outer.idx()].nested.push(id),
        }
        if let Some(keyword) = data.keyword.and_then(keyword_kind) {
            self.keywords.insert(keyword, id);
        }
        self.types.push(data);
        id
    }

    pub(crate) fn alloc_method(&mut self, data: MethodData) -> MethodId {
        let id = MethodId(self.methods.len() as u32);
        let owner = &mut self.types[data.owner.idx()];
        match data.kind {
            MethodKind::Ordinary => owner.methods.push(id),
            MethodKind::Constructor => owner.constructors.push(id),
            MethodKind::DelegateInvoke => owner.invoke = Some(id),
        }
        self.methods.push(data);
        id
    }

    pub(crate) fn alloc_field(&mut self, data: FieldData) -> FieldId {
        let id = FieldId(self.fields.len() as u32);
        self.types[data.owner.idx()].fields.push(id);
        self.fields.push(data);
        id
    }

    pub(crate) fn alloc_property(&mut self, data: PropertyData) -> PropertyId {
        let id = PropertyId(self.properties.len() as u32);
        self.types[data.owner.idx()].properties.push(id);
        self.properties.push(data);
        id
    }

    pub(crate) fn record_decl(&mut self, origin: DeclOrigin, decl: Decl) {
        self.decls.insert((origin.document, origin.ptr), decl);
    }

    pub(crate) fn type_data_mut(&mut self, id: TypeId) -> &mut TypeData {
        &mut self.types[id.idx()]
    }

    pub(crate) fn method_mut(&mut self, id: MethodId) -> &mut MethodData {
        &mut self.methods[id.idx()]
    }

    pub(crate) fn field_mut(&mut self, id: FieldId) -> &mut FieldData {
        &mut self.fields[id.idx()]
    }

    pub(crate) fn property_mut(&mut self, id: PropertyId) -> &mut PropertyData {
        &mut self.properties[id.idx()]
    }
}

fn keyword_kind(keyword: &str) -> Option<SyntaxKind> {
    let kind = SyntaxKind::from_keyword(keyword)?;
    kind.is_predefined_type().then_some(kind)
}
