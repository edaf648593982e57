//! Declaration collection: one pass declaring every namespace, type and member, then base
//! types, then member signatures (which may mention any type in the project).

use std::collections::HashMap;

use sable_syntax::ast::{self, AstNode};
use sable_syntax::{SyntaxKind, SyntaxNode, SyntaxNodePtr};
use sable_workspace::{Document, DocumentId, Project};
use smol_str::SmolStr;

use crate::ids::{DeclOrigin, TypeId};
use crate::index::{
    Container, Decl, FieldData, MethodData, MethodKind, ParameterData, PropertyData,
    SemanticIndex, TypeData,
};
use crate::scope::Scope;
use crate::ty::{Accessibility, Ty, TypeKind};

#[derive(Debug, Clone)]
pub(crate) struct Pending {
    origin: DeclOrigin,
    decl: Decl,
}

pub(crate) fn declare_document(index: &mut SemanticIndex, doc: &Document, pending: &mut Vec<Pending>) {
    let Some(unit) = ast::CompilationUnit::cast(doc.syntax()) else {
        return;
    };
    let global = index.global_namespace();
    for member in unit.members() {
        declare_member(index, doc.id(), Container::Namespace(global), &member, pending);
    }
}

fn origin(document: DocumentId, node: &SyntaxNode) -> DeclOrigin {
    DeclOrigin {
        document,
        ptr: SyntaxNodePtr::new(node),
    }
}

fn declare_member(
    index: &mut SemanticIndex,
    document: DocumentId,
    container: Container,
    node: &SyntaxNode,
    pending: &mut Vec<Pending>,
) {
    let origin = origin(document, node);
    match node.kind() {
        SyntaxKind::NamespaceDeclaration | SyntaxKind::FileScopedNamespaceDeclaration => {
            let (Container::Namespace(parent), Some(decl)) =
                (container, ast::NamespaceDeclaration::cast(node.clone()))
            else {
                return;
            };
            let name = decl.name().map(|n| n.text()).unwrap_or_default();
            let ns = index.ensure_namespace_path(parent, &name);
            index.record_decl(origin, Decl::Namespace(ns));
            for member in decl.members() {
                declare_member(index, document, Container::Namespace(ns), &member, pending);
            }
        }
        SyntaxKind::ClassDeclaration | SyntaxKind::StructDeclaration | SyntaxKind::InterfaceDeclaration => {
            let Some(decl) = ast::TypeDeclaration::cast(node.clone()) else {
                return;
            };
            let kind = match node.kind() {
                SyntaxKind::StructDeclaration => TypeKind::Struct,
                SyntaxKind::InterfaceDeclaration => TypeKind::Interface,
                _ => TypeKind::Class,
            };
            let mut data = TypeData::new(decl.name().unwrap_or_default(), kind, container);
            data.type_params = type_params(decl.type_parameter_list());
            data.accessibility = accessibility(decl.modifiers(), default_type_accessibility(container));
            data.is_abstract = decl.has_modifier(SyntaxKind::AbstractKw)
                || decl.has_modifier(SyntaxKind::StaticKw)
                || kind == TypeKind::Interface;
            data.is_static = decl.has_modifier(SyntaxKind::StaticKw);
            data.origin = Some(origin);
            let id = index.alloc_type(data);
            pend(index, pending, origin, Decl::Type(id));
            for member in decl.members() {
                declare_member(index, document, Container::Type(id), &member, pending);
            }
        }
        SyntaxKind::EnumDeclaration => {
            let Some(decl) = ast::EnumDeclaration::cast(node.clone()) else {
                return;
            };
            let name: SmolStr = decl.name_token().map(|t| t.text().into()).unwrap_or_default();
            let mut data = TypeData::new(name, TypeKind::Enum, container);
            data.accessibility = accessibility(decl.modifiers(), default_type_accessibility(container));
            data.origin = Some(origin);
            let id = index.alloc_type(data);
            index.record_decl(origin, Decl::Type(id));
            for member in decl.members() {
                let Some(name) = member.name_token() else {
                    continue;
                };
                let field_origin = self::origin(document, member.syntax());
                let field = index.alloc_field(FieldData {
                    name: name.text().into(),
                    owner: id,
                    ty: Ty::named(id),
                    is_static: true,
                    origin: Some(field_origin),
                });
                index.record_decl(field_origin, Decl::Field(field));
            }
        }
        SyntaxKind::DelegateDeclaration => {
            let Some(decl) = ast::DelegateDeclaration::cast(node.clone()) else {
                return;
            };
            let mut data = TypeData::new(decl.name().unwrap_or_default(), TypeKind::Delegate, container);
            data.type_params = type_params(decl.type_parameter_list());
            data.accessibility = accessibility(decl.modifiers(), default_type_accessibility(container));
            data.origin = Some(origin);
            let id = index.alloc_type(data);
            let mut invoke = MethodData::new("Invoke", MethodKind::DelegateInvoke, id);
            invoke.origin = Some(origin);
            index.alloc_method(invoke);
            pend(index, pending, origin, Decl::Type(id));
        }
        SyntaxKind::MethodDeclaration => {
            let (Container::Type(owner), Some(decl)) =
                (container, ast::MethodDeclaration::cast(node.clone()))
            else {
                return;
            };
            let mut data = MethodData::new(decl.name().unwrap_or_default(), MethodKind::Ordinary, owner);
            data.type_params = type_params(decl.type_parameter_list());
            data.is_static = decl.has_modifier(SyntaxKind::StaticKw);
            data.is_extension = data.is_static
                && decl
                    .parameters()
                    .next()
                    .map_or(false, |first| has_modifier(first.modifiers(), SyntaxKind::ThisKw));
            data.accessibility = accessibility(decl.modifiers(), default_member_accessibility(index, owner));
            data.origin = Some(origin);
            let id = index.alloc_method(data);
            pend(index, pending, origin, Decl::Method(id));
        }
        SyntaxKind::ConstructorDeclaration => {
            let (Container::Type(owner), Some(decl)) =
                (container, ast::ConstructorDeclaration::cast(node.clone()))
            else {
                return;
            };
            let name = index.type_data(owner).name.clone();
            let mut data = MethodData::new(name, MethodKind::Constructor, owner);
            data.is_static = has_modifier(decl.modifiers(), SyntaxKind::StaticKw);
            data.accessibility = accessibility(decl.modifiers(), default_member_accessibility(index, owner));
            data.origin = Some(origin);
            let id = index.alloc_method(data);
            pend(index, pending, origin, Decl::Method(id));
        }
        SyntaxKind::FieldDeclaration => {
            let (Container::Type(owner), Some(decl)) =
                (container, ast::FieldDeclaration::cast(node.clone()))
            else {
                return;
            };
            let is_static = has_modifier(decl.modifiers(), SyntaxKind::StaticKw)
                || has_modifier(decl.modifiers(), SyntaxKind::ConstKw);
            let Some(declaration) = decl.declaration() else {
                return;
            };
            for declarator in declaration.declarators() {
                let Some(name) = declarator.name_token() else {
                    continue;
                };
                let field_origin = self::origin(document, declarator.syntax());
                let id = index.alloc_field(FieldData {
                    name: name.text().into(),
                    owner,
                    ty: Ty::Error("".into()),
                    is_static,
                    origin: Some(field_origin),
                });
                pend(index, pending, field_origin, Decl::Field(id));
            }
        }
        SyntaxKind::PropertyDeclaration => {
            let (Container::Type(owner), Some(decl)) =
                (container, ast::PropertyDeclaration::cast(node.clone()))
            else {
                return;
            };
            let Some(name) = decl.name_token() else {
                return;
            };
            let id = index.alloc_property(PropertyData {
                name: name.text().into(),
                owner,
                ty: Ty::Error("".into()),
                is_static: has_modifier(decl.modifiers(), SyntaxKind::StaticKw),
                origin: Some(origin),
            });
            pend(index, pending, origin, Decl::Property(id));
        }
        _ => {}
    }
}

fn pend(index: &mut SemanticIndex, pending: &mut Vec<Pending>, origin: DeclOrigin, decl: Decl) {
    index.record_decl(origin, decl);
    pending.push(Pending { origin, decl });
}

fn type_params(list: Option<ast::TypeParameterList>) -> Vec<SmolStr> {
    list.map(|l| {
        l.parameters()
            .filter_map(|p| p.name_token())
            .map(|t| t.text().into())
            .collect()
    })
    .unwrap_or_default()
}

fn has_modifier(modifiers: Option<ast::Modifiers>, kind: SyntaxKind) -> bool {
    modifiers.map_or(false, |m| m.has(kind))
}

fn default_type_accessibility(container: Container) -> Accessibility {
    match container {
        Container::Namespace(_) => Accessibility::Internal,
        Container::Type(_) => Accessibility::Private,
    }
}

fn default_member_accessibility(index: &SemanticIndex, owner: TypeId) -> Accessibility {
    match index.type_data(owner).kind {
        TypeKind::Interface => Accessibility::Public,
        _ => Accessibility::Private,
    }
}

fn accessibility(modifiers: Option<ast::Modifiers>, default: Accessibility) -> Accessibility {
    let Some(modifiers) = modifiers else {
        return default;
    };
    let has = |kind| modifiers.has(kind);
    match (
        has(SyntaxKind::PublicKw),
        has(SyntaxKind::ProtectedKw),
        has(SyntaxKind::InternalKw),
        has(SyntaxKind::PrivateKw),
    ) {
        (true, ..) => Accessibility::Public,
        (false, true, true, _) => Accessibility::ProtectedInternal,
        (false, true, false, true) => Accessibility::PrivateProtected,
        (false, true, false, false) => Accessibility::Protected,
        (false, false, true, _) => Accessibility::Internal,
        (false, false, false, true) => Accessibility::Private,
        _ => default,
    }
}

struct Roots<'p> {
    project: &'p Project,
    cache: HashMap<DocumentId, SyntaxNode>,
}

impl<'p> Roots<'p> {
    fn new(project: &'p Project) -> Self {
        Self {
            project,
            cache: HashMap::new(),
        }
    }

    fn node(&mut self, origin: DeclOrigin) -> Option<SyntaxNode> {
        if !self.cache.contains_key(&origin.document) {
            let root = self.project.document(origin.document)?.syntax();
            self.cache.insert(origin.document, root);
        }
        origin.ptr.to_node(self.cache.get(&origin.document)?)
    }
}

pub(crate) fn resolve_bases(index: &mut SemanticIndex, project: &Project, pending: &[Pending]) {
    let mut roots = Roots::new(project);
    for item in pending {
        let Decl::Type(id) = item.decl else {
            continue;
        };
        let Some(decl) = roots.node(item.origin).and_then(ast::TypeDeclaration::cast) else {
            continue;
        };
        let bases: Vec<Ty> = {
            let scope = Scope::at(index, item.origin.document, decl.syntax());
            decl.base_list()
                .map(|list| list.types().map(|t| scope.resolve_type(&t)).collect())
                .unwrap_or_default()
        };
        index.type_data_mut(id).bases = bases;
    }
}

pub(crate) fn resolve_signatures(index: &mut SemanticIndex, project: &Project, pending: &[Pending]) {
    let mut roots = Roots::new(project);
    for item in pending {
        let Some(node) = roots.node(item.origin) else {
            continue;
        };
        let document = item.origin.document;
        match item.decl {
            Decl::Type(id) => {
                let Some(decl) = ast::DelegateDeclaration::cast(node) else {
                    continue;
                };
                let Some(invoke) = index.type_data(id).invoke else {
                    continue;
                };
                let (params, ret) = {
                    let scope = Scope::at(index, document, decl.syntax());
                    (
                        parameters(&scope, document, decl.parameter_list()),
                        return_type(&scope, decl.return_type()),
                    )
                };
                let method = index.method_mut(invoke);
                method.params = params;
                method.return_ty = ret;
            }
            Decl::Method(id) => {
                let (params, ret) = {
                    let scope = Scope::at(index, document, &node);
                    if let Some(decl) = ast::MethodDeclaration::cast(node.clone()) {
                        (
                            parameters(&scope, document, decl.parameter_list()),
                            return_type(&scope, decl.return_type()),
                        )
                    } else if let Some(decl) = ast::ConstructorDeclaration::cast(node) {
                        (parameters(&scope, document, decl.parameter_list()), Ty::Void)
                    } else {
                        continue;
                    }
                };
                let method = index.method_mut(id);
                method.params = params;
                method.return_ty = ret;
            }
            Decl::Field(id) => {
                let ty = node
                    .parent()
                    .and_then(ast::VariableDeclaration::cast)
                    .and_then(|d| d.ty())
                    .map(|t| Scope::at(index, document, &node).resolve_type(&t));
                if let Some(ty) = ty {
                    index.field_mut(id).ty = ty;
                }
            }
            Decl::Property(id) => {
                let ty = ast::PropertyDeclaration::cast(node.clone())
                    .and_then(|d| d.ty())
                    .map(|t| Scope::at(index, document, &node).resolve_type(&t));
                if let Some(ty) = ty {
                    index.property_mut(id).ty = ty;
                }
            }
            Decl::Namespace(_) => {}
        }
    }
}

fn return_type(scope: &Scope<'_>, ty: Option<ast::Type>) -> Ty {
    ty.map(|t| scope.resolve_type(&t)).unwrap_or(Ty::Void)
}

fn parameters(
    scope: &Scope<'_>,
    document: DocumentId,
    list: Option<ast::ParameterList>,
) -> Vec<ParameterData> {
    let Some(list) = list else {
        return Vec::new();
    };
    list.parameters()
        .map(|param| {
            let ty = param
                .ty()
                .map(|t| scope.resolve_type(&t))
                .unwrap_or_else(|| Ty::Error("".into()));
            let mut data = ParameterData::new(param.name().unwrap_or_default(), ty);
            data.has_default = param.default_value().is_some();
            data.is_params = has_modifier(param.modifiers(), SyntaxKind::ParamsKw);
            data.origin = Some(origin(document, param.syntax()));
            data
        })
        .collect()
}
