//! Semantic layer for C# documents.
//!
//! [`SemanticIndex`] is a declaration table built from every document of a
//! [`sable_workspace::Project`] plus a small set of framework types (`System`,
//! `System.Collections.Generic`, `System.Collections.Immutable`). Bodies are not
//! analyzed up front: [`SemanticModel`] binds names, types expressions and resolves
//! overloads on demand for one document.

mod builtins;
mod callers;
mod collect;
mod ids;
mod index;
mod model;
mod scope;
mod ty;

pub use callers::{callee_name, find_callers, CallerRef};
pub use ids::{DeclOrigin, FieldId, MethodId, NamespaceId, PropertyId, TypeId};
pub use index::{
    Container, Decl, FieldData, MethodData, MethodKind, NamespaceData, ParameterData,
    PropertyData, SemanticIndex, TypeData,
};
pub use model::{ParameterOwner, ParameterSymbol, SemanticModel, Symbol};
pub use scope::{NameResolution, Scope};
pub use ty::{Accessibility, Ty, TypeKind, TypeParamOwner};
