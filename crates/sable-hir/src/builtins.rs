//! Metadata for the framework types the tooling relies on.

use smol_str::SmolStr;

use crate::ids::{MethodId, NamespaceId, TypeId};
use crate::index::{
    Container, FieldData, MethodData, MethodKind, ParameterData, PropertyData, SemanticIndex,
    TypeData,
};
use crate::ty::{Ty, TypeKind, TypeParamOwner};

const PREDEFINED: &[(&str, &str, TypeKind)] = &[
    ("Object", "object", TypeKind::Class),
    ("String", "string", TypeKind::Class),
    ("Boolean", "bool", TypeKind::Struct),
    ("Byte", "byte", TypeKind::Struct),
    ("SByte", "sbyte", TypeKind::Struct),
    ("Char", "char", TypeKind::Struct),
    ("Decimal", "decimal", TypeKind::Struct),
    ("Double", "double", TypeKind::Struct),
    ("Single", "float", TypeKind::Struct),
    ("Int32", "int", TypeKind::Struct),
    ("UInt32", "uint", TypeKind::Struct),
    ("Int64", "long", TypeKind::Struct),
    ("UInt64", "ulong", TypeKind::Struct),
    ("Int16", "short", TypeKind::Struct),
    ("UInt16", "ushort", TypeKind::Struct),
];

pub(crate) fn register(index: &mut SemanticIndex) {
    let global = index.global_namespace();
    let system = index.ensure_namespace(global, "System");

    for &(name, keyword, kind) in PREDEFINED {
        let mut data = TypeData::new(name, kind, Container::Namespace(system));
        data.keyword = Some(keyword);
        index.alloc_type(data);
    }
    let object = index.object_type().map(Ty::named).unwrap_or(Ty::Error("object".into()));
    let string = keyword_ty(index, "string");
    let int = keyword_ty(index, "int");
    let bool_ty = keyword_ty(index, "bool");

    register_console(index, system, &string, &object, &int);
    index.alloc_type(TypeData::new("EventArgs", TypeKind::Class, Container::Namespace(system)));
    index.alloc_type(TypeData::new("Exception", TypeKind::Class, Container::Namespace(system)));

    for arity in 0..=16 {
        let names = action_type_params(arity);
        let params = invoke_parameter_names(arity, "obj");
        delegate(index, system, "Action", &names, &params, |_| Ty::Void);
    }
    for arity in 1..=17 {
        let inputs = arity - 1;
        let mut names = action_type_params(inputs);
        names.push("TResult".into());
        let params = invoke_parameter_names(inputs, "arg");
        delegate(index, system, "Func", &names, &params, |t| {
            type_param(TypeParamOwner::Type(t), inputs, "TResult")
        });
    }
    delegate(index, system, "Predicate", &["T".into()], &["obj".into()], |_| bool_ty.clone());
    register_comparison(index, system, &int);
    register_event_handler(index, system, &object);

    let generic = index.ensure_namespace_path(global, "System.Collections.Generic");
    let enumerable = generic_type(index, generic, "IEnumerable", TypeKind::Interface, &["T"]);
    let list = generic_type(index, generic, "List", TypeKind::Class, &["T"]);
    index.type_data_mut(list).bases.push(Ty::Named {
        def: enumerable,
        args: vec![type_param(TypeParamOwner::Type(list), 0, "T")],
    });
    let list_t = type_param(TypeParamOwner::Type(list), 0, "T");
    constructor(index, list, Vec::new());
    method(index, list, "Add", false, vec![ParameterData::new("item", list_t.clone())], Ty::Void);
    property(index, list, "Count", int.clone(), false);
    let dictionary = generic_type(index, generic, "Dictionary", TypeKind::Class, &["TKey", "TValue"]);
    constructor(index, dictionary, Vec::new());
    method(
        index,
        dictionary,
        "Add",
        false,
        vec![
            ParameterData::new("key", type_param(TypeParamOwner::Type(dictionary), 0, "TKey")),
            ParameterData::new("value", type_param(TypeParamOwner::Type(dictionary), 1, "TValue")),
        ],
        Ty::Void,
    );

    register_immutable_array(index, global, &int);
}

fn keyword_ty(index: &SemanticIndex, keyword: &str) -> Ty {
    sable_syntax::SyntaxKind::from_keyword(keyword)
        .and_then(|kind| index.keyword_type(kind))
        .map(Ty::named)
        .unwrap_or_else(|| Ty::Error(keyword.into()))
}

fn type_param(owner: TypeParamOwner, index: usize, name: &str) -> Ty {
    Ty::TypeParam {
        owner,
        index: index as u32,
        name: name.into(),
    }
}

/// `T` for one parameter, `T1..Tn` otherwise.
fn action_type_params(count: usize) -> Vec<SmolStr> {
    match count {
        0 => Vec::new(),
        1 => vec!["T".into()],
        n => (1..=n).map(|i| SmolStr::from(format!("T{i}"))).collect(),
    }
}

/// `single` for one parameter, `arg1..argN` otherwise.
fn invoke_parameter_names(count: usize, single: &str) -> Vec<SmolStr> {
    match count {
        0 => Vec::new(),
        1 => vec![single.into()],
        n => (1..=n).map(|i| SmolStr::from(format!("arg{i}"))).collect(),
    }
}

fn generic_type(
    index: &mut SemanticIndex,
    ns: NamespaceId,
    name: &str,
    kind: TypeKind,
    params: &[&str],
) -> TypeId {
    let mut data = TypeData::new(name, kind, Container::Namespace(ns));
    data.type_params = params.iter().map(|p| SmolStr::from(*p)).collect();
    index.alloc_type(data)
}

/// A delegate whose invoke parameters take the delegate's type parameters in order.
fn delegate(
    index: &mut SemanticIndex,
    ns: NamespaceId,
    name: &str,
    type_params: &[SmolStr],
    param_names: &[SmolStr],
    return_ty: impl FnOnce(TypeId) -> Ty,
) -> TypeId {
    let mut data = TypeData::new(name, TypeKind::Delegate, Container::Namespace(ns));
    data.type_params = type_params.to_vec();
    let id = index.alloc_type(data);
    let mut invoke = MethodData::new("Invoke", MethodKind::DelegateInvoke, id);
    invoke.params = param_names
        .iter()
        .zip(type_params)
        .enumerate()
        .map(|(i, (param, tp))| {
            ParameterData::new(param.clone(), type_param(TypeParamOwner::Type(id), i, tp))
        })
        .collect();
    invoke.return_ty = return_ty(id);
    index.alloc_method(invoke);
    id
}

fn register_comparison(index: &mut SemanticIndex, system: NamespaceId, int: &Ty) {
    let mut data = TypeData::new("Comparison", TypeKind::Delegate, Container::Namespace(system));
    data.type_params = vec!["T".into()];
    let id = index.alloc_type(data);
    let t = type_param(TypeParamOwner::Type(id), 0, "T");
    let mut invoke = MethodData::new("Invoke", MethodKind::DelegateInvoke, id);
    invoke.params = vec![
        ParameterData::new("x", t.clone()),
        ParameterData::new("y", t),
    ];
    invoke.return_ty = int.clone();
    index.alloc_method(invoke);
}

fn register_event_handler(index: &mut SemanticIndex, system: NamespaceId, object: &Ty) {
    let mut data = TypeData::new("EventHandler", TypeKind::Delegate, Container::Namespace(system));
    data.type_params = vec!["TEventArgs".into()];
    let id = index.alloc_type(data);
    let mut invoke = MethodData::new("Invoke", MethodKind::DelegateInvoke, id);
    invoke.params = vec![
        ParameterData::new("sender", object.clone()),
        ParameterData::new("e", type_param(TypeParamOwner::Type(id), 0, "TEventArgs")),
    ];
    index.alloc_method(invoke);
}

fn register_console(index: &mut SemanticIndex, system: NamespaceId, string: &Ty, object: &Ty, int: &Ty) {
    let mut data = TypeData::new("Console", TypeKind::Class, Container::Namespace(system));
    data.is_static = true;
    data.is_abstract = true;
    let console = index.alloc_type(data);
    method(index, console, "WriteLine", true, Vec::new(), Ty::Void);
    for ty in [string, object, int] {
        method(index, console, "WriteLine", true, vec![ParameterData::new("value", ty.clone())], Ty::Void);
    }
}

fn register_immutable_array(index: &mut SemanticIndex, global: NamespaceId, int: &Ty) {
    let immutable = index.ensure_namespace_path(global, "System.Collections.Immutable");

    let array = generic_type(index, immutable, "ImmutableArray", TypeKind::Struct, &["T"]);
    let t = type_param(TypeParamOwner::Type(array), 0, "T");
    let array_of_t = Ty::Named {
        def: array,
        args: vec![t.clone()],
    };
    index.alloc_field(FieldData {
        name: "Empty".into(),
        owner: array,
        ty: array_of_t.clone(),
        is_static: true,
        origin: None,
    });
    method(index, array, "Add", false, vec![ParameterData::new("item", t.clone())], array_of_t.clone());
    property(index, array, "Length", int.clone(), false);

    let mut factory = TypeData::new("ImmutableArray", TypeKind::Class, Container::Namespace(immutable));
    factory.is_static = true;
    factory.is_abstract = true;
    let factory = index.alloc_type(factory);
    generic_method(index, factory, "Create", |_| Vec::new(), array);
    generic_method(
        index,
        factory,
        "Create",
        |m| vec![ParameterData::new("item", type_param(TypeParamOwner::Method(m), 0, "T"))],
        array,
    );
    generic_method(
        index,
        factory,
        "Create",
        |m| {
            let mut items = ParameterData::new(
                "items",
                Ty::Array {
                    element: Box::new(type_param(TypeParamOwner::Method(m), 0, "T")),
                    rank: 1,
                },
            );
            items.is_params = true;
            vec![items]
        },
        array,
    );
}

/// `static ImmutableArray<T> Name<T>(...)`.
fn generic_method(
    index: &mut SemanticIndex,
    owner: TypeId,
    name: &str,
    params: impl FnOnce(MethodId) -> Vec<ParameterData>,
    array: TypeId,
) -> MethodId {
    let mut data = MethodData::new(name, MethodKind::Ordinary, owner);
    data.is_static = true;
    data.type_params = vec!["T".into()];
    let id = index.alloc_method(data);
    let t = type_param(TypeParamOwner::Method(id), 0, "T");
    let method = index.method_mut(id);
    method.params = params(id);
    method.return_ty = Ty::Named {
        def: array,
        args: vec![t],
    };
    id
}

fn method(
    index: &mut SemanticIndex,
    owner: TypeId,
    name: &str,
    is_static: bool,
    params: Vec<ParameterData>,
    return_ty: Ty,
) -> MethodId {
    let mut data = MethodData::new(name, MethodKind::Ordinary, owner);
    data.is_static = is_static;
    data.params = params;
    data.return_ty = return_ty;
    index.alloc_method(data)
}

fn constructor(index: &mut SemanticIndex, owner: TypeId, params: Vec<ParameterData>) -> MethodId {
    let name = index.type_data(owner).name.clone();
    let mut data = MethodData::new(name, MethodKind::Constructor, owner);
    data.params = params;
    index.alloc_method(data)
}

fn property(index: &mut SemanticIndex, owner: TypeId, name: &str, ty: Ty, is_static: bool) {
    index.alloc_property(PropertyData {
        name: name.into(),
        owner,
        ty,
        is_static,
        origin: None,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn invoke_names(index: &SemanticIndex, name: &str, arity: usize) -> Vec<String> {
        let ty = index.type_by_path("System", name, arity).expect("builtin delegate");
        let invoke = index.type_data(ty).invoke.expect("invoke");
        index
            .method(invoke)
            .params
            .iter()
            .map(|p| p.name.to_string())
            .collect()
    }

    #[test]
    fn delegate_invoke_parameter_names_follow_the_framework() {
        let project = sable_workspace::Project::new();
        let index = SemanticIndex::build(&project);
        assert_eq!(invoke_names(&index, "Action", 1), vec!["obj"]);
        assert_eq!(invoke_names(&index, "Action", 3), vec!["arg1", "arg2", "arg3"]);
        assert_eq!(invoke_names(&index, "Func", 1), Vec::<String>::new());
        assert_eq!(invoke_names(&index, "Func", 2), vec!["arg"]);
        assert_eq!(invoke_names(&index, "Func", 3), vec!["arg1", "arg2"]);
        assert_eq!(invoke_names(&index, "Comparison", 1), vec!["x", "y"]);
        assert!(index.type_by_path("System", "Action", 16).is_some());
        assert!(index.type_by_path("System", "Action", 17).is_none());
        assert!(index.type_by_path("System", "Func", 17).is_some());
    }

    #[test]
    fn full_names_and_keywords() {
        let index = SemanticIndex::build(&sable_workspace::Project::new());
        let array = index
            .type_by_path("System.Collections.Immutable", "ImmutableArray", 1)
            .expect("ImmutableArray<T>");
        assert_eq!(index.full_name(array), "System.Collections.Immutable.ImmutableArray");
        let int = index
            .keyword_type(sable_syntax::SyntaxKind::IntKw)
            .expect("int");
        assert_eq!(
            index.display_qualified(&Ty::Named {
                def: array,
                args: vec![Ty::named(int)]
            }),
            "System.Collections.Immutable.ImmutableArray<int>"
        );
    }
}
