//! Recognizes `System.Action<...>` and `System.Func<...>` parameter types.

use sable_hir::{SemanticIndex, Ty, TypeKind};
use sable_syntax::ast;

use crate::names::parameter_name;

#[derive(Debug, Clone, PartialEq)]
pub struct DelegateParameter {
    pub name: String,
    pub ty: Ty,
}

/// Signature of a delegate-typed parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterShape {
    Action {
        parameters: Vec<DelegateParameter>,
    },
    Func {
        parameters: Vec<DelegateParameter>,
        return_type: Ty,
    },
}

impl ParameterShape {
    pub fn parameters(&self) -> &[DelegateParameter] {
        match self {
            ParameterShape::Action { parameters } | ParameterShape::Func { parameters, .. } => {
                parameters
            }
        }
    }

    /// `None` for the `Action` family.
    pub fn return_type(&self) -> Option<&Ty> {
        match self {
            ParameterShape::Action { .. } => None,
            ParameterShape::Func { return_type, .. } => Some(return_type),
        }
    }
}

/// Classify the parameter type `ty`, written as `written`.
///
/// Requires a constructed generic delegate written as a generic name (`Action<int>`, not
/// `System.Action<int>`) whose full name is `System.Action` or `System.Func`.
pub fn classify(index: &SemanticIndex, ty: &Ty, written: &ast::Type) -> Option<ParameterShape> {
    let Ty::Named { def, args } = ty else {
        return None;
    };
    if args.is_empty() {
        return None;
    }
    let ast::Type::Generic(generic) = written else {
        return None;
    };
    let data = index.type_data(*def);
    if data.kind != TypeKind::Delegate {
        return None;
    }
    let invoke = index.method(data.invoke?);
    let written_args: Vec<ast::Type> = generic
        .type_argument_list()
        .map(|list| list.arguments().collect())
        .unwrap_or_default();

    let parameter = |position: usize| -> Option<DelegateParameter> {
        let declared = invoke.params.get(position)?;
        Some(DelegateParameter {
            name: parameter_name(&written_args, position, &declared.name),
            ty: declared.ty.substitute_receiver(ty),
        })
    };

    match index.full_name(*def).as_str() {
        "System.Action" => {
            let parameters = (0..args.len()).map(parameter).collect::<Option<Vec<_>>>()?;
            Some(ParameterShape::Action { parameters })
        }
        "System.Func" => {
            let (return_type, inputs) = args.split_last()?;
            let parameters = (0..inputs.len()).map(parameter).collect::<Option<Vec<_>>>()?;
            Some(ParameterShape::Func {
                parameters,
                return_type: return_type.clone(),
            })
        }
        _ => None,
    }
}
