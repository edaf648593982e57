//! Builds the delegate declaration that replaces an `Action`/`Func` parameter type.

use rowan::GreenNode;
use sable_hir::{SemanticModel, Ty};
use sable_syntax::{make, SyntaxNode};

use crate::error::RefactorError;
use crate::shape::ParameterShape;

/// `write` -> `Write`.
pub fn delegate_name(parameter_name: &str) -> String {
    let mut chars = parameter_name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `public delegate <ret> <name>(<T1> <n1>, ...);` with types written as they would be
/// at `at`.
pub fn delegate_declaration(
    model: &SemanticModel<'_>,
    shape: &ParameterShape,
    name: &str,
    at: &SyntaxNode,
) -> Result<GreenNode, RefactorError> {
    let return_type = match shape.return_type() {
        Some(ty) => type_syntax(model, ty, at)?,
        None => make::void_type(),
    };
    let parameters = shape
        .parameters()
        .iter()
        .map(|p| Ok(make::parameter(type_syntax(model, &p.ty, at)?, &p.name)))
        .collect::<Result<Vec<_>, RefactorError>>()?;
    Ok(make::delegate_declaration(return_type, name, parameters))
}

pub fn type_syntax(
    model: &SemanticModel<'_>,
    ty: &Ty,
    at: &SyntaxNode,
) -> Result<GreenNode, RefactorError> {
    let text = model.display_type(ty, at);
    make::ty(&text).map_err(|_| RefactorError::Synthesis(text))
}
