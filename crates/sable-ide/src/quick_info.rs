//! Hover text listing the cases of a closed class hierarchy.
//!
//! A "sum type" is an abstract class whose only constructor is private, so every subclass
//! is nested inside it:
//!
//! ```text
//! public abstract class Shape
//! {
//!     private Shape() { }
//!     public sealed class Square : Shape { }
//!     public sealed class Circle : Shape { }
//! }
//! ```

use sable_config::QuickInfoConfig;
use sable_core::{TextRange, TextSize};
use sable_hir::{Accessibility, SemanticIndex, SemanticModel, Symbol, Ty, TypeId, TypeKind};
use sable_syntax::ast::{self, AstNode};
use sable_syntax::{SyntaxKind, SyntaxNode};
use sable_workspace::{DocumentId, Project};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickInfo {
    pub message: String,
    pub range: TextRange,
}

/// Quick info at `offset`, from the providers `config` enables.
pub fn quick_info(
    project: &Project,
    document: DocumentId,
    offset: TextSize,
    config: &QuickInfoConfig,
) -> Option<QuickInfo> {
    if !config.sum_types {
        return None;
    }
    sum_type_quick_info(project, document, offset)
}

pub fn sum_type_quick_info(
    project: &Project,
    document: DocumentId,
    offset: TextSize,
) -> Option<QuickInfo> {
    let doc = project.document(document)?;
    let name = identifier_at(&doc.syntax(), offset)?;

    let index = SemanticIndex::build(project);
    let model = SemanticModel::new(&index, doc);
    let symbol = referenced_type(&model, &name)?;
    let cases = sum_type_cases(&index, symbol)?;

    tracing::trace!(target: "sable.ide", ty = %index.type_data(symbol).name, cases = cases.len(), "sum type quick info");
    Some(QuickInfo {
        message: format!("Sum type cases:\n{}", cases.join("\n")),
        range: name.syntax().text_range(),
    })
}

/// Names of the cases of `ty`, in declaration order. `None` when `ty` is not a sum type or
/// has no cases.
pub fn sum_type_cases(index: &SemanticIndex, ty: TypeId) -> Option<Vec<String>> {
    let data = index.type_data(ty);
    if data.kind != TypeKind::Class || !data.is_abstract {
        return None;
    }
    // No declared constructor means one implicit public constructor.
    let [constructor] = data.constructors.as_slice() else {
        return None;
    };
    if index.method(*constructor).accessibility != Accessibility::Private {
        return None;
    }
    let cases: Vec<String> = data
        .nested
        .iter()
        .copied()
        .filter(|&nested| {
            let case = index.type_data(nested);
            case.kind == TypeKind::Class
                && case.type_params.is_empty()
                && index.class_base(nested) == Some(ty)
        })
        .map(|nested| index.type_data(nested).name.to_string())
        .collect();
    (!cases.is_empty()).then_some(cases)
}

fn identifier_at(root: &SyntaxNode, offset: TextSize) -> Option<ast::IdentifierName> {
    let token = root.token_at_offset(offset).right_biased()?;
    let mut node = token.parent()?;
    while let Some(parent) = node.parent() {
        if parent.text_range() != node.text_range() || parent.kind() == SyntaxKind::CompilationUnit
        {
            break;
        }
        node = parent;
    }
    ast::IdentifierName::cast(node)
}

fn referenced_type(model: &SemanticModel<'_>, name: &ast::IdentifierName) -> Option<TypeId> {
    let ty = match ast::Expression::cast(name.syntax().clone())
        .and_then(|expr| model.symbol_of_expression(&expr))
    {
        Some(Symbol::Type(ty)) => ty,
        Some(_) => return None,
        None => model.resolve_type(&ast::Type::cast(name.syntax().clone())?),
    };
    match ty {
        Ty::Named { def, .. } => Some(def),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn implicit_constructor_is_public() {
        let project = Project::from_sources([(
            "A.cs",
            "abstract class Shape { class Square : Shape { } }",
        )])
        .expect("project");
        let index = SemanticIndex::build(&project);
        let shape = index.type_by_path("", "Shape", 0).expect("Shape");
        assert_eq!(sum_type_cases(&index, shape), None);
    }
}
