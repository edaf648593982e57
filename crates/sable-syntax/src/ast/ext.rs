use smol_str::SmolStr;

use super::support;
use crate::ast::AstNode;
use crate::{SyntaxKind, SyntaxNode, SyntaxToken};

/// Source text of a node with every trivia token removed (`List < int >` -> `List<int>`).
pub fn text_without_trivia(node: &SyntaxNode) -> String {
    let mut out = String::new();
    for tok in node
        .descendants_with_tokens()
        .filter_map(|el| el.into_token())
        .filter(|tok| !tok.kind().is_trivia())
    {
        out.push_str(tok.text());
    }
    out
}

fn token_text(token: Option<SyntaxToken>) -> Option<SmolStr> {
    token.map(|t| SmolStr::new(t.text()))
}

impl super::Type {
    pub fn text(&self) -> String {
        text_without_trivia(self.syntax())
    }
}

impl super::TypeDeclaration {
    pub fn name(&self) -> Option<SmolStr> {
        token_text(self.name_token())
    }

    pub fn has_modifier(&self, kind: SyntaxKind) -> bool {
        self.modifiers().map_or(false, |m| m.has(kind))
    }
}

impl super::MethodDeclaration {
    pub fn name(&self) -> Option<SmolStr> {
        token_text(self.name_token())
    }

    pub fn parameters(&self) -> impl Iterator<Item = super::Parameter> + '_ {
        self.parameter_list()
            .into_iter()
            .flat_map(|list| list.parameters().collect::<Vec<_>>())
    }

    pub fn has_modifier(&self, kind: SyntaxKind) -> bool {
        self.modifiers().map_or(false, |m| m.has(kind))
    }
}

impl super::ConstructorDeclaration {
    pub fn parameters(&self) -> impl Iterator<Item = super::Parameter> + '_ {
        self.parameter_list()
            .into_iter()
            .flat_map(|list| list.parameters().collect::<Vec<_>>())
    }
}

impl super::DelegateDeclaration {
    pub fn name(&self) -> Option<SmolStr> {
        token_text(self.name_token())
    }

    pub fn parameters(&self) -> impl Iterator<Item = super::Parameter> + '_ {
        self.parameter_list()
            .into_iter()
            .flat_map(|list| list.parameters().collect::<Vec<_>>())
    }
}

impl super::Parameter {
    pub fn name(&self) -> Option<SmolStr> {
        token_text(self.name_token())
    }
}

impl super::IdentifierName {
    pub fn text(&self) -> Option<SmolStr> {
        token_text(self.ident_token())
    }
}

impl super::GenericName {
    pub fn text(&self) -> Option<SmolStr> {
        token_text(self.ident_token())
    }

    pub fn arity(&self) -> usize {
        self.type_argument_list().map_or(0, |list| {
            let commas = list
                .syntax()
                .children_with_tokens()
                .filter(|el| el.kind() == SyntaxKind::Comma)
                .count();
            commas + 1
        })
    }
}

impl super::SimpleName {
    pub fn text(&self) -> Option<SmolStr> {
        token_text(self.ident_token())
    }
}

impl super::NamespaceDeclaration {
    pub fn is_file_scoped(&self) -> bool {
        self.syntax().kind() == SyntaxKind::FileScopedNamespaceDeclaration
    }
}

impl super::Argument {
    /// Name of a named argument (`name: value`).
    pub fn name(&self) -> Option<SmolStr> {
        self.name_colon()?.name()?.text()
    }
}

impl super::Expression {
    /// Strips redundant parentheses: `((x))` -> `x`.
    pub fn unparenthesized(self) -> super::Expression {
        let mut expr = self;
        while expr.syntax().kind() == SyntaxKind::ParenthesizedExpression {
            match support::child::<super::Expression>(expr.syntax()) {
                Some(inner) => expr = inner,
                None => break,
            }
        }
        expr
    }
}
