use std::collections::VecDeque;

#[cfg(test)]
use rowan::NodeOrToken;
use rowan::{Checkpoint, GreenNode, GreenNodeBuilder};
use text_size::{TextRange, TextSize};

use crate::lexer::{lex, Token};
use crate::syntax_kind::{CSharpLanguage, SyntaxKind};
use crate::ParseError;

pub type SyntaxNode = rowan::SyntaxNode<CSharpLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<CSharpLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<CSharpLanguage>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CSharpParseResult {
    pub green: GreenNode,
    pub errors: Vec<ParseError>,
}

impl CSharpParseResult {
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn covering_element(&self, range: TextRange) -> SyntaxElement {
        self.syntax().covering_element(range)
    }
}

pub fn parse_csharp(input: &str) -> CSharpParseResult {
    Parser::new(input).parse()
}

/// Parse `input` as a single type (`int`, `List<string>`, `global::A.B`).
///
/// Returns the green node of the type itself, without surrounding trivia.
pub fn parse_type_fragment(input: &str) -> Result<GreenNode, Vec<ParseError>> {
    Parser::new(input).parse_fragment(Parser::parse_type)
}

/// Parse `input` as a single expression.
pub fn parse_expression_fragment(input: &str) -> Result<GreenNode, Vec<ParseError>> {
    Parser::new(input).parse_fragment(|p| p.parse_expression(0))
}

/// Parse `input` as a single class member (method, field, delegate, ...).
pub fn parse_member_fragment(input: &str) -> Result<GreenNode, Vec<ParseError>> {
    Parser::new(input).parse_fragment(Parser::parse_class_member)
}

struct Parser<'a> {
    input: &'a str,
    tokens: VecDeque<Token>,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            tokens: VecDeque::from(lex(input)),
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn parse(mut self) -> CSharpParseResult {
        self.builder.start_node(SyntaxKind::CompilationUnit.into());
        self.parse_namespace_body(false);
        self.eat_trivia();
        self.builder.finish_node();

        CSharpParseResult {
            green: self.builder.finish(),
            errors: self.errors,
        }
    }

    fn parse_fragment(mut self, f: impl FnOnce(&mut Self)) -> Result<GreenNode, Vec<ParseError>> {
        self.builder.start_node(SyntaxKind::CompilationUnit.into());
        f(&mut self);
        if !self.at(SyntaxKind::Eof) {
            self.error_here("unexpected trailing input in fragment");
            self.recover_to(&[]);
        }
        self.eat_trivia();
        self.builder.finish_node();

        if !self.errors.is_empty() {
            return Err(self.errors);
        }
        let root = SyntaxNode::new_root(self.builder.finish());
        match root.first_child() {
            Some(node) => Ok(node.green().into_owned()),
            None => Err(vec![ParseError {
                message: "empty fragment".to_string(),
                range: TextRange::empty(TextSize::from(0)),
            }]),
        }
    }

    // --- Namespaces & usings ---

    /// Usings and members of a compilation unit or namespace block, up to `}` or EOF.
    fn parse_namespace_body(&mut self, in_block: bool) {
        loop {
            match self.current() {
                SyntaxKind::Eof => break,
                SyntaxKind::RBrace if in_block => break,
                SyntaxKind::UsingKw => self.parse_using_directive(),
                _ if self.at_member_start() => self.parse_namespace_member(),
                _ => self.recover_top_level(),
            }
        }
    }

    fn parse_using_directive(&mut self) {
        self.start(SyntaxKind::UsingDirective);
        self.expect(SyntaxKind::UsingKw, "expected `using`");
        if self.at(SyntaxKind::StaticKw) {
            self.bump();
        }
        if self.at(SyntaxKind::Identifier) && self.nth(1) == Some(SyntaxKind::Eq) {
            self.bump();
            self.bump();
            self.parse_type();
        } else {
            self.parse_type();
        }
        self.expect(SyntaxKind::Semicolon, "expected `;` after using directive");
        self.finish();
    }

    fn parse_namespace_member(&mut self) {
        let checkpoint = self.checkpoint();
        self.parse_attribute_lists();
        self.parse_modifiers();
        match self.current() {
            SyntaxKind::NamespaceKw => self.parse_namespace_decl(checkpoint),
            _ => self.parse_member_after_modifiers(checkpoint),
        }
    }

    fn parse_namespace_decl(&mut self, checkpoint: Checkpoint) {
        self.expect(SyntaxKind::NamespaceKw, "expected `namespace`");
        self.parse_name();
        if self.at(SyntaxKind::Semicolon) {
            self.builder
                .start_node_at(checkpoint, SyntaxKind::FileScopedNamespaceDeclaration.into());
            self.bump();
            self.parse_namespace_body(false);
            self.finish();
            return;
        }
        self.builder
            .start_node_at(checkpoint, SyntaxKind::NamespaceDeclaration.into());
        self.expect(SyntaxKind::LBrace, "expected `{` after namespace name");
        self.parse_namespace_body(true);
        self.expect(SyntaxKind::RBrace, "expected `}` to close namespace");
        if self.at(SyntaxKind::Semicolon) {
            self.bump();
        }
        self.finish();
    }

    // --- Type declarations & members ---

    fn parse_class_member(&mut self) {
        let checkpoint = self.checkpoint();
        self.parse_attribute_lists();
        self.parse_modifiers();
        self.parse_member_after_modifiers(checkpoint);
    }

    fn parse_member_after_modifiers(&mut self, checkpoint: Checkpoint) {
        match self.current() {
            SyntaxKind::ClassKw => self.parse_type_decl(checkpoint, SyntaxKind::ClassDeclaration),
            SyntaxKind::StructKw => self.parse_type_decl(checkpoint, SyntaxKind::StructDeclaration),
            SyntaxKind::InterfaceKw => {
                self.parse_type_decl(checkpoint, SyntaxKind::InterfaceDeclaration)
            }
            SyntaxKind::EnumKw => self.parse_enum_decl(checkpoint),
            SyntaxKind::DelegateKw => self.parse_delegate_decl(checkpoint),
            SyntaxKind::Identifier if self.nth(1) == Some(SyntaxKind::LParen) => {
                self.parse_constructor_decl(checkpoint)
            }
            _ if self.at_type_start() => self.parse_typed_member(checkpoint),
            _ => {
                self.builder.start_node_at(checkpoint, SyntaxKind::Error.into());
                self.error_here("expected member declaration");
                self.bump_any_non_trivia();
                self.recover_to_member_boundary();
                self.finish();
            }
        }
    }

    fn parse_type_decl(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
        self.bump();
        self.expect(SyntaxKind::Identifier, "expected type name");
        if self.at(SyntaxKind::Less) {
            self.parse_type_parameter_list();
        }
        if self.at(SyntaxKind::Colon) {
            self.parse_base_list();
        }
        self.parse_constraint_clauses();
        if self.expect(SyntaxKind::LBrace, "expected `{` to open type body") {
            while !matches!(self.current(), SyntaxKind::RBrace | SyntaxKind::Eof) {
                self.parse_class_member();
            }
            self.expect(SyntaxKind::RBrace, "expected `}` to close type body");
        }
        if self.at(SyntaxKind::Semicolon) {
            self.bump();
        }
        self.finish();
    }

    fn parse_enum_decl(&mut self, checkpoint: Checkpoint) {
        self.builder
            .start_node_at(checkpoint, SyntaxKind::EnumDeclaration.into());
        self.bump();
        self.expect(SyntaxKind::Identifier, "expected enum name");
        if self.at(SyntaxKind::Colon) {
            self.parse_base_list();
        }
        if self.expect(SyntaxKind::LBrace, "expected `{` to open enum body") {
            while self.at(SyntaxKind::Identifier) || self.at(SyntaxKind::LBracket) {
                self.start(SyntaxKind::EnumMemberDeclaration);
                self.parse_attribute_lists();
                self.expect(SyntaxKind::Identifier, "expected enum member name");
                if self.at(SyntaxKind::Eq) {
                    self.parse_equals_value_clause();
                }
                self.finish();
                if !self.eat(SyntaxKind::Comma) {
                    break;
                }
            }
            self.expect(SyntaxKind::RBrace, "expected `}` to close enum body");
        }
        if self.at(SyntaxKind::Semicolon) {
            self.bump();
        }
        self.finish();
    }

    fn parse_delegate_decl(&mut self, checkpoint: Checkpoint) {
        self.builder
            .start_node_at(checkpoint, SyntaxKind::DelegateDeclaration.into());
        self.bump();
        self.parse_type();
        self.expect(SyntaxKind::Identifier, "expected delegate name");
        if self.at(SyntaxKind::Less) {
            self.parse_type_parameter_list();
        }
        self.parse_parameter_list();
        self.parse_constraint_clauses();
        self.expect(SyntaxKind::Semicolon, "expected `;` after delegate declaration");
        self.finish();
    }

    fn parse_constructor_decl(&mut self, checkpoint: Checkpoint) {
        self.builder
            .start_node_at(checkpoint, SyntaxKind::ConstructorDeclaration.into());
        self.bump();
        self.parse_parameter_list();
        if self.at(SyntaxKind::Colon) {
            // `: base(...)` / `: this(...)`, kept as plain tokens plus the argument list.
            self.bump();
            if matches!(self.current(), SyntaxKind::BaseKw | SyntaxKind::ThisKw) {
                self.bump();
            } else {
                self.error_here("expected `base` or `this`");
            }
            if self.at(SyntaxKind::LParen) {
                self.parse_argument_list();
            }
        }
        self.parse_body_or_semicolon();
        self.finish();
    }

    /// Members starting with a type: methods, properties, fields.
    fn parse_typed_member(&mut self, checkpoint: Checkpoint) {
        let type_checkpoint = self.checkpoint();
        self.parse_type();

        let after_name = if self.at(SyntaxKind::Identifier) {
            self.nth(1)
        } else {
            None
        };
        match after_name {
            Some(SyntaxKind::LParen | SyntaxKind::Less) => {
                self.builder
                    .start_node_at(checkpoint, SyntaxKind::MethodDeclaration.into());
                self.bump();
                if self.at(SyntaxKind::Less) {
                    self.parse_type_parameter_list();
                }
                self.parse_parameter_list();
                self.parse_constraint_clauses();
                self.parse_body_or_semicolon();
                self.finish();
            }
            Some(SyntaxKind::LBrace | SyntaxKind::Arrow) => {
                self.builder
                    .start_node_at(checkpoint, SyntaxKind::PropertyDeclaration.into());
                self.bump();
                if self.at(SyntaxKind::Arrow) {
                    self.parse_arrow_expression_clause();
                    self.expect(SyntaxKind::Semicolon, "expected `;` after property");
                } else {
                    self.parse_accessor_list();
                    if self.at(SyntaxKind::Eq) {
                        self.parse_equals_value_clause();
                        self.expect(SyntaxKind::Semicolon, "expected `;` after initializer");
                    }
                }
                self.finish();
            }
            Some(_) => {
                self.builder
                    .start_node_at(checkpoint, SyntaxKind::FieldDeclaration.into());
                self.builder
                    .start_node_at(type_checkpoint, SyntaxKind::VariableDeclaration.into());
                self.parse_variable_declarators();
                self.finish();
                self.expect(SyntaxKind::Semicolon, "expected `;` after field declaration");
                self.finish();
            }
            None => {
                self.builder.start_node_at(checkpoint, SyntaxKind::Error.into());
                self.error_here("expected member name");
                self.recover_to_member_boundary();
                self.finish();
            }
        }
    }

    fn parse_body_or_semicolon(&mut self) {
        match self.current() {
            SyntaxKind::LBrace => self.parse_block(),
            SyntaxKind::Arrow => {
                self.parse_arrow_expression_clause();
                self.expect(SyntaxKind::Semicolon, "expected `;` after expression body");
            }
            _ => {
                self.expect(SyntaxKind::Semicolon, "expected body or `;`");
            }
        }
    }

    fn parse_arrow_expression_clause(&mut self) {
        self.start(SyntaxKind::ArrowExpressionClause);
        self.expect(SyntaxKind::Arrow, "expected `=>`");
        self.parse_expression(0);
        self.finish();
    }

    fn parse_equals_value_clause(&mut self) {
        self.start(SyntaxKind::EqualsValueClause);
        self.expect(SyntaxKind::Eq, "expected `=`");
        self.parse_expression(0);
        self.finish();
    }

    fn parse_accessor_list(&mut self) {
        self.start(SyntaxKind::AccessorList);
        self.expect(SyntaxKind::LBrace, "expected `{`");
        while !matches!(self.current(), SyntaxKind::RBrace | SyntaxKind::Eof) {
            self.start(SyntaxKind::AccessorDeclaration);
            self.parse_attribute_lists();
            self.parse_modifiers();
            if self.at(SyntaxKind::Identifier) {
                self.bump();
                self.parse_body_or_semicolon();
            } else {
                self.error_here("expected accessor");
                self.bump_any_non_trivia();
            }
            self.finish();
        }
        self.expect(SyntaxKind::RBrace, "expected `}` to close accessor list");
        self.finish();
    }

    fn parse_variable_declarators(&mut self) {
        loop {
            self.start(SyntaxKind::VariableDeclarator);
            self.expect(SyntaxKind::Identifier, "expected variable name");
            if self.at(SyntaxKind::LBracket) {
                self.parse_bracketed_argument_list();
            }
            if self.at(SyntaxKind::Eq) {
                self.parse_equals_value_clause();
            }
            self.finish();
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
    }

    fn parse_attribute_lists(&mut self) {
        while self.at(SyntaxKind::LBracket) {
            self.start(SyntaxKind::AttributeList);
            let mut depth = 0usize;
            loop {
                match self.current() {
                    SyntaxKind::Eof => break,
                    SyntaxKind::LBracket => depth += 1,
                    SyntaxKind::RBracket => {
                        depth -= 1;
                        if depth == 0 {
                            self.bump();
                            break;
                        }
                    }
                    _ => {}
                }
                self.bump();
            }
            self.finish();
        }
    }

    fn parse_modifiers(&mut self) {
        if !self.at_modifier() {
            return;
        }
        self.start(SyntaxKind::Modifiers);
        while self.at_modifier() {
            self.bump();
        }
        self.finish();
    }

    fn at_modifier(&mut self) -> bool {
        let kind = self.current();
        if kind.is_modifier() || kind == SyntaxKind::EventKw {
            // `new` in a member position is a modifier; `new(` never starts a member.
            return kind != SyntaxKind::NewKw || self.nth(1) != Some(SyntaxKind::LParen);
        }
        if kind == SyntaxKind::Identifier {
            let text = self.current_text();
            if matches!(text, "partial" | "async" | "required") {
                return self
                    .nth(1)
                    .map_or(false, |next| next == SyntaxKind::Identifier || next.is_keyword());
            }
        }
        false
    }

    fn parse_type_parameter_list(&mut self) {
        self.start(SyntaxKind::TypeParameterList);
        self.expect(SyntaxKind::Less, "expected `<`");
        loop {
            self.start(SyntaxKind::TypeParameter);
            self.parse_attribute_lists();
            if matches!(self.current(), SyntaxKind::InKw | SyntaxKind::OutKw) {
                self.bump();
            }
            self.expect(SyntaxKind::Identifier, "expected type parameter name");
            self.finish();
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        self.expect(SyntaxKind::Greater, "expected `>`");
        self.finish();
    }

    /// `where T : class, new()` clauses; constraints are kept as plain tokens.
    fn parse_constraint_clauses(&mut self) {
        while self.at_contextual("where") {
            self.start(SyntaxKind::TypeParameterConstraintClause);
            self.bump();
            self.expect(SyntaxKind::Identifier, "expected type parameter name");
            self.expect(SyntaxKind::Colon, "expected `:`");
            let mut depth = 0usize;
            loop {
                match self.current() {
                    SyntaxKind::Eof => break,
                    SyntaxKind::LBrace | SyntaxKind::Semicolon | SyntaxKind::Arrow
                        if depth == 0 =>
                    {
                        break
                    }
                    SyntaxKind::Identifier if depth == 0 && self.at_contextual("where") => break,
                    SyntaxKind::LParen | SyntaxKind::Less => depth += 1,
                    SyntaxKind::RParen | SyntaxKind::Greater => depth = depth.saturating_sub(1),
                    _ => {}
                }
                self.bump();
            }
            self.finish();
        }
    }

    fn parse_base_list(&mut self) {
        self.start(SyntaxKind::BaseList);
        self.expect(SyntaxKind::Colon, "expected `:`");
        loop {
            self.parse_type();
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        self.finish();
    }

    fn parse_parameter_list(&mut self) {
        self.start(SyntaxKind::ParameterList);
        if self.expect(SyntaxKind::LParen, "expected `(`") {
            while !matches!(self.current(), SyntaxKind::RParen | SyntaxKind::Eof) {
                self.parse_parameter(false);
                if !self.eat(SyntaxKind::Comma) {
                    break;
                }
            }
            self.expect(SyntaxKind::RParen, "expected `)`");
        }
        self.finish();
    }

    fn parse_parameter(&mut self, allow_implicit_type: bool) {
        self.start(SyntaxKind::Parameter);
        self.parse_attribute_lists();
        if matches!(
            self.current(),
            SyntaxKind::RefKw
                | SyntaxKind::OutKw
                | SyntaxKind::InKw
                | SyntaxKind::ParamsKw
                | SyntaxKind::ThisKw
        ) {
            self.start(SyntaxKind::Modifiers);
            while matches!(
                self.current(),
                SyntaxKind::RefKw
                    | SyntaxKind::OutKw
                    | SyntaxKind::InKw
                    | SyntaxKind::ParamsKw
                    | SyntaxKind::ThisKw
            ) {
                self.bump();
            }
            self.finish();
        }
        let implicit = allow_implicit_type
            && self.at(SyntaxKind::Identifier)
            && matches!(self.nth(1), Some(SyntaxKind::Comma | SyntaxKind::RParen));
        if !implicit {
            self.parse_type();
        }
        self.expect(SyntaxKind::Identifier, "expected parameter name");
        if self.at(SyntaxKind::Eq) {
            self.parse_equals_value_clause();
        }
        self.finish();
    }

    // --- Names & types ---

    /// A namespace name: `A`, `A.B`, `global::A.B`.
    fn parse_name(&mut self) {
        self.parse_name_or_type(false);
    }

    fn parse_type(&mut self) {
        let checkpoint = self.checkpoint();
        match self.current() {
            kind if kind.is_predefined_type() || kind == SyntaxKind::VoidKw => {
                self.start(SyntaxKind::PredefinedType);
                self.bump();
                self.finish();
            }
            SyntaxKind::Identifier => self.parse_name_or_type(true),
            _ => {
                self.error_here("expected type");
                return;
            }
        }
        loop {
            match self.current() {
                SyntaxKind::Question => {
                    self.builder
                        .start_node_at(checkpoint, SyntaxKind::NullableType.into());
                    self.bump();
                    self.finish();
                }
                SyntaxKind::LBracket
                    if matches!(self.nth(1), Some(SyntaxKind::RBracket | SyntaxKind::Comma)) =>
                {
                    self.builder
                        .start_node_at(checkpoint, SyntaxKind::ArrayType.into());
                    while self.at(SyntaxKind::LBracket) {
                        self.start(SyntaxKind::ArrayRankSpecifier);
                        self.bump();
                        while self.eat(SyntaxKind::Comma) {}
                        self.expect(SyntaxKind::RBracket, "expected `]`");
                        self.finish();
                    }
                    self.finish();
                }
                _ => break,
            }
        }
    }

    fn parse_name_or_type(&mut self, allow_generic: bool) {
        let checkpoint = self.checkpoint();
        if self.at(SyntaxKind::Identifier) && self.nth(1) == Some(SyntaxKind::ColonColon) {
            self.builder
                .start_node_at(checkpoint, SyntaxKind::AliasQualifiedName.into());
            self.start(SyntaxKind::IdentifierName);
            self.bump();
            self.finish();
            self.bump();
            self.parse_simple_name(allow_generic);
            self.finish();
        } else {
            self.parse_simple_name(allow_generic);
        }
        while self.at(SyntaxKind::Dot) && self.nth(1) == Some(SyntaxKind::Identifier) {
            self.builder
                .start_node_at(checkpoint, SyntaxKind::QualifiedName.into());
            self.bump();
            self.parse_simple_name(allow_generic);
            self.finish();
        }
    }

    fn parse_simple_name(&mut self, allow_generic: bool) {
        if allow_generic && self.at(SyntaxKind::Identifier) && self.nth(1) == Some(SyntaxKind::Less)
        {
            self.start(SyntaxKind::GenericName);
            self.bump();
            self.parse_type_argument_list();
            self.finish();
        } else {
            self.start(SyntaxKind::IdentifierName);
            self.expect(SyntaxKind::Identifier, "expected name");
            self.finish();
        }
    }

    fn parse_type_argument_list(&mut self) {
        self.start(SyntaxKind::TypeArgumentList);
        self.expect(SyntaxKind::Less, "expected `<`");
        while !matches!(self.current(), SyntaxKind::Greater | SyntaxKind::Eof) {
            if self.at(SyntaxKind::Comma) {
                // Unbound generic (`Func<,>`).
                self.bump();
                continue;
            }
            self.parse_type();
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        self.expect(SyntaxKind::Greater, "expected `>`");
        self.finish();
    }

    // --- Statements ---

    fn parse_block(&mut self) {
        self.start(SyntaxKind::Block);
        self.expect(SyntaxKind::LBrace, "expected `{`");
        while !matches!(self.current(), SyntaxKind::RBrace | SyntaxKind::Eof) {
            self.parse_statement();
        }
        self.expect(SyntaxKind::RBrace, "expected `}`");
        self.finish();
    }

    fn parse_statement(&mut self) {
        match self.current() {
            SyntaxKind::LBrace => self.parse_block(),
            SyntaxKind::Semicolon => {
                self.start(SyntaxKind::EmptyStatement);
                self.bump();
                self.finish();
            }
            SyntaxKind::ReturnKw => {
                self.start(SyntaxKind::ReturnStatement);
                self.bump();
                if !self.at(SyntaxKind::Semicolon) {
                    self.parse_expression(0);
                }
                self.expect(SyntaxKind::Semicolon, "expected `;` after return");
                self.finish();
            }
            SyntaxKind::ThrowKw => {
                self.start(SyntaxKind::ThrowStatement);
                self.bump();
                if !self.at(SyntaxKind::Semicolon) {
                    self.parse_expression(0);
                }
                self.expect(SyntaxKind::Semicolon, "expected `;` after throw");
                self.finish();
            }
            SyntaxKind::BreakKw | SyntaxKind::ContinueKw => {
                let kind = if self.at(SyntaxKind::BreakKw) {
                    SyntaxKind::BreakStatement
                } else {
                    SyntaxKind::ContinueStatement
                };
                self.start(kind);
                self.bump();
                self.expect(SyntaxKind::Semicolon, "expected `;`");
                self.finish();
            }
            SyntaxKind::IfKw => {
                self.start(SyntaxKind::IfStatement);
                self.bump();
                self.parse_parenthesized_condition();
                self.parse_embedded_statement();
                if self.at(SyntaxKind::ElseKw) {
                    self.start(SyntaxKind::ElseClause);
                    self.bump();
                    self.parse_embedded_statement();
                    self.finish();
                }
                self.finish();
            }
            SyntaxKind::WhileKw => {
                self.start(SyntaxKind::WhileStatement);
                self.bump();
                self.parse_parenthesized_condition();
                self.parse_embedded_statement();
                self.finish();
            }
            SyntaxKind::ForKw => self.parse_for_statement(),
            SyntaxKind::ForeachKw => self.parse_foreach_statement(),
            SyntaxKind::ConstKw => {
                self.start(SyntaxKind::LocalDeclarationStatement);
                self.start(SyntaxKind::Modifiers);
                self.bump();
                self.finish();
                self.parse_variable_declaration();
                self.expect(SyntaxKind::Semicolon, "expected `;`");
                self.finish();
            }
            _ if self.at_local_declaration_start() => {
                self.start(SyntaxKind::LocalDeclarationStatement);
                self.parse_variable_declaration();
                self.expect(SyntaxKind::Semicolon, "expected `;` after declaration");
                self.finish();
            }
            kind if can_start_expression(kind) => {
                self.start(SyntaxKind::ExpressionStatement);
                self.parse_expression(0);
                self.expect(SyntaxKind::Semicolon, "expected `;` after expression");
                self.finish();
            }
            _ => {
                self.start(SyntaxKind::Error);
                self.error_here("expected statement");
                self.bump_any_non_trivia();
                self.finish();
            }
        }
    }

    fn parse_embedded_statement(&mut self) {
        if matches!(self.current(), SyntaxKind::RBrace | SyntaxKind::Eof) {
            self.error_here("expected statement");
            return;
        }
        self.parse_statement();
    }

    fn parse_parenthesized_condition(&mut self) {
        self.expect(SyntaxKind::LParen, "expected `(`");
        self.parse_expression(0);
        self.expect(SyntaxKind::RParen, "expected `)`");
    }

    fn parse_variable_declaration(&mut self) {
        self.start(SyntaxKind::VariableDeclaration);
        self.parse_type();
        self.parse_variable_declarators();
        self.finish();
    }

    fn parse_for_statement(&mut self) {
        self.start(SyntaxKind::ForStatement);
        self.bump();
        self.expect(SyntaxKind::LParen, "expected `(`");
        if !self.at(SyntaxKind::Semicolon) {
            if self.at_local_declaration_start() {
                self.parse_variable_declaration();
            } else {
                self.parse_expression_list(SyntaxKind::Semicolon);
            }
        }
        self.expect(SyntaxKind::Semicolon, "expected `;`");
        if !self.at(SyntaxKind::Semicolon) {
            self.parse_expression(0);
        }
        self.expect(SyntaxKind::Semicolon, "expected `;`");
        if !self.at(SyntaxKind::RParen) {
            self.parse_expression_list(SyntaxKind::RParen);
        }
        self.expect(SyntaxKind::RParen, "expected `)`");
        self.parse_embedded_statement();
        self.finish();
    }

    fn parse_expression_list(&mut self, terminator: SyntaxKind) {
        loop {
            self.parse_expression(0);
            if self.at(terminator) || !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
    }

    fn parse_foreach_statement(&mut self) {
        self.start(SyntaxKind::ForEachStatement);
        self.bump();
        self.expect(SyntaxKind::LParen, "expected `(`");
        self.parse_type();
        self.expect(SyntaxKind::Identifier, "expected loop variable");
        self.expect(SyntaxKind::InKw, "expected `in`");
        self.parse_expression(0);
        self.expect(SyntaxKind::RParen, "expected `)`");
        self.parse_embedded_statement();
        self.finish();
    }

    /// `Type name` followed by `=`, `;`, `,` or `[` starts a local declaration.
    fn at_local_declaration_start(&mut self) -> bool {
        let start = skip_trivia(&self.tokens, 0);
        let Some(after_type) = scan_type(&self.tokens, start) else {
            return false;
        };
        let name = skip_trivia(&self.tokens, after_type);
        if self.tokens.get(name).map(|t| t.kind) != Some(SyntaxKind::Identifier) {
            return false;
        }
        let follow = skip_trivia(&self.tokens, name + 1);
        matches!(
            self.tokens.get(follow).map(|t| t.kind),
            Some(SyntaxKind::Eq | SyntaxKind::Semicolon | SyntaxKind::Comma | SyntaxKind::InKw)
        )
    }

    // --- Expressions ---

    fn parse_expression(&mut self, min_bp: u8) {
        let checkpoint = self.checkpoint();
        if !self.parse_unary() {
            return;
        }

        loop {
            let op = self.current();
            if op == SyntaxKind::Question {
                // conditional `a ? b : c`
                if CONDITIONAL_BP < min_bp {
                    break;
                }
                self.builder
                    .start_node_at(checkpoint, SyntaxKind::ConditionalExpression.into());
                self.bump();
                self.parse_expression(0);
                self.expect(SyntaxKind::Colon, "expected `:` in conditional expression");
                self.parse_expression(CONDITIONAL_BP);
                self.finish();
                continue;
            }
            if matches!(op, SyntaxKind::IsKw | SyntaxKind::AsKw) {
                if RELATIONAL_BP < min_bp {
                    break;
                }
                let kind = if op == SyntaxKind::IsKw {
                    SyntaxKind::IsExpression
                } else {
                    SyntaxKind::AsExpression
                };
                self.builder.start_node_at(checkpoint, kind.into());
                self.bump();
                if op == SyntaxKind::IsKw && !self.at_type_start() {
                    self.parse_expression(RELATIONAL_BP + 1);
                } else {
                    self.parse_type();
                    if op == SyntaxKind::IsKw && self.at(SyntaxKind::Identifier) {
                        // `x is Foo f`
                        self.bump();
                    }
                }
                self.finish();
                continue;
            }

            let shift = self.at_shift_right();
            let Some((l_bp, r_bp, kind)) = (match shift {
                Some(SyntaxKind::GreaterEq) => Some((ASSIGN_BP, ASSIGN_BP, SyntaxKind::AssignmentExpression)),
                Some(_) => Some((SHIFT_BP, SHIFT_BP + 1, SyntaxKind::BinaryExpression)),
                None => infix_binding_power(op),
            }) else {
                break;
            };
            if l_bp < min_bp {
                break;
            }

            self.builder.start_node_at(checkpoint, kind.into());
            self.bump();
            if shift.is_some() {
                self.bump_any();
            }
            self.parse_expression(r_bp);
            self.finish();
        }
    }

    /// `>>` and `>>=` arrive as adjacent `>` `>` / `>` `>=` tokens.
    fn at_shift_right(&mut self) -> Option<SyntaxKind> {
        let first = skip_trivia(&self.tokens, 0);
        let a = self.tokens.get(first)?;
        let b = self.tokens.get(first + 1)?;
        if a.kind == SyntaxKind::Greater
            && matches!(b.kind, SyntaxKind::Greater | SyntaxKind::GreaterEq)
            && a.range.end() == b.range.start()
        {
            return Some(b.kind);
        }
        None
    }

    /// Returns `false` when no expression could be parsed (an error has been recorded).
    fn parse_unary(&mut self) -> bool {
        match self.current() {
            SyntaxKind::Plus
            | SyntaxKind::Minus
            | SyntaxKind::Bang
            | SyntaxKind::Tilde
            | SyntaxKind::PlusPlus
            | SyntaxKind::MinusMinus
            | SyntaxKind::Amp
            | SyntaxKind::Star
            | SyntaxKind::ThrowKw => {
                self.start(SyntaxKind::PrefixUnaryExpression);
                self.bump();
                self.parse_unary();
                self.finish();
                true
            }
            SyntaxKind::Identifier
                if self.at_contextual("await")
                    && self.nth(1).map_or(false, |k| {
                        can_start_expression(k) && infix_binding_power(k).is_none()
                    }) =>
            {
                self.start(SyntaxKind::PrefixUnaryExpression);
                self.bump();
                self.parse_unary();
                self.finish();
                true
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> bool {
        let checkpoint = self.checkpoint();
        if !self.parse_primary() {
            return false;
        }
        loop {
            match self.current() {
                SyntaxKind::Dot | SyntaxKind::QuestionDot => {
                    self.builder
                        .start_node_at(checkpoint, SyntaxKind::MemberAccessExpression.into());
                    self.bump();
                    if self.at(SyntaxKind::Identifier) {
                        self.parse_expression_name();
                    } else {
                        self.error_here("expected member name");
                    }
                    self.finish();
                }
                SyntaxKind::LParen => {
                    self.builder
                        .start_node_at(checkpoint, SyntaxKind::InvocationExpression.into());
                    self.parse_argument_list();
                    self.finish();
                }
                SyntaxKind::LBracket => {
                    self.builder
                        .start_node_at(checkpoint, SyntaxKind::ElementAccessExpression.into());
                    self.parse_bracketed_argument_list();
                    self.finish();
                }
                SyntaxKind::PlusPlus | SyntaxKind::MinusMinus => {
                    self.builder
                        .start_node_at(checkpoint, SyntaxKind::PostfixUnaryExpression.into());
                    self.bump();
                    self.finish();
                }
                SyntaxKind::Bang
                    if !matches!(self.nth(1), Some(SyntaxKind::Eq | SyntaxKind::EqEq)) =>
                {
                    // null-forgiving `x!`
                    self.builder
                        .start_node_at(checkpoint, SyntaxKind::PostfixUnaryExpression.into());
                    self.bump();
                    self.finish();
                }
                _ => break,
            }
        }
        true
    }

    fn parse_primary(&mut self) -> bool {
        match self.current() {
            SyntaxKind::IntLiteral
            | SyntaxKind::RealLiteral
            | SyntaxKind::CharLiteral
            | SyntaxKind::StringLiteral
            | SyntaxKind::TrueKw
            | SyntaxKind::FalseKw
            | SyntaxKind::NullKw => {
                self.start(SyntaxKind::LiteralExpression);
                self.bump();
                self.finish();
            }
            SyntaxKind::ThisKw => {
                self.start(SyntaxKind::ThisExpression);
                self.bump();
                self.finish();
            }
            SyntaxKind::BaseKw => {
                self.start(SyntaxKind::BaseExpression);
                self.bump();
                self.finish();
            }
            SyntaxKind::TypeofKw => {
                self.start(SyntaxKind::TypeOfExpression);
                self.bump();
                self.expect(SyntaxKind::LParen, "expected `(`");
                self.parse_type();
                self.expect(SyntaxKind::RParen, "expected `)`");
                self.finish();
            }
            SyntaxKind::DefaultKw => {
                self.start(SyntaxKind::DefaultExpression);
                self.bump();
                if self.at(SyntaxKind::LParen) {
                    self.bump();
                    self.parse_type();
                    self.expect(SyntaxKind::RParen, "expected `)`");
                }
                self.finish();
            }
            SyntaxKind::NewKw => self.parse_object_creation(),
            SyntaxKind::LParen => {
                if self.is_lambda_paren(0) {
                    self.parse_parenthesized_lambda(false);
                } else if self.is_cast_expression() {
                    self.start(SyntaxKind::CastExpression);
                    self.bump();
                    self.parse_type();
                    self.expect(SyntaxKind::RParen, "expected `)`");
                    self.parse_unary();
                    self.finish();
                } else {
                    self.start(SyntaxKind::ParenthesizedExpression);
                    self.bump();
                    self.parse_expression(0);
                    self.expect(SyntaxKind::RParen, "expected `)`");
                    self.finish();
                }
            }
            SyntaxKind::Identifier
                if self.at_contextual("async")
                    && self.nth(1) == Some(SyntaxKind::LParen)
                    && self.is_lambda_paren(1) =>
            {
                self.parse_parenthesized_lambda(true);
            }
            SyntaxKind::Identifier
                if self.at_contextual("async")
                    && self.nth(1) == Some(SyntaxKind::Identifier)
                    && self.nth(2) == Some(SyntaxKind::Arrow) =>
            {
                self.parse_simple_lambda(true);
            }
            SyntaxKind::Identifier if self.nth(1) == Some(SyntaxKind::Arrow) => {
                self.parse_simple_lambda(false);
            }
            SyntaxKind::Identifier => {
                if self.nth(1) == Some(SyntaxKind::ColonColon) {
                    self.parse_alias_qualified_expression();
                } else {
                    self.parse_expression_name();
                }
            }
            kind if kind.is_predefined_type() => {
                self.start(SyntaxKind::PredefinedType);
                self.bump();
                self.finish();
            }
            _ => {
                self.error_here("expected expression");
                return false;
            }
        }
        true
    }

    /// A simple name in expression position; `<` starts type arguments only when the
    /// token after the matching `>` can follow a generic name.
    fn parse_expression_name(&mut self) {
        let start = skip_trivia(&self.tokens, 0);
        let generic = self.nth(1) == Some(SyntaxKind::Less)
            && is_generic_name_in_expression(&self.tokens, start);
        self.parse_simple_name(generic);
    }

    /// `global::System` in expression position; further `.x` segments are member accesses.
    fn parse_alias_qualified_expression(&mut self) {
        self.start(SyntaxKind::AliasQualifiedName);
        self.start(SyntaxKind::IdentifierName);
        self.bump();
        self.finish();
        self.bump();
        if self.at(SyntaxKind::Identifier) {
            self.parse_expression_name();
        } else {
            self.error_here("expected name after `::`");
        }
        self.finish();
    }

    fn parse_simple_lambda(&mut self, is_async: bool) {
        self.start(SyntaxKind::SimpleLambdaExpression);
        if is_async {
            self.bump();
        }
        self.start(SyntaxKind::Parameter);
        self.bump();
        self.finish();
        self.parse_lambda_body();
        self.finish();
    }

    fn parse_parenthesized_lambda(&mut self, is_async: bool) {
        self.start(SyntaxKind::ParenthesizedLambdaExpression);
        if is_async {
            self.bump();
        }
        self.start(SyntaxKind::ParameterList);
        self.bump();
        while !matches!(self.current(), SyntaxKind::RParen | SyntaxKind::Eof) {
            self.parse_parameter(true);
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        self.expect(SyntaxKind::RParen, "expected `)`");
        self.finish();
        self.parse_lambda_body();
        self.finish();
    }

    fn parse_lambda_body(&mut self) {
        self.expect(SyntaxKind::Arrow, "expected `=>`");
        if self.at(SyntaxKind::LBrace) {
            self.parse_block();
        } else {
            self.parse_expression(0);
        }
    }

    fn parse_object_creation(&mut self) {
        self.start(SyntaxKind::ObjectCreationExpression);
        self.bump();
        if self.at_type_start() {
            self.parse_non_array_type_for_creation();
        }
        while self.at(SyntaxKind::LBracket) {
            self.start(SyntaxKind::ArrayRankSpecifier);
            self.bump();
            while !matches!(self.current(), SyntaxKind::RBracket | SyntaxKind::Eof) {
                if !self.at(SyntaxKind::Comma) {
                    self.parse_expression(0);
                }
                if !self.eat(SyntaxKind::Comma) {
                    break;
                }
            }
            self.expect(SyntaxKind::RBracket, "expected `]`");
            self.finish();
        }
        if self.at(SyntaxKind::LParen) {
            self.parse_argument_list();
        }
        if self.at(SyntaxKind::LBrace) {
            self.parse_initializer();
        }
        self.finish();
    }

    /// Like [`Parser::parse_type`] but leaves `[...]` to the creation expression.
    fn parse_non_array_type_for_creation(&mut self) {
        let checkpoint = self.checkpoint();
        if self.current().is_predefined_type() {
            self.start(SyntaxKind::PredefinedType);
            self.bump();
            self.finish();
        } else {
            self.parse_name_or_type(true);
        }
        if self.at(SyntaxKind::Question) {
            self.builder
                .start_node_at(checkpoint, SyntaxKind::NullableType.into());
            self.bump();
            self.finish();
        }
    }

    fn parse_initializer(&mut self) {
        self.start(SyntaxKind::InitializerExpression);
        self.expect(SyntaxKind::LBrace, "expected `{`");
        while !matches!(self.current(), SyntaxKind::RBrace | SyntaxKind::Eof) {
            if self.at(SyntaxKind::LBrace) {
                self.parse_initializer();
            } else {
                self.parse_expression(0);
            }
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        self.expect(SyntaxKind::RBrace, "expected `}`");
        self.finish();
    }

    fn parse_argument_list(&mut self) {
        self.start(SyntaxKind::ArgumentList);
        self.expect(SyntaxKind::LParen, "expected `(`");
        while !matches!(self.current(), SyntaxKind::RParen | SyntaxKind::Eof) {
            self.parse_argument();
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        self.expect(SyntaxKind::RParen, "expected `)`");
        self.finish();
    }

    fn parse_bracketed_argument_list(&mut self) {
        self.start(SyntaxKind::BracketedArgumentList);
        self.expect(SyntaxKind::LBracket, "expected `[`");
        while !matches!(self.current(), SyntaxKind::RBracket | SyntaxKind::Eof) {
            self.parse_argument();
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        self.expect(SyntaxKind::RBracket, "expected `]`");
        self.finish();
    }

    fn parse_argument(&mut self) {
        self.start(SyntaxKind::Argument);
        if self.at(SyntaxKind::Identifier) && self.nth(1) == Some(SyntaxKind::Colon) {
            self.start(SyntaxKind::NameColon);
            self.start(SyntaxKind::IdentifierName);
            self.bump();
            self.finish();
            self.bump();
            self.finish();
        }
        if matches!(
            self.current(),
            SyntaxKind::RefKw | SyntaxKind::OutKw | SyntaxKind::InKw
        ) {
            let is_out = self.at(SyntaxKind::OutKw);
            self.bump();
            if is_out && self.at_local_declaration_start_in_argument() {
                // `out var x`
                self.parse_type();
                self.bump();
                self.finish();
                return;
            }
        }
        self.parse_expression(0);
        self.finish();
    }

    fn at_local_declaration_start_in_argument(&mut self) -> bool {
        let start = skip_trivia(&self.tokens, 0);
        let Some(after_type) = scan_type(&self.tokens, start) else {
            return false;
        };
        let name = skip_trivia(&self.tokens, after_type);
        if self.tokens.get(name).map(|t| t.kind) != Some(SyntaxKind::Identifier) {
            return false;
        }
        let follow = skip_trivia(&self.tokens, name + 1);
        matches!(
            self.tokens.get(follow).map(|t| t.kind),
            Some(SyntaxKind::Comma | SyntaxKind::RParen)
        )
    }

    /// Whether the `n`th non-trivia token is a `(` whose matching `)` is followed by `=>`.
    fn is_lambda_paren(&mut self, n: usize) -> bool {
        let mut open = skip_trivia(&self.tokens, 0);
        for _ in 0..n {
            open = skip_trivia(&self.tokens, open + 1);
        }
        let after = skip_balanced(&self.tokens, open, SyntaxKind::LParen, SyntaxKind::RParen);
        let next = skip_trivia(&self.tokens, after);
        self.tokens.get(next).map(|t| t.kind) == Some(SyntaxKind::Arrow)
    }

    fn is_cast_expression(&mut self) -> bool {
        let open = skip_trivia(&self.tokens, 0);
        let ty_start = skip_trivia(&self.tokens, open + 1);
        let Some(after_type) = scan_type(&self.tokens, ty_start) else {
            return false;
        };
        let close = skip_trivia(&self.tokens, after_type);
        if self.tokens.get(close).map(|t| t.kind) != Some(SyntaxKind::RParen) {
            return false;
        }
        let first = self.tokens[ty_start].kind;
        let single_predefined = first.is_predefined_type() && after_type == ty_start + 1;
        let next = skip_trivia(&self.tokens, close + 1);
        let Some(next_kind) = self.tokens.get(next).map(|t| t.kind) else {
            return false;
        };
        if single_predefined {
            return (can_start_expression(next_kind) && infix_binding_power(next_kind).is_none())
                || matches!(next_kind, SyntaxKind::Minus | SyntaxKind::Plus);
        }
        matches!(
            next_kind,
            SyntaxKind::Identifier
                | SyntaxKind::IntLiteral
                | SyntaxKind::RealLiteral
                | SyntaxKind::CharLiteral
                | SyntaxKind::StringLiteral
                | SyntaxKind::TrueKw
                | SyntaxKind::FalseKw
                | SyntaxKind::NullKw
                | SyntaxKind::ThisKw
                | SyntaxKind::BaseKw
                | SyntaxKind::NewKw
                | SyntaxKind::TypeofKw
                | SyntaxKind::DefaultKw
                | SyntaxKind::Bang
                | SyntaxKind::Tilde
        ) || next_kind.is_predefined_type()
    }

    // --- Recovery ---

    fn recover_top_level(&mut self) {
        self.start(SyntaxKind::Error);
        self.error_here("unexpected token at namespace level");
        self.bump_any_non_trivia();
        self.recover_to(&[
            SyntaxKind::UsingKw,
            SyntaxKind::NamespaceKw,
            SyntaxKind::ClassKw,
            SyntaxKind::StructKw,
            SyntaxKind::InterfaceKw,
            SyntaxKind::EnumKw,
            SyntaxKind::DelegateKw,
            SyntaxKind::PublicKw,
            SyntaxKind::InternalKw,
            SyntaxKind::LBracket,
        ]);
        self.finish();
    }

    /// Skips the rest of an unsupported member (indexer, operator, destructor, ...). A
    /// `{ ... }` body is skipped as a whole so its `;` and `}` do not end the type body.
    fn recover_to_member_boundary(&mut self) {
        loop {
            match self.current() {
                SyntaxKind::Eof | SyntaxKind::RBrace => break,
                SyntaxKind::Semicolon => {
                    self.bump();
                    break;
                }
                SyntaxKind::LBrace => {
                    let mut depth = 0usize;
                    loop {
                        match self.current() {
                            SyntaxKind::Eof => break,
                            SyntaxKind::LBrace => depth += 1,
                            SyntaxKind::RBrace => depth -= 1,
                            _ => {}
                        }
                        self.bump();
                        if depth == 0 {
                            break;
                        }
                    }
                    // `=> expr;` or `= init;` may follow an accessor block.
                    if !self.at(SyntaxKind::Eq) {
                        break;
                    }
                }
                kind if kind.is_modifier() => break,
                SyntaxKind::ClassKw
                | SyntaxKind::StructKw
                | SyntaxKind::InterfaceKw
                | SyntaxKind::EnumKw
                | SyntaxKind::DelegateKw => break,
                _ => self.bump(),
            }
        }
    }

    fn recover_to(&mut self, recovery: &[SyntaxKind]) {
        while !self.at(SyntaxKind::Eof) {
            if recovery.contains(&self.current()) {
                break;
            }
            self.bump();
        }
    }

    // --- Token helpers ---

    fn at_member_start(&mut self) -> bool {
        let kind = self.current();
        matches!(
            kind,
            SyntaxKind::NamespaceKw
                | SyntaxKind::ClassKw
                | SyntaxKind::StructKw
                | SyntaxKind::InterfaceKw
                | SyntaxKind::EnumKw
                | SyntaxKind::DelegateKw
                | SyntaxKind::LBracket
        ) || self.at_modifier()
    }

    fn at_type_start(&mut self) -> bool {
        let kind = self.current();
        kind == SyntaxKind::Identifier || kind.is_predefined_type() || kind == SyntaxKind::VoidKw
    }

    fn at_contextual(&mut self, text: &str) -> bool {
        self.at(SyntaxKind::Identifier) && self.current_text() == text
    }

    fn current_text(&mut self) -> &'a str {
        let idx = skip_trivia(&self.tokens, 0);
        match self.tokens.get(idx) {
            Some(tok) => tok.text(self.input),
            None => "",
        }
    }

    fn current(&mut self) -> SyntaxKind {
        let idx = skip_trivia(&self.tokens, 0);
        self.tokens.get(idx).map_or(SyntaxKind::Eof, |t| t.kind)
    }

    fn nth(&mut self, n: usize) -> Option<SyntaxKind> {
        let mut idx = skip_trivia(&self.tokens, 0);
        for _ in 0..n {
            idx = skip_trivia(&self.tokens, idx + 1);
        }
        self.tokens.get(idx).map(|t| t.kind)
    }

    fn at(&mut self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Trivia is flushed into whichever node is open when the next real token is consumed;
    /// nodes therefore always start at a non-trivia token.
    fn eat_trivia(&mut self) {
        while self.tokens.front().map_or(false, |t| t.kind.is_trivia()) {
            self.bump_any();
        }
    }

    fn start(&mut self, kind: SyntaxKind) {
        self.eat_trivia();
        self.builder.start_node(kind.into());
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.eat_trivia();
        self.builder.checkpoint()
    }

    fn finish(&mut self) {
        self.builder.finish_node();
    }

    fn bump(&mut self) {
        self.eat_trivia();
        if self.tokens.front().map(|t| t.kind) == Some(SyntaxKind::Eof) {
            return;
        }
        self.bump_any();
    }

    fn bump_any(&mut self) {
        if let Some(tok) = self.tokens.pop_front() {
            let text = tok.text(self.input);
            self.builder.token(tok.kind.into(), text);
        }
    }

    fn bump_any_non_trivia(&mut self) {
        if !self.at(SyntaxKind::Eof) {
            self.bump();
        }
    }

    fn expect(&mut self, kind: SyntaxKind, message: &str) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            self.error_here(message);
            false
        }
    }

    fn error_here(&mut self, message: &str) {
        let range = self.current_range();
        self.errors.push(ParseError {
            message: message.to_string(),
            range,
        });
    }

    fn current_range(&mut self) -> TextRange {
        let idx = skip_trivia(&self.tokens, 0);
        self.tokens.get(idx).map(|t| t.range).unwrap_or_else(|| {
            let end = TextSize::of(self.input);
            TextRange::empty(end)
        })
    }
}

const ASSIGN_BP: u8 = 1;
const CONDITIONAL_BP: u8 = 3;
const RELATIONAL_BP: u8 = 19;
const SHIFT_BP: u8 = 21;

fn skip_trivia(tokens: &VecDeque<Token>, mut idx: usize) -> usize {
    while tokens.get(idx).map_or(false, |t| t.kind.is_trivia()) {
        idx += 1;
    }
    idx
}

/// Assumes `tokens[idx]` is `open`; returns the index just past the matching `close`.
fn skip_balanced(tokens: &VecDeque<Token>, mut idx: usize, open: SyntaxKind, close: SyntaxKind) -> usize {
    let mut depth = 0usize;
    while let Some(tok) = tokens.get(idx) {
        match tok.kind {
            kind if kind == open => depth += 1,
            kind if kind == close => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return idx + 1;
                }
            }
            SyntaxKind::Eof => break,
            _ => {}
        }
        idx += 1;
    }
    idx
}

/// Token-level scan of a type starting at `idx` (a non-trivia token). Returns the index
/// just past the type, or `None` when the tokens cannot form a type.
fn scan_type(tokens: &VecDeque<Token>, idx: usize) -> Option<usize> {
    let first = tokens.get(idx)?;
    let mut end = if first.kind.is_predefined_type() {
        idx + 1
    } else if first.kind == SyntaxKind::Identifier {
        let mut end = scan_simple_name(tokens, idx)?;
        loop {
            let sep = skip_trivia(tokens, end);
            match tokens.get(sep).map(|t| t.kind) {
                Some(SyntaxKind::Dot | SyntaxKind::ColonColon) => {
                    let next = skip_trivia(tokens, sep + 1);
                    if tokens.get(next).map(|t| t.kind) != Some(SyntaxKind::Identifier) {
                        return None;
                    }
                    end = scan_simple_name(tokens, next)?;
                }
                _ => break,
            }
        }
        end
    } else {
        return None;
    };

    loop {
        let next = skip_trivia(tokens, end);
        match tokens.get(next).map(|t| t.kind) {
            Some(SyntaxKind::Question) => {
                // `T? x` but not `a ? b : c`: require a following identifier or `[`/`>`/`,`.
                let after = skip_trivia(tokens, next + 1);
                match tokens.get(after).map(|t| t.kind) {
                    Some(SyntaxKind::Identifier) => {
                        let follow = skip_trivia(tokens, after + 1);
                        if matches!(
                            tokens.get(follow).map(|t| t.kind),
                            Some(SyntaxKind::Colon)
                        ) {
                            return Some(end);
                        }
                        end = next + 1;
                    }
                    Some(
                        SyntaxKind::LBracket
                        | SyntaxKind::Greater
                        | SyntaxKind::Comma
                        | SyntaxKind::RParen,
                    ) => end = next + 1,
                    _ => return Some(end),
                }
            }
            Some(SyntaxKind::LBracket) => {
                let mut cursor = skip_trivia(tokens, next + 1);
                while tokens.get(cursor).map(|t| t.kind) == Some(SyntaxKind::Comma) {
                    cursor = skip_trivia(tokens, cursor + 1);
                }
                if tokens.get(cursor).map(|t| t.kind) != Some(SyntaxKind::RBracket) {
                    return Some(end);
                }
                end = cursor + 1;
            }
            _ => return Some(end),
        }
    }
}

fn scan_simple_name(tokens: &VecDeque<Token>, idx: usize) -> Option<usize> {
    let next = skip_trivia(tokens, idx + 1);
    if tokens.get(next).map(|t| t.kind) == Some(SyntaxKind::Less) {
        if let Some(end) = scan_type_argument_list(tokens, next) {
            return Some(end);
        }
    }
    Some(idx + 1)
}

/// Assumes `tokens[idx]` is `<`.
fn scan_type_argument_list(tokens: &VecDeque<Token>, idx: usize) -> Option<usize> {
    let mut cursor = skip_trivia(tokens, idx + 1);
    loop {
        match tokens.get(cursor).map(|t| t.kind) {
            Some(SyntaxKind::Comma) => {}
            Some(SyntaxKind::Greater) => return Some(cursor + 1),
            _ => {
                cursor = scan_type(tokens, cursor)?;
                cursor = skip_trivia(tokens, cursor);
                match tokens.get(cursor).map(|t| t.kind) {
                    Some(SyntaxKind::Greater) => return Some(cursor + 1),
                    Some(SyntaxKind::Comma) => {}
                    _ => return None,
                }
            }
        }
        cursor = skip_trivia(tokens, cursor + 1);
    }
}

/// `tokens[idx]` is an identifier followed by `<`. Decides whether `<` opens a type argument
/// list by looking at the token following the matching `>`.
fn is_generic_name_in_expression(tokens: &VecDeque<Token>, idx: usize) -> bool {
    let less = skip_trivia(tokens, idx + 1);
    let Some(end) = scan_type_argument_list(tokens, less) else {
        return false;
    };
    let follow = skip_trivia(tokens, end);
    match tokens.get(follow).map(|t| t.kind) {
        None => true,
        Some(kind) => matches!(
            kind,
            SyntaxKind::LParen
                | SyntaxKind::RParen
                | SyntaxKind::RBracket
                | SyntaxKind::RBrace
                | SyntaxKind::Colon
                | SyntaxKind::Semicolon
                | SyntaxKind::Comma
                | SyntaxKind::Dot
                | SyntaxKind::Question
                | SyntaxKind::EqEq
                | SyntaxKind::BangEq
                | SyntaxKind::Pipe
                | SyntaxKind::Caret
                | SyntaxKind::AmpAmp
                | SyntaxKind::PipePipe
                | SyntaxKind::Amp
                | SyntaxKind::LBracket
                | SyntaxKind::Eof
        ),
    }
}

fn can_start_expression(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::Identifier
            | SyntaxKind::IntLiteral
            | SyntaxKind::RealLiteral
            | SyntaxKind::CharLiteral
            | SyntaxKind::StringLiteral
            | SyntaxKind::TrueKw
            | SyntaxKind::FalseKw
            | SyntaxKind::NullKw
            | SyntaxKind::ThisKw
            | SyntaxKind::BaseKw
            | SyntaxKind::NewKw
            | SyntaxKind::TypeofKw
            | SyntaxKind::DefaultKw
            | SyntaxKind::ThrowKw
            | SyntaxKind::LParen
            | SyntaxKind::Plus
            | SyntaxKind::Minus
            | SyntaxKind::Bang
            | SyntaxKind::Tilde
            | SyntaxKind::PlusPlus
            | SyntaxKind::MinusMinus
    ) || kind.is_predefined_type()
}

fn infix_binding_power(op: SyntaxKind) -> Option<(u8, u8, SyntaxKind)> {
    // Returns (left_bp, right_bp, node_kind).
    // Larger = tighter binding.
    let (l, r, kind) = match op {
        SyntaxKind::Star | SyntaxKind::Slash | SyntaxKind::Percent => {
            (25, 26, SyntaxKind::BinaryExpression)
        }
        SyntaxKind::Plus | SyntaxKind::Minus => (23, 24, SyntaxKind::BinaryExpression),
        SyntaxKind::LeftShift => (SHIFT_BP, SHIFT_BP + 1, SyntaxKind::BinaryExpression),
        SyntaxKind::Less | SyntaxKind::LessEq | SyntaxKind::Greater | SyntaxKind::GreaterEq => {
            (RELATIONAL_BP, RELATIONAL_BP + 1, SyntaxKind::BinaryExpression)
        }
        SyntaxKind::EqEq | SyntaxKind::BangEq => (17, 18, SyntaxKind::BinaryExpression),
        SyntaxKind::Amp => (15, 16, SyntaxKind::BinaryExpression),
        SyntaxKind::Caret => (13, 14, SyntaxKind::BinaryExpression),
        SyntaxKind::Pipe => (11, 12, SyntaxKind::BinaryExpression),
        SyntaxKind::AmpAmp => (9, 10, SyntaxKind::BinaryExpression),
        SyntaxKind::PipePipe => (7, 8, SyntaxKind::BinaryExpression),
        // `??` is right-associative.
        SyntaxKind::QuestionQuestion => (5, 5, SyntaxKind::BinaryExpression),

        // Assignment (right-associative).
        SyntaxKind::Eq
        | SyntaxKind::PlusEq
        | SyntaxKind::MinusEq
        | SyntaxKind::StarEq
        | SyntaxKind::SlashEq
        | SyntaxKind::PercentEq
        | SyntaxKind::AmpEq
        | SyntaxKind::PipeEq
        | SyntaxKind::CaretEq
        | SyntaxKind::LeftShiftEq
        | SyntaxKind::QuestionQuestionEq => (ASSIGN_BP, ASSIGN_BP, SyntaxKind::AssignmentExpression),

        _ => return None,
    };
    Some((l, r, kind))
}

// --- debug helpers used by tests ---

#[cfg(test)]
pub fn debug_dump(node: &SyntaxNode) -> String {
    fn go(node: &SyntaxNode, indent: usize, out: &mut String) {
        use std::fmt::Write;
        let _ = writeln!(out, "{:indent$}{:?}", "", node.kind(), indent = indent);
        for child in node.children_with_tokens() {
            match child {
                NodeOrToken::Node(n) => go(&n, indent + 2, out),
                NodeOrToken::Token(t) => {
                    if t.kind().is_trivia() {
                        continue;
                    }
                    let _ = writeln!(
                        out,
                        "{:indent$}{:?} {:?}",
                        "",
                        t.kind(),
                        t.text(),
                        indent = indent + 2
                    );
                }
            }
        }
    }

    let mut out = String::new();
    go(node, 0, &mut out);
    out
}
