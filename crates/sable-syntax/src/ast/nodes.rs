use crate::ast::{support, AstNode};
use crate::parser::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

macro_rules! ast_node {
    ($($(#[$meta:meta])* $name:ident => $($kind:ident)|+;)*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Eq, Hash)]
            pub struct $name {
                syntax: SyntaxNode,
            }

            impl AstNode for $name {
                fn can_cast(kind: SyntaxKind) -> bool {
                    matches!(kind, $(SyntaxKind::$kind)|+)
                }

                fn cast(syntax: SyntaxNode) -> Option<Self> {
                    Self::can_cast(syntax.kind()).then_some(Self { syntax })
                }

                fn syntax(&self) -> &SyntaxNode {
                    &self.syntax
                }
            }
        )*
    };
}

ast_node! {
    CompilationUnit => CompilationUnit;
    UsingDirective => UsingDirective;
    /// Block or file-scoped namespace.
    NamespaceDeclaration => NamespaceDeclaration | FileScopedNamespaceDeclaration;
    /// Class, struct or interface.
    TypeDeclaration => ClassDeclaration | StructDeclaration | InterfaceDeclaration;
    EnumDeclaration => EnumDeclaration;
    EnumMemberDeclaration => EnumMemberDeclaration;
    DelegateDeclaration => DelegateDeclaration;
    MethodDeclaration => MethodDeclaration;
    ConstructorDeclaration => ConstructorDeclaration;
    FieldDeclaration => FieldDeclaration;
    PropertyDeclaration => PropertyDeclaration;
    AccessorList => AccessorList;
    AccessorDeclaration => AccessorDeclaration;
    ArrowExpressionClause => ArrowExpressionClause;
    EqualsValueClause => EqualsValueClause;
    Modifiers => Modifiers;
    TypeParameterList => TypeParameterList;
    TypeParameter => TypeParameter;
    BaseList => BaseList;
    ParameterList => ParameterList;
    Parameter => Parameter;
    /// `( ... )` or `[ ... ]` arguments.
    ArgumentList => ArgumentList | BracketedArgumentList;
    Argument => Argument;
    NameColon => NameColon;

    PredefinedType => PredefinedType;
    IdentifierName => IdentifierName;
    GenericName => GenericName;
    TypeArgumentList => TypeArgumentList;
    QualifiedName => QualifiedName;
    AliasQualifiedName => AliasQualifiedName;
    ArrayType => ArrayType;
    NullableType => NullableType;

    Block => Block;
    LocalDeclarationStatement => LocalDeclarationStatement;
    VariableDeclaration => VariableDeclaration;
    VariableDeclarator => VariableDeclarator;
    ExpressionStatement => ExpressionStatement;
    ReturnStatement => ReturnStatement;
    ForEachStatement => ForEachStatement;

    LiteralExpression => LiteralExpression;
    MemberAccessExpression => MemberAccessExpression;
    InvocationExpression => InvocationExpression;
    ElementAccessExpression => ElementAccessExpression;
    ObjectCreationExpression => ObjectCreationExpression;
    /// `x => ...` or `(a, b) => ...`.
    LambdaExpression => SimpleLambdaExpression | ParenthesizedLambdaExpression;
    ParenthesizedExpression => ParenthesizedExpression;
    CastExpression => CastExpression;
    AssignmentExpression => AssignmentExpression;
    BinaryExpression => BinaryExpression;
    ConditionalExpression => ConditionalExpression;

    /// Any expression node.
    Expression => LiteralExpression
        | ThisExpression
        | BaseExpression
        | ParenthesizedExpression
        | MemberAccessExpression
        | InvocationExpression
        | ElementAccessExpression
        | ObjectCreationExpression
        | InitializerExpression
        | SimpleLambdaExpression
        | ParenthesizedLambdaExpression
        | PrefixUnaryExpression
        | PostfixUnaryExpression
        | BinaryExpression
        | IsExpression
        | AsExpression
        | ConditionalExpression
        | AssignmentExpression
        | CastExpression
        | TypeOfExpression
        | DefaultExpression
        | IdentifierName
        | GenericName
        | AliasQualifiedName
        | PredefinedType;
}

/// Written type syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Predefined(PredefinedType),
    Identifier(IdentifierName),
    Generic(GenericName),
    Qualified(QualifiedName),
    AliasQualified(AliasQualifiedName),
    Array(ArrayType),
    Nullable(NullableType),
}

impl AstNode for Type {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            SyntaxKind::PredefinedType
                | SyntaxKind::IdentifierName
                | SyntaxKind::GenericName
                | SyntaxKind::QualifiedName
                | SyntaxKind::AliasQualifiedName
                | SyntaxKind::ArrayType
                | SyntaxKind::NullableType
        )
    }

    fn cast(syntax: SyntaxNode) -> Option<Self> {
        Some(match syntax.kind() {
            SyntaxKind::PredefinedType => Type::Predefined(PredefinedType { syntax }),
            SyntaxKind::IdentifierName => Type::Identifier(IdentifierName { syntax }),
            SyntaxKind::GenericName => Type::Generic(GenericName { syntax }),
            SyntaxKind::QualifiedName => Type::Qualified(QualifiedName { syntax }),
            SyntaxKind::AliasQualifiedName => Type::AliasQualified(AliasQualifiedName { syntax }),
            SyntaxKind::ArrayType => Type::Array(ArrayType { syntax }),
            SyntaxKind::NullableType => Type::Nullable(NullableType { syntax }),
            _ => return None,
        })
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Type::Predefined(it) => it.syntax(),
            Type::Identifier(it) => it.syntax(),
            Type::Generic(it) => it.syntax(),
            Type::Qualified(it) => it.syntax(),
            Type::AliasQualified(it) => it.syntax(),
            Type::Array(it) => it.syntax(),
            Type::Nullable(it) => it.syntax(),
        }
    }
}

/// `Name` or `Name<...>`: the right-hand side of qualified names and member accesses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimpleName {
    Identifier(IdentifierName),
    Generic(GenericName),
}

impl AstNode for SimpleName {
    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(kind, SyntaxKind::IdentifierName | SyntaxKind::GenericName)
    }

    fn cast(syntax: SyntaxNode) -> Option<Self> {
        match syntax.kind() {
            SyntaxKind::IdentifierName => Some(SimpleName::Identifier(IdentifierName { syntax })),
            SyntaxKind::GenericName => Some(SimpleName::Generic(GenericName { syntax })),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            SimpleName::Identifier(it) => it.syntax(),
            SimpleName::Generic(it) => it.syntax(),
        }
    }
}

impl SimpleName {
    pub fn ident_token(&self) -> Option<SyntaxToken> {
        support::ident_token(self.syntax())
    }

    pub fn type_argument_list(&self) -> Option<TypeArgumentList> {
        match self {
            SimpleName::Identifier(_) => None,
            SimpleName::Generic(it) => it.type_argument_list(),
        }
    }
}

impl CompilationUnit {
    pub fn usings(&self) -> impl Iterator<Item = UsingDirective> + '_ {
        support::children(&self.syntax)
    }

    pub fn members(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.syntax.children().filter(|n| is_member_kind(n.kind()))
    }
}

impl UsingDirective {
    pub fn is_static(&self) -> bool {
        support::token(&self.syntax, SyntaxKind::StaticKw).is_some()
    }

    /// `X` in `using X = ...;`
    pub fn alias(&self) -> Option<SyntaxToken> {
        support::token(&self.syntax, SyntaxKind::Eq)?;
        support::ident_token(&self.syntax)
    }

    pub fn target(&self) -> Option<Type> {
        support::child(&self.syntax)
    }
}

impl NamespaceDeclaration {
    pub fn name(&self) -> Option<Type> {
        support::child(&self.syntax)
    }

    pub fn usings(&self) -> impl Iterator<Item = UsingDirective> + '_ {
        support::children(&self.syntax)
    }

    pub fn members(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.syntax.children().filter(|n| is_member_kind(n.kind()))
    }
}

impl TypeDeclaration {
    pub fn modifiers(&self) -> Option<Modifiers> {
        support::child(&self.syntax)
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        support::ident_token(&self.syntax)
    }

    pub fn type_parameter_list(&self) -> Option<TypeParameterList> {
        support::child(&self.syntax)
    }

    pub fn base_list(&self) -> Option<BaseList> {
        support::child(&self.syntax)
    }

    pub fn members(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.syntax.children().filter(|n| is_member_kind(n.kind()))
    }

    pub fn l_brace(&self) -> Option<SyntaxToken> {
        support::token(&self.syntax, SyntaxKind::LBrace)
    }
}

impl EnumDeclaration {
    pub fn modifiers(&self) -> Option<Modifiers> {
        support::child(&self.syntax)
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        support::ident_token(&self.syntax)
    }

    pub fn members(&self) -> impl Iterator<Item = EnumMemberDeclaration> + '_ {
        support::children(&self.syntax)
    }
}

impl EnumMemberDeclaration {
    pub fn name_token(&self) -> Option<SyntaxToken> {
        support::ident_token(&self.syntax)
    }
}

impl DelegateDeclaration {
    pub fn modifiers(&self) -> Option<Modifiers> {
        support::child(&self.syntax)
    }

    pub fn return_type(&self) -> Option<Type> {
        support::child(&self.syntax)
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        support::ident_token(&self.syntax)
    }

    pub fn type_parameter_list(&self) -> Option<TypeParameterList> {
        support::child(&self.syntax)
    }

    pub fn parameter_list(&self) -> Option<ParameterList> {
        support::child(&self.syntax)
    }
}

impl MethodDeclaration {
    pub fn modifiers(&self) -> Option<Modifiers> {
        support::child(&self.syntax)
    }

    pub fn return_type(&self) -> Option<Type> {
        support::child(&self.syntax)
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        support::ident_token(&self.syntax)
    }

    pub fn type_parameter_list(&self) -> Option<TypeParameterList> {
        support::child(&self.syntax)
    }

    pub fn parameter_list(&self) -> Option<ParameterList> {
        support::child(&self.syntax)
    }

    pub fn body(&self) -> Option<Block> {
        support::child(&self.syntax)
    }

    pub fn expression_body(&self) -> Option<ArrowExpressionClause> {
        support::child(&self.syntax)
    }
}

impl ConstructorDeclaration {
    pub fn modifiers(&self) -> Option<Modifiers> {
        support::child(&self.syntax)
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        support::ident_token(&self.syntax)
    }

    pub fn parameter_list(&self) -> Option<ParameterList> {
        support::child(&self.syntax)
    }

    pub fn initializer_arguments(&self) -> Option<ArgumentList> {
        support::child(&self.syntax)
    }

    pub fn body(&self) -> Option<Block> {
        support::child(&self.syntax)
    }

    pub fn expression_body(&self) -> Option<ArrowExpressionClause> {
        support::child(&self.syntax)
    }
}

impl FieldDeclaration {
    pub fn modifiers(&self) -> Option<Modifiers> {
        support::child(&self.syntax)
    }

    pub fn declaration(&self) -> Option<VariableDeclaration> {
        support::child(&self.syntax)
    }
}

impl PropertyDeclaration {
    pub fn modifiers(&self) -> Option<Modifiers> {
        support::child(&self.syntax)
    }

    pub fn ty(&self) -> Option<Type> {
        support::child(&self.syntax)
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        support::ident_token(&self.syntax)
    }

    pub fn accessor_list(&self) -> Option<AccessorList> {
        support::child(&self.syntax)
    }

    pub fn expression_body(&self) -> Option<ArrowExpressionClause> {
        support::child(&self.syntax)
    }

    pub fn initializer(&self) -> Option<EqualsValueClause> {
        support::child(&self.syntax)
    }
}

impl AccessorList {
    pub fn accessors(&self) -> impl Iterator<Item = AccessorDeclaration> + '_ {
        support::children(&self.syntax)
    }
}

impl AccessorDeclaration {
    pub fn keyword(&self) -> Option<SyntaxToken> {
        support::ident_token(&self.syntax)
    }

    pub fn body(&self) -> Option<Block> {
        support::child(&self.syntax)
    }

    pub fn expression_body(&self) -> Option<ArrowExpressionClause> {
        support::child(&self.syntax)
    }
}

impl ArrowExpressionClause {
    pub fn expression(&self) -> Option<Expression> {
        support::child(&self.syntax)
    }
}

impl EqualsValueClause {
    pub fn value(&self) -> Option<Expression> {
        support::child(&self.syntax)
    }
}

impl Modifiers {
    pub fn tokens(&self) -> impl Iterator<Item = SyntaxToken> + '_ {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|t| !t.kind().is_trivia())
    }

    pub fn has(&self, kind: SyntaxKind) -> bool {
        self.tokens().any(|t| t.kind() == kind)
    }
}

impl TypeParameterList {
    pub fn parameters(&self) -> impl Iterator<Item = TypeParameter> + '_ {
        support::children(&self.syntax)
    }
}

impl TypeParameter {
    pub fn name_token(&self) -> Option<SyntaxToken> {
        support::ident_token(&self.syntax)
    }
}

impl BaseList {
    pub fn types(&self) -> impl Iterator<Item = Type> + '_ {
        support::children(&self.syntax)
    }
}

impl ParameterList {
    pub fn parameters(&self) -> impl Iterator<Item = Parameter> + '_ {
        support::children(&self.syntax)
    }
}

impl Parameter {
    pub fn modifiers(&self) -> Option<Modifiers> {
        support::child(&self.syntax)
    }

    /// `None` for implicitly typed lambda parameters.
    pub fn ty(&self) -> Option<Type> {
        support::child(&self.syntax)
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        support::ident_token(&self.syntax)
    }

    pub fn default_value(&self) -> Option<EqualsValueClause> {
        support::child(&self.syntax)
    }
}

impl ArgumentList {
    pub fn arguments(&self) -> impl Iterator<Item = Argument> + '_ {
        support::children(&self.syntax)
    }
}

impl Argument {
    pub fn name_colon(&self) -> Option<NameColon> {
        support::child(&self.syntax)
    }

    pub fn ref_kind(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| matches!(t.kind(), SyntaxKind::RefKw | SyntaxKind::OutKw | SyntaxKind::InKw))
    }

    pub fn expression(&self) -> Option<Expression> {
        support::child(&self.syntax)
    }
}

impl NameColon {
    pub fn name(&self) -> Option<IdentifierName> {
        support::child(&self.syntax)
    }
}

impl PredefinedType {
    pub fn keyword(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| !t.kind().is_trivia())
    }
}

impl IdentifierName {
    pub fn ident_token(&self) -> Option<SyntaxToken> {
        support::ident_token(&self.syntax)
    }
}

impl GenericName {
    pub fn ident_token(&self) -> Option<SyntaxToken> {
        support::ident_token(&self.syntax)
    }

    pub fn type_argument_list(&self) -> Option<TypeArgumentList> {
        support::child(&self.syntax)
    }
}

impl TypeArgumentList {
    pub fn arguments(&self) -> impl Iterator<Item = Type> + '_ {
        support::children(&self.syntax)
    }
}

impl QualifiedName {
    pub fn left(&self) -> Option<Type> {
        support::child(&self.syntax)
    }

    pub fn right(&self) -> Option<SimpleName> {
        support::last_child(&self.syntax)
    }
}

impl AliasQualifiedName {
    pub fn alias(&self) -> Option<IdentifierName> {
        support::child(&self.syntax)
    }

    pub fn name(&self) -> Option<SimpleName> {
        let mut names = support::children::<SimpleName>(&self.syntax);
        names.next();
        names.next()
    }
}

impl ArrayType {
    pub fn element_type(&self) -> Option<Type> {
        support::child(&self.syntax)
    }

    pub fn rank_count(&self) -> usize {
        self.syntax
            .children()
            .filter(|n| n.kind() == SyntaxKind::ArrayRankSpecifier)
            .count()
    }
}

impl NullableType {
    pub fn element_type(&self) -> Option<Type> {
        support::child(&self.syntax)
    }
}

impl Block {
    pub fn statements(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.syntax.children()
    }
}

impl LocalDeclarationStatement {
    pub fn declaration(&self) -> Option<VariableDeclaration> {
        support::child(&self.syntax)
    }
}

impl VariableDeclaration {
    pub fn ty(&self) -> Option<Type> {
        support::child(&self.syntax)
    }

    pub fn declarators(&self) -> impl Iterator<Item = VariableDeclarator> + '_ {
        support::children(&self.syntax)
    }
}

impl VariableDeclarator {
    pub fn name_token(&self) -> Option<SyntaxToken> {
        support::ident_token(&self.syntax)
    }

    pub fn initializer(&self) -> Option<EqualsValueClause> {
        support::child(&self.syntax)
    }
}

impl ExpressionStatement {
    pub fn expression(&self) -> Option<Expression> {
        support::child(&self.syntax)
    }
}

impl ReturnStatement {
    pub fn expression(&self) -> Option<Expression> {
        support::child(&self.syntax)
    }
}

impl ForEachStatement {
    pub fn ty(&self) -> Option<Type> {
        support::child(&self.syntax)
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        support::ident_token(&self.syntax)
    }

    pub fn collection(&self) -> Option<Expression> {
        // The loop variable's type is always the first child node.
        self.syntax.children().skip(1).find_map(Expression::cast)
    }
}

impl LiteralExpression {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| !t.kind().is_trivia())
    }
}

impl MemberAccessExpression {
    pub fn receiver(&self) -> Option<Expression> {
        support::child(&self.syntax)
    }

    pub fn name(&self) -> Option<SimpleName> {
        let receiver_end = self.receiver()?.syntax().text_range().end();
        self.syntax
            .children()
            .filter(|n| n.text_range().start() >= receiver_end)
            .find_map(SimpleName::cast)
    }
}

impl InvocationExpression {
    pub fn callee(&self) -> Option<Expression> {
        support::child(&self.syntax)
    }

    pub fn argument_list(&self) -> Option<ArgumentList> {
        support::child(&self.syntax)
    }
}

impl ElementAccessExpression {
    pub fn receiver(&self) -> Option<Expression> {
        support::child(&self.syntax)
    }

    pub fn argument_list(&self) -> Option<ArgumentList> {
        support::child(&self.syntax)
    }
}

impl ObjectCreationExpression {
    pub fn ty(&self) -> Option<Type> {
        support::child(&self.syntax)
    }

    pub fn argument_list(&self) -> Option<ArgumentList> {
        support::child(&self.syntax)
    }
}

impl LambdaExpression {
    pub fn parameters(&self) -> Vec<Parameter> {
        match self.syntax.kind() {
            SyntaxKind::SimpleLambdaExpression => support::children(&self.syntax).collect(),
            _ => support::child::<ParameterList>(&self.syntax)
                .map(|list| list.parameters().collect())
                .unwrap_or_default(),
        }
    }

    pub fn block_body(&self) -> Option<Block> {
        support::child(&self.syntax)
    }

    pub fn expression_body(&self) -> Option<Expression> {
        support::child(&self.syntax)
    }
}

impl ParenthesizedExpression {
    pub fn expression(&self) -> Option<Expression> {
        support::child(&self.syntax)
    }
}

impl CastExpression {
    pub fn ty(&self) -> Option<Type> {
        support::child(&self.syntax)
    }

    pub fn expression(&self) -> Option<Expression> {
        let ty_end = self.ty()?.syntax().text_range().end();
        self.syntax
            .children()
            .filter(|n| n.text_range().start() >= ty_end)
            .find_map(Expression::cast)
    }
}

impl AssignmentExpression {
    pub fn lhs(&self) -> Option<Expression> {
        support::child(&self.syntax)
    }

    pub fn rhs(&self) -> Option<Expression> {
        support::children(&self.syntax).nth(1)
    }
}

impl BinaryExpression {
    pub fn lhs(&self) -> Option<Expression> {
        support::child(&self.syntax)
    }

    pub fn rhs(&self) -> Option<Expression> {
        support::children(&self.syntax).nth(1)
    }

    pub fn operator(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| !t.kind().is_trivia())
    }

    /// Operator text; `>>` is two adjacent `>` tokens in the tree.
    pub fn operator_text(&self) -> String {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|t| !t.kind().is_trivia())
            .map(|t| t.text().to_string())
            .collect()
    }
}

impl ConditionalExpression {
    pub fn branches(&self) -> (Option<Expression>, Option<Expression>) {
        let mut it = support::children::<Expression>(&self.syntax).skip(1);
        (it.next(), it.next())
    }
}

pub fn is_member_kind(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::NamespaceDeclaration
            | SyntaxKind::FileScopedNamespaceDeclaration
            | SyntaxKind::ClassDeclaration
            | SyntaxKind::StructDeclaration
            | SyntaxKind::InterfaceDeclaration
            | SyntaxKind::EnumDeclaration
            | SyntaxKind::DelegateDeclaration
            | SyntaxKind::MethodDeclaration
            | SyntaxKind::ConstructorDeclaration
            | SyntaxKind::FieldDeclaration
            | SyntaxKind::PropertyDeclaration
            | SyntaxKind::Error
    )
}
