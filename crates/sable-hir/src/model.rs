use sable_syntax::ast::{self, AstNode};
use sable_syntax::{parse_type_fragment, SyntaxKind, SyntaxNode, SyntaxNodePtr};
use sable_workspace::Document;
use smol_str::SmolStr;

use crate::ids::{FieldId, MethodId, NamespaceId, PropertyId, TypeId};
use crate::index::{Container, Decl, MethodKind, SemanticIndex};
use crate::scope::{nested_type, NameResolution, Scope};
use crate::ty::{Ty, TypeKind, TypeParamOwner};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParameterOwner {
    Method(MethodId),
    Lambda(SyntaxNodePtr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSymbol {
    pub owner: ParameterOwner,
    pub ordinal: usize,
    pub name: SmolStr,
    pub ty: Ty,
    /// The declaring `Parameter` node.
    pub syntax: SyntaxNodePtr,
}

/// What an expression or name refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Namespace(NamespaceId),
    Type(Ty),
    /// A method group; `receiver` supplies the type arguments of a generic owner.
    /// `this_argument` is set for extension methods called on an instance (`x.M()`), where
    /// `x` binds to the first parameter.
    Methods {
        candidates: Vec<MethodId>,
        receiver: Option<Ty>,
        this_argument: Option<Ty>,
    },
    Field {
        id: FieldId,
        receiver: Option<Ty>,
    },
    Property {
        id: PropertyId,
        receiver: Option<Ty>,
    },
    Parameter(ParameterSymbol),
    Local {
        name: SmolStr,
        declarator: SyntaxNodePtr,
        ty: Ty,
    },
}

/// How a call supplies what the method's signature does not spell out.
#[derive(Debug, Clone, Copy)]
struct CallForm<'t> {
    receiver: Option<&'t Ty>,
    this_argument: Option<&'t Ty>,
    explicit: Option<&'t [Ty]>,
}

/// Argument as seen by overload resolution.
#[derive(Debug, Clone, PartialEq)]
enum ArgShape {
    Typed(Ty),
    Lambda { params: usize },
    Unknown,
}

/// Semantic queries over one document of a project.
#[derive(Debug, Clone, Copy)]
pub struct SemanticModel<'a> {
    index: &'a SemanticIndex,
    document: &'a Document,
}

impl<'a> SemanticModel<'a> {
    pub fn new(index: &'a SemanticIndex, document: &'a Document) -> Self {
        Self { index, document }
    }

    pub fn index(&self) -> &'a SemanticIndex {
        self.index
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }

    pub fn scope(&self, node: &SyntaxNode) -> Scope<'a> {
        Scope::at(self.index, self.document.id(), node)
    }

    fn decl_of(&self, node: &SyntaxNode) -> Option<Decl> {
        self.index.decl(self.document.id(), SyntaxNodePtr::new(node))
    }

    /// The method or constructor declared by `node`.
    pub fn declared_method(&self, node: &SyntaxNode) -> Option<MethodId> {
        match self.decl_of(node)? {
            Decl::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn declared_type(&self, node: &SyntaxNode) -> Option<TypeId> {
        match self.decl_of(node)? {
            Decl::Type(t) => Some(t),
            _ => None,
        }
    }

    pub fn declared_parameter(&self, param: &ast::Parameter) -> Option<ParameterSymbol> {
        let name = param.name()?;
        let parent = param.syntax().parent()?;
        let syntax = SyntaxNodePtr::new(param.syntax());
        let (owner_node, ordinal) = match parent.kind() {
            SyntaxKind::ParameterList => {
                let list = ast::ParameterList::cast(parent.clone())?;
                let ordinal = list.parameters().position(|p| p == *param)?;
                (parent.parent()?, ordinal)
            }
            SyntaxKind::SimpleLambdaExpression => (parent, 0),
            _ => return None,
        };
        let (owner, ty) = match owner_node.kind() {
            SyntaxKind::MethodDeclaration | SyntaxKind::ConstructorDeclaration => {
                let method = self.declared_method(&owner_node)?;
                let ty = self.index.method(method).params.get(ordinal)?.ty.clone();
                (ParameterOwner::Method(method), ty)
            }
            SyntaxKind::DelegateDeclaration => {
                let invoke = self.index.type_data(self.declared_type(&owner_node)?).invoke?;
                let ty = self.index.method(invoke).params.get(ordinal)?.ty.clone();
                (ParameterOwner::Method(invoke), ty)
            }
            SyntaxKind::SimpleLambdaExpression | SyntaxKind::ParenthesizedLambdaExpression => {
                let ty = param
                    .ty()
                    .map(|t| self.resolve_type(&t))
                    .unwrap_or_else(|| Ty::Error("".into()));
                (ParameterOwner::Lambda(SyntaxNodePtr::new(&owner_node)), ty)
            }
            _ => return None,
        };
        Some(ParameterSymbol {
            owner,
            ordinal,
            name,
            ty,
            syntax,
        })
    }

    pub fn resolve_type(&self, ty: &ast::Type) -> Ty {
        self.scope(ty.syntax()).resolve_type(ty)
    }

    // --- expressions ---

    pub fn symbol_of_expression(&self, expr: &ast::Expression) -> Option<Symbol> {
        let expr = expr.clone().unparenthesized();
        let node = expr.syntax();
        match node.kind() {
            SyntaxKind::IdentifierName => {
                let name = ast::IdentifierName::cast(node.clone())?.text()?;
                self.lookup_simple(node, &name, None)
            }
            SyntaxKind::GenericName => {
                let generic = ast::GenericName::cast(node.clone())?;
                let name = generic.text()?;
                self.lookup_simple(node, &name, generic.type_argument_list())
            }
            SyntaxKind::PredefinedType | SyntaxKind::AliasQualifiedName => {
                let ty = ast::Type::cast(node.clone())?;
                match self.scope(node).resolve_name(&ty)? {
                    NameResolution::Namespace(ns) => Some(Symbol::Namespace(ns)),
                    NameResolution::Type(ty) => Some(Symbol::Type(ty)),
                }
            }
            SyntaxKind::MemberAccessExpression => {
                let access = ast::MemberAccessExpression::cast(node.clone())?;
                let name = access.name()?;
                let receiver = access.receiver()?;
                self.member_of_expression(&receiver, &name)
            }
            _ => None,
        }
    }

    fn member_of_expression(&self, receiver: &ast::Expression, name: &ast::SimpleName) -> Option<Symbol> {
        let text = name.text()?;
        let args = name.type_argument_list();
        match self.symbol_of_expression(receiver) {
            Some(Symbol::Namespace(ns)) => {
                let scope = self.scope(receiver.syntax());
                match scope.member(NameResolution::Namespace(ns), name)? {
                    NameResolution::Namespace(ns) => Some(Symbol::Namespace(ns)),
                    NameResolution::Type(ty) => Some(Symbol::Type(ty)),
                }
            }
            Some(Symbol::Type(ty)) => self.member_of_type(receiver.syntax(), &ty, &text, args),
            Some(Symbol::Methods { .. }) => None,
            Some(value) => {
                let ty = self.type_of_symbol(&value)?;
                self.instance_member(receiver.syntax(), ty, &text, args)
            }
            None => {
                let ty = self.type_of_expression(receiver)?;
                self.instance_member(receiver.syntax(), ty, &text, args)
            }
        }
    }

    /// A member of a value of type `ty`, falling back to extension methods in scope.
    fn instance_member(
        &self,
        at: &SyntaxNode,
        ty: Ty,
        name: &str,
        args: Option<ast::TypeArgumentList>,
    ) -> Option<Symbol> {
        let arity = args.as_ref().map_or(0, |l| l.arguments().count());
        self.member_of_type(at, &ty, name, args)
            .or_else(|| self.extension_methods(at, ty, name, arity))
    }

    /// Extension methods named `name` from the innermost namespace that has any.
    fn extension_methods(&self, at: &SyntaxNode, ty: Ty, name: &str, arity: usize) -> Option<Symbol> {
        let scope = self.scope(at);
        for ns in scope.extension_namespaces() {
            let candidates: Vec<MethodId> = self
                .index
                .types_in_namespace(ns)
                .flat_map(|t| self.index.type_data(t).methods.iter().copied())
                .filter(|&m| {
                    let method = self.index.method(m);
                    method.is_extension
                        && method.name == name
                        && (arity == 0 || method.type_params.len() == arity)
                })
                .collect();
            if !candidates.is_empty() {
                return Some(Symbol::Methods {
                    candidates,
                    receiver: None,
                    this_argument: Some(ty),
                });
            }
        }
        None
    }

    fn member_of_type(
        &self,
        at: &SyntaxNode,
        ty: &Ty,
        name: &str,
        args: Option<ast::TypeArgumentList>,
    ) -> Option<Symbol> {
        let def = match ty {
            Ty::Named { def, .. } => *def,
            Ty::Array { .. } | Ty::TypeParam { .. } => self.index.object_type()?,
            _ => return None,
        };
        let arity = args.as_ref().map_or(0, |l| l.arguments().count());
        for t in self.index.base_chain(def) {
            let data = self.index.type_data(t);
            let receiver = Some(ty.clone());
            if arity == 0 {
                if let Some(&id) = data.fields.iter().find(|&&f| self.index.field(f).name == name) {
                    return Some(Symbol::Field { id, receiver });
                }
                if let Some(&id) = data
                    .properties
                    .iter()
                    .find(|&&p| self.index.property(p).name == name)
                {
                    return Some(Symbol::Property { id, receiver });
                }
            }
            let candidates: Vec<MethodId> = data
                .methods
                .iter()
                .copied()
                .filter(|&m| {
                    let method = self.index.method(m);
                    method.name == name && (arity == 0 || method.type_params.len() == arity)
                })
                .collect();
            if !candidates.is_empty() {
                return Some(Symbol::Methods {
                    candidates,
                    receiver,
                    this_argument: None,
                });
            }
            if let Some(nested) = nested_type(self.index, t, name, arity) {
                let args = args
                    .map(|l| {
                        let scope = self.scope(at);
                        l.arguments().map(|a| scope.resolve_type(&a)).collect()
                    })
                    .unwrap_or_default();
                return Some(Symbol::Type(Ty::Named { def: nested, args }));
            }
        }
        None
    }

    /// Locals, parameters, members of enclosing types, then types and namespaces.
    fn lookup_simple(
        &self,
        node: &SyntaxNode,
        name: &str,
        args: Option<ast::TypeArgumentList>,
    ) -> Option<Symbol> {
        let arity = args.as_ref().map_or(0, |l| l.arguments().count());
        if arity == 0 {
            if let Some(local) = self.lookup_local(node, name) {
                return Some(local);
            }
        }
        let scope = self.scope(node);
        for t in scope.enclosing_types() {
            let this_ty = self.instance_type(t);
            if let Some(member) = self.member_of_type(node, &this_ty, name, args.clone()) {
                return Some(member);
            }
        }
        let found = match &args {
            None => scope.lookup(name, 0)?,
            Some(list) => match scope.lookup(name, arity)? {
                NameResolution::Type(Ty::Named { def, .. }) => NameResolution::Type(Ty::Named {
                    def,
                    args: list.arguments().map(|a| scope.resolve_type(&a)).collect(),
                }),
                other => other,
            },
        };
        Some(match found {
            NameResolution::Namespace(ns) => Symbol::Namespace(ns),
            NameResolution::Type(ty) => Symbol::Type(ty),
        })
    }

    /// `T` or `T<T1, ...>` over its own type parameters.
    fn instance_type(&self, t: TypeId) -> Ty {
        let data = self.index.type_data(t);
        Ty::Named {
            def: t,
            args: data
                .type_params
                .iter()
                .enumerate()
                .map(|(i, name)| Ty::TypeParam {
                    owner: TypeParamOwner::Type(t),
                    index: i as u32,
                    name: name.clone(),
                })
                .collect(),
        }
    }

    fn lookup_local(&self, node: &SyntaxNode, name: &str) -> Option<Symbol> {
        let position = node.text_range().start();
        let mut previous = node.clone();
        for anc in node.ancestors().skip(1) {
            match anc.kind() {
                SyntaxKind::SimpleLambdaExpression | SyntaxKind::ParenthesizedLambdaExpression => {
                    let lambda = ast::LambdaExpression::cast(anc.clone())?;
                    if let Some(param) = lambda
                        .parameters()
                        .into_iter()
                        .find(|p| p.name().as_deref() == Some(name))
                    {
                        return self.declared_parameter(&param).map(Symbol::Parameter);
                    }
                }
                SyntaxKind::Block => {
                    for stmt in anc.children() {
                        if stmt.text_range().start() >= position {
                            break;
                        }
                        if let Some(local) = self.local_in_statement(&stmt, name, position) {
                            return Some(local);
                        }
                    }
                }
                SyntaxKind::ForStatement => {
                    if let Some(local) = anc
                        .children()
                        .find(|c| c.kind() == SyntaxKind::VariableDeclaration)
                        .and_then(ast::VariableDeclaration::cast)
                        .and_then(|d| self.local_in_declaration(&d, name, position))
                    {
                        return Some(local);
                    }
                }
                SyntaxKind::ForEachStatement => {
                    let foreach = ast::ForEachStatement::cast(anc.clone())?;
                    let in_collection = foreach
                        .collection()
                        .map_or(false, |c| c.syntax() == &previous);
                    if !in_collection && foreach.name_token().map_or(false, |t| t.text() == name) {
                        let ty = self.foreach_variable_type(&foreach);
                        return Some(Symbol::Local {
                            name: name.into(),
                            declarator: SyntaxNodePtr::new(&anc),
                            ty,
                        });
                    }
                }
                SyntaxKind::MethodDeclaration | SyntaxKind::ConstructorDeclaration => {
                    let list = anc.children().find_map(ast::ParameterList::cast)?;
                    return list
                        .parameters()
                        .find(|p| p.name().as_deref() == Some(name))
                        .and_then(|p| self.declared_parameter(&p))
                        .map(Symbol::Parameter);
                }
                _ => {}
            }
            previous = anc;
        }
        None
    }

    fn local_in_statement(&self, stmt: &SyntaxNode, name: &str, position: sable_syntax::TextSize) -> Option<Symbol> {
        let decl = ast::LocalDeclarationStatement::cast(stmt.clone())?.declaration()?;
        self.local_in_declaration(&decl, name, position)
    }

    fn local_in_declaration(
        &self,
        decl: &ast::VariableDeclaration,
        name: &str,
        position: sable_syntax::TextSize,
    ) -> Option<Symbol> {
        let declarator = decl.declarators().find(|d| {
            d.name_token().map_or(false, |t| t.text() == name)
                && d.syntax().text_range().end() <= position
        })?;
        let written = decl.ty()?;
        let ty = if written.text() == "var" {
            declarator
                .initializer()
                .and_then(|init| init.value())
                .and_then(|value| self.type_of_expression(&value))
                .unwrap_or_else(|| Ty::Error("var".into()))
        } else {
            self.resolve_type(&written)
        };
        Some(Symbol::Local {
            name: name.into(),
            declarator: SyntaxNodePtr::new(declarator.syntax()),
            ty,
        })
    }

    fn foreach_variable_type(&self, foreach: &ast::ForEachStatement) -> Ty {
        let written = foreach.ty();
        if let Some(written) = written.as_ref().filter(|t| t.text() != "var") {
            return self.resolve_type(written);
        }
        let collection = foreach.collection().and_then(|c| self.type_of_expression(&c));
        match collection {
            Some(Ty::Array { element, .. }) => *element,
            Some(Ty::Named { args, .. }) if args.len() == 1 => args[0].clone(),
            _ => Ty::Error("var".into()),
        }
    }

    pub fn type_of_symbol(&self, symbol: &Symbol) -> Option<Ty> {
        match symbol {
            Symbol::Field { id, receiver } => {
                let ty = &self.index.field(*id).ty;
                Some(match receiver {
                    Some(r) => ty.substitute_receiver(r),
                    None => ty.clone(),
                })
            }
            Symbol::Property { id, receiver } => {
                let ty = &self.index.property(*id).ty;
                Some(match receiver {
                    Some(r) => ty.substitute_receiver(r),
                    None => ty.clone(),
                })
            }
            Symbol::Parameter(param) => Some(param.ty.clone()),
            Symbol::Local { ty, .. } => Some(ty.clone()),
            Symbol::Namespace(_) | Symbol::Type(_) | Symbol::Methods { .. } => None,
        }
    }

    pub fn type_of_expression(&self, expr: &ast::Expression) -> Option<Ty> {
        let expr = expr.clone().unparenthesized();
        let node = expr.syntax();
        match node.kind() {
            SyntaxKind::LiteralExpression => self.literal_type(node),
            SyntaxKind::IdentifierName | SyntaxKind::GenericName | SyntaxKind::MemberAccessExpression => {
                let symbol = self.symbol_of_expression(&expr)?;
                self.type_of_symbol(&symbol)
            }
            SyntaxKind::InvocationExpression => {
                let call = ast::InvocationExpression::cast(node.clone())?;
                self.invocation_type(&call)
            }
            SyntaxKind::ObjectCreationExpression => {
                let ty = ast::ObjectCreationExpression::cast(node.clone())?.ty()?;
                Some(self.resolve_type(&ty))
            }
            SyntaxKind::CastExpression => {
                let ty = ast::CastExpression::cast(node.clone())?.ty()?;
                Some(self.resolve_type(&ty))
            }
            SyntaxKind::AsExpression | SyntaxKind::DefaultExpression => {
                let ty = node.children().find_map(ast::Type::cast)?;
                Some(self.resolve_type(&ty))
            }
            SyntaxKind::AssignmentExpression => {
                let lhs = ast::AssignmentExpression::cast(node.clone())?.lhs()?;
                self.type_of_expression(&lhs)
            }
            SyntaxKind::ConditionalExpression => {
                let (then, _) = ast::ConditionalExpression::cast(node.clone())?.branches();
                self.type_of_expression(&then?)
            }
            SyntaxKind::ThisExpression => {
                let t = self.scope(node).enclosing_types().next()?;
                Some(self.instance_type(t))
            }
            SyntaxKind::IsExpression => self.keyword_ty(SyntaxKind::BoolKw),
            SyntaxKind::PrefixUnaryExpression | SyntaxKind::PostfixUnaryExpression => {
                let is_not = node
                    .children_with_tokens()
                    .filter_map(|el| el.into_token())
                    .any(|t| t.kind() == SyntaxKind::Bang);
                if is_not && node.kind() == SyntaxKind::PrefixUnaryExpression {
                    return self.keyword_ty(SyntaxKind::BoolKw);
                }
                let operand = node.children().find_map(ast::Expression::cast)?;
                self.type_of_expression(&operand)
            }
            SyntaxKind::BinaryExpression => {
                let binary = ast::BinaryExpression::cast(node.clone())?;
                self.binary_type(&binary)
            }
            SyntaxKind::ElementAccessExpression => {
                let receiver = ast::ElementAccessExpression::cast(node.clone())?.receiver()?;
                match self.type_of_expression(&receiver)? {
                    Ty::Array { element, .. } => Some(*element),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn keyword_ty(&self, kind: SyntaxKind) -> Option<Ty> {
        self.index.keyword_type(kind).map(Ty::named)
    }

    fn literal_type(&self, node: &SyntaxNode) -> Option<Ty> {
        let token = ast::LiteralExpression::cast(node.clone())?.token()?;
        let text = token.text().to_ascii_lowercase();
        let keyword = match token.kind() {
            SyntaxKind::IntLiteral if text.ends_with("ul") || text.ends_with("lu") => SyntaxKind::UlongKw,
            SyntaxKind::IntLiteral if text.ends_with('l') => SyntaxKind::LongKw,
            SyntaxKind::IntLiteral if text.ends_with('u') => SyntaxKind::UintKw,
            SyntaxKind::IntLiteral => SyntaxKind::IntKw,
            SyntaxKind::RealLiteral if text.ends_with('f') => SyntaxKind::FloatKw,
            SyntaxKind::RealLiteral if text.ends_with('m') => SyntaxKind::DecimalKw,
            SyntaxKind::RealLiteral => SyntaxKind::DoubleKw,
            SyntaxKind::StringLiteral => SyntaxKind::StringKw,
            SyntaxKind::CharLiteral => SyntaxKind::CharKw,
            SyntaxKind::TrueKw | SyntaxKind::FalseKw => SyntaxKind::BoolKw,
            SyntaxKind::NullKw => return Some(Ty::Null),
            _ => return None,
        };
        self.keyword_ty(keyword)
    }

    fn binary_type(&self, binary: &ast::BinaryExpression) -> Option<Ty> {
        let op = binary.operator_text();
        match op.as_str() {
            "==" | "!=" | "<" | ">" | "<=" | ">=" | "&&" | "||" => self.keyword_ty(SyntaxKind::BoolKw),
            "??" => self.type_of_expression(&binary.lhs()?),
            _ => {
                let lhs = self.type_of_expression(&binary.lhs()?)?;
                let rhs = binary.rhs().and_then(|r| self.type_of_expression(&r));
                let string = self.keyword_ty(SyntaxKind::StringKw);
                if op == "+" && (Some(&lhs) == string.as_ref() || rhs == string) {
                    return string;
                }
                match rhs {
                    Some(rhs) if self.is_implicitly_convertible(&lhs, &rhs) => Some(rhs),
                    _ => Some(lhs),
                }
            }
        }
    }

    fn invocation_type(&self, call: &ast::InvocationExpression) -> Option<Ty> {
        let callee = call.callee()?;
        match self.symbol_of_expression(&callee)? {
            Symbol::Methods { receiver, .. } => {
                let method = self.invoked_method(call)?;
                let data = self.index.method(method);
                let mut ty = match &receiver {
                    Some(r) => data.return_ty.substitute_receiver(r),
                    None => data.return_ty.clone(),
                };
                if !data.type_params.is_empty() {
                    let inferred = self.method_type_arguments(call, method, receiver.as_ref());
                    ty = ty.substitute(TypeParamOwner::Method(method), &inferred);
                }
                Some(ty)
            }
            value => {
                let delegate = self.type_of_symbol(&value)?;
                let invoke = self.index.type_data(delegate.def()?).invoke?;
                Some(self.index.method(invoke).return_ty.substitute_receiver(&delegate))
            }
        }
    }

    /// Type arguments of a generic method call: explicit ones on the callee, otherwise
    /// inferred from arguments passed where a method type parameter is expected.
    pub fn method_type_arguments(
        &self,
        call: &ast::InvocationExpression,
        method: MethodId,
        receiver: Option<&Ty>,
    ) -> Vec<Ty> {
        let explicit = self.explicit_type_arguments(call);
        let (args, shapes) = self.arguments(call);
        let this_argument = self.this_argument(call);
        let form = CallForm {
            receiver,
            this_argument: this_argument.as_ref(),
            explicit: explicit.as_deref(),
        };
        self.applicable_form(method, &form, &args, &shapes)
            .map(|(inferred, _)| inferred)
            .unwrap_or_else(|| {
                let data = self.index.method(method);
                data.type_params.iter().map(|p| Ty::Error(p.clone())).collect()
            })
    }

    fn explicit_type_arguments(&self, call: &ast::InvocationExpression) -> Option<Vec<Ty>> {
        let callee = call.callee()?.unparenthesized();
        let name = match ast::MemberAccessExpression::cast(callee.syntax().clone()) {
            Some(access) => access.name()?,
            None => ast::SimpleName::cast(callee.syntax().clone())?,
        };
        let list = name.type_argument_list()?;
        let scope = self.scope(call.syntax());
        Some(list.arguments().map(|a| scope.resolve_type(&a)).collect())
    }

    /// Receiver type of a reduced extension call.
    fn this_argument(&self, call: &ast::InvocationExpression) -> Option<Ty> {
        match self.symbol_of_expression(&call.callee()?)? {
            Symbol::Methods { this_argument, .. } => this_argument,
            _ => None,
        }
    }

    fn arguments(&self, call: &ast::InvocationExpression) -> (Vec<ast::Argument>, Vec<ArgShape>) {
        let args: Vec<ast::Argument> = call
            .argument_list()
            .map(|l| l.arguments().collect())
            .unwrap_or_default();
        let shapes = args.iter().map(|a| self.arg_shape(a)).collect();
        (args, shapes)
    }

    /// The method an invocation binds to, after overload resolution on arity and argument
    /// types. `None` when the call is unbound or ambiguous.
    pub fn invoked_method(&self, call: &ast::InvocationExpression) -> Option<MethodId> {
        let callee = call.callee()?;
        let Symbol::Methods {
            candidates,
            receiver,
            this_argument,
        } = self.symbol_of_expression(&callee)?
        else {
            return None;
        };
        let explicit = self.explicit_type_arguments(call);
        let (args, shapes) = self.arguments(call);

        let mut best: Option<(MethodId, (u32, bool))> = None;
        let mut ambiguous = false;
        for &candidate in &candidates {
            let arity = self.index.method(candidate).type_params.len();
            let explicit = match &explicit {
                Some(e) if e.len() != arity => continue,
                Some(e) => Some(e.as_slice()),
                None => None,
            };
            let form = CallForm {
                receiver: receiver.as_ref(),
                this_argument: this_argument.as_ref(),
                explicit,
            };
            let Some((_, score)) = self.applicable_form(candidate, &form, &args, &shapes) else {
                continue;
            };
            match best {
                Some((_, best_score)) if score < best_score => {}
                Some((_, best_score)) if score == best_score => ambiguous = true,
                _ => {
                    best = Some((candidate, score));
                    ambiguous = false;
                }
            }
        }
        if ambiguous {
            tracing::trace!(target: "sable.hir", call = %call.syntax(), "ambiguous invocation");
            return None;
        }
        best.map(|(m, _)| m)
    }

    fn arg_shape(&self, arg: &ast::Argument) -> ArgShape {
        let Some(expr) = arg.expression() else {
            return ArgShape::Unknown;
        };
        if let Some(lambda) = ast::LambdaExpression::cast(expr.syntax().clone()) {
            return ArgShape::Lambda {
                params: lambda.parameters().len(),
            };
        }
        match self.type_of_expression(&expr) {
            Some(ty) => ArgShape::Typed(ty),
            None => ArgShape::Unknown,
        }
    }

    /// Best applicable form of `method` with its score. Normal form wins ties against the
    /// expanded `params` form.
    fn applicable_form(
        &self,
        method: MethodId,
        form: &CallForm<'_>,
        args: &[ast::Argument],
        shapes: &[ArgShape],
    ) -> Option<(Vec<Ty>, (u32, bool))> {
        let receiver = form.receiver;
        let bound = usize::from(form.this_argument.is_some());
        // A reduced extension call passes its receiver as the first argument.
        let shapes: Vec<ArgShape> = form
            .this_argument
            .map(|ty| ArgShape::Typed(ty.clone()))
            .into_iter()
            .chain(shapes.iter().cloned())
            .collect();
        [false, true].into_iter().find_map(|expanded| {
            let mut mapping = Vec::with_capacity(shapes.len());
            if bound == 1 {
                mapping.push((0, false));
            }
            mapping.extend(map_arguments(self.index, method, args, expanded, bound)?);
            let inferred = match form.explicit {
                Some(explicit) => explicit.to_vec(),
                None => self.infer_type_arguments(method, receiver, &mapping, &shapes),
            };
            let data = self.index.method(method);
            let mut score = 0;
            for (&(param, expanded), shape) in mapping.iter().zip(&shapes) {
                let target = parameter_target(&data.params.get(param)?.ty, receiver, expanded)
                    .substitute(TypeParamOwner::Method(method), &inferred);
                score += self.shape_conversion(shape, &target)?;
            }
            Some((inferred, (score, !expanded)))
        })
    }

    fn infer_type_arguments(
        &self,
        method: MethodId,
        receiver: Option<&Ty>,
        mapping: &[(usize, bool)],
        shapes: &[ArgShape],
    ) -> Vec<Ty> {
        let data = self.index.method(method);
        (0..data.type_params.len())
            .map(|tp| {
                mapping
                    .iter()
                    .zip(shapes)
                    .find_map(|(&(param, expanded), shape)| {
                        let target = parameter_target(&data.params.get(param)?.ty, receiver, expanded);
                        match (target, shape) {
                            (
                                Ty::TypeParam {
                                    owner: TypeParamOwner::Method(owner),
                                    index,
                                    ..
                                },
                                ArgShape::Typed(ty),
                            ) if owner == method && index as usize == tp && *ty != Ty::Null => {
                                Some(ty.clone())
                            }
                            _ => None,
                        }
                    })
                    .unwrap_or_else(|| Ty::Error(data.type_params[tp].clone()))
            })
            .collect()
    }

    fn shape_conversion(&self, shape: &ArgShape, target: &Ty) -> Option<u32> {
        match shape {
            ArgShape::Unknown => Some(0),
            ArgShape::Typed(ty) => self.conversion(ty, target),
            ArgShape::Lambda { params } => match target {
                Ty::Named { def, .. } => {
                    let invoke = self.index.type_data(*def).invoke?;
                    (self.index.method(invoke).params.len() == *params).then_some(1)
                }
                Ty::TypeParam { .. } | Ty::Error(_) => Some(0),
                _ => None,
            },
        }
    }

    pub fn is_implicitly_convertible(&self, from: &Ty, to: &Ty) -> bool {
        self.conversion(from, to).is_some()
    }

    /// 2 for identity, 1 for an implicit conversion, 0 for unknown types.
    fn conversion(&self, from: &Ty, to: &Ty) -> Option<u32> {
        if from == to {
            return Some(2);
        }
        match (from, to) {
            (Ty::Error(_), _) | (_, Ty::Error(_)) => Some(0),
            (_, Ty::TypeParam { .. }) | (Ty::TypeParam { .. }, _) => Some(0),
            (Ty::Null, Ty::Named { def, .. }) => {
                self.index.type_data(*def).is_reference_type().then_some(1)
            }
            (Ty::Null, Ty::Nullable(_) | Ty::Array { .. }) => Some(1),
            (_, Ty::Named { def, .. }) if Some(*def) == self.index.object_type() => Some(1),
            (Ty::Named { def: f, .. }, Ty::Named { def: t, .. }) => {
                let from_data = self.index.type_data(*f);
                let to_data = self.index.type_data(*t);
                if let (Some(a), Some(b)) = (from_data.keyword, to_data.keyword) {
                    return numeric_widening(a, b).then_some(1);
                }
                let inherits = self.index.is_subclass_of(*f, *t)
                    || self
                        .index
                        .base_chain(*f)
                        .into_iter()
                        .any(|c| self.index.direct_bases(c).any(|b| b == *t));
                inherits.then_some(1)
            }
            (_, Ty::Nullable(inner)) => self.conversion(from, inner).map(|_| 1),
            (
                Ty::Array {
                    element: fe,
                    rank: fr,
                },
                Ty::Array {
                    element: te,
                    rank: tr,
                },
            ) if fr == tr => self.conversion(fe, te).map(|_| 1),
            _ => None,
        }
    }

    /// The enclosing method or constructor of `node`.
    pub fn containing_method(&self, node: &SyntaxNode) -> Option<MethodId> {
        node.ancestors()
            .filter(|n| {
                matches!(
                    n.kind(),
                    SyntaxKind::MethodDeclaration | SyntaxKind::ConstructorDeclaration
                )
            })
            .find_map(|n| self.declared_method(&n))
    }

    /// The expression `call` passes, unexpanded, to parameter `ordinal` of `method`. For a
    /// reduced extension call (`x.M(...)`) parameter 0 is the receiver `x`. Arguments folded
    /// into an expanded `params` array are not returned, and neither is an argument without
    /// an expression (`out var x`).
    pub fn argument_for_parameter(
        &self,
        call: &ast::InvocationExpression,
        method: MethodId,
        ordinal: usize,
    ) -> Option<ast::Expression> {
        let reduced_receiver = if self.this_argument(call).is_some() {
            let callee = call.callee()?.unparenthesized();
            Some(ast::MemberAccessExpression::cast(callee.syntax().clone())?.receiver()?)
        } else {
            None
        };
        let bound = usize::from(reduced_receiver.is_some());
        if let Some(receiver) = reduced_receiver.filter(|_| ordinal == 0) {
            return Some(receiver);
        }
        let args: Vec<ast::Argument> = call
            .argument_list()
            .map(|l| l.arguments().collect())
            .unwrap_or_default();
        let mapping = map_arguments(self.index, method, &args, false, bound)
            .or_else(|| map_arguments(self.index, method, &args, true, bound))?;
        args.into_iter()
            .zip(mapping)
            .find(|(_, (slot, expanded))| *slot == ordinal && !expanded)
            .and_then(|(arg, _)| arg.expression())
    }

    // --- display ---

    /// Minimal spelling of `ty` at `at`: keywords for predefined types, otherwise the
    /// shortest qualification that binds back to the same type.
    pub fn display_type(&self, ty: &Ty, at: &SyntaxNode) -> String {
        let scope = self.scope(at);
        self.display_in(&scope, ty)
    }

    fn display_in(&self, scope: &Scope<'_>, ty: &Ty) -> String {
        match ty {
            Ty::Named { def, args } => self.display_named(scope, *def, args),
            Ty::Array { element, rank } => {
                let commas = ",".repeat(rank.saturating_sub(1) as usize);
                format!("{}[{commas}]", self.display_in(scope, element))
            }
            Ty::Nullable(inner) => format!("{}?", self.display_in(scope, inner)),
            Ty::TypeParam { name, .. } => name.to_string(),
            Ty::Void => "void".to_string(),
            Ty::Null => "null".to_string(),
            Ty::Error(text) => text.to_string(),
        }
    }

    fn display_named(&self, scope: &Scope<'_>, def: TypeId, args: &[Ty]) -> String {
        let data = self.index.type_data(def);
        if let Some(keyword) = data.keyword {
            return keyword.to_string();
        }
        let mut last = data.name.to_string();
        if !args.is_empty() {
            let args: Vec<_> = args.iter().map(|a| self.display_in(scope, a)).collect();
            last = format!("{last}<{}>", args.join(", "));
        }

        // Qualifiers from the innermost container outwards.
        let mut qualifiers = Vec::new();
        let mut container = data.container;
        loop {
            match container {
                Container::Type(outer) => {
                    let outer_data = self.index.type_data(outer);
                    qualifiers.push(outer_data.name.to_string());
                    container = outer_data.container;
                }
                Container::Namespace(ns) => {
                    let mut current = Some(ns);
                    while let Some(id) = current {
                        let ns_data = self.index.namespace(id);
                        if ns_data.parent.is_some() {
                            qualifiers.push(ns_data.name.to_string());
                        }
                        current = ns_data.parent;
                    }
                    break;
                }
            }
        }

        let target = Ty::Named {
            def,
            args: args.to_vec(),
        };
        for take in 0..=qualifiers.len() {
            let mut segments: Vec<&str> = qualifiers[..take].iter().rev().map(String::as_str).collect();
            segments.push(&last);
            let candidate = segments.join(".");
            if self.binds_to(scope, &candidate, &target) {
                return candidate;
            }
        }
        let mut segments: Vec<&str> = qualifiers.iter().rev().map(String::as_str).collect();
        segments.push(&last);
        format!("global::{}", segments.join("."))
    }

    fn binds_to(&self, scope: &Scope<'_>, text: &str, target: &Ty) -> bool {
        let Ok(green) = parse_type_fragment(text) else {
            return false;
        };
        let Some(ty) = ast::Type::cast(SyntaxNode::new_root(green)) else {
            return false;
        };
        &scope.resolve_type(&ty) == target
    }

    /// Whether `method` is a source method, constructor or invoke signature.
    pub fn is_source_method(&self, method: MethodId) -> bool {
        let data = self.index.method(method);
        data.origin.is_some() && data.kind != MethodKind::DelegateInvoke
    }

    pub fn is_delegate(&self, ty: &Ty) -> bool {
        ty.def()
            .map_or(false, |d| self.index.type_data(d).kind == TypeKind::Delegate)
    }
}

/// Map each argument to `(parameter index, expanded params array)`. `None` when an argument
/// has no parameter or a required parameter is left without an argument. In expanded form
/// trailing positional arguments all bind to the `params` parameter. The first `bound`
/// parameters are already supplied (the receiver of a reduced extension call).
pub(crate) fn map_arguments(
    index: &SemanticIndex,
    method: MethodId,
    args: &[ast::Argument],
    expanded: bool,
    bound: usize,
) -> Option<Vec<(usize, bool)>> {
    let params = &index.method(method).params;
    let params_slot = params
        .len()
        .checked_sub(1)
        .filter(|&last| expanded && params[last].is_params);
    if expanded && params_slot.is_none() {
        return None;
    }
    if bound > params.len() {
        return None;
    }
    let mut mapping = Vec::with_capacity(args.len());
    let mut covered = vec![false; params.len()];
    covered[..bound].fill(true);
    for (position, arg) in args.iter().enumerate() {
        let position = position + bound;
        let slot = match (arg.name(), params_slot) {
            (Some(name), _) => (params.iter().position(|p| p.name == name)?, false),
            (None, Some(last)) if position >= last => (last, true),
            (None, _) if position < params.len() => (position, false),
            (None, _) => return None,
        };
        covered[slot.0] = true;
        mapping.push(slot);
    }
    let complete = params
        .iter()
        .zip(&covered)
        .all(|(p, &c)| c || p.has_default || (expanded && p.is_params));
    complete.then_some(mapping)
}

/// Parameter type as seen by one argument: receiver-substituted and, in expanded form,
/// the element type of the `params` array.
fn parameter_target(ty: &Ty, receiver: Option<&Ty>, expanded: bool) -> Ty {
    let ty = match receiver {
        Some(r) => ty.substitute_receiver(r),
        None => ty.clone(),
    };
    match ty {
        Ty::Array { element, .. } if expanded => *element,
        ty => ty,
    }
}

fn numeric_widening(from: &str, to: &str) -> bool {
    let targets: &[&str] = match from {
        "sbyte" => &["short", "int", "long", "float", "double", "decimal"],
        "byte" => &["short", "ushort", "int", "uint", "long", "ulong", "float", "double", "decimal"],
        "short" => &["int", "long", "float", "double", "decimal"],
        "ushort" => &["int", "uint", "long", "ulong", "float", "double", "decimal"],
        "int" => &["long", "float", "double", "decimal"],
        "uint" => &["long", "ulong", "float", "double", "decimal"],
        "long" | "ulong" => &["float", "double", "decimal"],
        "char" => &["ushort", "int", "uint", "long", "ulong", "float", "double", "decimal"],
        "float" => &["double"],
        _ => &[],
    };
    targets.contains(&to)
}
