use smol_str::SmolStr;

use crate::ids::{MethodId, TypeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Enum,
    Delegate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accessibility {
    Public,
    Internal,
    Protected,
    ProtectedInternal,
    PrivateProtected,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeParamOwner {
    Type(TypeId),
    Method(MethodId),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ty {
    /// A named type together with the arguments for its own type parameters.
    Named { def: TypeId, args: Vec<Ty> },
    TypeParam {
        owner: TypeParamOwner,
        index: u32,
        name: SmolStr,
    },
    Array { element: Box<Ty>, rank: u32 },
    Nullable(Box<Ty>),
    Void,
    /// Type of the `null` literal.
    Null,
    /// Unresolvable type; keeps the written text.
    Error(SmolStr),
}

impl Ty {
    pub fn named(def: TypeId) -> Ty {
        Ty::Named {
            def,
            args: Vec::new(),
        }
    }

    pub fn def(&self) -> Option<TypeId> {
        match self {
            Ty::Named { def, .. } => Some(*def),
            _ => None,
        }
    }

    pub fn type_args(&self) -> &[Ty] {
        match self {
            Ty::Named { args, .. } => args,
            _ => &[],
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Ty::Error(_))
    }

    /// Replace type parameters owned by `owner` with `args` (by index).
    pub fn substitute(&self, owner: TypeParamOwner, args: &[Ty]) -> Ty {
        match self {
            Ty::TypeParam {
                owner: param_owner,
                index,
                ..
            } if *param_owner == owner => args
                .get(*index as usize)
                .cloned()
                .unwrap_or_else(|| self.clone()),
            Ty::Named { def, args: inner } => Ty::Named {
                def: *def,
                args: inner.iter().map(|t| t.substitute(owner, args)).collect(),
            },
            Ty::Array { element, rank } => Ty::Array {
                element: Box::new(element.substitute(owner, args)),
                rank: *rank,
            },
            Ty::Nullable(inner) => Ty::Nullable(Box::new(inner.substitute(owner, args))),
            Ty::TypeParam { .. } | Ty::Void | Ty::Null | Ty::Error(_) => self.clone(),
        }
    }

    /// Substitute the type parameters of the named type `receiver` (if any).
    pub fn substitute_receiver(&self, receiver: &Ty) -> Ty {
        match receiver {
            Ty::Named { def, args } if !args.is_empty() => {
                self.substitute(TypeParamOwner::Type(*def), args)
            }
            _ => self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn substitution_only_touches_the_matching_owner() {
        let list = TypeId(1);
        let method = MethodId(0);
        let t = Ty::TypeParam {
            owner: TypeParamOwner::Type(list),
            index: 0,
            name: "T".into(),
        };
        let u = Ty::TypeParam {
            owner: TypeParamOwner::Method(method),
            index: 0,
            name: "U".into(),
        };
        let nested = Ty::Named {
            def: TypeId(2),
            args: vec![t.clone(), u.clone()],
        };
        let int = Ty::named(TypeId(3));

        assert_eq!(
            nested.substitute(TypeParamOwner::Type(list), &[int.clone()]),
            Ty::Named {
                def: TypeId(2),
                args: vec![int, u],
            }
        );
        assert_eq!(
            Ty::Array {
                element: Box::new(t.clone()),
                rank: 1
            }
            .substitute(TypeParamOwner::Type(TypeId(9)), &[Ty::Void]),
            Ty::Array {
                element: Box::new(t),
                rank: 1
            }
        );
    }
}
