use sable_syntax::SyntaxNodePtr;
use sable_workspace::DocumentId;

macro_rules! arena_id {
    ($($(#[$meta:meta])* $name:ident;)*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
            pub struct $name(pub(crate) u32);

            impl $name {
                pub(crate) fn idx(self) -> usize {
                    self.0 as usize
                }
            }
        )*
    };
}

arena_id! {
    NamespaceId;
    TypeId;
    /// Methods, constructors and delegate `Invoke` signatures.
    MethodId;
    FieldId;
    PropertyId;
}

/// Where a source declaration lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclOrigin {
    pub document: DocumentId,
    pub ptr: SyntaxNodePtr,
}
