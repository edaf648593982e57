//! Lossless C# syntax trees.
//!
//! - [`parse_csharp`]: full-fidelity rowan tree for a compilation unit. Every byte of the
//!   input, trivia included, is owned by exactly one token, so `syntax().to_string()`
//!   reproduces the source.
//! - [`parse_type_fragment`] / [`parse_expression_fragment`] / [`parse_member_fragment`]:
//!   detached green nodes used when synthesizing code.
//!
//! Trivia attach to the token stream in source order: a node starts at its first
//! non-trivia token and any comments that follow it are sibling tokens in its parent.

pub mod ast;
pub mod edit;
mod lexer;
pub mod make;
mod parser;
mod ptr;
mod syntax_kind;

pub use ast::*;
pub use lexer::{lex, Lexer, Token};
pub use parser::{
    parse_csharp, parse_expression_fragment, parse_member_fragment, parse_type_fragment,
    CSharpParseResult, SyntaxElement, SyntaxNode, SyntaxToken,
};
pub use ptr::SyntaxNodePtr;
pub use syntax_kind::{CSharpLanguage, SyntaxKind};
pub use text_size::{TextRange, TextSize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub range: TextRange,
}
