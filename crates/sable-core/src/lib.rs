//! Core shared types for Sable.
//!
//! This crate is intentionally small: text primitives shared by the syntax and semantic
//! layers, and the cooperative cancellation checkpoint used by long-running operations.

mod cancel;
mod text;

pub use cancel::{check_cancelled, Cancelled, CancellationToken};
pub use text::{LineCol, LineIndex, TextRange, TextSize};
