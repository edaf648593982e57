//! Editor-facing features over a [`sable_workspace::Project`].
//!
//! - [`diagnostics`]: the `ImmutableArray` creation analyzer.
//! - [`code_fix`]: its "Use ImmutableArray.Create" fix.
//! - [`quick_info`]: case lists for sum-type-like class hierarchies.
//! - [`code_actions`]: refactorings and fixes for a selection, filtered by config.

pub mod code_actions;
pub mod code_fix;
pub mod diagnostics;
pub mod quick_info;

pub use code_actions::{code_actions, CodeAction, CodeActionError, CodeActionKind};
pub use code_fix::{apply_code_fix, code_fixes, CodeFix, CodeFixError, USE_IMMUTABLE_ARRAY_CREATE_TITLE};
pub use diagnostics::{
    diagnostics, Diagnostic, DiagnosticDescriptor, Severity, BAD_IMMUTABLE_ARRAY_CREATION,
};
pub use quick_info::{quick_info, sum_type_cases, sum_type_quick_info, QuickInfo};
