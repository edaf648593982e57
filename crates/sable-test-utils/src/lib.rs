//! Utilities shared by Sable tests.
//!
//! Fixtures use rust-analyzer style headers (`//- /Class1.cs`) to split one string into
//! several documents, `$0`, `$1`, ... markers for caret positions and `[|...|]` for a
//! selected range.

mod markers;

pub use markers::{extract_range, strip_markers, try_extract_range};

#[cfg(feature = "fixture-fs")]
mod fixture_fs;

#[cfg(feature = "fixture-project")]
mod fixture_project;

#[cfg(feature = "fixture-fs")]
pub use fixture_fs::*;

#[cfg(feature = "fixture-project")]
pub use fixture_project::*;
