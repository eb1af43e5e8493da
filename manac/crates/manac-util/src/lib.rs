//! manac-util - Foundation types for the mana compiler.
//!
//! This crate holds everything the pipeline crates share: source spans,
//! the diagnostic model and its sink, the terminal renderer for
//! diagnostics, and the edit-distance machinery behind "did you mean"
//! suggestions. It has no dependencies on the rest of the compiler.

pub mod diagnostic;
pub mod span;
pub mod suggest;

pub use diagnostic::{Diagnostic, DiagnosticBuilder, Handler, Level, SecondarySpan};
pub use span::Span;
pub use suggest::{find_similar, levenshtein};
