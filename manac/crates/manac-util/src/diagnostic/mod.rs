//! Diagnostic model and sink.
//!
//! Every pipeline stage reports problems through a shared [`Handler`].
//! Stages never abort on the first error: they record a diagnostic,
//! recover, and keep going. The driver drains the sink at natural
//! boundaries (after parsing, after semantic analysis) and decides
//! whether emission may run.
//!
//! # Examples
//!
//! ```
//! use manac_util::{Handler, Span};
//!
//! let handler = Handler::new();
//! handler.error("unexpected token", Span::point(1, 5));
//!
//! assert!(handler.has_errors());
//! assert_eq!(handler.error_count(), 1);
//! ```

mod builder;
mod render;

pub use builder::DiagnosticBuilder;
pub use render::{render, render_all};

use crate::span::Span;
use std::cell::RefCell;
use std::fmt;

/// Diagnostic severity.
///
/// Only [`Level::Error`] prevents emission; the other levels are advisory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// Prevents emission.
    Error,
    /// Reported but does not prevent emission.
    Warning,
    /// Attached context for another diagnostic.
    Note,
    /// A suggestion for fixing an issue.
    Help,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
            Level::Note => write!(f, "note"),
            Level::Help => write!(f, "help"),
        }
    }
}

/// An additional labeled location attached to a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecondarySpan {
    pub span: Span,
    pub label: String,
}

/// A single diagnostic message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity level.
    pub level: Level,
    /// Main message.
    pub message: String,
    /// Primary source location; `span.len` controls caret width.
    pub span: Span,
    /// Optional code such as `E0003`.
    pub code: Option<String>,
    /// Optional free-form help text.
    pub help: Option<String>,
    /// Optional suggested replacement or fix.
    pub suggestion: Option<String>,
    /// Secondary locations rendered as labeled sub-blocks.
    pub related: Vec<SecondarySpan>,
}

impl Diagnostic {
    pub fn new(level: Level, message: impl Into<String>, span: Span) -> Self {
        Self {
            level,
            message: message.into(),
            span,
            code: None,
            help: None,
            suggestion: None,
            related: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self::new(Level::Error, message, span)
    }

    pub fn warning(message: impl Into<String>, span: Span) -> Self {
        Self::new(Level::Warning, message, span)
    }

    pub fn note(message: impl Into<String>, span: Span) -> Self {
        Self::new(Level::Note, message, span)
    }

    pub fn help(message: impl Into<String>, span: Span) -> Self {
        Self::new(Level::Help, message, span)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_related(mut self, span: Span, label: impl Into<String>) -> Self {
        self.related.push(SecondarySpan {
            span,
            label: label.into(),
        });
        self
    }
}

/// Sink that collects diagnostics in insertion order.
///
/// The handler is owned by the driver and borrowed by every stage; interior
/// mutability keeps the borrow shared while stages append.
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Handler {
    pub fn new() -> Self {
        Self {
            diagnostics: RefCell::new(Vec::new()),
        }
    }

    /// Report an error at `span`.
    pub fn error(&self, message: impl Into<String>, span: Span) {
        self.emit(Diagnostic::error(message, span));
    }

    /// Report a warning at `span`.
    pub fn warning(&self, message: impl Into<String>, span: Span) {
        self.emit(Diagnostic::warning(message, span));
    }

    /// Report a note at `span`.
    pub fn note(&self, message: impl Into<String>, span: Span) {
        self.emit(Diagnostic::note(message, span));
    }

    /// Report a help hint at `span`.
    pub fn help(&self, message: impl Into<String>, span: Span) {
        self.emit(Diagnostic::help(message, span));
    }

    /// Start a fluent error builder.
    pub fn build_error(&self, span: Span, message: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::error(message).span(span)
    }

    /// Start a fluent warning builder.
    pub fn build_warning(&self, span: Span, message: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::warning(message).span(span)
    }

    /// Append a pre-built diagnostic.
    pub fn emit(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|d| d.level == Level::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|d| d.level == Level::Warning)
    }

    pub fn has_any(&self) -> bool {
        !self.diagnostics.borrow().is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Warning)
            .count()
    }

    /// Clones out the collected diagnostics, preserving insertion order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    /// Drains the sink, leaving it empty.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.borrow_mut())
    }

    pub fn clear(&self) {
        self.diagnostics.borrow_mut().clear();
    }
}

impl Default for Handler {
    fn default() -> Self {
        Self::new()
    }
}
