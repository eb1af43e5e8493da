//! Fluent construction of diagnostics.

use super::{Diagnostic, Handler, Level, SecondarySpan};
use crate::span::Span;

/// Builder for a [`Diagnostic`].
///
/// # Examples
///
/// ```
/// use manac_util::{DiagnosticBuilder, Handler, Span};
///
/// let handler = Handler::new();
/// DiagnosticBuilder::error("use of undeclared identifier 'printn'")
///     .span(Span::point(1, 30))
///     .code("E0004")
///     .suggestion("println")
///     .emit(&handler);
///
/// assert_eq!(handler.error_count(), 1);
/// ```
pub struct DiagnosticBuilder {
    diagnostic: Diagnostic,
}

impl DiagnosticBuilder {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            diagnostic: Diagnostic::new(level, message, Span::DUMMY),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Level::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Level::Warning, message)
    }

    pub fn note(message: impl Into<String>) -> Self {
        Self::new(Level::Note, message)
    }

    pub fn help_hint(message: impl Into<String>) -> Self {
        Self::new(Level::Help, message)
    }

    pub fn span(mut self, span: Span) -> Self {
        self.diagnostic.span = span;
        self
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.diagnostic.code = Some(code.into());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.diagnostic.help = Some(help.into());
        self
    }

    pub fn suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.diagnostic.suggestion = Some(suggestion.into());
        self
    }

    pub fn related(mut self, span: Span, label: impl Into<String>) -> Self {
        self.diagnostic.related.push(SecondarySpan {
            span,
            label: label.into(),
        });
        self
    }

    /// Finish building and return the diagnostic without emitting it.
    pub fn build(self) -> Diagnostic {
        self.diagnostic
    }

    /// Finish building and push the diagnostic into `handler`.
    pub fn emit(self, handler: &Handler) {
        handler.emit(self.diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_build() {
        let diag = DiagnosticBuilder::error("bad")
            .span(Span::point(4, 2))
            .code("E0001")
            .build();
        assert_eq!(diag.level, Level::Error);
        assert_eq!(diag.span, Span::point(4, 2));
        assert_eq!(diag.code.as_deref(), Some("E0001"));
    }

    #[test]
    fn test_builder_emit() {
        let handler = Handler::new();
        DiagnosticBuilder::warning("meh")
            .span(Span::DUMMY)
            .emit(&handler);
        assert_eq!(handler.warning_count(), 1);
    }

    #[test]
    fn test_builder_related() {
        let diag = DiagnosticBuilder::error("clash")
            .related(Span::point(1, 1), "first defined here")
            .build();
        assert_eq!(diag.related.len(), 1);
    }
}
