//! manac-par - Parser for mana.
//!
//! Recursive descent over the token stream with precedence-climbing
//! expression tiers. The parser never panics on malformed input: each
//! error is recorded in the shared [`Handler`] and the parser
//! synchronizes — to the next declaration keyword at module scope, to the
//! next statement keyword inside a block — then keeps going. A failed
//! primary expression yields a placeholder `0` literal so the enclosing
//! construct can finish.

pub mod ast;
mod expr;
mod items;
mod pattern;
mod stmt;
mod types;

pub use ast::*;

use manac_lex::{Lexer, Token, TokenKind};
use manac_util::{Handler, Span};

/// Convenience entry point: lex and parse a full source string.
pub fn parse_source(source: &str, handler: &Handler) -> Module {
    let tokens = Lexer::new(source).tokenize();
    Parser::new(tokens, handler).parse_module()
}

/// The mana parser.
///
/// # Examples
///
/// ```
/// use manac_par::parse_source;
/// use manac_util::Handler;
///
/// let handler = Handler::new();
/// let module = parse_source("module m\nfn main() -> i32 { return 0 }", &handler);
/// assert_eq!(module.name, "m");
/// assert_eq!(module.decls.len(), 1);
/// assert!(!handler.has_errors());
/// ```
pub struct Parser<'a> {
    tokens: Vec<Token>,
    handler: &'a Handler,
    current: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, handler: &'a Handler) -> Self {
        Self {
            tokens,
            handler,
            current: 0,
        }
    }

    /// Parses `module NAME` followed by declarations to end of file.
    pub fn parse_module(&mut self) -> Module {
        self.expect(TokenKind::KwModule, "expected 'module'");
        self.expect(TokenKind::Identifier, "expected module name");
        let name = self.prev_lexeme();
        let span = self.previous().span;
        self.optional_semicolon();

        let mut decls = Vec::new();
        while !self.is_at_end() {
            match self.parse_declaration() {
                Some(decl) => decls.push(decl),
                None => self.synchronize(),
            }
        }

        Module { name, decls, span }
    }

    // -- token access -------------------------------------------------------

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    pub(crate) fn previous(&self) -> &Token {
        // Safe at position 0 (nothing consumed yet, e.g. a failed expect
        // on the very first token).
        &self.tokens[self.current.saturating_sub(1)]
    }

    /// Lexeme of the previously consumed token, cloned out.
    pub(crate) fn prev_lexeme(&self) -> String {
        self.previous().lexeme.clone()
    }

    pub(crate) fn prev_span(&self) -> Span {
        self.previous().span
    }

    pub(crate) fn peek_span(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    /// Looks one token past the current one.
    pub(crate) fn check_next(&self, kind: TokenKind) -> bool {
        self.kind_at(self.current + 1) == Some(kind)
    }

    pub(crate) fn kind_at(&self, index: usize) -> Option<TokenKind> {
        self.tokens.get(index).map(|t| t.kind)
    }

    pub(crate) fn position(&self) -> usize {
        self.current
    }

    pub(crate) fn rewind(&mut self, position: usize) {
        self.current = position;
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    /// Consumes the current token if it matches `kind`.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes the expected token or records an error at the current one.
    pub(crate) fn expect(&mut self, kind: TokenKind, msg: &str) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            self.handler.error(msg, self.peek().span);
            false
        }
    }

    /// Semicolons are optional in statement and declaration position.
    pub(crate) fn optional_semicolon(&mut self) {
        self.eat(TokenKind::Semicolon);
    }

    pub(crate) fn error(&self, msg: impl Into<String>, span: Span) {
        self.handler.error(msg, span);
    }

    // -- error recovery -----------------------------------------------------

    /// Module-level synchronization: advance until something that can start
    /// a declaration or statement.
    pub(crate) fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if matches!(
                self.previous().kind,
                TokenKind::Semicolon | TokenKind::RBrace
            ) {
                return;
            }
            match self.peek().kind {
                TokenKind::KwFn
                | TokenKind::KwStruct
                | TokenKind::KwEnum
                | TokenKind::KwVariant
                | TokenKind::KwTrait
                | TokenKind::KwImpl
                | TokenKind::KwLet
                | TokenKind::KwIf
                | TokenKind::KwWhile
                | TokenKind::KwFor
                | TokenKind::KwReturn
                | TokenKind::KwBreak
                | TokenKind::KwContinue
                | TokenKind::KwDefer => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Statement-level synchronization: advance to the next statement
    /// keyword within the current block, stopping at `;` or `}`.
    pub(crate) fn synchronize_stmt(&mut self) {
        while !self.is_at_end() && !self.check(TokenKind::RBrace) {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }
            if self.eat(TokenKind::Semicolon) {
                return;
            }
            match self.peek().kind {
                TokenKind::KwLet
                | TokenKind::KwIf
                | TokenKind::KwWhile
                | TokenKind::KwFor
                | TokenKind::KwReturn
                | TokenKind::KwBreak
                | TokenKind::KwContinue
                | TokenKind::KwDefer
                | TokenKind::KwLoop
                | TokenKind::KwScope
                | TokenKind::KwConst
                | TokenKind::KwMatch => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;

    /// Builds a parser over `source` for unit tests of sub-grammars.
    pub(crate) fn parser_for<'a>(source: &'a str, handler: &'a Handler) -> Parser<'a> {
        let tokens = Lexer::new(source).tokenize();
        Parser::new(tokens, handler)
    }

    /// Parses a module and asserts no syntax errors were reported.
    pub(crate) fn parse_ok(source: &str) -> Module {
        let handler = Handler::new();
        let module = parse_source(source, &handler);
        let errors: Vec<_> = handler
            .diagnostics()
            .into_iter()
            .filter(|d| d.level == manac_util::Level::Error)
            .collect();
        assert!(errors.is_empty(), "unexpected parse errors: {:?}", errors);
        module
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::parse_ok;

    #[test]
    fn test_empty_module() {
        let module = parse_ok("module empty");
        assert_eq!(module.name, "empty");
        assert!(module.decls.is_empty());
    }

    #[test]
    fn test_module_with_semicolon() {
        let module = parse_ok("module m;");
        assert_eq!(module.name, "m");
    }

    #[test]
    fn test_missing_module_header_recovers() {
        let handler = Handler::new();
        let module = parse_source("fn main() -> i32 { return 0 }", &handler);
        // Error recorded, parsing continued.
        assert!(handler.has_errors());
        assert_eq!(module.decls.len(), 1);
    }

    #[test]
    fn test_parser_terminates_on_garbage() {
        let handler = Handler::new();
        let module = parse_source("module m\n)))((( fn f() -> void {}", &handler);
        assert!(handler.has_errors());
        // The function after the garbage is still found.
        assert!(module
            .decls
            .iter()
            .any(|d| matches!(d, Decl::Function(f) if f.name == "f")));
    }

    #[test]
    fn test_sync_recovers_between_declarations() {
        let handler = Handler::new();
        let module = parse_source(
            "module m\nstruct { }\nfn ok() -> i32 { return 1 }",
            &handler,
        );
        assert!(handler.has_errors());
        assert!(module
            .decls
            .iter()
            .any(|d| matches!(d, Decl::Function(f) if f.name == "ok")));
    }
}
