//! The scanner: characters in, tokens out.
//!
//! Direct-coded lexer with a dispatch on the first character of each
//! token and longest-match disambiguation for multi-character operators
//! (`*` → `**` → `**=`, `?` → `??`/`?.`, `.` → `..` → `..=`, ...).

use manac_util::Span;

use crate::cursor::Cursor;
use crate::token::{keyword_from_str, Token, TokenKind};

/// The mana lexer.
///
/// # Examples
///
/// ```
/// use manac_lex::{Lexer, TokenKind};
///
/// let tokens = Lexer::new("let x = 42").tokenize();
/// let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
/// assert_eq!(
///     kinds,
///     vec![
///         TokenKind::KwLet,
///         TokenKind::Identifier,
///         TokenKind::Assign,
///         TokenKind::IntLiteral,
///         TokenKind::Eof,
///     ]
/// );
/// ```
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    /// Scans the entire input. The returned stream always ends with an
    /// [`TokenKind::Eof`] token; invalid characters are skipped.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments();
            if self.cursor.is_at_end() {
                break;
            }

            let line = self.cursor.line();
            let column = self.cursor.column();
            let start = self.cursor.position();

            if let Some((kind, lexeme)) = self.scan_token(start) {
                let len = self.cursor.slice_from(start).chars().count().max(1) as u32;
                tokens.push(Token::new(kind, lexeme, Span::new(line, column, len)));
            }
        }

        let eof_span = Span::point(self.cursor.line(), self.cursor.column());
        tokens.push(Token::new(TokenKind::Eof, "", eof_span));
        tokens
    }

    /// Skips whitespace, `//` line comments, and `/* */` block comments
    /// (no nesting). Stops in front of `///` so the dispatcher can turn it
    /// into a [`TokenKind::DocComment`].
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            let c = self.cursor.current();
            if c == ' ' || c == '\t' || c == '\r' || c == '\n' {
                self.cursor.advance();
            } else if c == '/' && self.cursor.peek(1) == '/' {
                if self.cursor.peek(2) == '/' {
                    // Doc comment, handled by the dispatcher.
                    break;
                }
                while !self.cursor.is_at_end() && self.cursor.current() != '\n' {
                    self.cursor.advance();
                }
            } else if c == '/' && self.cursor.peek(1) == '*' {
                self.cursor.advance();
                self.cursor.advance();
                while !self.cursor.is_at_end() {
                    if self.cursor.current() == '*' && self.cursor.peek(1) == '/' {
                        self.cursor.advance();
                        self.cursor.advance();
                        break;
                    }
                    self.cursor.advance();
                }
            } else {
                break;
            }
        }
    }

    /// Scans one token starting at `start`. Returns `None` when the
    /// character has no token interpretation; the cursor has already moved
    /// past it.
    fn scan_token(&mut self, start: usize) -> Option<(TokenKind, String)> {
        let c = self.cursor.advance();
        let token = match c {
            '(' => (TokenKind::LParen, "(".into()),
            ')' => (TokenKind::RParen, ")".into()),
            '{' => (TokenKind::LBrace, "{".into()),
            '}' => (TokenKind::RBrace, "}".into()),
            '[' => (TokenKind::LBracket, "[".into()),
            ']' => (TokenKind::RBracket, "]".into()),
            ',' => (TokenKind::Comma, ",".into()),
            ';' => (TokenKind::Semicolon, ";".into()),
            '~' => (TokenKind::Tilde, "~".into()),
            '#' => (TokenKind::Hash, "#".into()),

            '?' => {
                if self.cursor.eat('?') {
                    (TokenKind::QuestionQuestion, "??".into())
                } else if self.cursor.eat('.') {
                    (TokenKind::QuestionDot, "?.".into())
                } else {
                    (TokenKind::Question, "?".into())
                }
            }
            ':' => {
                if self.cursor.eat(':') {
                    (TokenKind::ColonColon, "::".into())
                } else {
                    (TokenKind::Colon, ":".into())
                }
            }
            '.' => {
                if self.cursor.eat('.') {
                    if self.cursor.eat('=') {
                        (TokenKind::DotDotEq, "..=".into())
                    } else {
                        (TokenKind::DotDot, "..".into())
                    }
                } else {
                    (TokenKind::Dot, ".".into())
                }
            }
            '+' => {
                if self.cursor.eat('+') {
                    (TokenKind::PlusPlus, "++".into())
                } else if self.cursor.eat('=') {
                    (TokenKind::PlusEq, "+=".into())
                } else {
                    (TokenKind::Plus, "+".into())
                }
            }
            '-' => {
                if self.cursor.eat('-') {
                    (TokenKind::MinusMinus, "--".into())
                } else if self.cursor.eat('=') {
                    (TokenKind::MinusEq, "-=".into())
                } else if self.cursor.eat('>') {
                    (TokenKind::Arrow, "->".into())
                } else {
                    (TokenKind::Minus, "-".into())
                }
            }
            '*' => {
                if self.cursor.eat('*') {
                    if self.cursor.eat('=') {
                        (TokenKind::StarStarEq, "**=".into())
                    } else {
                        (TokenKind::StarStar, "**".into())
                    }
                } else if self.cursor.eat('=') {
                    (TokenKind::StarEq, "*=".into())
                } else {
                    (TokenKind::Star, "*".into())
                }
            }
            '/' => {
                if self.cursor.current() == '/' && self.cursor.peek(1) == '/' {
                    self.cursor.advance();
                    self.cursor.advance();
                    return Some(self.lex_doc_comment());
                } else if self.cursor.eat('=') {
                    (TokenKind::SlashEq, "/=".into())
                } else {
                    (TokenKind::Slash, "/".into())
                }
            }
            '%' => {
                if self.cursor.eat('=') {
                    (TokenKind::PercentEq, "%=".into())
                } else {
                    (TokenKind::Percent, "%".into())
                }
            }
            '=' => {
                if self.cursor.eat('=') {
                    (TokenKind::EqEq, "==".into())
                } else if self.cursor.eat('>') {
                    (TokenKind::FatArrow, "=>".into())
                } else {
                    (TokenKind::Assign, "=".into())
                }
            }
            '!' => {
                if self.cursor.eat('=') {
                    (TokenKind::BangEq, "!=".into())
                } else {
                    (TokenKind::Bang, "!".into())
                }
            }
            '<' => {
                if self.cursor.eat('<') {
                    if self.cursor.eat('=') {
                        (TokenKind::ShlEq, "<<=".into())
                    } else {
                        (TokenKind::Shl, "<<".into())
                    }
                } else if self.cursor.eat('=') {
                    (TokenKind::LessEq, "<=".into())
                } else {
                    (TokenKind::Less, "<".into())
                }
            }
            '>' => {
                if self.cursor.eat('>') {
                    if self.cursor.eat('=') {
                        (TokenKind::ShrEq, ">>=".into())
                    } else {
                        (TokenKind::Shr, ">>".into())
                    }
                } else if self.cursor.eat('=') {
                    (TokenKind::GreaterEq, ">=".into())
                } else {
                    (TokenKind::Greater, ">".into())
                }
            }
            '&' => {
                if self.cursor.eat('&') {
                    (TokenKind::AndAnd, "&&".into())
                } else if self.cursor.eat('=') {
                    (TokenKind::AmpEq, "&=".into())
                } else {
                    (TokenKind::Amp, "&".into())
                }
            }
            '|' => {
                if self.cursor.eat('|') {
                    (TokenKind::OrOr, "||".into())
                } else if self.cursor.eat('=') {
                    (TokenKind::PipeEq, "|=".into())
                } else {
                    (TokenKind::Pipe, "|".into())
                }
            }
            '^' => {
                if self.cursor.eat('=') {
                    (TokenKind::CaretEq, "^=".into())
                } else {
                    (TokenKind::Caret, "^".into())
                }
            }

            '\'' => self.lex_char(),
            '"' => {
                if self.cursor.current() == '"' && self.cursor.peek(1) == '"' {
                    self.cursor.advance();
                    self.cursor.advance();
                    self.lex_multiline_string()
                } else {
                    self.lex_string()
                }
            }
            'f' if self.cursor.current() == '"' => {
                self.cursor.advance();
                self.lex_fstring()
            }
            'r' if self.cursor.current() == '"' => {
                self.cursor.advance();
                self.lex_raw_string()
            }

            c if c.is_ascii_digit() => self.lex_number(start),
            c if is_ident_start(c) => self.lex_identifier_or_keyword(start),

            // Invalid character: no token, cursor already advanced.
            _ => return None,
        };
        Some(token)
    }

    fn lex_doc_comment(&mut self) -> (TokenKind, String) {
        while self.cursor.current() == ' ' || self.cursor.current() == '\t' {
            self.cursor.advance();
        }
        let mut doc = String::new();
        while !self.cursor.is_at_end() && self.cursor.current() != '\n' {
            doc.push(self.cursor.advance());
        }
        (TokenKind::DocComment, doc)
    }

    fn lex_identifier_or_keyword(&mut self, start: usize) -> (TokenKind, String) {
        while is_ident_continue(self.cursor.current()) {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(start);
        if text == "_" {
            return (TokenKind::Underscore, "_".into());
        }
        match keyword_from_str(text) {
            Some(kind) => (kind, text.into()),
            None => (TokenKind::Identifier, text.into()),
        }
    }

    /// Scans a numeric literal whose first digit has been consumed.
    ///
    /// Radix-prefixed integers (`0b`, `0o`, `0x`) are decoded and stored
    /// as decimal text; underscore separators are stripped everywhere.
    fn lex_number(&mut self, start: usize) -> (TokenKind, String) {
        let first = self.cursor.slice_from(start).chars().next().unwrap_or('0');
        if first == '0' {
            match self.cursor.current() {
                'b' | 'B' => {
                    self.cursor.advance();
                    while matches!(self.cursor.current(), '0' | '1' | '_') {
                        self.cursor.advance();
                    }
                    return (TokenKind::IntLiteral, decode_radix(self.cursor.slice_from(start), 2));
                }
                'o' | 'O' => {
                    self.cursor.advance();
                    while matches!(self.cursor.current(), '0'..='7' | '_') {
                        self.cursor.advance();
                    }
                    return (TokenKind::IntLiteral, decode_radix(self.cursor.slice_from(start), 8));
                }
                'x' | 'X' => {
                    self.cursor.advance();
                    while self.cursor.current().is_ascii_hexdigit() || self.cursor.current() == '_'
                    {
                        self.cursor.advance();
                    }
                    return (TokenKind::IntLiteral, decode_radix(self.cursor.slice_from(start), 16));
                }
                _ => {}
            }
        }

        let mut is_float = false;
        while self.cursor.current().is_ascii_digit() || self.cursor.current() == '_' {
            self.cursor.advance();
        }
        if self.cursor.current() == '.' && self.cursor.peek(1).is_ascii_digit() {
            is_float = true;
            self.cursor.advance();
            while self.cursor.current().is_ascii_digit() || self.cursor.current() == '_' {
                self.cursor.advance();
            }
        }
        if matches!(self.cursor.current(), 'e' | 'E') {
            is_float = true;
            self.cursor.advance();
            if matches!(self.cursor.current(), '+' | '-') {
                self.cursor.advance();
            }
            while self.cursor.current().is_ascii_digit() {
                self.cursor.advance();
            }
        }

        let text: String = self
            .cursor
            .slice_from(start)
            .chars()
            .filter(|&c| c != '_')
            .collect();
        let kind = if is_float {
            TokenKind::FloatLiteral
        } else {
            TokenKind::IntLiteral
        };
        (kind, text)
    }

    /// Scans a plain string; the opening quote has been consumed. The
    /// lexeme is the unescaped payload.
    fn lex_string(&mut self) -> (TokenKind, String) {
        let payload = self.lex_quoted_payload(false);
        (TokenKind::StrLiteral, payload)
    }

    /// Scans an f-string; `f"` has been consumed. Same escapes as a plain
    /// string plus `\{` and `\}` for literal braces. The parser splits the
    /// payload into literal and embedded segments.
    fn lex_fstring(&mut self) -> (TokenKind, String) {
        let payload = self.lex_quoted_payload(true);
        (TokenKind::FStrLiteral, payload)
    }

    fn lex_quoted_payload(&mut self, braces: bool) -> String {
        let mut s = String::new();
        while !self.cursor.is_at_end() && self.cursor.current() != '"' {
            if self.cursor.current() == '\\' {
                self.cursor.advance();
                if self.cursor.is_at_end() {
                    break;
                }
                let escaped = self.cursor.advance();
                match escaped {
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    'r' => s.push('\r'),
                    '\\' => s.push('\\'),
                    '"' => s.push('"'),
                    '0' => s.push('\0'),
                    '{' if braces => s.push('{'),
                    '}' if braces => s.push('}'),
                    other => s.push(other),
                }
            } else {
                s.push(self.cursor.advance());
            }
        }
        self.cursor.eat('"');
        s
    }

    /// Scans a raw string; `r"` has been consumed. No escape processing.
    fn lex_raw_string(&mut self) -> (TokenKind, String) {
        let mut s = String::new();
        while !self.cursor.is_at_end() && self.cursor.current() != '"' {
            s.push(self.cursor.advance());
        }
        self.cursor.eat('"');
        (TokenKind::RawStrLiteral, s)
    }

    /// Scans a triple-quoted string; the opening `"""` has been consumed.
    /// Newlines are preserved; the string ends only on a closing `"""`.
    fn lex_multiline_string(&mut self) -> (TokenKind, String) {
        let mut s = String::new();
        while !self.cursor.is_at_end() {
            if self.cursor.current() == '"'
                && self.cursor.peek(1) == '"'
                && self.cursor.peek(2) == '"'
            {
                self.cursor.advance();
                self.cursor.advance();
                self.cursor.advance();
                return (TokenKind::MultilineStrLiteral, s);
            }
            s.push(self.cursor.advance());
        }
        // Unterminated: everything to end of input.
        (TokenKind::MultilineStrLiteral, s)
    }

    /// Scans a char literal; the opening quote has been consumed.
    fn lex_char(&mut self) -> (TokenKind, String) {
        if self.cursor.is_at_end() {
            return (TokenKind::CharLiteral, String::new());
        }
        let ch = if self.cursor.current() == '\\' {
            self.cursor.advance();
            if self.cursor.is_at_end() {
                '\\'
            } else {
                match self.cursor.advance() {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '0' => '\0',
                    '\'' => '\'',
                    '\\' => '\\',
                    other => other,
                }
            }
        } else {
            self.cursor.advance()
        };
        self.cursor.eat('\'');
        (TokenKind::CharLiteral, ch.to_string())
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn decode_radix(text: &str, radix: u32) -> String {
    let digits: String = text
        .chars()
        .skip(2)
        .filter(|&c| c != '_')
        .collect();
    i64::from_str_radix(&digits, radix)
        .map(|v| v.to_string())
        .unwrap_or_else(|_| "0".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .iter()
            .map(|t| t.kind)
            .collect()
    }

    fn lexemes(source: &str) -> Vec<String> {
        Lexer::new(source)
            .tokenize()
            .iter()
            .map(|t| t.lexeme.clone())
            .collect()
    }

    #[test]
    fn test_empty_input_yields_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("fn main self selfmade"),
            vec![
                TokenKind::KwFn,
                TokenKind::Identifier,
                TokenKind::KwSelf,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_underscore_is_wildcard() {
        assert_eq!(
            kinds("_ _x"),
            vec![TokenKind::Underscore, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn test_integer_literals() {
        assert_eq!(lexemes("42 1_000")[..2], ["42", "1000"]);
        assert_eq!(lexemes("0xFF 0b1010 0o755")[..3], ["255", "10", "493"]);
    }

    #[test]
    fn test_float_literals() {
        let toks = Lexer::new("3.14 1e10 2.5e-3 1_0.5").tokenize();
        assert_eq!(toks[0].kind, TokenKind::FloatLiteral);
        assert_eq!(toks[0].lexeme, "3.14");
        assert_eq!(toks[1].kind, TokenKind::FloatLiteral);
        assert_eq!(toks[1].lexeme, "1e10");
        assert_eq!(toks[2].kind, TokenKind::FloatLiteral);
        assert_eq!(toks[2].lexeme, "2.5e-3");
        assert_eq!(toks[3].lexeme, "10.5");
    }

    #[test]
    fn test_int_dot_method_not_float() {
        // `1.max(2)`-style: dot not followed by digit stays a Dot token.
        assert_eq!(
            kinds("1.x"),
            vec![
                TokenKind::IntLiteral,
                TokenKind::Dot,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        let toks = Lexer::new(r#""a\nb\t\"c\"""#).tokenize();
        assert_eq!(toks[0].kind, TokenKind::StrLiteral);
        assert_eq!(toks[0].lexeme, "a\nb\t\"c\"");
    }

    #[test]
    fn test_raw_string_keeps_backslashes() {
        let toks = Lexer::new(r#"r"a\nb""#).tokenize();
        assert_eq!(toks[0].kind, TokenKind::RawStrLiteral);
        assert_eq!(toks[0].lexeme, r"a\nb");
    }

    #[test]
    fn test_multiline_string() {
        let toks = Lexer::new("\"\"\"line1\nline2\"\"\" x").tokenize();
        assert_eq!(toks[0].kind, TokenKind::MultilineStrLiteral);
        assert_eq!(toks[0].lexeme, "line1\nline2");
        assert_eq!(toks[1].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_fstring_token() {
        let toks = Lexer::new(r#"f"x = {x}""#).tokenize();
        assert_eq!(toks[0].kind, TokenKind::FStrLiteral);
        assert_eq!(toks[0].lexeme, "x = {x}");
    }

    #[test]
    fn test_f_identifier_without_quote() {
        assert_eq!(
            kinds("f foo"),
            vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn test_char_literal() {
        let toks = Lexer::new(r"'a' '\n' '\''").tokenize();
        assert_eq!(toks[0].kind, TokenKind::CharLiteral);
        assert_eq!(toks[0].lexeme, "a");
        assert_eq!(toks[1].lexeme, "\n");
        assert_eq!(toks[2].lexeme, "'");
    }

    #[test]
    fn test_operator_longest_match() {
        assert_eq!(
            kinds("* ** **= < << <<= <= ? ?. ?? . .. ..="),
            vec![
                TokenKind::Star,
                TokenKind::StarStar,
                TokenKind::StarStarEq,
                TokenKind::Less,
                TokenKind::Shl,
                TokenKind::ShlEq,
                TokenKind::LessEq,
                TokenKind::Question,
                TokenKind::QuestionDot,
                TokenKind::QuestionQuestion,
                TokenKind::Dot,
                TokenKind::DotDot,
                TokenKind::DotDotEq,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_compound_assign_operators() {
        assert_eq!(
            kinds("+= -= *= /= %= &= |= ^= <<= >>= ++ --"),
            vec![
                TokenKind::PlusEq,
                TokenKind::MinusEq,
                TokenKind::StarEq,
                TokenKind::SlashEq,
                TokenKind::PercentEq,
                TokenKind::AmpEq,
                TokenKind::PipeEq,
                TokenKind::CaretEq,
                TokenKind::ShlEq,
                TokenKind::ShrEq,
                TokenKind::PlusPlus,
                TokenKind::MinusMinus,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_arrows_and_colons() {
        assert_eq!(
            kinds(":: : -> =>"),
            vec![
                TokenKind::ColonColon,
                TokenKind::Colon,
                TokenKind::Arrow,
                TokenKind::FatArrow,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_skipped() {
        assert_eq!(
            kinds("a // comment\nb /* block\ncomment */ c"),
            vec![
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_doc_comment_token() {
        let toks = Lexer::new("/// Adds two numbers.\nfn").tokenize();
        assert_eq!(toks[0].kind, TokenKind::DocComment);
        assert_eq!(toks[0].lexeme, "Adds two numbers.");
        assert_eq!(toks[1].kind, TokenKind::KwFn);
    }

    #[test]
    fn test_invalid_characters_skipped() {
        assert_eq!(
            kinds("a @ $ b"),
            vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn test_positions() {
        let toks = Lexer::new("fn\n  main").tokenize();
        assert_eq!((toks[0].span.line, toks[0].span.column), (1, 1));
        assert_eq!((toks[1].span.line, toks[1].span.column), (2, 3));
    }

    #[test]
    fn test_unterminated_string_is_total() {
        let toks = Lexer::new("\"abc").tokenize();
        assert_eq!(toks[0].kind, TokenKind::StrLiteral);
        assert_eq!(toks[0].lexeme, "abc");
        assert_eq!(toks.last().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn test_hash_attribute_tokens() {
        assert_eq!(
            kinds("#[test]"),
            vec![
                TokenKind::Hash,
                TokenKind::LBracket,
                TokenKind::Identifier,
                TokenKind::RBracket,
                TokenKind::Eof,
            ]
        );
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Lexer totality: any input terminates and ends with Eof.
            #[test]
            fn lexing_terminates_with_eof(input in ".{0,400}") {
                let tokens = Lexer::new(&input).tokenize();
                prop_assert!(!tokens.is_empty());
                prop_assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
            }

            // Only the final token is Eof.
            #[test]
            fn eof_is_unique_and_last(input in "[a-z0-9+*<>=(){}\\[\\]\\s\"']{0,200}") {
                let tokens = Lexer::new(&input).tokenize();
                let eof_count = tokens.iter().filter(|t| t.kind == TokenKind::Eof).count();
                prop_assert_eq!(eof_count, 1);
            }
        }
    }
}
