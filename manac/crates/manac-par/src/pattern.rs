//! Match/when expression and pattern parsing.
//!
//! `match` and `when` differ only in surface syntax: `match` arms use `=>`
//! and require comma separators, `when` arms use `->` with optional
//! commas. Patterns cover wildcards, literals, ranges, identifier
//! constants, Option/Result constructors (both capitalizations), and enum
//! variants with tuple or struct destructuring.

use manac_lex::TokenKind;

use crate::ast::*;
use crate::Parser;

/// Constructor names recognized as Option/Result patterns; the runtime
/// accepts both capitalizations, so the parser does too.
pub(crate) fn is_option_constructor(name: &str) -> bool {
    matches!(name, "Some" | "Ok" | "Err" | "some" | "ok" | "err")
}

impl<'a> Parser<'a> {
    /// Parses the body of a `match`/`when` expression; the keyword has been
    /// consumed.
    pub(crate) fn parse_match_expression(&mut self, when_style: bool) -> Expr {
        let span = self.prev_span();

        // Scrutinee; an identifier directly followed by '{' belongs to the
        // match body, not a struct literal. A parenthesized scrutinee is
        // parsed in full.
        let scrutinee = if self.check(TokenKind::Identifier) && self.check_next(TokenKind::LBrace)
        {
            self.advance();
            Expr::Identifier(IdentExpr {
                name: self.prev_lexeme(),
                span: self.prev_span(),
            })
        } else if self.eat(TokenKind::LParen) {
            let value = self.parse_expression();
            self.expect(TokenKind::RParen, "expected ')' after match value");
            value
        } else {
            self.parse_logical_or()
        };

        let mut match_expr = MatchExpr {
            scrutinee: Box::new(scrutinee),
            arms: Vec::new(),
            has_wildcard: false,
            when_style,
            span,
        };

        self.expect(TokenKind::LBrace, "expected '{' after match value");

        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            let arm_span = self.peek_span();
            let mut patterns = Vec::new();
            let mut binding = None;

            match self.parse_arm_pattern(&mut match_expr.has_wildcard) {
                ArmPattern::Pattern(p) => patterns.push(p),
                ArmPattern::Binding(name) => {
                    binding = Some(name);
                    match_expr.has_wildcard = true;
                }
                ArmPattern::Failed => return Expr::Match(match_expr),
            }

            // Or-patterns: p1 | p2 | ...
            while self.eat(TokenKind::Pipe) {
                match self.parse_or_pattern_alternative(&mut match_expr.has_wildcard) {
                    Some(p) => patterns.push(p),
                    None => break,
                }
            }

            // Optional guard.
            let guard = if self.eat(TokenKind::KwIf) {
                Some(self.parse_expression())
            } else {
                None
            };

            if when_style {
                self.expect(TokenKind::Arrow, "expected '->' after pattern");
            } else {
                self.expect(TokenKind::FatArrow, "expected '=>' after pattern");
            }

            let body = self.parse_expression();
            match_expr.arms.push(MatchArm {
                patterns,
                guard,
                body,
                binding,
                span: arm_span,
            });

            if !self.check(TokenKind::RBrace) {
                if when_style {
                    self.eat(TokenKind::Comma);
                } else {
                    self.expect(TokenKind::Comma, "expected ',' after match arm");
                }
            } else {
                self.eat(TokenKind::Comma);
            }
        }

        self.expect(TokenKind::RBrace, "expected '}' after match arms");
        Expr::Match(match_expr)
    }

    fn parse_arm_pattern(&mut self, has_wildcard: &mut bool) -> ArmPattern {
        if self.eat(TokenKind::KwNone) {
            return ArmPattern::Pattern(Pattern::Option {
                constructor: "None".into(),
                binding: None,
                span: self.prev_span(),
            });
        }

        if self.eat(TokenKind::Underscore) {
            *has_wildcard = true;
            return ArmPattern::Pattern(Pattern::Wildcard(self.prev_span()));
        }

        if self.eat(TokenKind::Identifier) {
            let name = self.prev_lexeme();
            let span = self.prev_span();

            // Some(x) / Ok(x) / Err(e), lowercase spellings included.
            if is_option_constructor(&name) && self.check(TokenKind::LParen) {
                self.advance();
                self.expect(
                    TokenKind::Identifier,
                    "expected binding variable name in pattern",
                );
                let binding = self.prev_lexeme();
                self.expect(TokenKind::RParen, "expected ')' after binding variable");
                return ArmPattern::Pattern(Pattern::Option {
                    constructor: name,
                    binding: Some(binding),
                    span,
                });
            }

            // Enum::Variant with optional tuple or struct destructuring.
            if self.eat(TokenKind::ColonColon) {
                self.expect(TokenKind::Identifier, "expected variant name after '::'");
                let variant = self.prev_lexeme();

                let mut bindings = Vec::new();
                let mut field_bindings = Vec::new();
                let mut tuple_form = true;

                if self.eat(TokenKind::LParen) {
                    while !self.check(TokenKind::RParen) && !self.is_at_end() {
                        if self.eat(TokenKind::Underscore) {
                            bindings.push("_".to_string());
                        } else if self.expect(
                            TokenKind::Identifier,
                            "expected binding name in pattern",
                        ) {
                            bindings.push(self.prev_lexeme());
                        } else {
                            break;
                        }
                        if !self.check(TokenKind::RParen) {
                            self.expect(TokenKind::Comma, "expected ',' between pattern bindings");
                        }
                    }
                    self.expect(TokenKind::RParen, "expected ')' after pattern bindings");
                } else if self.eat(TokenKind::LBrace) {
                    tuple_form = false;
                    while !self.check(TokenKind::RBrace) && !self.is_at_end() {
                        if !self.expect(TokenKind::Identifier, "expected field name in pattern") {
                            break;
                        }
                        let field = self.prev_lexeme();
                        // `field: name` rebinds; bare `field` binds under
                        // its own name.
                        let bound = if self.eat(TokenKind::Colon) {
                            self.expect(TokenKind::Identifier, "expected binding name after ':'");
                            self.prev_lexeme()
                        } else {
                            field.clone()
                        };
                        field_bindings.push((field, bound));
                        if !self.check(TokenKind::RBrace) {
                            self.expect(TokenKind::Comma, "expected ',' between field bindings");
                        }
                    }
                    self.expect(TokenKind::RBrace, "expected '}' after field bindings");
                }

                return ArmPattern::Pattern(Pattern::EnumVariant {
                    enum_name: name,
                    variant,
                    bindings,
                    field_bindings,
                    tuple_form,
                    span,
                });
            }

            // Identifier directly before a guard or arrow is a bare-binding
            // arm; anything else compares against a constant.
            if self.check(TokenKind::KwIf)
                || self.check(TokenKind::FatArrow)
                || self.check(TokenKind::Arrow)
            {
                if name
                    .chars()
                    .next()
                    .map(|c| c.is_ascii_lowercase())
                    .unwrap_or(false)
                {
                    return ArmPattern::Binding(name);
                }
            }

            return ArmPattern::Pattern(Pattern::Ident(IdentExpr { name, span }));
        }

        if self.eat(TokenKind::IntLiteral) || self.eat(TokenKind::FloatLiteral) {
            let lit = LiteralExpr {
                value: self.prev_lexeme(),
                kind: LiteralKind::Number,
                span: self.prev_span(),
            };

            // Range pattern: lo..hi / lo..=hi
            if self.check(TokenKind::DotDot) || self.check(TokenKind::DotDotEq) {
                let inclusive = self.check(TokenKind::DotDotEq);
                self.advance();
                let span = lit.span;
                if self.eat(TokenKind::IntLiteral) || self.eat(TokenKind::FloatLiteral) {
                    let end = LiteralExpr {
                        value: self.prev_lexeme(),
                        kind: LiteralKind::Number,
                        span: self.prev_span(),
                    };
                    return ArmPattern::Pattern(Pattern::Range {
                        start: lit,
                        end,
                        inclusive,
                        span,
                    });
                }
                self.error("expected number after range operator", self.peek_span());
                return ArmPattern::Pattern(Pattern::Literal(lit));
            }

            return ArmPattern::Pattern(Pattern::Literal(lit));
        }

        if self.eat(TokenKind::StrLiteral) {
            return ArmPattern::Pattern(Pattern::Literal(LiteralExpr {
                value: self.prev_lexeme(),
                kind: LiteralKind::Str,
                span: self.prev_span(),
            }));
        }

        if self.eat(TokenKind::KwTrue) || self.eat(TokenKind::KwFalse) {
            return ArmPattern::Pattern(Pattern::Literal(LiteralExpr {
                value: self.prev_lexeme(),
                kind: LiteralKind::Bool,
                span: self.prev_span(),
            }));
        }

        self.error("expected pattern in match arm", self.peek_span());
        ArmPattern::Failed
    }

    /// Parses one alternative after `|` in an or-pattern. Narrower than a
    /// leading pattern: no destructuring forms.
    fn parse_or_pattern_alternative(&mut self, has_wildcard: &mut bool) -> Option<Pattern> {
        if self.eat(TokenKind::KwNone) {
            return Some(Pattern::Option {
                constructor: "None".into(),
                binding: None,
                span: self.prev_span(),
            });
        }
        if self.eat(TokenKind::Underscore) {
            *has_wildcard = true;
            return Some(Pattern::Wildcard(self.prev_span()));
        }
        if self.eat(TokenKind::IntLiteral) || self.eat(TokenKind::FloatLiteral) {
            return Some(Pattern::Literal(LiteralExpr {
                value: self.prev_lexeme(),
                kind: LiteralKind::Number,
                span: self.prev_span(),
            }));
        }
        if self.eat(TokenKind::StrLiteral) {
            return Some(Pattern::Literal(LiteralExpr {
                value: self.prev_lexeme(),
                kind: LiteralKind::Str,
                span: self.prev_span(),
            }));
        }
        if self.eat(TokenKind::KwTrue) || self.eat(TokenKind::KwFalse) {
            return Some(Pattern::Literal(LiteralExpr {
                value: self.prev_lexeme(),
                kind: LiteralKind::Bool,
                span: self.prev_span(),
            }));
        }
        if self.eat(TokenKind::Identifier) {
            let name = self.prev_lexeme();
            let span = self.prev_span();

            if self.eat(TokenKind::ColonColon) {
                self.expect(TokenKind::Identifier, "expected variant name after '::'");
                let variant = self.prev_lexeme();
                return Some(Pattern::EnumVariant {
                    enum_name: name,
                    variant,
                    bindings: Vec::new(),
                    field_bindings: Vec::new(),
                    tuple_form: true,
                    span,
                });
            }

            return Some(Pattern::Ident(IdentExpr { name, span }));
        }

        self.error("expected pattern after '|'", self.peek_span());
        None
    }
}

enum ArmPattern {
    Pattern(Pattern),
    Binding(String),
    Failed,
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::test_util::parse_ok;

    fn match_of(source: &str) -> MatchExpr {
        let module = parse_ok(&format!(
            "module m\nfn f() -> void {{\nlet v = {}\n}}",
            source
        ));
        match module.decls.into_iter().next().unwrap() {
            Decl::Function(f) => match f.body.unwrap().stmts.into_iter().next().unwrap() {
                Stmt::Let(l) => match l.init.unwrap() {
                    Expr::Match(m) => m,
                    other => panic!("expected match, got {:?}", other),
                },
                other => panic!("expected let, got {:?}", other),
            },
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_literal_arms_and_wildcard() {
        let m = match_of("match x { 1 => 10, 2 => 20, _ => 0 }");
        assert_eq!(m.arms.len(), 3);
        assert!(m.has_wildcard);
        assert!(m.arms[2].patterns[0].is_wildcard());
    }

    #[test]
    fn test_or_patterns() {
        let m = match_of("match x { 1 | 2 | 3 => 1, _ => 0 }");
        assert_eq!(m.arms[0].patterns.len(), 3);
    }

    #[test]
    fn test_range_patterns() {
        let m = match_of("match x { 0..5 => 1, 5..=9 => 2, _ => 0 }");
        assert!(matches!(
            &m.arms[0].patterns[0],
            Pattern::Range { inclusive: false, .. }
        ));
        assert!(matches!(
            &m.arms[1].patterns[0],
            Pattern::Range { inclusive: true, .. }
        ));
    }

    #[test]
    fn test_option_patterns_both_spellings() {
        let m = match_of("match o { Some(v) => v, None => 0 }");
        assert!(matches!(
            &m.arms[0].patterns[0],
            Pattern::Option { constructor, binding: Some(b), .. }
                if constructor == "Some" && b == "v"
        ));
        let m = match_of("match r { ok(v) => v, err(e) => 0 }");
        assert!(matches!(
            &m.arms[0].patterns[0],
            Pattern::Option { constructor, .. } if constructor == "ok"
        ));
        assert!(matches!(
            &m.arms[1].patterns[0],
            Pattern::Option { constructor, .. } if constructor == "err"
        ));
    }

    #[test]
    fn test_enum_variant_patterns() {
        let m = match_of(
            "match msg { Message::Quit => 0, Message::Write(text) => 1, Message::Move { x, y: py } => 2, _ => 3 }",
        );
        assert!(matches!(
            &m.arms[0].patterns[0],
            Pattern::EnumVariant { enum_name, variant, bindings, .. }
                if enum_name == "Message" && variant == "Quit" && bindings.is_empty()
        ));
        assert!(matches!(
            &m.arms[1].patterns[0],
            Pattern::EnumVariant { bindings, tuple_form: true, .. } if bindings == &["text"]
        ));
        match &m.arms[2].patterns[0] {
            Pattern::EnumVariant {
                field_bindings,
                tuple_form: false,
                ..
            } => {
                assert_eq!(
                    field_bindings,
                    &[("x".into(), "x".into()), ("y".into(), "py".into())]
                );
            }
            other => panic!("expected enum pattern, got {:?}", other),
        }
    }

    #[test]
    fn test_underscore_holes_in_tuple_pattern() {
        let m = match_of("match msg { Message::Pair(a, _) => a, _ => 0 }");
        assert!(matches!(
            &m.arms[0].patterns[0],
            Pattern::EnumVariant { bindings, .. } if bindings == &["a", "_"]
        ));
    }

    #[test]
    fn test_binding_arm_with_guard() {
        let m = match_of("match x { n if n < 5 => n, _ => 0 }");
        assert_eq!(m.arms[0].binding.as_deref(), Some("n"));
        assert!(m.arms[0].guard.is_some());
        assert!(m.has_wildcard);
    }

    #[test]
    fn test_when_style_uses_thin_arrow() {
        let m = match_of("when x { 1 -> 10\n 2 -> 20\n _ -> 0 }");
        assert!(m.when_style);
        assert_eq!(m.arms.len(), 3);
    }

    #[test]
    fn test_parenthesized_scrutinee() {
        let m = match_of("match (a + b) { 0 => 1, _ => 2 }");
        assert!(matches!(&*m.scrutinee, Expr::Binary(_)));
    }

    #[test]
    fn test_no_wildcard_flag() {
        let m = match_of("match e { Color::Red => 1, Color::Green => 2 }");
        assert!(!m.has_wildcard);
    }

    #[test]
    fn test_guard_on_literal_pattern() {
        let m = match_of("match x { 1 if enabled => 1, _ => 0 }");
        assert!(m.arms[0].guard.is_some());
        assert!(matches!(&m.arms[0].patterns[0], Pattern::Literal(_)));
    }
}
