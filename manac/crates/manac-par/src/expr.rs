//! Expression parsing.
//!
//! Precedence low → high: or-control-flow, `??`, `||`, `&&`, `|`, `^`,
//! `&`, equality, relational, shift (with ranges peeled off at the same
//! tier), additive, multiplicative over right-associative `**`, unary,
//! postfix, primary.

use manac_lex::{Lexer, TokenKind};
use manac_util::Span;

use crate::ast::*;
use crate::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_expression(&mut self) -> Expr {
        self.parse_or_control_flow()
    }

    /// `expr or return v` / `expr or break` / `expr or { ... }` /
    /// `expr or fallback` — binds loosest of all.
    fn parse_or_control_flow(&mut self) -> Expr {
        let left = self.parse_null_coalesce();

        if self.eat(TokenKind::KwOr) {
            let span = self.prev_span();

            let fallback = if self.check(TokenKind::LBrace) {
                match self.parse_block() {
                    Some(block) => OrFallback::Block(block),
                    None => return left,
                }
            } else if self.eat(TokenKind::KwReturn) {
                let r_span = self.prev_span();
                let value = if !self.check(TokenKind::Semicolon) && !self.check(TokenKind::RBrace)
                {
                    Some(self.parse_expression())
                } else {
                    None
                };
                OrFallback::Stmt(Box::new(Stmt::Return(ReturnStmt {
                    value,
                    span: r_span,
                })))
            } else if self.eat(TokenKind::KwBreak) {
                OrFallback::Stmt(Box::new(Stmt::Break(BreakStmt {
                    value: None,
                    span: self.prev_span(),
                })))
            } else if self.eat(TokenKind::KwContinue) {
                OrFallback::Stmt(Box::new(Stmt::Continue(ContinueStmt {
                    span: self.prev_span(),
                })))
            } else {
                OrFallback::Expr(Box::new(self.parse_null_coalesce()))
            };

            return Expr::Or(OrExpr {
                value: Box::new(left),
                fallback,
                span,
            });
        }

        left
    }

    fn parse_null_coalesce(&mut self) -> Expr {
        let mut left = self.parse_logical_or();
        while self.eat(TokenKind::QuestionQuestion) {
            let span = self.prev_span();
            let right = self.parse_logical_or();
            left = Expr::NullCoalesce(NullCoalesceExpr {
                value: Box::new(left),
                default: Box::new(right),
                span,
            });
        }
        left
    }

    pub(crate) fn parse_logical_or(&mut self) -> Expr {
        let mut left = self.parse_logical_and();
        while self.eat(TokenKind::OrOr) {
            let span = self.prev_span();
            let right = self.parse_logical_and();
            left = binary(BinOp::Or, left, right, span);
        }
        left
    }

    fn parse_logical_and(&mut self) -> Expr {
        let mut left = self.parse_bitwise_or();
        while self.eat(TokenKind::AndAnd) {
            let span = self.prev_span();
            let right = self.parse_bitwise_or();
            left = binary(BinOp::And, left, right, span);
        }
        left
    }

    fn parse_bitwise_or(&mut self) -> Expr {
        let mut left = self.parse_bitwise_xor();
        while self.eat(TokenKind::Pipe) {
            let span = self.prev_span();
            let right = self.parse_bitwise_xor();
            left = binary(BinOp::BitOr, left, right, span);
        }
        left
    }

    fn parse_bitwise_xor(&mut self) -> Expr {
        let mut left = self.parse_bitwise_and();
        while self.eat(TokenKind::Caret) {
            let span = self.prev_span();
            let right = self.parse_bitwise_and();
            left = binary(BinOp::BitXor, left, right, span);
        }
        left
    }

    fn parse_bitwise_and(&mut self) -> Expr {
        let mut left = self.parse_equality();
        while self.eat(TokenKind::Amp) {
            let span = self.prev_span();
            let right = self.parse_equality();
            left = binary(BinOp::BitAnd, left, right, span);
        }
        left
    }

    fn parse_equality(&mut self) -> Expr {
        let mut left = self.parse_relational();
        loop {
            let op = if self.eat(TokenKind::EqEq) {
                BinOp::Eq
            } else if self.eat(TokenKind::BangEq) {
                BinOp::Ne
            } else {
                break;
            };
            let span = self.prev_span();
            let right = self.parse_relational();
            left = binary(op, left, right, span);
        }
        left
    }

    fn parse_relational(&mut self) -> Expr {
        let mut left = self.parse_shift();
        loop {
            let op = if self.eat(TokenKind::Less) {
                BinOp::Lt
            } else if self.eat(TokenKind::LessEq) {
                BinOp::Le
            } else if self.eat(TokenKind::Greater) {
                BinOp::Gt
            } else if self.eat(TokenKind::GreaterEq) {
                BinOp::Ge
            } else {
                break;
            };
            let span = self.prev_span();
            let right = self.parse_shift();
            left = binary(op, left, right, span);
        }
        left
    }

    /// Shift tier; range expressions (`..`, `..=`) live at the same level
    /// and are peeled off into a range node.
    fn parse_shift(&mut self) -> Expr {
        let left = self.parse_additive();

        if self.check(TokenKind::DotDot) || self.check(TokenKind::DotDotEq) {
            let inclusive = self.check(TokenKind::DotDotEq);
            self.advance();
            let span = self.prev_span();
            let right = self.parse_additive();
            return Expr::Range(RangeExpr {
                start: Box::new(left),
                end: Box::new(right),
                inclusive,
                span,
            });
        }

        let mut left = left;
        loop {
            let op = if self.eat(TokenKind::Shl) {
                BinOp::Shl
            } else if self.eat(TokenKind::Shr) {
                BinOp::Shr
            } else {
                break;
            };
            let span = self.prev_span();
            let right = self.parse_additive();
            left = binary(op, left, right, span);
        }
        left
    }

    fn parse_additive(&mut self) -> Expr {
        let mut left = self.parse_multiplicative();
        loop {
            let op = if self.eat(TokenKind::Plus) {
                BinOp::Add
            } else if self.eat(TokenKind::Minus) {
                BinOp::Sub
            } else {
                break;
            };
            let span = self.prev_span();
            let right = self.parse_multiplicative();
            left = binary(op, left, right, span);
        }
        left
    }

    fn parse_multiplicative(&mut self) -> Expr {
        let mut left = self.parse_power();
        loop {
            let op = if self.eat(TokenKind::Star) {
                BinOp::Mul
            } else if self.eat(TokenKind::Slash) {
                BinOp::Div
            } else if self.eat(TokenKind::Percent) {
                BinOp::Rem
            } else {
                break;
            };
            let span = self.prev_span();
            let right = self.parse_power();
            left = binary(op, left, right, span);
        }
        left
    }

    /// `**` is right-associative and binds tighter than `*`.
    fn parse_power(&mut self) -> Expr {
        let left = self.parse_unary();
        if self.eat(TokenKind::StarStar) {
            let span = self.prev_span();
            let right = self.parse_power();
            return binary(BinOp::Pow, left, right, span);
        }
        left
    }

    fn parse_unary(&mut self) -> Expr {
        if self.eat(TokenKind::Amp) {
            let span = self.prev_span();
            let op = if self.eat(TokenKind::KwMut) {
                UnOp::RefMut
            } else {
                UnOp::Ref
            };
            let operand = self.parse_unary();
            return Expr::Unary(UnaryExpr {
                op,
                operand: Box::new(operand),
                span,
            });
        }

        let op = if self.eat(TokenKind::Bang) {
            Some(UnOp::Not)
        } else if self.eat(TokenKind::Minus) {
            Some(UnOp::Neg)
        } else if self.eat(TokenKind::Tilde) {
            Some(UnOp::BitNot)
        } else if self.eat(TokenKind::Star) {
            Some(UnOp::Deref)
        } else {
            None
        };

        if let Some(op) = op {
            let span = self.prev_span();
            let operand = self.parse_unary();
            return Expr::Unary(UnaryExpr {
                op,
                operand: Box::new(operand),
                span,
            });
        }

        self.parse_postfix()
    }

    /// Postfix chain: indexing, slicing, member access, tuple index,
    /// method call, `.await`, `?.`, `?`, `as Type`.
    pub(crate) fn parse_postfix(&mut self) -> Expr {
        let mut expr = self.parse_primary();

        loop {
            if self.eat(TokenKind::LBracket) {
                let span = self.prev_span();
                let index = self.parse_expression();
                self.expect(TokenKind::RBracket, "expected ']'");

                // A range index is a slice.
                if let Expr::Range(range) = index {
                    expr = Expr::Slice(SliceExpr {
                        base: Box::new(expr),
                        start: Some(range.start),
                        end: Some(range.end),
                        inclusive: range.inclusive,
                        span,
                    });
                } else {
                    expr = Expr::Index(IndexExpr {
                        base: Box::new(expr),
                        index: Box::new(index),
                        span,
                    });
                }
            } else if self.eat(TokenKind::Dot) {
                let span = self.prev_span();

                // Tuple index: expr.0
                if self.eat(TokenKind::IntLiteral) {
                    let index = self.prev_lexeme().parse::<usize>().unwrap_or(0);
                    expr = Expr::TupleIndex(TupleIndexExpr {
                        tuple: Box::new(expr),
                        index,
                        span,
                    });
                    continue;
                }

                // Await: expr.await
                if self.eat(TokenKind::KwAwait) {
                    expr = Expr::Await(AwaitExpr {
                        operand: Box::new(expr),
                        span,
                    });
                    continue;
                }

                self.expect(TokenKind::Identifier, "expected member name after '.'");
                let member = self.prev_lexeme();

                if self.eat(TokenKind::LParen) {
                    let (args, arg_names) = self.parse_call_args();
                    expr = Expr::MethodCall(MethodCallExpr {
                        receiver: Box::new(expr),
                        method: member,
                        args,
                        arg_names,
                        receiver_type: String::new(),
                        span,
                    });
                } else {
                    expr = Expr::Member(MemberExpr {
                        object: Box::new(expr),
                        member,
                        span,
                    });
                }
            } else if self.eat(TokenKind::QuestionDot) {
                let span = self.prev_span();
                self.expect(TokenKind::Identifier, "expected identifier after '?.'");
                let member = self.prev_lexeme();

                let (is_method_call, args, arg_names) = if self.eat(TokenKind::LParen) {
                    let (args, arg_names) = self.parse_call_args();
                    (true, args, arg_names)
                } else {
                    (false, Vec::new(), Vec::new())
                };

                expr = Expr::OptionalChain(OptionalChainExpr {
                    object: Box::new(expr),
                    member,
                    is_method_call,
                    args,
                    arg_names,
                    span,
                });
            } else if self.eat(TokenKind::Question) {
                let span = self.prev_span();
                expr = Expr::Try(TryExpr {
                    operand: Box::new(expr),
                    span,
                });
            } else if self.eat(TokenKind::KwAs) {
                let span = self.prev_span();
                let target_type = self.parse_type_name();
                expr = Expr::Cast(CastExpr {
                    operand: Box::new(expr),
                    target_type,
                    span,
                });
            } else {
                break;
            }
        }

        expr
    }

    /// Parses a parenthesized argument list; the opening paren has been
    /// consumed. `name: value` arguments record the name.
    fn parse_call_args(&mut self) -> (Vec<Expr>, Vec<Option<String>>) {
        let mut args = Vec::new();
        let mut arg_names = Vec::new();

        if !self.check(TokenKind::RParen) {
            loop {
                if self.check(TokenKind::Identifier) && self.check_next(TokenKind::Colon) {
                    self.advance();
                    let name = self.prev_lexeme();
                    self.advance(); // the colon
                    arg_names.push(Some(name));
                    args.push(self.parse_expression());
                } else {
                    arg_names.push(None);
                    args.push(self.parse_expression());
                }
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(TokenKind::RParen, "expected ')'");
        (args, arg_names)
    }

    fn parse_primary(&mut self) -> Expr {
        // Literals.
        if self.eat(TokenKind::IntLiteral) || self.eat(TokenKind::FloatLiteral) {
            return Expr::Literal(LiteralExpr {
                value: self.prev_lexeme(),
                kind: LiteralKind::Number,
                span: self.prev_span(),
            });
        }
        if self.eat(TokenKind::StrLiteral)
            || self.eat(TokenKind::RawStrLiteral)
            || self.eat(TokenKind::MultilineStrLiteral)
        {
            return Expr::Literal(LiteralExpr {
                value: self.prev_lexeme(),
                kind: LiteralKind::Str,
                span: self.prev_span(),
            });
        }
        if self.eat(TokenKind::CharLiteral) {
            return Expr::Literal(LiteralExpr {
                value: self.prev_lexeme(),
                kind: LiteralKind::Char,
                span: self.prev_span(),
            });
        }
        if self.eat(TokenKind::KwTrue) || self.eat(TokenKind::KwFalse) {
            return Expr::Literal(LiteralExpr {
                value: self.prev_lexeme(),
                kind: LiteralKind::Bool,
                span: self.prev_span(),
            });
        }
        if self.eat(TokenKind::FStrLiteral) {
            let payload = self.prev_lexeme();
            let span = self.prev_span();
            return self.split_fstring(&payload, span);
        }

        // If-expression: if cond { expr } else { expr }
        if self.eat(TokenKind::KwIf) {
            let span = self.prev_span();
            let condition = self.parse_cond_expr();
            self.expect(TokenKind::LBrace, "expected '{' after if condition");
            let then_expr = self.parse_expression();
            self.expect(TokenKind::RBrace, "expected '}' after then expression");
            self.expect(TokenKind::KwElse, "if expression requires else branch");
            self.expect(TokenKind::LBrace, "expected '{' after else");
            let else_expr = self.parse_expression();
            self.expect(TokenKind::RBrace, "expected '}' after else expression");
            return Expr::If(IfExpr {
                condition: Box::new(condition),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
                span,
            });
        }

        if self.eat(TokenKind::KwSelf) {
            return Expr::SelfValue(self.prev_span());
        }
        if self.eat(TokenKind::KwNone) {
            return Expr::NoneLiteral(self.prev_span());
        }
        if self.eat(TokenKind::KwMatch) {
            return self.parse_match_expression(false);
        }
        if self.eat(TokenKind::KwWhen) {
            return self.parse_match_expression(true);
        }

        // Grouping or tuple literal.
        if self.eat(TokenKind::LParen) {
            let span = self.prev_span();

            if self.eat(TokenKind::RParen) {
                return Expr::Tuple(TupleExpr {
                    elements: Vec::new(),
                    span,
                });
            }

            let first = self.parse_expression();

            if self.eat(TokenKind::Comma) {
                let mut elements = vec![first];
                if !self.check(TokenKind::RParen) {
                    elements.push(self.parse_expression());
                    while self.eat(TokenKind::Comma) {
                        if self.check(TokenKind::RParen) {
                            break;
                        }
                        elements.push(self.parse_expression());
                    }
                }
                self.expect(TokenKind::RParen, "expected ')' after tuple elements");
                return Expr::Tuple(TupleExpr { elements, span });
            }

            self.expect(TokenKind::RParen, "expected ')'");
            return first;
        }

        // move |params| body
        if self.eat(TokenKind::KwMove) {
            if self.check(TokenKind::Pipe) || self.check(TokenKind::OrOr) {
                if let Expr::Closure(mut closure) = self.parse_closure_expression() {
                    closure.captures_by_ref = false;
                    return Expr::Closure(closure);
                }
                unreachable!("parse_closure_expression returns a closure");
            }
            self.error("expected '|' after 'move' for closure", self.prev_span());
        }

        // Explicit capture list: [x, &y, move z]|params| body — only when a
        // scan finds `]` immediately followed by `|`.
        if self.check(TokenKind::LBracket) && self.capture_list_ahead() {
            return self.parse_closure_with_captures();
        }

        // Closures: || body and |params| body
        if self.check(TokenKind::OrOr) || self.check(TokenKind::Pipe) {
            return self.parse_closure_expression();
        }

        // Array literal: [a, b, c] or fill form [value; count]
        if self.eat(TokenKind::LBracket) {
            let span = self.prev_span();
            let mut kind = ArrayKind::List(Vec::new());

            if !self.check(TokenKind::RBracket) {
                let first = self.parse_expression();
                if self.eat(TokenKind::Semicolon) {
                    let count = self.parse_expression();
                    kind = ArrayKind::Fill {
                        value: Box::new(first),
                        count: Box::new(count),
                    };
                } else {
                    let mut elements = vec![first];
                    while self.eat(TokenKind::Comma) {
                        if self.check(TokenKind::RBracket) {
                            break;
                        }
                        elements.push(self.parse_expression());
                    }
                    kind = ArrayKind::List(elements);
                }
            }

            self.expect(TokenKind::RBracket, "expected ']'");
            return Expr::Array(ArrayExpr { kind, span });
        }

        if self.eat(TokenKind::Identifier) {
            return self.parse_identifier_expression();
        }

        let span = self.peek_span();
        self.error("expected expression", span);
        // Consume the offending token so enclosing loops make progress; a
        // closing brace stays put for the block parser.
        if !self.check(TokenKind::RBrace) {
            self.advance();
        }
        Expr::int_literal("0", span)
    }

    /// Continues a primary that began with an identifier: scope access,
    /// calls (including `Type::func(...)` static calls), struct literals,
    /// or the bare identifier.
    fn parse_identifier_expression(&mut self) -> Expr {
        let name = self.prev_lexeme();
        let span = self.prev_span();

        // A::B, possibly upgrading to a static call A::B(...).
        if self.eat(TokenKind::ColonColon) {
            self.expect(TokenKind::Identifier, "expected identifier after '::'");
            let member = self.prev_lexeme();

            if self.eat(TokenKind::LParen) {
                let (args, arg_names) = self.parse_call_args();
                return Expr::Call(CallExpr {
                    callee: format!("{}::{}", name, member),
                    args,
                    arg_names,
                    span,
                });
            }

            return Expr::ScopeAccess(ScopeAccessExpr {
                scope: name,
                member,
                span,
            });
        }

        // Plain call.
        if self.eat(TokenKind::LParen) {
            let (args, arg_names) = self.parse_call_args();
            return Expr::Call(CallExpr {
                callee: name,
                args,
                arg_names,
                span,
            });
        }

        // Struct literal — only when the identifier reads as a type name
        // (uppercase first letter or a known container).
        let looks_like_type = name
            .chars()
            .next()
            .map(|c| c.is_ascii_uppercase())
            .unwrap_or(false)
            || matches!(name.as_str(), "Vec" | "Option" | "Result" | "HashMap");

        if looks_like_type && (self.check(TokenKind::LBrace) || self.check(TokenKind::Less)) {
            let mut type_name = name.clone();

            if self.eat(TokenKind::Less) {
                type_name.push('<');
                type_name.push_str(&self.parse_type_name());
                while self.eat(TokenKind::Comma) {
                    type_name.push_str(", ");
                    type_name.push_str(&self.parse_type_name());
                }
                self.expect(TokenKind::Greater, "expected '>' after type arguments");
                type_name.push('>');

                if !self.check(TokenKind::LBrace) {
                    self.error("expected '{' after generic type", self.peek_span());
                    return Expr::Identifier(IdentExpr { name, span });
                }
            }

            if self.eat(TokenKind::LBrace) {
                let mut fields = Vec::new();
                let mut named = false;

                if !self.check(TokenKind::RBrace) {
                    let mut first = true;
                    loop {
                        if first
                            && self.check(TokenKind::Identifier)
                            && self.check_next(TokenKind::Colon)
                        {
                            named = true;
                        }
                        first = false;

                        let f_span = self.peek_span();
                        let f_name = if named {
                            self.expect(TokenKind::Identifier, "expected field name");
                            let n = self.prev_lexeme();
                            self.expect(TokenKind::Colon, "expected ':' after field name");
                            Some(n)
                        } else {
                            None
                        };

                        fields.push(FieldInit {
                            name: f_name,
                            value: self.parse_expression(),
                            span: f_span,
                        });

                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                }

                self.expect(TokenKind::RBrace, "expected '}'");
                return Expr::StructLiteral(StructLiteralExpr {
                    type_name,
                    fields,
                    named,
                    span,
                });
            }
        }

        Expr::Identifier(IdentExpr { name, span })
    }

    /// Looks ahead from a `[` for a `]` directly followed by `|`, which
    /// marks a closure capture list rather than an array literal.
    fn capture_list_ahead(&self) -> bool {
        let mut i = self.position() + 1;
        let mut depth = 1usize;
        while let Some(kind) = self.kind_at(i) {
            match kind {
                TokenKind::LBracket => depth += 1,
                TokenKind::RBracket => {
                    depth -= 1;
                    if depth == 0 {
                        return self.kind_at(i + 1) == Some(TokenKind::Pipe);
                    }
                }
                TokenKind::Eof => return false,
                _ => {}
            }
            i += 1;
        }
        false
    }

    /// `|params| body`, `|| body`, with optional `-> Type`.
    fn parse_closure_expression(&mut self) -> Expr {
        // `||` lexes as a single token when the parameter list is empty.
        if self.eat(TokenKind::OrOr) {
            let span = self.prev_span();
            let body = self.parse_closure_body();
            return Expr::Closure(ClosureExpr {
                params: Vec::new(),
                return_type: None,
                body,
                captures: Vec::new(),
                has_explicit_captures: false,
                captures_by_ref: true,
                span,
            });
        }

        self.expect(TokenKind::Pipe, "expected '|' to start closure");
        let span = self.prev_span();

        let params = self.parse_closure_params();
        self.expect(TokenKind::Pipe, "expected '|' after closure parameters");

        let return_type = if self.eat(TokenKind::Arrow) {
            Some(self.parse_type_name())
        } else {
            None
        };

        let body = self.parse_closure_body();

        Expr::Closure(ClosureExpr {
            params,
            return_type,
            body,
            captures: Vec::new(),
            has_explicit_captures: false,
            captures_by_ref: true,
            span,
        })
    }

    /// `[x, &y, move z]|params| body`.
    fn parse_closure_with_captures(&mut self) -> Expr {
        self.expect(TokenKind::LBracket, "expected '[' for capture list");
        let span = self.prev_span();

        let mut captures = Vec::new();
        if !self.check(TokenKind::RBracket) {
            loop {
                let capture = if self.eat(TokenKind::Amp) {
                    self.expect(TokenKind::Identifier, "expected identifier after '&' in capture");
                    CaptureSpec {
                        name: self.prev_lexeme(),
                        mode: CaptureMode::ByRef,
                    }
                } else if self.eat(TokenKind::KwMove) {
                    self.expect(
                        TokenKind::Identifier,
                        "expected identifier after 'move' in capture",
                    );
                    CaptureSpec {
                        name: self.prev_lexeme(),
                        mode: CaptureMode::ByMove,
                    }
                } else if self.eat(TokenKind::Identifier) {
                    CaptureSpec {
                        name: self.prev_lexeme(),
                        mode: CaptureMode::ByValue,
                    }
                } else {
                    self.error("expected capture specification", self.peek_span());
                    break;
                };
                captures.push(capture);

                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RBracket, "expected ']' after capture list");

        self.expect(TokenKind::Pipe, "expected '|' after capture list");
        let params = self.parse_closure_params();
        self.expect(TokenKind::Pipe, "expected '|' after closure parameters");

        let return_type = if self.eat(TokenKind::Arrow) {
            Some(self.parse_type_name())
        } else {
            None
        };

        let body = self.parse_closure_body();

        Expr::Closure(ClosureExpr {
            params,
            return_type,
            body,
            captures,
            has_explicit_captures: true,
            captures_by_ref: true,
            span,
        })
    }

    fn parse_closure_params(&mut self) -> Vec<ClosureParam> {
        let mut params = Vec::new();
        if self.check(TokenKind::Pipe) {
            return params;
        }
        let mut underscores = 0usize;
        loop {
            let span = self.peek_span();
            let name = if self.eat(TokenKind::Underscore) {
                // Unused parameters get a synthesized unique name.
                let n = format!("_unused_{}", underscores);
                underscores += 1;
                n
            } else {
                self.expect(TokenKind::Identifier, "expected parameter name or '_'");
                self.prev_lexeme()
            };

            let type_name = if self.eat(TokenKind::Colon) {
                self.parse_type_name()
            } else {
                String::new()
            };

            params.push(ClosureParam {
                name,
                type_name,
                span,
            });

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        params
    }

    fn parse_closure_body(&mut self) -> ClosureBody {
        if self.check(TokenKind::LBrace) {
            match self.parse_block() {
                Some(block) => ClosureBody::Block(block),
                None => ClosureBody::Expr(Box::new(Expr::int_literal("0", self.peek_span()))),
            }
        } else {
            ClosureBody::Expr(Box::new(self.parse_expression()))
        }
    }

    /// Splits an f-string payload into literal and embedded-expression
    /// parts. Embedded text is re-lexed and re-parsed; the format spec is
    /// the text after the first depth-0 `:` that is not part of `::`.
    fn split_fstring(&mut self, payload: &str, span: Span) -> Expr {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let chars: Vec<char> = payload.chars().collect();
        let mut i = 0usize;

        while i < chars.len() {
            if chars[i] == '{' {
                if !literal.is_empty() {
                    parts.push(FStringPart::Literal(std::mem::take(&mut literal)));
                }

                // Collect up to the matching close brace.
                let mut inner = String::new();
                let mut depth = 1usize;
                i += 1;
                while i < chars.len() {
                    match chars[i] {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    inner.push(chars[i]);
                    i += 1;
                }
                if i < chars.len() {
                    i += 1; // the closing brace
                } else {
                    self.error("unterminated '{' in f-string", span);
                }

                let (expr_text, format_spec) = split_format_spec(&inner);
                if expr_text.is_empty() {
                    self.error("empty expression in f-string", span);
                } else {
                    let tokens = Lexer::new(expr_text).tokenize();
                    let mut sub = Parser::new(tokens, self.handler);
                    let expr = sub.parse_expression();
                    parts.push(FStringPart::Expr {
                        expr: Box::new(expr),
                        format_spec: format_spec.to_string(),
                    });
                }
            } else {
                literal.push(chars[i]);
                i += 1;
            }
        }

        if !literal.is_empty() {
            parts.push(FStringPart::Literal(literal));
        }

        Expr::FString(FStringExpr { parts, span })
    }
}

fn binary(op: BinOp, left: Expr, right: Expr, span: Span) -> Expr {
    Expr::Binary(BinaryExpr {
        op,
        left: Box::new(left),
        right: Box::new(right),
        span,
    })
}

/// Splits `expr[:spec]`, honoring `::` paths and nested brackets.
fn split_format_spec(inner: &str) -> (&str, &str) {
    let bytes = inner.as_bytes();
    let mut depth = 0i32;
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'[' | b'<' => depth += 1,
            b')' | b']' | b'>' => depth -= 1,
            b':' if depth == 0 => {
                if i + 1 < bytes.len() && bytes[i + 1] == b':' {
                    i += 2;
                    continue;
                }
                return (&inner[..i], &inner[i + 1..]);
            }
            _ => {}
        }
        i += 1;
    }
    (inner, "")
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::test_util::parse_ok;

    fn expr_of(source: &str) -> Expr {
        let module = parse_ok(&format!("module m\nfn f() -> void {{\nlet v = {}\n}}", source));
        match module.decls.into_iter().next().unwrap() {
            Decl::Function(f) => match f.body.unwrap().stmts.into_iter().next().unwrap() {
                Stmt::Let(l) => l.init.unwrap(),
                other => panic!("expected let, got {:?}", other),
            },
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_precedence_mul_over_add() {
        // 2 + 3 * 4 parses as 2 + (3 * 4)
        match expr_of("2 + 3 * 4") {
            Expr::Binary(b) => {
                assert_eq!(b.op, BinOp::Add);
                assert!(matches!(&*b.right, Expr::Binary(r) if r.op == BinOp::Mul));
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_power_right_associative() {
        // 2 ** 3 ** 2 parses as 2 ** (3 ** 2)
        match expr_of("2 ** 3 ** 2") {
            Expr::Binary(b) => {
                assert_eq!(b.op, BinOp::Pow);
                assert!(matches!(&*b.right, Expr::Binary(r) if r.op == BinOp::Pow));
                assert!(matches!(&*b.left, Expr::Literal(_)));
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_power_binds_tighter_than_mul() {
        // 2 * 3 ** 2 parses as 2 * (3 ** 2)
        match expr_of("2 * 3 ** 2") {
            Expr::Binary(b) => {
                assert_eq!(b.op, BinOp::Mul);
                assert!(matches!(&*b.right, Expr::Binary(r) if r.op == BinOp::Pow));
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_logical_and_comparison_tiers() {
        // a < b && c == d
        match expr_of("a < b && c == d") {
            Expr::Binary(b) => {
                assert_eq!(b.op, BinOp::And);
                assert!(matches!(&*b.left, Expr::Binary(l) if l.op == BinOp::Lt));
                assert!(matches!(&*b.right, Expr::Binary(r) if r.op == BinOp::Eq));
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_range_expression() {
        match expr_of("1..10") {
            Expr::Range(r) => assert!(!r.inclusive),
            other => panic!("expected range, got {:?}", other),
        }
        match expr_of("1..=10") {
            Expr::Range(r) => assert!(r.inclusive),
            other => panic!("expected range, got {:?}", other),
        }
    }

    #[test]
    fn test_unary_operators() {
        assert!(matches!(expr_of("!flag"), Expr::Unary(u) if u.op == UnOp::Not));
        assert!(matches!(expr_of("-x"), Expr::Unary(u) if u.op == UnOp::Neg));
        assert!(matches!(expr_of("~bits"), Expr::Unary(u) if u.op == UnOp::BitNot));
        assert!(matches!(expr_of("&value"), Expr::Unary(u) if u.op == UnOp::Ref));
        assert!(matches!(expr_of("&mut value"), Expr::Unary(u) if u.op == UnOp::RefMut));
        assert!(matches!(expr_of("*ptr"), Expr::Unary(u) if u.op == UnOp::Deref));
    }

    #[test]
    fn test_call_with_named_args() {
        match expr_of("draw(1, color: red, 2)") {
            Expr::Call(c) => {
                assert_eq!(c.callee, "draw");
                assert_eq!(c.arg_names, vec![None, Some("color".into()), None]);
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_static_call_and_scope_access() {
        match expr_of("Vec::new()") {
            Expr::Call(c) => assert_eq!(c.callee, "Vec::new"),
            other => panic!("expected call, got {:?}", other),
        }
        match expr_of("Color::Red") {
            Expr::ScopeAccess(s) => {
                assert_eq!(s.scope, "Color");
                assert_eq!(s.member, "Red");
            }
            other => panic!("expected scope access, got {:?}", other),
        }
    }

    #[test]
    fn test_method_call_chain() {
        match expr_of("name.trim().len()") {
            Expr::MethodCall(outer) => {
                assert_eq!(outer.method, "len");
                assert!(matches!(&*outer.receiver, Expr::MethodCall(inner) if inner.method == "trim"));
            }
            other => panic!("expected method call, got {:?}", other),
        }
    }

    #[test]
    fn test_postfix_try_await_cast() {
        assert!(matches!(expr_of("fetch()?"), Expr::Try(_)));
        assert!(matches!(expr_of("task.await"), Expr::Await(_)));
        match expr_of("x as f64") {
            Expr::Cast(c) => assert_eq!(c.target_type, "f64"),
            other => panic!("expected cast, got {:?}", other),
        }
    }

    #[test]
    fn test_optional_chain_and_null_coalesce() {
        match expr_of("user?.name") {
            Expr::OptionalChain(o) => {
                assert_eq!(o.member, "name");
                assert!(!o.is_method_call);
            }
            other => panic!("expected optional chain, got {:?}", other),
        }
        match expr_of("opt ?? 0") {
            Expr::NullCoalesce(_) => {}
            other => panic!("expected null coalesce, got {:?}", other),
        }
    }

    #[test]
    fn test_index_and_slice() {
        assert!(matches!(expr_of("v[0]"), Expr::Index(_)));
        match expr_of("v[1..3]") {
            Expr::Slice(s) => assert!(!s.inclusive),
            other => panic!("expected slice, got {:?}", other),
        }
    }

    #[test]
    fn test_tuple_literal_and_index() {
        match expr_of("(1, 2, 3)") {
            Expr::Tuple(t) => assert_eq!(t.elements.len(), 3),
            other => panic!("expected tuple, got {:?}", other),
        }
        match expr_of("pair.0") {
            Expr::TupleIndex(t) => assert_eq!(t.index, 0),
            other => panic!("expected tuple index, got {:?}", other),
        }
        // Plain grouping is not a tuple.
        assert!(matches!(expr_of("(7)"), Expr::Literal(_)));
    }

    #[test]
    fn test_array_literals() {
        match expr_of("[1, 2, 3]") {
            Expr::Array(a) => assert!(matches!(a.kind, ArrayKind::List(v) if v.len() == 3)),
            other => panic!("expected array, got {:?}", other),
        }
        match expr_of("[0; 16]") {
            Expr::Array(a) => assert!(matches!(a.kind, ArrayKind::Fill { .. })),
            other => panic!("expected array, got {:?}", other),
        }
    }

    #[test]
    fn test_struct_literals() {
        match expr_of("Point{x: 1, y: 2}") {
            Expr::StructLiteral(s) => {
                assert!(s.named);
                assert_eq!(s.fields.len(), 2);
            }
            other => panic!("expected struct literal, got {:?}", other),
        }
        match expr_of("Point{1, 2}") {
            Expr::StructLiteral(s) => assert!(!s.named),
            other => panic!("expected struct literal, got {:?}", other),
        }
        match expr_of("Pair<i32, bool>{a, b}") {
            Expr::StructLiteral(s) => assert_eq!(s.type_name, "Pair<i32, bool>"),
            other => panic!("expected struct literal, got {:?}", other),
        }
        // Lowercase identifier before '{' is not a struct literal head.
        assert!(matches!(expr_of("point"), Expr::Identifier(_)));
    }

    #[test]
    fn test_closures() {
        match expr_of("|x, y: i32| x + y") {
            Expr::Closure(c) => {
                assert_eq!(c.params.len(), 2);
                assert_eq!(c.params[1].type_name, "i32");
                assert!(c.captures_by_ref);
                assert!(matches!(c.body, ClosureBody::Expr(_)));
            }
            other => panic!("expected closure, got {:?}", other),
        }
        match expr_of("|| 42") {
            Expr::Closure(c) => assert!(c.params.is_empty()),
            other => panic!("expected closure, got {:?}", other),
        }
        match expr_of("move |x| x") {
            Expr::Closure(c) => assert!(!c.captures_by_ref),
            other => panic!("expected closure, got {:?}", other),
        }
        match expr_of("|_| 0") {
            Expr::Closure(c) => assert_eq!(c.params[0].name, "_unused_0"),
            other => panic!("expected closure, got {:?}", other),
        }
    }

    #[test]
    fn test_closure_with_capture_list() {
        match expr_of("[x, &y, move z]|a| a") {
            Expr::Closure(c) => {
                assert!(c.has_explicit_captures);
                assert_eq!(c.captures.len(), 3);
                assert_eq!(c.captures[0].mode, CaptureMode::ByValue);
                assert_eq!(c.captures[1].mode, CaptureMode::ByRef);
                assert_eq!(c.captures[2].mode, CaptureMode::ByMove);
            }
            other => panic!("expected closure, got {:?}", other),
        }
    }

    #[test]
    fn test_or_expression_forms() {
        match expr_of("fallible() or return 1") {
            Expr::Or(o) => assert!(matches!(o.fallback, OrFallback::Stmt(_))),
            other => panic!("expected or-expr, got {:?}", other),
        }
        match expr_of("fallible() or { return 2 }") {
            Expr::Or(o) => assert!(matches!(o.fallback, OrFallback::Block(_))),
            other => panic!("expected or-expr, got {:?}", other),
        }
        match expr_of("fallible() or 0") {
            Expr::Or(o) => assert!(matches!(o.fallback, OrFallback::Expr(_))),
            other => panic!("expected or-expr, got {:?}", other),
        }
    }

    #[test]
    fn test_if_expression() {
        match expr_of("if cond { 1 } else { 2 }") {
            Expr::If(_) => {}
            other => panic!("expected if-expr, got {:?}", other),
        }
    }

    #[test]
    fn test_fstring_splitting() {
        match expr_of("f\"hello {name}, you are {age:03d} years\"") {
            Expr::FString(f) => {
                assert_eq!(f.parts.len(), 5);
                assert!(matches!(&f.parts[0], FStringPart::Literal(s) if s == "hello "));
                assert!(
                    matches!(&f.parts[1], FStringPart::Expr { format_spec, .. } if format_spec.is_empty())
                );
                assert!(matches!(&f.parts[2], FStringPart::Literal(s) if s == ", you are "));
                assert!(
                    matches!(&f.parts[3], FStringPart::Expr { format_spec, .. } if format_spec == "03d")
                );
            }
            other => panic!("expected f-string, got {:?}", other),
        }
    }

    #[test]
    fn test_fstring_scope_access_not_format_spec() {
        match expr_of("f\"{Color::Red}\"") {
            Expr::FString(f) => {
                assert_eq!(f.parts.len(), 1);
                match &f.parts[0] {
                    FStringPart::Expr { expr, format_spec } => {
                        assert!(format_spec.is_empty());
                        assert!(matches!(&**expr, Expr::ScopeAccess(_)));
                    }
                    other => panic!("expected expr part, got {:?}", other),
                }
            }
            other => panic!("expected f-string, got {:?}", other),
        }
    }

    #[test]
    fn test_none_and_self() {
        assert!(matches!(expr_of("None"), Expr::NoneLiteral(_)));
        let module = parse_ok("module m\nimpl P { fn get(self) -> i32 { return self.x } }");
        drop(module);
    }
}
