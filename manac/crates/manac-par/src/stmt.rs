//! Statement parsing.
//!
//! Statement dispatch leans on one-token lookahead to pick between the
//! declaration, assignment, destructuring, and expression-statement forms;
//! compound assignments and `++`/`--` desugar here into plain assignments
//! with a binary right-hand side.

use manac_lex::TokenKind;
use manac_util::Span;

use crate::ast::*;
use crate::Parser;

impl<'a> Parser<'a> {
    /// Parses `{ stmt* }`. On a statement error, synchronizes to the next
    /// statement boundary inside the block and continues.
    pub(crate) fn parse_block(&mut self) -> Option<Block> {
        if !self.expect(TokenKind::LBrace, "expected '{'") {
            return None;
        }
        let span = self.prev_span();
        let mut stmts = Vec::new();

        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            match self.parse_statement() {
                Some(stmt) => stmts.push(stmt),
                None => self.synchronize_stmt(),
            }
        }

        self.expect(TokenKind::RBrace, "expected '}'");
        Some(Block { stmts, span })
    }

    pub(crate) fn parse_statement(&mut self) -> Option<Stmt> {
        if self.eat(TokenKind::KwIf) {
            return self.parse_if_stmt().map(Stmt::If);
        }
        if self.eat(TokenKind::KwWhile) {
            return self.parse_while_stmt().map(Stmt::While);
        }
        if self.eat(TokenKind::KwLoop) {
            let span = self.prev_span();
            let body = self.parse_block()?;
            return Some(Stmt::Loop(LoopStmt { body, span }));
        }
        if self.eat(TokenKind::KwFor) {
            return self.parse_for_stmt();
        }
        if self.eat(TokenKind::KwReturn) {
            return Some(self.parse_return_stmt());
        }
        if self.eat(TokenKind::KwBreak) {
            return Some(self.parse_break_stmt());
        }
        if self.eat(TokenKind::KwContinue) {
            let span = self.prev_span();
            self.optional_semicolon();
            return Some(Stmt::Continue(ContinueStmt { span }));
        }
        if self.eat(TokenKind::KwDefer) {
            let body = self.parse_block()?;
            let span = body.span;
            return Some(Stmt::Defer(DeferStmt { body, span }));
        }
        if self.eat(TokenKind::KwScope) {
            return self.parse_scope_stmt();
        }
        if self.eat(TokenKind::KwLet) {
            return self.parse_let_stmt();
        }
        if self.eat(TokenKind::KwConst) {
            return self.parse_const_stmt();
        }

        // Struct destructuring `{a, b}: Type = expr` vs a bare block
        // statement: destructuring has only identifiers and commas up to a
        // `}` that is immediately followed by `:`.
        if self.check(TokenKind::LBrace) {
            if self.struct_destructure_ahead() {
                return self.parse_destructure_stmt(DestructureKind::Struct);
            }
            return self.parse_block().map(Stmt::Block);
        }

        // Array destructuring: [a, b]: [N]T = expr — distinguished from an
        // array-literal expression by scanning for `]` followed by `:`.
        if self.check(TokenKind::LBracket) && self.check_next(TokenKind::Identifier) {
            let mut i = self.position() + 2;
            while let Some(kind) = self.kind_at(i) {
                if kind == TokenKind::RBracket {
                    break;
                }
                i += 1;
            }
            if self.kind_at(i + 1) == Some(TokenKind::Colon) {
                return self.parse_destructure_stmt(DestructureKind::Array);
            }
        }

        // Variable declaration: name : Type = expr
        if self.check(TokenKind::Identifier) && self.check_next(TokenKind::Colon) {
            return self.parse_var_decl_stmt();
        }

        // Simple assignment: name = expr
        if self.check(TokenKind::Identifier) && self.check_next(TokenKind::Assign) {
            return self.parse_assign_stmt();
        }

        // Increment/decrement: name++ / name--
        if self.check(TokenKind::Identifier)
            && (self.check_next(TokenKind::PlusPlus) || self.check_next(TokenKind::MinusMinus))
        {
            self.advance();
            let name = self.prev_lexeme();
            let span = self.prev_span();
            let op = if self.peek().kind == TokenKind::PlusPlus {
                BinOp::Add
            } else {
                BinOp::Sub
            };
            self.advance();
            self.optional_semicolon();
            return Some(Stmt::Assign(desugar_step(name, op, span)));
        }

        // Compound assignment: name += expr, name <<= expr, ...
        if self.check(TokenKind::Identifier) {
            if let Some(op) = self
                .kind_at(self.position() + 1)
                .and_then(compound_assign_op)
            {
                self.advance();
                let name = self.prev_lexeme();
                let span = self.prev_span();
                self.advance(); // the compound operator
                let rhs = self.parse_expression();
                self.optional_semicolon();
                return Some(Stmt::Assign(desugar_compound(name, op, rhs, span)));
            }
        }

        // Member/index assignment: parse a postfix expression, then check
        // for '='. Not an assignment — rewind and take the expression
        // statement path.
        if self.check(TokenKind::Identifier) {
            let saved = self.position();
            let lhs = self.parse_postfix();
            if self.eat(TokenKind::Assign) {
                let span = lhs.span();
                let value = self.parse_expression();
                self.optional_semicolon();
                let target = match lhs {
                    Expr::Identifier(id) => AssignTarget::Name(id.name),
                    other => AssignTarget::Expr(Box::new(other)),
                };
                return Some(Stmt::Assign(AssignStmt {
                    target,
                    op: "=".into(),
                    value,
                    span,
                }));
            }
            self.rewind(saved);
        }

        let span = self.peek_span();
        let expr = self.parse_expression();
        self.optional_semicolon();
        Some(Stmt::Expr(ExprStmt { expr, span }))
    }

    /// Scans past a `{` for the shape `ident (, ident)* } :` that marks a
    /// struct-destructuring statement.
    fn struct_destructure_ahead(&self) -> bool {
        let mut i = self.position() + 1;
        loop {
            match self.kind_at(i) {
                Some(TokenKind::RBrace) => {
                    return self.kind_at(i + 1) == Some(TokenKind::Colon);
                }
                Some(TokenKind::Identifier) | Some(TokenKind::Comma) => i += 1,
                _ => return false,
            }
        }
    }

    fn parse_var_decl_stmt(&mut self) -> Option<Stmt> {
        self.expect(TokenKind::Identifier, "expected variable name");
        let name = self.prev_lexeme();
        let span = self.prev_span();
        self.expect(TokenKind::Colon, "expected ':'");
        let type_name = self.parse_type_name();
        self.expect(TokenKind::Assign, "expected '='");
        let init = self.parse_expression();
        self.optional_semicolon();

        Some(Stmt::Let(LetStmt {
            name,
            type_name,
            init: Some(init),
            mutable: true,
            span,
        }))
    }

    /// `let [mut] name[: Type] = expr` or tuple destructuring
    /// `let (a, b) = expr`.
    fn parse_let_stmt(&mut self) -> Option<Stmt> {
        // let is mutable by default; an explicit `mut` is accepted.
        self.eat(TokenKind::KwMut);

        if self.eat(TokenKind::LParen) {
            let span = self.prev_span();
            let mut bindings = Vec::new();
            let mut index = 0usize;
            if !self.check(TokenKind::RParen) {
                loop {
                    self.expect(TokenKind::Identifier, "expected variable name in tuple pattern");
                    bindings.push(DestructureBinding {
                        name: self.prev_lexeme(),
                        field: index.to_string(),
                        span: self.prev_span(),
                    });
                    index += 1;
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RParen, "expected ')' after tuple pattern");

            let type_name = if self.eat(TokenKind::Colon) {
                self.parse_type_name()
            } else {
                "auto".to_string()
            };

            self.expect(TokenKind::Assign, "expected '='");
            let init = self.parse_expression();
            self.optional_semicolon();

            return Some(Stmt::Destructure(DestructureStmt {
                kind: DestructureKind::Tuple,
                bindings,
                type_name,
                init,
                span,
            }));
        }

        self.expect(TokenKind::Identifier, "expected variable name after 'let'");
        let name = self.prev_lexeme();
        let span = self.prev_span();

        let type_name = if self.eat(TokenKind::Colon) {
            self.parse_type_name()
        } else {
            "auto".to_string()
        };

        self.expect(TokenKind::Assign, "expected '='");
        let init = self.parse_expression();
        self.optional_semicolon();

        Some(Stmt::Let(LetStmt {
            name,
            type_name,
            init: Some(init),
            mutable: true,
            span,
        }))
    }

    /// `const name[: Type] = expr` — immutable binding.
    fn parse_const_stmt(&mut self) -> Option<Stmt> {
        self.expect(TokenKind::Identifier, "expected variable name after 'const'");
        let name = self.prev_lexeme();
        let span = self.prev_span();

        let type_name = if self.eat(TokenKind::Colon) {
            self.parse_type_name()
        } else {
            "auto".to_string()
        };

        self.expect(TokenKind::Assign, "expected '='");
        let init = self.parse_expression();
        self.optional_semicolon();

        Some(Stmt::Let(LetStmt {
            name,
            type_name,
            init: Some(init),
            mutable: false,
            span,
        }))
    }

    fn parse_assign_stmt(&mut self) -> Option<Stmt> {
        self.expect(TokenKind::Identifier, "expected assignment target");
        let name = self.prev_lexeme();
        let span = self.prev_span();
        self.expect(TokenKind::Assign, "expected '='");
        let value = self.parse_expression();
        self.optional_semicolon();

        Some(Stmt::Assign(AssignStmt {
            target: AssignTarget::Name(name),
            op: "=".into(),
            value,
            span,
        }))
    }

    fn parse_destructure_stmt(&mut self, kind: DestructureKind) -> Option<Stmt> {
        let span = self.peek_span();
        let mut bindings = Vec::new();

        match kind {
            DestructureKind::Struct => {
                self.expect(TokenKind::LBrace, "expected '{' for struct destructuring");
                while !self.check(TokenKind::RBrace) && !self.is_at_end() {
                    self.expect(TokenKind::Identifier, "expected field name");
                    let name = self.prev_lexeme();
                    bindings.push(DestructureBinding {
                        field: name.clone(),
                        name,
                        span: self.prev_span(),
                    });
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RBrace, "expected '}' after destructuring pattern");
            }
            DestructureKind::Array => {
                self.expect(TokenKind::LBracket, "expected '[' for array destructuring");
                let mut index = 0usize;
                while !self.check(TokenKind::RBracket) && !self.is_at_end() {
                    self.expect(TokenKind::Identifier, "expected variable name");
                    bindings.push(DestructureBinding {
                        name: self.prev_lexeme(),
                        field: index.to_string(),
                        span: self.prev_span(),
                    });
                    index += 1;
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RBracket, "expected ']' after destructuring pattern");
            }
            DestructureKind::Tuple => unreachable!("tuple form goes through parse_let_stmt"),
        }

        self.expect(TokenKind::Colon, "expected ':' after destructuring pattern");
        let type_name = self.parse_type_name();
        self.expect(TokenKind::Assign, "expected '=' in destructuring statement");
        let init = self.parse_expression();
        self.optional_semicolon();

        Some(Stmt::Destructure(DestructureStmt {
            kind,
            bindings,
            type_name,
            init,
            span,
        }))
    }

    fn parse_scope_stmt(&mut self) -> Option<Stmt> {
        self.expect(TokenKind::Identifier, "expected scope name");
        let name = self.prev_lexeme();
        let span = self.prev_span();
        self.expect(TokenKind::Assign, "expected '='");
        let init = self.parse_expression();
        self.optional_semicolon();
        Some(Stmt::Scope(ScopeStmt { name, init, span }))
    }

    fn parse_return_stmt(&mut self) -> Stmt {
        let span = self.prev_span();
        let value = if !self.check(TokenKind::Semicolon) && !self.check(TokenKind::RBrace) {
            Some(self.parse_expression())
        } else {
            None
        };
        self.optional_semicolon();
        Stmt::Return(ReturnStmt { value, span })
    }

    fn parse_break_stmt(&mut self) -> Stmt {
        let span = self.prev_span();
        // An optional break value; statement keywords and closers end the
        // statement instead.
        let value = if !self.check(TokenKind::Semicolon)
            && !self.check(TokenKind::RBrace)
            && !self.check(TokenKind::KwLet)
            && !self.check(TokenKind::KwReturn)
            && !self.check(TokenKind::KwIf)
            && !self.check(TokenKind::KwWhile)
            && !self.check(TokenKind::KwFor)
            && !self.check(TokenKind::KwBreak)
            && !self.check(TokenKind::KwContinue)
        {
            Some(self.parse_expression())
        } else {
            None
        };
        self.optional_semicolon();
        Stmt::Break(BreakStmt { value, span })
    }

    fn parse_if_stmt(&mut self) -> Option<IfStmt> {
        let span = self.prev_span();

        let cond = if self.eat(TokenKind::KwLet) {
            // if let Some(x) = expr { ... }
            self.expect(
                TokenKind::Identifier,
                "expected pattern name (Some, Ok, Err, None)",
            );
            let pattern = self.prev_lexeme();

            let binding = if self.eat(TokenKind::LParen) {
                self.expect(TokenKind::Identifier, "expected variable name in pattern");
                let name = self.prev_lexeme();
                self.expect(TokenKind::RParen, "expected ')' after pattern variable");
                Some(name)
            } else {
                None
            };

            self.expect(TokenKind::Assign, "expected '=' after pattern");
            let value = self.parse_cond_expr();
            CondKind::Let(LetCond {
                pattern,
                binding,
                value,
            })
        } else {
            CondKind::Expr(self.parse_cond_expr())
        };

        let then_block = self.parse_block()?;

        let else_block = if self.eat(TokenKind::KwElse) {
            if self.eat(TokenKind::KwIf) {
                Some(Box::new(Stmt::If(self.parse_if_stmt()?)))
            } else {
                Some(Box::new(Stmt::Block(self.parse_block()?)))
            }
        } else {
            None
        };

        Some(IfStmt {
            cond,
            then_block,
            else_block,
            span,
        })
    }

    fn parse_while_stmt(&mut self) -> Option<WhileStmt> {
        let span = self.prev_span();

        let cond = if self.eat(TokenKind::KwLet) {
            self.expect(TokenKind::Identifier, "expected pattern name (Some, Ok, Err)");
            let pattern = self.prev_lexeme();

            let binding = if self.eat(TokenKind::LParen) {
                self.expect(TokenKind::Identifier, "expected variable name in pattern");
                let name = self.prev_lexeme();
                self.expect(TokenKind::RParen, "expected ')' after pattern variable");
                Some(name)
            } else {
                None
            };

            self.expect(TokenKind::Assign, "expected '=' after pattern");
            let value = self.parse_cond_expr();
            CondKind::Let(LetCond {
                pattern,
                binding,
                value,
            })
        } else {
            CondKind::Expr(self.parse_cond_expr())
        };

        let body = self.parse_block()?;
        Some(WhileStmt { cond, body, span })
    }

    /// Parses a control-flow head expression. An identifier immediately
    /// followed by `{` is taken as a plain identifier — the brace opens the
    /// body, not a struct literal — and struct-literal parsing is
    /// suppressed by entering the grammar at the logical-or tier.
    pub(crate) fn parse_cond_expr(&mut self) -> Expr {
        if self.check(TokenKind::Identifier) && self.check_next(TokenKind::LBrace) {
            self.advance();
            return Expr::Identifier(IdentExpr {
                name: self.prev_lexeme(),
                span: self.prev_span(),
            });
        }
        self.parse_logical_or()
    }

    fn parse_for_stmt(&mut self) -> Option<Stmt> {
        let span = self.prev_span();

        // Destructuring for-in: for (k, v) in iterable { ... }
        if self.eat(TokenKind::LParen) {
            let mut names = Vec::new();
            while !self.check(TokenKind::RParen) && !self.is_at_end() {
                self.expect(TokenKind::Identifier, "expected variable name in destructuring");
                names.push(self.prev_lexeme());
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RParen, "expected ')' after destructuring pattern");
            self.expect(TokenKind::KwIn, "expected 'in' after destructuring pattern");
            let iterable = self.parse_cond_expr();
            let body = self.parse_block()?;
            return Some(Stmt::ForIn(ForInStmt {
                binding: ForBinding::Destructured(names),
                iterable,
                body,
                span,
            }));
        }

        // Plain for-in: for x in iterable { ... }
        if self.check(TokenKind::Identifier) && self.check_next(TokenKind::KwIn) {
            self.advance();
            let var = self.prev_lexeme();
            self.expect(TokenKind::KwIn, "expected 'in'");
            let iterable = self.parse_cond_expr();
            let body = self.parse_block()?;
            return Some(Stmt::ForIn(ForInStmt {
                binding: ForBinding::Single(var),
                iterable,
                body,
                span,
            }));
        }

        // Three-part for: for init; cond; step { body }
        let init = self.parse_for_init();
        self.expect(TokenKind::Semicolon, "expected ';' after for init");
        let cond = self.parse_expression();
        self.expect(TokenKind::Semicolon, "expected ';' after for condition");
        let step = self.parse_for_step();
        let body = self.parse_block()?;

        Some(Stmt::For(ForStmt {
            init: init.map(Box::new),
            cond,
            step: step.map(Box::new),
            body,
            span,
        }))
    }

    fn parse_for_init(&mut self) -> Option<Stmt> {
        if self.check(TokenKind::Identifier) && self.check_next(TokenKind::Colon) {
            // i: i32 = 0
            self.advance();
            let name = self.prev_lexeme();
            let span = self.prev_span();
            self.expect(TokenKind::Colon, "expected ':'");
            let type_name = self.parse_type_name();
            self.expect(TokenKind::Assign, "expected '='");
            let init = self.parse_expression();
            return Some(Stmt::Let(LetStmt {
                name,
                type_name,
                init: Some(init),
                mutable: true,
                span,
            }));
        }
        if self.check(TokenKind::Identifier) && self.check_next(TokenKind::Assign) {
            // i = 0
            self.advance();
            let name = self.prev_lexeme();
            let span = self.prev_span();
            self.expect(TokenKind::Assign, "expected '='");
            let value = self.parse_expression();
            return Some(Stmt::Assign(AssignStmt {
                target: AssignTarget::Name(name),
                op: "=".into(),
                value,
                span,
            }));
        }
        None
    }

    fn parse_for_step(&mut self) -> Option<Stmt> {
        if !self.check(TokenKind::Identifier) {
            return None;
        }
        let next = self.kind_at(self.position() + 1)?;

        if next == TokenKind::Assign {
            self.advance();
            let name = self.prev_lexeme();
            let span = self.prev_span();
            self.advance();
            let value = self.parse_expression();
            return Some(Stmt::Assign(AssignStmt {
                target: AssignTarget::Name(name),
                op: "=".into(),
                value,
                span,
            }));
        }
        if next == TokenKind::PlusPlus || next == TokenKind::MinusMinus {
            self.advance();
            let name = self.prev_lexeme();
            let span = self.prev_span();
            let op = if next == TokenKind::PlusPlus {
                BinOp::Add
            } else {
                BinOp::Sub
            };
            self.advance();
            return Some(Stmt::Assign(desugar_step(name, op, span)));
        }
        if let Some(op) = compound_assign_op(next) {
            self.advance();
            let name = self.prev_lexeme();
            let span = self.prev_span();
            self.advance();
            let rhs = self.parse_expression();
            return Some(Stmt::Assign(desugar_compound(name, op, rhs, span)));
        }
        None
    }
}

/// Maps a compound-assignment token to the underlying binary operator.
fn compound_assign_op(kind: TokenKind) -> Option<BinOp> {
    let op = match kind {
        TokenKind::PlusEq => BinOp::Add,
        TokenKind::MinusEq => BinOp::Sub,
        TokenKind::StarEq => BinOp::Mul,
        TokenKind::SlashEq => BinOp::Div,
        TokenKind::PercentEq => BinOp::Rem,
        TokenKind::StarStarEq => BinOp::Pow,
        TokenKind::AmpEq => BinOp::BitAnd,
        TokenKind::PipeEq => BinOp::BitOr,
        TokenKind::CaretEq => BinOp::BitXor,
        TokenKind::ShlEq => BinOp::Shl,
        TokenKind::ShrEq => BinOp::Shr,
        _ => return None,
    };
    Some(op)
}

/// `name++` / `name--` become `name = name op 1`.
fn desugar_step(name: String, op: BinOp, span: Span) -> AssignStmt {
    let rhs = Expr::int_literal("1", span);
    desugar_compound(name, op, rhs, span)
}

/// `name op= rhs` becomes `name = name op rhs`.
fn desugar_compound(name: String, op: BinOp, rhs: Expr, span: Span) -> AssignStmt {
    let left = Expr::Identifier(IdentExpr {
        name: name.clone(),
        span,
    });
    let value = Expr::Binary(BinaryExpr {
        op,
        left: Box::new(left),
        right: Box::new(rhs),
        span,
    });
    AssignStmt {
        target: AssignTarget::Name(name),
        op: "=".into(),
        value,
        span,
    }
}
