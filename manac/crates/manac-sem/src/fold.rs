//! Module-wide constant folding.
//!
//! A conservative evaluator over literals and their pure combinations:
//! integer arithmetic including `**`, float arithmetic, boolean logic,
//! numeric comparison, and string concatenation. Any non-foldable
//! sub-expression aborts the fold of its ancestor. Folded results replace
//! the original node as a literal at the same source position.

use manac_par::*;

/// A compile-time constant value.
#[derive(Clone, Debug, PartialEq)]
enum ConstValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

/// Folds constants in every function and impl-method body of the module.
pub fn fold_module(module: &mut Module) {
    for decl in &mut module.decls {
        match decl {
            Decl::Function(func) => {
                if let Some(body) = &mut func.body {
                    fold_block(body);
                }
            }
            Decl::Impl(impl_decl) => {
                for method in &mut impl_decl.methods {
                    if let Some(body) = &mut method.body {
                        fold_block(body);
                    }
                }
            }
            _ => {}
        }
    }
}

fn fold_block(block: &mut Block) {
    for stmt in &mut block.stmts {
        fold_stmt(stmt);
    }
}

fn fold_stmt(stmt: &mut Stmt) {
    match stmt {
        Stmt::Block(block) => fold_block(block),
        Stmt::Let(decl) => {
            if let Some(init) = &mut decl.init {
                fold_expr(init);
            }
        }
        Stmt::Return(ret) => {
            if let Some(value) = &mut ret.value {
                fold_expr(value);
            }
        }
        Stmt::Expr(expr_stmt) => fold_expr(&mut expr_stmt.expr),
        Stmt::Assign(assign) => fold_expr(&mut assign.value),
        Stmt::If(if_stmt) => {
            if let CondKind::Expr(cond) = &mut if_stmt.cond {
                fold_expr(cond);
            }
            fold_block(&mut if_stmt.then_block);
            if let Some(else_block) = &mut if_stmt.else_block {
                fold_stmt(else_block);
            }
        }
        Stmt::While(while_stmt) => {
            if let CondKind::Expr(cond) = &mut while_stmt.cond {
                fold_expr(cond);
            }
            fold_block(&mut while_stmt.body);
        }
        Stmt::For(for_stmt) => {
            if let Some(init) = &mut for_stmt.init {
                fold_stmt(init);
            }
            fold_expr(&mut for_stmt.cond);
            if let Some(step) = &mut for_stmt.step {
                fold_stmt(step);
            }
            fold_block(&mut for_stmt.body);
        }
        Stmt::ForIn(for_in) => fold_block(&mut for_in.body),
        Stmt::Loop(loop_stmt) => fold_block(&mut loop_stmt.body),
        _ => {}
    }
}

fn fold_expr(expr: &mut Expr) {
    // Fold sub-expressions first, so partial folds still simplify.
    match expr {
        Expr::Binary(bin) => {
            fold_expr(&mut bin.left);
            fold_expr(&mut bin.right);
        }
        Expr::Unary(unary) => fold_expr(&mut unary.operand),
        _ => {}
    }

    if let Some(value) = try_fold(expr) {
        // Overflowed float folds have no lexable literal form; leave the
        // expression alone.
        if matches!(value, ConstValue::Float(v) if !v.is_finite()) {
            return;
        }
        let span = expr.span();
        *expr = literal_from(value, span);
    }
}

fn literal_from(value: ConstValue, span: manac_util::Span) -> Expr {
    match value {
        ConstValue::Int(v) => Expr::Literal(LiteralExpr {
            value: v.to_string(),
            kind: LiteralKind::Number,
            span,
        }),
        ConstValue::Float(v) => Expr::Literal(LiteralExpr {
            value: format_float(v),
            kind: LiteralKind::Number,
            span,
        }),
        ConstValue::Bool(v) => Expr::Literal(LiteralExpr {
            value: if v { "true" } else { "false" }.to_string(),
            kind: LiteralKind::Bool,
            span,
        }),
        ConstValue::Str(v) => Expr::Literal(LiteralExpr {
            value: v,
            kind: LiteralKind::Str,
            span,
        }),
    }
}

/// Folded floats emit with at least 17 significant digits and must lex as
/// floats in the target: scientific notation with a 16-digit mantissa
/// fraction, so the text always carries both `.` and an exponent.
fn format_float(v: f64) -> String {
    format!("{:.16e}", v)
}

fn try_fold(expr: &Expr) -> Option<ConstValue> {
    match expr {
        Expr::Literal(lit) => match lit.kind {
            LiteralKind::Bool => Some(ConstValue::Bool(lit.value == "true")),
            LiteralKind::Str => Some(ConstValue::Str(lit.value.clone())),
            LiteralKind::Char => None,
            LiteralKind::Number => {
                if lit.is_float() {
                    lit.value.parse::<f64>().ok().map(ConstValue::Float)
                } else {
                    lit.value.parse::<i64>().ok().map(ConstValue::Int)
                }
            }
        },
        Expr::Binary(bin) => {
            let left = try_fold(&bin.left)?;
            let right = try_fold(&bin.right)?;
            fold_binary(bin.op, left, right)
        }
        Expr::Unary(unary) => {
            let operand = try_fold(&unary.operand)?;
            match (unary.op, operand) {
                (UnOp::Neg, ConstValue::Int(v)) => Some(ConstValue::Int(v.wrapping_neg())),
                (UnOp::Neg, ConstValue::Float(v)) => Some(ConstValue::Float(-v)),
                (UnOp::Not, ConstValue::Bool(v)) => Some(ConstValue::Bool(!v)),
                _ => None,
            }
        }
        _ => None,
    }
}

fn fold_binary(op: BinOp, left: ConstValue, right: ConstValue) -> Option<ConstValue> {
    use ConstValue::*;

    match (&left, &right) {
        (Int(l), Int(r)) => {
            let (l, r) = (*l, *r);
            let value = match op {
                BinOp::Add => Int(l.wrapping_add(r)),
                BinOp::Sub => Int(l.wrapping_sub(r)),
                BinOp::Mul => Int(l.wrapping_mul(r)),
                BinOp::Div if r != 0 => Int(l.wrapping_div(r)),
                BinOp::Rem if r != 0 => Int(l.wrapping_rem(r)),
                BinOp::Pow => {
                    let mut acc: i64 = 1;
                    for _ in 0..r.max(0) {
                        acc = acc.wrapping_mul(l);
                    }
                    Int(acc)
                }
                BinOp::Eq => Bool(l == r),
                BinOp::Ne => Bool(l != r),
                BinOp::Lt => Bool(l < r),
                BinOp::Le => Bool(l <= r),
                BinOp::Gt => Bool(l > r),
                BinOp::Ge => Bool(l >= r),
                _ => return None,
            };
            Some(value)
        }
        (Float(_) | Int(_), Float(_) | Int(_)) => {
            let l = match left {
                Float(v) => v,
                Int(v) => v as f64,
                _ => unreachable!(),
            };
            let r = match right {
                Float(v) => v,
                Int(v) => v as f64,
                _ => unreachable!(),
            };
            let value = match op {
                BinOp::Add => Float(l + r),
                BinOp::Sub => Float(l - r),
                BinOp::Mul => Float(l * r),
                BinOp::Div if r != 0.0 => Float(l / r),
                BinOp::Eq => Bool(l == r),
                BinOp::Ne => Bool(l != r),
                BinOp::Lt => Bool(l < r),
                BinOp::Le => Bool(l <= r),
                BinOp::Gt => Bool(l > r),
                BinOp::Ge => Bool(l >= r),
                _ => return None,
            };
            Some(value)
        }
        (Bool(l), Bool(r)) => {
            let value = match op {
                BinOp::And => Bool(*l && *r),
                BinOp::Or => Bool(*l || *r),
                BinOp::Eq => Bool(l == r),
                BinOp::Ne => Bool(l != r),
                _ => return None,
            };
            Some(value)
        }
        (Str(l), Str(r)) => match op {
            BinOp::Add => Some(Str(format!("{}{}", l, r))),
            _ => None,
        },
        _ => None,
    }
}
