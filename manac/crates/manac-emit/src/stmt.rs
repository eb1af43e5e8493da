//! Statement emission, including the `?` extraction pre-pass, the
//! if-let/while-let desugarings, and the `defer` scope guard.

use manac_par::*;
use std::fmt::Write;

use crate::types::map_type;
use crate::CppEmitter;

/// Check/unwrap method pair for an Option/Result pattern constructor.
/// Lower- and upper-case spellings are a fixed synonym table.
pub(crate) fn pattern_methods(constructor: &str) -> (&'static str, Option<&'static str>) {
    match constructor {
        "Some" | "some" => ("is_some()", Some("unwrap()")),
        "None" | "none" => ("is_none()", None),
        "Ok" | "ok" => ("is_ok()", Some("unwrap()")),
        "Err" | "err" => ("is_err()", Some("unwrap_err()")),
        // Unrecognized constructors fall back to Option behavior.
        _ => ("is_some()", Some("unwrap()")),
    }
}

/// C++ spelling of a declared local type; inference and closure types
/// emit as `auto`.
fn local_type(type_name: &str) -> String {
    if type_name.is_empty() || type_name == "auto" || type_name.starts_with("fn(") {
        "auto".to_string()
    } else {
        map_type(type_name)
    }
}

impl CppEmitter {
    pub(crate) fn emit_stmt(&mut self, stmt: &Stmt, out: &mut String, ind: usize) {
        match stmt {
            Stmt::Block(block) => {
                out.push_str("{\n");
                for inner in &block.stmts {
                    self.emit_stmt(inner, out, ind + 1);
                }
                self.indent(out, ind);
                out.push('}');
            }
            Stmt::Let(decl) => {
                if let Some(init) = &decl.init {
                    self.extract_tries(init, out, ind);
                }
                self.indent(out, ind);
                let _ = write!(out, "{} {}", local_type(&decl.type_name), decl.name);
                if let Some(init) = &decl.init {
                    out.push_str(" = ");
                    self.emit_expr(init, out);
                }
                out.push_str(";\n");
            }
            Stmt::Assign(assign) => {
                self.extract_tries(&assign.value, out, ind);
                self.indent(out, ind);
                match &assign.target {
                    AssignTarget::Name(name) => out.push_str(name),
                    AssignTarget::Expr(target) => self.emit_expr(target, out),
                }
                let _ = write!(out, " {} ", assign.op);
                self.emit_expr(&assign.value, out);
                out.push_str(";\n");
            }
            Stmt::Destructure(destructure) => self.emit_destructure(destructure, out, ind),
            Stmt::If(if_stmt) => self.emit_if(if_stmt, out, ind),
            Stmt::While(while_stmt) => self.emit_while(while_stmt, out, ind),
            Stmt::Loop(loop_stmt) => {
                self.indent(out, ind);
                out.push_str("while (true) ");
                self.emit_stmt(&Stmt::Block(loop_stmt.body.clone()), out, ind);
                out.push('\n');
            }
            Stmt::For(for_stmt) => self.emit_for(for_stmt, out, ind),
            Stmt::ForIn(for_in) => self.emit_for_in(for_in, out, ind),
            Stmt::Break(break_stmt) => {
                self.indent(out, ind);
                if let Some(value) = &break_stmt.value {
                    out.push_str("__loop_result = ");
                    self.emit_expr(value, out);
                    out.push_str("; ");
                }
                out.push_str("break;\n");
            }
            Stmt::Continue(_) => {
                self.indent(out, ind);
                out.push_str("continue;\n");
            }
            Stmt::Return(ret) => {
                if let Some(value) = &ret.value {
                    self.extract_tries(value, out, ind);
                }
                self.indent(out, ind);
                out.push_str("return");
                if let Some(value) = &ret.value {
                    out.push(' ');
                    self.emit_expr(value, out);
                }
                out.push_str(";\n");
            }
            Stmt::Defer(defer) => {
                // Scoped guard: the block runs on any exit from the
                // enclosing scope.
                let id = self.defer_counter;
                self.defer_counter += 1;
                self.indent(out, ind);
                let _ = writeln!(out, "auto __defer_{} = mana::defer([&]() {{", id);
                for inner in &defer.body.stmts {
                    self.emit_stmt(inner, out, ind + 1);
                }
                self.indent(out, ind);
                out.push_str("});\n");
            }
            Stmt::Scope(scope_stmt) => {
                self.indent(out, ind);
                out.push_str("{\n");
                self.indent(out, ind + 1);
                let _ = write!(out, "auto {} = ", scope_stmt.name);
                self.emit_expr(&scope_stmt.init, out);
                out.push_str(";\n");
                self.indent(out, ind);
                out.push_str("}\n");
            }
            Stmt::Expr(expr_stmt) => self.emit_expr_stmt(expr_stmt, out, ind),
        }
    }

    fn emit_destructure(&mut self, destructure: &DestructureStmt, out: &mut String, ind: usize) {
        self.extract_tries(&destructure.init, out, ind);
        let id = self.destructure_counter;
        self.destructure_counter += 1;

        self.indent(out, ind);
        let _ = write!(out, "auto __ds_{} = ", id);
        self.emit_expr(&destructure.init, out);
        out.push_str(";\n");

        for (i, binding) in destructure.bindings.iter().enumerate() {
            self.indent(out, ind);
            let _ = write!(out, "auto {} = ", binding.name);
            match destructure.kind {
                DestructureKind::Tuple => {
                    let _ = write!(out, "std::get<{}>(__ds_{})", i, id);
                }
                DestructureKind::Struct => {
                    let _ = write!(out, "__ds_{}.{}", id, binding.field);
                }
                DestructureKind::Array => {
                    let _ = write!(out, "__ds_{}[{}]", id, i);
                }
            }
            out.push_str(";\n");
        }
    }

    fn emit_if(&mut self, if_stmt: &IfStmt, out: &mut String, ind: usize) {
        self.indent(out, ind);
        match &if_stmt.cond {
            CondKind::Let(let_cond) => {
                let (check, unwrap) = pattern_methods(&let_cond.pattern);
                out.push_str("if (");
                self.emit_expr(&let_cond.value, out);
                let _ = write!(out, ".{}) {{\n", check);
                if let (Some(binding), Some(unwrap)) = (&let_cond.binding, unwrap) {
                    self.indent(out, ind + 1);
                    let _ = write!(out, "auto {} = ", binding);
                    self.emit_expr(&let_cond.value, out);
                    let _ = write!(out, ".{};\n", unwrap);
                }
                for inner in &if_stmt.then_block.stmts {
                    self.emit_stmt(inner, out, ind + 1);
                }
                self.indent(out, ind);
                out.push('}');
            }
            CondKind::Expr(cond) => {
                out.push_str("if (");
                self.emit_expr(cond, out);
                out.push_str(") ");
                self.emit_stmt(&Stmt::Block(if_stmt.then_block.clone()), out, ind);
            }
        }

        if let Some(else_block) = &if_stmt.else_block {
            out.push_str(" else ");
            match &**else_block {
                Stmt::If(nested) => {
                    // Re-emit without the leading indent of emit_if.
                    let mut nested_out = String::new();
                    self.emit_if(nested, &mut nested_out, ind);
                    out.push_str(nested_out.trim_start_matches(' '));
                    return;
                }
                other => self.emit_stmt(other, out, ind),
            }
        }
        out.push('\n');
    }

    fn emit_while(&mut self, while_stmt: &WhileStmt, out: &mut String, ind: usize) {
        self.indent(out, ind);
        match &while_stmt.cond {
            CondKind::Let(let_cond) => {
                // while-let: poll, break when the pattern stops matching.
                let id = self.while_let_counter;
                self.while_let_counter += 1;
                let (check, unwrap) = pattern_methods(&let_cond.pattern);

                out.push_str("while (true) {\n");
                self.indent(out, ind + 1);
                let _ = write!(out, "auto __wl_{} = ", id);
                self.emit_expr(&let_cond.value, out);
                out.push_str(";\n");
                self.indent(out, ind + 1);
                let _ = writeln!(out, "if (!__wl_{}.{}) break;", id, check);
                if let (Some(binding), Some(unwrap)) = (&let_cond.binding, unwrap) {
                    self.indent(out, ind + 1);
                    let _ = writeln!(out, "auto {} = __wl_{}.{};", binding, id, unwrap);
                }
                for inner in &while_stmt.body.stmts {
                    self.emit_stmt(inner, out, ind + 1);
                }
                self.indent(out, ind);
                out.push_str("}\n");
            }
            CondKind::Expr(cond) => {
                out.push_str("while (");
                self.emit_expr(cond, out);
                out.push_str(") ");
                self.emit_stmt(&Stmt::Block(while_stmt.body.clone()), out, ind);
                out.push('\n');
            }
        }
    }

    /// Three-part for loops normally reach the emitter already lowered;
    /// this direct form keeps `--emit-cpp` usable without the middle-end.
    fn emit_for(&mut self, for_stmt: &ForStmt, out: &mut String, ind: usize) {
        self.indent(out, ind);
        out.push_str("for (");
        if let Some(init) = &for_stmt.init {
            match &**init {
                Stmt::Let(decl) => {
                    let _ = write!(out, "{} {}", local_type(&decl.type_name), decl.name);
                    if let Some(init_expr) = &decl.init {
                        out.push_str(" = ");
                        self.emit_expr(init_expr, out);
                    }
                }
                Stmt::Assign(assign) => {
                    if let AssignTarget::Name(name) = &assign.target {
                        let _ = write!(out, "{} = ", name);
                        self.emit_expr(&assign.value, out);
                    }
                }
                _ => {}
            }
        }
        out.push_str("; ");
        self.emit_expr(&for_stmt.cond, out);
        out.push_str("; ");
        if let Some(step) = &for_stmt.step {
            if let Stmt::Assign(assign) = &**step {
                match &assign.target {
                    AssignTarget::Name(name) => out.push_str(name),
                    AssignTarget::Expr(target) => self.emit_expr(target, out),
                }
                let _ = write!(out, " {} ", assign.op);
                self.emit_expr(&assign.value, out);
            }
        }
        out.push_str(") ");
        self.emit_stmt(&Stmt::Block(for_stmt.body.clone()), out, ind);
        out.push('\n');
    }

    fn emit_for_in(&mut self, for_in: &ForInStmt, out: &mut String, ind: usize) {
        self.indent(out, ind);
        match (&for_in.binding, &for_in.iterable) {
            (ForBinding::Single(var), Expr::Range(range)) => {
                let _ = write!(out, "for (int32_t {} = ", var);
                self.emit_expr(&range.start, out);
                let _ = write!(out, "; {} {} ", var, if range.inclusive { "<=" } else { "<" });
                self.emit_expr(&range.end, out);
                let _ = write!(out, "; ++{}) ", var);
            }
            (ForBinding::Destructured(names), _) => {
                let _ = write!(out, "for (auto& [{}] : ", names.join(", "));
                self.emit_expr(&for_in.iterable, out);
                out.push_str(") ");
            }
            (ForBinding::Single(var), _) => {
                let _ = write!(out, "for (auto {} : ", var);
                self.emit_expr(&for_in.iterable, out);
                out.push_str(") ");
            }
        }
        self.emit_stmt(&Stmt::Block(for_in.body.clone()), out, ind);
        out.push('\n');
    }

    fn emit_expr_stmt(&mut self, expr_stmt: &ExprStmt, out: &mut String, ind: usize) {
        self.extract_tries(&expr_stmt.expr, out, ind);
        self.indent(out, ind);

        // Multi-argument print/println stream each argument in turn.
        if let Expr::Call(call) = &expr_stmt.expr {
            if (call.callee == "print" || call.callee == "println") && call.args.len() > 1 {
                out.push_str("([&]{ ");
                for arg in &call.args {
                    out.push_str("std::cout << ");
                    self.emit_expr(arg, out);
                    out.push_str("; ");
                }
                if call.callee == "println" {
                    out.push_str("std::cout << std::endl; ");
                }
                out.push_str("}());\n");
                return;
            }
        }

        self.emit_expr(&expr_stmt.expr, out);
        out.push_str(";\n");
    }

    /// Statement-granularity `?` lowering: each try sub-expression hoists
    /// into `auto __try_N = expr; if (__try_N.__is_err()) return
    /// mana::Err(...)` so the enclosing function propagates. Descends
    /// binary, unary, call, method, index, and cast nodes.
    pub(crate) fn extract_tries(&mut self, expr: &Expr, out: &mut String, ind: usize) {
        match expr {
            Expr::Try(try_expr) => {
                let id = self.try_counter;
                self.try_counter += 1;
                self.hoisted_tries
                    .insert((try_expr.span.line, try_expr.span.column), id);

                self.indent(out, ind);
                let _ = write!(out, "auto __try_{} = ", id);
                self.emit_expr(&try_expr.operand, out);
                out.push_str(";\n");
                self.indent(out, ind);
                let _ = writeln!(
                    out,
                    "if (__try_{}.__is_err()) return mana::Err(__try_{}.__unwrap_err());",
                    id, id
                );
            }
            Expr::Binary(bin) => {
                self.extract_tries(&bin.left, out, ind);
                self.extract_tries(&bin.right, out, ind);
            }
            Expr::Unary(unary) => self.extract_tries(&unary.operand, out, ind),
            Expr::Call(call) => {
                for arg in &call.args {
                    self.extract_tries(arg, out, ind);
                }
            }
            Expr::MethodCall(call) => {
                self.extract_tries(&call.receiver, out, ind);
                for arg in &call.args {
                    self.extract_tries(arg, out, ind);
                }
            }
            Expr::Index(index) => {
                self.extract_tries(&index.base, out, ind);
                self.extract_tries(&index.index, out, ind);
            }
            Expr::Cast(cast) => self.extract_tries(&cast.operand, out, ind),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_util::emit_source;

    #[test]
    fn test_let_with_mapped_type() {
        let cpp = emit_source("module m\nfn main() -> i32 { x: i64 = 5\nreturn 0 }");
        assert!(cpp.contains("int64_t x = 5;"));
    }

    #[test]
    fn test_inferred_let_writes_back_type() {
        let cpp = emit_source("module m\nfn main() -> i32 { let x = 5\nprintln(x)\nreturn 0 }");
        // Semantic inference wrote i32 back into the AST.
        assert!(cpp.contains("int32_t x = 5;"));
    }

    #[test]
    fn test_const_keeps_assignability_out_of_cpp() {
        // Immutability is a source-level rule; the emitted local is plain.
        let cpp = emit_source("module m\nfn main() -> i32 { const x: i32 = 3\nreturn x }");
        assert!(cpp.contains("int32_t x = 3;"));
    }

    #[test]
    fn test_if_else_chain() {
        let cpp = emit_source(
            "module m\nfn f(x: i32) -> i32 {\n  if x > 0 { return 1 } else if x < 0 { return 2 } else { return 3 }\n}\nfn main() -> i32 { return f(0) }",
        );
        assert!(cpp.contains("if ((x > 0)) {"));
        assert!(cpp.contains("} else if ((x < 0)) {"));
        assert!(cpp.contains("} else {"));
    }

    #[test]
    fn test_if_let_lowering() {
        let cpp = emit_source(
            "module m\nfn find() -> Option<i32> { return Some(1) }\nfn main() -> i32 {\n  let o = find()\n  if let Some(v) = o { return v }\n  return 0\n}",
        );
        assert!(cpp.contains("if (o.is_some()) {"));
        assert!(cpp.contains("auto v = o.unwrap();"));
    }

    #[test]
    fn test_while_let_lowering() {
        let cpp = emit_source(
            "module m\nfn next() -> Option<i32> { return None }\nfn main() -> i32 {\n  while let Some(v) = next() { println(v) }\n  return 0\n}",
        );
        assert!(cpp.contains("auto __wl_0 = next();"));
        assert!(cpp.contains("if (!__wl_0.is_some()) break;"));
        assert!(cpp.contains("auto v = __wl_0.unwrap();"));
    }

    #[test]
    fn test_loop_emits_while_true() {
        let cpp = emit_source("module m\nfn main() -> i32 { loop { break }\nreturn 0 }");
        assert!(cpp.contains("while (true) {"));
        assert!(cpp.contains("break;"));
    }

    #[test]
    fn test_for_in_range() {
        let cpp = emit_source(
            "module m\nfn main() -> i32 {\n  for i in 0..10 { println(i) }\n  for j in 0..=5 { println(j) }\n  return 0\n}",
        );
        assert!(cpp.contains("for (int32_t i = 0; i < 10; ++i)"));
        assert!(cpp.contains("for (int32_t j = 0; j <= 5; ++j)"));
    }

    #[test]
    fn test_for_in_destructured() {
        let cpp = emit_source(
            "module m\nfn main() -> i32 {\n  let pairs = Vec::new()\n  for (k, v) in pairs { println(k) }\n  return 0\n}",
        );
        assert!(cpp.contains("for (auto& [k, v] : pairs)"));
    }

    #[test]
    fn test_tuple_destructure_statement() {
        let cpp = emit_source(
            "module m\nfn main() -> i32 {\n  let (a, b) = (1, 2)\n  return a + b\n}",
        );
        assert!(cpp.contains("auto __ds_0 = std::make_tuple(1, 2);"));
        assert!(cpp.contains("auto a = std::get<0>(__ds_0);"));
        assert!(cpp.contains("auto b = std::get<1>(__ds_0);"));
    }

    #[test]
    fn test_struct_destructure_statement() {
        let cpp = emit_source(
            "module m\nstruct P { x: i32, y: i32 }\nfn main() -> i32 {\n  {x, y}: P = P{x: 1, y: 2}\n  return x + y\n}",
        );
        assert!(cpp.contains("auto x = __ds_0.x;"));
        assert!(cpp.contains("auto y = __ds_0.y;"));
    }

    #[test]
    fn test_defer_lowers_to_scope_guard() {
        let cpp = emit_source(
            "module m\nfn main() -> i32 {\n  defer { println(\"bye\") }\n  return 0\n}",
        );
        assert!(cpp.contains("auto __defer_0 = mana::defer([&]() {"));
        assert!(cpp.contains("mana::println(\"bye\");"));
    }

    #[test]
    fn test_scope_statement_emits_block() {
        let cpp = emit_source(
            "module m\nfn acquire() -> i32 { return 1 }\nfn main() -> i32 {\n  scope guard = acquire()\n  return 0\n}",
        );
        assert!(cpp.contains("auto guard = acquire();"));
    }

    #[test]
    fn test_try_extraction_at_statement_level() {
        let cpp = emit_source(
            "module m\nfn read() -> Result<i32, string> { return Ok(1) }\nfn work() -> Result<i32, string> {\n  let v = read()?\n  return Ok(v)\n}\nfn main() -> i32 { return 0 }",
        );
        assert!(cpp.contains("auto __try_0 = read();"));
        assert!(cpp.contains(
            "if (__try_0.__is_err()) return mana::Err(__try_0.__unwrap_err());"
        ));
        // Inference wrote the unwrapped type back into the declaration.
        assert!(cpp.contains("int32_t v = __try_0.__unwrap_ok();"));
    }

    #[test]
    fn test_multiple_tries_in_one_statement() {
        let cpp = emit_source(
            "module m\nfn read() -> Result<i32, string> { return Ok(1) }\nfn work() -> Result<i32, string> {\n  let v = read()? + read()?\n  return Ok(v)\n}\nfn main() -> i32 { return 0 }",
        );
        assert!(cpp.contains("auto __try_0 = read();"));
        assert!(cpp.contains("auto __try_1 = read();"));
        assert!(cpp.contains("(__try_0.__unwrap_ok() + __try_1.__unwrap_ok())"));
    }

    #[test]
    fn test_println_multi_argument() {
        let cpp = emit_source(
            "module m\nfn main() -> i32 {\n  println(\"x = \", 42)\n  return 0\n}",
        );
        assert!(cpp.contains("std::cout << \"x = \";"));
        assert!(cpp.contains("std::cout << 42;"));
        assert!(cpp.contains("std::cout << std::endl;"));
    }

    #[test]
    fn test_member_and_index_assignment() {
        let cpp = emit_source(
            "module m\nstruct P { x: i32 }\nfn main() -> i32 {\n  let p = P{x: 1}\n  p.x = 2\n  let v = Vec::new()\n  v[0] = 3\n  return 0\n}",
        );
        assert!(cpp.contains("p.x = 2;"));
        assert!(cpp.contains("v.at(0) = 3;"));
    }
}
