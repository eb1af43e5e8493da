//! Expression emission: builtin dispatch, method mangling, pattern-match
//! lowering, error-propagation desugaring, optional chaining, closures,
//! and f-strings.

use manac_par::*;
use std::fmt::Write;

use crate::builtins::{is_string_method, map_builtin_call};
use crate::stmt::pattern_methods;
use crate::types::{escape_cpp_string, map_type};
use crate::CppEmitter;

impl CppEmitter {
    pub(crate) fn emit_expr(&mut self, expr: &Expr, out: &mut String) {
        match expr {
            Expr::Identifier(id) => out.push_str(&id.name),
            Expr::Literal(lit) => self.emit_literal(lit, out),
            Expr::Binary(bin) => {
                out.push('(');
                self.emit_expr(&bin.left, out);
                let _ = write!(out, " {} ", bin.op.symbol());
                self.emit_expr(&bin.right, out);
                out.push(')');
            }
            Expr::Unary(unary) => self.emit_unary(unary, out),
            Expr::Call(call) => self.emit_call(call, out),
            Expr::MethodCall(call) => self.emit_method_call(call, out),
            Expr::Index(index) => {
                self.emit_expr(&index.base, out);
                out.push_str(".at(");
                self.emit_expr(&index.index, out);
                out.push(')');
            }
            Expr::Slice(slice) => {
                if slice.inclusive {
                    out.push_str("mana::slice_inclusive(");
                } else {
                    out.push_str("mana::slice(");
                }
                self.emit_expr(&slice.base, out);
                out.push_str(", ");
                match &slice.start {
                    Some(start) => self.emit_expr(start, out),
                    None => out.push('0'),
                }
                out.push_str(", ");
                match &slice.end {
                    Some(end) => self.emit_expr(end, out),
                    None => out.push_str("-1"),
                }
                out.push(')');
            }
            Expr::Range(range) => {
                out.push_str("mana::Range<int64_t>{");
                self.emit_expr(&range.start, out);
                out.push_str(", ");
                self.emit_expr(&range.end, out);
                let _ = write!(out, ", {}}}", range.inclusive);
            }
            Expr::Member(member) => {
                self.emit_expr(&member.object, out);
                out.push('.');
                out.push_str(&member.member);
            }
            Expr::Tuple(tuple) => {
                out.push_str("std::make_tuple(");
                for (i, element) in tuple.elements.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.emit_expr(element, out);
                }
                out.push(')');
            }
            Expr::TupleIndex(tuple_index) => {
                let _ = write!(out, "std::get<{}>(", tuple_index.index);
                self.emit_expr(&tuple_index.tuple, out);
                out.push(')');
            }
            Expr::Array(array) => match &array.kind {
                ArrayKind::Fill { value, count } => {
                    out.push_str("mana::fill_array(");
                    self.emit_expr(value, out);
                    out.push_str(", ");
                    self.emit_expr(count, out);
                    out.push(')');
                }
                ArrayKind::List(elements) => {
                    out.push('{');
                    for (i, element) in elements.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        self.emit_expr(element, out);
                    }
                    out.push('}');
                }
            },
            Expr::StructLiteral(lit) => {
                out.push_str(&map_type(&lit.type_name));
                out.push('{');
                for (i, field) in lit.fields.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    if lit.named {
                        if let Some(name) = &field.name {
                            let _ = write!(out, ".{} = ", name);
                        }
                    }
                    self.emit_expr(&field.value, out);
                }
                out.push('}');
            }
            Expr::ScopeAccess(access) => self.emit_scope_access(access, out),
            Expr::SelfValue(_) => out.push_str("self"),
            Expr::Match(match_expr) => self.emit_match(match_expr, out),
            Expr::Closure(closure) => self.emit_closure(closure, out),
            Expr::Try(try_expr) => self.emit_try(try_expr, out),
            Expr::OptionalChain(chain) => self.emit_optional_chain(chain, out),
            Expr::NullCoalesce(coalesce) => {
                // Single-accessor form: the default is evaluated lazily and
                // the contained value is read exactly once.
                out.push('(');
                self.emit_expr(&coalesce.value, out);
                out.push_str(").unwrap_or_else([&]() { return ");
                self.emit_expr(&coalesce.default, out);
                out.push_str("; })");
            }
            Expr::Await(await_expr) => {
                self.emit_expr(&await_expr.operand, out);
                out.push_str(".get()");
            }
            Expr::Cast(cast) => {
                let _ = write!(out, "static_cast<{}>(", map_type(&cast.target_type));
                self.emit_expr(&cast.operand, out);
                out.push(')');
            }
            Expr::If(if_expr) => {
                out.push('(');
                self.emit_expr(&if_expr.condition, out);
                out.push_str(" ? ");
                self.emit_expr(&if_expr.then_expr, out);
                out.push_str(" : ");
                self.emit_expr(&if_expr.else_expr, out);
                out.push(')');
            }
            Expr::Or(or_expr) => self.emit_or(or_expr, out),
            Expr::FString(fstring) => self.emit_fstring(fstring, out),
            Expr::NoneLiteral(_) => out.push_str("mana::None"),
        }
    }

    fn emit_literal(&mut self, lit: &LiteralExpr, out: &mut String) {
        match lit.kind {
            LiteralKind::Str => {
                let _ = write!(out, "\"{}\"", escape_cpp_string(&lit.value));
            }
            LiteralKind::Char => {
                out.push('\'');
                match lit.value.chars().next() {
                    Some('\'') => out.push_str("\\'"),
                    Some(_) | None => out.push_str(&escape_cpp_string(&lit.value)),
                }
                out.push('\'');
            }
            LiteralKind::Number | LiteralKind::Bool => out.push_str(&lit.value),
        }
    }

    fn emit_unary(&mut self, unary: &UnaryExpr, out: &mut String) {
        match unary.op {
            // C++ references bind implicitly; reference-taking is a no-op
            // at emission.
            UnOp::Ref | UnOp::RefMut => {
                out.push('(');
                self.emit_expr(&unary.operand, out);
                out.push(')');
            }
            UnOp::Deref => {
                out.push_str("(*");
                self.emit_expr(&unary.operand, out);
                out.push(')');
            }
            op => {
                out.push('(');
                out.push_str(op.symbol());
                self.emit_expr(&unary.operand, out);
                out.push(')');
            }
        }
    }

    fn emit_call(&mut self, call: &CallExpr, out: &mut String) {
        // Qualified calls: enum constructors, container constructors, and
        // Type::method mangling.
        if let Some((scope, member)) = call.callee.split_once("::") {
            if self.enum_names.contains(scope) {
                if self.adt_enums.contains(scope) {
                    // Tagged-union constructor.
                    let _ = write!(out, "{}::{}(", scope, member);
                    for (i, arg) in call.args.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        self.emit_expr(arg, out);
                    }
                    out.push(')');
                } else {
                    let _ = write!(out, "{}::{}", scope, member);
                }
                return;
            }
            if member == "new" && matches!(scope, "HashMap" | "Vec") {
                let _ = write!(out, "mana::{}<>{{}}", scope);
                return;
            }
            // User static method: Type::func becomes Type_func.
            let mangled = format!("{}_{}", scope, member);
            let _ = write!(out, "{}(", mangled);
            for (i, arg) in call.args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                self.emit_expr(arg, out);
            }
            out.push(')');
            return;
        }

        let name = map_builtin_call(&call.callee).unwrap_or(call.callee.as_str());
        let _ = write!(out, "{}(", name);
        for (i, arg) in call.args.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.emit_expr(arg, out);
        }
        out.push(')');
    }

    fn emit_method_call(&mut self, call: &MethodCallExpr, out: &mut String) {
        // Impl methods rewrite to the mangled free-function form with the
        // receiver as first argument.
        if !call.receiver_type.is_empty() {
            let mangled = format!("{}_{}", call.receiver_type, call.method);
            if self.impl_methods.contains(&mangled) {
                let _ = write!(out, "{}(", mangled);
                self.emit_expr(&call.receiver, out);
                for arg in &call.args {
                    out.push_str(", ");
                    self.emit_expr(arg, out);
                }
                out.push(')');
                return;
            }
        }

        // String helpers route through the runtime on non-Vec receivers;
        // the target string type does not carry them as methods.
        if is_string_method(&call.method) && !call.receiver_type.contains("Vec") {
            let _ = write!(out, "mana::{}(", call.method);
            self.emit_expr(&call.receiver, out);
            for arg in &call.args {
                out.push_str(", ");
                self.emit_expr(arg, out);
            }
            out.push(')');
            return;
        }

        // Native member call on builtin containers.
        self.emit_expr(&call.receiver, out);
        let _ = write!(out, ".{}(", call.method);
        for (i, arg) in call.args.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.emit_expr(arg, out);
        }
        out.push(')');
    }

    fn emit_scope_access(&mut self, access: &ScopeAccessExpr, out: &mut String) {
        if access.member == "new" {
            let _ = write!(out, "mana::{}<>{{}}", access.scope);
            return;
        }
        if self.adt_enums.contains(&access.scope) {
            // A unit variant of a tagged union needs its constructor call.
            let _ = write!(out, "{}::{}()", access.scope, access.member);
            return;
        }
        let _ = write!(out, "{}::{}", access.scope, access.member);
    }

    // -- match lowering -----------------------------------------------------

    /// A match emits as an immediately-invoked lambda capturing the
    /// enclosing scope by reference; arms evaluate in declared order and
    /// a missing wildcard appends a runtime non-exhaustive error.
    fn emit_match(&mut self, match_expr: &MatchExpr, out: &mut String) {
        let id = self.match_counter;
        self.match_counter += 1;
        let value = format!("__match_value_{}", id);

        out.push_str("[&]() {\n");
        let _ = write!(out, "        auto {} = ", value);
        self.emit_expr(&match_expr.scrutinee, out);
        out.push_str(";\n");

        for arm in &match_expr.arms {
            self.emit_match_arm(arm, &value, id, out);
        }

        if !match_expr.has_wildcard {
            out.push_str("        throw std::runtime_error(\"non-exhaustive match\");\n");
        }
        out.push_str("    }()");
    }

    fn emit_match_arm(&mut self, arm: &MatchArm, value: &str, match_id: u32, out: &mut String) {
        // Bare-binding arm: bind the scrutinee, then guard or return.
        if let Some(binding) = &arm.binding {
            out.push_str("        {\n");
            let _ = writeln!(out, "            auto {} = {};", binding, value);
            out.push_str("            ");
            if let Some(guard) = &arm.guard {
                out.push_str("if (");
                self.emit_expr(guard, out);
                out.push_str(") ");
            }
            out.push_str("return ");
            self.emit_expr(&arm.body, out);
            out.push_str(";\n        }\n");
            return;
        }

        let Some(first) = arm.patterns.first() else {
            return;
        };

        // Wildcard: unconditional (or guard-only) return.
        if first.is_wildcard() {
            out.push_str("        ");
            if let Some(guard) = &arm.guard {
                out.push_str("if (");
                self.emit_expr(guard, out);
                out.push_str(") ");
            }
            out.push_str("return ");
            self.emit_expr(&arm.body, out);
            out.push_str(";\n");
            return;
        }

        // Extraction forms bind payload locals before the arm body runs.
        match first {
            Pattern::Option {
                constructor,
                binding,
                ..
            } => {
                let (check, unwrap) = pattern_methods(constructor);
                let _ = writeln!(out, "        if ({}.{}) {{", value, check);
                if let (Some(binding), Some(unwrap)) = (binding, unwrap) {
                    let _ = writeln!(
                        out,
                        "            auto {} = {}.{};",
                        binding, value, unwrap
                    );
                }
                out.push_str("            ");
                if let Some(guard) = &arm.guard {
                    out.push_str("if (");
                    self.emit_expr(guard, out);
                    out.push_str(") ");
                }
                out.push_str("return ");
                self.emit_expr(&arm.body, out);
                out.push_str(";\n        }\n");
                return;
            }
            Pattern::EnumVariant {
                enum_name,
                variant,
                bindings,
                field_bindings,
                ..
            } if self.adt_enums.contains(enum_name)
                && (!bindings.is_empty() || !field_bindings.is_empty()) =>
            {
                let _ = writeln!(
                    out,
                    "        if ({}.tag == {}Tag::{}) {{",
                    value, enum_name, variant
                );
                let _ = writeln!(
                    out,
                    "            auto __data_{} = std::get<{}_{}>({}.data);",
                    match_id, enum_name, variant, value
                );
                for (j, name) in bindings.iter().enumerate() {
                    if name != "_" {
                        let _ = writeln!(
                            out,
                            "            auto {} = __data_{}._{};",
                            name, match_id, j
                        );
                    }
                }
                for (field, bound) in field_bindings {
                    let _ = writeln!(
                        out,
                        "            auto {} = __data_{}.{};",
                        bound, match_id, field
                    );
                }
                out.push_str("            ");
                if let Some(guard) = &arm.guard {
                    out.push_str("if (");
                    self.emit_expr(guard, out);
                    out.push_str(") ");
                }
                out.push_str("return ");
                self.emit_expr(&arm.body, out);
                out.push_str(";\n        }\n");
                return;
            }
            _ => {}
        }

        // Comparison forms: one condition per pattern, or-joined.
        out.push_str("        if (");
        if arm.patterns.len() > 1 {
            out.push('(');
        }
        for (i, pattern) in arm.patterns.iter().enumerate() {
            if i > 0 {
                out.push_str(" || ");
            }
            self.emit_pattern_condition(pattern, value, out);
        }
        if arm.patterns.len() > 1 {
            out.push(')');
        }
        if let Some(guard) = &arm.guard {
            out.push_str(" && (");
            self.emit_expr(guard, out);
            out.push(')');
        }
        out.push_str(") return ");
        self.emit_expr(&arm.body, out);
        out.push_str(";\n");
    }

    fn emit_pattern_condition(&mut self, pattern: &Pattern, value: &str, out: &mut String) {
        match pattern {
            Pattern::Wildcard(_) => out.push_str("true"),
            Pattern::Literal(lit) => {
                let _ = write!(out, "{} == ", value);
                self.emit_literal(lit, out);
            }
            Pattern::Ident(id) => {
                let _ = write!(out, "{} == {}", value, id.name);
            }
            Pattern::Range {
                start,
                end,
                inclusive,
                ..
            } => {
                let _ = write!(out, "({} >= ", value);
                self.emit_literal(start, out);
                let _ = write!(out, " && {} {} ", value, if *inclusive { "<=" } else { "<" });
                self.emit_literal(end, out);
                out.push(')');
            }
            Pattern::Option { constructor, .. } => {
                let (check, _) = pattern_methods(constructor);
                let _ = write!(out, "{}.{}", value, check);
            }
            Pattern::EnumVariant {
                enum_name, variant, ..
            } => {
                if self.adt_enums.contains(enum_name) {
                    let _ = write!(out, "{}.tag == {}Tag::{}", value, enum_name, variant);
                } else {
                    let _ = write!(out, "{} == {}::{}", value, enum_name, variant);
                }
            }
        }
    }

    // -- closures -----------------------------------------------------------

    fn emit_capture_list(&mut self, closure: &ClosureExpr, out: &mut String) {
        out.push('[');
        if closure.has_explicit_captures && !closure.captures.is_empty() {
            for (i, capture) in closure.captures.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                match capture.mode {
                    CaptureMode::ByRef => {
                        let _ = write!(out, "&{}", capture.name);
                    }
                    CaptureMode::ByValue => out.push_str(&capture.name),
                    CaptureMode::ByMove => {
                        let _ = write!(out, "{} = std::move({})", capture.name, capture.name);
                    }
                }
            }
        } else {
            out.push(if closure.captures_by_ref { '&' } else { '=' });
        }
        out.push(']');
    }

    fn emit_closure(&mut self, closure: &ClosureExpr, out: &mut String) {
        self.emit_capture_list(closure, out);
        out.push('(');
        for (i, param) in closure.params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            if param.type_name.is_empty() {
                out.push_str("auto ");
            } else {
                let _ = write!(out, "{} ", map_type(&param.type_name));
            }
            out.push_str(&param.name);
        }
        out.push(')');

        // Moved-in captures need a mutable call operator.
        if closure
            .captures
            .iter()
            .any(|c| c.mode == CaptureMode::ByMove)
        {
            out.push_str(" mutable");
        }

        if let Some(return_type) = &closure.return_type {
            let _ = write!(out, " -> {}", map_type(return_type));
        }

        match &closure.body {
            ClosureBody::Block(block) => {
                out.push_str(" {\n");
                for stmt in &block.stmts {
                    self.emit_stmt(stmt, out, 2);
                }
                out.push_str("    }");
            }
            ClosureBody::Expr(expr) => {
                out.push_str(" { return ");
                self.emit_expr(expr, out);
                out.push_str("; }");
            }
        }
    }

    // -- error propagation --------------------------------------------------

    fn emit_try(&mut self, try_expr: &TryExpr, out: &mut String) {
        // Statement-hoisted tries read their extracted local; anything
        // left in pure expression position throws on failure.
        let key = (try_expr.span.line, try_expr.span.column);
        if let Some(id) = self.hoisted_tries.get(&key) {
            let _ = write!(out, "__try_{}.__unwrap_ok()", id);
            return;
        }

        let id = self.try_counter;
        self.try_counter += 1;
        out.push_str("[&]() {\n");
        let _ = write!(out, "        auto __try_{} = ", id);
        self.emit_expr(&try_expr.operand, out);
        out.push_str(";\n");
        let _ = writeln!(out, "        if (__try_{}.__is_err()) {{", id);
        out.push_str("            throw std::runtime_error(\"error propagation\");\n");
        out.push_str("        }\n");
        let _ = writeln!(out, "        return __try_{}.__unwrap_ok();", id);
        out.push_str("    }()");
    }

    fn emit_optional_chain(&mut self, chain: &OptionalChainExpr, out: &mut String) {
        let id = self.opt_chain_counter;
        self.opt_chain_counter += 1;
        let local = format!("__opt_{}", id);

        // The accessed member expression, repeated for the decltype and
        // both branches.
        let mut access = String::new();
        let _ = write!(access, "{}.unwrap().{}", local, chain.member);
        if chain.is_method_call {
            access.push('(');
            for (i, arg) in chain.args.iter().enumerate() {
                if i > 0 {
                    access.push_str(", ");
                }
                self.emit_expr(arg, &mut access);
            }
            access.push(')');
        }

        out.push_str("[&]() {\n");
        let _ = write!(out, "        auto {} = ", local);
        self.emit_expr(&chain.object, out);
        out.push_str(";\n");
        let _ = writeln!(
            out,
            "        if ({}.is_none()) return mana::make_none<std::decay_t<decltype({})>>();",
            local, access
        );
        let _ = writeln!(
            out,
            "        return mana::Option<std::decay_t<decltype({})>>(mana::Some({}));",
            access, access
        );
        out.push_str("    }()");
    }

    fn emit_or(&mut self, or_expr: &OrExpr, out: &mut String) {
        let id = self.or_counter;
        self.or_counter += 1;

        out.push_str("[&]() {\n");
        let _ = write!(out, "        auto __or_{} = ", id);
        self.emit_expr(&or_expr.value, out);
        out.push_str(";\n");
        let _ = writeln!(
            out,
            "        if (__or_{}.is_ok()) return __or_{}.unwrap();",
            id, id
        );
        match &or_expr.fallback {
            OrFallback::Block(block) => {
                for stmt in &block.stmts {
                    self.emit_stmt(stmt, out, 2);
                }
            }
            OrFallback::Stmt(stmt) => self.emit_stmt(stmt, out, 2),
            OrFallback::Expr(expr) => {
                out.push_str("        return ");
                self.emit_expr(expr, out);
                out.push_str(";\n");
            }
        }
        out.push_str("    }()");
    }

    // -- f-strings ----------------------------------------------------------

    /// F-strings concatenate literal fragments with stringified embedded
    /// expressions; per-expression format specs route through
    /// `mana::format_spec`.
    fn emit_fstring(&mut self, fstring: &FStringExpr, out: &mut String) {
        out.push_str("(std::string(\"\")");
        for part in &fstring.parts {
            out.push_str(" + ");
            match part {
                FStringPart::Literal(text) => {
                    let _ = write!(out, "\"{}\"", escape_cpp_string(text));
                }
                FStringPart::Expr { expr, format_spec } => {
                    if format_spec.is_empty() {
                        out.push_str("mana::to_string(");
                        self.emit_expr(expr, out);
                        out.push(')');
                    } else {
                        out.push_str("mana::format_spec(");
                        self.emit_expr(expr, out);
                        let _ = write!(out, ", \"{}\")", escape_cpp_string(format_spec));
                    }
                }
            }
        }
        out.push(')');
    }
}

#[cfg(test)]
mod tests {
    use crate::test_util::emit_source;

    #[test]
    fn test_builtin_dispatch() {
        let cpp = emit_source(
            "module m\nfn main() -> i32 {\n  let s = to_uppercase(\"hi\")\n  let r = sqrt(2.0)\n  println(s)\n  println(r)\n  return 0\n}",
        );
        assert!(cpp.contains("mana::to_uppercase(\"hi\")"));
        assert!(cpp.contains("std::sqrt(2.0)"));
    }

    #[test]
    fn test_adt_constructor_call() {
        let cpp = emit_source(
            "module m\nvariant E { A(i32), B }\nfn main() -> i32 {\n  let e = E::A(5)\n  let b = E::B\n  return 0\n}",
        );
        assert!(cpp.contains("E::A(5)"));
        assert!(cpp.contains("E E::B()") || cpp.contains("= E::B();"));
    }

    #[test]
    fn test_scalar_enum_value() {
        let cpp = emit_source(
            "module m\nenum Color { Red, Green }\nfn main() -> i32 {\n  let c = Color::Red\n  return 0\n}",
        );
        assert!(cpp.contains("= Color::Red;"));
        assert!(!cpp.contains("Color::Red()"));
    }

    #[test]
    fn test_static_method_mangling_at_call_site() {
        let cpp = emit_source(
            "module m\nstruct C { n: i32 }\nimpl C { static fn make() -> C { return C{n: 1} } }\nfn main() -> i32 {\n  let c = C::make()\n  return c.n\n}",
        );
        assert!(cpp.contains("C_make()"));
    }

    #[test]
    fn test_method_call_rewrites_to_free_function() {
        let cpp = emit_source(
            "module m\nstruct P { x: i32 }\nimpl P { fn get(self) -> i32 { return self.x } }\nfn main() -> i32 {\n  let p = P{x: 3}\n  return p.get()\n}",
        );
        assert!(cpp.contains("P_get(p)"));
    }

    #[test]
    fn test_string_method_routes_through_runtime() {
        let cpp = emit_source(
            "module m\nfn main() -> i32 {\n  let s = \"  pad  \"\n  let t = s.trim()\n  println(t)\n  return 0\n}",
        );
        assert!(cpp.contains("mana::trim(s)"));
    }

    #[test]
    fn test_vec_method_stays_native() {
        let cpp = emit_source(
            "module m\nfn main() -> i32 {\n  v: Vec<i32> = Vec::new()\n  let c = v.contains(3)\n  println(c)\n  return 0\n}",
        );
        assert!(cpp.contains("v.contains(3)"));
        assert!(!cpp.contains("mana::contains(v"));
    }

    #[test]
    fn test_match_lowering_with_wildcard() {
        let cpp = emit_source(
            "module m\nfn main() -> i32 {\n  let x = 2\n  return match x { 1 => 10, 2 | 3 => 20, _ => 0 }\n}",
        );
        assert!(cpp.contains("[&]() {"));
        assert!(cpp.contains("auto __match_value_0 = x;"));
        assert!(cpp.contains("if (__match_value_0 == 1) return 10;"));
        assert!(cpp.contains("(__match_value_0 == 2 || __match_value_0 == 3)"));
        assert!(cpp.contains("return 0;"));
        assert!(!cpp.contains("non-exhaustive match"));
    }

    #[test]
    fn test_match_without_wildcard_throws() {
        let cpp = emit_source(
            "module m\nenum E { A, B }\nfn main() -> i32 {\n  let e = E::A\n  return match e { E::A => 1, E::B => 2, }\n}",
        );
        assert!(cpp.contains("throw std::runtime_error(\"non-exhaustive match\");"));
    }

    #[test]
    fn test_match_range_pattern() {
        let cpp = emit_source(
            "module m\nfn main() -> i32 {\n  let x = 4\n  return match x { 0..5 => 1, 5..=9 => 2, _ => 0 }\n}",
        );
        assert!(cpp.contains("(__match_value_0 >= 0 && __match_value_0 < 5)"));
        assert!(cpp.contains("(__match_value_0 >= 5 && __match_value_0 <= 9)"));
    }

    #[test]
    fn test_match_adt_extraction() {
        let cpp = emit_source(
            "module m\nvariant E { A(i32), B }\nfn main() -> i32 {\n  let e = E::A(5)\n  return match e { E::A(n) => n, E::B => 0, }\n}",
        );
        assert!(cpp.contains("if (__match_value_0.tag == ETag::A) {"));
        assert!(cpp.contains("auto __data_0 = std::get<E_A>(__match_value_0.data);"));
        assert!(cpp.contains("auto n = __data_0._0;"));
        assert!(cpp.contains("if (__match_value_0.tag == ETag::B) return 0;"));
    }

    #[test]
    fn test_match_struct_variant_field_bindings() {
        let cpp = emit_source(
            "module m\nvariant Msg { Move { x: i32, y: i32 }, Quit }\nfn main() -> i32 {\n  let m = Msg::Move(1, 2)\n  return match m { Msg::Move { x, y: py } => x + py, Msg::Quit => 0, }\n}",
        );
        assert!(cpp.contains("auto x = __data_0.x;"));
        assert!(cpp.contains("auto py = __data_0.y;"));
    }

    #[test]
    fn test_match_option_patterns() {
        let cpp = emit_source(
            "module m\nfn get() -> Option<i32> { return Some(1) }\nfn main() -> i32 {\n  let o = get()\n  return match o { Some(v) => v, None => 0, }\n}",
        );
        assert!(cpp.contains("if (__match_value_0.is_some()) {"));
        assert!(cpp.contains("auto v = __match_value_0.unwrap();"));
        assert!(cpp.contains("if (__match_value_0.is_none()) return 0;"));
    }

    #[test]
    fn test_match_binding_arm_with_guard() {
        let cpp = emit_source(
            "module m\nfn main() -> i32 {\n  let x = 3\n  return match x { n if n < 5 => n, _ => 0 }\n}",
        );
        assert!(cpp.contains("auto n = __match_value_0;"));
        assert!(cpp.contains("if ((n < 5)) return n;"));
    }

    #[test]
    fn test_guard_joins_condition() {
        let cpp = emit_source(
            "module m\nfn main() -> i32 {\n  let x = 1\n  let on = true\n  return match x { 1 if on => 5, _ => 0 }\n}",
        );
        assert!(cpp.contains("if (__match_value_0 == 1 && (on)) return 5;"));
    }

    #[test]
    fn test_closure_forms() {
        let cpp = emit_source(
            "module m\nfn main() -> i32 {\n  let add = |a: i32, b: i32| a + b\n  let z = move |x: i32| x\n  let picky = [v, &w, move u]|n: i32| n\n  return 0\n}",
        );
        assert!(cpp.contains("[&](int32_t a, int32_t b) { return (a + b); }"));
        assert!(cpp.contains("[=](int32_t x) { return x; }"));
        assert!(cpp.contains("[v, &w, u = std::move(u)](int32_t n) mutable { return n; }"));
    }

    #[test]
    fn test_closure_with_return_type_and_block() {
        let cpp = emit_source(
            "module m\nfn main() -> i32 {\n  let f = |x: i32| -> i32 { return x + 1 }\n  return 0\n}",
        );
        assert!(cpp.contains("-> int32_t {"));
    }

    #[test]
    fn test_try_in_pure_expression_position_throws() {
        let cpp = emit_source(
            "module m\nfn read() -> Result<i32, string> { return Ok(1) }\nfn main() -> i32 {\n  if read()?.is_ok() { return 1 }\n  return 0\n}",
        );
        // The condition is not a hoisting site; the lambda form applies.
        assert!(cpp.contains("throw std::runtime_error(\"error propagation\");"));
    }

    #[test]
    fn test_optional_chain_lowering() {
        let cpp = emit_source(
            "module m\nstruct User { name: string }\nfn find() -> Option<User> { return None }\nfn main() -> i32 {\n  let u = find()\n  let n = u?.name\n  return 0\n}",
        );
        assert!(cpp.contains("auto __opt_0 = u;"));
        assert!(cpp.contains("if (__opt_0.is_none()) return mana::make_none<"));
        assert!(cpp.contains("mana::Some(__opt_0.unwrap().name)"));
    }

    #[test]
    fn test_null_coalesce_single_accessor() {
        let cpp = emit_source(
            "module m\nfn get() -> Option<i32> { return None }\nfn main() -> i32 {\n  let v = get() ?? 7\n  return v\n}",
        );
        assert!(cpp.contains("unwrap_or_else([&]() { return 7; })"));
        // The double-branch is_some/unwrap shape is gone.
        assert!(!cpp.contains(".is_some()"));
    }

    #[test]
    fn test_or_expression_lowering() {
        let cpp = emit_source(
            "module m\nfn read() -> Result<i32, string> { return Ok(1) }\nfn main() -> i32 {\n  let v = read() or return 1\n  return v\n}",
        );
        assert!(cpp.contains("auto __or_0 = read();"));
        assert!(cpp.contains("if (__or_0.is_ok()) return __or_0.unwrap();"));
        assert!(cpp.contains("return 1;"));
    }

    #[test]
    fn test_fstring_emission() {
        let cpp = emit_source(
            "module m\nfn main() -> i32 {\n  let name = \"ada\"\n  let s = f\"hi {name}, score {9.5:.2f}\"\n  println(s)\n  return 0\n}",
        );
        assert!(cpp.contains("std::string(\"\")"));
        assert!(cpp.contains("+ \"hi \""));
        assert!(cpp.contains("mana::to_string(name)"));
        assert!(cpp.contains("mana::format_spec(9.5, \".2f\")"));
    }

    #[test]
    fn test_cast_and_await() {
        let cpp = emit_source(
            "module m\nasync fn work() -> i32 { return 1 }\nfn main() -> i32 {\n  let x = 3 as f64\n  let t = work()\n  let r = t.await\n  return 0\n}",
        );
        assert!(cpp.contains("static_cast<double>(3)"));
        assert!(cpp.contains("t.get()"));
    }

    #[test]
    fn test_slice_emission() {
        let cpp = emit_source(
            "module m\nfn main() -> i32 {\n  v: Vec<i32> = Vec::new()\n  let a = v[1..3]\n  let b = v[1..=3]\n  return 0\n}",
        );
        assert!(cpp.contains("mana::slice(v, 1, 3)"));
        assert!(cpp.contains("mana::slice_inclusive(v, 1, 3)"));
    }

    #[test]
    fn test_if_expression_ternary() {
        let cpp = emit_source(
            "module m\nfn main() -> i32 {\n  let flag = true\n  let v = if flag { 1 } else { 2 }\n  return v\n}",
        );
        assert!(cpp.contains("(flag ? 1 : 2)"));
    }

    #[test]
    fn test_array_fill_and_list() {
        let cpp = emit_source(
            "module m\nfn main() -> i32 {\n  let a = [1, 2, 3]\n  let b = [0; 8]\n  return 0\n}",
        );
        assert!(cpp.contains("{1, 2, 3}"));
        assert!(cpp.contains("mana::fill_array(0, 8)"));
    }

    #[test]
    fn test_struct_literal_forms() {
        let cpp = emit_source(
            "module m\nstruct P { x: i32, y: i32 }\nfn main() -> i32 {\n  let a = P{x: 1, y: 2}\n  let b = P{3, 4}\n  return 0\n}",
        );
        assert!(cpp.contains("P{.x = 1, .y = 2}"));
        assert!(cpp.contains("P{3, 4}"));
    }

    #[test]
    fn test_none_literal() {
        let cpp = emit_source(
            "module m\nfn get() -> Option<i32> { return None }\nfn main() -> i32 { return 0 }",
        );
        assert!(cpp.contains("return mana::None;"));
    }
}
