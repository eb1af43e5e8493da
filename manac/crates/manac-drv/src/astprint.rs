//! Indented AST tree printer behind the `--ast` flag.

use manac_par::*;
use std::fmt::Write;

/// Renders the module as an indented tree, one node per line.
pub fn print_module(module: &Module) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Module {}", module.name);
    for decl in &module.decls {
        print_decl(decl, &mut out, 1);
    }
    out
}

fn pad(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn print_decl(decl: &Decl, out: &mut String, depth: usize) {
    pad(out, depth);
    match decl {
        Decl::Import(d) => {
            let _ = writeln!(out, "Import {:?} (file: {})", d.path, d.is_file_import);
        }
        Decl::Use(d) => {
            let _ = writeln!(out, "Use {}", d.path);
        }
        Decl::Function(d) => {
            let _ = writeln!(
                out,
                "Function {} ({} params) -> {}",
                d.name,
                d.params.len(),
                d.return_type
            );
            if let Some(body) = &d.body {
                print_block(body, out, depth + 1);
            }
        }
        Decl::Struct(d) => {
            let _ = writeln!(out, "Struct {} ({} fields)", d.name, d.fields.len());
        }
        Decl::Enum(d) => {
            let _ = writeln!(out, "Enum {} ({} variants)", d.name, d.variants.len());
            for variant in &d.variants {
                pad(out, depth + 1);
                let _ = writeln!(out, "Variant {}", variant.name);
            }
        }
        Decl::Trait(d) => {
            let _ = writeln!(out, "Trait {} ({} methods)", d.name, d.methods.len());
        }
        Decl::Impl(d) => {
            match &d.trait_name {
                Some(trait_name) => {
                    let _ = writeln!(out, "Impl {} for {}", trait_name, d.type_name);
                }
                None => {
                    let _ = writeln!(out, "Impl {}", d.type_name);
                }
            }
            for method in &d.methods {
                pad(out, depth + 1);
                let _ = writeln!(out, "Method {}", method.name);
                if let Some(body) = &method.body {
                    print_block(body, out, depth + 2);
                }
            }
        }
        Decl::TypeAlias(d) => {
            let _ = writeln!(out, "TypeAlias {} = {}", d.name, d.target_type);
        }
        Decl::Global(d) => {
            let _ = writeln!(out, "Global {}: {}", d.name, d.type_name);
        }
    }
}

fn print_block(block: &Block, out: &mut String, depth: usize) {
    for stmt in &block.stmts {
        print_stmt(stmt, out, depth);
    }
}

fn print_stmt(stmt: &Stmt, out: &mut String, depth: usize) {
    pad(out, depth);
    match stmt {
        Stmt::Block(block) => {
            out.push_str("Block\n");
            print_block(block, out, depth + 1);
        }
        Stmt::Let(s) => {
            let _ = writeln!(
                out,
                "Let {} : {}{}",
                s.name,
                s.type_name,
                if s.mutable { "" } else { " (const)" }
            );
            if let Some(init) = &s.init {
                print_expr(init, out, depth + 1);
            }
        }
        Stmt::Assign(s) => {
            match &s.target {
                AssignTarget::Name(name) => {
                    let _ = writeln!(out, "Assign {}", name);
                }
                AssignTarget::Expr(_) => out.push_str("Assign <expr target>\n"),
            }
            print_expr(&s.value, out, depth + 1);
        }
        Stmt::Destructure(s) => {
            let names: Vec<&str> = s.bindings.iter().map(|b| b.name.as_str()).collect();
            let _ = writeln!(out, "Destructure {:?} [{}]", s.kind, names.join(", "));
        }
        Stmt::If(s) => {
            out.push_str("If\n");
            print_block(&s.then_block, out, depth + 1);
            if let Some(else_block) = &s.else_block {
                pad(out, depth);
                out.push_str("Else\n");
                print_stmt(else_block, out, depth + 1);
            }
        }
        Stmt::While(s) => {
            out.push_str("While\n");
            print_block(&s.body, out, depth + 1);
        }
        Stmt::Loop(s) => {
            out.push_str("Loop\n");
            print_block(&s.body, out, depth + 1);
        }
        Stmt::For(s) => {
            out.push_str("For\n");
            print_block(&s.body, out, depth + 1);
        }
        Stmt::ForIn(s) => {
            match &s.binding {
                ForBinding::Single(name) => {
                    let _ = writeln!(out, "ForIn {}", name);
                }
                ForBinding::Destructured(names) => {
                    let _ = writeln!(out, "ForIn ({})", names.join(", "));
                }
            }
            print_block(&s.body, out, depth + 1);
        }
        Stmt::Break(_) => out.push_str("Break\n"),
        Stmt::Continue(_) => out.push_str("Continue\n"),
        Stmt::Return(s) => {
            out.push_str("Return\n");
            if let Some(value) = &s.value {
                print_expr(value, out, depth + 1);
            }
        }
        Stmt::Defer(s) => {
            out.push_str("Defer\n");
            print_block(&s.body, out, depth + 1);
        }
        Stmt::Scope(s) => {
            let _ = writeln!(out, "Scope {}", s.name);
        }
        Stmt::Expr(s) => {
            out.push_str("ExprStmt\n");
            print_expr(&s.expr, out, depth + 1);
        }
    }
}

fn print_expr(expr: &Expr, out: &mut String, depth: usize) {
    pad(out, depth);
    match expr {
        Expr::Identifier(e) => {
            let _ = writeln!(out, "Identifier {}", e.name);
        }
        Expr::Literal(e) => {
            let _ = writeln!(out, "Literal {:?} {:?}", e.kind, e.value);
        }
        Expr::Call(e) => {
            let _ = writeln!(out, "Call {} ({} args)", e.callee, e.args.len());
            for arg in &e.args {
                print_expr(arg, out, depth + 1);
            }
        }
        Expr::MethodCall(e) => {
            let _ = writeln!(out, "MethodCall .{} ({} args)", e.method, e.args.len());
            print_expr(&e.receiver, out, depth + 1);
        }
        Expr::Binary(e) => {
            let _ = writeln!(out, "Binary {}", e.op.symbol());
            print_expr(&e.left, out, depth + 1);
            print_expr(&e.right, out, depth + 1);
        }
        Expr::Unary(e) => {
            let _ = writeln!(out, "Unary {}", e.op.symbol());
            print_expr(&e.operand, out, depth + 1);
        }
        Expr::Index(e) => {
            out.push_str("Index\n");
            print_expr(&e.base, out, depth + 1);
            print_expr(&e.index, out, depth + 1);
        }
        Expr::Slice(e) => {
            let _ = writeln!(out, "Slice (inclusive: {})", e.inclusive);
            print_expr(&e.base, out, depth + 1);
        }
        Expr::Range(e) => {
            let _ = writeln!(out, "Range (inclusive: {})", e.inclusive);
            print_expr(&e.start, out, depth + 1);
            print_expr(&e.end, out, depth + 1);
        }
        Expr::Member(e) => {
            let _ = writeln!(out, "Member .{}", e.member);
            print_expr(&e.object, out, depth + 1);
        }
        Expr::Tuple(e) => {
            let _ = writeln!(out, "Tuple ({} elements)", e.elements.len());
        }
        Expr::TupleIndex(e) => {
            let _ = writeln!(out, "TupleIndex .{}", e.index);
            print_expr(&e.tuple, out, depth + 1);
        }
        Expr::Array(e) => match &e.kind {
            ArrayKind::List(elements) => {
                let _ = writeln!(out, "Array ({} elements)", elements.len());
            }
            ArrayKind::Fill { .. } => out.push_str("Array (fill)\n"),
        },
        Expr::StructLiteral(e) => {
            let _ = writeln!(out, "StructLiteral {}", e.type_name);
        }
        Expr::ScopeAccess(e) => {
            let _ = writeln!(out, "ScopeAccess {}::{}", e.scope, e.member);
        }
        Expr::SelfValue(_) => out.push_str("Self\n"),
        Expr::Match(e) => {
            let _ = writeln!(out, "Match ({} arms)", e.arms.len());
            print_expr(&e.scrutinee, out, depth + 1);
        }
        Expr::Closure(e) => {
            let _ = writeln!(out, "Closure ({} params)", e.params.len());
        }
        Expr::Try(e) => {
            out.push_str("Try\n");
            print_expr(&e.operand, out, depth + 1);
        }
        Expr::OptionalChain(e) => {
            let _ = writeln!(out, "OptionalChain ?.{}", e.member);
        }
        Expr::NullCoalesce(e) => {
            out.push_str("NullCoalesce\n");
            print_expr(&e.value, out, depth + 1);
            print_expr(&e.default, out, depth + 1);
        }
        Expr::Await(e) => {
            out.push_str("Await\n");
            print_expr(&e.operand, out, depth + 1);
        }
        Expr::Cast(e) => {
            let _ = writeln!(out, "Cast as {}", e.target_type);
            print_expr(&e.operand, out, depth + 1);
        }
        Expr::If(_) => out.push_str("IfExpr\n"),
        Expr::Or(_) => out.push_str("OrExpr\n"),
        Expr::FString(e) => {
            let _ = writeln!(out, "FString ({} parts)", e.parts.len());
        }
        Expr::NoneLiteral(_) => out.push_str("None\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use manac_util::Handler;

    #[test]
    fn test_tree_shape() {
        let handler = Handler::new();
        let module = parse_source(
            "module demo\nfn main() -> i32 {\n  let x = 1 + 2\n  return x\n}",
            &handler,
        );
        let tree = print_module(&module);
        assert!(tree.starts_with("Module demo\n"));
        assert!(tree.contains("Function main"));
        assert!(tree.contains("Let x"));
        assert!(tree.contains("Binary +"));
        assert!(tree.contains("Return"));
    }
}
