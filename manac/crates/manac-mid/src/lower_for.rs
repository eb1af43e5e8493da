//! Three-part `for` lowering.
//!
//! `for (init; cond; step) body` rewrites structurally into
//! `{ init; while (cond) { body; step; } }`. Nested lowerings run
//! bottom-up, so a `for` inside another `for`'s body is rewritten first.

use manac_par::*;

use crate::Pass;

pub struct ForLowering;

impl Pass for ForLowering {
    fn name(&self) -> &'static str {
        "for-lowering"
    }

    fn run(&self, module: &mut Module) {
        for decl in &mut module.decls {
            match decl {
                Decl::Function(func) => {
                    if let Some(body) = &mut func.body {
                        lower_block(body);
                    }
                }
                Decl::Impl(impl_decl) => {
                    for method in &mut impl_decl.methods {
                        if let Some(body) = &mut method.body {
                            lower_block(body);
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

fn lower_block(block: &mut Block) {
    let stmts = std::mem::take(&mut block.stmts);
    block.stmts = stmts.into_iter().map(lower_stmt).collect();
}

fn lower_stmt(stmt: Stmt) -> Stmt {
    match stmt {
        Stmt::For(for_stmt) => lower_for(for_stmt),
        Stmt::Block(mut block) => {
            lower_block(&mut block);
            Stmt::Block(block)
        }
        Stmt::If(mut if_stmt) => {
            lower_block(&mut if_stmt.then_block);
            if let Some(else_block) = if_stmt.else_block {
                if_stmt.else_block = Some(Box::new(lower_stmt(*else_block)));
            }
            Stmt::If(if_stmt)
        }
        Stmt::While(mut while_stmt) => {
            lower_block(&mut while_stmt.body);
            Stmt::While(while_stmt)
        }
        Stmt::Loop(mut loop_stmt) => {
            lower_block(&mut loop_stmt.body);
            Stmt::Loop(loop_stmt)
        }
        Stmt::ForIn(mut for_in) => {
            lower_block(&mut for_in.body);
            Stmt::ForIn(for_in)
        }
        Stmt::Defer(mut defer) => {
            lower_block(&mut defer.body);
            Stmt::Defer(defer)
        }
        other => other,
    }
}

fn lower_for(for_stmt: ForStmt) -> Stmt {
    let ForStmt {
        init,
        cond,
        step,
        mut body,
        span,
    } = for_stmt;

    // Lower the body first so nested loops rewrite bottom-up.
    lower_block(&mut body);

    // while body = { <body statements...>; step; }
    let mut inner = Block {
        stmts: body.stmts,
        span,
    };
    if let Some(step) = step {
        inner.stmts.push(lower_stmt(*step));
    }

    let while_stmt = Stmt::While(WhileStmt {
        cond: CondKind::Expr(cond),
        body: inner,
        span,
    });

    let mut outer = Block {
        stmts: Vec::new(),
        span,
    };
    if let Some(init) = init {
        outer.stmts.push(lower_stmt(*init));
    }
    outer.stmts.push(while_stmt);

    Stmt::Block(outer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{main_body, parse};

    fn lower(source: &str) -> Module {
        let mut module = parse(source);
        ForLowering.run(&mut module);
        module
    }

    #[test]
    fn test_for_becomes_block_with_while() {
        let module = lower(
            "module m\nfn main() -> i32 {\n  for i: i32 = 0; i < 10; i++ { println(i) }\n  return 0\n}",
        );
        let body = main_body(&module);
        match &body.stmts[0] {
            Stmt::Block(outer) => {
                assert!(matches!(&outer.stmts[0], Stmt::Let(l) if l.name == "i"));
                match &outer.stmts[1] {
                    Stmt::While(w) => {
                        // Body ends with the step assignment.
                        assert!(matches!(w.body.stmts.last(), Some(Stmt::Assign(_))));
                    }
                    other => panic!("expected while, got {:?}", other),
                }
            }
            other => panic!("expected block, got {:?}", other),
        }
    }

    #[test]
    fn test_for_without_init_or_step() {
        let module = lower(
            "module m\nfn main() -> i32 {\n  done: bool = false\n  for ; done; { println(1) }\n  return 0\n}",
        );
        let body = main_body(&module);
        match &body.stmts[1] {
            Stmt::Block(outer) => {
                assert!(matches!(&outer.stmts[0], Stmt::While(_)));
            }
            other => panic!("expected block, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_for_lowered_bottom_up() {
        let module = lower(
            "module m\nfn main() -> i32 {\n  for i: i32 = 0; i < 2; i++ {\n    for j: i32 = 0; j < 2; j++ { println(j) }\n  }\n  return 0\n}",
        );
        let debug = format!("{:?}", module);
        assert!(!debug.contains("For("), "nested for not lowered: {}", debug);
    }

    #[test]
    fn test_for_inside_while_and_if() {
        let module = lower(
            "module m\nfn main() -> i32 {\n  while true {\n    if true {\n      for k: i32 = 0; k < 1; k++ { println(k) }\n    }\n  }\n  return 0\n}",
        );
        let debug = format!("{:?}", module);
        assert!(!debug.contains("For("));
    }

    #[test]
    fn test_lowering_idempotent() {
        let mut module = parse(
            "module m\nfn main() -> i32 {\n  for i: i32 = 0; i < 2; i++ { println(i) }\n  return 0\n}",
        );
        ForLowering.run(&mut module);
        let once = module.clone();
        ForLowering.run(&mut module);
        assert_eq!(once, module);
    }

    #[test]
    fn test_impl_method_bodies_lowered() {
        let mut module = parse(
            "module m\nstruct S { n: i32 }\nimpl S {\n  fn count(self) -> i32 {\n    for i: i32 = 0; i < 3; i++ { println(i) }\n    return 0\n  }\n}",
        );
        ForLowering.run(&mut module);
        let debug = format!("{:?}", module);
        assert!(!debug.contains("For("));
    }
}
