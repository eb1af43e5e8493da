//! Statement-level dead-code elimination.
//!
//! Within each function body, statements after one that always terminates
//! (return/break/continue, or an `if` whose branches both terminate) are
//! removed from the block. Runs after semantic analysis, which has already
//! warned about the unreachable statements being dropped here.

use manac_par::*;

use crate::Pass;

pub struct DeadCodeElimination;

impl Pass for DeadCodeElimination {
    fn name(&self) -> &'static str {
        "dead-code-elimination"
    }

    fn run(&self, module: &mut Module) {
        for decl in &mut module.decls {
            match decl {
                Decl::Function(func) => {
                    if let Some(body) = &mut func.body {
                        eliminate_in_block(body);
                    }
                }
                Decl::Impl(impl_decl) => {
                    for method in &mut impl_decl.methods {
                        if let Some(body) = &mut method.body {
                            eliminate_in_block(body);
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

/// Whether a statement is a direct terminator.
fn is_terminator(stmt: &Stmt) -> bool {
    matches!(stmt, Stmt::Return(_) | Stmt::Break(_) | Stmt::Continue(_))
}

/// Whether a statement terminates on every path.
fn always_terminates(stmt: &Stmt) -> bool {
    if is_terminator(stmt) {
        return true;
    }
    match stmt {
        Stmt::Block(block) => block.stmts.iter().any(always_terminates),
        Stmt::If(if_stmt) => match &if_stmt.else_block {
            None => false,
            Some(else_block) => {
                if_stmt.then_block.stmts.iter().any(always_terminates)
                    && always_terminates(else_block)
            }
        },
        _ => false,
    }
}

fn eliminate_in_block(block: &mut Block) {
    // Recurse into nested bodies first.
    for stmt in &mut block.stmts {
        match stmt {
            Stmt::Block(inner) => eliminate_in_block(inner),
            Stmt::If(if_stmt) => {
                eliminate_in_block(&mut if_stmt.then_block);
                if let Some(else_block) = &mut if_stmt.else_block {
                    if let Stmt::Block(inner) = &mut **else_block {
                        eliminate_in_block(inner);
                    } else if let Stmt::If(_) = &mut **else_block {
                        eliminate_in_else_chain(else_block);
                    }
                }
            }
            Stmt::While(while_stmt) => eliminate_in_block(&mut while_stmt.body),
            Stmt::Loop(loop_stmt) => eliminate_in_block(&mut loop_stmt.body),
            Stmt::ForIn(for_in) => eliminate_in_block(&mut for_in.body),
            Stmt::Defer(defer) => eliminate_in_block(&mut defer.body),
            _ => {}
        }
    }

    // Truncate everything after the first statement that always
    // terminates.
    if let Some(pos) = block.stmts.iter().position(always_terminates) {
        block.stmts.truncate(pos + 1);
    }
}

fn eliminate_in_else_chain(stmt: &mut Stmt) {
    if let Stmt::If(if_stmt) = stmt {
        eliminate_in_block(&mut if_stmt.then_block);
        if let Some(else_block) = &mut if_stmt.else_block {
            match &mut **else_block {
                Stmt::Block(inner) => eliminate_in_block(inner),
                nested @ Stmt::If(_) => eliminate_in_else_chain(nested),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{main_body, parse};

    fn eliminate(source: &str) -> Module {
        let mut module = parse(source);
        DeadCodeElimination.run(&mut module);
        module
    }

    #[test]
    fn test_statements_after_return_removed() {
        let module = eliminate(
            "module m\nfn main() -> i32 {\n  return 0\n  println(\"dead\")\n  println(\"more\")\n}",
        );
        assert_eq!(main_body(&module).stmts.len(), 1);
    }

    #[test]
    fn test_statements_after_terminating_if_removed() {
        let module = eliminate(
            "module m\nfn main() -> i32 {\n  if true { return 1 } else { return 2 }\n  println(\"dead\")\n}",
        );
        let body = main_body(&module);
        assert_eq!(body.stmts.len(), 1);
        assert!(matches!(&body.stmts[0], Stmt::If(_)));
    }

    #[test]
    fn test_if_without_else_keeps_following_code() {
        let module = eliminate(
            "module m\nfn main() -> i32 {\n  if true { return 1 }\n  return 0\n}",
        );
        assert_eq!(main_body(&module).stmts.len(), 2);
    }

    #[test]
    fn test_nested_block_cleaned() {
        let module = eliminate(
            "module m\nfn main() -> i32 {\n  while true {\n    break\n    println(\"dead\")\n  }\n  return 0\n}",
        );
        let body = main_body(&module);
        match &body.stmts[0] {
            Stmt::While(w) => assert_eq!(w.body.stmts.len(), 1),
            other => panic!("expected while, got {:?}", other),
        }
    }

    #[test]
    fn test_dce_idempotent() {
        let mut module = parse(
            "module m\nfn main() -> i32 {\n  return 0\n  println(\"dead\")\n}",
        );
        DeadCodeElimination.run(&mut module);
        let once = module.clone();
        DeadCodeElimination.run(&mut module);
        assert_eq!(once, module);
    }

    #[test]
    fn test_live_code_untouched() {
        let module = eliminate(
            "module m\nfn main() -> i32 {\n  let x = 1\n  println(x)\n  return x\n}",
        );
        assert_eq!(main_body(&module).stmts.len(), 3);
    }
}
