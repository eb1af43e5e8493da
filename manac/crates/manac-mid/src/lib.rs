//! manac-mid - Middle-end lowering passes.
//!
//! Structural AST-to-AST rewrites that run between semantic analysis and
//! emission: three-part `for` loops lower to `while` loops, unreachable
//! statements after terminators are removed, and an inlining pass marker
//! exists as a no-op. All passes are idempotent.

mod dce;
mod inline;
mod lower_for;

pub use dce::DeadCodeElimination;
pub use inline::Inlining;
pub use lower_for::ForLowering;

use manac_par::Module;

/// A middle-end pass over a whole module.
pub trait Pass {
    fn name(&self) -> &'static str;
    fn run(&self, module: &mut Module);
}

/// Runs the default pass pipeline in order: for-lowering, dead-code
/// elimination, inlining.
pub fn run_default_passes(module: &mut Module) {
    let passes: [&dyn Pass; 3] = [&ForLowering, &DeadCodeElimination, &Inlining];
    for pass in passes {
        pass.run(module);
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::parse;

    #[test]
    fn test_default_pipeline_runs() {
        let mut module = parse(
            "module m\nfn main() -> i32 {\n  for i: i32 = 0; i < 3; i++ { println(i) }\n  return 0\n}",
        );
        run_default_passes(&mut module);
        // For loops are gone after the pipeline.
        let debug = format!("{:?}", module);
        assert!(!debug.contains("For("));
    }

    #[test]
    fn test_pipeline_idempotent() {
        let mut once = parse(
            "module m\nfn main() -> i32 {\n  for i: i32 = 0; i < 3; i++ { println(i) }\n  return 0\n  println(\"dead\")\n}",
        );
        run_default_passes(&mut once);
        let mut twice = once.clone();
        run_default_passes(&mut twice);
        assert_eq!(once, twice);
    }
}
