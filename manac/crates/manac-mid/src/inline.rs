//! Inlining pass marker.
//!
//! The pass slot exists so the pipeline order is fixed; no inlining is
//! performed.

use manac_par::Module;

use crate::Pass;

pub struct Inlining;

impl Pass for Inlining {
    fn name(&self) -> &'static str {
        "inlining"
    }

    fn run(&self, _module: &mut Module) {}
}
