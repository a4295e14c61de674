//! Atom-state interpretation as a compilation pass.

use std::sync::Arc;

use lanes_analysis::{AtomAnalysis, AtomInterpreter};
use lanes_ir::MoveProgram;
use tracing::{debug, warn};

use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Analysis pass that interprets the program and stores its
/// [`AtomAnalysis`] in the property set.
pub struct AtomStateAnalysis;

impl Pass for AtomStateAnalysis {
    fn name(&self) -> &'static str {
        "atom_state_analysis"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, program: &mut MoveProgram, properties: &mut PropertySet) -> CompileResult<()> {
        let path_finder = Arc::clone(properties.require_path_finder()?);
        let analysis = AtomInterpreter::new(path_finder)
            .with_max_iterations(properties.max_iterations)
            .run(program)?;

        if analysis.has_unknown_state() {
            warn!("Atom state is unknown at some program points");
        }
        debug!(
            states = analysis.states.len(),
            detectors = analysis.detectors.len(),
            observables = analysis.observables.len(),
            "Atom-state analysis stored"
        );
        properties.insert(analysis);
        Ok(())
    }
}
