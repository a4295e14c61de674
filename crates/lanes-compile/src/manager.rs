//! Pass manager for orchestrating compilation.

use std::sync::Arc;

use lanes_arch::{ArchSpec, PathFinder};
use lanes_ir::MoveProgram;
use tracing::{debug, info, instrument};

use crate::error::CompileResult;
use crate::pass::Pass;
use crate::passes::{AddressValidation, AtomStateAnalysis, DropEmptyMoves};
use crate::property::PropertySet;

/// Manages and executes a sequence of compilation passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Names of the passes in execution order.
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Run all passes on the given program.
    #[instrument(skip(self, program, properties))]
    pub fn run(
        &self,
        program: &mut MoveProgram,
        properties: &mut PropertySet,
    ) -> CompileResult<()> {
        info!(
            "Running pass manager with {} passes on program with {} statements",
            self.passes.len(),
            program.num_statements()
        );

        for pass in &self.passes {
            if pass.should_run(program, properties) {
                debug!("Running pass: {}", pass.name());
                pass.run(program, properties)?;
                debug!(
                    "Pass {} completed, statements: {}",
                    pass.name(),
                    program.num_statements()
                );
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }

        info!(
            "Pass manager completed, blocks: {}, statements: {}",
            program.blocks().len(),
            program.num_statements()
        );

        Ok(())
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for the standard pass pipeline.
pub struct PassManagerBuilder {
    /// Whether to run address validation.
    validate: bool,
    /// Target properties.
    properties: PropertySet,
}

impl PassManagerBuilder {
    /// Create a new builder with validation enabled.
    pub fn new() -> Self {
        Self {
            validate: true,
            properties: PropertySet::new(),
        }
    }

    /// Enable or disable address validation.
    #[must_use]
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Set the target properties.
    #[must_use]
    pub fn with_properties(mut self, properties: PropertySet) -> Self {
        self.properties = properties;
        self
    }

    /// Set the target architecture.
    #[must_use]
    pub fn with_arch(mut self, arch: Arc<ArchSpec>) -> Self {
        self.properties = self.properties.with_arch(arch);
        self
    }

    /// Set the target through an already built lane graph.
    #[must_use]
    pub fn with_path_finder(mut self, path_finder: Arc<PathFinder>) -> Self {
        self.properties = self.properties.with_path_finder(path_finder);
        self
    }

    /// Set the interpreter's block-visit cap.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.properties = self.properties.with_max_iterations(max_iterations);
        self
    }

    /// Build the pass manager and return it with the properties.
    pub fn build(self) -> (PassManager, PropertySet) {
        let mut pm = PassManager::new();

        pm.add_pass(DropEmptyMoves);

        if self.validate {
            pm.add_pass(AddressValidation);
        }

        // Interpretation always runs last so it sees the final program.
        pm.add_pass(AtomStateAnalysis);

        (pm, self.properties)
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
