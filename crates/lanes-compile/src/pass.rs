//! Pass trait and types for compilation passes.

use lanes_ir::MoveProgram;

use crate::error::CompileResult;
use crate::property::PropertySet;

/// The kind of compilation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Analysis pass that reads but does not modify the program.
    Analysis,
    /// Transformation pass that modifies the program.
    Transformation,
}

/// A compilation pass that operates on a movement program.
///
/// Analysis passes must leave the program untouched and report through the
/// [`PropertySet`]. Transformation passes rewrite the program and may read
/// from the `PropertySet`.
pub trait Pass: Send + Sync {
    /// Get the name of this pass.
    fn name(&self) -> &str;

    /// Get the kind of this pass.
    fn kind(&self) -> PassKind;

    /// Run the pass on the given program.
    fn run(&self, program: &mut MoveProgram, properties: &mut PropertySet) -> CompileResult<()>;

    /// Check if this pass should run based on current state.
    fn should_run(&self, _program: &MoveProgram, _properties: &PropertySet) -> bool {
        true
    }
}
