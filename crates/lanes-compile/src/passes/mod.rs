//! Built-in compilation passes.
//!
//! - [`DropEmptyMoves`]: removes `Move` statements without lanes
//! - [`AddressValidation`]: checks every address against the architecture
//! - [`AtomStateAnalysis`]: runs the atom-state interpreter

mod atom_state;
mod cleanup;
mod validation;

pub use atom_state::AtomStateAnalysis;
pub use cleanup::{DropEmptyMoves, DroppedMoves};
pub use validation::{AddressValidation, Diagnostic, ValidationReport};
