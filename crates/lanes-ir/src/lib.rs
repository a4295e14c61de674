//! Lanes Intermediate Representation
//!
//! Two program forms flow through the lanes compiler:
//!
//! - [`GateProgram`]: the logical input, an ordered list of [`GateLayer`]s
//!   over [`QubitId`]s. Placement decides where qubits sit for each layer.
//! - [`MoveProgram`]: the physical output, a control-flow graph of SSA
//!   [`Statement`]s whose [`Op`]s fill, move, entangle and measure atoms
//!   at concrete sites. The atom-state interpreter runs over this form.
//!
//! [`MoveProgramBuilder`] assembles movement programs block by block and
//! checks them on [`finish`](MoveProgramBuilder::finish).

pub mod builder;
pub mod error;
pub mod layer;
pub mod op;
pub mod program;
pub mod qubit;

pub use builder::MoveProgramBuilder;
pub use error::{IrError, IrResult};
pub use layer::{GateLayer, GateProgram};
pub use op::{Op, Scalar};
pub use program::{Block, BlockId, MoveProgram, ProgramPoint, Statement, Terminator, ValueId};
pub use qubit::QubitId;
