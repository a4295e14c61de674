//! Error types for the IR crate.

use thiserror::Error;

use crate::program::{BlockId, ValueId};
use crate::qubit::QubitId;

/// Errors raised while building or checking a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum IrError {
    /// A block was left without a terminator.
    #[error("Block {0} has no terminator")]
    MissingTerminator(BlockId),

    /// A terminator was set twice on the same block.
    #[error("Block {0} already has a terminator")]
    DuplicateTerminator(BlockId),

    /// A branch targets a block that does not exist.
    #[error("Unknown block {0}")]
    UnknownBlock(BlockId),

    /// An operand refers to a value that was never defined.
    #[error("Unknown value {0}")]
    UnknownValue(ValueId),

    /// A jump passes the wrong number of block arguments.
    #[error("Block {target} takes {expected} arguments, got {got}")]
    ArgumentMismatch {
        /// The jump target.
        target: BlockId,
        /// Number of block parameters.
        expected: usize,
        /// Number of arguments passed.
        got: usize,
    },

    /// A gate layer references a qubit beyond the program's qubit count.
    #[error("Qubit {qubit} out of range for a {num_qubits}-qubit program")]
    QubitOutOfRange {
        /// The offending qubit.
        qubit: QubitId,
        /// Number of qubits in the program.
        num_qubits: u32,
    },
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
