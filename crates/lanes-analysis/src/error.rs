//! Error types for the analysis crate.

use lanes_arch::{AddressError, LaneAddress, LocationAddress};
use lanes_ir::{IrError, ProgramPoint, QubitId};
use thiserror::Error;

/// Errors that abort atom-state interpretation.
///
/// These indicate a malformed movement program, not analysis imprecision;
/// imprecision is expressed through the lattice instead.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum InterpretError {
    /// The program itself is malformed.
    #[error("Invalid program: {0}")]
    Ir(#[from] IrError),

    /// A statement references an address the architecture does not have.
    #[error("Invalid address: {0}")]
    Address(#[from] AddressError),

    /// A site receives a second atom.
    #[error("Site {0} is already occupied")]
    OccupiedSite(LocationAddress),

    /// A qubit id is introduced twice or moved twice in one step.
    #[error("Qubit {0} appears more than once")]
    DuplicateQubit(QubitId),

    /// A lane starts at an empty site.
    #[error("Lane {lane} starts at empty site {location}")]
    EmptySource {
        /// The lane.
        lane: LaneAddress,
        /// Its starting site.
        location: LocationAddress,
    },

    /// A lane ends at an occupied site.
    #[error("Lane {lane} ends at occupied site {location}")]
    OccupiedDestination {
        /// The lane.
        lane: LaneAddress,
        /// Its end site.
        location: LocationAddress,
    },

    /// The bijection between sites and qubits broke.
    #[error("Site/qubit maps are inconsistent")]
    InconsistentState,

    /// The fixpoint did not converge.
    #[error("Interpretation did not converge within {0} block visits")]
    IterationLimit(usize),

    /// An error raised by a specific statement.
    #[error("At {point} ({op}): {source}")]
    AtStatement {
        /// Where the error happened.
        point: ProgramPoint,
        /// Name of the operation.
        op: &'static str,
        /// The underlying error.
        #[source]
        source: Box<InterpretError>,
    },
}

impl InterpretError {
    /// Attach the failing statement to an error.
    pub fn at(self, point: ProgramPoint, op: &'static str) -> Self {
        InterpretError::AtStatement {
            point,
            op,
            source: Box::new(self),
        }
    }

    /// The innermost error, without statement context.
    pub fn root(&self) -> &InterpretError {
        match self {
            InterpretError::AtStatement { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Errors raised while building or applying post-processing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PostProcessError {
    /// The result tree contains an imprecise value.
    #[error("Cannot post-process an unknown {0}")]
    UnknownValue(&'static str),

    /// A shot has fewer bits than there are measured qubits.
    #[error("Shot has {got} bits, expected at least {expected}")]
    TooFewBits {
        /// Bits needed.
        expected: usize,
        /// Bits supplied.
        got: usize,
    },
}

/// Result type for interpretation.
pub type InterpretResult<T> = Result<T, InterpretError>;

/// Result type for post-processing.
pub type PostProcessResult<T> = Result<T, PostProcessError>;
