//! Error types for the compilation crate.

use lanes_analysis::{InterpretError, PostProcessError};
use lanes_arch::{AddressError, ArchError, LaneAddress, LocationAddress};
use lanes_ir::{IrError, QubitId};
use thiserror::Error;

use crate::passes::Diagnostic;

/// Errors that can occur during compilation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// Error from the architecture crate.
    #[error("Architecture error: {0}")]
    Arch(#[from] ArchError),

    /// An address that does not exist on the architecture.
    #[error("Invalid address: {0}")]
    Address(#[from] AddressError),

    /// Error from the IR crate.
    #[error("IR error: {0}")]
    Ir(#[from] IrError),

    /// The atom-state interpreter rejected the lowered program.
    #[error("Interpretation failed: {0}")]
    Interpret(#[from] InterpretError),

    /// The measurement results could not be post-processed.
    #[error("Post-processing failed: {0}")]
    PostProcess(#[from] PostProcessError),

    /// The initial layout has fewer sites than the program has qubits.
    #[error("Program needs {required} qubits but the initial layout has {available} sites")]
    TooFewSites {
        /// Qubits in the program.
        required: usize,
        /// Sites in the layout.
        available: usize,
    },

    /// A site appears twice in the initial layout.
    #[error("Site {0} is assigned twice in the initial layout")]
    DuplicateSite(LocationAddress),

    /// No feasible placement exists for a CZ pair.
    #[error("No placement for CZ between {control} and {target}")]
    NoPlacement {
        /// The control qubit.
        control: QubitId,
        /// The target qubit.
        target: QubitId,
    },

    /// The architecture cannot route between two sites.
    #[error("Cannot route an atom from {src} to {dst}")]
    UnsupportedMove {
        /// Starting site.
        src: LocationAddress,
        /// Requested site.
        dst: LocationAddress,
    },

    /// More than one inter-word direction in a single transition.
    #[error("Transition moves atoms between word pairs {first:?} and {second:?}")]
    MultipleWordPairs {
        /// First `(src_word, dst_word)` pair.
        first: (u32, u32),
        /// Second `(src_word, dst_word)` pair.
        second: (u32, u32),
    },

    /// Synthesis produced a lane the architecture rejects.
    #[error("Synthesized invalid lane {lane}: {source}")]
    InvalidLane {
        /// The lane.
        lane: LaneAddress,
        /// Why it is invalid.
        #[source]
        source: AddressError,
    },

    /// Replaying a move layer collides with another atom or an empty site.
    #[error("Move layer {layer} conflicts at {location}")]
    LaneConflict {
        /// Index of the layer within its transition.
        layer: usize,
        /// The conflicting site.
        location: LocationAddress,
    },

    /// Replaying the move layers does not reach the requested layout.
    #[error("Move layers leave {qubit} at {actual} instead of {expected}")]
    RouteMismatch {
        /// The qubit.
        qubit: QubitId,
        /// Where the layout wants it.
        expected: LocationAddress,
        /// Where the layers left it.
        actual: LocationAddress,
    },

    /// Address validation found problems.
    #[error("Validation failed with {} diagnostic(s)", .0.len())]
    Validation(Vec<Diagnostic>),

    /// Placement lost track of the layout.
    #[error("Placement is imprecise at gate layer {layer}")]
    ImprecisePlacement {
        /// Index of the gate layer.
        layer: usize,
    },

    /// The gate program cannot be lowered.
    #[error("Invalid program: {0}")]
    InvalidProgram(String),

    /// A placement strategy name that does not exist.
    #[error("Unknown placement strategy '{0}'")]
    UnknownStrategy(String),

    /// A path heuristic name that does not exist.
    #[error("Unknown path heuristic '{0}'")]
    UnknownHeuristic(String),

    /// A pass needs the architecture but none was provided.
    #[error("Missing architecture in property set")]
    MissingArch,

    /// A pass needs a result another pass should have produced.
    #[error("Missing property: {0}")]
    MissingProperty(&'static str),
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
