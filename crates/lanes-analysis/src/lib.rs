//! Lanes Atom-State Analysis
//!
//! A forward abstract interpreter over [`MoveProgram`](lanes_ir::MoveProgram)s
//! that tracks, at every program point, which qubit sits at which site.
//!
//! # Core Components
//!
//! - [`Lattice`] / [`FiniteLattice`]: the ordering used at control-flow merges
//! - [`AtomState`]: the site/qubit bijection and its transitions
//! - [`MoveExecution`]: the abstract value domain, from `Bottom` to `Unknown`
//! - [`AtomInterpreter`]: the work-queue fixpoint driver producing an
//!   [`AtomAnalysis`]
//! - [`PostProcessing`]: a compiled per-shot function turning measurement
//!   bits into return values, detectors and observables
//!
//! Malformed programs (moving from an empty site, filling an occupied one)
//! are hard [`InterpretError`]s. Lost precision is not an error; it shows up
//! as `Unknown` or `Bottom` in the results.

pub mod error;
pub mod interpreter;
pub mod lattice;
pub mod post_processing;
pub mod state;
pub mod value;

pub use error::{InterpretError, InterpretResult, PostProcessError, PostProcessResult};
pub use interpreter::{
    AtomAnalysis, AtomInterpreter, DEFAULT_MAX_ITERATIONS, DetectorRecord, ObservableRecord,
};
pub use lattice::{FiniteLattice, Lattice};
pub use post_processing::{PostProcessing, ReturnValue, ShotResult};
pub use state::{AtomState, QubitPairing};
pub use value::MoveExecution;
