//! Lanes Compilation Framework
//!
//! This crate turns layered gate programs into movement programs for
//! neutral-atom devices whose atoms are shuttled along site and word buses.
//!
//! # Overview
//!
//! Compilation runs in four stages:
//! 1. **Placement**: decide where every qubit sits for each gate layer, so
//!    that CZ partners are blockaded with each other, routing each mover
//!    over the lane graph
//! 2. **Synthesis**: turn each change of layout into an ordered sequence of
//!    parallel, bus-compatible move layers
//! 3. **Lowering**: emit the movement program with its gates, measurements,
//!    detectors and observables
//! 4. **Passes**: clean up and validate the program, then interpret it to
//!    recover the atom state at every point and the per-shot result function
//!
//! # Architecture
//!
//! ```text
//! GateProgram + InitialLayout
//!       │
//!       ▼
//! ┌────────────────────┐
//! │ PlacementAnalysis  │ ◄── PlacementStrategy (logical, conflict_aware)
//! └────────────────────┘ ◄── Router (PathFinder + HeuristicFactory)
//!       │
//!       ├── compute_move_layers_along (placement paths as hints)
//!       ├── lower_to_move_program
//!       │
//!       ▼
//! ┌─────────────┐
//! │ PassManager │ ◄── PropertySet (architecture, lane graph)
//! └─────────────┘
//!       │
//!       ├── DropEmptyMoves
//!       ├── AddressValidation
//!       └── AtomStateAnalysis
//!       │
//!       ▼
//! CompiledProgram (MoveProgram, AtomAnalysis, PostProcessing)
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use lanes_arch::{LocationAddress, presets};
//! use lanes_compile::{CompileConfig, Compiler, InitialLayout, StrategyKind};
//! use lanes_ir::{GateProgram, QubitId};
//!
//! let arch = Arc::new(presets::logical().unwrap());
//! let mut program = GateProgram::new(2);
//! program.cz([QubitId(0)], [QubitId(1)]).measure();
//!
//! let config = CompileConfig {
//!     strategy: StrategyKind::ConflictAware,
//!     ..CompileConfig::default()
//! };
//! let layout = InitialLayout::new([LocationAddress::new(0, 0), LocationAddress::new(0, 1)]);
//! let compiled = Compiler::new(arch)
//!     .with_config(config)
//!     .compile(&program, &layout)
//!     .unwrap();
//!
//! let shot = compiled.post_processing.apply(&[true, false]).unwrap();
//! println!("{:?}", shot.value);
//! ```
//!
//! # Built-in Passes
//!
//! - [`passes::DropEmptyMoves`]: remove moves with no lanes
//! - [`passes::AddressValidation`]: report every invalid address at once
//! - [`passes::AtomStateAnalysis`]: run the atom-state interpreter

pub mod config;
pub mod error;
pub mod lower;
pub mod manager;
pub mod pass;
pub mod passes;
pub mod pipeline;
pub mod placement;
pub mod property;
pub mod routing;
pub mod synthesis;

pub use config::{CompileConfig, HeuristicKind, StrategyKind};
pub use error::{CompileError, CompileResult};
pub use lower::lower_to_move_program;
pub use manager::{PassManager, PassManagerBuilder};
pub use pass::{Pass, PassKind};
pub use passes::{
    AddressValidation, AtomStateAnalysis, Diagnostic, DropEmptyMoves, ValidationReport,
};
pub use pipeline::{CompiledProgram, Compiler};
pub use placement::{
    ConcreteState, ConflictAwarePlacementStrategy, InitialLayout, LayerPlacement,
    LogicalPlacementStrategy, PlacementAnalysis, PlacementState, PlacementStrategy,
};
pub use property::PropertySet;
pub use routing::{HeuristicFactory, Route, Router, plan_route};
pub use synthesis::{LaneSignature, MoveLayer, compute_move_layers, compute_move_layers_along};
