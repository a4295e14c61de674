//! The placement strategy trait.

use std::collections::BTreeSet;

use lanes_ir::QubitId;
use tracing::warn;

use super::{ConcreteState, PlacementState};
use crate::error::CompileResult;
use crate::routing::Router;

/// Decides where qubits sit for each gate layer.
///
/// Strategies are picked when the pipeline is built and shared across
/// layers, so they hold no per-layer state. Per-layer routing state lives
/// in the [`Router`] handed to each call; every move a strategy makes must
/// be committed to it.
pub trait PlacementStrategy: Send + Sync {
    /// Get the name of this strategy.
    fn name(&self) -> &str;

    /// Place every `(controls[i], targets[i])` pair on blockaded sites.
    ///
    /// A malformed request yields [`PlacementState::AnyState`]; a request
    /// that cannot be routed is an error.
    fn cz_placements(
        &self,
        router: &mut Router<'_>,
        state: &ConcreteState,
        controls: &[QubitId],
        targets: &[QubitId],
    ) -> CompileResult<PlacementState>;

    /// Place qubits for a single-qubit layer. Nothing moves by default.
    fn sq_placements(
        &self,
        _router: &mut Router<'_>,
        state: &ConcreteState,
        _qubits: &[QubitId],
    ) -> CompileResult<PlacementState> {
        Ok(PlacementState::Concrete(state.clone()))
    }
}

/// Check the shape of a CZ request against a layout.
///
/// Arity must match, every qubit must exist and no qubit may repeat.
pub(crate) fn is_valid_cz_request(
    state: &ConcreteState,
    controls: &[QubitId],
    targets: &[QubitId],
) -> bool {
    if controls.len() != targets.len() {
        warn!(
            controls = controls.len(),
            targets = targets.len(),
            "CZ arity mismatch"
        );
        return false;
    }
    let mut seen = BTreeSet::new();
    for &qubit in controls.iter().chain(targets) {
        if qubit.index() >= state.num_qubits() {
            warn!(%qubit, "CZ names an unknown qubit");
            return false;
        }
        if !seen.insert(qubit) {
            warn!(%qubit, "CZ names a qubit twice");
            return false;
        }
    }
    true
}
