//! Placement analysis over gate-layer programs.
//!
//! Starting from an externally chosen [`InitialLayout`], the analysis walks
//! the gate layers forward and asks a [`PlacementStrategy`] where every
//! qubit must sit for each layer. The result is one [`LayerPlacement`] per
//! gate layer, carrying the path chosen for every mover, which move
//! synthesis turns into lane layers.

mod logical;
mod strategy;

use std::collections::{BTreeMap, BTreeSet};

use lanes_analysis::{FiniteLattice, Lattice};
use lanes_arch::{LocationAddress, Path, PathFinder};
use lanes_ir::{GateLayer, GateProgram, QubitId};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::config::HeuristicKind;
use crate::error::{CompileError, CompileResult};
use crate::routing::{HeuristicFactory, Router};

pub use logical::{ConflictAwarePlacementStrategy, LogicalPlacementStrategy};
pub use strategy::PlacementStrategy;

/// A fully known layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcreteState {
    /// Sites that hold no program qubit but may not be used.
    pub occupied: BTreeSet<LocationAddress>,
    /// Site of qubit `i` at index `i`.
    pub layout: Vec<LocationAddress>,
    /// Lanes travelled by qubit `i` at index `i`.
    pub move_count: Vec<u32>,
}

impl ConcreteState {
    /// A layout with no moves yet.
    pub fn new(
        layout: Vec<LocationAddress>,
        occupied: impl IntoIterator<Item = LocationAddress>,
    ) -> Self {
        let move_count = vec![0; layout.len()];
        Self {
            occupied: occupied.into_iter().collect(),
            layout,
            move_count,
        }
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.layout.len()
    }

    /// Site of a qubit.
    pub fn location_of(&self, qubit: QubitId) -> Option<LocationAddress> {
        self.layout.get(qubit.index()).copied()
    }

    /// Qubit at a site.
    pub fn qubit_at(&self, location: LocationAddress) -> Option<QubitId> {
        (0u32..)
            .zip(&self.layout)
            .find(|&(_, &loc)| loc == location)
            .map(|(q, _)| QubitId(q))
    }

    /// Lanes a qubit has travelled so far.
    pub fn move_count(&self, qubit: QubitId) -> u32 {
        self.move_count.get(qubit.index()).copied().unwrap_or(0)
    }

    /// All `(qubit, site)` pairs in qubit order.
    pub fn qubits(&self) -> impl Iterator<Item = (QubitId, LocationAddress)> + '_ {
        (0u32..).zip(&self.layout).map(|(q, &loc)| (QubitId(q), loc))
    }

    /// Every site that is not free: qubit sites and reserved sites.
    pub fn blocked(&self) -> BTreeSet<LocationAddress> {
        self.layout
            .iter()
            .chain(&self.occupied)
            .copied()
            .collect()
    }

    /// Move a qubit to `location`, charging it `lanes` moves.
    pub fn relocate(&mut self, qubit: QubitId, location: LocationAddress, lanes: u32) {
        if let Some(slot) = self.layout.get_mut(qubit.index()) {
            *slot = location;
        }
        if let Some(count) = self.move_count.get_mut(qubit.index()) {
            *count += lanes;
        }
    }
}

/// Abstract placement: nothing, a known layout, or anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "state", rename_all = "snake_case")]
pub enum PlacementState {
    /// Not a layout; bottom.
    NotState,
    /// A known layout.
    Concrete(ConcreteState),
    /// Placement gave up; top.
    AnyState,
}

impl PlacementState {
    /// The layout, if known.
    pub fn as_concrete(&self) -> Option<&ConcreteState> {
        match self {
            PlacementState::Concrete(state) => Some(state),
            _ => None,
        }
    }
}

impl Lattice for PlacementState {
    fn is_subseteq(&self, other: &Self) -> bool {
        match (self, other) {
            (PlacementState::NotState, _) | (_, PlacementState::AnyState) => true,
            (PlacementState::Concrete(a), PlacementState::Concrete(b)) => a == b,
            _ => false,
        }
    }

    fn join(&self, other: &Self) -> Self {
        match (self, other) {
            (PlacementState::NotState, x) | (x, PlacementState::NotState) => x.clone(),
            (PlacementState::Concrete(a), PlacementState::Concrete(b)) if a == b => self.clone(),
            _ => PlacementState::AnyState,
        }
    }

    fn meet(&self, other: &Self) -> Self {
        match (self, other) {
            (PlacementState::AnyState, x) | (x, PlacementState::AnyState) => x.clone(),
            (PlacementState::Concrete(a), PlacementState::Concrete(b)) if a == b => self.clone(),
            _ => PlacementState::NotState,
        }
    }
}

impl FiniteLattice for PlacementState {
    fn bottom() -> Self {
        PlacementState::NotState
    }

    fn top() -> Self {
        PlacementState::AnyState
    }
}

/// Initial sites chosen by an external address analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialLayout {
    /// Site of qubit `i` at index `i`. Extra sites stay reserved.
    pub sites: Vec<LocationAddress>,
    /// Sites that hold atoms outside the program.
    #[serde(default)]
    pub reserved: BTreeSet<LocationAddress>,
}

impl InitialLayout {
    /// A layout with no reserved sites.
    pub fn new(sites: impl IntoIterator<Item = LocationAddress>) -> Self {
        Self {
            sites: sites.into_iter().collect(),
            reserved: BTreeSet::new(),
        }
    }

    /// Reserve additional sites.
    #[must_use]
    pub fn with_reserved(mut self, reserved: impl IntoIterator<Item = LocationAddress>) -> Self {
        self.reserved.extend(reserved);
        self
    }
}

/// Placement before and after one gate layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerPlacement {
    /// Index of the gate layer.
    pub index: usize,
    /// Layout entering the layer.
    pub before: PlacementState,
    /// Layout the layer executes in.
    pub after: PlacementState,
    /// Path each moving qubit takes from `before` to `after`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub paths: BTreeMap<QubitId, Path>,
}

impl LayerPlacement {
    /// Check if the layer requires no movement.
    pub fn is_static(&self) -> bool {
        self.before == self.after
    }
}

/// Forward placement analysis driven by a [`PlacementStrategy`].
///
/// Each gate layer gets its own [`Router`], seeded with every site the
/// incoming layout blocks and a fresh heuristic from the factory.
pub struct PlacementAnalysis<'a> {
    finder: &'a PathFinder,
    strategy: &'a dyn PlacementStrategy,
    heuristics: &'a dyn HeuristicFactory,
    initial: &'a InitialLayout,
}

impl<'a> PlacementAnalysis<'a> {
    /// Create an analysis with the default tie-break heuristic.
    pub fn new(
        finder: &'a PathFinder,
        strategy: &'a dyn PlacementStrategy,
        initial: &'a InitialLayout,
    ) -> Self {
        Self {
            finder,
            strategy,
            heuristics: &HeuristicKind::BusReuse,
            initial,
        }
    }

    /// Use another source of per-layer tie-break heuristics.
    #[must_use]
    pub fn with_heuristics(mut self, heuristics: &'a dyn HeuristicFactory) -> Self {
        self.heuristics = heuristics;
        self
    }

    /// Assign each of the first `num_qubits` sites to its qubit.
    ///
    /// Layout sites past `num_qubits` join the reserved sites.
    pub fn get_initial_state(&self, num_qubits: usize) -> CompileResult<ConcreteState> {
        let sites = &self.initial.sites;
        if sites.len() < num_qubits {
            return Err(CompileError::TooFewSites {
                required: num_qubits,
                available: sites.len(),
            });
        }

        let mut seen = BTreeSet::new();
        for &site in sites.iter().chain(&self.initial.reserved) {
            self.finder.arch().validate_location(site)?;
        }
        for &site in sites {
            if !seen.insert(site) {
                return Err(CompileError::DuplicateSite(site));
            }
        }

        let (layout, spare) = sites.split_at(num_qubits);
        let occupied = self
            .initial
            .reserved
            .iter()
            .chain(spare)
            .copied()
            .filter(|site| !layout.contains(site));
        Ok(ConcreteState::new(layout.to_vec(), occupied))
    }

    /// Compute the placement of every gate layer.
    #[instrument(
        skip(self, program),
        fields(strategy = self.strategy.name(), layers = program.layers.len())
    )]
    pub fn run(&self, program: &GateProgram) -> CompileResult<Vec<LayerPlacement>> {
        let num_qubits = usize::try_from(program.num_qubits).unwrap_or(usize::MAX);
        let mut state = PlacementState::Concrete(self.get_initial_state(num_qubits)?);
        let mut placements = Vec::with_capacity(program.layers.len());

        for (index, layer) in program.layers.iter().enumerate() {
            let (after, paths) = match &state {
                PlacementState::Concrete(concrete) => self.transfer(concrete, layer)?,
                other => (other.clone(), BTreeMap::new()),
            };
            if after.is_top() && !state.is_top() {
                warn!(layer = index, "Placement lost track of the layout");
            }
            debug!(layer = index, moved = state != after, "Placed gate layer");
            placements.push(LayerPlacement {
                index,
                before: state,
                after: after.clone(),
                paths,
            });
            state = after;
        }
        Ok(placements)
    }

    fn transfer(
        &self,
        state: &ConcreteState,
        layer: &GateLayer,
    ) -> CompileResult<(PlacementState, BTreeMap<QubitId, Path>)> {
        let mut router = Router::new(
            self.finder,
            self.heuristics.layer_heuristic(),
            state.blocked(),
        );
        let after = match layer {
            GateLayer::Cz { controls, targets } => {
                self.strategy
                    .cz_placements(&mut router, state, controls, targets)?
            }
            GateLayer::LocalR { qubits, .. } | GateLayer::LocalRz { qubits, .. } => {
                self.strategy.sq_placements(&mut router, state, qubits)?
            }
            GateLayer::GlobalR { .. } | GateLayer::GlobalRz { .. } => {
                let all: Vec<QubitId> = state.qubits().map(|(q, _)| q).collect();
                self.strategy.sq_placements(&mut router, state, &all)?
            }
            GateLayer::Measure | GateLayer::Detector { .. } | GateLayer::Observable { .. } => {
                PlacementState::Concrete(state.clone())
            }
        };
        Ok((after, router.into_paths()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lanes_arch::{PathHeuristic, ZeroHeuristic, presets};

    use super::*;

    fn loc(w: u32, s: u32) -> LocationAddress {
        LocationAddress::new(w, s)
    }

    fn finder() -> PathFinder {
        PathFinder::new(Arc::new(presets::logical().unwrap()))
    }

    #[test]
    fn test_initial_state() {
        let pf = finder();
        let strategy = LogicalPlacementStrategy;
        let initial = InitialLayout::new([loc(0, 0), loc(0, 1), loc(1, 0)])
            .with_reserved([loc(1, 9), loc(0, 1)]);
        let analysis = PlacementAnalysis::new(&pf, &strategy, &initial);

        let state = analysis.get_initial_state(2).unwrap();
        assert_eq!(state.layout, vec![loc(0, 0), loc(0, 1)]);
        assert_eq!(state.occupied, BTreeSet::from([loc(1, 0), loc(1, 9)]));
        assert_eq!(state.move_count, vec![0, 0]);
        assert_eq!(state.qubit_at(loc(0, 1)), Some(QubitId(1)));

        assert!(matches!(
            analysis.get_initial_state(4),
            Err(CompileError::TooFewSites {
                required: 4,
                available: 3
            })
        ));
    }

    #[test]
    fn test_initial_state_rejects_bad_sites() {
        let pf = finder();
        let strategy = LogicalPlacementStrategy;

        let duplicate = InitialLayout::new([loc(0, 0), loc(0, 0)]);
        let analysis = PlacementAnalysis::new(&pf, &strategy, &duplicate);
        assert!(matches!(
            analysis.get_initial_state(2),
            Err(CompileError::DuplicateSite(_))
        ));

        let invalid = InitialLayout::new([loc(5, 0)]);
        let analysis = PlacementAnalysis::new(&pf, &strategy, &invalid);
        assert!(matches!(
            analysis.get_initial_state(1),
            Err(CompileError::Address(_))
        ));
    }

    #[test]
    fn test_placement_lattice() {
        let a = PlacementState::Concrete(ConcreteState::new(vec![loc(0, 0)], []));
        let b = PlacementState::Concrete(ConcreteState::new(vec![loc(0, 1)], []));
        assert_eq!(a.join(&PlacementState::NotState), a);
        assert_eq!(a.join(&b), PlacementState::AnyState);
        assert_eq!(a.meet(&b), PlacementState::NotState);
        assert!(a.is_subseteq(&PlacementState::AnyState));
        assert!(PlacementState::top().is_top());
    }

    #[test]
    fn test_run_propagates_any_state() {
        let pf = finder();
        let strategy = LogicalPlacementStrategy;
        let initial = InitialLayout::new([loc(0, 0), loc(0, 5)]);
        let mut program = GateProgram::new(2);
        program
            .cz([QubitId(0)], [QubitId(1), QubitId(0)])
            .push(GateLayer::GlobalRz {
                rotation_angle: 0.5,
            });

        let placements = PlacementAnalysis::new(&pf, &strategy, &initial)
            .run(&program)
            .unwrap();
        assert_eq!(placements.len(), 2);
        assert!(placements[0].before.as_concrete().is_some());
        assert_eq!(placements[0].after, PlacementState::AnyState);
        assert_eq!(placements[1].before, PlacementState::AnyState);
        assert_eq!(placements[1].after, PlacementState::AnyState);
    }

    #[test]
    fn test_run_records_paths() {
        let pf = finder();
        let strategy = LogicalPlacementStrategy;
        let initial = InitialLayout::new([loc(0, 0), loc(0, 6)]).with_reserved([loc(0, 5)]);
        let mut program = GateProgram::new(2);
        program.cz([QubitId(0)], [QubitId(1)]).measure();

        let placements = PlacementAnalysis::new(&pf, &strategy, &initial)
            .run(&program)
            .unwrap();
        let path = &placements[0].paths[&QubitId(0)];
        assert_eq!(path.src(), loc(0, 0));
        assert_eq!(path.dst(), loc(0, 1));
        assert!(!path.locations().contains(&loc(0, 5)));
        assert!(placements[1].paths.is_empty());
        assert!(placements[1].is_static());
    }

    #[test]
    fn test_heuristics_are_injected() {
        let pf = finder();
        let strategy = LogicalPlacementStrategy;
        let initial = InitialLayout::new([loc(0, 0), loc(0, 6)]);
        let mut program = GateProgram::new(2);
        program.cz([QubitId(0)], [QubitId(1)]);

        // Penalise every detour through (0, 5) so the next one wins.
        let avoid_first = || -> Box<dyn PathHeuristic> {
            Box::new(|locations: &[LocationAddress], _: &[lanes_arch::LaneAddress]| {
                if locations.contains(&LocationAddress::new(0, 5)) {
                    1.0
                } else {
                    0.0
                }
            })
        };
        let default = PlacementAnalysis::new(&pf, &strategy, &initial)
            .run(&program)
            .unwrap();
        let steered = PlacementAnalysis::new(&pf, &strategy, &initial)
            .with_heuristics(&avoid_first)
            .run(&program)
            .unwrap();
        let zero = || -> Box<dyn PathHeuristic> { Box::new(ZeroHeuristic) };
        let plain = PlacementAnalysis::new(&pf, &strategy, &initial)
            .with_heuristics(&zero)
            .run(&program)
            .unwrap();

        let via = |placements: &[LayerPlacement]| placements[0].paths[&QubitId(0)].locations()[1];
        assert_eq!(via(&default[..]), loc(0, 5));
        assert_eq!(via(&plain[..]), loc(0, 5));
        assert_eq!(via(&steered[..]), loc(0, 7));
    }
}
