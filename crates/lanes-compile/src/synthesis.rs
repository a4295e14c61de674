//! Move synthesis: turning a layout diff into parallel lane layers.
//!
//! Every moving atom is routed over the lane graph with a [`Router`], or
//! follows the path placement already chose for it. Routes are split into
//! phases so that all inter-word hops of a transition happen in a single
//! step:
//!
//! 1. same-word moves, stage by stage
//! 2. alignment hops bringing inter-word movers onto a word-bus site
//! 3. the inter-word hop
//! 4. settle hops from the crossing site to the final site
//!
//! Within a stage, lanes are grouped by bus signature and split greedily
//! into layers whose members are pairwise compatible. The finished layer
//! list is replayed against the starting occupancy before it is returned.

use std::collections::BTreeMap;

use lanes_arch::{
    ArchSpec, BusReuseHeuristic, Direction, LaneAddress, LaneKind, LocationAddress, Path,
    PathFinder, PathHeuristic, PathSegment,
};
use lanes_ir::QubitId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CompileError, CompileResult};
use crate::placement::ConcreteState;
use crate::routing::{Route, Router};
/// Bus signature of a lane: kind, bus and direction.
pub type LaneSignature = (LaneKind, u32, Direction);

/// Lanes that execute together in one hardware step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveLayer {
    /// The lanes, pairwise compatible.
    pub lanes: Vec<LaneAddress>,
}

impl MoveLayer {
    /// Number of lanes.
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    /// Check if the layer moves nothing.
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// The shared bus signature, if the layer is not empty.
    pub fn signature(&self) -> Option<LaneSignature> {
        self.lanes.first().map(LaneAddress::signature)
    }
}

/// Compute the ordered move layers taking `before` to `after`.
///
/// Atoms are routed in qubit order around every site the layouts use,
/// preferring buses already used in the transition.
pub fn compute_move_layers(
    finder: &PathFinder,
    before: &ConcreteState,
    after: &ConcreteState,
) -> CompileResult<Vec<MoveLayer>> {
    compute_move_layers_along(
        finder,
        before,
        after,
        &BTreeMap::new(),
        Box::new(BusReuseHeuristic::new()),
    )
}

/// Compute move layers, reusing the paths in `hints` where they apply.
///
/// A hint is used when it starts and ends where the qubit does. Hinted
/// paths are committed first; every other atom is routed around them.
pub fn compute_move_layers_along(
    finder: &PathFinder,
    before: &ConcreteState,
    after: &ConcreteState,
    hints: &BTreeMap<QubitId, Path>,
    heuristic: Box<dyn PathHeuristic>,
) -> CompileResult<Vec<MoveLayer>> {
    if before.num_qubits() != after.num_qubits() {
        return Err(CompileError::InvalidProgram(format!(
            "layouts have {} and {} qubits",
            before.num_qubits(),
            after.num_qubits()
        )));
    }
    let arch: &ArchSpec = finder.arch();

    let mut movers = Vec::new();
    for ((qubit, src), &dst) in before.qubits().zip(&after.layout) {
        if src != dst {
            arch.validate_location(src)?;
            arch.validate_location(dst)?;
            movers.push((qubit, src, dst));
        }
    }

    let mut router = Router::new(finder, heuristic, before.blocked());
    router.reserve(movers.iter().map(|&(_, _, dst)| dst));
    let (hinted, free): (Vec<_>, Vec<_>) = movers.into_iter().partition(|(qubit, src, dst)| {
        hints
            .get(qubit)
            .is_some_and(|path| path.src() == *src && path.dst() == *dst)
    });
    for (qubit, src, dst) in hinted {
        let route = hints
            .get(&qubit)
            .and_then(Route::from_path)
            .ok_or(CompileError::UnsupportedMove { src, dst })?;
        router.commit(qubit, route);
    }
    for (qubit, src, dst) in free {
        let route = router
            .route(src, dst)
            .ok_or(CompileError::UnsupportedMove { src, dst })?;
        debug!(%qubit, %src, %dst, lanes = route.len(), "Planned route");
        router.commit(qubit, route);
    }

    let mut intra = Vec::new();
    let mut inter = Vec::new();
    let mut word_pair: Option<(u32, u32)> = None;
    for route in router.into_routes().into_values() {
        match route.word_pair() {
            Some(pair) => {
                if let Some(first) = word_pair.filter(|&first| first != pair) {
                    return Err(CompileError::MultipleWordPairs {
                        first,
                        second: pair,
                    });
                }
                word_pair = Some(pair);
                inter.push(route);
            }
            None => intra.push(route),
        }
    }

    let mut layers = Vec::new();
    for stage in stages(intra.iter().map(|r| r.align.as_slice())) {
        layers.extend(stage_layers(arch, stage)?);
    }
    for stage in stages(inter.iter().map(|r| r.align.as_slice())) {
        layers.extend(stage_layers(arch, stage)?);
    }
    layers.extend(stage_layers(arch, inter.iter().filter_map(|r| r.cross).collect())?);
    for stage in stages(inter.iter().map(|r| r.settle.as_slice())) {
        layers.extend(stage_layers(arch, stage)?);
    }

    replay(arch, before, after, &layers)?;
    debug!(
        movers = intra.len() + inter.len(),
        layers = layers.len(),
        "Synthesized move layers"
    );
    Ok(layers)
}

/// Transpose per-atom hop lists into per-stage hop lists.
fn stages<'a>(hops: impl Iterator<Item = &'a [PathSegment]>) -> Vec<Vec<PathSegment>> {
    let mut stages: Vec<Vec<PathSegment>> = Vec::new();
    for route in hops {
        for (i, seg) in route.iter().enumerate() {
            if stages.len() <= i {
                stages.push(Vec::new());
            }
            stages[i].push(*seg);
        }
    }
    stages
}

fn stage_layers(arch: &ArchSpec, stage: Vec<PathSegment>) -> CompileResult<Vec<MoveLayer>> {
    let mut groups: BTreeMap<LaneSignature, Vec<LaneAddress>> = BTreeMap::new();
    for seg in stage {
        arch.validate_lane(&seg.lane)
            .map_err(|source| CompileError::InvalidLane {
                lane: seg.lane,
                source,
            })?;
        groups.entry(seg.lane.signature()).or_default().push(seg.lane);
    }

    let mut layers = Vec::new();
    for lanes in groups.into_values() {
        let mut split: Vec<MoveLayer> = Vec::new();
        for lane in lanes {
            let slot = split.iter_mut().find(|layer| {
                layer
                    .lanes
                    .iter()
                    .all(|other| arch.compatible_lanes(&lane, other))
            });
            match slot {
                Some(layer) => layer.lanes.push(lane),
                None => split.push(MoveLayer { lanes: vec![lane] }),
            }
        }
        layers.extend(split);
    }
    Ok(layers)
}

/// Execute `layers` on the occupancy of `before` and check the outcome.
fn replay(
    arch: &ArchSpec,
    before: &ConcreteState,
    after: &ConcreteState,
    layers: &[MoveLayer],
) -> CompileResult<()> {
    let mut positions: BTreeMap<LocationAddress, QubitId> =
        before.qubits().map(|(q, loc)| (loc, q)).collect();

    for (index, layer) in layers.iter().enumerate() {
        let mut hops = Vec::with_capacity(layer.len());
        for lane in &layer.lanes {
            let (src, dst) = arch
                .lane_endpoints(lane)
                .map_err(|source| CompileError::InvalidLane {
                    lane: *lane,
                    source,
                })?;
            let qubit = positions.remove(&src).ok_or(CompileError::LaneConflict {
                layer: index,
                location: src,
            })?;
            hops.push((qubit, dst));
        }
        for (qubit, dst) in hops {
            if before.occupied.contains(&dst) || positions.insert(dst, qubit).is_some() {
                return Err(CompileError::LaneConflict {
                    layer: index,
                    location: dst,
                });
            }
        }
    }

    let reached: BTreeMap<QubitId, LocationAddress> =
        positions.into_iter().map(|(loc, q)| (q, loc)).collect();
    for (qubit, expected) in after.qubits() {
        let actual = reached.get(&qubit).copied().unwrap_or(expected);
        if actual != expected {
            return Err(CompileError::RouteMismatch {
                qubit,
                expected,
                actual,
            });
        }
    }
    Ok(())
}
