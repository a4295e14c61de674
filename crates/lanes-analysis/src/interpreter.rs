//! Forward abstract interpretation of movement programs.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use lanes_arch::{ArchSpec, LocationAddress, PathFinder, ZoneAddress};
use lanes_ir::{BlockId, MoveProgram, Op, ProgramPoint, Scalar, Terminator, ValueId};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, instrument, warn};

use crate::error::{InterpretError, InterpretResult, PostProcessResult};
use crate::lattice::Lattice;
use crate::post_processing::PostProcessing;
use crate::state::AtomState;
use crate::value::MoveExecution;

/// Default cap on block visits before giving up.
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// A detector declared by the program.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorRecord {
    /// Where it was declared.
    pub point: ProgramPoint,
    /// The measurements it XORs.
    pub measurements: MoveExecution,
    /// Its coordinates.
    pub coordinates: Vec<f64>,
}

/// A logical observable declared by the program.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservableRecord {
    /// Where it was declared.
    pub point: ProgramPoint,
    /// The measurements it XORs.
    pub measurements: MoveExecution,
    /// Its index.
    pub index: u32,
}

/// Result of interpreting a movement program.
#[derive(Debug, Clone)]
pub struct AtomAnalysis {
    /// Abstract value of every SSA value.
    pub values: Vec<MoveExecution>,
    /// Result of every state-producing statement, by program point.
    pub states: BTreeMap<ProgramPoint, MoveExecution>,
    /// Join of all returned values.
    pub return_value: MoveExecution,
    /// Detectors in program order.
    pub detectors: Vec<DetectorRecord>,
    /// Observables in program order.
    pub observables: Vec<ObservableRecord>,
}

impl AtomAnalysis {
    /// Abstract value of an SSA value.
    pub fn value(&self, id: ValueId) -> &MoveExecution {
        self.values
            .get(id.0 as usize)
            .unwrap_or(&MoveExecution::Bottom)
    }

    /// State after the statement at `point`.
    pub fn state_at(&self, point: ProgramPoint) -> Option<&MoveExecution> {
        self.states.get(&point)
    }

    /// Check if any recorded state lost precision.
    pub fn has_unknown_state(&self) -> bool {
        self.states.values().any(|v| matches!(v, MoveExecution::Unknown))
    }

    /// Compile the result trees into a reusable per-shot function.
    pub fn post_processing(&self) -> PostProcessResult<PostProcessing> {
        PostProcessing::compile(&self.return_value, &self.detectors, &self.observables)
    }
}

/// Tracks the atom layout through a movement program.
///
/// Blocks are visited from a work queue until block parameters stop
/// changing. A branch on a known boolean only follows the taken edge.
#[derive(Debug, Clone)]
pub struct AtomInterpreter {
    path_finder: Arc<PathFinder>,
    max_iterations: usize,
}

struct Frame {
    values: Vec<MoveExecution>,
    states: BTreeMap<ProgramPoint, MoveExecution>,
    detectors: BTreeMap<ProgramPoint, DetectorRecord>,
    observables: BTreeMap<ProgramPoint, ObservableRecord>,
    return_value: MoveExecution,
}

impl Frame {
    fn get(&self, id: ValueId) -> InterpretResult<&MoveExecution> {
        self.values
            .get(id.0 as usize)
            .ok_or(InterpretError::Ir(lanes_ir::IrError::UnknownValue(id)))
    }
}

impl AtomInterpreter {
    /// Create an interpreter over an architecture's lane graph.
    pub fn new(path_finder: Arc<PathFinder>) -> Self {
        Self {
            path_finder,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Set the block-visit cap.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Interpret `program` to a fixpoint.
    #[instrument(skip(self, program), fields(blocks = program.blocks().len()))]
    pub fn run(&self, program: &MoveProgram) -> InterpretResult<AtomAnalysis> {
        program.validate()?;

        let mut frame = Frame {
            values: vec![MoveExecution::Bottom; program.num_values() as usize],
            states: BTreeMap::new(),
            detectors: BTreeMap::new(),
            observables: BTreeMap::new(),
            return_value: MoveExecution::Bottom,
        };
        if let Some(entry) = program.block(BlockId::ENTRY) {
            for param in &entry.params {
                frame.values[param.0 as usize] = MoveExecution::Unknown;
            }
        }

        let users = value_users(program);
        let mut queue = VecDeque::from([BlockId::ENTRY]);
        let mut queued: FxHashSet<BlockId> = FxHashSet::from_iter([BlockId::ENTRY]);
        let mut visited: FxHashSet<BlockId> = FxHashSet::default();
        let mut iterations = 0;

        while let Some(block_id) = queue.pop_front() {
            queued.remove(&block_id);
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(InterpretError::IterationLimit(self.max_iterations));
            }
            visited.insert(block_id);

            let Some(block) = program.block(block_id) else {
                continue;
            };
            for (index, stmt) in block.statements.iter().enumerate() {
                let point = ProgramPoint::new(block_id, index);
                let value = self
                    .eval(&mut frame, point, &stmt.op)
                    .map_err(|e| e.at(point, stmt.op.name()))?;
                if produces_state(&stmt.op) {
                    frame.states.insert(point, value.clone());
                }
                let slot = &mut frame.values[stmt.result.0 as usize];
                if *slot != value {
                    *slot = value;
                    for &user in users.get(&stmt.result).into_iter().flatten() {
                        if user != block_id && visited.contains(&user) {
                            enqueue(&mut queue, &mut queued, user);
                        }
                    }
                }
            }

            for (target, args) in self.taken_edges(&frame, &block.terminator)? {
                let Some(target_block) = program.block(target) else {
                    continue;
                };
                let mut changed = !visited.contains(&target);
                for (param, arg) in target_block.params.iter().zip(args) {
                    let incoming = frame.get(*arg)?.clone();
                    let slot = &mut frame.values[param.0 as usize];
                    let joined = slot.join(&incoming);
                    if joined != *slot {
                        if matches!(joined, MoveExecution::Unknown) {
                            warn!(
                                block = %target,
                                param = %param,
                                "Block parameter lost precision"
                            );
                        }
                        *slot = joined;
                        changed = true;
                        for &user in users.get(param).into_iter().flatten() {
                            if visited.contains(&user) {
                                enqueue(&mut queue, &mut queued, user);
                            }
                        }
                    }
                }
                if changed {
                    enqueue(&mut queue, &mut queued, target);
                }
            }

            if let Terminator::Return { value } = &block.terminator {
                let returned = frame.get(*value)?.clone();
                frame.return_value = frame.return_value.join(&returned);
            }
        }

        debug!(iterations, states = frame.states.len(), "Atom-state analysis converged");

        Ok(AtomAnalysis {
            values: frame.values,
            states: frame.states,
            return_value: frame.return_value,
            detectors: frame.detectors.into_values().collect(),
            observables: frame.observables.into_values().collect(),
        })
    }

    fn taken_edges<'t>(
        &self,
        frame: &Frame,
        terminator: &'t Terminator,
    ) -> InterpretResult<Vec<(BlockId, &'t [ValueId])>> {
        let edges = terminator.successors();
        let Terminator::Branch { cond, .. } = terminator else {
            return Ok(edges);
        };
        Ok(match frame.get(*cond)? {
            MoveExecution::Value(Scalar::Bool(true)) => edges.into_iter().take(1).collect(),
            MoveExecution::Value(Scalar::Bool(false)) => edges.into_iter().skip(1).collect(),
            MoveExecution::Bottom => Vec::new(),
            _ => edges,
        })
    }

    fn eval(
        &self,
        frame: &mut Frame,
        point: ProgramPoint,
        op: &Op,
    ) -> InterpretResult<MoveExecution> {
        let arch = self.path_finder.arch();

        if let Some(input) = op.state_input() {
            let Some(state) = frame.get(input)?.as_state() else {
                debug!(%point, op = op.name(), "State input is not a layout");
                return Ok(MoveExecution::Bottom);
            };
            return self.eval_state_op(state, op);
        }

        Ok(match op {
            Op::Load => MoveExecution::AtomState(AtomState::new()),
            Op::GetFutureResult { future, zone } => match frame.get(*future)? {
                MoveExecution::MeasureFuture(state) => {
                    arch.validate_zone(*zone)?;
                    let sites = arch.zone_locations(*zone).unwrap_or_default();
                    MoveExecution::IListResult(
                        sites
                            .into_iter()
                            .map(|loc| {
                                state
                                    .qubit_at(loc)
                                    .map_or(MoveExecution::Bottom, MoveExecution::MeasureResult)
                            })
                            .collect(),
                    )
                }
                MoveExecution::Unknown => MoveExecution::Unknown,
                _ => MoveExecution::Bottom,
            },
            Op::GetZoneIndex { zone, location } => zone_index(arch, *zone, *location, point)?,
            Op::Constant { value } => MoveExecution::Value(*value),
            Op::NewList { items } => MoveExecution::IListResult(
                items
                    .iter()
                    .map(|v| frame.get(*v).cloned())
                    .collect::<InterpretResult<_>>()?,
            ),
            Op::GetItem { list, index } => {
                get_item(frame.get(*list)?, frame.get(*index)?, point)
            }
            Op::SetDetector {
                measurements,
                coordinates,
            } => {
                let measurements = frame.get(*measurements)?.clone();
                frame.detectors.insert(
                    point,
                    DetectorRecord {
                        point,
                        measurements: measurements.clone(),
                        coordinates: coordinates.clone(),
                    },
                );
                measurements
            }
            Op::SetObservable {
                measurements,
                index,
            } => {
                let measurements = frame.get(*measurements)?.clone();
                frame.observables.insert(
                    point,
                    ObservableRecord {
                        point,
                        measurements: measurements.clone(),
                        index: *index,
                    },
                );
                measurements
            }
            // Every remaining operation consumes a state and was handled above.
            _ => MoveExecution::Bottom,
        })
    }

    fn eval_state_op(&self, state: &AtomState, op: &Op) -> InterpretResult<MoveExecution> {
        let arch = self.path_finder.arch();
        for &location in op.locations() {
            arch.validate_location(location)?;
        }
        for &zone in op.zones() {
            arch.validate_zone(zone)?;
        }

        Ok(match op {
            Op::Fill { locations, .. } => MoveExecution::AtomState(state.fill(locations)?),
            Op::Move { lanes, .. } => {
                MoveExecution::AtomState(state.apply_lanes(&self.path_finder, lanes)?)
            }
            Op::EndMeasure { .. } => MoveExecution::MeasureFuture(state.clone()),
            _ => MoveExecution::AtomState(state.clone()),
        })
    }
}

fn enqueue(queue: &mut VecDeque<BlockId>, queued: &mut FxHashSet<BlockId>, block: BlockId) {
    if queued.insert(block) {
        queue.push_back(block);
    }
}

/// Blocks using each value, through statements or terminators.
fn value_users(program: &MoveProgram) -> FxHashMap<ValueId, Vec<BlockId>> {
    let mut users: FxHashMap<ValueId, Vec<BlockId>> = FxHashMap::default();
    for (b, block) in (0u32..).zip(program.blocks()) {
        let operands = block
            .statements
            .iter()
            .flat_map(|stmt| stmt.op.operands())
            .chain(block.terminator.operands());
        for value in operands {
            let entry = users.entry(value).or_default();
            if !entry.contains(&BlockId(b)) {
                entry.push(BlockId(b));
            }
        }
    }
    users
}

fn produces_state(op: &Op) -> bool {
    matches!(op, Op::Load) || op.state_input().is_some()
}

fn zone_index(
    arch: &ArchSpec,
    zone: ZoneAddress,
    location: LocationAddress,
    point: ProgramPoint,
) -> InterpretResult<MoveExecution> {
    arch.validate_zone(zone)?;
    arch.validate_location(location)?;
    Ok(match arch.zone_index(zone, location) {
        Some(index) => {
            MoveExecution::Value(Scalar::Int(i64::try_from(index).unwrap_or(i64::MAX)))
        }
        None => {
            warn!(%point, %zone, %location, "Location is outside the zone");
            MoveExecution::Bottom
        }
    })
}

fn get_item(list: &MoveExecution, index: &MoveExecution, point: ProgramPoint) -> MoveExecution {
    match (list, index) {
        (MoveExecution::Bottom, _) | (_, MoveExecution::Bottom) => MoveExecution::Bottom,
        (MoveExecution::IListResult(items), MoveExecution::Value(Scalar::Int(i))) => {
            let item = usize::try_from(*i).ok().and_then(|i| items.get(i));
            match item {
                Some(item) => item.clone(),
                None => {
                    warn!(%point, index = i, len = items.len(), "List index out of range");
                    MoveExecution::Bottom
                }
            }
        }
        (MoveExecution::Unknown, _) | (_, MoveExecution::Unknown) => MoveExecution::Unknown,
        _ => MoveExecution::Bottom,
    }
}
