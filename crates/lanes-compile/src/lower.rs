//! Lowering placed gate layers to a movement program.

use std::collections::{BTreeMap, BTreeSet};

use lanes_arch::{ArchSpec, LocationAddress, ZoneAddress};
use lanes_ir::{GateLayer, GateProgram, MoveProgram, MoveProgramBuilder, QubitId, ValueId};
use tracing::debug;

use crate::error::{CompileError, CompileResult};
use crate::placement::{ConcreteState, LayerPlacement};
use crate::synthesis::MoveLayer;

/// Emit the movement program for a placed and synthesized gate program.
///
/// The program loads, fills the initial sites, then for every gate layer
/// issues its move layers followed by the gate itself. It returns the
/// results of the last measurement, or the final state when nothing is
/// measured.
pub fn lower_to_move_program(
    arch: &ArchSpec,
    program: &GateProgram,
    initial: &ConcreteState,
    placements: &[LayerPlacement],
    move_layers: &[Vec<MoveLayer>],
) -> CompileResult<MoveProgram> {
    if placements.len() != program.layers.len() || move_layers.len() != program.layers.len() {
        return Err(CompileError::InvalidProgram(format!(
            "{} gate layers but {} placements and {} move transitions",
            program.layers.len(),
            placements.len(),
            move_layers.len()
        )));
    }

    let mut lowering = Lowering {
        arch,
        builder: MoveProgramBuilder::new(),
        layout: initial.layout.clone(),
        measured: MeasuredLayout::default(),
        observables: 0,
    };
    let load = lowering.builder.load();
    let mut state = lowering
        .builder
        .fill(load, initial.layout.iter().copied());

    for ((gate, placement), moves) in program.layers.iter().zip(placements).zip(move_layers) {
        for layer in moves.iter().filter(|layer| !layer.is_empty()) {
            state = lowering
                .builder
                .move_lanes(state, layer.lanes.iter().copied());
        }
        let after = placement
            .after
            .as_concrete()
            .ok_or(CompileError::ImprecisePlacement {
                layer: placement.index,
            })?;
        lowering.layout.clone_from(&after.layout);
        state = lowering.gate(state, gate)?;
    }

    let result = match lowering.measured.results.len() {
        0 => state,
        1 => lowering
            .measured
            .results
            .values()
            .next()
            .copied()
            .unwrap_or(state),
        _ => {
            let results: Vec<ValueId> = lowering.measured.results.values().copied().collect();
            lowering.builder.new_list(results)
        }
    };
    lowering.builder.ret(result)?;
    let program = lowering.builder.finish()?;
    debug!(statements = program.num_statements(), "Lowered gate program");
    Ok(program)
}

/// Per-zone measurement results and the layout they were taken in.
#[derive(Default)]
struct MeasuredLayout {
    results: BTreeMap<ZoneAddress, ValueId>,
    layout: Vec<LocationAddress>,
}

struct Lowering<'a> {
    arch: &'a ArchSpec,
    builder: MoveProgramBuilder,
    layout: Vec<LocationAddress>,
    measured: MeasuredLayout,
    observables: u32,
}

impl Lowering<'_> {
    fn gate(&mut self, state: ValueId, gate: &GateLayer) -> CompileResult<ValueId> {
        Ok(match gate {
            GateLayer::Cz { controls, .. } => {
                let zones = self.zones(controls.iter().copied())?;
                zones
                    .into_iter()
                    .fold(state, |state, zone| self.builder.cz(state, zone))
            }
            GateLayer::LocalR {
                qubits,
                axis_angle,
                rotation_angle,
            } => {
                let locations = self.locations(qubits)?;
                self.builder
                    .local_r(state, *axis_angle, *rotation_angle, locations)
            }
            GateLayer::GlobalR {
                axis_angle,
                rotation_angle,
            } => self.builder.global_r(state, *axis_angle, *rotation_angle),
            GateLayer::LocalRz {
                qubits,
                rotation_angle,
            } => {
                let locations = self.locations(qubits)?;
                self.builder.local_rz(state, *rotation_angle, locations)
            }
            GateLayer::GlobalRz { rotation_angle } => {
                self.builder.global_rz(state, *rotation_angle)
            }
            GateLayer::Measure => {
                let all = (0u32..).take(self.layout.len()).map(QubitId);
                let zones = self.zones(all)?;
                let future = self.builder.end_measure(state, zones.iter().copied());
                self.measured.results = zones
                    .into_iter()
                    .map(|zone| (zone, self.builder.get_future_result(future, zone)))
                    .collect();
                self.measured.layout.clone_from(&self.layout);
                future
            }
            GateLayer::Detector {
                qubits,
                coordinates,
            } => {
                let list = self.measurement_list(qubits)?;
                self.builder.set_detector(list, coordinates.iter().copied());
                state
            }
            GateLayer::Observable { qubits } => {
                let list = self.measurement_list(qubits)?;
                self.builder.set_observable(list, self.observables);
                self.observables += 1;
                state
            }
        })
    }

    fn location(&self, qubit: QubitId) -> CompileResult<LocationAddress> {
        self.layout
            .get(qubit.index())
            .copied()
            .ok_or_else(|| CompileError::InvalidProgram(format!("{qubit} has no site")))
    }

    fn locations(&self, qubits: &[QubitId]) -> CompileResult<Vec<LocationAddress>> {
        qubits.iter().map(|&q| self.location(q)).collect()
    }

    fn zone_of(&self, location: LocationAddress) -> CompileResult<ZoneAddress> {
        self.arch
            .zone_of(location)
            .ok_or_else(|| CompileError::InvalidProgram(format!("site {location} is in no zone")))
    }

    fn zones(&self, qubits: impl Iterator<Item = QubitId>) -> CompileResult<BTreeSet<ZoneAddress>> {
        qubits
            .map(|q| self.location(q).and_then(|loc| self.zone_of(loc)))
            .collect()
    }

    /// A list of the last measurement result of each qubit.
    fn measurement_list(&mut self, qubits: &[QubitId]) -> CompileResult<ValueId> {
        let mut items = Vec::with_capacity(qubits.len());
        for &qubit in qubits {
            let location = self
                .measured
                .layout
                .get(qubit.index())
                .copied()
                .ok_or_else(|| {
                    CompileError::InvalidProgram(format!("{qubit} is used before measurement"))
                })?;
            let zone = self.zone_of(location)?;
            let results = self.measured.results.get(&zone).copied().ok_or_else(|| {
                CompileError::InvalidProgram(format!("zone {zone} has not been measured"))
            })?;
            let index = self.builder.get_zone_index(zone, location);
            items.push(self.builder.get_item(results, index));
        }
        Ok(self.builder.new_list(items))
    }
}
