//! Movement-program operations.

use std::fmt;

use lanes_arch::{LaneAddress, LocationAddress, ZoneAddress};
use serde::{Deserialize, Serialize};

use crate::program::ValueId;

/// A classical constant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// A boolean, usable as a branch condition.
    Bool(bool),
    /// A signed integer, usable as a list index.
    Int(i64),
    /// A floating-point number.
    Float(f64),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(x) => write!(f, "{x}"),
        }
    }
}

/// A single statement's operation.
///
/// Operations that act on atoms take the current atom state as their
/// `state` operand and produce the next state, so the state is threaded
/// through the program in SSA form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    /// Produce an empty atom state.
    Load,
    /// Introduce fresh atoms at the given sites.
    Fill {
        /// Incoming state.
        state: ValueId,
        /// Sites receiving a new atom.
        locations: Vec<LocationAddress>,
    },
    /// Move atoms along a set of lanes in one parallel step.
    Move {
        /// Incoming state.
        state: ValueId,
        /// Lanes to traverse; must be pairwise compatible.
        lanes: Vec<LaneAddress>,
    },
    /// Apply CZ to every blockaded pair of a zone.
    Cz {
        /// Incoming state.
        state: ValueId,
        /// Zone the gate is applied in.
        zone: ZoneAddress,
    },
    /// Rotate the atoms at the given sites.
    LocalR {
        /// Incoming state.
        state: ValueId,
        /// Rotation axis angle in the XY plane.
        axis_angle: f64,
        /// Rotation angle.
        rotation_angle: f64,
        /// Targeted sites.
        locations: Vec<LocationAddress>,
    },
    /// Rotate every atom.
    GlobalR {
        /// Incoming state.
        state: ValueId,
        /// Rotation axis angle in the XY plane.
        axis_angle: f64,
        /// Rotation angle.
        rotation_angle: f64,
    },
    /// Z-rotate the atoms at the given sites.
    LocalRz {
        /// Incoming state.
        state: ValueId,
        /// Rotation angle.
        rotation_angle: f64,
        /// Targeted sites.
        locations: Vec<LocationAddress>,
    },
    /// Z-rotate every atom.
    GlobalRz {
        /// Incoming state.
        state: ValueId,
        /// Rotation angle.
        rotation_angle: f64,
    },
    /// Measure the given zones, producing a measurement future.
    EndMeasure {
        /// Incoming state.
        state: ValueId,
        /// Zones being imaged.
        zones: Vec<ZoneAddress>,
    },
    /// Read the per-site results of a future for one zone.
    GetFutureResult {
        /// The measurement future.
        future: ValueId,
        /// Zone whose sites are read.
        zone: ZoneAddress,
    },
    /// Position of a site within a zone's site list.
    GetZoneIndex {
        /// The zone.
        zone: ZoneAddress,
        /// The site being looked up.
        location: LocationAddress,
    },
    /// A classical constant.
    Constant {
        /// The constant value.
        value: Scalar,
    },
    /// Collect values into a list.
    NewList {
        /// List elements in order.
        items: Vec<ValueId>,
    },
    /// Index into a list.
    GetItem {
        /// The list.
        list: ValueId,
        /// An integer index value.
        index: ValueId,
    },
    /// Declare a detector over a list of measurement results.
    SetDetector {
        /// List of measurement results.
        measurements: ValueId,
        /// Detector coordinates.
        coordinates: Vec<f64>,
    },
    /// Declare a logical observable over a list of measurement results.
    SetObservable {
        /// List of measurement results.
        measurements: ValueId,
        /// Observable index.
        index: u32,
    },
}

impl Op {
    /// Short name used in diagnostics and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Op::Load => "load",
            Op::Fill { .. } => "fill",
            Op::Move { .. } => "move",
            Op::Cz { .. } => "cz",
            Op::LocalR { .. } => "local_r",
            Op::GlobalR { .. } => "global_r",
            Op::LocalRz { .. } => "local_rz",
            Op::GlobalRz { .. } => "global_rz",
            Op::EndMeasure { .. } => "end_measure",
            Op::GetFutureResult { .. } => "get_future_result",
            Op::GetZoneIndex { .. } => "get_zone_index",
            Op::Constant { .. } => "constant",
            Op::NewList { .. } => "new_list",
            Op::GetItem { .. } => "get_item",
            Op::SetDetector { .. } => "set_detector",
            Op::SetObservable { .. } => "set_observable",
        }
    }

    /// The atom-state operand, if this operation consumes one.
    pub fn state_input(&self) -> Option<ValueId> {
        match self {
            Op::Fill { state, .. }
            | Op::Move { state, .. }
            | Op::Cz { state, .. }
            | Op::LocalR { state, .. }
            | Op::GlobalR { state, .. }
            | Op::LocalRz { state, .. }
            | Op::GlobalRz { state, .. }
            | Op::EndMeasure { state, .. } => Some(*state),
            _ => None,
        }
    }

    /// All value operands in order.
    pub fn operands(&self) -> Vec<ValueId> {
        match self {
            Op::Load | Op::GetZoneIndex { .. } | Op::Constant { .. } => Vec::new(),
            Op::GetFutureResult { future, .. } => vec![*future],
            Op::NewList { items } => items.clone(),
            Op::GetItem { list, index } => vec![*list, *index],
            Op::SetDetector { measurements, .. } | Op::SetObservable { measurements, .. } => {
                vec![*measurements]
            }
            _ => self.state_input().into_iter().collect(),
        }
    }

    /// Rewrite every use of `old` into `new`.
    pub fn replace_uses(&mut self, old: ValueId, new: ValueId) {
        let swap = |v: &mut ValueId| {
            if *v == old {
                *v = new;
            }
        };
        match self {
            Op::Load | Op::GetZoneIndex { .. } | Op::Constant { .. } => {}
            Op::Fill { state, .. }
            | Op::Move { state, .. }
            | Op::Cz { state, .. }
            | Op::LocalR { state, .. }
            | Op::GlobalR { state, .. }
            | Op::LocalRz { state, .. }
            | Op::GlobalRz { state, .. }
            | Op::EndMeasure { state, .. } => swap(state),
            Op::GetFutureResult { future, .. } => swap(future),
            Op::NewList { items } => items.iter_mut().for_each(swap),
            Op::GetItem { list, index } => {
                swap(list);
                swap(index);
            }
            Op::SetDetector { measurements, .. } | Op::SetObservable { measurements, .. } => {
                swap(measurements);
            }
        }
    }

    /// Sites referenced directly by this operation.
    pub fn locations(&self) -> &[LocationAddress] {
        match self {
            Op::Fill { locations, .. }
            | Op::LocalR { locations, .. }
            | Op::LocalRz { locations, .. } => locations,
            Op::GetZoneIndex { location, .. } => std::slice::from_ref(location),
            _ => &[],
        }
    }

    /// Lanes referenced by this operation.
    pub fn lanes(&self) -> &[LaneAddress] {
        match self {
            Op::Move { lanes, .. } => lanes,
            _ => &[],
        }
    }

    /// Zones referenced by this operation.
    pub fn zones(&self) -> &[ZoneAddress] {
        match self {
            Op::Cz { zone, .. }
            | Op::GetFutureResult { zone, .. }
            | Op::GetZoneIndex { zone, .. } => {
                std::slice::from_ref(zone)
            }
            Op::EndMeasure { zones, .. } => zones,
            _ => &[],
        }
    }
}
