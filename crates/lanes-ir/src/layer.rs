//! Gate-layer programs consumed by placement.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::qubit::QubitId;

/// One layer of logical gates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "gate", rename_all = "snake_case")]
pub enum GateLayer {
    /// Parallel CZ gates between `controls[i]` and `targets[i]`.
    Cz {
        /// Control qubits.
        controls: Vec<QubitId>,
        /// Target qubits, aligned with `controls`.
        targets: Vec<QubitId>,
    },
    /// Rotation of selected qubits.
    LocalR {
        /// Qubits being rotated.
        qubits: Vec<QubitId>,
        /// Rotation axis angle in the XY plane.
        axis_angle: f64,
        /// Rotation angle.
        rotation_angle: f64,
    },
    /// Rotation of every qubit.
    GlobalR {
        /// Rotation axis angle in the XY plane.
        axis_angle: f64,
        /// Rotation angle.
        rotation_angle: f64,
    },
    /// Z rotation of selected qubits.
    LocalRz {
        /// Qubits being rotated.
        qubits: Vec<QubitId>,
        /// Rotation angle.
        rotation_angle: f64,
    },
    /// Z rotation of every qubit.
    GlobalRz {
        /// Rotation angle.
        rotation_angle: f64,
    },
    /// Measure every qubit.
    Measure,
    /// Parity check over the last measurement of the given qubits.
    Detector {
        /// Qubits whose results are XOR-ed.
        qubits: Vec<QubitId>,
        /// Detector coordinates.
        #[serde(default)]
        coordinates: Vec<f64>,
    },
    /// Logical observable over the last measurement of the given qubits.
    Observable {
        /// Qubits whose results are XOR-ed.
        qubits: Vec<QubitId>,
    },
}

impl GateLayer {
    /// Every qubit named by this layer, in order.
    pub fn qubits(&self) -> Vec<QubitId> {
        match self {
            GateLayer::Cz { controls, targets } => {
                controls.iter().chain(targets).copied().collect()
            }
            GateLayer::LocalR { qubits, .. }
            | GateLayer::LocalRz { qubits, .. }
            | GateLayer::Detector { qubits, .. }
            | GateLayer::Observable { qubits } => qubits.clone(),
            GateLayer::GlobalR { .. } | GateLayer::GlobalRz { .. } | GateLayer::Measure => {
                Vec::new()
            }
        }
    }

    /// Check if this is a two-qubit layer.
    #[inline]
    pub fn is_cz(&self) -> bool {
        matches!(self, GateLayer::Cz { .. })
    }
}

/// A logical program as an ordered list of gate layers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GateProgram {
    /// Number of logical qubits.
    pub num_qubits: u32,
    /// Gate layers in execution order.
    pub layers: Vec<GateLayer>,
}

impl GateProgram {
    /// Create an empty program over `num_qubits` qubits.
    pub fn new(num_qubits: u32) -> Self {
        Self {
            num_qubits,
            layers: Vec::new(),
        }
    }

    /// Append a layer.
    pub fn push(&mut self, layer: GateLayer) -> &mut Self {
        self.layers.push(layer);
        self
    }

    /// Append a CZ layer.
    pub fn cz(
        &mut self,
        controls: impl IntoIterator<Item = QubitId>,
        targets: impl IntoIterator<Item = QubitId>,
    ) -> &mut Self {
        self.push(GateLayer::Cz {
            controls: controls.into_iter().collect(),
            targets: targets.into_iter().collect(),
        })
    }

    /// Append a measurement of every qubit.
    pub fn measure(&mut self) -> &mut Self {
        self.push(GateLayer::Measure)
    }

    /// Iterate over all qubit ids.
    pub fn qubits(&self) -> impl Iterator<Item = QubitId> {
        (0..self.num_qubits).map(QubitId)
    }

    /// Check that every layer only names existing qubits.
    pub fn validate(&self) -> IrResult<()> {
        for layer in &self.layers {
            if let Some(qubit) = layer.qubits().into_iter().find(|q| q.0 >= self.num_qubits) {
                return Err(IrError::QubitOutOfRange {
                    qubit,
                    num_qubits: self.num_qubits,
                });
            }
        }
        Ok(())
    }
}
