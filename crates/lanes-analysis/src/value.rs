//! The abstract values of the atom-state interpreter.

use lanes_ir::{QubitId, Scalar};

use crate::lattice::{FiniteLattice, Lattice};
use crate::state::AtomState;

/// Abstract value of one SSA value.
///
/// `Unknown` is top and `Bottom` is bottom. Concrete values are only
/// related to themselves; joining two different concrete values gives
/// `Unknown`, with no attempt at a partial merge.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveExecution {
    /// Could be anything.
    Unknown,
    /// Unreachable or not a value.
    Bottom,
    /// A classical constant.
    Value(Scalar),
    /// The atom layout.
    AtomState(AtomState),
    /// A layout frozen by measurement.
    MeasureFuture(AtomState),
    /// The measurement of one qubit.
    MeasureResult(QubitId),
    /// An ordered list of values.
    IListResult(Vec<MoveExecution>),
}

impl MoveExecution {
    /// The atom layout a state-consuming statement can act on.
    ///
    /// A measurement future acts as the current layout as well.
    pub fn as_state(&self) -> Option<&AtomState> {
        match self {
            MoveExecution::AtomState(state) | MoveExecution::MeasureFuture(state) => Some(state),
            _ => None,
        }
    }

    /// Check if this value is or contains `Unknown`.
    pub fn contains_unknown(&self) -> bool {
        match self {
            MoveExecution::Unknown => true,
            MoveExecution::IListResult(items) => items.iter().any(Self::contains_unknown),
            _ => false,
        }
    }
}

impl Lattice for MoveExecution {
    fn is_subseteq(&self, other: &Self) -> bool {
        use MoveExecution::{AtomState, Bottom, IListResult, MeasureFuture, Unknown};
        match (self, other) {
            (Bottom, _) | (_, Unknown) => true,
            (AtomState(a), AtomState(b)) | (MeasureFuture(a), MeasureFuture(b)) => {
                a.same_layout(b)
            }
            (IListResult(a), IListResult(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.is_subseteq(y))
            }
            (a, b) => a == b,
        }
    }

    /// Same-layout states join to the left operand, keeping its lane
    /// history and move counts.
    fn join(&self, other: &Self) -> Self {
        use MoveExecution::{AtomState, Bottom, IListResult, MeasureFuture, Unknown};
        match (self, other) {
            (Bottom, x) | (x, Bottom) => x.clone(),
            (Unknown, _) | (_, Unknown) => Unknown,
            (AtomState(a), AtomState(b)) | (MeasureFuture(a), MeasureFuture(b))
                if a.same_layout(b) =>
            {
                self.clone()
            }
            (IListResult(a), IListResult(b)) if a.len() == b.len() => {
                IListResult(a.iter().zip(b).map(|(x, y)| x.join(y)).collect())
            }
            (a, b) if a == b => a.clone(),
            _ => Unknown,
        }
    }

    fn meet(&self, other: &Self) -> Self {
        use MoveExecution::{AtomState, Bottom, IListResult, MeasureFuture, Unknown};
        match (self, other) {
            (Unknown, x) | (x, Unknown) => x.clone(),
            (Bottom, _) | (_, Bottom) => Bottom,
            (AtomState(a), AtomState(b)) | (MeasureFuture(a), MeasureFuture(b))
                if a.same_layout(b) =>
            {
                self.clone()
            }
            (IListResult(a), IListResult(b)) if a.len() == b.len() => {
                IListResult(a.iter().zip(b).map(|(x, y)| x.meet(y)).collect())
            }
            (a, b) if a == b => a.clone(),
            _ => Bottom,
        }
    }
}

impl FiniteLattice for MoveExecution {
    fn bottom() -> Self {
        MoveExecution::Bottom
    }

    fn top() -> Self {
        MoveExecution::Unknown
    }
}
