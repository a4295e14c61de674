//! The concrete atom layout tracked by the interpreter.

use std::collections::{BTreeMap, BTreeSet};

use lanes_arch::{AddressError, ArchSpec, LaneAddress, LocationAddress, PathFinder, ZoneAddress};
use lanes_ir::QubitId;

use crate::error::{InterpretError, InterpretResult};

/// Control/target split of the occupied blockaded pairs of a zone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QubitPairing {
    /// Qubit on the lower site of each pair.
    pub controls: Vec<QubitId>,
    /// Qubit on the higher site of each pair, aligned with `controls`.
    pub targets: Vec<QubitId>,
    /// Qubits whose partner site is empty or who have no partner.
    pub unpaired: Vec<QubitId>,
}

/// A bijection between occupied sites and qubit ids.
///
/// Transitions never mutate; each returns a new state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtomState {
    locations_to_qubit: BTreeMap<LocationAddress, QubitId>,
    qubit_to_locations: BTreeMap<QubitId, LocationAddress>,
    prev_lanes: BTreeMap<QubitId, LaneAddress>,
    move_count: BTreeMap<QubitId, u32>,
}

impl AtomState {
    /// An empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of atoms.
    pub fn num_qubits(&self) -> usize {
        self.qubit_to_locations.len()
    }

    /// Check if no atoms are loaded.
    pub fn is_empty(&self) -> bool {
        self.qubit_to_locations.is_empty()
    }

    /// The qubit at a site.
    pub fn qubit_at(&self, location: LocationAddress) -> Option<QubitId> {
        self.locations_to_qubit.get(&location).copied()
    }

    /// The site of a qubit.
    pub fn location_of(&self, qubit: QubitId) -> Option<LocationAddress> {
        self.qubit_to_locations.get(&qubit).copied()
    }

    /// All `(qubit, site)` pairs in qubit order.
    pub fn qubits(&self) -> impl Iterator<Item = (QubitId, LocationAddress)> + '_ {
        self.qubit_to_locations.iter().map(|(&q, &l)| (q, l))
    }

    /// All occupied sites in order.
    pub fn occupied(&self) -> BTreeSet<LocationAddress> {
        self.locations_to_qubit.keys().copied().collect()
    }

    /// Number of lanes a qubit has travelled.
    pub fn move_count(&self, qubit: QubitId) -> u32 {
        self.move_count.get(&qubit).copied().unwrap_or(0)
    }

    /// The last lane a qubit travelled.
    pub fn prev_lane(&self, qubit: QubitId) -> Option<LaneAddress> {
        self.prev_lanes.get(&qubit).copied()
    }

    /// Check whether both states place every qubit identically.
    pub fn same_layout(&self, other: &Self) -> bool {
        self.locations_to_qubit == other.locations_to_qubit
    }

    /// Check that the two maps are exact inverses.
    pub fn check_bijection(&self) -> bool {
        self.locations_to_qubit.len() == self.qubit_to_locations.len()
            && self
                .locations_to_qubit
                .iter()
                .all(|(loc, q)| self.qubit_to_locations.get(q) == Some(loc))
    }

    /// Add atoms at `locations`, numbered after the largest existing id.
    pub fn fill(&self, locations: &[LocationAddress]) -> InterpretResult<Self> {
        let first = self
            .qubit_to_locations
            .keys()
            .next_back()
            .map_or(0, |q| q.0 + 1);
        self.fill_with(
            locations
                .iter()
                .zip(first..)
                .map(|(&loc, id)| (loc, QubitId(id))),
        )
    }

    /// Add atoms with explicit ids.
    ///
    /// Fails if a site is already occupied or an id already exists.
    pub fn fill_with(
        &self,
        assignments: impl IntoIterator<Item = (LocationAddress, QubitId)>,
    ) -> InterpretResult<Self> {
        let mut next = self.clone();
        for (location, qubit) in assignments {
            if next.locations_to_qubit.contains_key(&location) {
                return Err(InterpretError::OccupiedSite(location));
            }
            if next.qubit_to_locations.contains_key(&qubit) {
                return Err(InterpretError::DuplicateQubit(qubit));
            }
            next.locations_to_qubit.insert(location, qubit);
            next.qubit_to_locations.insert(qubit, location);
            next.move_count.insert(qubit, 0);
        }
        Ok(next)
    }

    /// Move every atom at the lanes' starting sites in one parallel step.
    ///
    /// Lanes must be pairwise compatible. Each lane needs an atom at its
    /// start and a free site at its end once all moving atoms have lifted.
    pub fn apply_lanes(&self, finder: &PathFinder, lanes: &[LaneAddress]) -> InterpretResult<Self> {
        let arch = finder.arch();
        for (i, first) in lanes.iter().enumerate() {
            for second in &lanes[i + 1..] {
                if !arch.compatible_lanes(first, second) {
                    return Err(AddressError::IncompatibleLanes {
                        first: *first,
                        second: *second,
                    }
                    .into());
                }
            }
        }

        let mut hops = Vec::with_capacity(lanes.len());
        let mut moving = BTreeSet::new();
        for lane in lanes {
            let (src, dst) = match finder.lane_endpoints(lane) {
                Some(endpoints) => endpoints,
                None => {
                    arch.validate_lane(lane)?;
                    return Err(AddressError::LaneNotInBus(*lane).into());
                }
            };
            let qubit = self.qubit_at(src).ok_or(InterpretError::EmptySource {
                lane: *lane,
                location: src,
            })?;
            if !moving.insert(qubit) {
                return Err(InterpretError::DuplicateQubit(qubit));
            }
            hops.push((*lane, qubit, src, dst));
        }

        let mut next = self.clone();
        for &(_, _, src, _) in &hops {
            next.locations_to_qubit.remove(&src);
        }
        for &(lane, qubit, _, dst) in &hops {
            if next.locations_to_qubit.insert(dst, qubit).is_some() {
                return Err(InterpretError::OccupiedDestination {
                    lane,
                    location: dst,
                });
            }
            next.qubit_to_locations.insert(qubit, dst);
            next.prev_lanes.insert(qubit, lane);
            *next.move_count.entry(qubit).or_insert(0) += 1;
        }

        if !next.check_bijection() {
            return Err(InterpretError::InconsistentState);
        }
        Ok(next)
    }

    /// Split the occupied blockaded pairs of a zone into controls and targets.
    ///
    /// Returns `None` for an unknown zone.
    pub fn get_qubit_pairing(&self, arch: &ArchSpec, zone: ZoneAddress) -> Option<QubitPairing> {
        let mut pairing = QubitPairing::default();
        for location in arch.zone_locations(zone)? {
            let Some(qubit) = self.qubit_at(location) else {
                continue;
            };
            let partner = arch
                .get_blockaded_location(location)
                .and_then(|p| self.qubit_at(p).map(|q| (p, q)));
            match partner {
                Some((partner_loc, partner_qubit)) => {
                    if location < partner_loc {
                        pairing.controls.push(qubit);
                        pairing.targets.push(partner_qubit);
                    }
                }
                None => pairing.unpaired.push(qubit),
            }
        }
        Some(pairing)
    }
}
