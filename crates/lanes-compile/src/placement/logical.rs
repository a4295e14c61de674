//! Pairwise CZ placement for word-structured architectures.
//!
//! For every pair that is not already blockaded, one of the two qubits
//! moves next to the other. Both candidates are routed over the lane graph
//! around everything the layer has claimed so far, ranked by a
//! strategy-specific key, and the best feasible one is committed before
//! the next pair is considered.
//!
//! Both strategies balance accumulated motion twice: the mover's own
//! `move_count` is compared first, and between equally moved candidates
//! the one landing in the word whose resident qubits have moved less wins.

use lanes_ir::QubitId;
use tracing::debug;

use super::strategy::{PlacementStrategy, is_valid_cz_request};
use super::{ConcreteState, PlacementState};
use crate::error::{CompileError, CompileResult};
use crate::routing::{Route, Router};
use crate::synthesis::LaneSignature;

/// Prefers moving the qubit that has moved least.
///
/// Candidates are ranked by mover move count, then by the move count of
/// the destination word, then by conflicts with moves already chosen in
/// the layer, then control before target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogicalPlacementStrategy;

/// Prefers moves that share bus signatures with the rest of the layer.
///
/// Candidates are ranked by conflicts with moves already chosen in the
/// layer, then by mover move count, then by the move count of the
/// destination word, then control before target. A conflict is a chosen
/// move whose lane signature sequence differs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictAwarePlacementStrategy;

impl PlacementStrategy for LogicalPlacementStrategy {
    fn name(&self) -> &str {
        "logical"
    }

    fn cz_placements(
        &self,
        router: &mut Router<'_>,
        state: &ConcreteState,
        controls: &[QubitId],
        targets: &[QubitId],
    ) -> CompileResult<PlacementState> {
        place_pairs(router, state, controls, targets, |c| {
            (u64::from(c.move_count), c.word_load, c.conflicts, c.order)
        })
    }
}

impl PlacementStrategy for ConflictAwarePlacementStrategy {
    fn name(&self) -> &str {
        "conflict_aware"
    }

    fn cz_placements(
        &self,
        router: &mut Router<'_>,
        state: &ConcreteState,
        controls: &[QubitId],
        targets: &[QubitId],
    ) -> CompileResult<PlacementState> {
        place_pairs(router, state, controls, targets, |c| {
            (c.conflicts, u64::from(c.move_count), c.word_load, c.order)
        })
    }
}

struct Candidate {
    mover: QubitId,
    route: Route,
    signature: Vec<LaneSignature>,
    move_count: u32,
    word_load: u64,
    conflicts: u64,
    order: usize,
}

/// Word pair and signatures already committed in the current layer.
#[derive(Default)]
struct LayerPlan {
    word_pair: Option<(u32, u32)>,
    signatures: Vec<Vec<LaneSignature>>,
}

impl LayerPlan {
    fn candidate(
        &self,
        router: &Router<'_>,
        state: &ConcreteState,
        mover: QubitId,
        partner: QubitId,
        order: usize,
    ) -> Option<Candidate> {
        let from = state.location_of(mover)?;
        let dst = router
            .arch()
            .get_blockaded_location(state.location_of(partner)?)?;
        if router.is_claimed(dst) {
            return None;
        }
        let route = router.route(from, dst)?;
        if let (Some(pair), Some(committed)) = (route.word_pair(), self.word_pair) {
            if pair != committed {
                return None;
            }
        }
        let signature = route.signature();
        let conflicts = self.signatures.iter().filter(|s| **s != signature).count() as u64;
        let word_load = state
            .qubits()
            .filter(|&(q, loc)| q != mover && loc.word_id == dst.word_id)
            .map(|(q, _)| u64::from(state.move_count(q)))
            .sum();
        Some(Candidate {
            mover,
            route,
            signature,
            move_count: state.move_count(mover),
            word_load,
            conflicts,
            order,
        })
    }

    fn commit(&mut self, candidate: &Candidate) {
        self.word_pair = self.word_pair.or(candidate.route.word_pair());
        self.signatures.push(candidate.signature.clone());
    }
}

fn place_pairs(
    router: &mut Router<'_>,
    state: &ConcreteState,
    controls: &[QubitId],
    targets: &[QubitId],
    rank: impl Fn(&Candidate) -> (u64, u64, u64, usize),
) -> CompileResult<PlacementState> {
    if !is_valid_cz_request(state, controls, targets) {
        return Ok(PlacementState::AnyState);
    }

    let mut next = state.clone();
    let mut plan = LayerPlan::default();

    for (&control, &target) in controls.iter().zip(targets) {
        let (Some(lc), Some(lt)) = (next.location_of(control), next.location_of(target)) else {
            return Ok(PlacementState::AnyState);
        };
        if router.arch().get_blockaded_location(lc) == Some(lt) {
            continue;
        }

        let best = [(control, target), (target, control)]
            .into_iter()
            .enumerate()
            .filter_map(|(order, (mover, partner))| {
                plan.candidate(router, &next, mover, partner, order)
            })
            .min_by_key(|c| rank(c))
            .ok_or(CompileError::NoPlacement { control, target })?;

        debug!(
            %control,
            %target,
            mover = %best.mover,
            dst = %best.route.dst(),
            lanes = best.route.len(),
            "Placed CZ pair"
        );
        plan.commit(&best);
        let lanes = u32::try_from(best.route.len()).unwrap_or(u32::MAX);
        next.relocate(best.mover, best.route.dst(), lanes);
        router.commit(best.mover, best.route);
    }

    Ok(PlacementState::Concrete(next))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use lanes_arch::{BusReuseHeuristic, LocationAddress, Path, PathFinder, presets};

    use super::*;

    fn loc(w: u32, s: u32) -> LocationAddress {
        LocationAddress::new(w, s)
    }

    fn place_with_paths(
        strategy: &dyn PlacementStrategy,
        state: &ConcreteState,
        controls: &[QubitId],
        targets: &[QubitId],
    ) -> CompileResult<(PlacementState, BTreeMap<QubitId, Path>)> {
        let pf = PathFinder::new(Arc::new(presets::logical().unwrap()));
        let mut router = Router::new(&pf, Box::new(BusReuseHeuristic::new()), state.blocked());
        let placed = strategy.cz_placements(&mut router, state, controls, targets)?;
        Ok((placed, router.into_paths()))
    }

    fn place(
        strategy: &dyn PlacementStrategy,
        state: &ConcreteState,
        controls: &[QubitId],
        targets: &[QubitId],
    ) -> CompileResult<PlacementState> {
        place_with_paths(strategy, state, controls, targets).map(|(placed, _)| placed)
    }

    fn concrete(state: PlacementState) -> ConcreteState {
        match state {
            PlacementState::Concrete(state) => state,
            other => panic!("expected a concrete placement, got {other:?}"),
        }
    }

    #[test]
    fn test_paired_qubits_stay() {
        let state = ConcreteState::new(vec![loc(0, 0), loc(0, 5)], []);
        let (placed, paths) =
            place_with_paths(&LogicalPlacementStrategy, &state, &[QubitId(0)], &[QubitId(1)])
                .unwrap();
        assert_eq!(placed, PlacementState::Concrete(state));
        assert!(paths.is_empty());
    }

    #[test]
    fn test_less_moved_qubit_moves() {
        let mut state = ConcreteState::new(vec![loc(0, 0), loc(0, 1)], []);
        state.move_count = vec![3, 0];

        let placed = concrete(
            place(&LogicalPlacementStrategy, &state, &[QubitId(0)], &[QubitId(1)]).unwrap(),
        );
        assert_eq!(placed.location_of(QubitId(0)), Some(loc(0, 0)));
        assert_eq!(placed.location_of(QubitId(1)), Some(loc(0, 5)));
        assert_eq!(placed.move_count, vec![3, 1]);
    }

    #[test]
    fn test_quieter_word_wins_a_tie() {
        // Both candidates have moved equally; word 1 holds a busy qubit.
        let mut state = ConcreteState::new(vec![loc(0, 0), loc(1, 1), loc(1, 2), loc(0, 3)], []);
        state.move_count = vec![0, 0, 4, 0];

        for strategy in [
            &LogicalPlacementStrategy as &dyn PlacementStrategy,
            &ConflictAwarePlacementStrategy,
        ] {
            let placed =
                concrete(place(strategy, &state, &[QubitId(0)], &[QubitId(1)]).unwrap());
            assert_eq!(placed.location_of(QubitId(0)), Some(loc(0, 0)));
            assert_eq!(placed.location_of(QubitId(1)), Some(loc(0, 5)));
        }
    }

    #[test]
    fn test_strategies_rank_differently() {
        let mut state = ConcreteState::new(vec![loc(0, 0), loc(0, 1), loc(0, 2), loc(0, 3)], []);
        state.move_count = vec![0, 5, 3, 0];
        let controls = [QubitId(0), QubitId(2)];
        let targets = [QubitId(1), QubitId(3)];

        let logical =
            concrete(place(&LogicalPlacementStrategy, &state, &controls, &targets).unwrap());
        assert_eq!(logical.location_of(QubitId(0)), Some(loc(0, 6)));
        assert_eq!(logical.location_of(QubitId(3)), Some(loc(0, 7)));
        assert_eq!(logical.location_of(QubitId(2)), Some(loc(0, 2)));

        let aware =
            concrete(place(&ConflictAwarePlacementStrategy, &state, &controls, &targets).unwrap());
        assert_eq!(aware.location_of(QubitId(0)), Some(loc(0, 6)));
        assert_eq!(aware.location_of(QubitId(2)), Some(loc(0, 8)));
        assert_eq!(aware.location_of(QubitId(3)), Some(loc(0, 3)));
    }

    #[test]
    fn test_detour_around_reserved_site() {
        // The detours through (0, 5) and (0, 6) are taken, (0, 7) is free.
        let state = ConcreteState::new(vec![loc(0, 0), loc(0, 6)], [loc(0, 5)]);
        let (placed, paths) =
            place_with_paths(&LogicalPlacementStrategy, &state, &[QubitId(0)], &[QubitId(1)])
                .unwrap();
        let placed = concrete(placed);
        assert_eq!(placed.location_of(QubitId(0)), Some(loc(0, 1)));
        assert_eq!(placed.move_count, vec![2, 0]);
        assert_eq!(
            paths[&QubitId(0)].locations(),
            vec![loc(0, 0), loc(0, 7), loc(0, 1)]
        );
    }

    #[test]
    fn test_later_pairs_route_around_earlier_moves() {
        let state = ConcreteState::new(vec![loc(0, 0), loc(0, 6), loc(0, 2), loc(0, 8)], []);
        let (placed, paths) = place_with_paths(
            &LogicalPlacementStrategy,
            &state,
            &[QubitId(0), QubitId(2)],
            &[QubitId(1), QubitId(3)],
        )
        .unwrap();
        let placed = concrete(placed);
        assert_eq!(placed.location_of(QubitId(0)), Some(loc(0, 1)));
        assert_eq!(placed.location_of(QubitId(2)), Some(loc(0, 3)));

        let first: Vec<_> = paths[&QubitId(0)].locations();
        let second: Vec<_> = paths[&QubitId(2)].locations();
        assert!(second.iter().all(|site| !first.contains(site)));
    }

    #[test]
    fn test_malformed_request_gives_up() {
        let state = ConcreteState::new(vec![loc(0, 0), loc(0, 1)], []);
        for (controls, targets) in [
            (vec![QubitId(0)], vec![]),
            (vec![QubitId(0)], vec![QubitId(7)]),
            (vec![QubitId(0)], vec![QubitId(0)]),
        ] {
            assert_eq!(
                place(&LogicalPlacementStrategy, &state, &controls, &targets).unwrap(),
                PlacementState::AnyState
            );
        }
    }

    #[test]
    fn test_blocked_pair_fails() {
        let blocked: Vec<_> = (5..10).map(|s| loc(0, s)).collect();
        let state = ConcreteState::new(vec![loc(0, 0), loc(0, 1)], blocked);
        assert!(matches!(
            place(&ConflictAwarePlacementStrategy, &state, &[QubitId(0)], &[QubitId(1)]),
            Err(CompileError::NoPlacement { .. })
        ));
    }

    #[test]
    fn test_one_word_direction_per_layer() {
        // q0 must cross 0 -> 1, after which q2 would have to cross 1 -> 0.
        let state = ConcreteState::new(
            vec![loc(0, 0), loc(1, 1), loc(1, 2), loc(0, 3)],
            [loc(0, 5), loc(1, 7)],
        );
        let err = place(
            &LogicalPlacementStrategy,
            &state,
            &[QubitId(0), QubitId(2)],
            &[QubitId(1), QubitId(3)],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CompileError::NoPlacement {
                control: QubitId(2),
                target: QubitId(3)
            }
        ));
    }
}
