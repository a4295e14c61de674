//! Property tests for move synthesis.

use std::collections::BTreeMap;
use std::sync::Arc;

use lanes_arch::{LocationAddress, PathFinder, presets};
use lanes_compile::{CompileError, ConcreteState, compute_move_layers};
use proptest::prelude::*;

const MAX_QUBITS: usize = 6;

/// Random disjoint before/after layouts with a single crossing direction.
fn transition() -> impl Strategy<Value = (ConcreteState, ConcreteState)> {
    let sites: Vec<usize> = (0..20).collect();
    (
        Just(sites).prop_shuffle(),
        1..=MAX_QUBITS,
        prop::collection::vec(any::<bool>(), MAX_QUBITS),
        any::<bool>(),
        0usize..4,
    )
        .prop_map(|(order, num_qubits, moving, downward, num_reserved)| {
            let locations: Vec<LocationAddress> = presets::logical()
                .map(|arch| arch.locations().collect())
                .unwrap_or_default();
            let site = |i: usize| locations[order[i]];
            let crossing = if downward { (0, 1) } else { (1, 0) };

            let before: Vec<_> = (0..num_qubits).map(site).collect();
            let mut after = before.clone();
            for (i, slot) in after.iter_mut().enumerate() {
                let dst = site(num_qubits + i);
                let pair = (slot.word_id, dst.word_id);
                if moving[i] && (pair.0 == pair.1 || pair == crossing) {
                    *slot = dst;
                }
            }
            let first_reserved = num_qubits + MAX_QUBITS;
            let reserved: Vec<_> = (first_reserved..first_reserved + num_reserved)
                .map(site)
                .collect();
            (
                ConcreteState::new(before, reserved.clone()),
                ConcreteState::new(after, reserved),
            )
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn layers_are_parallel_and_reach_the_target((before, after) in transition()) {
        let arch = Arc::new(presets::logical().unwrap());
        let finder = PathFinder::new(arch.clone());
        let layers = match compute_move_layers(&finder, &before, &after) {
            Ok(layers) => layers,
            Err(CompileError::UnsupportedMove { .. }) => return Ok(()),
            Err(other) => return Err(TestCaseError::fail(other.to_string())),
        };

        for layer in &layers {
            prop_assert!(!layer.is_empty());
            for (i, first) in layer.lanes.iter().enumerate() {
                for second in &layer.lanes[i + 1..] {
                    prop_assert!(
                        arch.compatible_lanes(first, second),
                        "{} and {} share a layer",
                        first,
                        second
                    );
                }
            }
        }

        let mut positions: BTreeMap<LocationAddress, usize> = before
            .layout
            .iter()
            .enumerate()
            .map(|(q, &loc)| (loc, q))
            .collect();
        for layer in &layers {
            let mut hops = Vec::new();
            for lane in &layer.lanes {
                let (src, dst) = arch.lane_endpoints(lane).unwrap();
                let qubit = positions.remove(&src);
                prop_assert!(qubit.is_some(), "{} starts on an empty site", lane);
                hops.push((qubit.unwrap(), dst));
            }
            for (qubit, dst) in hops {
                prop_assert!(!before.occupied.contains(&dst));
                prop_assert!(positions.insert(dst, qubit).is_none(), "collision at {}", dst);
            }
        }

        let reached: Vec<_> = (0..after.num_qubits())
            .map(|q| positions.iter().find(|&(_, &p)| p == q).map(|(&loc, _)| loc))
            .collect();
        let expected: Vec<_> = after.layout.iter().copied().map(Some).collect();
        prop_assert_eq!(reached, expected);
    }
}
