//! Fixed placement and synthesis scenarios on the logical architecture.

use std::sync::Arc;

use lanes_analysis::AtomState;
use lanes_arch::{
    BusReuseHeuristic, Direction, LaneAddress, LocationAddress, PathFinder, SiteLaneAddress,
    WordLaneAddress, ZoneAddress, presets,
};
use lanes_compile::{
    CompileError, ConcreteState, InitialLayout, LogicalPlacementStrategy, PlacementAnalysis,
    PlacementState, compute_move_layers, compute_move_layers_along,
};
use lanes_ir::{GateLayer, GateProgram, QubitId};

fn loc(w: u32, s: u32) -> LocationAddress {
    LocationAddress::new(w, s)
}

fn finder() -> PathFinder {
    PathFinder::new(Arc::new(presets::logical().unwrap()))
}

#[test]
fn paired_qubits_need_no_moves() {
    let pf = finder();
    let arch = pf.arch();
    let layout = InitialLayout::new([loc(0, 0), loc(0, 5)]);
    let mut program = GateProgram::new(2);
    program.cz([QubitId(0)], [QubitId(1)]);

    let placements = PlacementAnalysis::new(&pf, &LogicalPlacementStrategy, &layout)
        .run(&program)
        .unwrap();
    assert_eq!(placements.len(), 1);
    assert!(placements[0].is_static());

    let state = AtomState::new().fill(&[loc(0, 0), loc(0, 5)]).unwrap();
    let pairing = state.get_qubit_pairing(arch, ZoneAddress::new(0)).unwrap();
    assert_eq!(pairing.controls, vec![QubitId(0)]);
    assert_eq!(pairing.targets, vec![QubitId(1)]);
    assert!(pairing.unpaired.is_empty());
}

#[test]
fn site_move_then_word_move() {
    let pf = finder();
    let before = ConcreteState::new(vec![loc(0, 0), loc(0, 1), loc(1, 0), loc(1, 1)], []);
    let after = ConcreteState::new(vec![loc(1, 5), loc(1, 6), loc(1, 0), loc(1, 1)], []);

    let layers = compute_move_layers(&pf, &before, &after).unwrap();
    assert_eq!(layers.len(), 2);

    let site = |s| LaneAddress::from(SiteLaneAddress::new(0, s, 0, Direction::Forward));
    let word = |s| LaneAddress::from(WordLaneAddress::new(0, s, 0, Direction::Forward));
    assert_eq!(layers[0].lanes, vec![site(0), site(1)]);
    assert_eq!(layers[1].lanes, vec![word(5), word(6)]);
}

#[test]
fn opposite_word_crossings_are_rejected() {
    let pf = finder();
    let before = ConcreteState::new(vec![loc(0, 0), loc(1, 1)], []);
    let after = ConcreteState::new(vec![loc(1, 5), loc(0, 6)], []);
    assert!(matches!(
        compute_move_layers(&pf, &before, &after),
        Err(CompileError::MultipleWordPairs {
            first: (0, 1),
            second: (1, 0)
        })
    ));
}

#[test]
fn moving_onto_a_reserved_site_has_no_route() {
    let pf = finder();
    let before = ConcreteState::new(vec![loc(0, 0)], [loc(0, 5)]);
    let after = ConcreteState::new(vec![loc(0, 5)], [loc(0, 5)]);
    assert!(matches!(
        compute_move_layers(&pf, &before, &after),
        Err(CompileError::UnsupportedMove { .. })
    ));
}

#[test]
fn parked_atom_forces_a_later_detour() {
    let pf = finder();
    let before = ConcreteState::new(vec![loc(0, 0), loc(0, 5), loc(0, 6)], []);
    let after = ConcreteState::new(vec![loc(0, 1), loc(0, 5), loc(0, 6)], []);

    let layers = compute_move_layers(&pf, &before, &after).unwrap();
    let site = |s, b, d| LaneAddress::from(SiteLaneAddress::new(0, s, b, d));
    assert_eq!(layers.len(), 2);
    assert_eq!(layers[0].lanes, vec![site(0, 2, Direction::Forward)]);
    assert_eq!(layers[1].lanes, vec![site(1, 1, Direction::Backward)]);
}

#[test]
fn placement_chains_layers() {
    let pf = finder();
    let arch = pf.arch();
    let layout = InitialLayout::new([loc(0, 0), loc(0, 1), loc(0, 2)]);
    let mut program = GateProgram::new(3);
    program
        .cz([QubitId(0)], [QubitId(1)])
        .cz([QubitId(1)], [QubitId(2)])
        .measure();

    let placements = PlacementAnalysis::new(&pf, &LogicalPlacementStrategy, &layout)
        .run(&program)
        .unwrap();
    assert_eq!(placements.len(), 3);
    for pair in placements.windows(2) {
        assert_eq!(pair[0].after, pair[1].before);
    }
    assert!(placements[2].is_static());

    for placement in &placements {
        let (PlacementState::Concrete(before), PlacementState::Concrete(after)) =
            (&placement.before, &placement.after)
        else {
            panic!("layer {} is not concrete", placement.index);
        };
        let layers = compute_move_layers_along(
            &pf,
            before,
            after,
            &placement.paths,
            Box::new(BusReuseHeuristic::new()),
        )
        .unwrap();
        let moved: usize = layers.iter().map(|layer| layer.len()).sum();
        let planned: usize = placement.paths.values().map(|path| path.len()).sum();
        assert_eq!(moved, planned);
        let cz = &program.layers[placement.index];
        if let GateLayer::Cz { controls, targets } = cz {
            for (&c, &t) in controls.iter().zip(targets) {
                let lc = after.location_of(c).unwrap();
                assert_eq!(arch.get_blockaded_location(lc), after.location_of(t));
            }
        }
    }
}
