//! End-to-end behaviour of the atom-state interpreter.

use std::sync::Arc;

use lanes_analysis::{
    AtomInterpreter, FiniteLattice, InterpretError, MoveExecution, ReturnValue,
};
use lanes_arch::{
    Direction, LaneAddress, LocationAddress, PathFinder, SiteLaneAddress, ZoneAddress, presets,
};
use lanes_ir::{BlockId, MoveProgramBuilder, ProgramPoint, QubitId, Scalar, ValueId};

const NO_ARGS: [ValueId; 0] = [];

fn interpreter() -> AtomInterpreter {
    let arch = Arc::new(presets::logical().unwrap());
    AtomInterpreter::new(Arc::new(PathFinder::new(arch)))
}

fn loc(w: u32, s: u32) -> LocationAddress {
    LocationAddress::new(w, s)
}

fn site_lane(w: u32, s: u32, bus: u32) -> LaneAddress {
    SiteLaneAddress::new(w, s, bus, Direction::Forward).into()
}

#[test]
fn straight_line_trace() {
    let mut b = MoveProgramBuilder::new();
    let s0 = b.load();
    let s1 = b.fill(s0, [loc(0, 0), loc(0, 1)]);
    let s2 = b.move_lanes(s1, [site_lane(0, 0, 0), site_lane(0, 1, 0)]);
    let s3 = b.cz(s2, ZoneAddress::new(0));
    b.ret(s3).unwrap();
    let program = b.finish().unwrap();

    let analysis = interpreter().run(&program).unwrap();
    assert_eq!(analysis.states.len(), 4);
    let MoveExecution::AtomState(state) = analysis.value(s3) else {
        panic!("expected a layout, got {:?}", analysis.value(s3));
    };
    assert_eq!(state.location_of(QubitId(0)), Some(loc(0, 5)));
    assert_eq!(state.location_of(QubitId(1)), Some(loc(0, 6)));
    assert!(state.check_bijection());
    assert!(!analysis.has_unknown_state());
}

#[test]
fn divergent_merge_is_unknown_then_bottom() {
    let mut b = MoveProgramBuilder::new();
    let s0 = b.load();
    let cond = b.constant(Scalar::Int(0));
    let (left, _) = b.new_block(0);
    let (right, _) = b.new_block(0);
    let (join, params) = b.new_block(1);
    b.branch(cond, left, NO_ARGS, right, NO_ARGS).unwrap();

    b.switch_to(left).unwrap();
    let l = b.fill(s0, [loc(0, 0)]);
    b.jump(join, [l]).unwrap();

    b.switch_to(right).unwrap();
    let r = b.fill(s0, [loc(0, 1)]);
    b.jump(join, [r]).unwrap();

    b.switch_to(join).unwrap();
    let moved = b.move_lanes(params[0], [site_lane(0, 0, 0)]);
    b.ret(moved).unwrap();
    let program = b.finish().unwrap();

    let analysis = interpreter().run(&program).unwrap();
    assert!(analysis.value(params[0]).is_top());
    assert!(analysis.value(moved).is_bottom());
    assert!(
        analysis
            .state_at(ProgramPoint::new(join, 0))
            .unwrap()
            .is_bottom()
    );
}

#[test]
fn known_branch_follows_one_edge() {
    let mut b = MoveProgramBuilder::new();
    let s0 = b.load();
    let cond = b.constant(Scalar::Bool(true));
    let (left, _) = b.new_block(0);
    let (right, _) = b.new_block(0);
    let (join, params) = b.new_block(1);
    b.branch(cond, left, NO_ARGS, right, NO_ARGS).unwrap();

    b.switch_to(left).unwrap();
    let l = b.fill(s0, [loc(0, 0)]);
    b.jump(join, [l]).unwrap();

    b.switch_to(right).unwrap();
    let r = b.fill(s0, [loc(0, 1)]);
    b.jump(join, [r]).unwrap();

    b.switch_to(join).unwrap();
    let moved = b.move_lanes(params[0], [site_lane(0, 0, 0)]);
    b.ret(moved).unwrap();
    let program = b.finish().unwrap();

    let analysis = interpreter().run(&program).unwrap();
    assert!(analysis.value(r).is_bottom());
    assert!(analysis.state_at(ProgramPoint::new(right, 0)).is_none());
    let state = analysis.value(moved).as_state().unwrap();
    assert_eq!(state.qubit_at(loc(0, 5)), Some(QubitId(0)));
}

#[test]
fn loop_converges_on_round_trip() {
    let mut b = MoveProgramBuilder::new();
    let (header, params) = b.new_block(1);
    let (exit, exit_params) = b.new_block(1);

    let s0 = b.load();
    let s1 = b.fill(s0, [loc(0, 0)]);
    let unknown = b.constant(Scalar::Float(0.5));
    b.jump(header, [s1]).unwrap();

    b.switch_to(header).unwrap();
    let there = b.move_lanes(params[0], [site_lane(0, 0, 0)]);
    let back = b.move_lanes(there, [site_lane(0, 0, 0).reverse()]);
    b.branch(unknown, header, [back], exit, [back]).unwrap();

    b.switch_to(exit).unwrap();
    b.ret(exit_params[0]).unwrap();
    let program = b.finish().unwrap();

    let analysis = interpreter().run(&program).unwrap();
    let state = analysis.value(exit_params[0]).as_state().unwrap();
    assert_eq!(state.qubit_at(loc(0, 0)), Some(QubitId(0)));
    assert_eq!(state.move_count(QubitId(0)), 2);
    assert!(matches!(analysis.return_value, MoveExecution::AtomState(_)));
}

#[test]
fn iteration_limit_is_an_error() {
    let mut b = MoveProgramBuilder::new();
    let (next, _) = b.new_block(0);
    let s0 = b.load();
    b.jump(next, NO_ARGS).unwrap();
    b.switch_to(next).unwrap();
    b.ret(s0).unwrap();
    let program = b.finish().unwrap();

    let err = interpreter()
        .with_max_iterations(1)
        .run(&program)
        .unwrap_err();
    assert_eq!(err, InterpretError::IterationLimit(1));
}

#[test]
fn measurement_and_post_processing() {
    let zone = ZoneAddress::new(0);
    let mut b = MoveProgramBuilder::new();
    let s0 = b.load();
    let s1 = b.fill(s0, [loc(0, 0), loc(0, 5), loc(1, 2)]);
    let s2 = b.cz(s1, zone);
    let future = b.end_measure(s2, [zone]);
    let results = b.get_future_result(future, zone);
    let index = b.get_zone_index(zone, loc(0, 5));
    let item = b.get_item(results, index);
    let list = b.new_list([item]);
    b.set_detector(list, [0.0, 0.0]);
    b.set_observable(results, 0);
    b.ret(results).unwrap();
    let program = b.finish().unwrap();

    let analysis = interpreter().run(&program).unwrap();
    assert!(matches!(analysis.value(future), MoveExecution::MeasureFuture(_)));
    assert_eq!(analysis.value(index), &MoveExecution::Value(Scalar::Int(5)));
    assert_eq!(analysis.value(item), &MoveExecution::MeasureResult(QubitId(1)));
    assert_eq!(analysis.detectors.len(), 1);
    assert_eq!(analysis.observables.len(), 1);

    let pp = analysis.post_processing().unwrap();
    assert_eq!(pp.min_bits(), 3);
    let shot = pp.apply(&[true, false, true]).unwrap();
    assert_eq!(shot.detectors, vec![false]);
    assert_eq!(shot.observables, vec![false]);
    let ReturnValue::List(values) = shot.value else {
        panic!("expected a list");
    };
    assert_eq!(values.len(), 20);
    assert_eq!(values[0], ReturnValue::Bool(true));
    assert_eq!(values[5], ReturnValue::Bool(false));
    assert_eq!(values[12], ReturnValue::Bool(true));
    assert_eq!(values[1], ReturnValue::None);
}

#[test]
fn interpretation_errors_carry_the_statement() {
    let mut b = MoveProgramBuilder::new();
    let s0 = b.load();
    let s1 = b.fill(s0, [loc(0, 0)]);
    let s2 = b.fill(s1, [loc(0, 0)]);
    b.ret(s2).unwrap();
    let program = b.finish().unwrap();

    let err = interpreter().run(&program).unwrap_err();
    assert_eq!(err.root(), &InterpretError::OccupiedSite(loc(0, 0)));
    let InterpretError::AtStatement { point, op, .. } = err else {
        panic!("expected statement context");
    };
    assert_eq!(point, ProgramPoint::new(BlockId::ENTRY, 2));
    assert_eq!(op, "fill");
}

#[test]
fn zone_index_outside_zone_is_bottom() {
    let mut description = lanes_arch::ArchDescription::from(presets::logical().unwrap());
    description.zones = vec![vec![0], vec![1]];
    let arch = Arc::new(lanes_arch::ArchSpec::new(description).unwrap());
    let interp = AtomInterpreter::new(Arc::new(PathFinder::new(arch)));

    let mut b = MoveProgramBuilder::new();
    let inside = b.get_zone_index(ZoneAddress::new(1), loc(1, 3));
    let outside = b.get_zone_index(ZoneAddress::new(1), loc(0, 3));
    b.ret(outside).unwrap();
    let program = b.finish().unwrap();

    let analysis = interp.run(&program).unwrap();
    assert_eq!(analysis.value(inside), &MoveExecution::Value(Scalar::Int(3)));
    assert!(analysis.value(outside).is_bottom());
}
