//! Movement programs survive a JSON round trip and are re-checked on load.

use lanes_arch::{Direction, LocationAddress, SiteLaneAddress, ZoneAddress};
use lanes_ir::{IrError, MoveProgram, MoveProgramBuilder, Op, ValueId};

fn sample() -> MoveProgram {
    let mut b = MoveProgramBuilder::new();
    let s0 = b.load();
    let s1 = b.fill(s0, [LocationAddress::new(0, 0)]);
    let s2 = b.move_lanes(s1, [SiteLaneAddress::new(0, 0, 0, Direction::Forward).into()]);
    let s3 = b.end_measure(s2, [ZoneAddress::new(0)]);
    let r = b.get_future_result(s3, ZoneAddress::new(0));
    b.ret(r).unwrap();
    b.finish().unwrap()
}

#[test]
fn json_round_trip() {
    let program = sample();
    let json = serde_json::to_string_pretty(&program).unwrap();
    assert!(json.contains("\"op\": \"move\""));
    let back: MoveProgram = serde_json::from_str(&json).unwrap();
    assert_eq!(back, program);
    assert!(back.validate().is_ok());
}

#[test]
fn replace_uses_rewires_state_chain() {
    let mut program = sample();
    program.replace_uses(ValueId(2), ValueId(1));
    let (_, stmt) = program.statements().nth(3).unwrap();
    assert_eq!(stmt.op.state_input(), Some(ValueId(1)));
    assert!(matches!(stmt.op, Op::EndMeasure { .. }));
}

#[test]
fn dangling_value_rejected() {
    let mut program = sample();
    program.replace_uses(ValueId(4), ValueId(99));
    assert_eq!(program.validate(), Err(IrError::UnknownValue(ValueId(99))));
}
