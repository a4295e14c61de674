//! Removal of no-op moves.

use std::collections::BTreeMap;

use lanes_ir::{MoveProgram, Op, ValueId};
use tracing::debug;

use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Number of moves removed by [`DropEmptyMoves`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DroppedMoves(pub usize);

/// Deletes `Move` statements with no lanes and forwards their input state
/// to every user.
pub struct DropEmptyMoves;

impl Pass for DropEmptyMoves {
    fn name(&self) -> &'static str {
        "drop_empty_moves"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, program: &mut MoveProgram, properties: &mut PropertySet) -> CompileResult<()> {
        let mut forward: BTreeMap<ValueId, ValueId> = BTreeMap::new();
        for block in program.blocks_mut() {
            block.statements.retain(|stmt| match &stmt.op {
                Op::Move { state, lanes } if lanes.is_empty() => {
                    forward.insert(stmt.result, *state);
                    false
                }
                _ => true,
            });
        }

        for &old in forward.keys() {
            let mut new = old;
            // Chains of empty moves resolve to the first real state.
            for _ in 0..=forward.len() {
                match forward.get(&new) {
                    Some(&next) => new = next,
                    None => break,
                }
            }
            program.replace_uses(old, new);
        }

        debug!(dropped = forward.len(), "Dropped empty moves");
        properties.insert(DroppedMoves(forward.len()));
        Ok(())
    }

    fn should_run(&self, program: &MoveProgram, _properties: &PropertySet) -> bool {
        program
            .statements()
            .any(|(_, stmt)| matches!(&stmt.op, Op::Move { lanes, .. } if lanes.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use lanes_arch::{Direction, LocationAddress, SiteLaneAddress};
    use lanes_ir::{MoveProgramBuilder, Terminator};

    use super::*;

    #[test]
    fn test_chained_empty_moves_are_forwarded() {
        let mut b = MoveProgramBuilder::new();
        let s0 = b.load();
        let s1 = b.fill(s0, [LocationAddress::new(0, 0)]);
        let s2 = b.move_lanes(s1, []);
        let s3 = b.move_lanes(s2, []);
        let s4 = b.move_lanes(s3, [SiteLaneAddress::new(0, 0, 0, Direction::Forward).into()]);
        let s5 = b.move_lanes(s4, []);
        b.ret(s5).unwrap();
        let mut program = b.finish().unwrap();

        let pass = DropEmptyMoves;
        let mut props = PropertySet::new();
        assert!(pass.should_run(&program, &props));
        pass.run(&mut program, &mut props).unwrap();

        assert_eq!(program.num_statements(), 3);
        let block = &program.blocks()[0];
        assert_eq!(block.statements[2].op.state_input(), Some(s1));
        assert_eq!(block.terminator, Terminator::Return { value: s4 });
        assert_eq!(props.get::<DroppedMoves>(), Some(&DroppedMoves(3)));
        assert!(!pass.should_run(&program, &props));
    }
}
