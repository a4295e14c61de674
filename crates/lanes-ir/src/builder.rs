//! Incremental construction of movement programs.

use lanes_arch::{LaneAddress, LocationAddress, ZoneAddress};

use crate::error::{IrError, IrResult};
use crate::op::{Op, Scalar};
use crate::program::{Block, BlockId, MoveProgram, Statement, Terminator, ValueId};

#[derive(Debug, Default)]
struct PendingBlock {
    params: Vec<ValueId>,
    statements: Vec<Statement>,
    terminator: Option<Terminator>,
}

/// Builds a [`MoveProgram`] one statement at a time.
///
/// Statements are appended to the current block, which starts as the
/// entry block.
///
/// # Example
///
/// ```rust
/// use lanes_arch::{LocationAddress, ZoneAddress};
/// use lanes_ir::MoveProgramBuilder;
///
/// let mut b = MoveProgramBuilder::new();
/// let s0 = b.load();
/// let s1 = b.fill(s0, [LocationAddress::new(0, 0), LocationAddress::new(0, 5)]);
/// let s2 = b.cz(s1, ZoneAddress::new(0));
/// b.ret(s2).unwrap();
/// let program = b.finish().unwrap();
/// assert_eq!(program.num_statements(), 3);
/// ```
#[derive(Debug)]
pub struct MoveProgramBuilder {
    blocks: Vec<PendingBlock>,
    current: BlockId,
    next_value: u32,
}

impl Default for MoveProgramBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveProgramBuilder {
    /// Create a builder positioned at an empty entry block.
    pub fn new() -> Self {
        Self {
            blocks: vec![PendingBlock::default()],
            current: BlockId::ENTRY,
            next_value: 0,
        }
    }

    fn fresh(&mut self) -> ValueId {
        let id = ValueId(self.next_value);
        self.next_value += 1;
        id
    }

    /// Append a statement to the current block and return its value.
    pub fn push(&mut self, op: Op) -> ValueId {
        let result = self.fresh();
        if let Some(block) = self.blocks.get_mut(self.current.index()) {
            block.statements.push(Statement { result, op });
        }
        result
    }

    /// The block statements are currently appended to.
    pub fn current_block(&self) -> BlockId {
        self.current
    }

    /// Create a block with `num_params` parameters.
    pub fn new_block(&mut self, num_params: usize) -> (BlockId, Vec<ValueId>) {
        let id = BlockId(u32::try_from(self.blocks.len()).unwrap_or(u32::MAX));
        let params: Vec<ValueId> = (0..num_params).map(|_| self.fresh()).collect();
        self.blocks.push(PendingBlock {
            params: params.clone(),
            ..PendingBlock::default()
        });
        (id, params)
    }

    /// Continue appending to `block`.
    pub fn switch_to(&mut self, block: BlockId) -> IrResult<()> {
        if block.index() >= self.blocks.len() {
            return Err(IrError::UnknownBlock(block));
        }
        self.current = block;
        Ok(())
    }

    fn terminate(&mut self, terminator: Terminator) -> IrResult<()> {
        let current = self.current;
        let block = self
            .blocks
            .get_mut(current.index())
            .ok_or(IrError::UnknownBlock(current))?;
        if block.terminator.is_some() {
            return Err(IrError::DuplicateTerminator(current));
        }
        block.terminator = Some(terminator);
        Ok(())
    }

    /// End the current block with a jump.
    pub fn jump(
        &mut self,
        target: BlockId,
        args: impl IntoIterator<Item = ValueId>,
    ) -> IrResult<()> {
        self.terminate(Terminator::Jump {
            target,
            args: args.into_iter().collect(),
        })
    }

    /// End the current block with a conditional branch.
    pub fn branch(
        &mut self,
        cond: ValueId,
        then_target: BlockId,
        then_args: impl IntoIterator<Item = ValueId>,
        else_target: BlockId,
        else_args: impl IntoIterator<Item = ValueId>,
    ) -> IrResult<()> {
        self.terminate(Terminator::Branch {
            cond,
            then_target,
            then_args: then_args.into_iter().collect(),
            else_target,
            else_args: else_args.into_iter().collect(),
        })
    }

    /// End the current block by returning `value`.
    pub fn ret(&mut self, value: ValueId) -> IrResult<()> {
        self.terminate(Terminator::Return { value })
    }

    /// Finish and validate the program.
    pub fn finish(self) -> IrResult<MoveProgram> {
        let blocks = (0u32..)
            .zip(self.blocks)
            .map(|(id, block)| {
                let terminator = block
                    .terminator
                    .ok_or(IrError::MissingTerminator(BlockId(id)))?;
                Ok(Block {
                    params: block.params,
                    statements: block.statements,
                    terminator,
                })
            })
            .collect::<IrResult<Vec<_>>>()?;
        MoveProgram::new(blocks, self.next_value)
    }

    // Convenience constructors for each operation.

    /// Empty atom state.
    pub fn load(&mut self) -> ValueId {
        self.push(Op::Load)
    }

    /// Introduce atoms.
    pub fn fill(
        &mut self,
        state: ValueId,
        locations: impl IntoIterator<Item = LocationAddress>,
    ) -> ValueId {
        self.push(Op::Fill {
            state,
            locations: locations.into_iter().collect(),
        })
    }

    /// Move atoms along lanes.
    pub fn move_lanes(
        &mut self,
        state: ValueId,
        lanes: impl IntoIterator<Item = LaneAddress>,
    ) -> ValueId {
        self.push(Op::Move {
            state,
            lanes: lanes.into_iter().collect(),
        })
    }

    /// CZ over a zone.
    pub fn cz(&mut self, state: ValueId, zone: ZoneAddress) -> ValueId {
        self.push(Op::Cz { state, zone })
    }

    /// Local rotation.
    pub fn local_r(
        &mut self,
        state: ValueId,
        axis_angle: f64,
        rotation_angle: f64,
        locations: impl IntoIterator<Item = LocationAddress>,
    ) -> ValueId {
        self.push(Op::LocalR {
            state,
            axis_angle,
            rotation_angle,
            locations: locations.into_iter().collect(),
        })
    }

    /// Global rotation.
    pub fn global_r(&mut self, state: ValueId, axis_angle: f64, rotation_angle: f64) -> ValueId {
        self.push(Op::GlobalR {
            state,
            axis_angle,
            rotation_angle,
        })
    }

    /// Local Z rotation.
    pub fn local_rz(
        &mut self,
        state: ValueId,
        rotation_angle: f64,
        locations: impl IntoIterator<Item = LocationAddress>,
    ) -> ValueId {
        self.push(Op::LocalRz {
            state,
            rotation_angle,
            locations: locations.into_iter().collect(),
        })
    }

    /// Global Z rotation.
    pub fn global_rz(&mut self, state: ValueId, rotation_angle: f64) -> ValueId {
        self.push(Op::GlobalRz {
            state,
            rotation_angle,
        })
    }

    /// Measure zones.
    pub fn end_measure(
        &mut self,
        state: ValueId,
        zones: impl IntoIterator<Item = ZoneAddress>,
    ) -> ValueId {
        self.push(Op::EndMeasure {
            state,
            zones: zones.into_iter().collect(),
        })
    }

    /// Read a future for one zone.
    pub fn get_future_result(&mut self, future: ValueId, zone: ZoneAddress) -> ValueId {
        self.push(Op::GetFutureResult { future, zone })
    }

    /// Zone index lookup.
    pub fn get_zone_index(&mut self, zone: ZoneAddress, location: LocationAddress) -> ValueId {
        self.push(Op::GetZoneIndex { zone, location })
    }

    /// A constant.
    pub fn constant(&mut self, value: Scalar) -> ValueId {
        self.push(Op::Constant { value })
    }

    /// A list.
    pub fn new_list(&mut self, items: impl IntoIterator<Item = ValueId>) -> ValueId {
        self.push(Op::NewList {
            items: items.into_iter().collect(),
        })
    }

    /// List indexing.
    pub fn get_item(&mut self, list: ValueId, index: ValueId) -> ValueId {
        self.push(Op::GetItem { list, index })
    }

    /// A detector.
    pub fn set_detector(
        &mut self,
        measurements: ValueId,
        coordinates: impl IntoIterator<Item = f64>,
    ) -> ValueId {
        self.push(Op::SetDetector {
            measurements,
            coordinates: coordinates.into_iter().collect(),
        })
    }

    /// An observable.
    pub fn set_observable(&mut self, measurements: ValueId, index: u32) -> ValueId {
        self.push(Op::SetObservable {
            measurements,
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_terminator() {
        let mut b = MoveProgramBuilder::new();
        b.load();
        assert_eq!(b.finish(), Err(IrError::MissingTerminator(BlockId(0))));
    }

    #[test]
    fn test_duplicate_terminator() {
        let mut b = MoveProgramBuilder::new();
        let s = b.load();
        b.ret(s).unwrap();
        assert_eq!(b.ret(s), Err(IrError::DuplicateTerminator(BlockId(0))));
    }

    #[test]
    fn test_argument_mismatch() {
        let mut b = MoveProgramBuilder::new();
        b.load();
        let (next, params) = b.new_block(1);
        b.jump(next, []).unwrap();
        b.switch_to(next).unwrap();
        b.ret(params[0]).unwrap();
        assert_eq!(
            b.finish(),
            Err(IrError::ArgumentMismatch {
                target: next,
                expected: 1,
                got: 0
            })
        );
    }

    #[test]
    fn test_unknown_block() {
        let mut b = MoveProgramBuilder::new();
        let s = b.load();
        b.jump(BlockId(7), [s]).unwrap();
        assert_eq!(b.finish(), Err(IrError::UnknownBlock(BlockId(7))));
        assert!(MoveProgramBuilder::new().switch_to(BlockId(1)).is_err());
    }

    #[test]
    fn test_diamond() {
        let mut b = MoveProgramBuilder::new();
        let s0 = b.load();
        let cond = b.constant(Scalar::Bool(true));
        let (left, _) = b.new_block(0);
        let (right, _) = b.new_block(0);
        let (join, params) = b.new_block(1);
        b.branch(cond, left, [], right, []).unwrap();

        b.switch_to(left).unwrap();
        let s1 = b.fill(s0, [LocationAddress::new(0, 0)]);
        b.jump(join, [s1]).unwrap();

        b.switch_to(right).unwrap();
        let s2 = b.fill(s0, [LocationAddress::new(0, 1)]);
        b.jump(join, [s2]).unwrap();

        b.switch_to(join).unwrap();
        b.ret(params[0]).unwrap();

        let program = b.finish().unwrap();
        assert_eq!(program.blocks().len(), 4);
        assert_eq!(program.num_statements(), 4);
        assert!(program.to_string().contains("branch"));
    }
}
