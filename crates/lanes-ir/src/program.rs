//! Control-flow graph of SSA statements.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::op::Op;

/// An SSA value. Every statement and every block parameter defines one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueId(pub u32);

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// A basic block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub u32);

impl BlockId {
    /// The entry block of every program.
    pub const ENTRY: BlockId = BlockId(0);

    /// The id as a vector index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "^{}", self.0)
    }
}

/// A position in a program: the `index`-th statement of `block`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProgramPoint {
    /// The block.
    pub block: BlockId,
    /// Statement index within the block.
    pub index: usize,
}

impl ProgramPoint {
    /// Create a new program point.
    pub const fn new(block: BlockId, index: usize) -> Self {
        Self { block, index }
    }
}

impl fmt::Display for ProgramPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.block, self.index)
    }
}

/// A statement defining one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// The value defined.
    pub result: ValueId,
    /// The operation computing it.
    pub op: Op,
}

/// How control leaves a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Terminator {
    /// Unconditional jump.
    Jump {
        /// Target block.
        target: BlockId,
        /// Values bound to the target's parameters.
        args: Vec<ValueId>,
    },
    /// Two-way branch on a boolean.
    Branch {
        /// The condition.
        cond: ValueId,
        /// Block taken when the condition is true.
        then_target: BlockId,
        /// Arguments for the true edge.
        then_args: Vec<ValueId>,
        /// Block taken when the condition is false.
        else_target: BlockId,
        /// Arguments for the false edge.
        else_args: Vec<ValueId>,
    },
    /// Leave the program with a value.
    Return {
        /// The returned value.
        value: ValueId,
    },
}

impl Terminator {
    /// Outgoing edges with their arguments.
    pub fn successors(&self) -> Vec<(BlockId, &[ValueId])> {
        match self {
            Terminator::Jump { target, args } => vec![(*target, args.as_slice())],
            Terminator::Branch {
                then_target,
                then_args,
                else_target,
                else_args,
                ..
            } => vec![
                (*then_target, then_args.as_slice()),
                (*else_target, else_args.as_slice()),
            ],
            Terminator::Return { .. } => Vec::new(),
        }
    }

    /// All value operands.
    pub fn operands(&self) -> Vec<ValueId> {
        match self {
            Terminator::Jump { args, .. } => args.clone(),
            Terminator::Branch {
                cond,
                then_args,
                else_args,
                ..
            } => std::iter::once(*cond)
                .chain(then_args.iter().copied())
                .chain(else_args.iter().copied())
                .collect(),
            Terminator::Return { value } => vec![*value],
        }
    }

    fn replace_uses(&mut self, old: ValueId, new: ValueId) {
        let swap = |v: &mut ValueId| {
            if *v == old {
                *v = new;
            }
        };
        match self {
            Terminator::Jump { args, .. } => args.iter_mut().for_each(swap),
            Terminator::Branch {
                cond,
                then_args,
                else_args,
                ..
            } => {
                swap(cond);
                then_args.iter_mut().for_each(swap);
                else_args.iter_mut().for_each(swap);
            }
            Terminator::Return { value } => swap(value),
        }
    }
}

/// A basic block: parameters, straight-line statements and a terminator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Values bound on entry by the incoming edge.
    #[serde(default)]
    pub params: Vec<ValueId>,
    /// Statements in execution order.
    pub statements: Vec<Statement>,
    /// The terminator.
    pub terminator: Terminator,
}

/// A movement program: a CFG of blocks, entered at [`BlockId::ENTRY`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveProgram {
    blocks: Vec<Block>,
    num_values: u32,
}

impl MoveProgram {
    /// Assemble a program from blocks and check it.
    pub fn new(blocks: Vec<Block>, num_values: u32) -> IrResult<Self> {
        let program = Self { blocks, num_values };
        program.validate()?;
        Ok(program)
    }

    /// All blocks, indexed by [`BlockId`].
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Mutable access to the blocks, for rewriting passes.
    pub fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }

    /// A single block.
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id.index())
    }

    /// Number of SSA values defined.
    pub fn num_values(&self) -> u32 {
        self.num_values
    }

    /// Total number of statements.
    pub fn num_statements(&self) -> usize {
        self.blocks.iter().map(|b| b.statements.len()).sum()
    }

    /// Iterate over every statement with its program point.
    pub fn statements(&self) -> impl Iterator<Item = (ProgramPoint, &Statement)> + '_ {
        (0u32..).zip(&self.blocks).flat_map(|(b, block)| {
            block
                .statements
                .iter()
                .enumerate()
                .map(move |(i, stmt)| (ProgramPoint::new(BlockId(b), i), stmt))
        })
    }

    /// Rewrite every use of `old` into `new` throughout the program.
    pub fn replace_uses(&mut self, old: ValueId, new: ValueId) {
        for block in &mut self.blocks {
            for stmt in &mut block.statements {
                stmt.op.replace_uses(old, new);
            }
            block.terminator.replace_uses(old, new);
        }
    }

    /// Check block references, argument arity and value ids.
    pub fn validate(&self) -> IrResult<()> {
        if self.blocks.is_empty() {
            return Err(IrError::UnknownBlock(BlockId::ENTRY));
        }
        let check_value = |v: ValueId| {
            if v.0 < self.num_values {
                Ok(())
            } else {
                Err(IrError::UnknownValue(v))
            }
        };

        for block in &self.blocks {
            block.params.iter().copied().try_for_each(check_value)?;
            for stmt in &block.statements {
                check_value(stmt.result)?;
                stmt.op.operands().into_iter().try_for_each(check_value)?;
            }
            block
                .terminator
                .operands()
                .into_iter()
                .try_for_each(check_value)?;

            for (target, args) in block.terminator.successors() {
                let target_block = self.block(target).ok_or(IrError::UnknownBlock(target))?;
                if target_block.params.len() != args.len() {
                    return Err(IrError::ArgumentMismatch {
                        target,
                        expected: target_block.params.len(),
                        got: args.len(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for MoveProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (b, block) in (0u32..).zip(&self.blocks) {
            write!(f, "{}(", BlockId(b))?;
            for (i, p) in block.params.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{p}")?;
            }
            writeln!(f, "):")?;
            for stmt in &block.statements {
                let operands: Vec<String> =
                    stmt.op.operands().iter().map(ToString::to_string).collect();
                writeln!(
                    f,
                    "  {} = {}({})",
                    stmt.result,
                    stmt.op.name(),
                    operands.join(", ")
                )?;
            }
            match &block.terminator {
                Terminator::Jump { target, .. } => writeln!(f, "  jump {target}")?,
                Terminator::Branch {
                    cond,
                    then_target,
                    else_target,
                    ..
                } => writeln!(f, "  branch {cond} ? {then_target} : {else_target}")?,
                Terminator::Return { value } => writeln!(f, "  return {value}")?,
            }
        }
        Ok(())
    }
}
