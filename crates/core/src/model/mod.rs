//! Microcode data model.
//!
//! The host owns the real IR; this module defines the shape the rest of the
//! crate reads it through:
//! - [`IrFunction`]: the function-level seam (entry address, blocks, printing)
//! - [`Block`], [`Instruction`], [`Operand`]: the block/instruction/operand tree
//! - [`MicroFunction`]: an in-memory implementation, also used for fixtures

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

pub mod maturity;
pub mod print;
pub mod program;

pub use maturity::{Maturity, UnknownMaturity};
pub use program::{FixtureError, FunctionFixture, GenerateError, Program, Segment};

/// Effective address in the analysed program.
pub type Address = u64;

/// A host IR function shared with views that are allowed to keep it alive.
pub type SharedIr = Rc<RefCell<dyn IrFunction>>;

/// Receives printed lines, one call per line, in order.
pub trait LineSink {
    fn emit(&mut self, line: String);
}

impl LineSink for Vec<String> {
    fn emit(&mut self, line: String) {
        self.push(line);
    }
}

/// Read-only view of a decompiled function's microcode.
///
/// Implemented by the host adapter. Nothing in this crate mutates an
/// `IrFunction`; the host may change it between events.
pub trait IrFunction {
    fn entry_ea(&self) -> Address;
    fn maturity(&self) -> Maturity;
    fn block_count(&self) -> usize;
    fn block(&self, index: usize) -> Option<&Block>;

    /// Print one block, header comment first, one line per instruction.
    fn print_block(&self, index: usize, sink: &mut dyn LineSink);

    /// Print the whole function. Blocks are separated by an empty line.
    fn print(&self, sink: &mut dyn LineSink) {
        for index in 0..self.block_count() {
            if index > 0 {
                sink.emit(String::new());
            }
            self.print_block(index, sink);
        }
    }
}

/// One operand of a microinstruction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operand {
    /// Unused operand slot.
    #[default]
    Empty,
    Register {
        name: String,
        size: u8,
    },
    Number {
        value: u64,
        size: u8,
    },
    Stack {
        offset: i64,
        size: u8,
    },
    Global {
        ea: Address,
        size: u8,
    },
    /// Reference to a block of the same function (`@N`).
    Block {
        block: usize,
    },
    Helper {
        name: String,
    },
    Str {
        value: String,
    },
    /// Result of another instruction.
    Nested {
        insn: Box<Instruction>,
    },
    /// Call argument list.
    Args {
        args: Vec<Operand>,
    },
    Pair {
        low: Box<Operand>,
        high: Box<Operand>,
    },
    /// Address of another operand.
    AddressOf {
        target: Box<Operand>,
    },
    /// Operand kinds this crate does not know about. Treated as leaves.
    #[serde(other)]
    Unknown,
}

impl Operand {
    pub fn reg(name: impl Into<String>, size: u8) -> Self {
        Operand::Register { name: name.into(), size }
    }

    pub fn num(value: u64, size: u8) -> Self {
        Operand::Number { value, size }
    }

    pub fn nested(insn: Instruction) -> Self {
        Operand::Nested { insn: Box::new(insn) }
    }

    pub fn args(args: Vec<Operand>) -> Self {
        Operand::Args { args }
    }

    pub fn pair(low: Operand, high: Operand) -> Self {
        Operand::Pair { low: Box::new(low), high: Box::new(high) }
    }

    pub fn address_of(target: Operand) -> Self {
        Operand::AddressOf { target: Box::new(target) }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Operand::Empty)
    }
}

/// A single microinstruction: opcode plus left, right, and destination operands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub ea: Address,
    pub opcode: String,
    #[serde(default, skip_serializing_if = "Operand::is_empty")]
    pub l: Operand,
    #[serde(default, skip_serializing_if = "Operand::is_empty")]
    pub r: Operand,
    #[serde(default, skip_serializing_if = "Operand::is_empty")]
    pub d: Operand,
}

impl Instruction {
    pub fn new(ea: Address, opcode: impl Into<String>) -> Self {
        Self {
            ea,
            opcode: opcode.into(),
            l: Operand::Empty,
            r: Operand::Empty,
            d: Operand::Empty,
        }
    }

    pub fn with_l(mut self, op: Operand) -> Self {
        self.l = op;
        self
    }

    pub fn with_r(mut self, op: Operand) -> Self {
        self.r = op;
        self
    }

    pub fn with_d(mut self, op: Operand) -> Self {
        self.d = op;
        self
    }

    /// The three canonical operand slots, in slot order.
    pub fn operands(&self) -> [&Operand; 3] {
        [&self.l, &self.r, &self.d]
    }
}

/// A basic block: straight-line instructions plus control-flow successors.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Block {
    pub start: Address,
    pub end: Address,
    #[serde(default)]
    pub instructions: Vec<Instruction>,
    #[serde(default)]
    pub successors: Vec<usize>,
}

impl Block {
    pub fn new(start: Address, end: Address) -> Self {
        Self { start, end, instructions: Vec::new(), successors: Vec::new() }
    }

    pub fn with_instructions(mut self, instructions: Vec<Instruction>) -> Self {
        self.instructions = instructions;
        self
    }

    pub fn with_successors(mut self, successors: Vec<usize>) -> Self {
        self.successors = successors;
        self
    }

    /// The `serial`-th instruction of the block, if the block is that long.
    pub fn instruction(&self, serial: usize) -> Option<&Instruction> {
        self.instructions.get(serial)
    }

    /// Host-style block kind label derived from the successor count.
    pub fn kind_label(&self) -> &'static str {
        match self.successors.len() {
            0 => "0WAY",
            1 => "1WAY",
            2 => "2WAY",
            _ => "NWAY",
        }
    }
}

/// In-memory microcode for one function at one maturity level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicroFunction {
    pub entry_ea: Address,
    #[serde(default)]
    pub maturity: Maturity,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl MicroFunction {
    pub fn new(entry_ea: Address, maturity: Maturity) -> Self {
        Self { entry_ea, maturity, blocks: Vec::new() }
    }

    pub fn with_blocks(mut self, blocks: Vec<Block>) -> Self {
        self.blocks = blocks;
        self
    }

    /// Wrap into the shared form views hold on to.
    pub fn into_shared(self) -> SharedIr {
        Rc::new(RefCell::new(self))
    }

    /// Block numbers that list `index` as a successor, ascending.
    pub fn predecessors(&self, index: usize) -> Vec<usize> {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.successors.contains(&index))
            .map(|(i, _)| i)
            .collect()
    }
}

impl IrFunction for MicroFunction {
    fn entry_ea(&self) -> Address {
        self.entry_ea
    }

    fn maturity(&self) -> Maturity {
        self.maturity
    }

    fn block_count(&self) -> usize {
        self.blocks.len()
    }

    fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    fn print_block(&self, index: usize, sink: &mut dyn LineSink) {
        if let Some(block) = self.blocks.get(index) {
            print::print_block(index, block, &self.predecessors(index), sink);
        }
    }
}
