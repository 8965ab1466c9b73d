#![allow(dead_code)]

use mcx_core::graph::{GraphEdge, InteractiveGraph};
use mcx_core::model::{Block, Instruction, Maturity, MicroFunction, Operand};

pub const ENTRY: u64 = 0x401000;

/// Four blocks: 0 -> 1, 1 -> {2, 3}, 2 -> 3, 3 returns.
///
/// Rendered listing (line: content):
///  0: `0. 0 ; 1WAY-BLOCK 0 ...`   1: `0. 0 mov ...`   2: blank
///  3: `1. 0 ; 2WAY-BLOCK 1 ...`   4: `1. 0 jz ... @3` 5: blank
///  6: `2. 0 ; 1WAY-BLOCK 2 ...`   7: `2. 0 call ...`  8: `2. 1 mov ...`
///  9: blank                      10: `3. 0 ; 0WAY-BLOCK 3 ...`  11: `3. 0 ret`
pub fn sample_function() -> MicroFunction {
    MicroFunction::new(ENTRY, Maturity::LocalOpt).with_blocks(vec![
        Block::new(0x401000, 0x401005)
            .with_instructions(vec![Instruction::new(0x401000, "mov")
                .with_l(Operand::num(0, 4))
                .with_d(Operand::reg("eax", 4))])
            .with_successors(vec![1]),
        Block::new(0x401005, 0x40100A)
            .with_instructions(vec![Instruction::new(0x401005, "jz")
                .with_l(Operand::reg("eax", 4))
                .with_r(Operand::num(0, 4))
                .with_d(Operand::Block { block: 3 })])
            .with_successors(vec![2, 3]),
        Block::new(0x40100A, 0x401010)
            .with_instructions(vec![call_insn(), mov_nested_insn()])
            .with_successors(vec![3]),
        Block::new(0x401010, 0x401011)
            .with_instructions(vec![Instruction::new(0x401010, "ret")]),
    ])
}

/// `call !strlen, <&(%var_10.4), #1.4>`: six nodes, five edges.
pub fn call_insn() -> Instruction {
    Instruction::new(0x40100A, "call")
        .with_l(Operand::Helper { name: "strlen".into() })
        .with_d(Operand::args(vec![
            Operand::address_of(Operand::Stack { offset: -16, size: 4 }),
            Operand::num(1, 4),
        ]))
}

/// `mov (add eax.4, #0x10.4), eax.4:edx.4`: eight nodes, seven edges.
pub fn mov_nested_insn() -> Instruction {
    Instruction::new(0x40100E, "mov")
        .with_l(Operand::nested(
            Instruction::new(0x40100E, "add")
                .with_l(Operand::reg("eax", 4))
                .with_r(Operand::num(0x10, 4)),
        ))
        .with_d(Operand::pair(Operand::reg("eax", 4), Operand::reg("edx", 4)))
}

/// Records what a host graph widget would be told.
#[derive(Debug, Default)]
pub struct RecordingGraph {
    pub node_count: usize,
    pub edges: Vec<GraphEdge>,
    pub resizes: usize,
}

impl InteractiveGraph for RecordingGraph {
    fn resize(&mut self, node_count: usize) {
        self.node_count = node_count;
        self.edges.clear();
        self.resizes += 1;
    }

    fn add_edge(&mut self, edge: GraphEdge) {
        self.edges.push(edge);
    }
}
