#![allow(dead_code)]

use std::path::{Path, PathBuf};

use mcx_core::model::{
    Block, FunctionFixture, Instruction, Maturity, MicroFunction, Operand, Program, Segment,
};

/// Two-block function `main` at 0x401000:
///
/// ```text
///  0: 0. 0 ; 1WAY-BLOCK 0 OUTBOUNDS: 1 ...
///  1: 0. 0 call   !puts, <&($402000.8)> ; 00401000
///  2:
///  3: 1. 0 ; 0WAY-BLOCK 1 INBOUNDS: 0 ...
///  4: 1. 0 ret ; 00401008
/// ```
pub fn sample_program() -> Program {
    let calls = MicroFunction::new(0x401000, Maturity::Calls).with_blocks(vec![
        Block::new(0x401000, 0x401008)
            .with_instructions(vec![Instruction::new(0x401000, "call")
                .with_l(Operand::Helper { name: "puts".into() })
                .with_d(Operand::args(vec![Operand::address_of(Operand::Global {
                    ea: 0x402000,
                    size: 8,
                })]))])
            .with_successors(vec![1]),
        Block::new(0x401008, 0x401009).with_instructions(vec![Instruction::new(0x401008, "ret")]),
    ]);
    let mut generated = calls.clone();
    generated.maturity = Maturity::Generated;

    let mut program = Program::default();
    program.functions.push(FunctionFixture {
        name: "main".into(),
        start: 0x401000,
        end: 0x401009,
        levels: vec![generated, calls],
    });
    program.segments.push(Segment { name: ".text".into(), start: 0x401000, end: 0x402000 });
    program.segments.push(Segment { name: ".data".into(), start: 0x402000, end: 0x403000 });
    program.symbols.insert("main".into(), 0x401000);
    program
}

/// Write the sample program as JSON under `dir`.
pub fn write_fixture(dir: &Path) -> PathBuf {
    let path = dir.join("program.json");
    let body = serde_json::to_string_pretty(&sample_program()).expect("serialize fixture");
    std::fs::write(&path, body).expect("write fixture");
    path
}
