//! Reference pretty-printer for [`MicroFunction`](super::MicroFunction).
//!
//! Output follows the host listing conventions the navigation code relies on:
//!
//! ```text
//! 1. 0 ; 2WAY-BLOCK 1 INBOUNDS: 0 OUTBOUNDS: 2 3 [START=00401000 END=00401010]
//! 1. 0 mov    #0.4, eax.4 ; 00401000
//! 1. 1 jz     eax.4, #0.4, @3 ; 00401005
//! ```
//!
//! Lines carry host colour tags: `COLOR_ON <tag>` opens a span and
//! `COLOR_OFF <tag>` closes it.

use std::fmt;

use super::{Block, Instruction, LineSink, Operand};

pub const COLOR_ON: char = '\x01';
pub const COLOR_OFF: char = '\x02';

/// Colour tag bytes used by the printer.
pub mod tag {
    pub const RPTCMT: char = '\x04';
    pub const AUTOCMT: char = '\x05';
    pub const INSN: char = '\x06';
    /// Line-prefix colour. Stripped from listings before they are stored.
    pub const PREFIX: char = '\x13';
}

/// Wrap `text` in an on/off span of colour `tag`.
pub fn colored(color: char, text: &str) -> String {
    format!("{COLOR_ON}{color}{text}{COLOR_OFF}{color}")
}

/// Remove every colour span marker, keeping the text.
pub fn strip_color_tags(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        if c == COLOR_ON || c == COLOR_OFF {
            chars.next();
            continue;
        }
        out.push(c);
    }
    out
}

/// Remove only the line-prefix colour markers, leaving other colours intact.
pub fn remove_prefix_tags(line: &str) -> String {
    let on: String = [COLOR_ON, tag::PREFIX].iter().collect();
    let off: String = [COLOR_OFF, tag::PREFIX].iter().collect();
    line.replace(&on, "").replace(&off, "")
}

fn join_numbers(values: &[usize]) -> String {
    values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ")
}

/// Print one block through `sink`. `predecessors` feeds the header comment.
pub fn print_block(index: usize, block: &Block, predecessors: &[usize], sink: &mut dyn LineSink) {
    let mut header = format!("; {}-BLOCK {index}", block.kind_label());
    if !predecessors.is_empty() {
        header.push_str(&format!(" INBOUNDS: {}", join_numbers(predecessors)));
    }
    if !block.successors.is_empty() {
        header.push_str(&format!(" OUTBOUNDS: {}", join_numbers(&block.successors)));
    }
    header.push_str(&format!(" [START={:08X} END={:08X}]", block.start, block.end));
    sink.emit(format!("{} {}", line_prefix(index, 0), colored(tag::RPTCMT, &header)));

    for (serial, insn) in block.instructions.iter().enumerate() {
        sink.emit(format!(
            "{} {} {}",
            line_prefix(index, serial),
            colored_instruction(insn),
            colored(tag::AUTOCMT, &format!("; {:08X}", insn.ea))
        ));
    }
}

fn line_prefix(block: usize, serial: usize) -> String {
    colored(tag::PREFIX, &format!("{block}.{serial:>2}"))
}

fn colored_instruction(insn: &Instruction) -> String {
    let operands = operand_list(insn);
    let opcode = colored(tag::INSN, &format!("{:<6}", insn.opcode));
    if operands.is_empty() {
        opcode
    } else {
        format!("{opcode} {operands}")
    }
}

fn operand_list(insn: &Instruction) -> String {
    insn.operands()
        .iter()
        .filter(|op| !op.is_empty())
        .map(|op| op.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operands = operand_list(self);
        if operands.is_empty() {
            f.write_str(&self.opcode)
        } else {
            write!(f, "{:<6} {operands}", self.opcode)
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Empty => Ok(()),
            Operand::Register { name, size } => write!(f, "{name}.{size}"),
            Operand::Number { value, size } if *value < 10 => write!(f, "#{value}.{size}"),
            Operand::Number { value, size } => write!(f, "#0x{value:X}.{size}"),
            Operand::Stack { offset, size } if *offset < 0 => {
                write!(f, "%var_{:X}.{size}", offset.unsigned_abs())
            }
            Operand::Stack { offset, size } => write!(f, "%arg_{offset:X}.{size}"),
            Operand::Global { ea, size } => write!(f, "${ea:X}.{size}"),
            Operand::Block { block } => write!(f, "@{block}"),
            Operand::Helper { name } => write!(f, "!{name}"),
            Operand::Str { value } => write!(f, "{value:?}"),
            Operand::Nested { insn } => write!(f, "({insn})"),
            Operand::Args { args } => {
                let parts: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "<{}>", parts.join(", "))
            }
            Operand::Pair { low, high } => write!(f, "{low}:{high}"),
            Operand::AddressOf { target } => write!(f, "&({target})"),
            Operand::Unknown => f.write_str("?"),
        }
    }
}
