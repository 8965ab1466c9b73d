use std::path::Path;

use anyhow::Result;
use mcx_core::model::Maturity;
use serde::Serialize;

use crate::commands::print_output;
use crate::{load_program, sha256_file};

#[derive(Debug, Serialize)]
pub struct FunctionInfo {
    pub name: String,
    pub start: String,
    pub end: String,
    pub maturities: Vec<Maturity>,
}

#[derive(Debug, Serialize)]
pub struct FixtureInfo {
    pub path: String,
    pub sha256: String,
    pub functions: Vec<FunctionInfo>,
    pub segment_count: usize,
    pub symbol_count: usize,
}

#[derive(Debug, Serialize)]
pub struct MaturityInfo {
    pub index: usize,
    pub name: Maturity,
    pub default: bool,
}

pub fn fixture_info(input: &Path) -> Result<FixtureInfo> {
    let program = load_program(input)?;
    let sha256 = sha256_file(input)?;
    let functions = program
        .functions
        .iter()
        .map(|f| FunctionInfo {
            name: f.name.clone(),
            start: format!("{:X}", f.start),
            end: format!("{:X}", f.end),
            maturities: f.maturities(),
        })
        .collect();

    Ok(FixtureInfo {
        path: input.display().to_string(),
        sha256,
        functions,
        segment_count: program.segments.len(),
        symbol_count: program.symbols.len(),
    })
}

/// Summarize a program fixture: hash, functions, and their maturity levels.
pub fn info_command(input: &Path, json: bool) -> Result<()> {
    let info = fixture_info(input)?;
    print_output(&info, json, |info| {
        println!("Fixture: {}", info.path);
        println!("SHA-256: {}", info.sha256);
        println!("Segments: {}  Symbols: {}", info.segment_count, info.symbol_count);
        println!("Functions ({}):", info.functions.len());
        if info.functions.is_empty() {
            println!("  (none)");
        }
        for func in &info.functions {
            let levels: Vec<&str> = func.maturities.iter().map(|m| m.as_str()).collect();
            println!("  - {} [{}..{}] {}", func.name, func.start, func.end, levels.join(" "));
        }
    })
}

pub fn maturity_list(default: Maturity) -> Vec<MaturityInfo> {
    Maturity::selectable()
        .iter()
        .enumerate()
        .map(|(index, &name)| MaturityInfo { index, name, default: name == default })
        .collect()
}

/// List the maturity levels a view can be generated at.
pub fn maturities_command(default: Maturity, json: bool) -> Result<()> {
    let levels = maturity_list(default);
    print_output(&levels, json, |levels| {
        println!("Maturity levels:");
        for level in levels {
            let marker = if level.default { " (default)" } else { "" };
            println!("  {}: {}{}", level.index, level.name, marker);
        }
    })
}
