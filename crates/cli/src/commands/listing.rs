use std::path::Path;

use anyhow::{anyhow, Result};
use mcx_core::config::ExplorerConfig;
use mcx_core::model::Maturity;
use serde::Serialize;

use crate::commands::{open_view, print_output, OpenView};

#[derive(Debug, Serialize)]
pub struct ListingReport {
    pub title: String,
    pub entry_ea: String,
    pub maturity: Maturity,
    pub lines: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct GotoReport {
    pub target: String,
    pub line: usize,
    pub text: String,
}

fn listing_report(opened: &OpenView) -> Result<ListingReport> {
    let state = opened
        .host
        .text_view(opened.view)
        .ok_or_else(|| anyhow!("Microcode view {} closed unexpectedly", opened.view))?;
    let entry_ea = opened
        .explorer
        .with_session(opened.view, |s| format!("{:X}", s.entry_ea()))
        .ok_or_else(|| anyhow!("Microcode view {} closed unexpectedly", opened.view))?;
    Ok(ListingReport {
        title: state.title.clone(),
        entry_ea,
        maturity: opened.maturity,
        lines: state.lines.clone(),
    })
}

pub fn dump_listing(
    input: &Path,
    ea: &str,
    maturity: Option<&str>,
    config: ExplorerConfig,
) -> Result<ListingReport> {
    let opened = open_view(input, ea, maturity, config)?;
    listing_report(&opened)
}

/// Print the rendered microcode listing with line numbers.
pub fn dump_command(
    input: &Path,
    ea: &str,
    maturity: Option<&str>,
    config: ExplorerConfig,
    json: bool,
) -> Result<()> {
    let report = dump_listing(input, ea, maturity, config)?;
    print_output(&report, json, |report| {
        println!("{}", report.title);
        for (n, line) in report.lines.iter().enumerate() {
            println!("{n:>4}  {line}");
        }
    })
}

/// Resolve a block number or address the way the view's goto prompt does.
pub fn goto_line(
    input: &Path,
    ea: &str,
    maturity: Option<&str>,
    target: &str,
    config: ExplorerConfig,
) -> Result<GotoReport> {
    let mut opened = open_view(input, ea, maturity, config)?;
    let line = opened
        .explorer
        .jump_to_target(&mut opened.host, opened.view, target)
        .ok_or_else(|| anyhow!("No block or address matches '{target}'"))?;
    let text = listing_report(&opened)?.lines.into_iter().nth(line).unwrap_or_default();
    Ok(GotoReport { target: target.to_string(), line, text })
}

pub fn goto_command(
    input: &Path,
    ea: &str,
    maturity: Option<&str>,
    target: &str,
    config: ExplorerConfig,
    json: bool,
) -> Result<()> {
    let report = goto_line(input, ea, maturity, target, config)?;
    print_output(&report, json, |report| {
        println!("{} -> line {}", report.target, report.line);
        println!("{:>4}  {}", report.line, report.text);
    })
}
