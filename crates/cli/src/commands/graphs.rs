use std::path::Path;

use anyhow::{anyhow, bail, Result};
use mcx_core::config::ExplorerConfig;
use mcx_core::graph::GraphEdge;
use mcx_core::host::{RenderedGraph, UiEvent};
use mcx_core::model::print::strip_color_tags;
use mcx_core::services::Command;
use serde::Serialize;

use crate::commands::{open_view, print_output, OpenView};

#[derive(Debug, Serialize)]
pub struct GraphNodeInfo {
    pub id: usize,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct GraphReport {
    pub title: String,
    pub viewer_name: String,
    pub nodes: Vec<GraphNodeInfo>,
    pub edges: Vec<GraphEdge>,
}

impl From<RenderedGraph> for GraphReport {
    fn from(graph: RenderedGraph) -> Self {
        let nodes = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(id, text)| GraphNodeInfo { id, text: strip_color_tags(text) })
            .collect();
        Self { title: graph.title, viewer_name: graph.viewer_name, nodes, edges: graph.edges }
    }
}

/// Run a graph command against the open view and render the graph it opened.
fn spawn_and_render(opened: &mut OpenView, command: Command) -> Result<GraphReport> {
    if !opened.explorer.run_command(&mut opened.host, opened.view, command) {
        bail!("No graph available for {command:?} at {:X}", opened.ea);
    }
    let graph = opened
        .host
        .graph_views()
        .last()
        .copied()
        .ok_or_else(|| anyhow!("Host reported no graph view"))?;
    let rendered = opened
        .host
        .render_graph(graph)
        .ok_or_else(|| anyhow!("Graph {graph} was invalidated before it could be drawn"))?;
    Ok(rendered.into())
}

pub fn instruction_graph(
    input: &Path,
    ea: &str,
    maturity: Option<&str>,
    line: usize,
    config: ExplorerConfig,
) -> Result<GraphReport> {
    let mut opened = open_view(input, ea, maturity, config)?;
    let view = opened.view;
    opened.explorer.handle_event(&mut opened.host, UiEvent::CursorMoved { view, line, column: 0 });
    if opened.explorer.with_session(view, |s| s.resolve_instruction_at_cursor()).flatten().is_none() {
        bail!("No microinstruction on listing line {line}");
    }
    spawn_and_render(&mut opened, Command::InstructionGraph)
}

pub fn block_graph(
    input: &Path,
    ea: &str,
    maturity: Option<&str>,
    config: ExplorerConfig,
) -> Result<GraphReport> {
    let mut opened = open_view(input, ea, maturity, config)?;
    spawn_and_render(&mut opened, Command::BlockGraph)
}

fn print_graph(report: &GraphReport) {
    println!("{}", report.title);
    println!("Nodes ({}):", report.nodes.len());
    for node in &report.nodes {
        let mut lines = node.text.lines();
        println!("  [{}] {}", node.id, lines.next().unwrap_or_default());
        for rest in lines {
            println!("      {rest}");
        }
    }
    println!("Edges ({}):", report.edges.len());
    for edge in &report.edges {
        println!("  {} -> {} (slot {})", edge.src, edge.dst, edge.slot);
    }
}

/// Print the expression graph of the instruction on listing line `line`.
pub fn insn_graph_command(
    input: &Path,
    ea: &str,
    maturity: Option<&str>,
    line: usize,
    config: ExplorerConfig,
    json: bool,
) -> Result<()> {
    let report = instruction_graph(input, ea, maturity, line, config)?;
    print_output(&report, json, print_graph)
}

/// Print the block graph of the function.
pub fn block_graph_command(
    input: &Path,
    ea: &str,
    maturity: Option<&str>,
    config: ExplorerConfig,
    json: bool,
) -> Result<()> {
    let report = block_graph(input, ea, maturity, config)?;
    print_output(&report, json, print_graph)
}
