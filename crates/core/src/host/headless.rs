use std::collections::{BTreeMap, VecDeque};

use log::{debug, info};
use serde::Serialize;

use super::{parse_hex_address, AddressSpace, GraphViewRequest, Host, HostError, UiEvent, ViewId};
use crate::graph::{GraphCallback, GraphEdge, GraphResponse, InteractiveGraph};
use crate::listing::TextLine;
use crate::model::{Address, Program};

/// What the headless host remembers about an open text view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextViewState {
    pub title: String,
    /// Tag-free text of each line, as displayed.
    pub lines: Vec<String>,
    pub current_line: usize,
}

impl TextViewState {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

struct GraphViewState {
    token: u64,
    callback: Box<dyn GraphCallback>,
}

/// A graph as the host would draw it after a refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedGraph {
    pub title: String,
    pub viewer_name: String,
    pub token: u64,
    pub nodes: Vec<String>,
    pub edges: Vec<GraphEdge>,
}

#[derive(Default)]
struct Recorder {
    node_count: usize,
    edges: Vec<GraphEdge>,
}

impl InteractiveGraph for Recorder {
    fn resize(&mut self, node_count: usize) {
        self.node_count = node_count;
        self.edges.clear();
    }

    fn add_edge(&mut self, edge: GraphEdge) {
        self.edges.push(edge);
    }
}

/// In-memory host: keeps view state in maps and answers prompts from a queue.
#[derive(Default)]
pub struct HeadlessHost {
    next_view: u64,
    next_token: u64,
    text_views: BTreeMap<ViewId, TextViewState>,
    graph_views: BTreeMap<ViewId, GraphViewState>,
    errors: Vec<String>,
    answers: VecDeque<String>,
    segments: Vec<(Address, Address)>,
    symbols: BTreeMap<String, Address>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host whose mapped memory and symbols come from a program fixture.
    pub fn for_program(program: &Program) -> Self {
        let mut host = Self::new();
        for seg in &program.segments {
            host.segments.push((seg.start, seg.end));
        }
        host.symbols = program.symbols.clone();
        host
    }

    pub fn with_segment(mut self, start: Address, end: Address) -> Self {
        self.segments.push((start, end));
        self
    }

    pub fn with_symbol(mut self, name: impl Into<String>, ea: Address) -> Self {
        self.symbols.insert(name.into(), ea);
        self
    }

    /// Queue an answer for the next [`Host::ask_str`] call.
    pub fn queue_answer(&mut self, answer: impl Into<String>) {
        self.answers.push_back(answer.into());
    }

    pub fn text_view(&self, view: ViewId) -> Option<&TextViewState> {
        self.text_views.get(&view)
    }

    pub fn text_view_count(&self) -> usize {
        self.text_views.len()
    }

    pub fn graph_views(&self) -> Vec<ViewId> {
        self.graph_views.keys().copied().collect()
    }

    pub fn graph_title(&self, view: ViewId) -> Option<&str> {
        self.graph_views.get(&view).map(|g| g.callback.title())
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Refresh a graph view and fetch every node's text, as the host does
    /// before drawing. An invalidated graph view is closed.
    pub fn render_graph(&mut self, view: ViewId) -> Option<RenderedGraph> {
        let state = self.graph_views.get_mut(&view)?;
        let mut recorder = Recorder::default();
        if state.callback.refresh(&mut recorder) == GraphResponse::Invalidated {
            info!("closing invalidated graph {view}");
            self.graph_views.remove(&view);
            return None;
        }
        let nodes = (0..recorder.node_count)
            .map(|n| state.callback.node_text(n).unwrap_or_default().to_string())
            .collect();
        Some(RenderedGraph {
            title: state.callback.title().to_string(),
            viewer_name: state.callback.viewer_name().to_string(),
            token: state.token,
            nodes,
            edges: recorder.edges,
        })
    }

    /// Close a view. Returns the destroy notification to deliver to the core.
    pub fn close_view(&mut self, view: ViewId) -> Option<UiEvent> {
        let closed =
            self.text_views.remove(&view).is_some() || self.graph_views.remove(&view).is_some();
        closed.then_some(UiEvent::WidgetDestroyed { view })
    }

    fn allocate_view(&mut self) -> ViewId {
        self.next_view += 1;
        ViewId(self.next_view)
    }
}

impl AddressSpace for HeadlessHost {
    fn resolve_address(&self, token: &str) -> Option<Address> {
        let token = token.trim();
        self.symbols.get(token).copied().or_else(|| parse_hex_address(token))
    }

    fn is_mapped(&self, ea: Address) -> bool {
        self.segments.iter().any(|&(start, end)| ea >= start && ea < end)
    }
}

impl Host for HeadlessHost {
    fn find_view(&self, title: &str) -> bool {
        self.text_views.values().any(|v| v.title == title)
            || self.graph_views.values().any(|g| g.callback.title() == title)
    }

    fn open_text_view(&mut self, title: &str, lines: &[TextLine]) -> Result<ViewId, HostError> {
        if title.is_empty() {
            return Err(HostError::ViewCreation(title.to_string()));
        }
        let view = self.allocate_view();
        let lines: Vec<String> = lines.iter().map(|l| l.plain().to_string()).collect();
        debug!("opened text view {view} '{title}' ({} lines)", lines.len());
        self.text_views
            .insert(view, TextViewState { title: title.to_string(), lines, current_line: 0 });
        Ok(view)
    }

    fn open_graph_view(&mut self, request: GraphViewRequest) -> Result<ViewId, HostError> {
        let view = self.allocate_view();
        self.next_token += 1;
        debug!("opened graph view {view} '{}'", request.callback.title());
        self.graph_views
            .insert(view, GraphViewState { token: self.next_token, callback: request.callback });
        Ok(view)
    }

    fn jump(&mut self, view: ViewId, line: usize) {
        if let Some(state) = self.text_views.get_mut(&view) {
            state.current_line = line.min(state.line_count().saturating_sub(1));
        }
    }

    fn ask_str(&mut self, _prompt: &str) -> Option<String> {
        self.answers.pop_front()
    }

    fn notify_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}
