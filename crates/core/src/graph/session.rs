use log::{debug, warn};

use super::{GraphEdge, GraphSource, NodeId};

/// The host's node/edge table for one graph view.
///
/// The host sizes its table by node count, which is why every graph numbers
/// its nodes densely from zero.
pub trait InteractiveGraph {
    fn resize(&mut self, node_count: usize);
    fn add_edge(&mut self, edge: GraphEdge);
}

/// Outcome of a refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphResponse {
    Handled,
    /// The data behind the view is gone. The graph was emptied and the host
    /// should close the view.
    Invalidated,
}

/// Object-safe callback contract a host graph view is driven through.
pub trait GraphCallback {
    fn title(&self) -> &str;
    fn viewer_name(&self) -> &str;
    fn refresh(&mut self, graph: &mut dyn InteractiveGraph) -> GraphResponse;
    fn node_text(&mut self, node: NodeId) -> Option<&str>;
}

/// Owns a graph source and answers host requests for it.
///
/// Node text is written into one session-scoped buffer that is reused across
/// requests; the returned slice is valid until the next request.
pub struct GraphSession<S> {
    title: String,
    viewer_name: String,
    source: S,
    text_buf: String,
}

impl<S: GraphSource> GraphSession<S> {
    pub fn new(title: impl Into<String>, viewer_name: impl Into<String>, source: S) -> Self {
        Self {
            title: title.into(),
            viewer_name: viewer_name.into(),
            source,
            text_buf: String::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: GraphSource> GraphCallback for GraphSession<S> {
    fn title(&self) -> &str {
        &self.title
    }

    fn viewer_name(&self) -> &str {
        &self.viewer_name
    }

    fn refresh(&mut self, graph: &mut dyn InteractiveGraph) -> GraphResponse {
        if !self.source.is_live() {
            warn!("{}: microcode no longer available; invalidating graph", self.title);
            graph.resize(0);
            return GraphResponse::Invalidated;
        }
        let count = self.source.node_count();
        graph.resize(count);
        let mut edges = 0usize;
        self.source.for_each_edge(&mut |edge| {
            graph.add_edge(edge);
            edges += 1;
        });
        debug!("{}: refreshed {count} nodes, {edges} edges", self.title);
        GraphResponse::Handled
    }

    fn node_text(&mut self, node: NodeId) -> Option<&str> {
        if self.source.write_node_text(node, &mut self.text_buf) {
            Some(&self.text_buf)
        } else {
            None
        }
    }
}
