//! Graph construction for instruction expression trees and block control flow.
//!
//! Both graphs are exposed to the host through the pull-based [`GraphSource`]
//! trait and bridged to the host's refresh/node-text protocol by
//! [`GraphSession`].

mod blocks;
mod expr;
mod session;

pub use blocks::BlockGraphSource;
pub use expr::{ExpressionGraph, ExpressionGraphBuilder};
pub use session::{GraphCallback, GraphResponse, GraphSession, InteractiveGraph};

/// Dense node id: every graph numbers its nodes `0..node_count()`.
pub type NodeId = usize;

/// Directed edge. `slot` is the operand/argument position, used for colouring only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct GraphEdge {
    pub src: NodeId,
    pub dst: NodeId,
    pub slot: usize,
}

impl GraphEdge {
    pub fn new(src: NodeId, dst: NodeId, slot: usize) -> Self {
        Self { src, dst, slot }
    }
}

/// Something a graph view can be populated from on demand.
pub trait GraphSource {
    /// Whether the underlying data can still be read. Snapshots are always live.
    fn is_live(&self) -> bool {
        true
    }

    fn node_count(&self) -> usize;

    /// Append the outgoing edges of `node` to `out`.
    fn edges_of(&self, node: NodeId, out: &mut Vec<GraphEdge>);

    /// Replace `buf` with the display text of `node`. `false` if there is no such node.
    fn write_node_text(&self, node: NodeId, buf: &mut String) -> bool;

    /// Visit every edge. Sources with a natural edge order override this.
    fn for_each_edge(&self, visit: &mut dyn FnMut(GraphEdge)) {
        let mut edges = Vec::new();
        for node in 0..self.node_count() {
            edges.clear();
            self.edges_of(node, &mut edges);
            for edge in &edges {
                visit(*edge);
            }
        }
    }
}
