use log::debug;

use super::{GraphEdge, GraphSource, NodeId};
use crate::model::{Instruction, Operand};

/// Expression tree of one instruction, flattened into nodes and edges.
///
/// Owns copies of all node text; it does not refer back to the function it
/// was built from and is never mutated after [`ExpressionGraphBuilder::build`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpressionGraph {
    texts: Vec<String>,
    edges: Vec<GraphEdge>,
}

impl ExpressionGraph {
    pub fn node_texts(&self) -> &[String] {
        &self.texts
    }

    pub fn node_text(&self, node: NodeId) -> Option<&str> {
        self.texts.get(node).map(String::as_str)
    }

    /// Edges in the order the traversal produced them.
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

impl GraphSource for ExpressionGraph {
    fn node_count(&self) -> usize {
        self.texts.len()
    }

    fn edges_of(&self, node: NodeId, out: &mut Vec<GraphEdge>) {
        out.extend(self.edges.iter().filter(|e| e.src == node));
    }

    fn write_node_text(&self, node: NodeId, buf: &mut String) -> bool {
        buf.clear();
        match self.texts.get(node) {
            Some(text) => {
                buf.push_str(text);
                true
            }
            None => false,
        }
    }

    fn for_each_edge(&self, visit: &mut dyn FnMut(GraphEdge)) {
        for edge in &self.edges {
            visit(*edge);
        }
    }
}

/// Depth-first, pre-order walk of an instruction's operand tree.
///
/// The root instruction is node 0. Every non-empty operand becomes a node
/// with an edge from its parent, tagged with its slot:
/// - `l`, `r`, `d` use slots 0, 1, 2
/// - call arguments use their list position
/// - pair halves use 0 (low) and 1 (high)
/// - an address-of target uses 0
///
/// A nested-instruction operand additionally points (slot 0) at the root node
/// of the nested instruction, the only node kind with two inbound edges.
#[derive(Debug, Default)]
pub struct ExpressionGraphBuilder {
    graph: ExpressionGraph,
}

impl ExpressionGraphBuilder {
    pub fn build(root: &Instruction) -> ExpressionGraph {
        let mut builder = Self::default();
        builder.insert_instruction(root);
        debug!(
            "built expression graph for {:X}: {} nodes, {} edges",
            root.ea,
            builder.graph.texts.len(),
            builder.graph.edges.len()
        );
        builder.graph
    }

    fn next_node(&mut self, text: String) -> NodeId {
        self.graph.texts.push(text);
        self.graph.texts.len() - 1
    }

    fn add_edge(&mut self, src: Option<NodeId>, dst: Option<NodeId>, slot: usize) {
        if let (Some(src), Some(dst)) = (src, dst) {
            self.graph.edges.push(GraphEdge::new(src, dst, slot));
        }
    }

    fn insert_instruction(&mut self, insn: &Instruction) -> NodeId {
        let node = self.next_node(insn.to_string());
        for (slot, op) in insn.operands().into_iter().enumerate() {
            self.insert_operand(op, Some(node), slot);
        }
        node
    }

    fn insert_operand(&mut self, op: &Operand, parent: Option<NodeId>, slot: usize) -> Option<NodeId> {
        if op.is_empty() {
            return None;
        }
        let node = self.next_node(op.to_string());
        self.add_edge(parent, Some(node), slot);

        match op {
            Operand::Nested { insn } => {
                let nested = self.insert_instruction(insn);
                self.add_edge(Some(node), Some(nested), 0);
            }
            Operand::Args { args } => {
                for (i, arg) in args.iter().enumerate() {
                    self.insert_operand(arg, Some(node), i);
                }
            }
            Operand::Pair { low, high } => {
                self.insert_operand(low, Some(node), 0);
                self.insert_operand(high, Some(node), 1);
            }
            Operand::AddressOf { target } => {
                self.insert_operand(target, Some(node), 0);
            }
            _ => {}
        }
        Some(node)
    }
}
