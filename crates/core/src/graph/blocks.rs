use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::warn;

use super::{GraphEdge, GraphSource, NodeId};
use crate::listing::render_block_into;
use crate::model::{IrFunction, SharedIr};

/// Live control-flow view of a function: node `N` is block `N`.
///
/// Nothing is cached. Every request reads the function as it is now, so a
/// refresh after the host changed the blocks shows the new shape. The source
/// holds only a weak reference; once the function is gone it reports itself
/// dead and the owning session invalidates the view.
pub struct BlockGraphSource {
    ir: Weak<RefCell<dyn IrFunction>>,
}

impl BlockGraphSource {
    pub fn new(ir: &SharedIr) -> Self {
        Self { ir: Rc::downgrade(ir) }
    }

    fn with_ir<R>(&self, read: impl FnOnce(&dyn IrFunction) -> R) -> Option<R> {
        let ir = self.ir.upgrade()?;
        let guard = match ir.try_borrow() {
            Ok(guard) => guard,
            Err(_) => {
                warn!("microcode is being modified; skipping block graph request");
                return None;
            }
        };
        Some(read(&*guard))
    }
}

impl GraphSource for BlockGraphSource {
    fn is_live(&self) -> bool {
        self.ir.strong_count() > 0
    }

    fn node_count(&self) -> usize {
        self.with_ir(|ir| ir.block_count()).unwrap_or(0)
    }

    fn edges_of(&self, node: NodeId, out: &mut Vec<GraphEdge>) {
        self.with_ir(|ir| {
            let Some(block) = ir.block(node) else {
                return;
            };
            let count = ir.block_count();
            for (slot, &dst) in block.successors.iter().enumerate() {
                if dst < count {
                    out.push(GraphEdge::new(node, dst, slot));
                } else {
                    warn!("block {node} names missing successor {dst} ({count} blocks); edge dropped");
                }
            }
        });
    }

    fn write_node_text(&self, node: NodeId, buf: &mut String) -> bool {
        match self.with_ir(|ir| render_block_into(ir, node, buf)) {
            Some(found) => found,
            None => {
                buf.clear();
                false
            }
        }
    }
}
