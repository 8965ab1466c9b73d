use std::collections::BTreeMap;

use log::trace;

use super::{LineTag, TextLine};
use crate::model::Address;

/// Block-number and address lookups into a listing.
///
/// The first line carrying a key owns it. Later lines with the same block or
/// address (repeated comments, wrapped instructions) never shadow it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineIndex {
    block_to_line: BTreeMap<usize, usize>,
    addr_to_line: BTreeMap<Address, usize>,
}

impl LineIndex {
    pub fn build(lines: &[TextLine]) -> Self {
        let mut index = Self::default();
        for (n, line) in lines.iter().enumerate() {
            index.record(n, line.tag());
        }
        index
    }

    /// Record the markers of line `n`. Comment-line block markers are ignored.
    pub fn record(&mut self, n: usize, tag: &LineTag) {
        if let Some(marker) = tag.block.filter(|m| !m.is_comment) {
            self.block_to_line.entry(marker.block).or_insert(n);
        }
        if let Some(ea) = tag.address {
            if self.addr_to_line.contains_key(&ea) {
                trace!("address {ea:X} already indexed; ignoring line {n}");
            }
            self.addr_to_line.entry(ea).or_insert(n);
        }
    }

    pub fn line_for_block(&self, block: usize) -> Option<usize> {
        self.block_to_line.get(&block).copied()
    }

    pub fn line_for_address(&self, ea: Address) -> Option<usize> {
        self.addr_to_line.get(&ea).copied()
    }

    pub fn block_count(&self) -> usize {
        self.block_to_line.len()
    }

    pub fn address_count(&self) -> usize {
        self.addr_to_line.len()
    }
}
