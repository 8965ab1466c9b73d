use log::{debug, warn};

use crate::graph::{
    BlockGraphSource, ExpressionGraph, ExpressionGraphBuilder, GraphCallback, GraphSession,
};
use crate::host::{AddressSpace, GraphViewRequest, Host, ViewId};
use crate::listing::{block_reference_at, Listing};
use crate::model::{Address, Instruction, SharedIr};

/// Possibly-retained reference to the host's microcode.
///
/// Whether a view may dereference the function is decided when the view is
/// created. Views opened without retaining it, or whose function the host has
/// since invalidated, decline every operation that needs it.
#[derive(Clone, Default)]
pub struct IrRef {
    shared: Option<SharedIr>,
    can_deref: bool,
}

impl IrRef {
    pub fn retained(ir: SharedIr) -> Self {
        Self { shared: Some(ir), can_deref: true }
    }

    pub fn detached() -> Self {
        Self::default()
    }

    pub fn can_deref(&self) -> bool {
        self.can_deref
    }

    pub fn get(&self) -> Option<&SharedIr> {
        if self.can_deref {
            self.shared.as_ref()
        } else {
            None
        }
    }

    /// Drop the reference after the host invalidated the function.
    pub fn invalidate(&mut self) {
        self.shared = None;
        self.can_deref = false;
    }
}

/// Cursor position within a text view, in tag-free columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub line: usize,
    pub column: usize,
}

/// Instruction a listing line refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsnLocation {
    pub block: usize,
    pub serial: usize,
    pub ea: Address,
}

/// State behind one open microcode text view.
pub struct TextViewSession {
    view: ViewId,
    title: String,
    name: String,
    entry_ea: Address,
    listing: Listing,
    ir: IrRef,
    cursor: Cursor,
}

impl TextViewSession {
    pub fn new(
        view: ViewId,
        title: impl Into<String>,
        name: impl Into<String>,
        entry_ea: Address,
        listing: Listing,
        ir: IrRef,
    ) -> Self {
        Self {
            view,
            title: title.into(),
            name: name.into(),
            entry_ea,
            listing,
            ir,
            cursor: Cursor::default(),
        }
    }

    pub fn view(&self) -> ViewId {
        self.view
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry_ea(&self) -> Address {
        self.entry_ea
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn ir(&self) -> &IrRef {
        &self.ir
    }

    pub fn has_live_ir(&self) -> bool {
        self.ir.get().is_some()
    }

    pub fn invalidate_ir(&mut self) {
        self.ir.invalidate();
    }

    pub fn set_cursor(&mut self, line: usize, column: usize) {
        self.cursor = Cursor { line, column };
    }

    fn move_to(&mut self, line: usize) -> usize {
        self.cursor = Cursor { line, column: 0 };
        line
    }

    /// Jump to the block referenced under the cursor (`@N`, or the digits at
    /// the cursor). Returns the new line, or `None` if nothing resolved.
    pub fn jump_to_cursor(&mut self) -> Option<usize> {
        let line = self.listing.line(self.cursor.line)?;
        let block = block_reference_at(line.plain(), self.cursor.column)?;
        let Some(target) = self.listing.index().line_for_block(block) else {
            debug!("{}: block {block} is not in the listing", self.title);
            return None;
        };
        Some(self.move_to(target))
    }

    /// Jump to a user-entered block number or address.
    ///
    /// A token that resolves to a mapped, listed address wins; otherwise the
    /// token is read as a decimal block number.
    pub fn jump_to_target<S>(&mut self, token: &str, space: &S) -> Option<usize>
    where
        S: AddressSpace + ?Sized,
    {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        let index = self.listing.index();
        let by_address = space
            .resolve_address(token)
            .filter(|&ea| space.is_mapped(ea))
            .and_then(|ea| index.line_for_address(ea));
        let target = by_address
            .or_else(|| token.parse::<usize>().ok().and_then(|b| index.line_for_block(b)));
        match target {
            Some(line) => Some(self.move_to(line)),
            None => {
                debug!("{}: nothing to jump to for '{token}'", self.title);
                None
            }
        }
    }

    fn with_instruction_at_cursor<R>(
        &self,
        read: impl FnOnce(InsnLocation, &Instruction) -> R,
    ) -> Option<R> {
        let marker = self.listing.line(self.cursor.line)?.tag().block?;
        let ir = self.ir.get()?;
        let guard = ir.try_borrow().ok()?;
        let insn = guard.block(marker.block)?.instruction(marker.serial)?;
        let loc = InsnLocation { block: marker.block, serial: marker.serial, ea: insn.ea };
        Some(read(loc, insn))
    }

    /// The instruction named by the `<block>.<serial>` marker on the cursor line.
    ///
    /// `None` without a marker, without a live function, or when the block or
    /// serial is out of range.
    pub fn resolve_instruction_at_cursor(&self) -> Option<InsnLocation> {
        self.with_instruction_at_cursor(|loc, _| loc)
    }

    pub fn build_instruction_graph(&self) -> Option<(InsnLocation, ExpressionGraph)> {
        self.with_instruction_at_cursor(|loc, insn| (loc, ExpressionGraphBuilder::build(insn)))
    }

    /// Open the expression graph of the instruction under the cursor.
    pub fn spawn_instruction_graph(&self, host: &mut dyn Host) -> Option<ViewId> {
        let Some((loc, graph)) = self.build_instruction_graph() else {
            debug!("{}: no instruction under the cursor", self.title);
            return None;
        };
        let title =
            format!("Microinstruction Graph - {:X}[{}]/{:X}", self.entry_ea, self.name, loc.ea);
        let viewer = format!("microins_{:X}_{}_{:X}", self.entry_ea, self.name, loc.ea);
        let callback: Box<dyn GraphCallback> = Box::new(GraphSession::new(title, viewer, graph));
        host.open_graph_view(GraphViewRequest { callback })
            .map_err(|e| warn!("{}: {e}", self.title))
            .ok()
    }

    /// Open the block graph of the whole function.
    pub fn spawn_block_graph(&self, host: &mut dyn Host) -> Option<ViewId> {
        let Some(ir) = self.ir.get() else {
            debug!("{}: microcode not retained; block graph unavailable", self.title);
            return None;
        };
        let title = format!("Microcode Graph - {:X}[{}]", self.entry_ea, self.name);
        let viewer = format!("microblkgraph_{:X}_{}", self.entry_ea, self.name);
        let source = BlockGraphSource::new(ir);
        let callback: Box<dyn GraphCallback> = Box::new(GraphSession::new(title, viewer, source));
        host.open_graph_view(GraphViewRequest { callback })
            .map_err(|e| warn!("{}: {e}", self.title))
            .ok()
    }
}
