//! Keyboard and context-menu dispatch for microcode text views.

use log::debug;

use super::text_view::TextViewSession;
use crate::config::KeyBindings;
use crate::host::{Host, Key};

/// What a text view can be asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Prompt for a block number or address and jump there.
    Goto,
    InstructionGraph,
    BlockGraph,
    /// Jump to the block referenced at the cursor (Enter, double-click).
    JumpToCursor,
}

impl Command {
    /// Map an unshifted key press to a command.
    pub fn from_key(key: Key, shift: bool, keys: &KeyBindings) -> Option<Command> {
        if shift {
            return None;
        }
        match key {
            Key::Enter => Some(Command::JumpToCursor),
            Key::Char(c) if c.eq_ignore_ascii_case(&keys.goto) => Some(Command::Goto),
            Key::Char(c) if c.eq_ignore_ascii_case(&keys.insn_graph) => {
                Some(Command::InstructionGraph)
            }
            Key::Char(c) if c.eq_ignore_ascii_case(&keys.block_graph) => Some(Command::BlockGraph),
            _ => None,
        }
    }
}

/// Context-menu entry offered for a text view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupAction {
    pub label: &'static str,
    pub hotkey: char,
    pub command: Command,
}

/// Entries for the view's context menu. Both graph entries need the
/// microcode; the instruction graph also needs an instruction under the cursor.
pub fn popup_actions(session: &TextViewSession, keys: &KeyBindings) -> Vec<PopupAction> {
    let mut actions = Vec::new();
    if !session.has_live_ir() {
        return actions;
    }
    actions.push(PopupAction {
        label: "Show Microcode Graph",
        hotkey: keys.block_graph,
        command: Command::BlockGraph,
    });
    if session.resolve_instruction_at_cursor().is_some() {
        actions.push(PopupAction {
            label: "Show Microinstruction Graph",
            hotkey: keys.insn_graph,
            command: Command::InstructionGraph,
        });
    }
    actions
}

/// Run `command` against `session`. Returns whether the command was handled.
pub fn execute(session: &mut TextViewSession, command: Command, host: &mut dyn Host) -> bool {
    match command {
        Command::Goto => {
            let Some(token) = host.ask_str("Go to block number or address...") else {
                return false;
            };
            if let Some(line) = session.jump_to_target(&token, &*host) {
                host.jump(session.view(), line);
            }
            true
        }
        Command::InstructionGraph => session.spawn_instruction_graph(host).is_some(),
        Command::BlockGraph => session.spawn_block_graph(host).is_some(),
        Command::JumpToCursor => {
            match session.jump_to_cursor() {
                Some(line) => host.jump(session.view(), line),
                None => debug!("{}: no block reference at the cursor", session.title()),
            }
            true
        }
    }
}
