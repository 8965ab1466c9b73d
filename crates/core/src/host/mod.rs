//! Interfaces to the host application's UI services.
//!
//! The core never talks to widgets directly. It asks a [`Host`] to open views,
//! move cursors, prompt the user, and resolve addresses, and it receives
//! [`UiEvent`]s back. [`HeadlessHost`] is an in-memory implementation used by
//! the CLI and tests.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::graph::GraphCallback;
use crate::listing::TextLine;
use crate::model::Address;

mod headless;

pub use headless::{HeadlessHost, RenderedGraph, TextViewState};

/// Host-assigned identity of an open view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ViewId(pub u64);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("Host could not create view '{0}'")]
    ViewCreation(String),
}

/// Keys the core reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
}

/// Events the host delivers for a text view.
///
/// `WidgetDestroyed` is the last event the host sends for a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    Key { view: ViewId, key: Key, shift: bool },
    DoubleClick { view: ViewId },
    CursorMoved { view: ViewId, line: usize, column: usize },
    WidgetDestroyed { view: ViewId },
}

impl UiEvent {
    pub fn view(&self) -> ViewId {
        match self {
            UiEvent::Key { view, .. }
            | UiEvent::DoubleClick { view }
            | UiEvent::CursorMoved { view, .. }
            | UiEvent::WidgetDestroyed { view } => *view,
        }
    }
}

/// Request to open an interactive graph view driven by `callback`.
pub struct GraphViewRequest {
    pub callback: Box<dyn GraphCallback>,
}

/// Address lookups the host performs on the core's behalf.
pub trait AddressSpace {
    /// Resolve a user token (hex number or symbol name) to an address.
    fn resolve_address(&self, token: &str) -> Option<Address>;
    /// Whether `ea` lies in mapped program memory.
    fn is_mapped(&self, ea: Address) -> bool;
}

/// UI services the core consumes.
pub trait Host: AddressSpace {
    /// Whether a view with exactly this title is open.
    fn find_view(&self, title: &str) -> bool;
    /// Open a text view backed by `lines`; line `n` of the view is `lines[n]`.
    fn open_text_view(&mut self, title: &str, lines: &[TextLine]) -> Result<ViewId, HostError>;
    fn open_graph_view(&mut self, request: GraphViewRequest) -> Result<ViewId, HostError>;
    /// Move the current line of a text view.
    fn jump(&mut self, view: ViewId, line: usize);
    /// Free-form single-line prompt. `None` when cancelled.
    fn ask_str(&mut self, prompt: &str) -> Option<String>;
    /// Blocking error notification.
    fn notify_error(&mut self, message: &str);
}

/// Parse a hex address token, with or without a `0x` prefix.
pub fn parse_hex_address(token: &str) -> Option<Address> {
    let token = token.trim();
    let digits = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")).unwrap_or(token);
    if digits.is_empty() {
        return None;
    }
    Address::from_str_radix(digits, 16).ok()
}
