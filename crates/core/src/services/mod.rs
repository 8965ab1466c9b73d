//! View-level behaviour: text-view sessions, keyboard/menu navigation,
//! session lifecycle, and the explorer entry points that tie them together.

pub mod explorer;
pub mod lifecycle;
pub mod navigation;
pub mod text_view;

pub use explorer::{Explorer, ExplorerError};
pub use lifecycle::{SessionRegistry, SharedRegistry, ViewHandle};
pub use navigation::{Command, PopupAction};
pub use text_view::{Cursor, InsnLocation, IrRef, TextViewSession};
