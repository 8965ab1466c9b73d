//! microcode-explorer-core
//!
//! Core library for exploring decompiler microcode: a navigable text listing
//! of a function plus two graph views over it, the control-flow graph of its
//! blocks and the expression tree of a single instruction.
//!
//! All substantive logic lives here so it is fully testable without a real
//! host; the host's UI services are reached through the traits in [`host`].

pub mod config;
pub mod graph;
pub mod host;
pub mod listing;
pub mod model;
pub mod services;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
