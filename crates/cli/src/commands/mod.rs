pub mod graphs;
pub mod info;
pub mod listing;
pub mod util;

pub use graphs::*;
pub use info::*;
pub use listing::*;
pub use util::*;
