//! Terminal helpers shared by the CLI surfaces

pub mod progress;
pub mod styling;

pub use progress::*;
pub use styling::*;
