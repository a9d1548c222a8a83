//! Control definitions.
pub mod vpc;
pub use vpc::*;
