//! Display module for emitting check results as JSON.
pub mod report;
pub use report::*;
