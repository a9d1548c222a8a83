//! Domain model: attribute value objects, assertions and controls.

pub mod assertion;
pub mod attributes;
pub mod control;
pub mod types;

pub use assertion::*;
pub use attributes::*;
pub use control::*;
pub use types::*;
