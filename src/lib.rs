//! Attribute-driven compliance check for a shared VPC network.
//!
//! Attribute values (the VPC name and its subnet list) come from an injected
//! [`data::AttributeStore`]. Controls are lists of titled assertions; a
//! [`profile::Profile`] runs them and reports pass, fail or errored per
//! assertion.

pub mod config;
pub mod controls;
pub mod data;
pub mod display;
pub mod domain;
pub mod error;
pub mod profile;

pub use error::{ConfigError, ResolutionError};
