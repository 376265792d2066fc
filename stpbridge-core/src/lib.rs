//! Core types for the STP bridge
//!
//! This crate provides the shared error type, address and identifier types,
//! the static switch configuration, and the [`Link`] trait that separates the
//! switch from raw link I/O.

pub mod config;
pub mod error;
pub mod link;
pub mod types;

// Re-export commonly used types
pub use config::{PortConfig, PortKind, SwitchConfig};
pub use error::{Error, Result};
pub use link::Link;
pub use types::*;
