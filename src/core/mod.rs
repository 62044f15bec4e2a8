//! Core data structures for preflight.
//!
//! This module contains the types every run passes around:
//! - The environment snapshot and the selected mode
//! - The key schema and its override policy
//! - Host platform facts
//! - The resolved configuration and the error type

pub mod environment;
pub mod error;
pub mod mode;
pub mod platform;
pub mod resolved;
pub mod schema;

pub use environment::Environment;
pub use error::ConfigureError;
pub use mode::{select_mode, ConfigMode, Selection};
pub use platform::{OsKind, Platform};
pub use resolved::{Origin, ResolvedConfig, Setting};
pub use schema::OverrideKind;
