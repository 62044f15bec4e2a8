//! Shared utilities

pub mod config;
pub mod diagnostic;
pub mod fs;
pub mod process;

pub use config::{Layout, Settings};
pub use diagnostic::Diagnostic;
pub use process::{CommandRunner, ProcessBuilder, SystemRunner};
