//! preflight - build-preflight configurator for a multi-library native tree
//!
//! Reads the environment once, picks one of four configuration modes,
//! resolves library paths through an override cascade, and writes a
//! `defines.mk` fragment plus a config header for the makefiles to include.

pub mod core;
pub mod ops;
pub mod sources;
pub mod util;

/// Test utilities and mocks for preflight unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides canned process execution and archive
/// retrieval.
#[cfg(test)]
pub mod test_support;

pub use core::{ConfigMode, ConfigureError, Environment, ResolvedConfig, Selection};
pub use ops::{configure, ConfigureReport};
pub use util::Settings;
