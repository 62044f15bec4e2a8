//! High-level operations.
//!
//! Resolution, composition and writing, plus the run that chains them.

pub mod compose;
pub mod configure;
pub mod resolve;
pub mod write;

pub use compose::{compose, Fragments};
pub use configure::{configure, configure_selection, plan, ConfigureReport, Plan};
pub use resolve::{resolve, ResolveInputs};
pub use write::{link_aliases, update, Artifact, WriteOutcome};
