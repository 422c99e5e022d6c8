//! Mod system
//!
//! Mods observe bot lifecycle events through the hooks on [`Mod`]. A
//! [`ModRegistry`] owns the registered mods and dispatches events to them.

pub mod builtin;
pub mod registry;
pub mod trait_def;

pub use registry::{EventOutcome, ModRegistry};
pub use trait_def::{Event, HookResult, Mod};
