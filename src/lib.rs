//! modbot - a chat bot core with poll commands and a mod (plugin) system
//!
//! Layers follow the usual split:
//! - `domain`: entities and the traits infrastructure implements
//! - `application`: command handling, message dispatch, errors
//! - `infrastructure`: config, storage, mod loading, adapters
//! - `mods`: the mod trait, registry and builtin mods

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod mods;
