//! Mod loading
//!
//! Mods are compiled in and discovered through their factories. The mods
//! directory holds one YAML manifest per mod instance to enable.

pub mod loader;
pub mod manifest;

pub use loader::{instantiate, load_builtin_mods, ModLoader};
pub use manifest::ModManifest;
