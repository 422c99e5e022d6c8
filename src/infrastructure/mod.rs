//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Storage: Poll storage
//! - Mods: Mod manifests and loading
//! - Adapters: Platform integrations (console)

pub mod config;
pub mod storage;
pub mod mods;
pub mod adapters;
