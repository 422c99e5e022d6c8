//! Builtin mods
//!
//! Builtin mods register a factory with the `builtin_mod!` macro. The mod
//! loader looks factories up by name when a manifest or the bot config
//! enables them.

pub mod chatlog;
pub mod command_filter;

use std::sync::Arc;

use crate::application::errors::ModError;
use crate::infrastructure::mods::ModManifest;
use super::trait_def::Mod;

/// Factory for a builtin mod
pub struct ModFactory {
    pub name: &'static str,
    pub description: &'static str,
    pub build: fn(&ModManifest) -> Result<Arc<dyn Mod>, ModError>,
}

inventory::collect!(ModFactory);

/// Register a builtin mod factory
#[macro_export]
macro_rules! builtin_mod {
    ($name:expr, $description:expr, $build:expr) => {
        ::inventory::submit!($crate::mods::builtin::ModFactory {
            name: $name,
            description: $description,
            build: $build,
        });
    };
}

/// All builtin factories, sorted by name
pub fn factories() -> Vec<&'static ModFactory> {
    let mut all: Vec<&'static ModFactory> = inventory::iter::<ModFactory>().collect();
    all.sort_by_key(|f| f.name);
    all
}

pub fn find_factory(name: &str) -> Option<&'static ModFactory> {
    inventory::iter::<ModFactory>().find(|f| f.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_factories_are_discovered() {
        let names: Vec<&str> = factories().iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["chatlog", "command-filter"]);
        assert!(find_factory("chatlog").is_some());
        assert!(find_factory("missing").is_none());
    }
}
