//! Mod loader - instantiates builtin mods from manifests in the mods directory

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::errors::ModError;
use crate::mods::builtin::find_factory;
use crate::mods::{Mod, ModRegistry};
use super::manifest::ModManifest;

/// Loads mod manifests from a directory and registers the mods they name
pub struct ModLoader {
    mods_dir: PathBuf,
}

impl ModLoader {
    pub fn new(mods_dir: impl Into<PathBuf>) -> Self {
        Self {
            mods_dir: mods_dir.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.mods_dir
    }

    /// Create the mods directory if it is missing. Returns true if it was created.
    pub fn ensure_directory_exists(&self) -> Result<bool, ModError> {
        if self.mods_dir.is_dir() {
            return Ok(false);
        }

        std::fs::create_dir_all(&self.mods_dir)?;
        tracing::info!("Created mods directory: {}", self.mods_dir.display());
        Ok(true)
    }

    /// Manifest files in the mods directory, sorted by file name
    pub fn manifest_paths(&self) -> Result<Vec<PathBuf>, ModError> {
        let mut paths = Vec::new();

        for entry in std::fs::read_dir(&self.mods_dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }

            // Skip hidden files
            let hidden = path.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with('.'))
                .unwrap_or(true);
            if hidden {
                continue;
            }

            let is_yaml = path.extension()
                .and_then(|e| e.to_str())
                .map(|e| e == "yaml" || e == "yml")
                .unwrap_or(false);
            if is_yaml {
                paths.push(path);
            }
        }

        paths.sort();
        Ok(paths)
    }

    /// Register every enabled mod described in the mods directory.
    ///
    /// A manifest that cannot be read, parsed or instantiated aborts the
    /// pass. Mods registered before the failure stay registered.
    pub fn load_from_directory(&self, registry: &ModRegistry) -> Result<Vec<String>, ModError> {
        tracing::info!("Loading mods from: {}", self.mods_dir.display());

        if !self.mods_dir.exists() {
            tracing::warn!("Mods directory does not exist: {}", self.mods_dir.display());
            return Ok(Vec::new());
        }

        let mut loaded = Vec::new();
        for path in self.manifest_paths()? {
            let manifest = ModManifest::from_file(&path)?;

            if !manifest.enabled {
                tracing::debug!("Skipping disabled mod: {}", manifest.name);
                continue;
            }

            if register(&manifest, registry)? {
                loaded.push(manifest.name);
            }
        }

        Ok(loaded)
    }
}

/// Register the named builtin mods with default manifests
pub fn load_builtin_mods(names: &[String], registry: &ModRegistry) -> Result<Vec<String>, ModError> {
    let mut loaded = Vec::new();
    for name in names {
        let manifest = ModManifest::for_builtin(name);
        if register(&manifest, registry)? {
            loaded.push(manifest.name);
        }
    }
    Ok(loaded)
}

/// Build the mod a manifest describes
pub fn instantiate(manifest: &ModManifest) -> Result<Arc<dyn Mod>, ModError> {
    let factory = find_factory(manifest.factory_name())
        .ok_or_else(|| ModError::UnknownFactory(manifest.factory_name().to_string()))?;
    (factory.build)(manifest)
}

fn register(manifest: &ModManifest, registry: &ModRegistry) -> Result<bool, ModError> {
    let instance = instantiate(manifest)?;
    if registry.register(instance) {
        Ok(true)
    } else {
        tracing::warn!("Mod '{}' was not registered (duplicate name or refused)", manifest.name);
        Ok(false)
    }
}
