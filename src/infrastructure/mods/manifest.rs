//! Mod manifest definition

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::application::errors::ModError;

/// A mod manifest, one YAML file per mod in the mods directory
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ModManifest {
    /// Registry name of the mod (required)
    pub name: String,

    /// Builtin factory to instantiate, defaults to `name`
    #[serde(default)]
    pub factory: Option<String>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub description: Option<String>,

    /// Factory-specific settings
    #[serde(default)]
    pub config: serde_yaml::Value,
}

fn default_enabled() -> bool {
    true
}

impl ModManifest {
    /// Manifest for a builtin enabled straight from the bot config
    pub fn for_builtin(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            factory: None,
            enabled: true,
            description: None,
            config: serde_yaml::Value::Null,
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ModError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        Self::parse(&content).map_err(|reason| ModError::Manifest {
            path: path.display().to_string(),
            reason,
        })
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        let manifest: Self = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
        if manifest.name.trim().is_empty() {
            return Err("mod name must not be empty".to_string());
        }
        Ok(manifest)
    }

    pub fn factory_name(&self) -> &str {
        self.factory.as_deref().unwrap_or(&self.name)
    }

    /// Deserialize the `config` section, falling back to defaults when absent
    pub fn settings<T>(&self) -> Result<T, ModError>
    where
        T: serde::de::DeserializeOwned + Default,
    {
        if self.config.is_null() {
            return Ok(T::default());
        }
        serde_yaml::from_value(self.config.clone()).map_err(|e| ModError::Manifest {
            path: self.name.clone(),
            reason: format!("invalid config: {}", e),
        })
    }
}
