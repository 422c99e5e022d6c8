//! Blocks configured commands from running

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::application::errors::ModError;
use crate::domain::entities::{Command, Message};
use crate::infrastructure::mods::ModManifest;
use crate::mods::trait_def::{HookResult, Mod};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FilterSettings {
    /// Command names to block
    #[serde(default)]
    pub blocked: Vec<String>,
    /// Channels the filter applies to, all when empty
    #[serde(default)]
    pub channels: Vec<String>,
}

pub struct CommandFilter {
    name: String,
    settings: FilterSettings,
}

impl CommandFilter {
    pub fn new(name: impl Into<String>, settings: FilterSettings) -> Self {
        Self {
            name: name.into(),
            settings,
        }
    }

    fn blocks(&self, channel: &str, cmd: &Command) -> bool {
        let in_scope = self.settings.channels.is_empty()
            || self.settings.channels.iter().any(|c| c == channel);

        in_scope && self.settings.blocked.iter().any(|b| cmd.matches(b))
    }
}

#[async_trait]
impl Mod for CommandFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "blocks configured commands"
    }

    async fn on_before_command_execute(&self, msg: &Message, cmd: &Command) -> HookResult<bool> {
        if self.blocks(&msg.channel, cmd) {
            tracing::info!("{} blocked {} in {}", self.name, cmd.name, msg.channel);
            return Ok(false);
        }
        Ok(true)
    }
}

fn build(manifest: &ModManifest) -> Result<Arc<dyn Mod>, ModError> {
    let settings: FilterSettings = manifest.settings()?;
    Ok(Arc::new(CommandFilter::new(manifest.name.clone(), settings)))
}

crate::builtin_mod!("command-filter", "blocks configured commands", build);
