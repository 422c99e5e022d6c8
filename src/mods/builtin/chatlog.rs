//! Logs chat traffic seen by the bot

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::application::errors::ModError;
use crate::domain::entities::{Channel, Command, Message};
use crate::infrastructure::mods::ModManifest;
use crate::mods::trait_def::{HookResult, Mod};

pub struct ChatLog {
    name: String,
}

impl ChatLog {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Mod for ChatLog {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "logs chat messages, whispers and commands"
    }

    async fn on_connected(&self) -> HookResult {
        info!(target: "chatlog", "connected");
        Ok(())
    }

    async fn on_privmsg_sent(&self, msg: &str, channel: &str, sender: &str) -> HookResult {
        info!(target: "chatlog", "[{}] {}: {}", channel, sender, msg);
        Ok(())
    }

    async fn on_privmsg_received(&self, msg: &Message) -> HookResult {
        info!(target: "chatlog", "[{}] {}: {}", msg.channel, msg.author, msg.raw);
        Ok(())
    }

    async fn on_whisper_sent(&self, msg: &str, receiver: &str, sender: &str) -> HookResult {
        info!(target: "chatlog", "whisper {} -> {}: {}", sender, receiver, msg);
        Ok(())
    }

    async fn on_whisper_received(&self, msg: &Message) -> HookResult {
        info!(target: "chatlog", "whisper from {}: {}", msg.author, msg.raw);
        Ok(())
    }

    async fn on_after_command_execute(&self, msg: &Message, cmd: &Command) -> HookResult {
        info!(target: "chatlog", "[{}] {} ran {}", msg.channel, msg.author, cmd.name);
        Ok(())
    }

    async fn on_bits_donated(&self, msg: &Message, bits: u32) -> HookResult {
        info!(target: "chatlog", "[{}] {} cheered {} bits", msg.channel, msg.author, bits);
        Ok(())
    }

    async fn on_channel_joined(&self, channel: &Channel) -> HookResult {
        info!(target: "chatlog", "joined {}", channel.name);
        Ok(())
    }
}

fn build(manifest: &ModManifest) -> Result<Arc<dyn Mod>, ModError> {
    Ok(Arc::new(ChatLog::new(manifest.name.clone())))
}

crate::builtin_mod!("chatlog", "logs chat traffic", build);
