//! Mod trait and event definitions

use async_trait::async_trait;

use crate::application::errors::ModError;
use crate::domain::entities::{Channel, Command, Message};

/// Result of a mod hook
pub type HookResult<T = ()> = Result<T, ModError>;

/// A unit of optional behaviour hooked into bot lifecycle events.
///
/// Every hook defaults to a no-op, so a mod only implements the events it
/// cares about. Errors returned from hooks are logged by the registry and
/// never reach the caller.
#[async_trait]
pub trait Mod: Send + Sync {
    /// Unique name of the mod
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn can_register(&self) -> bool {
        true
    }

    fn can_unregister(&self) -> bool {
        true
    }

    /// Called once the mod has been added to a registry
    fn register(&self) {}

    /// Called once the mod has been removed from a registry
    fn unregister(&self) {}

    /// The bot connected and joined its configured channels
    async fn on_connected(&self) -> HookResult {
        Ok(())
    }

    async fn on_privmsg_sent(&self, _msg: &str, _channel: &str, _sender: &str) -> HookResult {
        Ok(())
    }

    /// A chat message arrived. Not triggered for commands.
    async fn on_privmsg_received(&self, _msg: &Message) -> HookResult {
        Ok(())
    }

    async fn on_whisper_sent(&self, _msg: &str, _receiver: &str, _sender: &str) -> HookResult {
        Ok(())
    }

    async fn on_whisper_received(&self, _msg: &Message) -> HookResult {
        Ok(())
    }

    /// Returning `false` stops the command from executing
    async fn on_before_command_execute(&self, _msg: &Message, _cmd: &Command) -> HookResult<bool> {
        Ok(true)
    }

    async fn on_after_command_execute(&self, _msg: &Message, _cmd: &Command) -> HookResult {
        Ok(())
    }

    async fn on_bits_donated(&self, _msg: &Message, _bits: u32) -> HookResult {
        Ok(())
    }

    async fn on_channel_joined(&self, _channel: &Channel) -> HookResult {
        Ok(())
    }
}

/// Lifecycle events, one variant per hook on [`Mod`]
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    Connected,
    PrivmsgSent { msg: &'a str, channel: &'a str, sender: &'a str },
    PrivmsgReceived(&'a Message),
    WhisperSent { msg: &'a str, receiver: &'a str, sender: &'a str },
    WhisperReceived(&'a Message),
    BeforeCommandExecute { msg: &'a Message, cmd: &'a Command },
    AfterCommandExecute { msg: &'a Message, cmd: &'a Command },
    BitsDonated { msg: &'a Message, bits: u32 },
    ChannelJoined(&'a Channel),
}

impl<'a> Event<'a> {
    /// Name of the hook this event triggers
    pub fn hook_name(&self) -> &'static str {
        match self {
            Event::Connected => "on_connected",
            Event::PrivmsgSent { .. } => "on_privmsg_sent",
            Event::PrivmsgReceived(_) => "on_privmsg_received",
            Event::WhisperSent { .. } => "on_whisper_sent",
            Event::WhisperReceived(_) => "on_whisper_received",
            Event::BeforeCommandExecute { .. } => "on_before_command_execute",
            Event::AfterCommandExecute { .. } => "on_after_command_execute",
            Event::BitsDonated { .. } => "on_bits_donated",
            Event::ChannelJoined(_) => "on_channel_joined",
        }
    }

    /// Invoke the matching hook on `target`. `Ok(false)` only comes from a
    /// before-command hook that vetoed the command.
    pub(crate) async fn fire(self, target: &dyn Mod) -> HookResult<bool> {
        match self {
            Event::Connected => target.on_connected().await?,
            Event::PrivmsgSent { msg, channel, sender } => {
                target.on_privmsg_sent(msg, channel, sender).await?
            }
            Event::PrivmsgReceived(msg) => target.on_privmsg_received(msg).await?,
            Event::WhisperSent { msg, receiver, sender } => {
                target.on_whisper_sent(msg, receiver, sender).await?
            }
            Event::WhisperReceived(msg) => target.on_whisper_received(msg).await?,
            Event::BeforeCommandExecute { msg, cmd } => {
                return target.on_before_command_execute(msg, cmd).await;
            }
            Event::AfterCommandExecute { msg, cmd } => {
                target.on_after_command_execute(msg, cmd).await?
            }
            Event::BitsDonated { msg, bits } => target.on_bits_donated(msg, bits).await?,
            Event::ChannelJoined(channel) => target.on_channel_joined(channel).await?,
        }
        Ok(true)
    }
}
