//! Message dispatcher - routes chat input to commands and mod events

use chrono::Utc;
use std::sync::Arc;

use crate::application::errors::{BotError, CommandError};
use crate::application::services::CommandService;
use crate::domain::entities::{Channel, Content, Message, Poll, User};
use crate::domain::traits::{Bot, PollStore};
use crate::mods::{Event, ModRegistry};
use super::parser::MessageParser;

/// Wires a bot adapter, the command service and the mod registry together
pub struct MessageDispatcher<B: Bot> {
    bot: B,
    parser: MessageParser,
    commands: CommandService,
    mods: Arc<ModRegistry>,
    polls: Arc<dyn PollStore>,
}

impl<B: Bot> MessageDispatcher<B> {
    pub fn new(bot: B, commands: CommandService, mods: Arc<ModRegistry>, polls: Arc<dyn PollStore>) -> Self {
        Self {
            bot,
            parser: MessageParser::new(commands.prefix()),
            commands,
            mods,
            polls,
        }
    }

    pub fn bot(&self) -> &B {
        &self.bot
    }

    pub fn mods(&self) -> &ModRegistry {
        &self.mods
    }

    /// Start the bot, join `channels` and fire the connection events
    pub async fn connect(&self, channels: &[String]) -> Result<Vec<Channel>, BotError> {
        self.bot.start().await?;

        let mut joined = Vec::with_capacity(channels.len());
        for name in channels {
            let channel = self.bot.join_channel(name).await?;
            self.mods.dispatch_event(Event::ChannelJoined(&channel)).await;
            joined.push(channel);
        }

        self.mods.dispatch_event(Event::Connected).await;
        tracing::info!("Connected as {}, joined {} channel(s)", self.bot.bot_info().username, joined.len());
        Ok(joined)
    }

    /// Handle a line of chat. Returns the reply sent back, if any.
    pub async fn handle_message(&self, channel: &str, author: User, text: &str) -> Result<Option<String>, BotError> {
        let msg = self.parser.parse(channel, author, text);

        if let Some(bits) = msg.bits {
            self.mods.dispatch_event(Event::BitsDonated { msg: &msg, bits }).await;
        }

        let command_name = match &msg.content {
            Content::Command { name, .. } if self.commands.find(name).is_some() => Some(name.clone()),
            _ => None,
        };

        let Some(name) = command_name else {
            self.mods.dispatch_event(Event::PrivmsgReceived(&msg)).await;
            return Ok(None);
        };

        let reply = match self.commands.execute(&msg, &self.mods).await {
            Ok(reply) => reply,
            Err(CommandError::InvalidArgs { reason, command }) => {
                Some(self.invalid_args_reply(&msg, &reason, command.as_deref().unwrap_or(&name)))
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(text) = &reply {
            self.say(&msg.channel, text).await?;
        }
        Ok(reply)
    }

    /// Handle a whisper sent to the bot
    pub async fn handle_whisper(&self, author: User, text: &str) -> Result<(), BotError> {
        let msg = self.parser.parse_whisper(author, text);
        self.mods.dispatch_event(Event::WhisperReceived(&msg)).await;
        Ok(())
    }

    /// Send a message to a channel and notify mods
    pub async fn say(&self, channel: &str, text: &str) -> Result<(), BotError> {
        self.bot.send_message(channel, text).await?;

        let sender = self.bot.bot_info().username;
        self.mods.dispatch_event(Event::PrivmsgSent { msg: text, channel, sender: &sender }).await;
        Ok(())
    }

    /// Whisper a user and notify mods
    pub async fn whisper(&self, user: &str, text: &str) -> Result<(), BotError> {
        self.bot.send_whisper(user, text).await?;

        let sender = self.bot.bot_info().username;
        self.mods.dispatch_event(Event::WhisperSent { msg: text, receiver: user, sender: &sender }).await;
        Ok(())
    }

    /// Close polls past their deadline and announce the results in their
    /// channels. Closed polls are gone from the store, so a failed
    /// announcement is logged and the rest are still sent.
    pub async fn announce_finished_polls(&self) -> Result<Vec<Poll>, BotError> {
        let finished = self.polls.close_expired(Utc::now())?;
        for poll in &finished {
            if let Err(e) = self.say(&poll.channel, &poll.summary()).await {
                tracing::warn!(poll_id = poll.id, channel = %poll.channel, "Failed to announce poll results: {}", e);
            }
        }
        Ok(finished)
    }

    fn invalid_args_reply(&self, msg: &Message, reason: &str, command: &str) -> String {
        match self.commands.syntax(command) {
            Some(syntax) => format!("{} {} - syntax: {}", msg.mention(), reason, syntax),
            None => format!("{} {}", msg.mention(), reason),
        }
    }
}
