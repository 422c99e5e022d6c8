use async_trait::async_trait;
use crate::domain::entities::Channel;
use crate::application::errors::BotError;

/// Bot trait - abstraction for chat platform adapters
#[async_trait]
pub trait Bot: Send + Sync {
    /// Connect and begin listening for messages
    async fn start(&self) -> Result<(), BotError>;

    /// Join a channel
    async fn join_channel(&self, channel: &str) -> Result<Channel, BotError>;

    /// Send a message to a channel, returning the platform message id
    async fn send_message(&self, channel: &str, text: &str) -> Result<String, BotError>;

    /// Send a private message to a user
    async fn send_whisper(&self, user: &str, text: &str) -> Result<(), BotError>;

    /// Get bot info
    fn bot_info(&self) -> BotInfo;
}

/// Bot information
#[derive(Debug, Clone)]
pub struct BotInfo {
    pub id: String,
    pub name: String,
    pub username: String,
}
