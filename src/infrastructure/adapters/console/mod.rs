//! Console adapter for development/testing

use async_trait::async_trait;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

use crate::application::errors::BotError;
use crate::domain::entities::Channel;
use crate::domain::traits::{Bot, BotInfo};

/// Console bot adapter for local development. Reads chat lines from stdin
/// and prints everything the bot sends.
pub struct ConsoleAdapter {
    info: BotInfo,
    input: Mutex<Lines<BufReader<Stdin>>>,
}

impl ConsoleAdapter {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            info: BotInfo {
                id: "console".to_string(),
                username: name.clone(),
                name,
            },
            input: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    pub fn prompt(&self) {
        print!("> ");
        let _ = std::io::stdout().flush();
    }

    /// Next line from stdin, `None` at end of input. Cancel safe.
    pub async fn read_line(&self) -> Option<String> {
        let mut input = self.input.lock().await;
        match input.next_line().await {
            Ok(line) => line.map(|l| l.trim().to_string()),
            Err(e) => {
                tracing::warn!("Failed to read from stdin: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl Bot for ConsoleAdapter {
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Starting console bot (dev mode)");
        Ok(())
    }

    async fn join_channel(&self, channel: &str) -> Result<Channel, BotError> {
        println!("[BOT] joined {}", channel);
        Ok(Channel::new(channel))
    }

    async fn send_message(&self, channel: &str, text: &str) -> Result<String, BotError> {
        println!("[BOT] [{}] {}", channel, text);
        Ok(uuid::Uuid::new_v4().to_string())
    }

    async fn send_whisper(&self, user: &str, text: &str) -> Result<(), BotError> {
        println!("[BOT -> {}] {}", user, text);
        Ok(())
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}
