//! Message parser - Parses raw chat lines into structured messages

use crate::domain::entities::{Content, Message, User};

/// Parses incoming text into Message objects
pub struct MessageParser {
    command_prefix: String,
}

impl MessageParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    /// Parse a channel message
    pub fn parse(&self, channel: impl Into<String>, author: User, text: impl Into<String>) -> Message {
        let text = text.into();
        let channel = channel.into();

        let message = match self.parse_command(&text) {
            Some(content) => Message::new(channel, author, content),
            None => Message::from_text(channel, author, text.clone()),
        };

        let message = message.with_raw(text.as_str());
        match count_bits(&text) {
            0 => message,
            bits => message.with_bits(bits),
        }
    }

    /// Parse a whisper. Whispers are never treated as commands.
    pub fn parse_whisper(&self, author: User, text: impl Into<String>) -> Message {
        let channel = author.id.clone();
        Message::new(channel, author, Content::Whisper(text.into()))
    }

    fn parse_command(&self, text: &str) -> Option<Content> {
        let cmd_text = text.strip_prefix(self.command_prefix.as_str())?;

        // Split command and arguments
        let mut parts = cmd_text.split_whitespace();
        let name = parts.next()?.to_string();
        if cmd_text.starts_with(char::is_whitespace) {
            return None;
        }
        let args = parts.map(|s| s.to_string()).collect();

        Some(Content::Command { name, args })
    }
}

/// Total bits from cheer tokens such as `cheer100`
fn count_bits(text: &str) -> u32 {
    text.split_whitespace()
        .filter_map(|word| {
            let lower = word.to_ascii_lowercase();
            let amount = lower.strip_prefix("cheer")?;
            if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            amount.parse::<u32>().ok()
        })
        .fold(0u32, |total, bits| total.saturating_add(bits))
}
