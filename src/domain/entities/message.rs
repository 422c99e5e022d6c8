use super::User;
use chrono::{DateTime, Utc};

/// Message content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Command { name: String, args: Vec<String> },
    Whisper(String),
}

impl Content {
    pub fn text(&self) -> Option<&str> {
        match self {
            Content::Text(s) | Content::Whisper(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_command(&self) -> bool {
        matches!(self, Content::Command { .. })
    }

    pub fn is_whisper(&self) -> bool {
        matches!(self, Content::Whisper(_))
    }
}

/// An incoming chat message or whisper
#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    pub channel: String,
    pub author: User,
    pub content: Content,
    pub raw: String,
    /// Bits cheered in this message, if any
    pub bits: Option<u32>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(channel: impl Into<String>, author: User, content: Content) -> Self {
        let raw = match &content {
            Content::Text(s) | Content::Whisper(s) => s.clone(),
            Content::Command { name, args } if args.is_empty() => name.clone(),
            Content::Command { name, args } => format!("{} {}", name, args.join(" ")),
        };

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            channel: channel.into(),
            author,
            content,
            raw,
            bits: None,
            timestamp: Utc::now(),
        }
    }

    pub fn from_text(channel: impl Into<String>, author: User, text: impl Into<String>) -> Self {
        Self::new(channel, author, Content::Text(text.into()))
    }

    pub fn from_command(
        channel: impl Into<String>,
        author: User,
        name: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        Self::new(channel, author, Content::Command { name: name.into(), args })
    }

    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = raw.into();
        self
    }

    pub fn with_bits(mut self, bits: u32) -> Self {
        self.bits = Some(bits);
        self
    }

    /// Mention of the author, for replies
    pub fn mention(&self) -> String {
        self.author.mention()
    }

    /// Command arguments, empty for non-command messages
    pub fn args(&self) -> &[String] {
        match &self.content {
            Content::Command { args, .. } => args,
            _ => &[],
        }
    }
}
