use chrono::{DateTime, Utc};

/// A chat channel the bot has joined
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub name: String,
    pub joined_at: DateTime<Utc>,
}

impl Channel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            joined_at: Utc::now(),
        }
    }
}
