//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Mod error: {0}")]
    Mod(#[from] ModError),

    #[error("Adapter error: {0}")]
    Adapter(String),
}

/// Command execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Command not found: {0}")]
    NotFound(String),

    /// Bad user input. Surfaced to the user by the dispatcher.
    #[error("Invalid arguments: {reason}")]
    InvalidArgs {
        reason: String,
        command: Option<String>,
    },

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

impl CommandError {
    /// Invalid arguments attributed to a command
    pub fn invalid_args(command: &str, reason: impl Into<String>) -> Self {
        CommandError::InvalidArgs {
            reason: reason.into(),
            command: Some(command.to_string()),
        }
    }

    /// Invalid arguments without an owning command
    pub fn invalid_value(reason: impl Into<String>) -> Self {
        CommandError::InvalidArgs {
            reason: reason.into(),
            command: None,
        }
    }
}

impl From<StorageError> for CommandError {
    fn from(e: StorageError) -> Self {
        CommandError::ExecutionFailed(e.to_string())
    }
}

/// Mod errors. Hook failures are contained by the registry and only logged.
#[derive(Error, Debug)]
pub enum ModError {
    #[error("hook failed: {0}")]
    Hook(String),

    #[error("hook panicked: {0}")]
    Panicked(String),

    #[error("invalid manifest {path}: {reason}")]
    Manifest { path: String, reason: String },

    #[error("unknown mod factory: {0}")]
    UnknownFactory(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ModError {
    /// Short error kind used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            ModError::Hook(_) => "Hook",
            ModError::Panicked(_) => "Panicked",
            ModError::Manifest { .. } => "Manifest",
            ModError::UnknownFactory(_) => "UnknownFactory",
            ModError::Io(_) => "Io",
        }
    }
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Lock poisoned: {0}")]
    Lock(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
