//! Domain entities - Core business objects with no external dependencies

pub mod user;
pub mod message;
pub mod command;
pub mod channel;
pub mod poll;

pub use user::User;
pub use message::{Message, Content};
pub use command::{Command, CommandRegistry, CommandResult};
pub use channel::Channel;
pub use poll::{Poll, PollData, DEFAULT_POLL_SECONDS};
