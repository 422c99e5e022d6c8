//! Domain layer - Core business objects and the abstractions the
//! infrastructure implements
//!
//! This layer contains:
//! - Entities: Messages, users, commands, polls
//! - Traits: Abstractions for infrastructure (Bot, PollStore)

pub mod entities;
pub mod traits;
