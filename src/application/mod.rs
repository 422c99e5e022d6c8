//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Services: Command execution around the mod hooks
//! - Commands: Chat command handlers
//! - Errors: Domain-specific errors
//! - Messaging: Message parsing and dispatching

pub mod commands;
pub mod errors;
pub mod services;
pub mod messaging;
