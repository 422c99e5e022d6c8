//! Chat command handlers

pub mod polls;

pub use polls::register_poll_commands;
