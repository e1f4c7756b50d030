//! Terminal chat application support.
//!
//! This module holds the pieces the `webhook-chat` binary is built from:
//!
//! - [`config`]: CLI argument parsing and layered configuration
//! - [`commands`]: Slash command parsing

mod commands;
mod config;

pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{BASE_URL_ENV, ChatArgs, ChatConfig, DEFAULT_BASE_URL};
