//! Environment-driven configuration for bookferry.
//!
//! All settings come from environment variables (a `.env` file is loaded by
//! the CLI before this crate runs). Required values that are missing or
//! malformed fail startup, so the pipeline never receives events with a
//! broken configuration.

pub mod error;
pub mod loader;
pub mod schema;

pub use {
    error::{Error, Result},
    loader::{from_env, from_lookup},
    schema::{BotMode, Config, ServiceSettings, SmtpSettings, TelegramSettings},
};
