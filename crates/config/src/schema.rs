use std::{path::PathBuf, time::Duration};

use secrecy::Secret;

/// How Telegram updates are received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BotMode {
    /// Long-polling `getUpdates` loop.
    #[default]
    Polling,
    /// Inbound-webhook HTTP listener.
    Webhook,
}

/// Telegram transport settings.
#[derive(Clone)]
pub struct TelegramSettings {
    /// Bot token from @BotFather.
    pub token: Secret<String>,
    /// Identities permitted to submit files. Empty means nobody.
    pub allowed_user_ids: Vec<String>,
    pub mode: BotMode,
    /// Public URL Telegram posts updates to; required in webhook mode.
    pub webhook_url: Option<String>,
    /// Listen port for the webhook server.
    pub port: u16,
    /// Timeout for one file download from the Bot API.
    pub fetch_timeout: Duration,
}

impl std::fmt::Debug for TelegramSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramSettings")
            .field("token", &"[REDACTED]")
            .field("allowed_user_ids", &self.allowed_user_ids.len())
            .field("mode", &self.mode)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

/// Outbound relay settings.
#[derive(Clone)]
pub struct SmtpSettings {
    pub relay_host: String,
    /// Submission port, 587 unless overridden.
    pub relay_port: u16,
    /// Sender address, also the authentication username.
    pub sender: String,
    pub password: Secret<String>,
    /// The fixed destination mailbox (the PocketBook address).
    pub recipient: String,
    /// Timeout for one SMTP transaction.
    pub timeout: Duration,
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("relay_host", &self.relay_host)
            .field("relay_port", &self.relay_port)
            .field("sender", &self.sender)
            .field("password", &"[REDACTED]")
            .field("recipient", &self.recipient)
            .finish_non_exhaustive()
    }
}

/// Local process settings.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Parent directory for per-run transient download directories.
    pub download_dir: PathBuf,
}

/// Complete service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram: TelegramSettings,
    pub smtp: SmtpSettings,
    pub service: ServiceSettings,
}
