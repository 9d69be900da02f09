//! Build a [`Config`] from environment variables.

use std::time::Duration;

use {secrecy::Secret, tracing::warn};

use crate::{
    error::{Error, Result},
    schema::{BotMode, Config, ServiceSettings, SmtpSettings, TelegramSettings},
};

const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_HTTP_PORT: u16 = 8080;
const DEFAULT_DOWNLOAD_DIR: &str = "downloads";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;
const DEFAULT_SMTP_TIMEOUT_SECS: u64 = 30;

/// Load configuration from the process environment.
pub fn from_env() -> Result<Config> {
    from_lookup(|name| std::env::var(name).ok())
}

/// Load configuration through an arbitrary variable lookup.
///
/// The indirection keeps the parsing and validation testable without
/// mutating process-global environment state.
pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config> {
    let mode = match get_or(&lookup, "BOT_MODE", "polling").to_lowercase().as_str() {
        "polling" => BotMode::Polling,
        "webhook" => BotMode::Webhook,
        other => {
            return Err(Error::invalid(
                "BOT_MODE",
                format!("must be either 'polling' or 'webhook', got '{other}'"),
            ));
        },
    };

    let webhook_url = get_opt(&lookup, "WEBHOOK_URL");
    if mode == BotMode::Webhook && webhook_url.is_none() {
        return Err(Error::MissingVar("WEBHOOK_URL"));
    }

    let port = parse_port(&lookup, "PORT", DEFAULT_HTTP_PORT)?;
    let relay_port = parse_port(&lookup, "SMTP_PORT", DEFAULT_SMTP_PORT)?;

    let allowed_user_ids = parse_allowlist(get_opt(&lookup, "ALLOWED_USER_IDS"));
    if allowed_user_ids.is_empty() {
        warn!("ALLOWED_USER_IDS is empty: every submission will be rejected");
    }

    Ok(Config {
        telegram: TelegramSettings {
            token: Secret::new(require(&lookup, "API_TOKEN")?),
            allowed_user_ids,
            mode,
            webhook_url,
            port,
            fetch_timeout: Duration::from_secs(parse_secs(
                &lookup,
                "FETCH_TIMEOUT_SECS",
                DEFAULT_FETCH_TIMEOUT_SECS,
            )?),
        },
        smtp: SmtpSettings {
            relay_host: require(&lookup, "SMTP_SERVER")?,
            relay_port,
            sender: require(&lookup, "EMAIL_ADDRESS")?,
            password: Secret::new(require(&lookup, "EMAIL_PASSWORD")?),
            recipient: require(&lookup, "POCKETBOOK_EMAIL")?,
            timeout: Duration::from_secs(parse_secs(
                &lookup,
                "SMTP_TIMEOUT_SECS",
                DEFAULT_SMTP_TIMEOUT_SECS,
            )?),
        },
        service: ServiceSettings {
            download_dir: get_or(&lookup, "DOWNLOAD_DIR", DEFAULT_DOWNLOAD_DIR).into(),
        },
    })
}

fn get_opt(lookup: &impl Fn(&str) -> Option<String>, name: &'static str) -> Option<String> {
    lookup(name).filter(|value| !value.is_empty())
}

fn get_or(lookup: &impl Fn(&str) -> Option<String>, name: &'static str, default: &str) -> String {
    get_opt(lookup, name).unwrap_or_else(|| default.to_string())
}

fn require(lookup: &impl Fn(&str) -> Option<String>, name: &'static str) -> Result<String> {
    get_opt(lookup, name).ok_or(Error::MissingVar(name))
}

fn parse_port(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: u16,
) -> Result<u16> {
    let Some(raw) = get_opt(lookup, name) else {
        return Ok(default);
    };
    let port: u16 = raw
        .parse()
        .map_err(|_| Error::invalid(name, format!("'{raw}' is not a port number")))?;
    if port == 0 {
        return Err(Error::invalid(name, "must be between 1 and 65535"));
    }
    Ok(port)
}

fn parse_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: u64,
) -> Result<u64> {
    let Some(raw) = get_opt(lookup, name) else {
        return Ok(default);
    };
    let secs: u64 = raw
        .parse()
        .map_err(|_| Error::invalid(name, format!("'{raw}' is not a number of seconds")))?;
    if secs == 0 {
        return Err(Error::invalid(name, "timeout must be non-zero"));
    }
    Ok(secs)
}

fn parse_allowlist(raw: Option<String>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use {secrecy::ExposeSecret, super::*};

    fn base_vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("API_TOKEN", "123:ABC"),
            ("POCKETBOOK_EMAIL", "reader@pbsync.com"),
            ("SMTP_SERVER", "smtp.example.com"),
            ("EMAIL_ADDRESS", "bot@example.com"),
            ("EMAIL_PASSWORD", "hunter2"),
            ("ALLOWED_USER_IDS", "1001, 1002"),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<Config> {
        from_lookup(|name| vars.get(name).map(|v| (*v).to_string()))
    }

    #[test]
    fn minimal_env_uses_defaults() {
        let config = load(&base_vars()).expect("load");
        assert_eq!(config.telegram.mode, BotMode::Polling);
        assert_eq!(config.telegram.port, 8080);
        assert_eq!(config.smtp.relay_port, 587);
        assert_eq!(config.smtp.timeout, Duration::from_secs(30));
        assert_eq!(config.telegram.fetch_timeout, Duration::from_secs(60));
        assert_eq!(config.service.download_dir.to_str(), Some("downloads"));
        assert_eq!(config.telegram.token.expose_secret(), "123:ABC");
        assert_eq!(config.telegram.allowed_user_ids, vec!["1001", "1002"]);
    }

    #[test]
    fn missing_required_var_fails() {
        let mut vars = base_vars();
        vars.remove("EMAIL_PASSWORD");
        assert!(matches!(
            load(&vars),
            Err(Error::MissingVar("EMAIL_PASSWORD"))
        ));
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let mut vars = base_vars();
        vars.insert("SMTP_SERVER", "");
        assert!(matches!(load(&vars), Err(Error::MissingVar("SMTP_SERVER"))));
    }

    #[test]
    fn webhook_mode_requires_url() {
        let mut vars = base_vars();
        vars.insert("BOT_MODE", "webhook");
        assert!(matches!(load(&vars), Err(Error::MissingVar("WEBHOOK_URL"))));

        vars.insert("WEBHOOK_URL", "https://bot.example.com/");
        let config = load(&vars).expect("load");
        assert_eq!(config.telegram.mode, BotMode::Webhook);
        assert_eq!(
            config.telegram.webhook_url.as_deref(),
            Some("https://bot.example.com/")
        );
    }

    #[test]
    fn unknown_bot_mode_is_rejected() {
        let mut vars = base_vars();
        vars.insert("BOT_MODE", "carrier-pigeon");
        assert!(load(&vars).is_err());
    }

    #[test]
    fn bot_mode_is_case_insensitive() {
        let mut vars = base_vars();
        vars.insert("BOT_MODE", "Polling");
        assert!(load(&vars).is_ok());
    }

    #[test]
    fn invalid_port_is_rejected() {
        let mut vars = base_vars();
        vars.insert("PORT", "0");
        assert!(load(&vars).is_err());

        vars.insert("PORT", "70000");
        assert!(load(&vars).is_err());

        vars.insert("PORT", "9090");
        assert_eq!(load(&vars).expect("load").telegram.port, 9090);
    }

    #[test]
    fn allowlist_parsing_trims_and_drops_empties() {
        let mut vars = base_vars();
        vars.insert("ALLOWED_USER_IDS", " 7 ,, 8,");
        let config = load(&vars).expect("load");
        assert_eq!(config.telegram.allowed_user_ids, vec!["7", "8"]);

        vars.remove("ALLOWED_USER_IDS");
        let config = load(&vars).expect("load");
        assert!(config.telegram.allowed_user_ids.is_empty());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = load(&base_vars()).expect("load");
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("123:ABC"));
        assert!(debug.contains("[REDACTED]"));
    }
}
