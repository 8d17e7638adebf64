use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

use crate::template::MissingKeyPolicy;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub client: ClientSettings,
    #[serde(default)]
    pub mail: MailSettings,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub otel: OtelConfig,
}

/// Which delivery client to build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientKind {
    #[default]
    Console,
    Transport,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientSettings {
    #[serde(default)]
    pub kind: ClientKind,
    /// Capture messages instead of printing them (console client only)
    #[serde(default)]
    pub trap: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MailSettings {
    /// Default sender address
    pub from: Option<String>,
    /// Path to a layout template wrapping every body via {{body}}
    pub layout_path: Option<String>,
    #[serde(default)]
    pub missing_keys: MissingKeyPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Filter used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtelConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_otel_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_service_name() -> String {
    "campaign-dispatch".to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            // Start with default values
            .set_default("client.kind", "console")?
            .set_default("client.trap", false)?
            .set_default("mail.missing_keys", "empty")?
            .set_default("log.level", "info")?
            .set_default("otel.enabled", false)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // CAMPAIGN__CLIENT__TRAP, CAMPAIGN__MAIL__FROM, CAMPAIGN__OTEL__ENABLED, etc.
            .add_source(
                Environment::with_prefix("CAMPAIGN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Read the configured layout template, if any
    pub fn load_layout(&self) -> std::io::Result<Option<String>> {
        self.mail
            .layout_path
            .as_deref()
            .map(std::fs::read_to_string)
            .transpose()
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_otel_endpoint(),
            service_name: default_service_name(),
            sampling_ratio: default_sampling_ratio(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let settings = Settings::default();
        assert_eq!(settings.client.kind, ClientKind::Console);
        assert!(!settings.client.trap);
        assert_eq!(settings.mail.missing_keys, MissingKeyPolicy::Empty);
        assert_eq!(settings.log.level, "info");
        assert!(!settings.otel.enabled);
        assert_eq!(settings.otel.service_name, "campaign-dispatch");
    }

    #[test]
    fn test_deserialize_partial() {
        let settings: Settings = Config::builder()
            .set_override("client.kind", "transport")
            .unwrap()
            .set_override("client.trap", true)
            .unwrap()
            .set_override("mail.from", "noreply@example.com")
            .unwrap()
            .set_override("mail.missing_keys", "strict")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.client.kind, ClientKind::Transport);
        assert!(settings.client.trap);
        assert_eq!(settings.mail.from.as_deref(), Some("noreply@example.com"));
        assert_eq!(settings.mail.missing_keys, MissingKeyPolicy::Strict);
        assert_eq!(settings.otel.endpoint, "http://localhost:4317");
    }

    #[test]
    fn test_no_layout_configured() {
        let settings = Settings::default();
        assert_eq!(settings.load_layout().unwrap(), None);
    }
}
