//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Registration configuration.
    pub registration: RegistrationConfig,
    /// Payment gateway configuration.
    pub paystack: PaystackConfig,
    /// SMTP configuration. Absent means mail delivery is disabled.
    #[serde(default)]
    pub smtp: Option<SmtpConfig>,
    /// Admin surface configuration.
    pub admin: AdminConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Registration configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationConfig {
    /// Registration fee in major currency units. The single authoritative
    /// fee value; nothing else in the system hardcodes an amount.
    pub fee: u64,
    /// ISO currency code passed to the gateway.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Conference name used in emails.
    #[serde(default = "default_conference_name")]
    pub conference_name: String,
}

impl RegistrationConfig {
    /// Registration fee in minor currency units, as the gateway expects it.
    #[must_use]
    pub const fn fee_minor_units(&self) -> i64 {
        (self.fee * 100) as i64
    }
}

/// Paystack gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PaystackConfig {
    /// Secret key for server-to-server calls and webhook signatures.
    pub secret_key: String,
    /// Public key exposed to the in-page checkout widget.
    pub public_key: String,
    /// Gateway API base URL. Overridable for tests.
    #[serde(default = "default_paystack_base_url")]
    pub base_url: String,
}

/// SMTP configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    /// SMTP host.
    pub host: String,
    /// SMTP port.
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
    /// From address.
    pub from_address: String,
    /// From display name.
    #[serde(default = "default_conference_name")]
    pub from_name: String,
}

/// Admin surface configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Shared secret for the admin list/verify surface (`x-api-key`).
    pub api_key: String,
    /// Shared secret for the export surface (`x-export-key`).
    pub export_key: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

fn default_currency() -> String {
    "GHS".to_string()
}

fn default_conference_name() -> String {
    "MUN Conference".to_string()
}

fn default_paystack_base_url() -> String {
    "https://api.paystack.co".to_string()
}

const fn default_smtp_port() -> u16 {
    587
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `MUNREG_ENV`)
    /// 3. Environment variables with `MUNREG_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("MUNREG_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("MUNREG")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("MUNREG")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_minor_units() {
        let registration = RegistrationConfig {
            fee: 350,
            currency: default_currency(),
            conference_name: default_conference_name(),
        };

        assert_eq!(registration.fee_minor_units(), 35_000);
    }
}
