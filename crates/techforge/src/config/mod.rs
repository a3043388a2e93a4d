use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::notifications::MailSettings;

const MEMORY_STORE: &str = ":memory:";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub storage: StorageConfig,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            storage: StorageConfig::from_env(),
            mail: MailConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where inquiries are persisted. `None` keeps them in process memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    fn from_env() -> Self {
        let raw =
            env::var("INQUIRY_STORE_PATH").unwrap_or_else(|_| "data/inquiries.json".to_string());
        let trimmed = raw.trim();
        let path = if trimmed.is_empty() || trimmed == MEMORY_STORE {
            None
        } else {
            Some(PathBuf::from(trimmed))
        };
        Self { path }
    }
}

/// Outbound mail transport and the addresses used in composed messages.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub transport: MailTransportKind,
    pub settings: MailSettings,
}

impl MailConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let transport = match env::var("MAIL_TRANSPORT")
            .unwrap_or_else(|_| "log".to_string())
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "log" | "console" => MailTransportKind::Log,
            "smtp" => MailTransportKind::Smtp(SmtpConfig::from_env()?),
            other => return Err(ConfigError::InvalidMailTransport(other.to_string())),
        };

        let settings = MailSettings {
            from_address: env::var("DEFAULT_FROM_EMAIL")
                .unwrap_or_else(|_| "webmaster@localhost".to_string()),
            staff_address: optional_var("CONTACT_EMAIL"),
            reply_to: optional_var("REPLY_TO_EMAIL"),
            organization_name: env::var("ORGANIZATION_NAME")
                .unwrap_or_else(|_| "Techforge Technologies".to_string()),
            sender_name: env::var("MAIL_SENDER_NAME")
                .unwrap_or_else(|_| "Techforge Team".to_string()),
        };

        Ok(Self {
            transport,
            settings,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailTransportKind {
    /// Writes rendered messages to the log instead of delivering them.
    Log,
    Smtp(SmtpConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub security: SmtpSecurity,
}

impl SmtpConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let host = optional_var("SMTP_HOST").ok_or(ConfigError::MissingSmtpHost)?;
        let port = optional_var("SMTP_PORT")
            .map(|raw| raw.parse::<u16>().map_err(|_| ConfigError::InvalidSmtpPort))
            .transpose()?;
        let security = match optional_var("SMTP_SECURITY")
            .unwrap_or_else(|| "starttls".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "tls" | "ssl" => SmtpSecurity::Tls,
            "starttls" => SmtpSecurity::StartTls,
            "none" | "plain" => SmtpSecurity::None,
            other => return Err(ConfigError::InvalidSmtpSecurity(other.to_string())),
        };

        Ok(Self {
            host,
            port,
            username: optional_var("SMTP_USERNAME"),
            password: optional_var("SMTP_PASSWORD"),
            security,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpSecurity {
    Tls,
    StartTls,
    None,
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidMailTransport(String),
    MissingSmtpHost,
    InvalidSmtpPort,
    InvalidSmtpSecurity(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidMailTransport(value) => {
                write!(f, "MAIL_TRANSPORT must be 'log' or 'smtp', got '{value}'")
            }
            ConfigError::MissingSmtpHost => {
                write!(f, "SMTP_HOST is required when MAIL_TRANSPORT=smtp")
            }
            ConfigError::InvalidSmtpPort => write!(f, "SMTP_PORT must be a valid u16"),
            ConfigError::InvalidSmtpSecurity(value) => write!(
                f,
                "SMTP_SECURITY must be one of 'tls', 'starttls', 'none', got '{value}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
