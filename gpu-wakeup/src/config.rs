//! Configuration for the GPU wakeup gateway.

use std::fmt;
use std::path::Path;

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use gpu_wakeup_common::{PushIdentity, DEFAULT_CHANNEL, DEFAULT_MAX_BODY_CHARS};
use serde::{Deserialize, Deserializer};

/// Main configuration structure, built once at startup and never mutated.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub instances: InstancesConfig,
    #[serde(default)]
    pub commands: CommandsConfig,
    /// Push webhook target. Without it notifications are only logged.
    #[serde(default)]
    pub push: Option<PushConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Shared-secret gate settings.
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    /// Value the `pass` query parameter must equal.
    pub secret: String,
    /// Paths that still get a 401 on a bad secret but never trigger a notification.
    ///
    /// Accepts a list, or a comma-separated string as set through the environment.
    #[serde(default = "default_quiet_paths", deserialize_with = "list_or_csv")]
    pub quiet_paths: Vec<String>,
    /// Header set by the reverse proxy with the real client address.
    #[serde(default = "default_client_ip_header")]
    pub client_ip_header: String,
}

impl AuthConfig {
    pub fn accepts(&self, pass: Option<&str>) -> bool {
        pass == Some(self.secret.as_str())
    }

    pub fn is_quiet(&self, path: &str) -> bool {
        self.quiet_paths.iter().any(|p| p == path)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrCsv {
    List(Vec<String>),
    Csv(String),
}

fn list_or_csv<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match ListOrCsv::deserialize(deserializer)? {
        ListOrCsv::List(items) => items,
        ListOrCsv::Csv(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"[REDACTED]")
            .field("quiet_paths", &self.quiet_paths)
            .field("client_ip_header", &self.client_ip_header)
            .finish()
    }
}

/// Addressable GPU containers.
#[derive(Debug, Clone, Deserialize)]
pub struct InstancesConfig {
    /// First instance number (inclusive).
    #[serde(default = "default_from")]
    pub from: u32,
    /// Last instance number (inclusive).
    #[serde(default = "default_to")]
    pub to: u32,
    /// Container name is this prefix followed by the instance number.
    #[serde(default = "default_container_prefix")]
    pub container_prefix: String,
}

impl Default for InstancesConfig {
    fn default() -> Self {
        Self {
            from: default_from(),
            to: default_to(),
            container_prefix: default_container_prefix(),
        }
    }
}

/// Shell command templates.
///
/// `{container}` expands to the container name and `{no}` to the instance number.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandsConfig {
    #[serde(default = "default_status_command")]
    pub status: String,
    #[serde(default = "default_restart_command")]
    pub restart: String,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            status: default_status_command(),
            restart: default_restart_command(),
        }
    }
}

/// Push webhook configuration.
#[derive(Clone, Deserialize)]
pub struct PushConfig {
    #[serde(default = "default_push_endpoint")]
    pub endpoint: String,
    pub uuid: String,
    pub to_uuid: String,
    pub user_token: String,
    /// Notification type, also used as the Android channel id.
    #[serde(default = "default_channel")]
    pub channel: String,
    #[serde(default = "default_push_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_body_chars")]
    pub max_body_chars: usize,
}

impl PushConfig {
    pub fn identity(&self) -> PushIdentity {
        PushIdentity {
            uuid: self.uuid.clone(),
            to_uuid: self.to_uuid.clone(),
            user_token: self.user_token.clone(),
        }
    }
}

impl fmt::Debug for PushConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushConfig")
            .field("endpoint", &self.endpoint)
            .field("uuid", &self.uuid)
            .field("to_uuid", &self.to_uuid)
            .field("user_token", &"[REDACTED]")
            .field("channel", &self.channel)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_body_chars", &self.max_body_chars)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3001
}
fn default_quiet_paths() -> Vec<String> {
    vec!["/favicon.ico".to_string()]
}
fn default_client_ip_header() -> String {
    "x-real-ip".to_string()
}
fn default_from() -> u32 {
    1
}
fn default_to() -> u32 {
    4
}
fn default_container_prefix() -> String {
    "hufs0".to_string()
}
fn default_status_command() -> String {
    "docker exec {container} nvidia-smi".to_string()
}
fn default_restart_command() -> String {
    "docker restart {container}".to_string()
}
fn default_push_endpoint() -> String {
    "https://proxy.pleizz.com/v5/sendPushByUuid".to_string()
}
fn default_channel() -> String {
    DEFAULT_CHANNEL.to_string()
}
fn default_push_timeout_ms() -> u64 {
    15001
}
fn default_max_body_chars() -> usize {
    DEFAULT_MAX_BODY_CHARS
}
fn default_log_level() -> String {
    "info".to_string()
}

// No `try_parsing`: it would turn a secret like `0042` into the integer 42.
fn environment() -> Environment {
    Environment::with_prefix("WAKEUP").separator("__")
}

impl Config {
    /// Load configuration from `config.toml` (if present) and environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration using `path` as the optional config file.
    ///
    /// Configuration sources (in order of precedence):
    /// 1. Environment variables (WAKEUP__SECTION__KEY format)
    /// 2. The config file (if present)
    /// 3. Built-in defaults
    ///
    /// Values are kept as strings until deserialization so a numeric secret
    /// like `0042` keeps its leading zeros.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, environment())
    }

    fn load_with(path: impl AsRef<Path>, env: Environment) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_string_lossy().into_owned();
        let config = ConfigLoader::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port() as i64)?
            .set_default("instances.from", default_from() as i64)?
            .set_default("instances.to", default_to() as i64)?
            .add_source(File::with_name(&path).required(false))
            .add_source(env)
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the gateway cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.secret.is_empty() {
            return Err(ConfigError::Message("auth.secret must not be empty".to_string()));
        }
        if self.instances.from > self.instances.to {
            return Err(ConfigError::Message(format!(
                "instances.from ({}) must not exceed instances.to ({})",
                self.instances.from, self.instances.to
            )));
        }
        Ok(())
    }
}
