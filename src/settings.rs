use actix_web::http::header::{HeaderName, HeaderValue};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use std::{env, fmt, str::FromStr, time::Duration};

use crate::constants::{
    DEFAULT_CLIENT_IP_HEADER, DEFAULT_HCAPTCHA_VERIFY_URL, DEFAULT_MAX_REQUESTS,
    DEFAULT_WINDOW_SECONDS,
};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default)]
    pub database_url: String,

    #[serde(default = "default_database_max_connections")]
    pub database_max_connections: u32,

    #[serde(default)]
    pub redis_url: Option<String>,

    #[serde(default = "default_cors_origin")]
    pub cors_allowed_origin: String,

    #[serde(default)]
    pub hcaptcha_secret: String,

    #[serde(default)]
    pub hcaptcha_site_key: Option<String>,

    #[serde(default = "default_hcaptcha_verify_url")]
    pub hcaptcha_verify_url: String,

    #[serde(default = "default_client_ip_header")]
    pub client_ip_header: String,

    #[serde(default = "default_rate_limit_max_requests")]
    pub rate_limit_max_requests: u32,

    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_secs: u64,

    #[serde(default = "default_outbound_timeout_secs")]
    pub outbound_timeout_secs: u64,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Contact-Intake".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_database_max_connections() -> u32 {
    10
}
fn default_cors_origin() -> String {
    "*".to_string()
}
fn default_hcaptcha_verify_url() -> String {
    DEFAULT_HCAPTCHA_VERIFY_URL.to_string()
}
fn default_client_ip_header() -> String {
    DEFAULT_CLIENT_IP_HEADER.to_string()
}
fn default_rate_limit_max_requests() -> u32 {
    DEFAULT_MAX_REQUESTS
}
fn default_rate_limit_window_secs() -> u64 {
    DEFAULT_WINDOW_SECONDS
}
fn default_outbound_timeout_secs() -> u64 {
    10
}
fn default_max_body_bytes() -> usize {
    64 * 1024
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(Environment::with_prefix("APP").ignore_empty(true));

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;

        // Inject critical env values if missing
        config.database_url = fill_or_env(config.database_url, "APP_DATABASE_URL")?;
        config.hcaptcha_secret = fill_or_env(config.hcaptcha_secret, "APP_HCAPTCHA_SECRET")?;

        if config.redis_url.is_none() {
            config.redis_url = env::var("APP_REDIS_URL").ok();
        }
        config.redis_url = config.redis_url.filter(|url| !url.trim().is_empty());
        config.hcaptcha_site_key = config.hcaptcha_site_key.filter(|key| !key.trim().is_empty());

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.database_url.trim().is_empty() {
            errors.push("DATABASE_URL cannot be empty");
        }
        if self.hcaptcha_secret.trim().is_empty() {
            errors.push("HCAPTCHA_SECRET cannot be empty");
        }
        if self.cors_allowed_origin.trim().is_empty() {
            errors.push("CORS_ALLOWED_ORIGIN cannot be empty");
        }
        if HeaderValue::from_str(&self.cors_allowed_origin).is_err() {
            errors.push("CORS_ALLOWED_ORIGIN must be a valid header value");
        }
        if HeaderName::from_bytes(self.client_ip_header.as_bytes()).is_err() {
            errors.push("CLIENT_IP_HEADER must be a valid header name");
        }
        if self.rate_limit_max_requests == 0 {
            errors.push("RATE_LIMIT_MAX_REQUESTS must be at least 1");
        }
        if self.rate_limit_window_secs == 0 {
            errors.push("RATE_LIMIT_WINDOW_SECS must be at least 1");
        }
        if self.outbound_timeout_secs == 0 {
            errors.push("OUTBOUND_TIMEOUT_SECS must be at least 1");
        }
        if self.is_production() && self.cors_allowed_origin.trim() == "*" {
            errors.push("Wildcard CORS (*) is not allowed in production");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn outbound_timeout(&self) -> Duration {
        Duration::from_secs(self.outbound_timeout_secs)
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn fill_or_env(current: String, env_key: &str) -> Result<String, ConfigError> {
    if current.trim().is_empty() {
        env::var(env_key).map_err(|_| ConfigError::Message(format!("{env_key} must be set")))
    } else {
        Ok(current)
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for str {
    fn redact(&self) -> &str {
        if self.is_empty() {
            "[MISSING]"
        } else {
            "[REDACTED]"
        }
    }
}

impl Redact for String {
    fn redact(&self) -> &str {
        self.as_str().redact()
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("database_url", &self.database_url.redact())
            .field("database_max_connections", &self.database_max_connections)
            .field("redis_url", &self.redis_url.as_ref().map(|url| url.redact()))
            .field("cors_allowed_origin", &self.cors_allowed_origin)
            .field("hcaptcha_secret", &self.hcaptcha_secret.redact())
            .field("hcaptcha_site_key", &self.hcaptcha_site_key)
            .field("hcaptcha_verify_url", &self.hcaptcha_verify_url)
            .field("client_ip_header", &self.client_ip_header)
            .field("rate_limit_max_requests", &self.rate_limit_max_requests)
            .field("rate_limit_window_secs", &self.rate_limit_window_secs)
            .field("outbound_timeout_secs", &self.outbound_timeout_secs)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}
