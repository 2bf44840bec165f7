use db_pool::DbConfig;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Server configuration
    #[serde(default = "default_http_host")]
    pub http_host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    // Database configuration
    pub database_url: String,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default)]
    pub db_min_connections: u32,
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,
    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,
    #[serde(default = "default_db_max_lifetime_secs")]
    pub db_max_lifetime_secs: u64,
    /// Per-statement deadline; unset leaves timeouts to the caller
    #[serde(default)]
    pub statement_timeout_ms: Option<u64>,

    // Pagination
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,

    // Service configuration
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_db_max_connections() -> u32 {
    5
}

fn default_db_acquire_timeout_secs() -> u64 {
    10
}

fn default_db_idle_timeout_secs() -> u64 {
    60
}

fn default_db_max_lifetime_secs() -> u64 {
    1800
}

fn default_page_size() -> u32 {
    15
}

fn default_max_page_size() -> u32 {
    100
}

fn default_service_name() -> String {
    "punishment-history-service".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>()
    }

    pub fn statement_timeout(&self) -> Option<Duration> {
        self.statement_timeout_ms.map(Duration::from_millis)
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            service_name: self.service_name.clone(),
            database_url: self.database_url.clone(),
            max_connections: self.db_max_connections,
            min_connections: self.db_min_connections,
            acquire_timeout_secs: self.db_acquire_timeout_secs,
            idle_timeout_secs: self.db_idle_timeout_secs,
            max_lifetime_secs: self.db_max_lifetime_secs,
            ..DbConfig::default()
        }
    }
}
