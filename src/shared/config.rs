use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub auto_sync: bool,
    /// Seconds between periodic passes.
    pub periodic_interval_secs: u64,
    /// Flex window applied to each periodic tick as a random ± offset.
    pub flex_secs: u64,
    /// Base backoff for immediate/force retries (linear).
    pub immediate_backoff_secs: u64,
    /// Base backoff for periodic retries (exponential).
    pub periodic_backoff_secs: u64,
    pub max_retry: u32,
    /// Overall bound on the concurrent per-chat sync join.
    pub chat_join_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:data/alumni_portal.db".to_string(),
                max_connections: 5,
                connection_timeout: 30,
            },
            sync: SyncConfig {
                auto_sync: true,
                periodic_interval_secs: 7200, // 2 hours
                flex_secs: 1800,              // +/- 30 minutes
                immediate_backoff_secs: 10,
                periodic_backoff_secs: 30,
                max_retry: 3,
                chat_join_timeout_secs: 60,
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("ALUMNI_DATABASE_URL") {
            if !v.trim().is_empty() {
                cfg.database.url = v;
            }
        }
        if let Ok(v) = std::env::var("ALUMNI_DATABASE_MAX_CONNECTIONS") {
            if let Some(value) = parse_u32(&v) {
                cfg.database.max_connections = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("ALUMNI_AUTO_SYNC") {
            cfg.sync.auto_sync = parse_bool(&v, cfg.sync.auto_sync);
        }
        if let Ok(v) = std::env::var("ALUMNI_SYNC_INTERVAL_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.sync.periodic_interval_secs = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("ALUMNI_SYNC_FLEX_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.sync.flex_secs = value;
            }
        }
        if let Ok(v) = std::env::var("ALUMNI_SYNC_MAX_RETRY") {
            if let Some(value) = parse_u32(&v) {
                cfg.sync.max_retry = value;
            }
        }
        if let Ok(v) = std::env::var("ALUMNI_CHAT_JOIN_TIMEOUT_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.sync.chat_join_timeout_secs = value.max(1);
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.sync.periodic_interval_secs == 0 {
            return Err("Sync periodic_interval_secs must be greater than 0".to_string());
        }
        if self.sync.flex_secs >= self.sync.periodic_interval_secs {
            return Err("Sync flex_secs must be smaller than periodic_interval_secs".to_string());
        }
        if self.sync.chat_join_timeout_secs == 0 {
            return Err("Sync chat_join_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

fn parse_u32(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}
