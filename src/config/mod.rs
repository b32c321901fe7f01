use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

use crate::types::RateLimitPreset;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string. When absent, development falls back to the in-memory store.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

/// Quota for a single rate-limit preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitQuota {
    pub requests: u32,
    pub window_secs: u64,
}

impl RateLimitQuota {
    pub const fn new(requests: u32, window_secs: u64) -> Self {
        Self { requests, window_secs }
    }

    /// Parses the `<requests>/<secs>` form used by `RATE_LIMIT_*` variables.
    pub fn parse(value: &str) -> Option<Self> {
        let (requests, window) = value.split_once('/')?;
        let requests = requests.trim().parse().ok()?;
        let window_secs: u64 = window.trim().parse().ok()?;
        if window_secs == 0 {
            return None;
        }
        Some(Self { requests, window_secs })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_rate_limiting: bool,
    pub standard: RateLimitQuota,
    pub strict: RateLimitQuota,
    pub relaxed: RateLimitQuota,
    pub rate_limit_sweep_secs: u64,
}

impl ApiConfig {
    pub fn quota(&self, preset: RateLimitPreset) -> RateLimitQuota {
        match preset {
            RateLimitPreset::Standard => self.standard,
            RateLimitPreset::Strict => self.strict,
            RateLimitPreset::Relaxed => self.relaxed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    pub webhook_url: Option<String>,
    pub timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("CASEWORK_API_HOST") {
            self.server.host = v;
        }
        if let Some(port) = env::var("CASEWORK_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_RATE_LIMITING") {
            self.api.enable_rate_limiting = v.parse().unwrap_or(self.api.enable_rate_limiting);
        }
        if let Some(q) = env::var("RATE_LIMIT_STANDARD").ok().and_then(|v| RateLimitQuota::parse(&v)) {
            self.api.standard = q;
        }
        if let Some(q) = env::var("RATE_LIMIT_STRICT").ok().and_then(|v| RateLimitQuota::parse(&v)) {
            self.api.strict = q;
        }
        if let Some(q) = env::var("RATE_LIMIT_RELAXED").ok().and_then(|v| RateLimitQuota::parse(&v)) {
            self.api.relaxed = q;
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("SECURITY_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }

        // Notification overrides
        if let Ok(v) = env::var("NOTIFY_WEBHOOK_URL") {
            if !v.trim().is_empty() {
                self.notify.webhook_url = Some(v);
            }
        }
        if let Ok(v) = env::var("NOTIFY_TIMEOUT_SECS") {
            self.notify.timeout_secs = v.parse().unwrap_or(self.notify.timeout_secs);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                enable_rate_limiting: true,
                standard: RateLimitQuota::new(1000, 60),
                strict: RateLimitQuota::new(200, 60),
                relaxed: RateLimitQuota::new(5000, 60),
                rate_limit_sweep_secs: 60,
            },
            security: SecurityConfig {
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                jwt_secret: "development-secret-change-me".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
            },
            notify: NotifyConfig {
                webhook_url: None,
                timeout_secs: 5,
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                enable_rate_limiting: true,
                standard: RateLimitQuota::new(100, 60),
                strict: RateLimitQuota::new(20, 60),
                relaxed: RateLimitQuota::new(300, 60),
                rate_limit_sweep_secs: 60,
            },
            security: SecurityConfig {
                cors_origins: vec!["https://staging.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
            },
            notify: NotifyConfig {
                webhook_url: None,
                timeout_secs: 5,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                enable_rate_limiting: true,
                standard: RateLimitQuota::new(60, 60),
                strict: RateLimitQuota::new(10, 60),
                relaxed: RateLimitQuota::new(200, 60),
                rate_limit_sweep_secs: 30,
            },
            security: SecurityConfig {
                cors_origins: vec!["https://app.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
            },
            notify: NotifyConfig {
                webhook_url: None,
                timeout_secs: 3,
            },
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
