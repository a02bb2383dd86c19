//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use axum::http::HeaderValue;
use confusion::db::DatabaseConfig;
use std::net::{Ipv4Addr, SocketAddr};

/// Origins the web client is served from in development
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 3] = [
    "http://localhost:3000",
    "https://localhost:3443",
    "http://localhost:4200",
];

/// Minimum signing secret length (256-bit for HS256)
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Whether to apply embedded migrations at startup
    pub run_migrations: bool,
    /// Security configuration
    pub security: SecurityConfig,
    /// Origins allowed to make credentialed cross-origin requests
    pub allowed_origins: Vec<String>,
    /// Prometheus listener; metrics are not exported when unset
    pub metrics_bind: Option<SocketAddr>,
}

/// Security-related configuration
#[derive(Clone)]
pub struct SecurityConfig {
    /// JWT signing secret (required)
    pub jwt_secret: String,
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .finish()
    }
}

/// Values supplied on the command line, taking precedence over the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind: Option<SocketAddr>,
    pub database_url: Option<String>,
    pub metrics_bind: Option<SocketAddr>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), overrides)
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F, overrides: Overrides) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind = match overrides.bind {
            Some(bind) => bind,
            None => parse_var(&lookup, "SERVER_BIND")?
                .unwrap_or(SocketAddr::from((Ipv4Addr::LOCALHOST, 3000))),
        };

        let metrics_bind = match overrides.metrics_bind {
            Some(bind) => Some(bind),
            None => parse_var(&lookup, "METRICS_BIND")?,
        };

        // Database configuration
        let defaults = DatabaseConfig::development();
        let database = DatabaseConfig {
            database_url: overrides
                .database_url
                .or_else(|| lookup("DATABASE_URL"))
                .unwrap_or(defaults.database_url),
            max_connections: parse_var(&lookup, "DB_MAX_CONNECTIONS")?
                .unwrap_or(defaults.max_connections),
            min_connections: parse_var(&lookup, "DB_MIN_CONNECTIONS")?
                .unwrap_or(defaults.min_connections),
            connection_timeout_secs: parse_var(&lookup, "DB_CONNECTION_TIMEOUT_SECS")?
                .unwrap_or(defaults.connection_timeout_secs),
            idle_timeout_secs: parse_var(&lookup, "DB_IDLE_TIMEOUT_SECS")?
                .unwrap_or(defaults.idle_timeout_secs),
            max_lifetime_secs: parse_var(&lookup, "DB_MAX_LIFETIME_SECS")?
                .unwrap_or(defaults.max_lifetime_secs),
        };
        let run_migrations = parse_var(&lookup, "DB_RUN_MIGRATIONS")?.unwrap_or(true);

        // Security configuration (REQUIRED)
        let jwt_secret = lookup("JWT_SECRET").ok_or_else(|| ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Generate with: openssl rand -hex 32".to_string(),
        })?;

        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Invalid {
                var: "JWT_SECRET".to_string(),
                reason: format!("Must be at least {MIN_JWT_SECRET_LEN} characters"),
            });
        }

        let allowed_origins = match lookup("CORS_ALLOWED_ORIGINS") {
            Some(raw) => parse_origins(&raw),
            None => DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
        };

        Ok(ServerConfig {
            bind,
            database,
            run_migrations,
            security: SecurityConfig { jwt_secret },
            allowed_origins,
            metrics_bind,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_MAX_CONNECTIONS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid {
                var: "DB_MIN_CONNECTIONS".to_string(),
                reason: format!(
                    "Cannot exceed max connections ({})",
                    self.database.max_connections
                ),
            });
        }

        for origin in &self.allowed_origins {
            let scheme_ok = origin.starts_with("http://") || origin.starts_with("https://");
            if !scheme_ok || HeaderValue::from_str(origin).is_err() {
                return Err(ConfigError::Invalid {
                    var: "CORS_ALLOWED_ORIGINS".to_string(),
                    reason: format!("'{origin}' is not an http(s) origin"),
                });
            }
        }

        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: "Must differ from SERVER_BIND".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parse a variable if set; a set but unparsable value is an error
fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("Cannot parse '{raw}'"),
        }),
    }
}

/// Split a comma separated origin list, dropping blanks and trailing slashes
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned(), Overrides::default())
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Use openssl".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("JWT_SECRET"));
        assert!(msg.contains("Use openssl"));
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("JWT_SECRET", SECRET)]).unwrap();
        assert_eq!(config.bind, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(config.allowed_origins, DEFAULT_ALLOWED_ORIGINS.to_vec());
        assert!(config.metrics_bind.is_none());
        assert!(config.run_migrations);
        config.validate().unwrap();
    }

    #[test]
    fn test_secret_required() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { ref var, .. } if var == "JWT_SECRET"));
    }

    #[test]
    fn test_short_secret_rejected() {
        let err = load(&[("JWT_SECRET", "12345-67890-09876-54321")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "JWT_SECRET"));
    }

    #[test]
    fn test_unparsable_number_rejected() {
        let err = load(&[("JWT_SECRET", SECRET), ("DB_MAX_CONNECTIONS", "lots")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "DB_MAX_CONNECTIONS"));
    }

    #[test]
    fn test_overrides_win() {
        let vars: HashMap<&str, &str> =
            HashMap::from([("JWT_SECRET", SECRET), ("SERVER_BIND", "0.0.0.0:8080")]);
        let overrides = Overrides {
            bind: Some("127.0.0.1:9000".parse().unwrap()),
            database_url: Some("postgres://override/db".to_string()),
            metrics_bind: Some("127.0.0.1:9090".parse().unwrap()),
        };
        let config =
            ServerConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()), overrides)
                .unwrap();

        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.database.database_url, "postgres://override/db");
        assert_eq!(config.metrics_bind.map(|a| a.port()), Some(9090));
    }

    #[test]
    fn test_origin_list_parsing() {
        assert_eq!(
            parse_origins(" https://a.example/, ,http://b.example:8080 "),
            vec!["https://a.example", "http://b.example:8080"]
        );
    }

    #[test]
    fn test_validation_rejects_bad_origin() {
        let config = load(&[("JWT_SECRET", SECRET), ("CORS_ALLOWED_ORIGINS", "localhost:3000")])
            .unwrap();
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::Invalid { ref var, .. } if var == "CORS_ALLOWED_ORIGINS")
        );
    }

    #[test]
    fn test_validation_pool_sizes() {
        let config = load(&[
            ("JWT_SECRET", SECRET),
            ("DB_MIN_CONNECTIONS", "8"),
            ("DB_MAX_CONNECTIONS", "4"),
        ])
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = load(&[("JWT_SECRET", SECRET)]).unwrap();
        assert!(!format!("{config:?}").contains(SECRET));
    }
}
