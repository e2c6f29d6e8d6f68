//! Configuration module
//!
//! Environment-driven configuration for the API server, its database pool, and the
//! collaborators it talks to (SMTP, AI search, outbound event queue).

use std::env;

const SERVER_PORT: u16 = 4000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const REQUEST_TIMEOUT_SECS: u64 = 60;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;
const MAX_BODY_BYTES: usize = 1024 * 1024;
const PLAYBACK_COMPLETION_THRESHOLD: f64 = 0.9;
const REPORT_REVIEW_THRESHOLD: i32 = 3;
const CACHE_CAPACITY: usize = 1000;
const AI_SEARCH_TIMEOUT_SECS: u64 = 10;
const EVENT_QUEUE_CAPACITY: usize = 1024;
const EVENT_MAX_ATTEMPTS: u32 = 3;

/// HTTP server settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    pub concurrency_limit: usize,
    pub max_body_bytes: usize,
    pub environment: String,
}

/// Outbound email settings. Email is a no-op unless `enabled` and a host/sender are set.
#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub enabled: bool,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub from: Option<String>,
    pub tls: bool,
}

/// External AI verse search service.
#[derive(Clone, Debug)]
pub struct AiSearchConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub playback_completion_threshold: f64,
    pub report_review_threshold: i32,
    pub cache_capacity: usize,
    pub ai_search: AiSearchConfig,
    pub smtp: SmtpConfig,
    pub event_queue_capacity: usize,
    pub event_max_attempts: u32,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<AppConfig>);

impl Config {
    fn inner(&self) -> &AppConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = AppConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.inner().server.environment)
    }

    pub fn environment(&self) -> &str {
        &self.inner().server.environment
    }

    pub fn server_port(&self) -> u16 {
        self.inner().server.port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().server.cors_origins
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.inner().server.request_timeout_secs
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.inner().server.concurrency_limit
    }

    pub fn max_body_bytes(&self) -> usize {
        self.inner().server.max_body_bytes
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().db_timeout_seconds
    }

    pub fn jwt_secret(&self) -> &str {
        &self.inner().jwt_secret
    }

    pub fn playback_completion_threshold(&self) -> f64 {
        self.inner().playback_completion_threshold
    }

    pub fn report_review_threshold(&self) -> i32 {
        self.inner().report_review_threshold
    }

    pub fn cache_capacity(&self) -> usize {
        self.inner().cache_capacity
    }

    pub fn ai_search(&self) -> &AiSearchConfig {
        &self.inner().ai_search
    }

    pub fn smtp(&self) -> &SmtpConfig {
        &self.inner().smtp
    }

    pub fn event_queue_capacity(&self) -> usize {
        self.inner().event_queue_capacity
    }

    pub fn event_max_attempts(&self) -> u32 {
        self.inner().event_max_attempts
    }
}

fn is_production_name(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|s| s.trim().to_lowercase())
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

impl AppConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_name(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server = ServerConfig {
            port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            request_timeout_secs: parse_or("REQUEST_TIMEOUT_SECS", REQUEST_TIMEOUT_SECS).max(1),
            concurrency_limit: parse_or("HTTP_CONCURRENCY_LIMIT", HTTP_CONCURRENCY_LIMIT).max(1),
            max_body_bytes: parse_or("MAX_BODY_BYTES", MAX_BODY_BYTES),
            environment,
        };

        let config = AppConfig {
            server,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            db_timeout_seconds: parse_or("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            playback_completion_threshold: parse_or(
                "PLAYBACK_COMPLETION_THRESHOLD",
                PLAYBACK_COMPLETION_THRESHOLD,
            ),
            report_review_threshold: parse_or("REPORT_REVIEW_THRESHOLD", REPORT_REVIEW_THRESHOLD),
            cache_capacity: parse_or("CACHE_CAPACITY", CACHE_CAPACITY).max(1),
            ai_search: AiSearchConfig {
                url: non_empty("AI_SEARCH_URL"),
                api_key: non_empty("AI_SEARCH_API_KEY"),
                timeout_secs: parse_or("AI_SEARCH_TIMEOUT_SECS", AI_SEARCH_TIMEOUT_SECS),
            },
            smtp: SmtpConfig {
                enabled: parse_bool("EMAIL_ENABLED", false),
                host: non_empty("SMTP_HOST"),
                port: env::var("SMTP_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .filter(|&p| p > 0),
                user: non_empty("SMTP_USER"),
                password: non_empty("SMTP_PASSWORD"),
                from: non_empty("SMTP_FROM"),
                tls: parse_bool("SMTP_TLS", true),
            },
            event_queue_capacity: parse_or("EVENT_QUEUE_CAPACITY", EVENT_QUEUE_CAPACITY).max(1),
            event_max_attempts: parse_or("EVENT_MAX_ATTEMPTS", EVENT_MAX_ATTEMPTS).max(1),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if !(self.database_url.starts_with("postgresql://")
            || self.database_url.starts_with("postgres://"))
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if !(0.0..=1.0).contains(&self.playback_completion_threshold)
            || self.playback_completion_threshold == 0.0
        {
            return Err(anyhow::anyhow!(
                "PLAYBACK_COMPLETION_THRESHOLD must be in (0, 1]"
            ));
        }

        if self.report_review_threshold < 1 {
            return Err(anyhow::anyhow!("REPORT_REVIEW_THRESHOLD must be at least 1"));
        }

        if self.smtp.enabled && (self.smtp.host.is_none() || self.smtp.from.is_none()) {
            return Err(anyhow::anyhow!(
                "EMAIL_ENABLED=true requires SMTP_HOST and SMTP_FROM to be set"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            server: ServerConfig {
                port: 4000,
                cors_origins: vec!["*".to_string()],
                request_timeout_secs: 60,
                concurrency_limit: 100,
                max_body_bytes: MAX_BODY_BYTES,
                environment: "development".to_string(),
            },
            database_url: "postgresql://localhost/vesper".to_string(),
            db_max_connections: 5,
            db_timeout_seconds: 30,
            jwt_secret: "test-secret-key-min-32-characters-long".to_string(),
            playback_completion_threshold: 0.9,
            report_review_threshold: 3,
            cache_capacity: 100,
            ai_search: AiSearchConfig {
                url: None,
                api_key: None,
                timeout_secs: 10,
            },
            smtp: SmtpConfig {
                enabled: false,
                host: None,
                port: None,
                user: None,
                password: None,
                from: None,
                tls: true,
            },
            event_queue_capacity: 16,
            event_max_attempts: 3,
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn short_jwt_secret_is_rejected() {
        let mut config = base_config();
        config.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_postgres_url_is_rejected() {
        let mut config = base_config();
        config.database_url = "mysql://localhost/vesper".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn email_requires_host_and_sender() {
        let mut config = base_config();
        config.smtp.enabled = true;
        assert!(config.validate().is_err());
        config.smtp.host = Some("smtp.example.com".to_string());
        config.smtp.from = Some("noreply@example.com".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn completion_threshold_must_be_a_fraction() {
        let mut config = base_config();
        config.playback_completion_threshold = 1.5;
        assert!(config.validate().is_err());
        config.playback_completion_threshold = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn production_detection() {
        assert!(is_production_name("Production"));
        assert!(is_production_name("prod"));
        assert!(!is_production_name("staging"));
    }
}
