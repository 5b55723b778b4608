//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the server starts.
//!
//! ## Required Variables
//!
//! - `EXPIRE_REMOTE_CACHE_SECRET` - Shared secret for the cache invalidation endpoint
//! - `SITE_NAME` - Site identifier used in platform lookups
//! - `EDGE_ENDPOINT` / `EDGE_API_KEY` - Content platform GraphQL endpoint
//! - `DECISION_ENDPOINT` - Personalization decision engine endpoint
//!
//! ## Optional Variables
//!
//! - `REDIS_URL` / `REDIS_HOST` - Redis connection (process-local cache if unset)
//! - `LISTEN` - Bind address (default: `0.0.0.0:3000`)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)
//! - `SECRET_SOURCE` - Where the invalidation secret arrives: `header` or `query`
//! - `SITE_LOCALES` - Comma-separated locale list (default: `en`)
//! - `DEFAULT_LOCALE` - Routing locale for unprefixed paths (default: `en`)
//! - `CACHE_TTL_SECONDS` - Runtime cache TTL (default: 86400)
//! - `DECISION_TIMEOUT_MS` - Per-call decision timeout (default: 400)
//! - `PERSONALIZE_DISABLED` - Disable personalization entirely
//! - `EXCLUDED_ROUTES` - Extra comma-separated path prefixes to skip

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Where the invalidation endpoint reads its shared secret from.
///
/// Two deployment profiles of the same endpoint, not two implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSource {
    /// `x-remote-cache-secret` request header.
    Header,
    /// `secret` query parameter.
    Query,
}

impl FromStr for SecretSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "header" => Ok(Self::Header),
            "query" => Ok(Self::Query),
            other => Err(format!("unknown secret source '{}'", other)),
        }
    }
}

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub log_level: String,
    pub log_format: String,

    /// Redis connection; `None` means the process-local cache is used.
    pub redis_url: Option<String>,

    /// Shared secret for `POST /api/expire-remote-cache`.
    pub expire_secret: String,
    pub secret_source: SecretSource,

    // ── Site / platform ─────────────────────────────────────────────────────
    pub site_name: String,
    pub site_locales: Vec<String>,
    pub default_locale: String,
    pub edge_endpoint: String,
    pub edge_api_key: String,

    // ── Decision engine ─────────────────────────────────────────────────────
    pub decision_endpoint: String,
    /// Defaults to `EDGE_API_KEY` when unset.
    pub decision_api_key: String,
    pub decision_timeout_ms: u64,
    pub decision_channel: String,
    pub decision_currency: String,

    // ── Runtime cache ───────────────────────────────────────────────────────
    pub cache_ttl_seconds: u64,
    pub redirects_cache_key: String,
    pub redirects_cache_tag: String,
    pub personalize_cache_tag: String,

    // ── Personalization ─────────────────────────────────────────────────────
    pub personalize_disabled: bool,
    /// Path prefixes never personalized, in addition to `/api` and `/health`.
    pub excluded_routes: Vec<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or unparseable.
    pub fn from_env() -> Result<Self> {
        let listen_addr = env::var("LISTEN").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        let redis_url = Self::load_redis_url();

        let expire_secret = env::var("EXPIRE_REMOTE_CACHE_SECRET")
            .context("EXPIRE_REMOTE_CACHE_SECRET must be set")?;

        let secret_source = env::var("SECRET_SOURCE")
            .unwrap_or_else(|_| "header".to_string())
            .parse()
            .map_err(|e: String| anyhow::anyhow!("SECRET_SOURCE: {}", e))?;

        let site_name = env::var("SITE_NAME").context("SITE_NAME must be set")?;

        let site_locales = env::var("SITE_LOCALES")
            .unwrap_or_else(|_| "en".to_string())
            .split(',')
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty())
            .collect();

        let default_locale = env::var("DEFAULT_LOCALE")
            .unwrap_or_else(|_| "en".to_string())
            .to_lowercase();

        let edge_endpoint = env::var("EDGE_ENDPOINT").context("EDGE_ENDPOINT must be set")?;
        let edge_api_key = env::var("EDGE_API_KEY").context("EDGE_API_KEY must be set")?;

        let decision_endpoint =
            env::var("DECISION_ENDPOINT").context("DECISION_ENDPOINT must be set")?;
        let decision_api_key =
            env::var("DECISION_API_KEY").unwrap_or_else(|_| edge_api_key.clone());

        let decision_timeout_ms = env::var("DECISION_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(400);

        let decision_channel = env::var("DECISION_CHANNEL").unwrap_or_else(|_| "WEB".to_string());
        let decision_currency =
            env::var("DECISION_CURRENCY").unwrap_or_else(|_| "USD".to_string());

        let cache_ttl_seconds = env::var("CACHE_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);

        let redirects_cache_key =
            env::var("REDIRECTS_CACHE_KEY").unwrap_or_else(|_| "redirects".to_string());
        let redirects_cache_tag =
            env::var("REDIRECTS_CACHE_TAG").unwrap_or_else(|_| "refresh-redirects".to_string());
        let personalize_cache_tag = env::var("PERSONALIZE_CACHE_TAG")
            .unwrap_or_else(|_| "refresh-personalize".to_string());

        let personalize_disabled = env::var("PERSONALIZE_DISABLED")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);

        let mut excluded_routes: Vec<String> =
            vec!["/api".to_string(), "/health".to_string()];
        if let Ok(extra) = env::var("EXCLUDED_ROUTES") {
            excluded_routes.extend(
                extra
                    .split(',')
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty()),
            );
        }

        Ok(Self {
            listen_addr,
            log_level,
            log_format,
            redis_url,
            expire_secret,
            secret_source,
            site_name,
            site_locales,
            default_locale,
            edge_endpoint,
            edge_api_key,
            decision_endpoint,
            decision_api_key,
            decision_timeout_ms,
            decision_channel,
            decision_currency,
            cache_ttl_seconds,
            redirects_cache_key,
            redirects_cache_tag,
            personalize_cache_tag,
            personalize_disabled,
            excluded_routes,
        })
    }

    /// Loads Redis URL with fallback to component-based configuration.
    ///
    /// Priority:
    /// 1. `REDIS_URL` environment variable
    /// 2. Constructed from `REDIS_HOST`, `REDIS_PORT`, `REDIS_PASSWORD`, `REDIS_DB`
    ///
    /// Returns `None` if Redis is not configured.
    fn load_redis_url() -> Option<String> {
        if let Ok(url) = env::var("REDIS_URL") {
            return Some(url);
        }

        let host = env::var("REDIS_HOST").ok()?;
        let port = env::var("REDIS_PORT").unwrap_or_else(|_| "6379".to_string());
        let password = env::var("REDIS_PASSWORD").ok();
        let db = env::var("REDIS_DB").unwrap_or_else(|_| "0".to_string());

        let url = match password {
            Some(pwd) if !pwd.is_empty() => format!("redis://:{}@{}:{}/{}", pwd, host, port, db),
            _ => format!("redis://{}:{}/{}", host, port, db),
        };

        Some(url)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any field is empty, malformed, or out of range.
    pub fn validate(&self) -> Result<()> {
        if self.expire_secret.is_empty() {
            anyhow::bail!("EXPIRE_REMOTE_CACHE_SECRET must not be empty");
        }

        if self.site_name.is_empty() {
            anyhow::bail!("SITE_NAME must not be empty");
        }

        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        if self.cache_ttl_seconds == 0 {
            anyhow::bail!("CACHE_TTL_SECONDS must be greater than 0");
        }

        if self.decision_timeout_ms == 0 {
            anyhow::bail!("DECISION_TIMEOUT_MS must be greater than 0");
        }

        if self.site_locales.is_empty() {
            anyhow::bail!("SITE_LOCALES must contain at least one locale");
        }

        if !self.site_locales.contains(&self.default_locale) {
            anyhow::bail!(
                "DEFAULT_LOCALE '{}' must appear in SITE_LOCALES",
                self.default_locale
            );
        }

        if let Some(ref redis_url) = self.redis_url
            && !redis_url.starts_with("redis://")
            && !redis_url.starts_with("rediss://")
        {
            anyhow::bail!(
                "REDIS_URL must start with 'redis://' or 'rediss://', got '{}'",
                redis_url
            );
        }

        Ok(())
    }

    /// Returns whether the shared Redis cache is enabled.
    pub fn is_redis_enabled(&self) -> bool {
        self.redis_url.is_some()
    }

    /// Prints configuration summary (without sensitive data).
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Site: {} (locales: {:?})", self.site_name, self.site_locales);
        tracing::info!("  Platform endpoint: {}", self.edge_endpoint);
        tracing::info!("  Decision endpoint: {}", self.decision_endpoint);

        if let Some(ref redis_url) = self.redis_url {
            tracing::info!("  Redis: {} (enabled)", mask_connection_string(redis_url));
        } else {
            tracing::info!("  Redis: disabled (process-local cache)");
        }

        tracing::info!("  Cache TTL: {}s", self.cache_ttl_seconds);
        tracing::info!("  Secret source: {:?}", self.secret_source);
        tracing::info!("  Personalization disabled: {}", self.personalize_disabled);
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
    }
}

/// Masks sensitive information in connection strings for logging.
///
/// Replaces password with `***` in URLs like:
/// - `redis://:password@host:port/db` → `redis://:***@host:port/db`
fn mask_connection_string(url: &str) -> String {
    if let Some(start) = url.find("://") {
        let scheme_end = start + 3;
        let rest = &url[scheme_end..];

        if let Some(at_pos) = rest.find('@') {
            let credentials = &rest[..at_pos];
            let host_part = &rest[at_pos..];

            if let Some(colon_pos) = credentials.rfind(':') {
                let username = &credentials[..colon_pos];
                return format!("{}://{}:***{}", &url[..start], username, host_part);
            }
        }
    }

    url.to_string()
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if required variables are missing or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
