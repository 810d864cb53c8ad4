//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SANITY_PROJECT_ID` - Content store project ID
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL used to absolutize image links
//! - `STORE_NAME` - Shop name used in order messages (default: Fashionable Queen)
//! - `SANITY_DATASET` - Dataset name (default: production)
//! - `SANITY_API_VERSION` - API version date (default: 2023-10-01)
//! - `SANITY_API_BASE_URL` - Override the API host (default: `https://<project>.api.sanity.io`)
//! - `SANITY_API_READ_TOKEN` - Token for reading private datasets
//! - `SANITY_API_WRITE_TOKEN` - Token for creating reviews, products and assets
//! - `SANITY_CONNECT_TIMEOUT_SECS` / `SANITY_REQUEST_TIMEOUT_SECS` - HTTP timeouts (default: 10 / 30)
//! - `CHECKOUT_CONTACT_ID` - Chat contact that receives orders
//! - `CHECKOUT_CHAT_BASE_URL` - Chat deep-link host (default: `https://wa.me`)
//! - `CHECKOUT_CURRENCY` - Currency code shown in prices (default: PKR)
//! - `DELIVERY_CHARGE` - Flat delivery charge (default: 0)
//! - `CHECKOUT_CLEAR_CART` - Clear the cart after checkout handoff (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use fashionable_queen_core::CurrencyCode;
use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

const DEFAULT_BASE_URL: &str = "https://fashionable-queen.vercel.app";
const DEFAULT_CONTACT_ID: &str = "923232979158";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Shop name shown in the order message
    pub store_name: String,
    /// Content store configuration
    pub sanity: SanityConfig,
    /// Checkout handoff configuration
    pub checkout: CheckoutConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Content store API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct SanityConfig {
    /// Project ID (the subdomain of the API host)
    pub project_id: String,
    /// Dataset name
    pub dataset: String,
    /// API version date, e.g. 2023-10-01
    pub api_version: String,
    /// API origin without version, e.g. `https://abc123.api.sanity.io`
    pub api_base_url: String,
    /// Token for reads (optional for public datasets)
    pub read_token: Option<SecretString>,
    /// Token for mutations and asset uploads
    pub write_token: Option<SecretString>,
    /// TCP connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for SanityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |token: &Option<SecretString>| token.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("SanityConfig")
            .field("project_id", &self.project_id)
            .field("dataset", &self.dataset)
            .field("api_version", &self.api_version)
            .field("api_base_url", &self.api_base_url)
            .field("read_token", &redact(&self.read_token))
            .field("write_token", &redact(&self.write_token))
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Checkout handoff configuration.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Chat contact (phone number in international format, no `+`)
    pub contact_id: String,
    /// Deep-link host, e.g. `https://wa.me`
    pub chat_base_url: String,
    /// Currency shown next to every amount
    pub currency: CurrencyCode,
    /// Flat delivery charge added to every order
    pub delivery_charge: Decimal,
    /// Empty the cart once the handoff link has been built
    pub clear_cart_on_checkout: bool,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            contact_id: DEFAULT_CONTACT_ID.to_string(),
            chat_base_url: "https://wa.me".to_string(),
            currency: CurrencyCode::PKR,
            delivery_charge: Decimal::ZERO,
            clear_cart_on_checkout: false,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the write token fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env("STOREFRONT_PORT", "3000")?;
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();
        let store_name = get_env_or_default("STORE_NAME", "Fashionable Queen");

        let sanity = SanityConfig::from_env()?;
        let checkout = CheckoutConfig::from_env()?;

        Ok(Self {
            host,
            port,
            base_url,
            store_name,
            sanity,
            checkout,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.1")?,
        })
    }

    /// Configuration with every optional setting at its default.
    #[must_use]
    pub fn with_sanity(sanity: SanityConfig) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: DEFAULT_BASE_URL.to_string(),
            store_name: "Fashionable Queen".to_string(),
            sanity,
            checkout: CheckoutConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl SanityConfig {
    /// Anonymous read-only access to a project's default dataset.
    #[must_use]
    pub fn for_project(project_id: impl Into<String>) -> Self {
        let project_id = project_id.into();
        Self {
            api_base_url: default_api_base_url(&project_id),
            project_id,
            dataset: "production".to_string(),
            api_version: "2023-10-01".to_string(),
            read_token: None,
            write_token: None,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
        }
    }

    fn from_env() -> Result<Self, ConfigError> {
        let project_id = get_required_env("SANITY_PROJECT_ID")?;
        let api_base_url = get_optional_env("SANITY_API_BASE_URL")
            .unwrap_or_else(|| default_api_base_url(&project_id));

        Ok(Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            project_id,
            dataset: get_env_or_default("SANITY_DATASET", "production"),
            api_version: get_env_or_default("SANITY_API_VERSION", "2023-10-01"),
            read_token: get_optional_env("SANITY_API_READ_TOKEN").map(SecretString::from),
            write_token: get_optional_validated_secret("SANITY_API_WRITE_TOKEN")?,
            connect_timeout_secs: parse_env("SANITY_CONNECT_TIMEOUT_SECS", "10")?,
            request_timeout_secs: parse_env("SANITY_REQUEST_TIMEOUT_SECS", "30")?,
        })
    }
}

impl CheckoutConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            contact_id: get_env_or_default("CHECKOUT_CONTACT_ID", &defaults.contact_id),
            chat_base_url: get_env_or_default("CHECKOUT_CHAT_BASE_URL", &defaults.chat_base_url)
                .trim_end_matches('/')
                .to_string(),
            currency: parse_env("CHECKOUT_CURRENCY", defaults.currency.code())?,
            delivery_charge: parse_delivery_charge(&get_env_or_default("DELIVERY_CHARGE", "0"))?,
            clear_cart_on_checkout: parse_bool(
                "CHECKOUT_CLEAR_CART",
                &get_env_or_default("CHECKOUT_CLEAR_CART", "false"),
            )?,
        })
    }
}

/// Default API origin for a project.
#[must_use]
pub fn default_api_base_url(project_id: &str) -> String {
    format!("https://{project_id}.api.sanity.io")
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable (or its default) with `FromStr`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a boolean flag (`true/false`, `1/0`, `yes/no`, `on/off`).
fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

/// Parse the delivery charge as a non-negative decimal.
fn parse_delivery_charge(value: &str) -> Result<Decimal, ConfigError> {
    let key = "DELIVERY_CHARGE";
    let charge = Decimal::from_str(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if charge.is_sign_negative() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must not be negative".to_string(),
        ));
    }
    Ok(charge)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Real API tokens are long random strings
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the token issued by the content store."
            ),
        ));
    }

    Ok(())
}

/// Load and validate an optional secret from environment.
fn get_optional_validated_secret(key: &str) -> Result<Option<SecretString>, ConfigError> {
    get_optional_env(key)
        .map(|value| {
            validate_secret_strength(&value, key)?;
            Ok(SecretString::from(value))
        })
        .transpose()
}
