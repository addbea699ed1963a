//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TELEGRAM_BOT_USERNAME` - Bot that receives orders (when `PRESTO_SUBMITTER=telegram`)
//! - `ORDER_ENDPOINT_URL` - Endpoint that receives orders (when `PRESTO_SUBMITTER=http`)
//!
//! ## Optional
//! - `PRESTO_HOST` - Bind address (default: 127.0.0.1)
//! - `PRESTO_PORT` - Listen port (default: 3000)
//! - `PRESTO_BASE_URL` - Public URL (default: <http://localhost:3000>)
//! - `PRESTO_CATALOG_PATH` - Menu JSON file (default: bundled menu)
//! - `PRESTO_ALL_CATEGORIES_LABEL` - Label of the "every category" filter (default: Barchasi)
//! - `PRESTO_CURRENCY` - Display currency: `uzs`, `usd` or `eur` (default: uzs)
//! - `PRESTO_SUBMITTER` - `telegram` or `http` (default: telegram)
//! - `ORDER_ENDPOINT_TOKEN` - Bearer token for the order endpoint
//! - `PRESTO_REQUIRE_PHONE` - Collect a contact phone before confirming
//!   (default: false for telegram, true for http)
//! - `PRESTO_PHONE_PREFIX` - Required country prefix (default: 998)
//! - `PRESTO_PHONE_DIGITS` - Required digit count including prefix (default: 12)
//! - `PRESTO_SUBMIT_TIMEOUT_SECS` - Submission timeout (default: 15)
//! - `PRESTO_SESSION_IDLE_MINUTES` - Idle time before a session is dropped (default: 60)
//! - `PRESTO_LOG_FORMAT` - `text` or `json` (default: text)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use presto_core::{CurrencyCode, PhonePolicy, PhoneRule};
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Bot usernames copied verbatim from sample `.env` files.
const PLACEHOLDER_USERNAMES: &[&str] = &[
    "your_bot_username",
    "your_bot",
    "yourbot",
    "bot_username",
    "my_bot_username",
    "example_bot",
    "changeme",
    "placeholder",
];

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
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
    /// Menu JSON file; the bundled menu is used when unset
    pub catalog_path: Option<PathBuf>,
    /// Label of the "every category" filter entry
    pub all_categories_label: String,
    /// Currency prices are displayed in
    pub currency: CurrencyCode,
    /// How confirmed orders are handed off
    pub submission: SubmissionConfig,
    /// Idle time after which a session's cart is discarded
    pub session_idle: Duration,
    /// Emit JSON logs instead of text
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Order submission configuration.
#[derive(Debug, Clone)]
pub struct SubmissionConfig {
    /// Where orders go
    pub channel: SubmissionChannel,
    /// Whether a contact phone is collected before confirming
    pub require_phone: bool,
    /// Shape a contact phone must have
    pub phone_rule: PhoneRule,
    /// How long a submission may take before it counts as failed
    pub timeout: Duration,
}

impl SubmissionConfig {
    /// Phone policy for new checkout sessions.
    #[must_use]
    pub fn phone_policy(&self) -> PhonePolicy {
        if self.require_phone {
            PhonePolicy::Required(self.phone_rule.clone())
        } else {
            PhonePolicy::NotRequired
        }
    }
}

/// Destination for confirmed orders.
#[derive(Debug, Clone)]
pub enum SubmissionChannel {
    /// Deep link into a Telegram bot's mini app
    Telegram {
        /// Bot username without the leading `@`
        bot_username: String,
    },
    /// JSON POST to an order endpoint
    Http(HttpEndpointConfig),
}

/// Order endpoint configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct HttpEndpointConfig {
    /// Endpoint receiving order JSON
    pub url: Url,
    /// Bearer token sent with each order
    pub token: Option<SecretString>,
}

impl std::fmt::Debug for HttpEndpointConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEndpointConfig")
            .field("url", &self.url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
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
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`StorefrontConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let host = env.parse_or("PRESTO_HOST", "127.0.0.1")?;
        let port = env.parse_or("PRESTO_PORT", "3000")?;
        let base_url = env.or_default("PRESTO_BASE_URL", "http://localhost:3000");
        let catalog_path = env.optional("PRESTO_CATALOG_PATH").map(PathBuf::from);
        let all_categories_label = env.or_default("PRESTO_ALL_CATEGORIES_LABEL", "Barchasi");
        let currency = parse_currency(&env.or_default("PRESTO_CURRENCY", "uzs"))?;
        let submission = SubmissionConfig::from_env(&env)?;
        let idle_minutes: u64 = env.parse_or("PRESTO_SESSION_IDLE_MINUTES", "60")?;
        if idle_minutes == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "PRESTO_SESSION_IDLE_MINUTES".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            host,
            port,
            base_url,
            catalog_path,
            all_categories_label,
            currency,
            submission,
            session_idle: Duration::from_secs(idle_minutes.saturating_mul(60)),
            log_json: parse_log_format(&env.or_default("PRESTO_LOG_FORMAT", "text"))?,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl SubmissionConfig {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        let kind = env.or_default("PRESTO_SUBMITTER", "telegram");
        let channel = match kind.to_ascii_lowercase().as_str() {
            "telegram" => SubmissionChannel::Telegram {
                bot_username: validate_bot_username(
                    &env.required("TELEGRAM_BOT_USERNAME")?,
                    "TELEGRAM_BOT_USERNAME",
                )?,
            },
            "http" => {
                let raw = env.required("ORDER_ENDPOINT_URL")?;
                let url = Url::parse(&raw).map_err(|e| {
                    ConfigError::InvalidEnvVar("ORDER_ENDPOINT_URL".to_string(), e.to_string())
                })?;
                let token = env
                    .optional("ORDER_ENDPOINT_TOKEN")
                    .map(|value| {
                        validate_secret_strength(&value, "ORDER_ENDPOINT_TOKEN")?;
                        Ok::<_, ConfigError>(SecretString::from(value))
                    })
                    .transpose()?;
                SubmissionChannel::Http(HttpEndpointConfig { url, token })
            }
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "PRESTO_SUBMITTER".to_string(),
                    format!("unknown submitter '{other}' (expected 'telegram' or 'http')"),
                ));
            }
        };

        let default_require_phone = matches!(channel, SubmissionChannel::Http(_));
        let require_phone = match env.optional("PRESTO_REQUIRE_PHONE") {
            Some(value) => parse_bool(&value, "PRESTO_REQUIRE_PHONE")?,
            None => default_require_phone,
        };

        let country_prefix = env.or_default("PRESTO_PHONE_PREFIX", "998");
        if country_prefix.is_empty() || !country_prefix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ConfigError::InvalidEnvVar(
                "PRESTO_PHONE_PREFIX".to_string(),
                "must be digits only".to_string(),
            ));
        }
        let digits: usize = env.parse_or("PRESTO_PHONE_DIGITS", "12")?;
        if digits <= country_prefix.len() {
            return Err(ConfigError::InvalidEnvVar(
                "PRESTO_PHONE_DIGITS".to_string(),
                format!("must be longer than the prefix ({} digits)", country_prefix.len()),
            ));
        }

        let timeout_secs: u64 = env.parse_or("PRESTO_SUBMIT_TIMEOUT_SECS", "15")?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "PRESTO_SUBMIT_TIMEOUT_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            channel,
            require_phone,
            phone_rule: PhoneRule {
                country_prefix,
                digits,
            },
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup with the usual required/optional/default helpers.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable; empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to a default.
    fn parse_or<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}

/// Parse a boolean flag.
fn parse_bool(value: &str, var_name: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

/// Parse a display currency.
fn parse_currency(value: &str) -> Result<CurrencyCode, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "uzs" => Ok(CurrencyCode::UZS),
        "usd" => Ok(CurrencyCode::USD),
        "eur" => Ok(CurrencyCode::EUR),
        other => Err(ConfigError::InvalidEnvVar(
            "PRESTO_CURRENCY".to_string(),
            format!("unsupported currency '{other}'"),
        )),
    }
}

/// Parse the log format; `true` means JSON.
fn parse_log_format(value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "text" => Ok(false),
        "json" => Ok(true),
        other => Err(ConfigError::InvalidEnvVar(
            "PRESTO_LOG_FORMAT".to_string(),
            format!("expected 'text' or 'json', got '{other}'"),
        )),
    }
}

/// Validate a Telegram bot username, stripping a leading `@`.
///
/// Telegram usernames are 5-32 characters of ASCII letters, digits and
/// underscores.
fn validate_bot_username(value: &str, var_name: &str) -> Result<String, ConfigError> {
    let username = value.trim().trim_start_matches('@');
    if !(5..=32).contains(&username.len()) {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must be 5-32 characters".to_string(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "may only contain letters, digits and underscores".to_string(),
        ));
    }
    let lower = username.to_lowercase();
    if PLACEHOLDER_USERNAMES.contains(&lower.as_str()) {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("'{username}' is a placeholder"),
        ));
    }
    Ok(username.to_string())
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

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real tokens have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated token."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_telegram_defaults() {
        let config =
            StorefrontConfig::from_lookup(lookup(&[("TELEGRAM_BOT_USERNAME", "@presto_pizza_bot")]))
                .unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.all_categories_label, "Barchasi");
        assert_eq!(config.currency, CurrencyCode::UZS);
        assert!(!config.log_json);
        assert!(config.catalog_path.is_none());
        assert_eq!(config.session_idle, Duration::from_secs(3600));
        assert!(matches!(
            &config.submission.channel,
            SubmissionChannel::Telegram { bot_username } if bot_username == "presto_pizza_bot"
        ));
        assert!(!config.submission.require_phone);
        assert_eq!(config.submission.phone_policy(), PhonePolicy::NotRequired);
        assert_eq!(config.submission.timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_telegram_requires_bot_username() {
        let result = StorefrontConfig::from_lookup(lookup(&[]));
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(key)) if key == "TELEGRAM_BOT_USERNAME"));
    }

    #[test]
    fn test_telegram_rejects_placeholder_username() {
        let result =
            StorefrontConfig::from_lookup(lookup(&[("TELEGRAM_BOT_USERNAME", "your_bot_username")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_telegram_rejects_bad_characters() {
        assert!(validate_bot_username("presto-bot", "X").is_err());
        assert!(validate_bot_username("abc", "X").is_err());
        assert_eq!(validate_bot_username(" @presto_bot ", "X").unwrap(), "presto_bot");
    }

    #[test]
    fn test_telegram_accepts_names_containing_placeholder_words() {
        assert_eq!(validate_bot_username("TodoPizzaBot", "X").unwrap(), "TodoPizzaBot");
        assert!(validate_bot_username("insert_pizza_bot", "X").is_ok());
        assert!(validate_bot_username("example_cafe_bot", "X").is_ok());
        assert!(validate_bot_username("@Your_Bot_Username", "X").is_err());
    }

    #[test]
    fn test_http_submitter_requires_phone_by_default() {
        let config = StorefrontConfig::from_lookup(lookup(&[
            ("PRESTO_SUBMITTER", "http"),
            ("ORDER_ENDPOINT_URL", "https://orders.example.test/api/orders"),
        ]))
        .unwrap();

        let SubmissionChannel::Http(endpoint) = &config.submission.channel else {
            panic!("expected http channel");
        };
        assert_eq!(endpoint.url.path(), "/api/orders");
        assert!(endpoint.token.is_none());
        assert!(config.submission.require_phone);
        assert_eq!(
            config.submission.phone_policy(),
            PhonePolicy::Required(PhoneRule::default())
        );
    }

    #[test]
    fn test_require_phone_override() {
        let config = StorefrontConfig::from_lookup(lookup(&[
            ("TELEGRAM_BOT_USERNAME", "presto_pizza_bot"),
            ("PRESTO_REQUIRE_PHONE", "yes"),
            ("PRESTO_PHONE_PREFIX", "1"),
            ("PRESTO_PHONE_DIGITS", "11"),
        ]))
        .unwrap();
        assert_eq!(
            config.submission.phone_policy(),
            PhonePolicy::Required(PhoneRule {
                country_prefix: "1".to_string(),
                digits: 11
            })
        );
    }

    #[test]
    fn test_invalid_values() {
        let base = [("TELEGRAM_BOT_USERNAME", "presto_pizza_bot")];
        for (key, value) in [
            ("PRESTO_PORT", "not-a-port"),
            ("PRESTO_HOST", "localhost:80"),
            ("PRESTO_REQUIRE_PHONE", "maybe"),
            ("PRESTO_PHONE_PREFIX", "+998"),
            ("PRESTO_PHONE_DIGITS", "3"),
            ("PRESTO_SUBMIT_TIMEOUT_SECS", "0"),
            ("PRESTO_SUBMITTER", "carrier-pigeon"),
            ("PRESTO_CURRENCY", "btc"),
            ("PRESTO_LOG_FORMAT", "xml"),
            ("PRESTO_SESSION_IDLE_MINUTES", "0"),
        ] {
            let mut vars = base.to_vec();
            vars.push((key, value));
            let result = StorefrontConfig::from_lookup(lookup(&vars));
            assert!(
                matches!(result, Err(ConfigError::InvalidEnvVar(ref k, _)) if k == key),
                "{key}={value} should be rejected, got {result:?}"
            );
        }
    }

    #[test]
    fn test_http_rejects_invalid_url() {
        let result = StorefrontConfig::from_lookup(lookup(&[
            ("PRESTO_SUBMITTER", "http"),
            ("ORDER_ENDPOINT_URL", "not a url"),
        ]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_http_rejects_weak_token() {
        let result = StorefrontConfig::from_lookup(lookup(&[
            ("PRESTO_SUBMITTER", "http"),
            ("ORDER_ENDPOINT_URL", "https://orders.test/api"),
            ("ORDER_ENDPOINT_TOKEN", "changeme123"),
        ]));
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_endpoint_debug_redacts_token() {
        let endpoint = HttpEndpointConfig {
            url: Url::parse("https://orders.test/api").unwrap(),
            token: Some(SecretString::from("super_secret_token_value")),
        };
        let debug_output = format!("{endpoint:?}");
        assert!(debug_output.contains("orders.test"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_token_value"));
    }
}
