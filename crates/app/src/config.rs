//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPTAX_BASE_URL` - Public URL for the application
//! - `SHOPTAX_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//! - `BACKEND_API_URL` - Backend-as-a-service REST base URL
//! - `BACKEND_API_KEY` - Backend API key
//!
//! ## Optional
//! - `SHOPTAX_HOST` - Bind address (default: 127.0.0.1)
//! - `SHOPTAX_PORT` - Listen port (default: 3000)
//! - `SHOPTAX_REQUIRED_ROLE` - Restrict this deployment to one role
//!   (`admin` or `shop_owner`; default: both roles served)
//! - `BACKEND_STORAGE_URL` - Document store base URL (default: `<BACKEND_API_URL>/storage`)
//! - `GEOCODER_URL` - Geocoding endpoint (default: Nominatim public instance)
//! - `GEOCODER_COUNTRY_CODES` - Country-code allowlist for geocoding
//! - `MAP_TILE_URL` - Tile-server URL template (default: OSM)
//! - `MAP_ATTRIBUTION` - Attribution string shown per tile-provider terms
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use shoptax_core::Role;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Default geocoding endpoint (Nominatim public instance).
const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Default country-code allowlist, matching where registration is offered.
const DEFAULT_COUNTRY_CODES: &str =
    "pk,in,us,gb,ca,au,de,fr,jp,cn,br,mx,za,ng,eg,tr,sa,ae,bd,id";

/// Default tile-server URL template.
const DEFAULT_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Default attribution, required by the OSM tile usage policy.
const DEFAULT_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors";

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

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the application
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// When set, this deployment serves a single role and the session
    /// resolver denies every other role (fail closed).
    pub required_role: Option<Role>,
    /// Backend-as-a-service configuration
    pub backend: BackendConfig,
    /// Geocoding endpoint configuration
    pub geocoder: GeocoderConfig,
    /// Map tile provider configuration
    pub map: MapConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Backend-as-a-service configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct BackendConfig {
    /// REST base URL for identity and record operations
    pub api_url: String,
    /// Base URL for document uploads
    pub storage_url: String,
    /// API key sent with every request
    pub api_key: SecretString,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("api_url", &self.api_url)
            .field("storage_url", &self.storage_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Geocoding endpoint configuration.
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Search endpoint URL
    pub url: String,
    /// Comma-separated country-code allowlist sent with every query
    pub country_codes: String,
}

/// Map tile provider configuration.
#[derive(Debug, Clone)]
pub struct MapConfig {
    /// Tile-server URL template (`{s}`, `{z}`, `{x}`, `{y}` placeholders)
    pub tile_url: String,
    /// Attribution string, displayed per provider terms
    pub attribution: String,
}

impl AppConfig {
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

        let host = get_env_or_default("SHOPTAX_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SHOPTAX_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SHOPTAX_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SHOPTAX_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("SHOPTAX_BASE_URL")?;
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("SHOPTAX_BASE_URL".to_string(), e.to_string())
        })?;
        let session_secret = get_validated_secret("SHOPTAX_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "SHOPTAX_SESSION_SECRET")?;

        let required_role = match get_optional_env("SHOPTAX_REQUIRED_ROLE") {
            Some(raw) => Some(raw.parse::<Role>().map_err(|e| {
                ConfigError::InvalidEnvVar("SHOPTAX_REQUIRED_ROLE".to_string(), e)
            })?),
            None => None,
        };

        let backend = BackendConfig::from_env()?;
        let geocoder = GeocoderConfig::from_env();
        let map = MapConfig::from_env();
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            host,
            port,
            base_url,
            session_secret,
            required_role,
            backend,
            geocoder,
            map,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl BackendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_url = get_required_env("BACKEND_API_URL")?;
        let storage_url =
            get_env_or_default("BACKEND_STORAGE_URL", &format!("{api_url}/storage"));
        Ok(Self {
            api_url,
            storage_url,
            api_key: get_validated_secret("BACKEND_API_KEY")?,
        })
    }
}

impl GeocoderConfig {
    fn from_env() -> Self {
        Self {
            url: get_env_or_default("GEOCODER_URL", DEFAULT_GEOCODER_URL),
            country_codes: get_env_or_default("GEOCODER_COUNTRY_CODES", DEFAULT_COUNTRY_CODES),
        }
    }
}

impl MapConfig {
    fn from_env() -> Self {
        Self {
            tile_url: get_env_or_default("MAP_TILE_URL", DEFAULT_TILE_URL),
            attribution: get_env_or_default("MAP_ATTRIBUTION", DEFAULT_ATTRIBUTION),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
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
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
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

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_degenerate() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_high() {
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_session_secret_too_short() {
        let secret = SecretString::from("short");
        assert!(validate_session_secret(&secret, "TEST_SESSION").is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = AppConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            required_role: None,
            backend: BackendConfig {
                api_url: "http://localhost:9099".to_string(),
                storage_url: "http://localhost:9099/storage".to_string(),
                api_key: SecretString::from("key"),
            },
            geocoder: GeocoderConfig::from_env(),
            map: MapConfig::from_env(),
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_backend_config_debug_redacts_api_key() {
        let config = BackendConfig {
            api_url: "https://backend.example.net".to_string(),
            storage_url: "https://backend.example.net/storage".to_string(),
            api_key: SecretString::from("super_secret_api_key"),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("backend.example.net"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_api_key"));
    }
}
