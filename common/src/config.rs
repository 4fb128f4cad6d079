//! Application configuration.
//!
//! Settings are resolved once at startup from the process environment and an
//! optional `.env` file. Names are matched case-insensitively, the process
//! environment wins over the file, and the file wins over the defaults.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::errors::{AppError, AppResult};

/// Default `.env` file location, relative to the working directory.
pub const DEFAULT_ENV_FILE: &str = ".env";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_JWT_ALGORITHM: &str = "HS256";
const DEFAULT_TOKEN_EXPIRE_MINUTES: u32 = 30;

/// Immutable process configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Interface the HTTP server binds to.
    pub host: String,
    /// Port the HTTP server binds to.
    pub api_port: u16,
    /// Debug mode (verbose logging).
    pub debug: bool,

    /// Supabase project URL.
    pub supabase_url: Option<String>,
    /// Supabase API key.
    pub supabase_key: Option<String>,

    /// Secret used to sign access tokens.
    pub jwt_secret: Option<String>,
    /// Access token signing algorithm.
    pub jwt_algorithm: String,
    /// Access token lifetime in minutes.
    pub access_token_expire_minutes: u32,

    /// Raw PostgreSQL connection string.
    pub database_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            api_port: DEFAULT_PORT,
            debug: true,
            supabase_url: None,
            supabase_key: None,
            jwt_secret: None,
            jwt_algorithm: DEFAULT_JWT_ALGORITHM.to_string(),
            access_token_expire_minutes: DEFAULT_TOKEN_EXPIRE_MINUTES,
            database_url: None,
        }
    }
}

impl AppConfig {
    /// Loads the configuration from the process environment and `./.env`.
    pub fn load() -> AppResult<Self> {
        Self::load_from(DEFAULT_ENV_FILE)
    }

    /// Loads the configuration from the process environment and the given env file.
    ///
    /// A missing env file is not an error.
    pub fn load_from(env_file: impl AsRef<Path>) -> AppResult<Self> {
        let file_vars = read_env_file(env_file.as_ref())?;
        Self::from_sources(std::env::vars(), file_vars)
    }

    /// Resolves the configuration from explicit sources.
    ///
    /// `env` takes precedence over `file`; both are matched case-insensitively.
    pub fn from_sources<E, F>(env: E, file: F) -> AppResult<Self>
    where
        E: IntoIterator<Item = (String, String)>,
        F: IntoIterator<Item = (String, String)>,
    {
        let mut vars: HashMap<String, String> = HashMap::new();
        for (key, value) in file {
            vars.insert(key.to_lowercase(), value);
        }
        for (key, value) in env {
            vars.insert(key.to_lowercase(), value);
        }

        let source = Source { vars };
        let defaults = Self::default();

        Ok(Self {
            host: source.string("host").unwrap_or(defaults.host),
            api_port: source.parse("api_port")?.unwrap_or(defaults.api_port),
            debug: source.boolean("debug")?.unwrap_or(defaults.debug),
            supabase_url: source.string("supabase_url"),
            supabase_key: source.string("supabase_key"),
            jwt_secret: source.string("jwt_secret"),
            jwt_algorithm: source
                .string("jwt_algorithm")
                .unwrap_or(defaults.jwt_algorithm),
            access_token_expire_minutes: source
                .parse("access_token_expire_minutes")?
                .unwrap_or(defaults.access_token_expire_minutes),
            database_url: source.string("database_url"),
        })
    }

    /// Address the HTTP server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.api_port)
    }

    /// Default tracing filter for this configuration.
    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }

    /// Whether both Supabase settings are present.
    pub fn has_supabase(&self) -> bool {
        self.supabase_url.is_some() && self.supabase_key.is_some()
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("api_port", &self.api_port)
            .field("debug", &self.debug)
            .field("supabase_url", &self.supabase_url)
            .field("supabase_key", &redact(&self.supabase_key))
            .field("jwt_secret", &redact(&self.jwt_secret))
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field(
                "access_token_expire_minutes",
                &self.access_token_expire_minutes,
            )
            .field("database_url", &redact(&self.database_url))
            .finish()
    }
}

fn redact(value: &Option<String>) -> Option<&'static str> {
    value.as_ref().map(|_| "***")
}

/// Reads `KEY=value` pairs from an env file without touching the process environment.
fn read_env_file(path: &Path) -> AppResult<Vec<(String, String)>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let iter = dotenvy::from_path_iter(path).map_err(|e| {
        AppError::Configuration(format!("failed to read {}: {}", path.display(), e))
    })?;

    iter.map(|item| {
        item.map_err(|e| {
            AppError::Configuration(format!("failed to parse {}: {}", path.display(), e))
        })
    })
    .collect()
}

/// Lower-cased view over the merged sources.
struct Source {
    vars: HashMap<String, String>,
}

impl Source {
    /// Non-empty string value, trimmed.
    fn string(&self, name: &str) -> Option<String> {
        self.vars
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(String::from)
    }

    fn parse<T: std::str::FromStr>(&self, name: &str) -> AppResult<Option<T>> {
        match self.string(name) {
            Some(raw) => raw.parse().map(Some).map_err(|_| {
                AppError::Configuration(format!("invalid value for {}: {:?}", name, raw))
            }),
            None => Ok(None),
        }
    }

    fn boolean(&self, name: &str) -> AppResult<Option<bool>> {
        let Some(raw) = self.string(name) else {
            return Ok(None);
        };
        match raw.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" | "y" | "t" => Ok(Some(true)),
            "0" | "false" | "no" | "off" | "n" | "f" => Ok(Some(false)),
            _ => Err(AppError::Configuration(format!(
                "invalid boolean for {}: {:?}",
                name, raw
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = AppConfig::from_sources(Vec::new(), Vec::new()).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.api_port, 8000);
        assert!(config.debug);
        assert_eq!(config.jwt_algorithm, "HS256");
        assert_eq!(config.access_token_expire_minutes, 30);
        assert!(config.supabase_url.is_none());
        assert!(!config.has_supabase());
    }

    #[test]
    fn test_names_are_case_insensitive() {
        let env = pairs(&[
            ("SUPABASE_URL", "https://demo.supabase.co"),
            ("Supabase_Key", "anon-key"),
            ("api_port", "9000"),
        ]);
        let config = AppConfig::from_sources(env, Vec::new()).unwrap();
        assert_eq!(
            config.supabase_url.as_deref(),
            Some("https://demo.supabase.co")
        );
        assert_eq!(config.supabase_key.as_deref(), Some("anon-key"));
        assert_eq!(config.api_port, 9000);
        assert!(config.has_supabase());
    }

    #[test]
    fn test_environment_overrides_env_file() {
        let env = pairs(&[("DEBUG", "false")]);
        let file = pairs(&[("debug", "true"), ("JWT_ALGORITHM", "HS512")]);
        let config = AppConfig::from_sources(env, file).unwrap();
        assert!(!config.debug);
        assert_eq!(config.jwt_algorithm, "HS512");
        assert_eq!(config.log_filter(), "info");
    }

    #[test]
    fn test_empty_values_are_unset() {
        let env = pairs(&[("SUPABASE_URL", "  "), ("SUPABASE_KEY", "")]);
        let config = AppConfig::from_sources(env, Vec::new()).unwrap();
        assert!(config.supabase_url.is_none());
        assert!(config.supabase_key.is_none());
    }

    #[test]
    fn test_boolean_spellings() {
        for raw in ["1", "TRUE", "yes", "On"] {
            let config = AppConfig::from_sources(pairs(&[("DEBUG", raw)]), Vec::new()).unwrap();
            assert!(config.debug, "{raw} should be true");
        }
        for raw in ["0", "False", "no", "OFF"] {
            let config = AppConfig::from_sources(pairs(&[("DEBUG", raw)]), Vec::new()).unwrap();
            assert!(!config.debug, "{raw} should be false");
        }
    }

    #[test]
    fn test_invalid_port_is_a_configuration_error() {
        let err = AppConfig::from_sources(pairs(&[("API_PORT", "abc")]), Vec::new()).unwrap_err();
        assert!(matches!(err, AppError::Configuration(msg) if msg.contains("api_port")));
    }

    #[test]
    fn test_debug_output_redacts_secrets() {
        let env = pairs(&[
            ("SUPABASE_KEY", "very-secret-key"),
            ("JWT_SECRET", "jwt-secret"),
            ("DATABASE_URL", "postgres://user:pw@host/db"),
        ]);
        let config = AppConfig::from_sources(env, Vec::new()).unwrap();
        let output = format!("{:?}", config);
        assert!(!output.contains("very-secret-key"));
        assert!(!output.contains("jwt-secret"));
        assert!(!output.contains("user:pw"));
    }

    #[test]
    fn test_missing_env_file_is_ignored() {
        let vars = read_env_file(Path::new("definitely/not/here/.env")).unwrap();
        assert!(vars.is_empty());
    }

    #[test]
    fn test_bind_address() {
        let config = AppConfig::from_sources(pairs(&[("HOST", "127.0.0.1")]), Vec::new()).unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:8000");
    }
}
