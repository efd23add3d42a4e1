//! Configuration loader using figment.
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Built-in defaults
//! 2. Main config file (`vkbot.toml` or `config.toml`, first one found)
//! 3. Profile file next to it (`vkbot.{profile}.toml`)
//! 4. Environment variables (`VKBOT_*`)
//! 5. Programmatic overrides
//!
//! # Environment Variable Mapping
//!
//! Environment variables use the `VKBOT_` prefix with `__` as separator:
//!
//! - `VKBOT_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `VKBOT_API__ACCESS_TOKEN=xxx` → `api.access_token = "xxx"`
//! - `VKBOT_DISPATCH__TIMEOUT_MS=5000` → `dispatch.timeout_ms = 5000`
//!
//! `VKBOT_API__API_VERSION` and `VKBOT_API__ACCESS_TOKEN` are always taken
//! as strings, so `5.200` stays `"5.200"` instead of becoming a float.
//!
//! # Example
//!
//! ```rust,ignore
//! use vkbot_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .profile("production")
//!     .load()?;
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::BotConfig;

const ENV_PREFIX: &str = "VKBOT_";

/// Env keys (after the prefix) whose values are merged verbatim as strings.
const STRING_ENV_KEYS: &[&str] = &["api__api_version", "api__access_token"];
const PROFILE_VAR: &str = "VKBOT_PROFILE";
const BASE_NAMES: [&str; 2] = ["vkbot.toml", "config.toml"];

/// Configuration profile for environment-specific settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    /// Development profile (default).
    #[default]
    Development,
    /// Production profile.
    Production,
    /// Custom profile name.
    Custom(String),
}

impl Profile {
    /// Parses a profile name; `dev` and `prod` are accepted as short forms.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Returns the profile name as a string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Reads `VKBOT_PROFILE`, defaulting to [`Profile::Development`].
    pub fn from_env() -> Self {
        std::env::var(PROFILE_VAR)
            .map(|p| Self::parse(&p))
            .unwrap_or_default()
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration loader with figment-based multi-source support.
///
/// ```rust,ignore
/// let config = ConfigLoader::new()
///     .file("deploy/vkbot.toml")
///     .without_env()
///     .load()?;
/// ```
pub struct ConfigLoader {
    overrides: Figment,
    profile: Profile,
    search_paths: Vec<PathBuf>,
    load_env: bool,
    config_file: Option<PathBuf>,
}

impl fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigLoader")
            .field("profile", &self.profile)
            .field("search_paths", &self.search_paths)
            .field("load_env", &self.load_env)
            .field("config_file", &self.config_file)
            .finish_non_exhaustive()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader that searches the default locations and reads the environment.
    pub fn new() -> Self {
        Self {
            overrides: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    /// Sets the configuration profile.
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.profile = Profile::parse(profile.as_ref());
        self
    }

    /// Adds a search path for configuration files.
    ///
    /// Once any path is added, the default locations are no longer searched.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Loads exactly this file instead of searching.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enables loading environment variables (default: true).
    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges values on top of every other source.
    ///
    /// Accepts any serializable value, so partial overrides can be given as
    /// `serde_json::json!({"dispatch": {"timeout_ms": 50}})`.
    pub fn merge<T: Serialize>(mut self, values: T) -> Self {
        self.overrides = self.overrides.merge(Serialized::defaults(values));
        self
    }

    /// Loads and returns the configuration.
    ///
    /// The result is not validated; see [`validate_config`](super::validate_config).
    pub fn load(self) -> ConfigResult<BotConfig> {
        let profile = self.profile.clone();
        let config: BotConfig = self.build_figment()?.extract()?;

        debug!(
            profile = %profile,
            logging_level = %config.logging.level,
            "Configuration loaded"
        );

        Ok(config)
    }

    fn build_figment(self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(BotConfig::default()));

        match &self.config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound(path.clone()));
                }
                if path.extension().and_then(|e| e.to_str()) != Some("toml") {
                    return Err(ConfigError::UnsupportedFormat(path.clone()));
                }
                info!(path = %path.display(), "Loading configuration file");
                figment = figment.merge(Toml::file(path));
                figment = self.merge_profile_file(figment, path);
            }
            None => figment = self.load_config_files(figment),
        }

        if self.load_env {
            let mut ignored = vec!["profile"];
            ignored.extend_from_slice(STRING_ENV_KEYS);
            figment = figment.merge(Env::prefixed(ENV_PREFIX).ignore(&ignored).split("__"));
            figment = merge_string_env(figment);
        }

        Ok(figment.merge(self.overrides))
    }

    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }

        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd);
        }
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("vkbot"));
        }
        paths
    }

    /// Merges the first base file found, followed by its profile variant.
    fn load_config_files(&self, figment: Figment) -> Figment {
        for search_path in self.resolve_search_paths() {
            for base_name in BASE_NAMES {
                let base_path = search_path.join(base_name);
                if base_path.exists() {
                    info!(path = %base_path.display(), "Loading configuration file");
                    let figment = figment.merge(Toml::file(&base_path));
                    return self.merge_profile_file(figment, &base_path);
                }
            }
        }

        warn!("No configuration file found, using defaults");
        figment
    }

    /// `dir/vkbot.toml` → `dir/vkbot.{profile}.toml`, if present.
    fn merge_profile_file(&self, figment: Figment, base_path: &Path) -> Figment {
        let Some(stem) = base_path.file_stem().and_then(|s| s.to_str()) else {
            return figment;
        };
        let profile_path = base_path.with_file_name(format!("{stem}.{}.toml", self.profile));

        if profile_path.exists() {
            debug!(path = %profile_path.display(), "Loading profile-specific config");
            figment.merge(Toml::file(profile_path))
        } else {
            figment
        }
    }
}

/// Merges string-only variables without type sniffing.
fn merge_string_env(mut figment: Figment) -> Figment {
    for key in STRING_ENV_KEYS {
        let var = format!("{ENV_PREFIX}{}", key.to_uppercase());
        if let Ok(value) = std::env::var(&var) {
            figment = figment.merge(Serialized::default(&key.replace("__", "."), value));
        }
    }
    figment
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;
    use std::fs;

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_defaults_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigLoader::new()
            .search_path(dir.path())
            .without_env()
            .load()
            .unwrap();

        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.api.api_version, vkbot_transport::DEFAULT_API_VERSION);
        assert!(config.dispatch.timeout_ms.is_none());
    }

    #[test]
    fn test_main_file_then_profile() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "vkbot.toml",
            "[logging]\nlevel = \"debug\"\n[dispatch]\ntimeout_ms = 1000\n",
        );
        write(
            dir.path(),
            "vkbot.production.toml",
            "[logging]\nlevel = \"warn\"\n",
        );

        let dev = ConfigLoader::new()
            .search_path(dir.path())
            .profile("dev")
            .without_env()
            .load()
            .unwrap();
        assert_eq!(dev.logging.level, LogLevel::Debug);

        let prod = ConfigLoader::new()
            .search_path(dir.path())
            .profile("prod")
            .without_env()
            .load()
            .unwrap();
        assert_eq!(prod.logging.level, LogLevel::Warn);
        assert_eq!(prod.dispatch.timeout_ms, Some(1000));
    }

    #[test]
    fn test_config_toml_fallback() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "config.toml", "[api]\napi_version = \"5.131\"\n");

        let config = ConfigLoader::new()
            .search_path(dir.path())
            .without_env()
            .load()
            .unwrap();
        assert_eq!(config.api.api_version, "5.131");
    }

    #[test]
    fn test_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "bot.toml", "[api]\naccess_token = \"abc\"\n");

        let config = ConfigLoader::new()
            .file(dir.path().join("bot.toml"))
            .without_env()
            .load()
            .unwrap();
        assert_eq!(config.api.access_token.as_deref(), Some("abc"));

        let missing = ConfigLoader::new()
            .file(dir.path().join("missing.toml"))
            .without_env()
            .load();
        assert!(matches!(missing, Err(ConfigError::FileNotFound(_))));

        write(dir.path(), "bot.yaml", "api: {}\n");
        let yaml = ConfigLoader::new()
            .file(dir.path().join("bot.yaml"))
            .without_env()
            .load();
        assert!(matches!(yaml, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_invalid_value_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "vkbot.toml", "[logging]\nlevel = \"loud\"\n");

        let result = ConfigLoader::new()
            .search_path(dir.path())
            .without_env()
            .load();
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_merge_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "vkbot.toml",
            "[logging]\nlevel = \"debug\"\n[dispatch]\ntimeout_ms = 1000\n",
        );

        let config = ConfigLoader::new()
            .search_path(dir.path())
            .without_env()
            .merge(serde_json::json!({"dispatch": {"timeout_ms": 50}}))
            .load()
            .unwrap();
        assert_eq!(config.dispatch.timeout_ms, Some(50));
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "vkbot.toml", "[api]\napi_version = \"5.131\"\n");

        // SAFETY: every other loader test runs without env.
        unsafe {
            std::env::set_var("VKBOT_API__API_VERSION", "5.200");
            std::env::set_var("VKBOT_API__ACCESS_TOKEN", "123456");
            std::env::set_var("VKBOT_LOGGING__LEVEL", "warn");
        }
        let config = ConfigLoader::new()
            .search_path(dir.path())
            .with_env()
            .load();
        unsafe {
            std::env::remove_var("VKBOT_API__API_VERSION");
            std::env::remove_var("VKBOT_API__ACCESS_TOKEN");
            std::env::remove_var("VKBOT_LOGGING__LEVEL");
        }

        let config = config.unwrap();
        assert_eq!(config.api.api_version, "5.200");
        assert_eq!(config.api.access_token.as_deref(), Some("123456"));
        assert_eq!(config.logging.level, LogLevel::Warn);
    }

    #[test]
    fn test_profile_parse() {
        assert_eq!(Profile::parse("PROD"), Profile::Production);
        assert_eq!(Profile::parse("dev"), Profile::Development);
        assert_eq!(Profile::parse("staging").as_str(), "staging");
    }
}
