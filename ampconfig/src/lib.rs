//! # ampcat Configuration Module
//!
//! This module provides configuration management for the ampcat catalog
//! engine, including:
//! - Loading configuration from YAML files
//! - Merging with embedded default configuration
//! - Environment variable overrides
//! - Type-safe getters with defaults for configuration values
//!
//! Construction is explicit: the loaded [`Config`] is passed by reference
//! to whoever needs it, there is no process-wide singleton.
//!
//! ## Usage
//!
//! ```no_run
//! use ampconfig::Config;
//!
//! let config = Config::load("")?;
//!
//! let db_path = config.get_database_path()?;
//! let base_url = config.get_remote_base_url();
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Result};
use dirs::home_dir;
use serde_yaml::Value;
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::info;

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("ampcat.yaml");

const ENV_CONFIG_DIR: &str = "AMPCAT_CONFIG";
const ENV_PREFIX: &str = "AMPCAT_CONFIG__";

// Default values for configuration
const DEFAULT_BASE_URL: &str = "https://amp.dascene.net";
const DEFAULT_USER_AGENT: &str = "ampcat/0.1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DATABASE_FILE: &str = "catalog.db";
const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";

/// Configuration manager for ampcat
///
/// The configuration directory is searched in the following order:
/// 1. The provided `directory` parameter if not empty
/// 2. The `AMPCAT_CONFIG` environment variable
/// 3. `.ampcat` in the current directory
/// 4. `.ampcat` in the user's home directory
///
/// The external `config.yaml` is merged over the embedded defaults, then
/// `AMPCAT_CONFIG__SECTION__KEY` environment variables override single
/// values.
#[derive(Debug, Clone)]
pub struct Config {
    config_dir: PathBuf,
    data: Value,
}

impl Config {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> PathBuf {
        // 1. Répertoire fourni par l'appelant
        if !directory.is_empty() {
            return PathBuf::from(directory);
        }

        // 2. Variable d'environnement
        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return PathBuf::from(env_path);
        }

        // 3. Répertoire courant
        if Path::new(".ampcat").exists() {
            return PathBuf::from(".ampcat");
        }

        // 4. Répertoire home
        if let Some(home) = home_dir() {
            let home_config = home.join(".ampcat");
            if home_config.exists() {
                return home_config;
            }
        }

        PathBuf::from(".ampcat")
    }

    /// Validates and prepares a config directory
    fn validate_config_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        if !path.is_dir() {
            return Err(anyhow!(
                "configuration path {} is not a directory",
                path.display()
            ));
        }
        Ok(())
    }

    /// Loads the configuration
    ///
    /// This method:
    /// 1. Determines and validates the configuration directory
    /// 2. Loads the default embedded configuration
    /// 3. Merges it with the external `config.yaml` file if present
    /// 4. Applies environment variable overrides
    ///
    /// # Arguments
    ///
    /// * `directory` - The directory containing the `config.yaml` file,
    ///   or empty to use the search order documented on [`Config`]
    pub fn load(directory: &str) -> Result<Self> {
        let config_dir = Self::find_config_dir(directory);
        Self::validate_config_dir(&config_dir)?;
        info!(config_dir = %config_dir.display(), "Using config directory");

        let config_file = config_dir.join("config.yaml");

        // Charger la configuration par défaut
        let mut data: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        // Merger avec le fichier externe s'il existe
        match fs::read(&config_file) {
            Ok(bytes) => {
                info!(config_file = %config_file.display(), "Loaded config file");
                let external: Value = serde_yaml::from_slice(&bytes)?;
                merge_yaml(&mut data, &external);
            }
            Err(_) => {
                info!(
                    config_file = %config_file.display(),
                    "Config file not found, using default embedded config"
                );
            }
        }

        // Appliquer les overrides depuis les variables d'environnement
        Self::apply_env_overrides(&mut data);

        Ok(Self { config_dir, data })
    }

    /// Applies `AMPCAT_CONFIG__SECTION__KEY=value` overrides
    fn apply_env_overrides(data: &mut Value) {
        for (key, value) in env::vars() {
            let Some(path) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let segments: Vec<String> = path.split("__").map(|s| s.to_lowercase()).collect();
            if segments.iter().any(|s| s.is_empty()) {
                continue;
            }
            info!(key = %key, "Applying config override from environment");
            let parsed: Value =
                serde_yaml::from_str(&value).unwrap_or_else(|_| Value::String(value.clone()));
            set_path(data, &segments, parsed);
        }
    }

    /// Returns the configuration directory in use
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Looks up a value by dotted path (ex: `"remote.base_url"`)
    pub fn get_value(&self, path: &str) -> Option<&Value> {
        let mut current = &self.data;
        for segment in path.split('.') {
            current = current.get(segment)?;
        }
        Some(current)
    }

    fn get_str(&self, path: &str, default: &str) -> String {
        match self.get_value(path) {
            Some(Value::String(s)) => s.clone(),
            _ => default.to_string(),
        }
    }

    /// Path of the SQLite database file
    ///
    /// A relative `database.path` is resolved against the configuration
    /// directory.
    pub fn get_database_path(&self) -> Result<PathBuf> {
        let raw = self.get_str("database.path", DEFAULT_DATABASE_FILE);
        let path = PathBuf::from(raw);
        if path.is_absolute() {
            Ok(path)
        } else {
            Ok(self.config_dir.join(path))
        }
    }

    /// Base URL of the remote catalogue service
    pub fn get_remote_base_url(&self) -> String {
        let url = self.get_str("remote.base_url", DEFAULT_BASE_URL);
        url.trim_end_matches('/').to_string()
    }

    /// User-Agent header sent with remote requests
    pub fn get_user_agent(&self) -> String {
        self.get_str("remote.user_agent", DEFAULT_USER_AGENT)
    }

    /// Timeout applied to each remote request
    pub fn get_http_timeout(&self) -> Duration {
        let secs = match self.get_value("remote.timeout_secs") {
            Some(Value::Number(n)) => n.as_u64().unwrap_or(DEFAULT_TIMEOUT_SECS),
            _ => DEFAULT_TIMEOUT_SECS,
        };
        Duration::from_secs(secs)
    }

    /// Minimum log level requested by the configuration
    pub fn get_log_min_level(&self) -> String {
        self.get_str("log.min_level", DEFAULT_LOG_MIN_LEVEL)
    }
}

/// Merges `other` over `base`, mapping by mapping
fn merge_yaml(base: &mut Value, other: &Value) {
    match (base, other) {
        (Value::Mapping(base_map), Value::Mapping(other_map)) => {
            for (key, value) in other_map {
                match base_map.get_mut(key) {
                    Some(existing) => merge_yaml(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, other) => *base = other.clone(),
    }
}

/// Sets a value at a segment path, creating intermediate mappings
fn set_path(data: &mut Value, segments: &[String], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    if !matches!(data, Value::Mapping(_)) {
        *data = Value::Mapping(serde_yaml::Mapping::new());
    }
    let Value::Mapping(map) = data else {
        unreachable!()
    };
    let key = Value::String(first.clone());
    if rest.is_empty() {
        map.insert(key, value);
    } else {
        let entry = map
            .entry(key)
            .or_insert_with(|| Value::Mapping(serde_yaml::Mapping::new()));
        set_path(entry, rest, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn load_from(dir: &TempDir) -> Config {
        Config::load(dir.path().to_str().unwrap()).unwrap()
    }

    #[test]
    fn test_defaults_without_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_from(&dir);

        assert_eq!(config.get_remote_base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.get_user_agent(), DEFAULT_USER_AGENT);
        assert_eq!(
            config.get_http_timeout(),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        );
        assert_eq!(config.get_log_min_level(), "INFO");
    }

    #[test]
    fn test_database_path_is_resolved_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_from(&dir);

        let db_path = config.get_database_path().unwrap();
        assert_eq!(db_path, dir.path().join(DEFAULT_DATABASE_FILE));
    }

    #[test]
    fn test_external_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.yaml"),
            "remote:\n  base_url: \"http://localhost:8080/\"\n  timeout_secs: 5\n",
        )
        .unwrap();
        let config = load_from(&dir);

        // Le slash final est retiré, les autres clés gardent leur défaut
        assert_eq!(config.get_remote_base_url(), "http://localhost:8080");
        assert_eq!(config.get_http_timeout(), Duration::from_secs(5));
        assert_eq!(config.get_user_agent(), DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_merge_yaml_is_recursive() {
        let mut base: Value =
            serde_yaml::from_str("a:\n  x: 1\n  y: 2\nb: keep\n").unwrap();
        let other: Value = serde_yaml::from_str("a:\n  y: 3\n").unwrap();
        merge_yaml(&mut base, &other);

        assert_eq!(base["a"]["x"], Value::from(1));
        assert_eq!(base["a"]["y"], Value::from(3));
        assert_eq!(base["b"], Value::from("keep"));
    }

    #[test]
    fn test_set_path_creates_intermediate_mappings() {
        let mut data = Value::Null;
        set_path(
            &mut data,
            &["remote".to_string(), "base_url".to_string()],
            Value::from("http://example.org"),
        );
        assert_eq!(data["remote"]["base_url"], Value::from("http://example.org"));
    }
}
