use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const APP_DIR_NAME: &str = "typeahead";
const CONFIG_FILE_NAME: &str = "config.toml";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub show_stale_errors: bool,
    pub select_error_rows: bool,
    pub max_results: u16,
    pub lookup_latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
    pub log_level: String,
    #[serde(skip)]
    pub config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            placeholder: Some("Search...".to_string()),
            show_stale_errors: false,
            select_error_rows: true,
            max_results: 20,
            lookup_latency_ms: 0,
            catalog_path: None,
            log_level: "info".to_string(),
            config_path: stable_app_data_dir().join(CONFIG_FILE_NAME),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(error) => write!(f, "config io error: {error}"),
            Self::Parse(error) => write!(f, "config parse error: {error}"),
            Self::Invalid(error) => write!(f, "invalid config: {error}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Per-user data directory. `TYPEAHEAD_HOME` replaces the platform base.
pub fn stable_app_data_dir() -> PathBuf {
    let base = std::env::var_os("TYPEAHEAD_HOME")
        .map(PathBuf::from)
        .or_else(platform_data_dir)
        .unwrap_or_else(std::env::temp_dir);
    base.join(APP_DIR_NAME)
}

#[cfg(target_os = "windows")]
fn platform_data_dir() -> Option<PathBuf> {
    std::env::var_os("APPDATA").map(PathBuf::from)
}

#[cfg(not(target_os = "windows"))]
fn platform_data_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_DATA_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".local/share")))
}

pub fn default_config_path() -> PathBuf {
    stable_app_data_dir().join(CONFIG_FILE_NAME)
}

pub fn validate(cfg: &Config) -> Result<(), String> {
    if cfg.max_results < 5 || cfg.max_results > 100 {
        return Err("max_results out of range".into());
    }

    if cfg.lookup_latency_ms > 10_000 {
        return Err("lookup_latency_ms must not exceed 10000".into());
    }

    if !LOG_LEVELS.contains(&cfg.log_level.as_str()) {
        return Err(format!("unknown log_level '{}'", cfg.log_level));
    }

    if cfg.config_path.as_os_str().is_empty() {
        return Err("config_path is required".into());
    }

    Ok(())
}

/// Reads the config at `path` (or the default location). A missing file yields
/// defaults bound to that path.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !config_path.exists() {
        return Ok(Config {
            config_path,
            ..Config::default()
        });
    }

    let raw = std::fs::read_to_string(&config_path)?;
    let mut cfg = parse(&raw, &config_path)?;
    cfg.config_path = config_path;
    validate(&cfg).map_err(ConfigError::Invalid)?;
    Ok(cfg)
}

pub fn save(cfg: &Config) -> Result<(), ConfigError> {
    validate(cfg).map_err(ConfigError::Invalid)?;
    if let Some(parent) = cfg.config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let raw = if is_json(&cfg.config_path) {
        serde_json::to_string_pretty(cfg).map_err(|e| ConfigError::Parse(e.to_string()))?
    } else {
        toml::to_string_pretty(cfg).map_err(|e| ConfigError::Parse(e.to_string()))?
    };
    std::fs::write(&cfg.config_path, raw)?;
    Ok(())
}

fn parse(raw: &str, path: &Path) -> Result<Config, ConfigError> {
    if is_json(path) {
        json5::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    } else {
        toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json") || ext.eq_ignore_ascii_case("json5"))
        .unwrap_or(false)
}
