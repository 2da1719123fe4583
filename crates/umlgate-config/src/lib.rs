//! Configuration management for umlgate.
//!
//! Parses `umlgate.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! Settings are layered in this order, later layers winning:
//!
//! 1. Built-in defaults
//! 2. `umlgate.toml`
//! 3. Process environment (`PLANTUML_CONFIG_FILE`, `ALLOW_PLANTUML_INCLUDE`)
//! 4. CLI settings ([`CliSettings`])
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `engine.kroki_url`
//! - `engine.config_file`

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Environment variable naming a file of config lines passed to every render.
pub const CONFIG_FILE_ENV: &str = "PLANTUML_CONFIG_FILE";

/// Environment variable enabling the `!include` directive.
pub const ALLOW_INCLUDE_ENV: &str = "ALLOW_PLANTUML_INCLUDE";

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "umlgate.toml";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override Kroki URL for diagram rendering.
    pub kroki_url: Option<String>,
    /// Override watermark enabled flag.
    pub watermark_enabled: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Render engine configuration (paths are relative strings from TOML).
    engine: EngineConfigRaw,
    /// Watermark configuration.
    pub watermark: WatermarkConfig,

    /// Resolved engine configuration (set after loading).
    #[serde(skip)]
    pub engine_resolved: EngineConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
        }
    }
}

/// Raw engine configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct EngineConfigRaw {
    kroki_url: Option<String>,
    timeout_secs: Option<u64>,
    config_file: Option<String>,
    allow_include: Option<bool>,
    include_dirs: Option<Vec<String>>,
}

/// Resolved render engine configuration with absolute paths.
#[derive(Debug)]
pub struct EngineConfig {
    /// Kroki server URL used to render diagrams.
    pub kroki_url: String,
    /// HTTP timeout for a single render call.
    pub timeout: Duration,
    /// File of config lines handed to every render (read lazily, once).
    pub config_file: Option<PathBuf>,
    /// Whether `!include` directives are resolved locally.
    pub allow_include: bool,
    /// Directories searched for `!include` files.
    pub include_dirs: Vec<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kroki_url: "https://kroki.io".to_owned(),
            timeout: Duration::from_secs(30),
            config_file: None,
            allow_include: false,
            include_dirs: Vec::new(),
        }
    }
}

/// Watermark configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WatermarkConfig {
    /// Whether SVG output gets the test-server watermark.
    pub enabled: bool,
    /// URL namespace under which responses are served without watermark.
    pub public_segment: String,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            public_segment: "iunderstandiusetestpublicplantuml".to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`engine.kroki_url`").
        field: String,
        /// Error message (e.g., "${`KROKI_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `umlgate.toml` in current directory and parents.
    ///
    /// Environment overrides are applied after the file, CLI settings last.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the final configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        config.apply_env_overrides(|name| std::env::var(name).ok());

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply `PLANTUML_CONFIG_FILE` and `ALLOW_PLANTUML_INCLUDE` overrides.
    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup(CONFIG_FILE_ENV).filter(|p| !p.is_empty()) {
            self.engine_resolved.config_file = Some(PathBuf::from(path));
        }
        if let Some(flag) = lookup(ALLOW_INCLUDE_ENV) {
            self.engine_resolved.allow_include = flag.eq_ignore_ascii_case("true");
        }
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(kroki_url) = &settings.kroki_url {
            self.engine_resolved.kroki_url.clone_from(kroki_url);
        }
        if let Some(enabled) = settings.watermark_enabled {
            self.watermark.enabled = enabled;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            engine: EngineConfigRaw::default(),
            watermark: WatermarkConfig::default(),
            engine_resolved: EngineConfig {
                include_dirs: vec![base.to_path_buf()],
                ..EngineConfig::default()
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_engine()?;
        self.validate_watermark()?;
        Ok(())
    }

    /// Validate server configuration.
    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Validate engine configuration.
    fn validate_engine(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.engine_resolved.kroki_url, "engine.kroki_url")?;
        require_http_url(&self.engine_resolved.kroki_url, "engine.kroki_url")?;

        if self.engine_resolved.timeout.is_zero() {
            return Err(ConfigError::Validation(
                "engine.timeout_secs must be greater than 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Validate watermark configuration.
    fn validate_watermark(&self) -> Result<(), ConfigError> {
        let segment = &self.watermark.public_segment;
        require_non_empty(segment, "watermark.public_segment")?;
        if segment.contains('/') {
            return Err(ConfigError::Validation(
                "watermark.public_segment must be a single path segment".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        expand::expand_field(&mut self.engine.kroki_url, "engine.kroki_url")?;
        expand::expand_field(&mut self.engine.config_file, "engine.config_file")?;

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let defaults = EngineConfig::default();
        let include_dirs = match &self.engine.include_dirs {
            Some(dirs) => dirs.iter().map(|d| config_dir.join(d)).collect(),
            None => vec![config_dir.to_path_buf()],
        };

        self.engine_resolved = EngineConfig {
            kroki_url: self
                .engine
                .kroki_url
                .clone()
                .unwrap_or(defaults.kroki_url),
            timeout: self
                .engine
                .timeout_secs
                .map_or(defaults.timeout, Duration::from_secs),
            config_file: self
                .engine
                .config_file
                .as_deref()
                .filter(|f| !f.is_empty())
                .map(|f| config_dir.join(f)),
            allow_include: self.engine.allow_include.unwrap_or(false),
            include_dirs,
        };
    }
}
