//! BinGo configuration and layered resolution.
//!
//! Configuration is a JSON object with four sections (`joern`, `analysis`,
//! `audit`, `reporting`). The first candidate file that exists wins; each
//! top-level key it supplies replaces the built-in default for that key.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::host::{Environment, FileSystem, OsFileSystem, SystemEnvironment};
use crate::joern::HeapSize;

/// Config file looked up in the current working directory
pub const CONFIG_FILE_NAME: &str = "bingo-config.json";

/// Directory name used under `~/.config/` and (hidden) under `~/`
pub const CONFIG_DIR_NAME: &str = "bingo";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub joern: JoernConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub reporting: ReportingConfig,
    /// Top-level keys BinGo does not interpret, carried through unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Joern runtime settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoernConfig {
    /// JVM heap size: "auto" or an explicit size such as "8G"
    #[serde(default = "default_max_heap_size")]
    pub max_heap_size: String,
    /// Whether to search conventional locations and PATH for Joern
    #[serde(default = "default_true")]
    pub auto_detect: bool,
    #[serde(default = "default_timeout_minutes")]
    pub timeout_minutes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Minimum number of CPG nodes for an analysis to be considered meaningful
    #[serde(default = "default_min_cpg_nodes")]
    pub min_cpg_nodes: u64,
    #[serde(default = "default_timeout_minutes")]
    pub timeout_minutes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_true")]
    pub strict_mode: bool,
    #[serde(default = "default_true")]
    pub require_all_5_checks: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportingConfig {
    #[serde(default = "default_true")]
    pub include_poc: bool,
    /// Lowest severity included in reports (low, medium, high, critical)
    #[serde(default = "default_severity_threshold")]
    pub severity_threshold: String,
}

fn default_max_heap_size() -> String {
    "auto".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_minutes() -> u64 {
    60
}

fn default_min_cpg_nodes() -> u64 {
    100
}

fn default_severity_threshold() -> String {
    "low".to_string()
}

impl Default for JoernConfig {
    fn default() -> Self {
        Self {
            max_heap_size: default_max_heap_size(),
            auto_detect: true,
            timeout_minutes: default_timeout_minutes(),
        }
    }
}

impl JoernConfig {
    /// The heap size setting as a typed value
    pub fn heap_size(&self) -> HeapSize {
        HeapSize::from(self.max_heap_size.as_str())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_cpg_nodes: default_min_cpg_nodes(),
            timeout_minutes: default_timeout_minutes(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            strict_mode: true,
            require_all_5_checks: true,
        }
    }
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            include_poc: true,
            severity_threshold: default_severity_threshold(),
        }
    }
}

impl ReportingConfig {
    /// Parsed severity threshold
    pub fn severity(&self) -> Result<SeverityThreshold, ConfigError> {
        self.severity_threshold.parse()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            joern: JoernConfig::default(),
            analysis: AnalysisConfig::default(),
            audit: AuditConfig::default(),
            reporting: ReportingConfig::default(),
            extra: Map::new(),
        }
    }
}

impl Config {
    /// Resolve configuration from the real filesystem and environment
    pub fn load(explicit_path: Option<&Path>) -> Self {
        ConfigResolver::new(&OsFileSystem, &SystemEnvironment).resolve(explicit_path)
    }

    /// Merge a user-supplied JSON object over the built-in defaults.
    ///
    /// Each top-level key in `user` replaces the default value for that key
    /// wholesale; there is no field-by-field merge inside a section. Fields
    /// absent from a supplied section fall back to their per-field default
    /// when the merged object is deserialized.
    pub fn merged_with(user: Map<String, Value>) -> Result<Self, ConfigError> {
        let mut merged = match serde_json::to_value(Config::default()) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(e) => return Err(ConfigError::Invalid(e.to_string())),
        };

        for (key, value) in user {
            merged.insert(key, value);
        }

        serde_json::from_value(Value::Object(merged)).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Parse a config file's contents and merge them over the defaults
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        match serde_json::from_str::<Value>(content) {
            Ok(Value::Object(user)) => Self::merged_with(user),
            Ok(other) => Err(ConfigError::NotAnObject(json_type_name(&other))),
            Err(e) => Err(ConfigError::Parse(e.to_string())),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Errors from reading or interpreting a config file
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(String),

    #[error("invalid JSON: {0}")]
    Parse(String),

    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("unknown severity '{0}' (expected low, medium, high or critical)")]
    UnknownSeverity(String),
}

/// Report severity levels, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SeverityThreshold {
    Low,
    Medium,
    High,
    Critical,
}

impl FromStr for SeverityThreshold {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(SeverityThreshold::Low),
            "medium" => Ok(SeverityThreshold::Medium),
            "high" => Ok(SeverityThreshold::High),
            "critical" => Ok(SeverityThreshold::Critical),
            _ => Err(ConfigError::UnknownSeverity(s.to_string())),
        }
    }
}

impl fmt::Display for SeverityThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SeverityThreshold::Low => "low",
            SeverityThreshold::Medium => "medium",
            SeverityThreshold::High => "high",
            SeverityThreshold::Critical => "critical",
        };
        f.write_str(name)
    }
}

/// Where a resolved configuration came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// No candidate file existed
    Defaults,
    /// Loaded from this file
    File(PathBuf),
    /// This file existed but could not be used; defaults were applied
    Fallback { path: PathBuf, reason: ConfigError },
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Defaults => write!(f, "built-in defaults"),
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Fallback { path, reason } => {
                write!(f, "built-in defaults ({} ignored: {})", path.display(), reason)
            }
        }
    }
}

/// A configuration together with its provenance
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub config: Config,
    pub source: ConfigSource,
}

/// Resolves configuration from an ordered list of candidate files
pub struct ConfigResolver<'a> {
    fs: &'a dyn FileSystem,
    env: &'a dyn Environment,
}

impl<'a> ConfigResolver<'a> {
    pub fn new(fs: &'a dyn FileSystem, env: &'a dyn Environment) -> Self {
        Self { fs, env }
    }

    /// Candidate config files in priority order.
    ///
    /// The explicit path (if any), `./bingo-config.json`,
    /// `~/.config/bingo/config.json`, then `~/.bingo/config.json`. Home
    /// locations are skipped when no home directory is known.
    pub fn candidate_paths(&self, explicit_path: Option<&Path>) -> Vec<PathBuf> {
        let mut candidates = Vec::with_capacity(4);

        if let Some(path) = explicit_path {
            candidates.push(path.to_path_buf());
        }

        candidates.push(Path::new(".").join(CONFIG_FILE_NAME));

        if let Some(home) = self.env.home_dir() {
            candidates.push(
                home.join(".config")
                    .join(CONFIG_DIR_NAME)
                    .join("config.json"),
            );
            candidates.push(home.join(format!(".{CONFIG_DIR_NAME}")).join("config.json"));
        }

        candidates
    }

    /// Resolve the configuration. Never fails; falls back to defaults.
    pub fn resolve(&self, explicit_path: Option<&Path>) -> Config {
        self.resolve_with_source(explicit_path).config
    }

    /// Resolve the configuration and report which file (if any) supplied it.
    ///
    /// Only the first existing candidate is considered. If it cannot be read
    /// or parsed, a warning is logged and the defaults are returned.
    pub fn resolve_with_source(&self, explicit_path: Option<&Path>) -> ResolvedConfig {
        let Some(path) = self
            .candidate_paths(explicit_path)
            .into_iter()
            .find(|p| self.fs.exists(p))
        else {
            tracing::debug!("No config file found, using defaults");
            return ResolvedConfig {
                config: Config::default(),
                source: ConfigSource::Defaults,
            };
        };

        match self.load_file(&path) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "Loaded config");
                ResolvedConfig {
                    config,
                    source: ConfigSource::File(path),
                }
            }
            Err(reason) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %reason,
                    "Failed to parse config, using defaults"
                );
                ResolvedConfig {
                    config: Config::default(),
                    source: ConfigSource::Fallback { path, reason },
                }
            }
        }
    }

    fn load_file(&self, path: &Path) -> Result<Config, ConfigError> {
        let content = self
            .fs
            .read_to_string(path)
            .map_err(|e| ConfigError::Read(e.to_string()))?;
        Config::from_json_str(&content)
    }
}
