//! Configuration loading and config file resolution
//!
//! Bootstrap settings come from a single TOML file. Every field has a
//! built-in default, so an empty file (or no file at all) is a valid
//! configuration.
//!
//! # Config File Priority
//!
//! 1. Command-line argument (highest priority)
//! 2. `TTSB_CONFIG` environment variable
//! 3. `<platform config dir>/ttsb/ttsb-ocr.toml`
//! 4. Built-in defaults (fallback)
//!
//! A file named explicitly (1 or 2) must exist and parse. The platform
//! default (3) is optional: when absent, defaults are used and a warning is
//! logged.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "TTSB_CONFIG";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Player roster file (one name per record, first field used)
    #[serde(default)]
    pub roster_path: Option<PathBuf>,

    /// Raw frames per clip considered for player identification
    #[serde(default = "default_max_frames_per_clip")]
    pub max_frames_per_clip: usize,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Name matching thresholds
    #[serde(default)]
    pub matching: MatchingConfig,

    /// Score transition validation
    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            roster_path: None,
            max_frames_per_clip: default_max_frames_per_clip(),
            logging: LoggingConfig::default(),
            matching: MatchingConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Fuzzy acceptance thresholds (0-100) and resolver cache sizing
///
/// The thresholds are empirically chosen; keep them as configuration rather
/// than tuning them in code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Minimum score when a bare surname is ambiguous or unknown
    #[serde(default = "default_surname_threshold")]
    pub surname_threshold: u8,

    /// Minimum score for the whole-roster fuzzy fallback
    #[serde(default = "default_fallback_threshold")]
    pub fallback_threshold: u8,

    /// Minimum per-span confidence for a frame to vote in clip identification
    #[serde(default = "default_span_vote_threshold")]
    pub span_vote_threshold: u8,

    /// Maximum number of memoized span resolutions
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            surname_threshold: default_surname_threshold(),
            fallback_threshold: default_fallback_threshold(),
            span_vote_threshold: default_span_vote_threshold(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

/// Score transition validation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Only accept resets once a player has won the match
    #[serde(default)]
    pub strict: bool,

    /// Games needed to win a match
    #[serde(default = "default_match_win_series")]
    pub match_win_series: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            strict: false,
            match_win_series: default_match_win_series(),
        }
    }
}

fn default_max_frames_per_clip() -> usize {
    40
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_surname_threshold() -> u8 {
    90
}

fn default_fallback_threshold() -> u8 {
    75
}

fn default_span_vote_threshold() -> u8 {
    60
}

fn default_cache_capacity() -> usize {
    4096
}

fn default_match_win_series() -> u32 {
    3
}

impl TomlConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Read and parse a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        config.validate()?;
        info!("Loaded TOML configuration from {}", path.display());
        Ok(config)
    }

    /// Reject values the matchers cannot work with
    pub fn validate(&self) -> Result<()> {
        let m = &self.matching;
        for (name, value) in [
            ("surname_threshold", m.surname_threshold),
            ("fallback_threshold", m.fallback_threshold),
            ("span_vote_threshold", m.span_vote_threshold),
        ] {
            if value > 100 {
                return Err(Error::Config(format!(
                    "matching.{} must be in 0..=100, got {}",
                    name, value
                )));
            }
        }
        if self.max_frames_per_clip == 0 {
            return Err(Error::Config(
                "max_frames_per_clip must be at least 1".to_string(),
            ));
        }
        if self.scoring.match_win_series == 0 {
            return Err(Error::Config(
                "scoring.match_win_series must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Default configuration file path for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ttsb").join("ttsb-ocr.toml"))
}

/// Resolve and load configuration following the priority order above
pub fn resolve_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return TomlConfig::load(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return TomlConfig::load(Path::new(&path));
        }
    }

    // Priority 3: Platform config file
    if let Some(path) = default_config_path() {
        if path.exists() {
            return TomlConfig::load(&path);
        }
        warn!(
            "No config file at {}, using built-in defaults",
            path.display()
        );
    }

    // Priority 4: Built-in defaults
    Ok(TomlConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.max_frames_per_clip, 40);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.matching.surname_threshold, 90);
        assert_eq!(config.matching.fallback_threshold, 75);
        assert_eq!(config.matching.span_vote_threshold, 60);
        assert!(!config.scoring.strict);
        assert_eq!(config.scoring.match_win_series, 3);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config, TomlConfig::default());
    }

    #[test]
    fn test_partial_section() {
        let config = TomlConfig::from_toml_str(
            r#"
            [matching]
            fallback_threshold = 80
            "#,
        )
        .unwrap();
        assert_eq!(config.matching.fallback_threshold, 80);
        assert_eq!(config.matching.surname_threshold, 90);
    }

    #[test]
    fn test_validate_rejects_out_of_range_threshold() {
        let mut config = TomlConfig::default();
        config.matching.surname_threshold = 101;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_frames() {
        let mut config = TomlConfig::default();
        config.max_frames_per_clip = 0;
        assert!(config.validate().is_err());
    }
}
