//! Run configuration, persisted as TOML.
//!
//! The operator edits `census.toml` before each run: the venue table maps a
//! year label to the OpenReview invitation whose submissions are collected.
//! Everything else has a default, so a file holding only `[venues]` is valid.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading, validating or saving the configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(census::config::read),
        help("Create a starting config with `author-census init` or pass --config <PATH>.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    #[diagnostic(
        code(census::config::parse),
        help("Check the TOML syntax. `author-census init` writes a valid starting file.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(census::config::write),
        help("Ensure you have write permissions to the target directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config already exists: {path}")]
    #[diagnostic(
        code(census::config::exists),
        help("Pass --force to overwrite it, or edit the existing file.")
    )]
    AlreadyExists { path: String },

    #[error("confidence_threshold must lie in [0, 1], got {value}")]
    #[diagnostic(
        code(census::config::threshold),
        help("Predictions below the threshold are recorded as `gz|low_conf`. The usual value is 0.95.")
    )]
    InvalidThreshold { value: f64 },

    #[error("no venues configured")]
    #[diagnostic(
        code(census::config::no_venues),
        help("Add at least one entry under [venues], e.g. \"2018\" = \"ICLR.cc/2018/Conference/-/Blind_Submission\".")
    )]
    NoVenues,

    #[error("directory.page_size must lie in [1, 1000], got {value}")]
    #[diagnostic(
        code(census::config::page_size),
        help("OpenReview caps a notes page at 1000 entries, which is also the default.")
    )]
    InvalidPageSize { value: usize },

    #[error("failed to serialize config for {path}: {message}")]
    #[diagnostic(
        code(census::config::serialize),
        help("This is a bug in author-census. Please report it with the config values used.")
    )]
    Serialize { path: String, message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "census.toml";

/// Largest `limit` the OpenReview notes endpoint honours.
pub const MAX_PAGE_SIZE: usize = 1000;

/// Top-level run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CensusConfig {
    /// Output JSON file, replaced on every run.
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Minimum prediction probability for a `gz|<label>` category.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    /// Year label → submission invitation.
    #[serde(default)]
    pub venues: BTreeMap<String, String>,
    /// Submission/profile directory service.
    #[serde(default)]
    pub directory: DirectoryConfig,
    /// Name-based gender prediction service.
    #[serde(default)]
    pub predictor: PredictorConfig,
}

/// Connection settings for the OpenReview directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default = "default_directory_url")]
    pub base_url: String,
    /// Notes requested per page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_directory_timeout")]
    pub timeout_secs: u64,
}

/// Connection settings for genderize.io.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorConfig {
    #[serde(default = "default_predictor_url")]
    pub base_url: String,
    /// Optional key lifting the anonymous daily quota.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_predictor_timeout")]
    pub timeout_secs: u64,
}

fn default_output() -> PathBuf {
    PathBuf::from("author_gender.json")
}
fn default_confidence_threshold() -> f64 {
    crate::gender::DEFAULT_CONFIDENCE_THRESHOLD
}
fn default_directory_url() -> String {
    "https://api.openreview.net".into()
}
fn default_page_size() -> usize {
    MAX_PAGE_SIZE
}
fn default_directory_timeout() -> u64 {
    60
}
fn default_predictor_url() -> String {
    "https://api.genderize.io".into()
}
fn default_predictor_timeout() -> u64 {
    30
}

fn default_venues() -> BTreeMap<String, String> {
    BTreeMap::from([
        (
            "2017".to_string(),
            "ICLR.cc/2017/conference/-/submission".to_string(),
        ),
        (
            "2018".to_string(),
            "ICLR.cc/2018/Conference/-/Blind_Submission".to_string(),
        ),
    ])
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_directory_url(),
            page_size: default_page_size(),
            timeout_secs: default_directory_timeout(),
        }
    }
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            base_url: default_predictor_url(),
            api_key: None,
            timeout_secs: default_predictor_timeout(),
        }
    }
}

impl Default for CensusConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            confidence_threshold: default_confidence_threshold(),
            venues: default_venues(),
            directory: DirectoryConfig::default(),
            predictor: PredictorConfig::default(),
        }
    }
}

impl CensusConfig {
    /// Parse and validate a config from TOML text. `origin` names the source in errors.
    pub fn from_toml(content: &str, origin: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Render as pretty TOML. `target` names the destination in errors.
    pub fn to_toml(&self, target: &str) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            path: target.to_string(),
            message: e.to_string(),
        })
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml(&content, &path.display().to_string())
    }

    /// Save to a TOML file, refusing to clobber an existing one unless `force`.
    pub fn save(&self, path: &Path, force: bool) -> ConfigResult<()> {
        if path.exists() && !force {
            return Err(ConfigError::AlreadyExists {
                path: path.display().to_string(),
            });
        }
        let content = self.to_toml(&path.display().to_string())?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Check the invariants serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ConfigError::InvalidThreshold {
                value: self.confidence_threshold,
            });
        }
        if self.venues.is_empty() {
            return Err(ConfigError::NoVenues);
        }
        let page_size = self.directory.page_size;
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ConfigError::InvalidPageSize { value: page_size });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_targets_iclr() {
        let cfg = CensusConfig::default();
        assert_eq!(cfg.venues.len(), 2);
        assert_eq!(
            cfg.venues["2018"],
            "ICLR.cc/2018/Conference/-/Blind_Submission"
        );
        assert_eq!(cfg.confidence_threshold, 0.95);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn venues_only_file_fills_defaults() {
        let cfg = CensusConfig::from_toml(
            r#"
            [venues]
            "2019" = "ICLR.cc/2019/Conference/-/Blind_Submission"
            "#,
            "inline",
        )
        .unwrap();
        assert_eq!(cfg.venues.len(), 1);
        assert_eq!(cfg.output, PathBuf::from("author_gender.json"));
        assert_eq!(cfg.directory.page_size, 1000);
        assert_eq!(cfg.predictor.base_url, "https://api.genderize.io");
        assert!(cfg.predictor.api_key.is_none());
    }

    #[test]
    fn empty_venue_table_is_rejected() {
        let err = CensusConfig::from_toml("output = \"x.json\"", "inline").unwrap_err();
        assert!(matches!(err, ConfigError::NoVenues));
    }

    #[test]
    fn threshold_out_of_range_is_rejected() {
        let err = CensusConfig::from_toml(
            "confidence_threshold = 1.5\n[venues]\n\"2018\" = \"x\"\n",
            "inline",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidThreshold { .. }));
    }

    fn with_page_size(page_size: usize) -> ConfigResult<CensusConfig> {
        CensusConfig::from_toml(
            &format!("[venues]\n\"2018\" = \"x\"\n[directory]\npage_size = {page_size}\n"),
            "inline",
        )
    }

    #[test]
    fn page_size_outside_service_limit_is_rejected() {
        for value in [0, MAX_PAGE_SIZE + 1, 5000] {
            let err = with_page_size(value).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidPageSize { value: v } if v == value));
        }
        assert_eq!(with_page_size(1).unwrap().directory.page_size, 1);
        assert_eq!(
            with_page_size(MAX_PAGE_SIZE).unwrap().directory.page_size,
            MAX_PAGE_SIZE
        );
    }

    #[test]
    fn pretty_toml_reloads() {
        let mut cfg = CensusConfig::default();
        cfg.predictor.api_key = Some("k".into());
        let text = cfg.to_toml("inline").unwrap();
        assert!(text.contains("[venues]"));
        let back = CensusConfig::from_toml(&text, "inline").unwrap();
        assert_eq!(back.venues, cfg.venues);
        assert_eq!(back.predictor.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn serialize_failure_is_not_a_parse_error() {
        let err = ConfigError::Serialize {
            path: "census.toml".into(),
            message: "unsupported value".into(),
        };
        assert_eq!(
            miette::Diagnostic::code(&err).map(|c| c.to_string()).as_deref(),
            Some("census::config::serialize")
        );
        assert!(err.to_string().starts_with("failed to serialize config"));
    }

    #[test]
    fn malformed_toml_reports_origin() {
        let err = CensusConfig::from_toml("venues = [", "census.toml").unwrap_err();
        match err {
            ConfigError::Parse { path, .. } => assert_eq!(path, "census.toml"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
