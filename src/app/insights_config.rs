//! Insights configuration loader.
//!
//! Defaults for the query editor and the connection are read from an
//! `insights.json` file, looked up in this order:
//!
//! 1. An explicit path (the `--config` flag)
//! 2. `insights.json` in the current directory
//! 3. `insights.json` in the platform config directory
//!
//! Missing fields, and a missing file, fall back to built-in defaults.
//! `AWS_REGION` and `AWS_PROFILE` override the file when set.
//!
//! # insights.json Format
//!
//! ```json
//! {
//!   "region": "us-east-1",
//!   "profile": "dev",
//!   "default_log_groups": ["/aws/lambda/my-function"],
//!   "default_relative_amount": 30,
//!   "default_relative_unit": "Minutes",
//!   "default_query": "fields @timestamp, @message | sort @timestamp desc | limit 20"
//! }
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::app::data_plane::cloudwatch_logs::{
    ConnectionSettings, QueryEditorState, TimeUnit, DEFAULT_INSIGHTS_QUERY,
};

pub const CONFIG_FILE_NAME: &str = "insights.json";

/// Editor and connection defaults
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InsightsConfig {
    pub region: String,
    /// Named credential profile; `None` uses the default provider chain
    pub profile: Option<String>,
    pub default_log_groups: Vec<String>,
    pub default_relative_amount: u32,
    pub default_relative_unit: TimeUnit,
    pub default_query: String,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            profile: None,
            default_log_groups: Vec::new(),
            default_relative_amount: 1,
            default_relative_unit: TimeUnit::Hours,
            default_query: DEFAULT_INSIGHTS_QUERY.to_string(),
        }
    }
}

impl InsightsConfig {
    /// Load configuration, searching the default locations when `explicit` is `None`
    ///
    /// An explicit path must exist and parse. Files found by searching must
    /// parse if present.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::load_from_path(path)?,
            None => match Self::search_paths().into_iter().find(|p| p.exists()) {
                Some(path) => Self::load_from_path(&path)?,
                None => {
                    debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                    Self::default()
                }
            },
        };

        Ok(config.with_env_overrides(
            std::env::var("AWS_REGION").ok(),
            std::env::var("AWS_PROFILE").ok(),
        ))
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: InsightsConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;

        info!(
            "Loaded config from {:?}: region={}, {} default log group(s)",
            path,
            config.region,
            config.default_log_groups.len()
        );
        Ok(config)
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(proj_dirs) = directories::ProjectDirs::from("com", "", "awslogs-insights") {
            paths.push(proj_dirs.config_dir().join(CONFIG_FILE_NAME));
        }
        paths
    }

    /// Apply region/profile overrides, ignoring blank values
    pub fn with_env_overrides(mut self, region: Option<String>, profile: Option<String>) -> Self {
        if let Some(region) = region.filter(|r| !r.trim().is_empty()) {
            self.region = region;
        }
        if let Some(profile) = profile.filter(|p| !p.trim().is_empty()) {
            self.profile = Some(profile);
        }
        self
    }

    pub fn connection(&self) -> ConnectionSettings {
        ConnectionSettings {
            region: self.region.clone(),
            profile: self.profile.clone(),
        }
    }

    /// A fresh editor prefilled with the configured defaults
    pub fn editor_state(&self) -> QueryEditorState {
        QueryEditorState {
            log_groups: self.default_log_groups.clone(),
            relative_time_amount: self.default_relative_amount.to_string(),
            relative_time_unit: self.default_relative_unit,
            query_text: self.default_query.clone(),
            ..QueryEditorState::default()
        }
    }
}
