//! Extractor configuration
//!
//! Loaded from an optional JSON file; every field has a default so an empty
//! object (or no file at all) is a valid configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::browsers::{Platform, DEFAULT_PROFILE};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Home directory to search instead of the current user's
    pub home_dir: Option<PathBuf>,

    /// Path layout to assume instead of the host OS
    pub platform: Option<Platform>,

    /// Chromium profile directory name
    pub profile: String,

    /// Where snapshots are written (defaults to the system temp dir)
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            home_dir: None,
            platform: None,
            profile: DEFAULT_PROFILE.to_string(),
            snapshot_dir: None,
        }
    }
}

impl ExtractorConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: ExtractorConfig = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {:?}", path))?;
        Ok(config)
    }

    pub fn with_home(mut self, home: PathBuf) -> Self {
        self.home_dir = Some(home);
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    pub fn with_snapshot_dir(mut self, dir: PathBuf) -> Self {
        self.snapshot_dir = Some(dir);
        self
    }

    /// Configured home, else the current user's; empty when neither is known
    pub fn home_dir(&self) -> PathBuf {
        self.home_dir
            .clone()
            .or_else(dirs::home_dir)
            .unwrap_or_default()
    }

    pub fn platform(&self) -> Platform {
        self.platform.unwrap_or_else(Platform::current)
    }

    pub fn snapshot_dir(&self) -> PathBuf {
        self.snapshot_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
