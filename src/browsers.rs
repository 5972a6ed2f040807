//! Browser identifiers and on-disk database discovery
//!
//! Chromium-family browsers keep one directory per profile under a fixed
//! per-platform root. Firefox keeps randomly named profile directories under a
//! profiles root, so the profile is discovered first.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{ExtractionError, Result};
use crate::record::ArtifactKind;

pub const DEFAULT_PROFILE: &str = "Default";

/// File that marks a Firefox profile directory as usable
const FIREFOX_HISTORY_DB: &str = "places.sqlite";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserType {
    Edge,
    Brave,
    Firefox,
}

impl BrowserType {
    pub fn all() -> [BrowserType; 3] {
        [BrowserType::Edge, BrowserType::Brave, BrowserType::Firefox]
    }

    pub fn name(&self) -> &'static str {
        match self {
            BrowserType::Edge => "Edge",
            BrowserType::Brave => "Brave",
            BrowserType::Firefox => "Firefox",
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            BrowserType::Edge => "edge",
            BrowserType::Brave => "brave",
            BrowserType::Firefox => "firefox",
        }
    }

    pub fn is_chromium(&self) -> bool {
        matches!(self, BrowserType::Edge | BrowserType::Brave)
    }
}

impl FromStr for BrowserType {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "edge" => Ok(BrowserType::Edge),
            "brave" => Ok(BrowserType::Brave),
            "firefox" => Ok(BrowserType::Firefox),
            _ => Err(ExtractionError::UnsupportedBrowser(s.to_string())),
        }
    }
}

impl std::fmt::Display for BrowserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Macos,
    Linux,
    /// Any OS without known browser layouts
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::Macos
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Other
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Macos => "macos",
            Platform::Linux => "linux",
            Platform::Other => "other",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}

/// Resolve a database path for the host platform
pub fn resolve(
    browser: &str,
    user_home: &Path,
    artifact: ArtifactKind,
    profile: &str,
) -> Result<PathBuf> {
    resolve_for_platform(browser, user_home, artifact, profile, Platform::current())
}

/// Resolve the database file holding `artifact` for `browser`
///
/// Only existence checks touch the filesystem.
pub fn resolve_for_platform(
    browser: &str,
    user_home: &Path,
    artifact: ArtifactKind,
    profile: &str,
    platform: Platform,
) -> Result<PathBuf> {
    let browser: BrowserType = browser.parse()?;

    if !user_home.exists() {
        return Err(ExtractionError::HomeNotFound(user_home.to_path_buf()));
    }

    let path = match browser {
        BrowserType::Firefox => {
            let profile_dir = find_firefox_profile(user_home, platform)?;
            profile_dir.join(firefox_database_file(artifact)?)
        }
        BrowserType::Edge | BrowserType::Brave => {
            let profile_dir = chromium_profile_dir(browser, user_home, profile, platform)
                .ok_or_else(|| ExtractionError::UnsupportedPlatformOrArtifact {
                    browser: browser.id().to_string(),
                    platform: platform.to_string(),
                    artifact: artifact.to_string(),
                })?;
            profile_dir.join(chromium_database_file(artifact))
        }
    };

    debug!("Resolved {} {} database: {:?}", browser.name(), artifact, path);
    Ok(path)
}

/// Root directory holding Firefox profile directories
pub fn firefox_profiles_root(user_home: &Path, platform: Platform) -> Option<PathBuf> {
    match platform {
        Platform::Windows => Some(
            user_home
                .join("AppData")
                .join("Roaming")
                .join("Mozilla")
                .join("Firefox")
                .join("Profiles"),
        ),
        Platform::Macos => Some(
            user_home
                .join("Library")
                .join("Application Support")
                .join("Firefox")
                .join("Profiles"),
        ),
        Platform::Linux => Some(user_home.join(".mozilla").join("firefox")),
        Platform::Other => None,
    }
}

/// First profile directory (by name) that contains a history database
pub fn find_firefox_profile(user_home: &Path, platform: Platform) -> Result<PathBuf> {
    let profiles_root = firefox_profiles_root(user_home, platform)
        .filter(|root| root.exists())
        .ok_or_else(|| {
            ExtractionError::ProfileNotFound("Firefox profile directory does not exist".to_string())
        })?;

    for entry in WalkDir::new(&profiles_root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let profile_path = entry.path();
        if profile_path.is_dir() && profile_path.join(FIREFOX_HISTORY_DB).exists() {
            debug!("Found Firefox profile at: {:?}", profile_path);
            return Ok(profile_path.to_path_buf());
        }
    }

    Err(ExtractionError::ProfileNotFound(format!(
        "no valid Firefox profile in {:?}",
        profiles_root
    )))
}

fn firefox_database_file(artifact: ArtifactKind) -> Result<&'static str> {
    match artifact {
        ArtifactKind::History => Ok(FIREFOX_HISTORY_DB),
        ArtifactKind::Cookies => Ok("cookies.sqlite"),
        ArtifactKind::Autofill => Ok("formhistory.sqlite"),
        ArtifactKind::Logins => Ok("logins.json"),
    }
}

fn chromium_profile_dir(
    browser: BrowserType,
    user_home: &Path,
    profile: &str,
    platform: Platform,
) -> Option<PathBuf> {
    let user_data = match (browser, platform) {
        (BrowserType::Edge, Platform::Windows) => user_home
            .join("AppData")
            .join("Local")
            .join("Microsoft")
            .join("Edge")
            .join("User Data"),
        (BrowserType::Brave, Platform::Windows) => user_home
            .join("AppData")
            .join("Local")
            .join("BraveSoftware")
            .join("Brave-Browser")
            .join("User Data"),
        (BrowserType::Edge, Platform::Macos) => user_home
            .join("Library")
            .join("Application Support")
            .join("Microsoft Edge"),
        (BrowserType::Brave, Platform::Macos) => user_home
            .join("Library")
            .join("Application Support")
            .join("BraveSoftware")
            .join("Brave-Browser"),
        (BrowserType::Edge, Platform::Linux) => user_home.join(".config").join("microsoft-edge"),
        (BrowserType::Brave, Platform::Linux) => user_home
            .join(".config")
            .join("BraveSoftware")
            .join("Brave-Browser"),
        _ => return None,
    };
    Some(user_data.join(profile))
}

fn chromium_database_file(artifact: ArtifactKind) -> PathBuf {
    match artifact {
        ArtifactKind::History => PathBuf::from("History"),
        ArtifactKind::Cookies => Path::new("Network").join("Cookies"),
        ArtifactKind::Logins => PathBuf::from("Login Data"),
        ArtifactKind::Autofill => PathBuf::from("Web Data"),
    }
}
