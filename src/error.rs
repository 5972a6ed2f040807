//! Error taxonomy for artifact extraction
//!
//! Every failure leaving the engine is one of these variants. Callers that need
//! a machine-readable classification use [`ExtractionError::kind`].

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractionError>;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Unsupported browser: {0}")]
    UnsupportedBrowser(String),

    #[error("Home directory does not exist: {0:?}")]
    HomeNotFound(PathBuf),

    /// Firefox only: no profiles root, or no profile holding a history database
    #[error("Firefox profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Unsupported artifact: {0}")]
    UnsupportedArtifact(String),

    #[error("Unsupported platform or artifact for {browser}: {platform}, {artifact}")]
    UnsupportedPlatformOrArtifact {
        browser: String,
        platform: String,
        artifact: String,
    },

    #[error("Database file does not exist: {0:?}. Make sure the browser is installed and has been used.")]
    DatabaseFileNotFound(PathBuf),

    #[error("Failed to copy database {path:?}: {source}")]
    CopyFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Database query failed: {0}")]
    QueryFailed(#[from] rusqlite::Error),

    #[error("No data found. Errors: {0}")]
    NoDataAvailable(String),

    #[error("No data found for {filter} on {browser}")]
    NoDataForKind { filter: String, browser: String },

    #[error("Failed to read logins.json: {0}")]
    LoginStoreParseFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Stable classification of an [`ExtractionError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnsupportedBrowser,
    HomeNotFound,
    ProfileNotFound,
    UnsupportedArtifact,
    UnsupportedPlatformOrArtifact,
    DatabaseFileNotFound,
    CopyFailed,
    QueryFailed,
    NoDataAvailable,
    NoDataForKind,
    LoginStoreParseFailed,
    InvalidRequest,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnsupportedBrowser => "unsupported_browser",
            ErrorKind::HomeNotFound => "home_not_found",
            ErrorKind::ProfileNotFound => "profile_not_found",
            ErrorKind::UnsupportedArtifact => "unsupported_artifact",
            ErrorKind::UnsupportedPlatformOrArtifact => "unsupported_platform_or_artifact",
            ErrorKind::DatabaseFileNotFound => "database_file_not_found",
            ErrorKind::CopyFailed => "copy_failed",
            ErrorKind::QueryFailed => "query_failed",
            ErrorKind::NoDataAvailable => "no_data_available",
            ErrorKind::NoDataForKind => "no_data_for_kind",
            ErrorKind::LoginStoreParseFailed => "login_store_parse_failed",
            ErrorKind::InvalidRequest => "invalid_request",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ExtractionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractionError::UnsupportedBrowser(_) => ErrorKind::UnsupportedBrowser,
            ExtractionError::HomeNotFound(_) => ErrorKind::HomeNotFound,
            ExtractionError::ProfileNotFound(_) => ErrorKind::ProfileNotFound,
            ExtractionError::UnsupportedArtifact(_) => ErrorKind::UnsupportedArtifact,
            ExtractionError::UnsupportedPlatformOrArtifact { .. } => {
                ErrorKind::UnsupportedPlatformOrArtifact
            }
            ExtractionError::DatabaseFileNotFound(_) => ErrorKind::DatabaseFileNotFound,
            ExtractionError::CopyFailed { .. } => ErrorKind::CopyFailed,
            ExtractionError::QueryFailed(_) => ErrorKind::QueryFailed,
            ExtractionError::NoDataAvailable(_) => ErrorKind::NoDataAvailable,
            ExtractionError::NoDataForKind { .. } => ErrorKind::NoDataForKind,
            ExtractionError::LoginStoreParseFailed(_) => ErrorKind::LoginStoreParseFailed,
            ExtractionError::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }
}
