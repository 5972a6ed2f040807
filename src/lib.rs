//! Read-only extraction of browsing artifacts from Edge, Brave and Firefox
//!
//! A request names a browser, an artifact bucket, a data-type filter and
//! paging; the result is one page of [`CanonicalRecord`]s with pagination
//! metadata. Live browser databases are never opened directly: each extraction
//! works on a throwaway snapshot copy.

pub mod browsers;
pub mod config;
pub mod db_safety;
pub mod error;
pub mod export;
pub mod extract;
pub mod progress;
pub mod readers;
pub mod record;
pub mod timecodec;

pub use browsers::{BrowserType, Platform};
pub use config::ExtractorConfig;
pub use error::{ErrorKind, ExtractionError, Result};
pub use extract::Extractor;
pub use record::{
    ArtifactKind, ArtifactRequest, CanonicalRecord, DataTypeFilter, ExtractionResult, RecordKind,
};

/// Extract one page using the current user's home and the host platform layout
pub fn extract(request: &ArtifactRequest) -> Result<ExtractionResult> {
    Extractor::default().extract(request)
}
