//! Extraction coordinator
//!
//! resolve path -> snapshot -> schema reader -> pagination envelope.
//! Firefox logins take their own JSON path and never touch SQL.

use std::path::PathBuf;
use tracing::{debug, info};

use crate::browsers::{self, BrowserType};
use crate::config::ExtractorConfig;
use crate::db_safety::Snapshot;
use crate::error::{ExtractionError, Result};
use crate::readers::{self, firefox_logins, PageRead};
use crate::record::{ArtifactKind, ArtifactRequest, DataTypeFilter, ExtractionResult};

#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractorConfig,
}

impl Extractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Database path for `artifact` under the configured home, platform and profile
    pub fn resolve(&self, browser: BrowserType, artifact: ArtifactKind) -> Result<PathBuf> {
        browsers::resolve_for_platform(
            browser.id(),
            &self.config.home_dir(),
            artifact,
            &self.config.profile,
            self.config.platform(),
        )
    }

    /// Extract one page of records
    pub fn extract(&self, request: &ArtifactRequest) -> Result<ExtractionResult> {
        let path = self.resolve(request.browser, request.artifact)?;

        if !path.exists() {
            return Err(ExtractionError::DatabaseFileNotFound(path));
        }

        if request.browser == BrowserType::Firefox && request.artifact == ArtifactKind::Logins {
            debug!("Reading Firefox login store {:?}", path);
            return firefox_logins::read_logins(&path, request.page, request.page_size);
        }

        let snapshot = Snapshot::create(&path, &self.config.snapshot_dir())?;
        let conn = snapshot.open()?;

        let reader = readers::reader_for(request.browser);
        let page = reader.read_page(
            &conn,
            request.artifact,
            request.filter,
            request.page_cap(),
            request.offset(),
        )?;
        drop(conn);

        let result = assemble(request, page)?;
        info!(
            "Extracted {} {} records from {} (page {}/{}, {} total)",
            result.records.len(),
            request.filter,
            request.browser.name(),
            result.current_page,
            result.total_pages,
            result.total_records
        );
        Ok(result)
    }

    /// Every record up to `record_cap` in one page, for bulk export
    pub fn export_all(
        &self,
        browser: BrowserType,
        artifact: ArtifactKind,
        filter: DataTypeFilter,
        record_cap: u32,
    ) -> Result<ExtractionResult> {
        let request = ArtifactRequest::export(browser, artifact, filter, record_cap)?;
        self.extract(&request)
    }
}

/// Turn a page read and its true row count into the result envelope
fn assemble(request: &ArtifactRequest, page: PageRead) -> Result<ExtractionResult> {
    let available = page.available;
    if page.records.is_empty() {
        if !page.notes.is_empty() && (page.succeeded == 0 || available == 0) {
            return Err(ExtractionError::NoDataAvailable(page.notes.join(", ")));
        }
        if available == 0 {
            return Err(ExtractionError::NoDataForKind {
                filter: request.filter.to_string(),
                browser: request.browser.name().to_string(),
            });
        }
    }

    let total_records = available.min(u64::from(request.record_cap));
    Ok(ExtractionResult::paginate(
        page.records,
        total_records,
        request.page,
        request.page_size,
        page.notes,
    ))
}
