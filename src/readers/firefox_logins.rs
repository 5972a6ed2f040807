//! Firefox saved logins (`logins.json`)
//!
//! This store is plain JSON, so it skips the snapshot and the SQL reader
//! contract entirely and paginates in memory. The total is the array length;
//! the record cap is not applied here.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{ExtractionError, Result};
use crate::record::{
    clean_or, CanonicalRecord, ExtractionResult, RecordKind, ENCRYPTED, NO_URL, NO_USERNAME,
};
use crate::timecodec;

#[derive(Debug, Deserialize)]
struct LoginStore {
    #[serde(default)]
    logins: Vec<LoginEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginEntry {
    hostname: Option<String>,
    username: Option<String>,
    encrypted_username: Option<String>,
    time_created: Option<i64>,
}

impl LoginEntry {
    fn into_record(self) -> CanonicalRecord {
        let username = match (self.username.as_deref(), self.encrypted_username.as_deref()) {
            (Some(name), _) => clean_or(Some(name), NO_USERNAME),
            (None, Some(_)) => ENCRYPTED.to_string(),
            (None, None) => NO_USERNAME.to_string(),
        };

        CanonicalRecord {
            kind: RecordKind::Login,
            url: clean_or(self.hostname.as_deref(), NO_URL),
            title: format!("Username: {}", username),
            visit_count: None,
            timestamp: timecodec::decode_unix_millis(self.time_created),
        }
    }
}

/// Read one page of `logins.json`
pub fn read_logins(path: &Path, page: u32, page_size: u32) -> Result<ExtractionResult> {
    let content = fs::read_to_string(path)
        .map_err(|e| ExtractionError::LoginStoreParseFailed(format!("{:?}: {}", path, e)))?;
    let store: LoginStore = serde_json::from_str(&content)
        .map_err(|e| ExtractionError::LoginStoreParseFailed(e.to_string()))?;

    let total_records = store.logins.len() as u64;
    let offset = (page.saturating_sub(1) as usize).saturating_mul(page_size as usize);
    let records: Vec<CanonicalRecord> = store
        .logins
        .into_iter()
        .skip(offset)
        .take(page_size as usize)
        .map(LoginEntry::into_record)
        .collect();

    debug!(
        "Read {} of {} Firefox logins from {:?}",
        records.len(),
        total_records,
        path
    );

    Ok(ExtractionResult::paginate(
        records,
        total_records,
        page,
        page_size,
        Vec::new(),
    ))
}
