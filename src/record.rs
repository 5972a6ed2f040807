//! Canonical record shape and request/result envelopes

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use std::str::FromStr;
use unicode_normalization::UnicodeNormalization;

use crate::browsers::BrowserType;
use crate::error::{ExtractionError, Result};
use crate::timecodec;

/// Placeholder for a text field whose source value is NULL
pub const UNKNOWN: &str = "Unknown";
pub const NO_TITLE: &str = "No title";
pub const NO_SOURCE: &str = "No source";
pub const NO_PATH: &str = "No path";
pub const NO_URL: &str = "No URL";
pub const NO_USERNAME: &str = "No username";
pub const ENCRYPTED: &str = "[encrypted]";
pub const NO_TIMESTAMP: &str = "No timestamp";

pub const MAX_RECORD_CAP: u32 = 1000;
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Kind of a single extracted row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RecordKind {
    History,
    Download,
    Cookie,
    Login,
    Autofill,
}

impl RecordKind {
    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::History => "History",
            RecordKind::Download => "Download",
            RecordKind::Cookie => "Cookie",
            RecordKind::Login => "Login",
            RecordKind::Autofill => "Autofill",
        }
    }
}

/// Database bucket an extraction reads from
///
/// Downloads live in the history database, so there is no separate bucket for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    History,
    Cookies,
    Logins,
    Autofill,
}

impl ArtifactKind {
    pub fn all() -> [ArtifactKind; 4] {
        [
            ArtifactKind::History,
            ArtifactKind::Cookies,
            ArtifactKind::Logins,
            ArtifactKind::Autofill,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ArtifactKind::History => "History",
            ArtifactKind::Cookies => "Cookies",
            ArtifactKind::Logins => "Logins",
            ArtifactKind::Autofill => "Autofill",
        }
    }
}

impl FromStr for ArtifactKind {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "history" => Ok(ArtifactKind::History),
            "cookies" => Ok(ArtifactKind::Cookies),
            "logins" => Ok(ArtifactKind::Logins),
            "autofill" | "formhistory" => Ok(ArtifactKind::Autofill),
            _ => Err(ExtractionError::UnsupportedArtifact(s.to_string())),
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}

/// Which sub-kinds of a bucket to return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataTypeFilter {
    All,
    History,
    Downloads,
    Cookies,
    Logins,
    Autofill,
}

impl DataTypeFilter {
    pub fn name(&self) -> &'static str {
        match self {
            DataTypeFilter::All => "all",
            DataTypeFilter::History => "history",
            DataTypeFilter::Downloads => "downloads",
            DataTypeFilter::Cookies => "cookies",
            DataTypeFilter::Logins => "logins",
            DataTypeFilter::Autofill => "autofill",
        }
    }

    pub fn includes(&self, kind: RecordKind) -> bool {
        match self {
            DataTypeFilter::All => true,
            DataTypeFilter::History => kind == RecordKind::History,
            DataTypeFilter::Downloads => kind == RecordKind::Download,
            DataTypeFilter::Cookies => kind == RecordKind::Cookie,
            DataTypeFilter::Logins => kind == RecordKind::Login,
            DataTypeFilter::Autofill => kind == RecordKind::Autofill,
        }
    }

    /// Bucket a caller reads when it only names a filter
    pub fn bucket(&self) -> ArtifactKind {
        match self {
            DataTypeFilter::All | DataTypeFilter::History | DataTypeFilter::Downloads => {
                ArtifactKind::History
            }
            DataTypeFilter::Cookies => ArtifactKind::Cookies,
            DataTypeFilter::Logins => ArtifactKind::Logins,
            DataTypeFilter::Autofill => ArtifactKind::Autofill,
        }
    }
}

impl FromStr for DataTypeFilter {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "all" => Ok(DataTypeFilter::All),
            "history" => Ok(DataTypeFilter::History),
            "downloads" => Ok(DataTypeFilter::Downloads),
            "cookies" => Ok(DataTypeFilter::Cookies),
            "logins" => Ok(DataTypeFilter::Logins),
            "autofill" => Ok(DataTypeFilter::Autofill),
            _ => Err(ExtractionError::UnsupportedArtifact(s.to_string())),
        }
    }
}

impl std::fmt::Display for DataTypeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}

/// One extracted artifact, identical in shape for every browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalRecord {
    pub kind: RecordKind,
    pub url: String,
    pub title: String,
    #[serde(rename = "visitCount")]
    pub visit_count: Option<i64>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: Option<NaiveDateTime>,
}

impl CanonicalRecord {
    pub fn timestamp_display(&self) -> String {
        self.timestamp
            .as_ref()
            .map(timecodec::format_timestamp)
            .unwrap_or_else(|| NO_TIMESTAMP.to_string())
    }
}

fn serialize_timestamp<S>(
    timestamp: &Option<NaiveDateTime>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match timestamp {
        Some(dt) => serializer.serialize_some(&timecodec::format_timestamp(dt)),
        None => serializer.serialize_none(),
    }
}

/// Parameters of one extraction call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRequest {
    pub browser: BrowserType,
    pub artifact: ArtifactKind,
    pub filter: DataTypeFilter,
    pub record_cap: u32,
    pub page: u32,
    pub page_size: u32,
}

impl ArtifactRequest {
    pub fn new(
        browser: BrowserType,
        artifact: ArtifactKind,
        filter: DataTypeFilter,
        record_cap: u32,
        page: u32,
        page_size: u32,
    ) -> Result<Self> {
        if record_cap == 0 || record_cap > MAX_RECORD_CAP {
            return Err(ExtractionError::InvalidRequest(format!(
                "record cap must be between 1 and {}, got {}",
                MAX_RECORD_CAP, record_cap
            )));
        }
        if page == 0 {
            return Err(ExtractionError::InvalidRequest(
                "page numbers start at 1".to_string(),
            ));
        }
        if page_size == 0 {
            return Err(ExtractionError::InvalidRequest(
                "page size must be positive".to_string(),
            ));
        }
        Ok(Self {
            browser,
            artifact,
            filter,
            record_cap,
            page,
            page_size,
        })
    }

    /// Whole-cap request used for bulk export
    pub fn export(
        browser: BrowserType,
        artifact: ArtifactKind,
        filter: DataTypeFilter,
        record_cap: u32,
    ) -> Result<Self> {
        Self::new(browser, artifact, filter, record_cap, 1, record_cap)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    /// Row limit for each sub-kind query on this page
    ///
    /// Never reaches past the record cap; zero once the offset is at or past it.
    pub fn page_cap(&self) -> u32 {
        let remaining = u64::from(self.record_cap).saturating_sub(self.offset());
        // remaining <= record_cap, so the narrowing cannot truncate
        remaining.min(u64::from(self.page_size)) as u32
    }
}

/// One page of records plus pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    pub records: Vec<CanonicalRecord>,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
    #[serde(rename = "currentPage")]
    pub current_page: u32,
    #[serde(rename = "pageSize")]
    pub page_size: u32,
    #[serde(rename = "totalRecords")]
    pub total_records: u64,
    /// Per-table problems that did not prevent a partial result
    pub notes: Vec<String>,
}

impl ExtractionResult {
    pub fn paginate(
        records: Vec<CanonicalRecord>,
        total_records: u64,
        page: u32,
        page_size: u32,
        notes: Vec<String>,
    ) -> Self {
        Self {
            records,
            total_pages: total_pages(total_records, page_size),
            current_page: page,
            page_size,
            total_records,
            notes,
        }
    }
}

pub fn total_pages(total_records: u64, page_size: u32) -> u64 {
    let page_size = u64::from(page_size.max(1));
    total_records.div_ceil(page_size)
}

/// NFKC-normalize and drop non-printable characters
///
/// `None` becomes [`UNKNOWN`].
pub fn clean_string(value: Option<&str>) -> String {
    match value {
        Some(s) => s.nfkc().filter(|c| is_printable(*c)).collect(),
        None => UNKNOWN.to_string(),
    }
}

/// Clean a text column, substituting `fallback` for NULL or empty values
pub fn clean_or(value: Option<&str>, fallback: &str) -> String {
    match value {
        Some(s) => {
            let cleaned = clean_string(Some(s));
            if cleaned.is_empty() {
                fallback.to_string()
            } else {
                cleaned
            }
        }
        None => fallback.to_string(),
    }
}

/// Controls, separators other than ASCII space, format characters (Cf),
/// private-use code points and noncharacters are not printable. Unassigned
/// code points are kept, since no category table for them is carried here.
fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    if c.is_control() || c.is_whitespace() {
        return false;
    }
    let cp = u32::from(c);
    // Noncharacters: U+FDD0..U+FDEF and the last two code points of every plane
    if (0xFDD0..=0xFDEF).contains(&cp) || cp & 0xFFFE == 0xFFFE {
        return false;
    }
    !matches!(
        c,
        // Format characters (Cf)
        '\u{00AD}'
            | '\u{0600}'..='\u{0605}'
            | '\u{061C}'
            | '\u{06DD}'
            | '\u{070F}'
            | '\u{0890}'..='\u{0891}'
            | '\u{08E2}'
            | '\u{180E}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{206F}'
            | '\u{FEFF}'
            | '\u{FFF9}'..='\u{FFFB}'
            | '\u{110BD}'
            | '\u{110CD}'
            | '\u{13430}'..='\u{1343F}'
            | '\u{1BCA0}'..='\u{1BCA3}'
            | '\u{1D173}'..='\u{1D17A}'
            | '\u{E0001}'
            | '\u{E0020}'..='\u{E007F}'
            // Private use (Co)
            | '\u{E000}'..='\u{F8FF}'
            | '\u{F0000}'..='\u{FFFFD}'
            | '\u{100000}'..='\u{10FFFD}'
    )
}
