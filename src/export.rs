//! CSV export of extracted records
//!
//! Files start with a UTF-8 byte order mark so spreadsheet tools pick the
//! right encoding.

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::browsers::BrowserType;
use crate::record::{clean_string, CanonicalRecord, UNKNOWN};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Serialize)]
struct CsvRow {
    #[serde(rename = "Kind")]
    kind: &'static str,
    #[serde(rename = "URL")]
    url: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Visit Count")]
    visit_count: String,
    #[serde(rename = "Timestamp")]
    timestamp: String,
}

impl From<&CanonicalRecord> for CsvRow {
    fn from(record: &CanonicalRecord) -> Self {
        Self {
            kind: record.kind.label(),
            url: clean_string(Some(&record.url)),
            title: clean_string(Some(&record.title)),
            visit_count: record
                .visit_count
                .map(|n| n.to_string())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            timestamp: record.timestamp_display(),
        }
    }
}

/// `browser_data_<browser>_<YYYYMMDD_HHMMSS>.csv`
pub fn default_file_name(browser: BrowserType, now: NaiveDateTime) -> String {
    format!(
        "browser_data_{}_{}.csv",
        browser.id(),
        now.format("%Y%m%d_%H%M%S")
    )
}

/// Write records as CSV, BOM first; header row is written even for an empty slice
pub fn write_csv<W: Write>(records: &[CanonicalRecord], mut writer: W) -> Result<()> {
    writer.write_all(UTF8_BOM)?;

    let mut csv_writer = csv::Writer::from_writer(writer);
    if records.is_empty() {
        csv_writer.write_record(["Kind", "URL", "Title", "Visit Count", "Timestamp"])?;
    }
    for record in records {
        csv_writer.serialize(CsvRow::from(record))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Export records to `path`, refusing an empty set
pub fn export_to_file(records: &[CanonicalRecord], path: &Path) -> Result<()> {
    if records.is_empty() {
        bail!("No records to export");
    }

    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    write_csv(records, BufWriter::new(file))
        .with_context(|| format!("Failed to write CSV to {:?}", path))?;

    info!("💾 Exported {} records to {:?}", records.len(), path);
    Ok(())
}
