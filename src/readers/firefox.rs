//! Firefox `moz_*` schema reader
//!
//! places.sqlite holds history and downloads, cookies.sqlite holds
//! `moz_cookies`, formhistory.sqlite holds `moz_formhistory`. Saved logins live
//! in a JSON file, see [`crate::readers::firefox_logins`].

use rusqlite::Row;

use crate::browsers::BrowserType;
use crate::readers::{SchemaReader, SubQuery};
use crate::record::{
    clean_or, clean_string, ArtifactKind, CanonicalRecord, RecordKind, NO_SOURCE, NO_TITLE,
    NO_URL, UNKNOWN,
};
use crate::timecodec;

pub struct FirefoxReader;

impl SchemaReader for FirefoxReader {
    fn browser_type(&self) -> BrowserType {
        BrowserType::Firefox
    }

    fn sub_queries(&self, artifact: ArtifactKind) -> &'static [SubQuery] {
        match artifact {
            ArtifactKind::History => HISTORY_QUERIES,
            ArtifactKind::Cookies => COOKIE_QUERIES,
            ArtifactKind::Autofill => FORMHISTORY_QUERIES,
            ArtifactKind::Logins => &[],
        }
    }
}

static HISTORY_QUERIES: &[SubQuery] = &[
    SubQuery {
        kind: RecordKind::History,
        tables: &["moz_places"],
        select: "SELECT url, title, visit_count, last_visit_date
                 FROM moz_places
                 WHERE url IS NOT NULL
                 ORDER BY last_visit_date DESC
                 LIMIT ?1 OFFSET ?2",
        count: "SELECT COUNT(*) FROM moz_places WHERE url IS NOT NULL",
        map_row: map_place,
    },
    // Legacy download manager table
    SubQuery {
        kind: RecordKind::Download,
        tables: &["moz_downloads"],
        select: "SELECT name, source, startTime
                 FROM moz_downloads
                 ORDER BY startTime DESC
                 LIMIT ?1 OFFSET ?2",
        count: "SELECT COUNT(*) FROM moz_downloads",
        map_row: map_legacy_download,
    },
    // Current Firefox keeps downloads as page annotations
    SubQuery {
        kind: RecordKind::Download,
        tables: &["moz_places", "moz_annos", "moz_anno_attributes"],
        select: "SELECT a.content, p.url, a.dateAdded
                 FROM moz_annos a
                 JOIN moz_places p ON p.id = a.place_id
                 JOIN moz_anno_attributes n ON n.id = a.anno_attribute_id
                 WHERE n.name = 'downloads/destinationFileURI'
                 ORDER BY a.dateAdded DESC
                 LIMIT ?1 OFFSET ?2",
        count: "SELECT COUNT(*)
                FROM moz_annos a
                JOIN moz_places p ON p.id = a.place_id
                JOIN moz_anno_attributes n ON n.id = a.anno_attribute_id
                WHERE n.name = 'downloads/destinationFileURI'",
        map_row: map_annotated_download,
    },
];

static COOKIE_QUERIES: &[SubQuery] = &[SubQuery {
    kind: RecordKind::Cookie,
    tables: &["moz_cookies"],
    select: "SELECT name, host, expiry
             FROM moz_cookies
             ORDER BY rowid
             LIMIT ?1 OFFSET ?2",
    count: "SELECT COUNT(*) FROM moz_cookies",
    map_row: map_cookie,
}];

static FORMHISTORY_QUERIES: &[SubQuery] = &[SubQuery {
    kind: RecordKind::Autofill,
    tables: &["moz_formhistory"],
    select: "SELECT fieldname, value
             FROM moz_formhistory
             ORDER BY rowid
             LIMIT ?1 OFFSET ?2",
    count: "SELECT COUNT(*) FROM moz_formhistory",
    map_row: map_form_entry,
}];

fn map_place(row: &Row<'_>) -> rusqlite::Result<CanonicalRecord> {
    let url: Option<String> = row.get(0)?;
    let title: Option<String> = row.get(1)?;
    let visit_count: Option<i64> = row.get(2)?;
    let last_visit_date: Option<i64> = row.get(3)?;

    Ok(CanonicalRecord {
        kind: RecordKind::History,
        url: clean_string(url.as_deref()),
        title: clean_or(title.as_deref(), NO_TITLE),
        visit_count,
        timestamp: timecodec::decode_firefox(last_visit_date),
    })
}

fn map_legacy_download(row: &Row<'_>) -> rusqlite::Result<CanonicalRecord> {
    let name: Option<String> = row.get(0)?;
    let source: Option<String> = row.get(1)?;
    let start_time: Option<i64> = row.get(2)?;

    Ok(CanonicalRecord {
        kind: RecordKind::Download,
        url: clean_or(source.as_deref(), NO_SOURCE),
        title: clean_or(name.as_deref(), UNKNOWN),
        visit_count: None,
        timestamp: timecodec::decode_firefox(start_time),
    })
}

fn map_annotated_download(row: &Row<'_>) -> rusqlite::Result<CanonicalRecord> {
    let destination: Option<String> = row.get(0)?;
    let source: Option<String> = row.get(1)?;
    let date_added: Option<i64> = row.get(2)?;

    let file_name = destination.as_deref().and_then(|uri| {
        uri.strip_prefix("file://")
            .unwrap_or(uri)
            .rsplit('/')
            .find(|part| !part.is_empty())
    });

    Ok(CanonicalRecord {
        kind: RecordKind::Download,
        url: clean_or(source.as_deref(), NO_SOURCE),
        title: clean_or(file_name, UNKNOWN),
        visit_count: None,
        timestamp: timecodec::decode_firefox(date_added),
    })
}

fn map_cookie(row: &Row<'_>) -> rusqlite::Result<CanonicalRecord> {
    let name: Option<String> = row.get(0)?;
    let host: Option<String> = row.get(1)?;
    let expiry: Option<i64> = row.get(2)?;

    Ok(CanonicalRecord {
        kind: RecordKind::Cookie,
        url: clean_string(host.as_deref()),
        title: format!("Cookie: {}", clean_string(name.as_deref())),
        visit_count: None,
        timestamp: timecodec::decode_unix_seconds(expiry),
    })
}

fn map_form_entry(row: &Row<'_>) -> rusqlite::Result<CanonicalRecord> {
    let fieldname: Option<String> = row.get(0)?;
    let value: Option<String> = row.get(1)?;

    Ok(CanonicalRecord {
        kind: RecordKind::Autofill,
        url: NO_URL.to_string(),
        title: format!(
            "{}: {}",
            clean_string(fieldname.as_deref()),
            clean_string(value.as_deref())
        ),
        visit_count: None,
        timestamp: None,
    })
}
