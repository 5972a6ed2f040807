//! Edge and Brave share the Chromium profile schema
//!
//! - History: `urls` joined with `visits`, plus `downloads`
//! - Network/Cookies: `cookies`
//! - Login Data: `logins`
//! - Web Data: `autofill`
//!
//! All timestamps are WebKit microseconds.

use rusqlite::Row;

use crate::browsers::BrowserType;
use crate::readers::{SchemaReader, SubQuery};
use crate::record::{
    clean_or, clean_string, ArtifactKind, CanonicalRecord, RecordKind, NO_PATH, NO_SOURCE,
    NO_TITLE, NO_URL,
};
use crate::timecodec;

pub struct ChromiumReader {
    browser: BrowserType,
}

impl ChromiumReader {
    pub fn new(browser: BrowserType) -> Self {
        Self { browser }
    }
}

impl SchemaReader for ChromiumReader {
    fn browser_type(&self) -> BrowserType {
        self.browser
    }

    fn sub_queries(&self, artifact: ArtifactKind) -> &'static [SubQuery] {
        match artifact {
            ArtifactKind::History => HISTORY_QUERIES,
            ArtifactKind::Cookies => COOKIE_QUERIES,
            ArtifactKind::Logins => LOGIN_QUERIES,
            ArtifactKind::Autofill => AUTOFILL_QUERIES,
        }
    }
}

static HISTORY_QUERIES: &[SubQuery] = &[
    SubQuery {
        kind: RecordKind::History,
        tables: &["urls", "visits"],
        select: "SELECT urls.url, urls.title, urls.visit_count, visits.visit_time
                 FROM urls JOIN visits ON urls.id = visits.url
                 ORDER BY visits.visit_time DESC
                 LIMIT ?1 OFFSET ?2",
        count: "SELECT COUNT(*) FROM urls JOIN visits ON urls.id = visits.url",
        map_row: map_visit,
    },
    SubQuery {
        kind: RecordKind::Download,
        tables: &["downloads"],
        select: "SELECT target_path, referrer, start_time
                 FROM downloads
                 ORDER BY start_time DESC
                 LIMIT ?1 OFFSET ?2",
        count: "SELECT COUNT(*) FROM downloads",
        map_row: map_download,
    },
];

static COOKIE_QUERIES: &[SubQuery] = &[SubQuery {
    kind: RecordKind::Cookie,
    tables: &["cookies"],
    select: "SELECT name, host_key, expires_utc
             FROM cookies
             ORDER BY rowid
             LIMIT ?1 OFFSET ?2",
    count: "SELECT COUNT(*) FROM cookies",
    map_row: map_cookie,
}];

static LOGIN_QUERIES: &[SubQuery] = &[SubQuery {
    kind: RecordKind::Login,
    tables: &["logins"],
    select: "SELECT origin_url, username_value, date_created
             FROM logins
             ORDER BY rowid
             LIMIT ?1 OFFSET ?2",
    count: "SELECT COUNT(*) FROM logins",
    map_row: map_login,
}];

static AUTOFILL_QUERIES: &[SubQuery] = &[SubQuery {
    kind: RecordKind::Autofill,
    tables: &["autofill"],
    select: "SELECT name, value, date_created
             FROM autofill
             ORDER BY rowid
             LIMIT ?1 OFFSET ?2",
    count: "SELECT COUNT(*) FROM autofill",
    map_row: map_autofill,
}];

fn map_visit(row: &Row<'_>) -> rusqlite::Result<CanonicalRecord> {
    let url: Option<String> = row.get(0)?;
    let title: Option<String> = row.get(1)?;
    let visit_count: Option<i64> = row.get(2)?;
    let visit_time: Option<i64> = row.get(3)?;

    Ok(CanonicalRecord {
        kind: RecordKind::History,
        url: clean_string(url.as_deref()),
        title: clean_or(title.as_deref(), NO_TITLE),
        visit_count,
        timestamp: timecodec::decode_chrome(visit_time),
    })
}

fn map_download(row: &Row<'_>) -> rusqlite::Result<CanonicalRecord> {
    let target_path: Option<String> = row.get(0)?;
    let referrer: Option<String> = row.get(1)?;
    let start_time: Option<i64> = row.get(2)?;

    Ok(CanonicalRecord {
        kind: RecordKind::Download,
        url: clean_or(referrer.as_deref(), NO_SOURCE),
        title: clean_or(target_path.as_deref().map(file_name), NO_PATH),
        visit_count: None,
        timestamp: timecodec::decode_chrome(start_time),
    })
}

fn map_cookie(row: &Row<'_>) -> rusqlite::Result<CanonicalRecord> {
    let name: Option<String> = row.get(0)?;
    let host: Option<String> = row.get(1)?;
    let expires_utc: Option<i64> = row.get(2)?;

    Ok(CanonicalRecord {
        kind: RecordKind::Cookie,
        url: clean_string(host.as_deref()),
        title: format!("Cookie: {}", clean_string(name.as_deref())),
        visit_count: None,
        timestamp: timecodec::decode_chrome(expires_utc),
    })
}

fn map_login(row: &Row<'_>) -> rusqlite::Result<CanonicalRecord> {
    let origin_url: Option<String> = row.get(0)?;
    let username: Option<String> = row.get(1)?;
    let date_created: Option<i64> = row.get(2)?;

    Ok(CanonicalRecord {
        kind: RecordKind::Login,
        url: clean_string(origin_url.as_deref()),
        title: format!("Username: {}", clean_string(username.as_deref())),
        visit_count: None,
        timestamp: timecodec::decode_chrome(date_created),
    })
}

fn map_autofill(row: &Row<'_>) -> rusqlite::Result<CanonicalRecord> {
    let name: Option<String> = row.get(0)?;
    let value: Option<String> = row.get(1)?;
    let date_created: Option<i64> = row.get(2)?;

    Ok(CanonicalRecord {
        kind: RecordKind::Autofill,
        url: NO_URL.to_string(),
        title: format!(
            "{}: {}",
            clean_string(name.as_deref()),
            clean_string(value.as_deref())
        ),
        visit_count: None,
        timestamp: timecodec::decode_chrome(date_created),
    })
}

/// Last component of a download target, whichever separator the OS used
fn file_name(target_path: &str) -> &str {
    target_path
        .rsplit(['/', '\\'])
        .find(|part| !part.is_empty())
        .unwrap_or(target_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DataTypeFilter;
    use rusqlite::Connection;

    const CHROME_2023: i64 = 13_317_004_800_000_000;
    const HOUR: i64 = 3_600_000_000;

    fn history_db(visits: usize, with_downloads: bool) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE urls (id INTEGER PRIMARY KEY, url TEXT, title TEXT, visit_count INTEGER);
             CREATE TABLE visits (id INTEGER PRIMARY KEY, url INTEGER, visit_time INTEGER);",
        )
        .unwrap();
        for i in 0..visits {
            conn.execute(
                "INSERT INTO urls (id, url, title, visit_count) VALUES (?1, ?2, ?3, 1)",
                (i as i64 + 1, format!("https://site{}.example/", i), format!("Site {}", i)),
            )
            .unwrap();
            conn.execute(
                "INSERT INTO visits (url, visit_time) VALUES (?1, ?2)",
                (i as i64 + 1, CHROME_2023 + i as i64 * HOUR),
            )
            .unwrap();
        }
        if with_downloads {
            conn.execute_batch(
                "CREATE TABLE downloads (id INTEGER PRIMARY KEY, target_path TEXT, referrer TEXT, start_time INTEGER);",
            )
            .unwrap();
            conn.execute(
                "INSERT INTO downloads (target_path, referrer, start_time) VALUES (?1, ?2, ?3)",
                (r"C:\Users\me\Downloads\setup.exe", "https://dl.example/", CHROME_2023),
            )
            .unwrap();
            conn.execute(
                "INSERT INTO downloads (target_path, referrer, start_time) VALUES (NULL, NULL, 0)",
                [],
            )
            .unwrap();
        }
        conn
    }

    #[test]
    fn test_history_is_most_recent_first() {
        let conn = history_db(5, false);
        let reader = ChromiumReader::new(BrowserType::Edge);
        let page = reader
            .read_page(&conn, ArtifactKind::History, DataTypeFilter::History, 3, 0)
            .unwrap();

        assert!(page.notes.is_empty());
        assert_eq!(page.records.len(), 3);
        assert_eq!(page.records[0].url, "https://site4.example/");
        assert_eq!(page.records[0].visit_count, Some(1));
        assert_eq!(page.records[0].timestamp_display(), "01/01/2023 04:00:00");
        assert_eq!(page.records[2].title, "Site 2");
    }

    #[test]
    fn test_all_filter_caps_each_sub_kind() {
        let conn = history_db(5, true);
        let reader = ChromiumReader::new(BrowserType::Brave);
        let page = reader
            .read_page(&conn, ArtifactKind::History, DataTypeFilter::All, 2, 0)
            .unwrap();

        // 2 visits + 2 downloads: each sub-kind is capped separately
        assert_eq!(page.records.len(), 4);
        let downloads: Vec<_> = page
            .records
            .iter()
            .filter(|r| r.kind == RecordKind::Download)
            .collect();
        assert_eq!(downloads[0].title, "setup.exe");
        assert_eq!(downloads[0].url, "https://dl.example/");
        assert_eq!(downloads[1].title, NO_PATH);
        assert_eq!(downloads[1].url, NO_SOURCE);
        assert_eq!(downloads[1].timestamp, None);

        let total = reader
            .count_total(&conn, ArtifactKind::History, DataTypeFilter::All)
            .unwrap();
        assert_eq!(total, 7);
    }

    #[test]
    fn test_missing_table_becomes_note() {
        let conn = history_db(3, false);
        let reader = ChromiumReader::new(BrowserType::Edge);
        let page = reader
            .read_page(&conn, ArtifactKind::History, DataTypeFilter::All, 20, 0)
            .unwrap();

        assert_eq!(page.records.len(), 3);
        assert_eq!(page.notes.len(), 1);
        assert!(page.notes[0].contains("downloads"));

        let page = reader
            .read_page(&conn, ArtifactKind::History, DataTypeFilter::Downloads, 20, 0)
            .unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.notes.len(), 1);
    }

    #[test]
    fn test_offset_past_end_is_empty() {
        let conn = history_db(3, false);
        let reader = ChromiumReader::new(BrowserType::Edge);
        let page = reader
            .read_page(&conn, ArtifactKind::History, DataTypeFilter::History, 20, 40)
            .unwrap();
        assert!(page.records.is_empty());
        assert!(page.notes.is_empty());
    }

    #[test]
    fn test_cookies_logins_autofill() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE cookies (name TEXT, value TEXT, host_key TEXT, path TEXT, expires_utc INTEGER);
             INSERT INTO cookies VALUES ('sid', 'x', '.example.com', '/', 13317004800000000);
             CREATE TABLE logins (origin_url TEXT, username_value TEXT, password_value BLOB, date_created INTEGER);
             INSERT INTO logins VALUES ('https://login.example/', 'alice', x'00', 0);
             CREATE TABLE autofill (name TEXT, value TEXT, date_created INTEGER);
             INSERT INTO autofill VALUES ('email', 'alice@example.com', 1672531200);",
        )
        .unwrap();
        let reader = ChromiumReader::new(BrowserType::Edge);

        let cookies = reader
            .read_page(&conn, ArtifactKind::Cookies, DataTypeFilter::All, 20, 0)
            .unwrap();
        assert_eq!(cookies.records[0].url, ".example.com");
        assert_eq!(cookies.records[0].title, "Cookie: sid");
        assert_eq!(cookies.records[0].timestamp_display(), "01/01/2023 00:00:00");

        let logins = reader
            .read_page(&conn, ArtifactKind::Logins, DataTypeFilter::Logins, 20, 0)
            .unwrap();
        assert_eq!(logins.records[0].title, "Username: alice");
        assert_eq!(logins.records[0].timestamp, None);

        let autofill = reader
            .read_page(&conn, ArtifactKind::Autofill, DataTypeFilter::All, 20, 0)
            .unwrap();
        assert_eq!(autofill.records[0].url, NO_URL);
        assert_eq!(autofill.records[0].title, "email: alice@example.com");
        // WebKit value this small lands in 1601
        assert_eq!(autofill.records[0].timestamp, None);
    }

    #[test]
    fn test_filter_outside_bucket_reads_nothing() {
        let conn = history_db(3, true);
        let reader = ChromiumReader::new(BrowserType::Edge);
        let page = reader
            .read_page(&conn, ArtifactKind::History, DataTypeFilter::Cookies, 20, 0)
            .unwrap();
        assert!(page.records.is_empty());
        assert!(page.notes.is_empty());
        assert_eq!(
            reader
                .count_total(&conn, ArtifactKind::History, DataTypeFilter::Cookies)
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_failed_sub_kind_is_not_counted() {
        let conn = history_db(3, false);
        // Schema drift: no referrer column, so the download select cannot run
        conn.execute_batch(
            "CREATE TABLE downloads (id INTEGER PRIMARY KEY, target_path TEXT, start_time INTEGER);",
        )
        .unwrap();
        for i in 0..40 {
            conn.execute(
                "INSERT INTO downloads (target_path, start_time) VALUES (?1, 0)",
                [format!("/tmp/file{}.bin", i)],
            )
            .unwrap();
        }
        let reader = ChromiumReader::new(BrowserType::Edge);

        let page = reader
            .read_page(&conn, ArtifactKind::History, DataTypeFilter::All, 20, 0)
            .unwrap();
        assert_eq!(page.records.len(), 3);
        assert_eq!(page.available, 3);
        assert_eq!(page.succeeded, 1);
        assert_eq!(page.notes, vec!["Download query on downloads failed".to_string()]);
        assert_eq!(
            reader
                .count_total(&conn, ArtifactKind::History, DataTypeFilter::All)
                .unwrap(),
            3
        );
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(r"C:\a\b.zip"), "b.zip");
        assert_eq!(file_name("/home/me/c.tar.gz"), "c.tar.gz");
        assert_eq!(file_name("plain"), "plain");
        assert_eq!(file_name("/dir/"), "dir");
    }
}
