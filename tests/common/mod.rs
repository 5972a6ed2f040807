//! Fake user home trees shared by the integration tests

#![allow(dead_code)]

use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use browser_artifacts::browsers::Platform;
use browser_artifacts::config::ExtractorConfig;
use browser_artifacts::extract::Extractor;

/// 2023-01-01 00:00:00 UTC in WebKit microseconds
pub const CHROME_2023: i64 = 13_317_004_800_000_000;
/// 2023-01-01 00:00:00 UTC in Unix microseconds
pub const FIREFOX_2023: i64 = 1_672_531_200_000_000;

pub const FIREFOX_PROFILE: &str = "abcd1234.default-release";

pub struct FakeHome {
    pub home: TempDir,
    pub snapshots: TempDir,
}

impl FakeHome {
    pub fn new() -> Self {
        Self {
            home: TempDir::new().unwrap(),
            snapshots: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.home.path()
    }

    pub fn config(&self) -> ExtractorConfig {
        ExtractorConfig::default()
            .with_home(self.path().to_path_buf())
            .with_platform(Platform::Windows)
            .with_snapshot_dir(self.snapshots.path().to_path_buf())
    }

    pub fn extractor(&self) -> Extractor {
        Extractor::new(self.config())
    }

    pub fn snapshot_count(&self) -> usize {
        fs::read_dir(self.snapshots.path()).unwrap().count()
    }

    pub fn chromium_profile(&self, vendor: &[&str]) -> PathBuf {
        let mut dir = self.path().join("AppData").join("Local");
        for part in vendor {
            dir = dir.join(part);
        }
        let dir = dir.join("User Data").join("Default");
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    pub fn edge_profile(&self) -> PathBuf {
        self.chromium_profile(&["Microsoft", "Edge"])
    }

    pub fn brave_profile(&self) -> PathBuf {
        self.chromium_profile(&["BraveSoftware", "Brave-Browser"])
    }

    pub fn firefox_profile(&self) -> PathBuf {
        let dir = self
            .path()
            .join("AppData")
            .join("Roaming")
            .join("Mozilla")
            .join("Firefox")
            .join("Profiles")
            .join(FIREFOX_PROFILE);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Edge `History` with `visits` distinct pages visited once each, newest first by id
    pub fn with_edge_history(&self, visits: i64, with_downloads: bool) -> PathBuf {
        let path = self.edge_profile().join("History");
        write_chromium_history(&path, visits, with_downloads);
        path
    }

    /// Firefox profile with `places.sqlite` holding `places` pages
    pub fn with_firefox_places(&self, places: i64) -> PathBuf {
        let path = self.firefox_profile().join("places.sqlite");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE moz_places (id INTEGER PRIMARY KEY, url TEXT, title TEXT, visit_count INTEGER, last_visit_date INTEGER);",
        )
        .unwrap();
        for i in 0..places {
            conn.execute(
                "INSERT INTO moz_places (url, title, visit_count, last_visit_date) VALUES (?1, ?2, ?3, ?4)",
                (
                    format!("https://page{}.example/", i),
                    format!("Page {}", i),
                    i + 1,
                    FIREFOX_2023 + i * 1_000_000,
                ),
            )
            .unwrap();
        }
        path
    }

    pub fn with_firefox_logins(&self, json: &str) -> PathBuf {
        let path = self.firefox_profile().join("logins.json");
        fs::write(&path, json).unwrap();
        path
    }
}

pub fn write_chromium_history(path: &Path, visits: i64, with_downloads: bool) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE urls (id INTEGER PRIMARY KEY, url TEXT, title TEXT, visit_count INTEGER);
         CREATE TABLE visits (id INTEGER PRIMARY KEY, url INTEGER, visit_time INTEGER);",
    )
    .unwrap();
    for i in 0..visits {
        conn.execute(
            "INSERT INTO urls (id, url, title, visit_count) VALUES (?1, ?2, ?3, 1)",
            (i + 1, format!("https://site{}.example/", i), format!("Site {}", i)),
        )
        .unwrap();
        conn.execute(
            "INSERT INTO visits (url, visit_time) VALUES (?1, ?2)",
            (i + 1, CHROME_2023 + i * 1_000_000),
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
            (
                "C:\\Users\\me\\Downloads\\setup.exe",
                "https://vendor.example/download",
                CHROME_2023,
            ),
        )
        .unwrap();
    }
}
