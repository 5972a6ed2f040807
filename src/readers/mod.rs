//! Schema readers: per-family table knowledge behind one interface
//!
//! Each reader describes its tables as a list of [`SubQuery`]s. Paging,
//! table-existence checks and per-table error collection are shared.

pub mod chromium;
pub mod firefox;
pub mod firefox_logins;

pub use chromium::ChromiumReader;
pub use firefox::FirefoxReader;

use rusqlite::{Connection, Row};
use tracing::{debug, warn};

use crate::browsers::BrowserType;
use crate::error::Result;
use crate::record::{ArtifactKind, CanonicalRecord, DataTypeFilter, RecordKind};

/// One SQL source for one record kind
///
/// `select` takes `?1` = row limit and `?2` = offset.
pub struct SubQuery {
    pub kind: RecordKind,
    pub tables: &'static [&'static str],
    pub select: &'static str,
    pub count: &'static str,
    pub map_row: fn(&Row<'_>) -> rusqlite::Result<CanonicalRecord>,
}

/// Records read for one page plus the per-table problems met on the way
#[derive(Debug, Default)]
pub struct PageRead {
    pub records: Vec<CanonicalRecord>,
    pub notes: Vec<String>,
    /// Sub-kinds whose count and select both ran, even if they returned nothing
    pub succeeded: usize,
    /// True row count summed over the succeeded sub-kinds only
    pub available: u64,
}

pub trait SchemaReader: Send + Sync {
    fn browser_type(&self) -> BrowserType;

    /// Candidate sources for a bucket, grouped by kind in output order
    ///
    /// When a kind has several candidates the first one whose tables all exist wins.
    fn sub_queries(&self, artifact: ArtifactKind) -> &'static [SubQuery];

    /// Read one page of every sub-kind selected by `filter`
    ///
    /// Each sub-kind gets its own `page_cap` limit, so an `all` page may hold
    /// more than `page_cap` rows. Missing tables and failing queries become
    /// notes and add nothing to `available`. A database the driver cannot read
    /// at all is an error.
    fn read_page(
        &self,
        conn: &Connection,
        artifact: ArtifactKind,
        filter: DataTypeFilter,
        page_cap: u32,
        offset: u64,
    ) -> Result<PageRead> {
        let mut page = PageRead::default();

        for (kind, candidates) in grouped(self.sub_queries(artifact), filter) {
            let Some(query) = pick_source(conn, &candidates)? else {
                let note = missing_note(kind, &candidates);
                warn!("{}: {}", self.browser_type().name(), note);
                page.notes.push(note);
                continue;
            };

            let outcome = count_rows(conn, query)
                .and_then(|count| Ok((count, run_select(conn, query, page_cap, offset)?)));
            match outcome {
                Ok((count, records)) => {
                    debug!(
                        "{} {}: {} of {} rows at offset {}",
                        self.browser_type().name(),
                        kind.label(),
                        records.len(),
                        count,
                        offset
                    );
                    page.records.extend(records);
                    page.available += count;
                    page.succeeded += 1;
                }
                Err(e) => {
                    let note = format!(
                        "{} query on {} failed",
                        kind.label(),
                        query.tables.join(" + ")
                    );
                    warn!("{}: {}: {}", self.browser_type().name(), note, e);
                    page.notes.push(note);
                }
            }
        }

        Ok(page)
    }

    /// True row count over every readable sub-kind, ignoring paging
    ///
    /// Agrees with [`PageRead::available`]: a sub-kind whose query cannot run
    /// is not counted.
    fn count_total(
        &self,
        conn: &Connection,
        artifact: ArtifactKind,
        filter: DataTypeFilter,
    ) -> Result<u64> {
        Ok(self.read_page(conn, artifact, filter, 0, 0)?.available)
    }
}

/// Reader for a browser's SQL databases
pub fn reader_for(browser: BrowserType) -> Box<dyn SchemaReader> {
    match browser {
        BrowserType::Edge | BrowserType::Brave => Box::new(ChromiumReader::new(browser)),
        BrowserType::Firefox => Box::new(FirefoxReader),
    }
}

pub fn table_exists(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    let mut stmt =
        conn.prepare_cached("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
    let mut rows = stmt.query([name])?;
    Ok(rows.next()?.is_some())
}

fn grouped(
    queries: &'static [SubQuery],
    filter: DataTypeFilter,
) -> Vec<(RecordKind, Vec<&'static SubQuery>)> {
    let mut groups: Vec<(RecordKind, Vec<&'static SubQuery>)> = Vec::new();
    for query in queries.iter().filter(|q| filter.includes(q.kind)) {
        match groups.iter_mut().find(|(kind, _)| *kind == query.kind) {
            Some((_, candidates)) => candidates.push(query),
            None => groups.push((query.kind, vec![query])),
        }
    }
    groups
}

fn pick_source<'q>(
    conn: &Connection,
    candidates: &[&'q SubQuery],
) -> rusqlite::Result<Option<&'q SubQuery>> {
    for query in candidates.iter().copied() {
        let mut present = true;
        for table in query.tables {
            if !table_exists(conn, table)? {
                present = false;
                break;
            }
        }
        if present {
            return Ok(Some(query));
        }
    }
    Ok(None)
}

fn missing_note(kind: RecordKind, candidates: &[&SubQuery]) -> String {
    let tables: Vec<String> = candidates.iter().map(|q| q.tables.join(" + ")).collect();
    format!(
        "{} table {} does not exist",
        kind.label(),
        tables.join(" or ")
    )
}

fn count_rows(conn: &Connection, query: &SubQuery) -> rusqlite::Result<u64> {
    let count: i64 = conn.query_row(query.count, [], |row| row.get(0))?;
    Ok(u64::try_from(count).unwrap_or(0))
}

/// Run the page select; with a zero cap the statement is only prepared
fn run_select(
    conn: &Connection,
    query: &SubQuery,
    page_cap: u32,
    offset: u64,
) -> rusqlite::Result<Vec<CanonicalRecord>> {
    let mut stmt = conn.prepare(query.select)?;
    if page_cap == 0 {
        return Ok(Vec::new());
    }
    let offset = i64::try_from(offset).unwrap_or(i64::MAX);
    let rows = stmt.query_map((i64::from(page_cap), offset), query.map_row)?;
    let records = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(records)
}
