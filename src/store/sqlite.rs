// src/store/sqlite.rs

//! SQLite-backed job store.
//!
//! Owns all state that survives across runs. Uniqueness on the
//! normalized (title, company) identity is enforced twice: a pre-insert
//! existence check decides whether to skip, and a UNIQUE constraint on
//! `identity_hash` backs it at the schema level so a racing writer
//! cannot slip a duplicate past the check.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::Result;
use crate::models::{Category, EnrichedPosting, SourceInfo, StoreStats, StoredJob};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS sources (
        id   INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        url  TEXT
    );

    CREATE TABLE IF NOT EXISTS jobs (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        title         TEXT NOT NULL,
        company       TEXT NOT NULL,
        link          TEXT NOT NULL DEFAULT '',
        description   TEXT NOT NULL DEFAULT '',
        category      TEXT NOT NULL,
        score         REAL NOT NULL,
        keywords      TEXT NOT NULL DEFAULT '',
        summary       TEXT NOT NULL DEFAULT '',
        identity_hash TEXT NOT NULL UNIQUE,
        source_id     INTEGER REFERENCES sources(id),
        collected_at  TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_jobs_category ON jobs(category);
";

/// Durable, idempotent persistence for enriched postings.
pub struct JobStore {
    conn: Connection,
}

impl JobStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::configure(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::configure(&conn)?;
        Ok(Self { conn })
    }

    fn configure(conn: &Connection) -> Result<()> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(())
    }

    /// Create the schema if absent. Safe to call on every run start.
    pub fn ensure_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Record configured sources with their URLs, creating or updating
    /// the URL of each by name.
    pub fn register_sources(&self, sources: &[SourceInfo]) -> Result<()> {
        for source in sources {
            self.conn.execute(
                "INSERT INTO sources (name, url) VALUES (?1, ?2)
                 ON CONFLICT(name) DO UPDATE SET url = excluded.url",
                params![source.name, source.url],
            )?;
        }
        Ok(())
    }

    /// Insert each record that is not already stored; skip the rest.
    ///
    /// First write wins: an existing row is neither duplicated nor
    /// updated, so storage is at-most-once per logical job across the
    /// lifetime of the database. Returns the number of rows inserted.
    /// The whole batch runs in one transaction.
    pub fn upsert(&mut self, batch: &[EnrichedPosting]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0;

        for record in batch {
            let key = record.posting.dedup_key();
            let exists: Option<i64> = tx
                .query_row(
                    "SELECT id FROM jobs WHERE identity_hash = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?;
            if exists.is_some() {
                continue;
            }

            let source_id = Self::resolve_source(&tx, &record.posting.source)?;
            tx.execute(
                "INSERT INTO jobs (title, company, link, description, category, score,
                                   keywords, summary, identity_hash, source_id, collected_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    record.posting.title,
                    record.posting.company,
                    record.posting.link,
                    record.posting.description,
                    record.category.as_str(),
                    record.score,
                    join_keywords(&record.keywords),
                    record.summary,
                    key,
                    source_id,
                    record.posting.collected_at,
                ],
            )?;
            inserted += 1;
        }

        tx.commit()?;
        Ok(inserted)
    }

    /// Look up a source by name, creating it lazily on first encounter.
    fn resolve_source(conn: &Connection, name: &str) -> Result<i64> {
        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM sources WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(id) = existing {
            return Ok(id);
        }
        conn.execute("INSERT INTO sources (name) VALUES (?1)", params![name])?;
        Ok(conn.last_insert_rowid())
    }

    /// Query stored jobs, newest first, optionally filtered to an exact
    /// category label.
    pub fn query(&self, category: Option<&str>, limit: usize) -> Result<Vec<StoredJob>> {
        const COLUMNS: &str = "id, title, company, link, description, category, score,
                               keywords, summary, source_id, collected_at";

        let mut jobs = Vec::new();
        match category {
            Some(category) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {COLUMNS} FROM jobs WHERE category = ?1
                     ORDER BY collected_at DESC LIMIT ?2"
                ))?;
                let rows = stmt.query_map(params![category, limit as i64], job_from_row)?;
                for row in rows {
                    jobs.push(row?);
                }
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {COLUMNS} FROM jobs ORDER BY collected_at DESC LIMIT ?1"
                ))?;
                let rows = stmt.query_map(params![limit as i64], job_from_row)?;
                for row in rows {
                    jobs.push(row?);
                }
            }
        }
        Ok(jobs)
    }

    /// Total and per-category row counts.
    pub fn stats(&self) -> Result<StoreStats> {
        let total: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM jobs", [], |row| row.get(0))?;

        let mut stmt = self.conn.prepare(
            "SELECT category, COUNT(*) FROM jobs GROUP BY category ORDER BY category",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;

        let mut per_category = Vec::new();
        for row in rows {
            per_category.push(row?);
        }
        Ok(StoreStats {
            total,
            per_category,
        })
    }
}

fn job_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredJob> {
    let category: String = row.get(5)?;
    let keywords: String = row.get(7)?;
    let collected_at: DateTime<Utc> = row.get(10)?;
    Ok(StoredJob {
        id: row.get(0)?,
        title: row.get(1)?,
        company: row.get(2)?,
        link: row.get(3)?,
        description: row.get(4)?,
        category: Category::parse(&category),
        score: row.get(6)?,
        keywords: split_keywords(&keywords),
        summary: row.get(8)?,
        source_id: row.get(9)?,
        collected_at,
    })
}

/// Keywords live in a single comma-separated column.
fn join_keywords(keywords: &[String]) -> String {
    keywords.join(", ")
}

fn split_keywords(column: &str) -> Vec<String> {
    column
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
