//! SQLite poem index
//!
//! The durable index keyed by page identity. It backs the resume feature
//! (pre-populating the frontier's scheduled-set) and the `--stats` report;
//! the full records live in the JSONL store next to it.

use crate::corpus::ExtractedPoem;
use crate::sink::SinkResult;
use rusqlite::{params, Connection};
use std::collections::HashSet;
use std::path::Path;

/// Aggregate corpus counts for the end-of-run and `--stats` reports
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusStats {
    pub total_poems: u64,
    pub distinct_authors: u64,
    pub distinct_collections: u64,
    pub hub_grouped_poems: u64,
    pub duplicate_checksums: u64,
}

/// SQLite-backed poem index
pub struct PoemIndex {
    conn: Connection,
}

impl PoemIndex {
    /// Opens (or creates) the index at the given path
    pub fn open(path: &Path) -> SinkResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Creates an in-memory index (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> SinkResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Inserts or replaces the index row for a poem, keyed by page identity
    ///
    /// Replace-on-conflict makes duplicate emission idempotent: later-arriving
    /// records for the same page carry strictly more context, never less.
    pub fn upsert(&self, poem: &ExtractedPoem) -> SinkResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO poems (
                page_id, title, author, language,
                collection_page_id, collection_title, section_title, hub_page_id,
                checksum_sha256, extraction_timestamp
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                poem.page_id,
                poem.title,
                poem.metadata.author,
                poem.language,
                poem.collection_page_id,
                poem.collection_title,
                poem.section_title,
                poem.hub_page_id,
                poem.checksum_sha256,
                poem.extraction_timestamp.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// All page identities currently indexed, for the resume feature
    pub fn processed_ids(&self) -> SinkResult<HashSet<i64>> {
        let mut stmt = self.conn.prepare("SELECT page_id FROM poems")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(ids)
    }

    /// Number of indexed poems
    pub fn count(&self) -> SinkResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM poems", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Aggregate counts for the stats report
    pub fn corpus_stats(&self) -> SinkResult<CorpusStats> {
        let total_poems = self.count()?;

        let distinct_authors: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT author) FROM poems WHERE author IS NOT NULL",
            [],
            |row| row.get(0),
        )?;

        let distinct_collections: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT collection_title) FROM poems WHERE collection_title IS NOT NULL",
            [],
            |row| row.get(0),
        )?;

        let hub_grouped_poems: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM poems WHERE hub_page_id != page_id",
            [],
            |row| row.get(0),
        )?;

        let duplicate_checksums: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(n - 1), 0) FROM
             (SELECT COUNT(*) AS n FROM poems GROUP BY checksum_sha256 HAVING n > 1)",
            [],
            |row| row.get(0),
        )?;

        Ok(CorpusStats {
            total_poems,
            distinct_authors: distinct_authors as u64,
            distinct_collections: distinct_collections as u64,
            hub_grouped_poems: hub_grouped_poems as u64,
            duplicate_checksums: duplicate_checksums as u64,
        })
    }
}

fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS poems (
            page_id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            author TEXT,
            language TEXT NOT NULL,
            collection_page_id INTEGER,
            collection_title TEXT,
            section_title TEXT,
            hub_page_id INTEGER NOT NULL,
            checksum_sha256 TEXT NOT NULL,
            extraction_timestamp TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_poems_author ON poems(author);
        CREATE INDEX IF NOT EXISTS idx_poems_checksum ON poems(checksum_sha256);
        CREATE INDEX IF NOT EXISTS idx_poems_hub ON poems(hub_page_id);
    ",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{PoemMetadata, PoemStructure};
    use chrono::Utc;

    fn poem(page_id: i64, title: &str) -> ExtractedPoem {
        ExtractedPoem {
            page_id,
            revision_id: 1,
            title: title.to_string(),
            language: "fr".to_string(),
            wikisource_url: format!("https://fr.wikisource.org/wiki/{}", title),
            collection_page_id: None,
            collection_title: None,
            section_title: None,
            poem_order: None,
            collection_structure: None,
            hub_page_id: page_id,
            hub_title: None,
            metadata: PoemMetadata {
                author: Some("Lamartine".to_string()),
                ..Default::default()
            },
            structure: PoemStructure {
                stanzas: vec![vec!["v".to_string()]],
                raw_markers: vec![],
            },
            normalized_text: "v".to_string(),
            checksum_sha256: format!("{:064x}", page_id),
            extraction_timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_upsert_and_processed_ids() {
        let index = PoemIndex::open_in_memory().unwrap();
        index.upsert(&poem(1, "Le Lac")).unwrap();
        index.upsert(&poem(2, "Le Vallon")).unwrap();

        let ids = index.processed_ids().unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&1));
        assert!(ids.contains(&2));
    }

    #[test]
    fn test_upsert_is_last_write_wins() {
        let index = PoemIndex::open_in_memory().unwrap();
        index.upsert(&poem(1, "Le Lac")).unwrap();

        let mut richer = poem(1, "Le Lac");
        richer.collection_title = Some("Méditations poétiques".to_string());
        index.upsert(&richer).unwrap();

        assert_eq!(index.count().unwrap(), 1);
        let title: Option<String> = index
            .conn
            .query_row(
                "SELECT collection_title FROM poems WHERE page_id = 1",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(title.as_deref(), Some("Méditations poétiques"));
    }

    #[test]
    fn test_corpus_stats() {
        let index = PoemIndex::open_in_memory().unwrap();

        let mut a = poem(1, "A");
        a.collection_title = Some("Recueil".to_string());
        index.upsert(&a).unwrap();

        let mut b = poem(2, "B");
        b.hub_page_id = 99;
        index.upsert(&b).unwrap();

        // Same checksum as A: one duplicate
        let mut c = poem(3, "C");
        c.checksum_sha256 = a.checksum_sha256.clone();
        index.upsert(&c).unwrap();

        let stats = index.corpus_stats().unwrap();
        assert_eq!(stats.total_poems, 3);
        assert_eq!(stats.distinct_authors, 1);
        assert_eq!(stats.distinct_collections, 1);
        assert_eq!(stats.hub_grouped_poems, 1);
        assert_eq!(stats.duplicate_checksums, 1);
    }
}
