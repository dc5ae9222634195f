//! CSV audit logs
//!
//! Three append-only CSVs per run: expanded collections, expanded hubs, and
//! pages skipped as other/author/disambiguation. Rows are written as pages
//! classify, from multiple workers, behind per-file locks.

use chrono::Utc;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

const PAGE_HEADER: &str = "Timestamp,PageTitle,URL,ParentTitle,Reason";
const EXPANSION_HEADER: &str = "Timestamp,PageTitle,URL,ParentTitle,Reason,ChildCount";

/// Thread-safe writers for the three audit CSVs
pub struct AuditLog {
    collections: Mutex<BufWriter<File>>,
    hubs: Mutex<BufWriter<File>>,
    others: Mutex<BufWriter<File>>,
}

impl AuditLog {
    /// Creates the log directory and the three CSV files with headers
    pub fn create(log_dir: &Path) -> io::Result<Self> {
        std::fs::create_dir_all(log_dir)?;

        let open = |name: &str, header: &str| -> io::Result<Mutex<BufWriter<File>>> {
            let mut writer = BufWriter::new(File::create(log_dir.join(name))?);
            writeln!(writer, "{}", header)?;
            Ok(Mutex::new(writer))
        };

        Ok(Self {
            collections: open("collections.csv", EXPANSION_HEADER)?,
            hubs: open("hubs.csv", EXPANSION_HEADER)?,
            others: open("other_pages.csv", PAGE_HEADER)?,
        })
    }

    /// Records an expanded collection page with its child count
    pub fn log_collection(&self, title: &str, url: &str, parent: &str, reason: &str, children: usize) {
        self.append(
            &self.collections,
            &[
                &Utc::now().to_rfc3339(),
                title,
                url,
                parent,
                reason,
                &children.to_string(),
            ],
        );
    }

    /// Records an expanded hub page with its child count
    pub fn log_hub(&self, title: &str, url: &str, parent: &str, reason: &str, children: usize) {
        self.append(
            &self.hubs,
            &[
                &Utc::now().to_rfc3339(),
                title,
                url,
                parent,
                reason,
                &children.to_string(),
            ],
        );
    }

    /// Records a page skipped without expansion
    pub fn log_other(&self, title: &str, url: &str, parent: &str, reason: &str) {
        self.append(
            &self.others,
            &[&Utc::now().to_rfc3339(), title, url, parent, reason],
        );
    }

    /// Flushes all three files
    pub fn flush(&self) {
        for writer in [&self.collections, &self.hubs, &self.others] {
            if let Err(e) = writer.lock().unwrap().flush() {
                tracing::warn!("Failed to flush audit log: {}", e);
            }
        }
    }

    fn append(&self, writer: &Mutex<BufWriter<File>>, fields: &[&str]) {
        let row = fields.iter().map(|f| escape_csv(f)).collect::<Vec<_>>().join(",");
        let mut writer = writer.lock().unwrap();
        if let Err(e) = writeln!(writer, "{}", row) {
            tracing::warn!("Failed to append audit row: {}", e);
        }
    }
}

/// Quotes a CSV field when it contains a delimiter, quote or newline
fn escape_csv(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_rows_land_in_the_right_files() {
        let dir = tempdir().unwrap();
        let audit = AuditLog::create(dir.path()).unwrap();

        audit.log_collection("Recueil, tome I", "https://x/r", "Auteur:X", "summary block", 12);
        audit.log_hub("Le Lac", "https://x/l", "Auteur:X", "category tag 'multi-version'", 3);
        audit.log_other("Notes", "https://x/n", "Auteur:X", "no matching signal");
        audit.flush();

        let collections = std::fs::read_to_string(dir.path().join("collections.csv")).unwrap();
        assert!(collections.starts_with("Timestamp,PageTitle,URL,ParentTitle,Reason,ChildCount"));
        assert!(collections.contains("\"Recueil, tome I\""));
        assert!(collections.contains(",12"));

        let hubs = std::fs::read_to_string(dir.path().join("hubs.csv")).unwrap();
        assert!(hubs.contains("Le Lac"));

        let others = std::fs::read_to_string(dir.path().join("other_pages.csv")).unwrap();
        assert!(others.contains("no matching signal"));
        assert_eq!(others.lines().count(), 2);
    }
}
