//! Per-author exploration tree logs
//!
//! Optional audit surface: one text file per top-level group key, drawing
//! the visited hierarchy with the classification and signal of every page.
//! Nodes are added concurrently by workers; files are written once at the
//! end of the run.

use crate::classify::{PageType, Signal};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

#[derive(Debug)]
struct TreeNode {
    name: String,
    page_type: Option<PageType>,
    reason: Option<Signal>,
    children: Vec<TreeNode>,
}

impl TreeNode {
    fn root(name: String) -> Self {
        Self {
            name,
            page_type: None,
            reason: None,
            children: Vec::new(),
        }
    }
}

/// Builds exploration trees per group key, thread-safe
#[derive(Debug, Default)]
pub struct TreeLogger {
    trees: Mutex<Vec<TreeNode>>,
}

impl TreeLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a visited page under its parent in the group's tree
    ///
    /// Unknown parents attach to the group root, which keeps lineage usable
    /// even when a parent page itself failed processing.
    pub fn add_node(
        &self,
        group_key: &str,
        parent_title: &str,
        page_title: &str,
        page_type: PageType,
        reason: Signal,
    ) {
        let mut trees = self.trees.lock().unwrap();

        let tree = match trees.iter_mut().position(|t| t.name == group_key) {
            Some(pos) => &mut trees[pos],
            None => {
                trees.push(TreeNode::root(group_key.to_string()));
                trees.last_mut().unwrap()
            }
        };

        let parent = match find_node(tree, parent_title) {
            Some(node) => node,
            None => tree,
        };

        if parent.children.iter().any(|c| c.name == page_title) {
            return;
        }
        parent.children.push(TreeNode {
            name: page_title.to_string(),
            page_type: Some(page_type),
            reason: Some(reason),
            children: Vec::new(),
        });
    }

    /// Writes one tree file per group key into `dir`, returning the file count
    pub fn write_log_files(&self, dir: &Path) -> io::Result<usize> {
        std::fs::create_dir_all(dir)?;
        let trees = self.trees.lock().unwrap();

        for tree in trees.iter() {
            let short_name = tree.name.rsplit(':').next().unwrap_or(&tree.name);
            let path = dir.join(sanitize_filename(short_name));
            let mut file = std::fs::File::create(&path)?;

            writeln!(file, "{}", tree.name)?;
            let count = tree.children.len();
            for (i, child) in tree.children.iter().enumerate() {
                write_tree(&mut file, child, "", i + 1 == count)?;
            }
        }

        tracing::info!("Wrote {} exploration tree logs", trees.len());
        Ok(trees.len())
    }
}

fn find_node<'a>(node: &'a mut TreeNode, title: &str) -> Option<&'a mut TreeNode> {
    if node.name == title {
        return Some(node);
    }
    for child in &mut node.children {
        if let Some(found) = find_node(child, title) {
            return Some(found);
        }
    }
    None
}

fn write_tree(
    file: &mut std::fs::File,
    node: &TreeNode,
    prefix: &str,
    is_last: bool,
) -> io::Result<()> {
    let connector = if is_last { "└── " } else { "├── " };
    let annotation = match (node.page_type, node.reason) {
        (Some(page_type), Some(reason)) => format!(" [{} ({})]", page_type, reason),
        (Some(page_type), None) => format!(" [{}]", page_type),
        _ => String::new(),
    };
    writeln!(file, "{}{}{}{}", prefix, connector, node.name, annotation)?;

    let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
    let count = node.children.len();
    for (i, child) in node.children.iter().enumerate() {
        write_tree(file, child, &child_prefix, i + 1 == count)?;
    }
    Ok(())
}

fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            ' ' => '_',
            other => other,
        })
        .collect();
    format!("{}.txt", cleaned.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Victor Hugo"), "victor_hugo.txt");
        assert_eq!(sanitize_filename("A/B:C"), "a_b_c.txt");
    }

    #[test]
    fn test_tree_nesting_and_rendering() {
        let logger = TreeLogger::new();
        logger.add_node(
            "Auteur:Hugo",
            "Auteur:Hugo",
            "Les Contemplations",
            PageType::PoeticCollection,
            Signal::SummaryBlock,
        );
        logger.add_node(
            "Auteur:Hugo",
            "Les Contemplations",
            "Demain, dès l’aube",
            PageType::Poem,
            Signal::VerseStructure,
        );
        logger.add_node(
            "Auteur:Hugo",
            "Auteur:Hugo",
            "Notes diverses",
            PageType::Other,
            Signal::NoSignal,
        );

        let dir = tempdir().unwrap();
        let written = logger.write_log_files(dir.path()).unwrap();
        assert_eq!(written, 1);

        let content = std::fs::read_to_string(dir.path().join("hugo.txt")).unwrap();
        assert!(content.starts_with("Auteur:Hugo\n"));
        assert!(content.contains("├── Les Contemplations [POETIC_COLLECTION (summary block)]"));
        assert!(content.contains("│   └── Demain, dès l’aube [POEM (verse markup)]"));
        assert!(content.contains("└── Notes diverses [OTHER (no matching signal)]"));
    }

    #[test]
    fn test_unknown_parent_attaches_to_root() {
        let logger = TreeLogger::new();
        logger.add_node(
            "Auteur:X",
            "Never Seen",
            "Orphan",
            PageType::Other,
            Signal::NoSignal,
        );

        let dir = tempdir().unwrap();
        logger.write_log_files(dir.path()).unwrap();
        let content = std::fs::read_to_string(dir.path().join("x.txt")).unwrap();
        assert!(content.contains("└── Orphan"));
    }

    #[test]
    fn test_duplicate_nodes_kept_once() {
        let logger = TreeLogger::new();
        logger.add_node("G", "G", "Page", PageType::Poem, Signal::VerseStructure);
        logger.add_node("G", "G", "Page", PageType::Poem, Signal::VerseStructure);

        let dir = tempdir().unwrap();
        logger.write_log_files(dir.path()).unwrap();
        let content = std::fs::read_to_string(dir.path().join("g.txt")).unwrap();
        assert_eq!(content.matches("Page").count(), 1);
    }
}
