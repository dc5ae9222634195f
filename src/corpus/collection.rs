use serde::{Deserialize, Serialize};

/// A resolved reference to one poem inside a collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoemInfo {
    pub title: String,
    pub page_id: i64,
    pub url: String,
}

/// A titled sub-grouping of poems within a collection, order-preserving
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub poems: Vec<PoemInfo>,
}

/// One entry of a collection's ordered content list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CollectionComponent {
    Section(Section),
    Poem(PoemInfo),
}

/// The structure of a discovered collection page: its identity plus an
/// ordered list of sections and top-level poems
///
/// Built completely by the worker expanding the collection page, then frozen
/// behind an `Arc` and shared read-only with every child work item. It is
/// serialized onto exactly one emitted poem record (the first of the
/// collection) to avoid repeating the full structure on every record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub page_id: i64,
    pub title: String,
    pub url: String,
    pub author: Option<String>,
    pub components: Vec<CollectionComponent>,
}

impl Collection {
    /// Creates an empty collection for the given page
    pub fn new(page_id: i64, title: String, url: String, author: Option<String>) -> Self {
        Self {
            page_id,
            title,
            url,
            author,
            components: Vec::new(),
        }
    }

    /// Opens a new section; subsequent poems are appended into it
    pub fn push_section(&mut self, title: String) {
        self.components.push(CollectionComponent::Section(Section {
            title,
            poems: Vec::new(),
        }));
    }

    /// Appends a poem, into the currently open section if any, at the top
    /// level otherwise
    pub fn push_poem(&mut self, info: PoemInfo) {
        if let Some(CollectionComponent::Section(section)) = self.components.last_mut() {
            section.poems.push(info);
            return;
        }
        self.components.push(CollectionComponent::Poem(info));
    }

    /// Total number of poems across sections and top-level entries
    pub fn poem_count(&self) -> usize {
        self.components
            .iter()
            .map(|c| match c {
                CollectionComponent::Section(s) => s.poems.len(),
                CollectionComponent::Poem(_) => 1,
            })
            .sum()
    }
}
