use crate::corpus::collection::Collection;
use crate::gateway::PageRef;
use std::sync::Arc;

/// Identity of a multi-version hub ancestor, shared by all of its versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubContext {
    pub title: String,
    pub page_id: i64,
}

/// Collection placement of a scheduled poem
///
/// The `Collection` is an immutable snapshot, fully built by the expanding
/// worker before any child was submitted; children only read it. `is_first`
/// marks the single item whose emitted record carries the full structure.
#[derive(Debug, Clone)]
pub struct CollectionContext {
    pub collection: Arc<Collection>,
    pub poem_order: u32,
    pub section_title: Option<String>,
    pub is_first: bool,
}

/// An immutable unit of scheduled work
///
/// Created by the discovery producer or by child-extraction logic, consumed
/// exactly once by a worker, never mutated after creation.
#[derive(Debug, Clone)]
pub struct WorkItem {
    /// The target page
    pub page: PageRef,

    /// Immediate parent title, for lineage in logs
    pub parent_title: String,

    /// Top-level grouping key: the originating author category
    pub group_key: String,

    /// Set when this page was reached through a multi-version hub
    pub hub: Option<HubContext>,

    /// Set when this page is a scheduled member of a collection
    pub collection: Option<CollectionContext>,
}

impl WorkItem {
    /// A top-level item as produced by category discovery
    pub fn seed(page: PageRef, parent_title: String, group_key: String) -> Self {
        Self {
            page,
            parent_title,
            group_key,
            hub: None,
            collection: None,
        }
    }
}
