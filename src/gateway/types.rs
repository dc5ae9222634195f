/// A minimal page reference: the dedup identity plus its title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRef {
    pub page_id: i64,
    pub title: String,
    pub ns: i64,
}

/// One redirect mapping returned by a batch title resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub from: String,
    pub to: String,
}

/// Result of resolving a batch of titles: existing pages plus the redirects
/// that were followed to reach them
#[derive(Debug, Clone, Default)]
pub struct ResolvedBatch {
    pub pages: Vec<PageRef>,
    pub redirects: Vec<Redirect>,
}

impl ResolvedBatch {
    /// Finds the page a given source title resolved to, following at most
    /// one redirect hop (the API collapses chains server-side)
    pub fn resolve(&self, title: &str) -> Option<&PageRef> {
        let target = self
            .redirects
            .iter()
            .find(|r| r.from == title)
            .map(|r| r.to.as_str())
            .unwrap_or(title);
        self.pages.iter().find(|p| p.title == target)
    }
}

/// A member page or subcategory of a category listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMember {
    pub page_id: i64,
    pub title: String,
}

/// Member counts reported for a category, used for the emptiness pre-check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub pages: u64,
    pub subcats: u64,
}

impl CategoryCounts {
    /// Whether the category reports any member page or subcategory
    pub fn is_empty(&self) -> bool {
        self.pages == 0 && self.subcats == 0
    }
}

/// Everything a worker needs about one page: metadata, the raw wikitext
/// revision and its curator-asserted category/template tags
#[derive(Debug, Clone)]
pub struct PageData {
    pub page_id: i64,
    pub ns: i64,
    pub title: String,
    pub url: String,
    pub revision_id: i64,
    pub wikitext: String,
    pub categories: Vec<String>,
    pub templates: Vec<String>,
}
