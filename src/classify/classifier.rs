//! Page role classification
//!
//! Ordered precedence, first match wins: category tags are curator-asserted
//! and most authoritative, structural HTML signals come next, content-shape
//! heuristics last. Disambiguation is checked right after the namespace test
//! so such pages can never fall through to a content role.

use crate::classify::wikitext;
use crate::config::Heuristics;
use crate::gateway::PageData;
use crate::wiki;
use scraper::{ElementRef, Html, Selector};
use std::fmt;

/// Semantic role of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageType {
    Poem,
    PoeticCollection,
    MultiVersionHub,
    Author,
    Disambiguation,
    SectionTitle,
    Other,
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Poem => "POEM",
            Self::PoeticCollection => "POETIC_COLLECTION",
            Self::MultiVersionHub => "MULTI_VERSION_HUB",
            Self::Author => "AUTHOR",
            Self::Disambiguation => "DISAMBIGUATION",
            Self::SectionTitle => "SECTION_TITLE",
            Self::Other => "OTHER",
        };
        write!(f, "{}", name)
    }
}

/// The heuristic signal that decided a classification
///
/// A closed enumeration rather than a free-form string, so the classifier's
/// contract stays machine-checkable while remaining readable in audit logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    AuthorNamespace,
    NonContentNamespace,
    DisambiguationTemplate,
    MultiVersionCategory,
    CollectionCategory,
    SummaryBlock,
    SummaryBlockWithStructuredData,
    EditionsHeading,
    EditionsWithStructuredData,
    VerseStructure,
    LinkDominatedList,
    LinkDominatedListWithStructuredData,
    NoSignal,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::AuthorNamespace => "author namespace prefix",
            Self::NonContentNamespace => "non-content namespace",
            Self::DisambiguationTemplate => "disambiguation template",
            Self::MultiVersionCategory => "category tag 'multi-version'",
            Self::CollectionCategory => "category tag 'poetic collection'",
            Self::SummaryBlock => "summary block",
            Self::SummaryBlockWithStructuredData => "summary block with structured-data link",
            Self::EditionsHeading => "editions heading",
            Self::EditionsWithStructuredData => "editions heading with structured-data link",
            Self::VerseStructure => "verse markup",
            Self::LinkDominatedList => "link-dominated list",
            Self::LinkDominatedListWithStructuredData => {
                "link-dominated list with structured-data link"
            }
            Self::NoSignal => "no matching signal",
        };
        write!(f, "{}", reason)
    }
}

/// Result of classifying one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedPage {
    pub page_type: PageType,
    pub signal: Signal,
}

impl ClassifiedPage {
    fn new(page_type: PageType, signal: Signal) -> Self {
        Self { page_type, signal }
    }
}

/// Classifies one page from its metadata, rendered-markup tree and wikitext
pub struct PageClassifier<'a> {
    data: &'a PageData,
    doc: &'a Html,
    lang: &'a str,
    heuristics: &'a Heuristics,
}

impl<'a> PageClassifier<'a> {
    pub fn new(data: &'a PageData, doc: &'a Html, lang: &'a str, heuristics: &'a Heuristics) -> Self {
        Self {
            data,
            doc,
            lang,
            heuristics,
        }
    }

    /// Applies the layered heuristics in precedence order
    pub fn classify(&self) -> ClassifiedPage {
        // 1. Namespace: only ns 0 holds content
        if self.data.ns != 0 {
            let author_ns = format!("{}:", wiki::author_prefix(self.lang));
            if self.data.title.starts_with(&author_ns) || self.data.title.starts_with("Author:") {
                return ClassifiedPage::new(PageType::Author, Signal::AuthorNamespace);
            }
            return ClassifiedPage::new(PageType::Other, Signal::NonContentNamespace);
        }

        // 2. Disambiguation, before any content-shape heuristic can claim
        // the page
        if self.is_disambiguation() {
            return ClassifiedPage::new(PageType::Disambiguation, Signal::DisambiguationTemplate);
        }

        // 3. / 4. Curator-asserted category tags
        if self.has_category_keyword(wiki::multi_version_category_keywords()) {
            return ClassifiedPage::new(PageType::MultiVersionHub, Signal::MultiVersionCategory);
        }
        if self.has_category_keyword(wiki::collection_category_keywords()) {
            return ClassifiedPage::new(PageType::PoeticCollection, Signal::CollectionCategory);
        }

        // 5. Structural HTML: summary/TOC block or an editions heading.
        // Editions blocks co-occurring with structured-data links indicate
        // the page aggregates distinct works, not sections of one.
        let structured_data = has_structured_data_marker(self.doc);

        if summary_container(self.doc).is_some() {
            return if structured_data {
                ClassifiedPage::new(
                    PageType::MultiVersionHub,
                    Signal::SummaryBlockWithStructuredData,
                )
            } else {
                ClassifiedPage::new(PageType::PoeticCollection, Signal::SummaryBlock)
            };
        }

        if editions_heading(self.doc).is_some() {
            return if structured_data {
                ClassifiedPage::new(PageType::MultiVersionHub, Signal::EditionsWithStructuredData)
            } else {
                ClassifiedPage::new(PageType::PoeticCollection, Signal::EditionsHeading)
            };
        }

        // 6. Content shape: verse markup means a poem
        if has_poem_markup(self.doc) || wikitext::has_poem_tag(&self.data.wikitext) {
            return ClassifiedPage::new(PageType::Poem, Signal::VerseStructure);
        }

        // 7. Content shape: a list dominated by internal links reads as a
        // table of contents
        let (list_items, linked_items) = link_list_stats(self.doc);
        if linked_items > self.heuristics.min_list_links
            && list_items > 0
            && linked_items as f64 / list_items as f64 > self.heuristics.link_ratio_threshold
        {
            return if structured_data {
                ClassifiedPage::new(
                    PageType::MultiVersionHub,
                    Signal::LinkDominatedListWithStructuredData,
                )
            } else {
                ClassifiedPage::new(PageType::PoeticCollection, Signal::LinkDominatedList)
            };
        }

        ClassifiedPage::new(PageType::Other, Signal::NoSignal)
    }

    fn is_disambiguation(&self) -> bool {
        let known = wiki::disambiguation_templates();

        let in_wikitext = wikitext::parse_templates(&self.data.wikitext)
            .iter()
            .any(|t| known.contains(&t.name.to_lowercase().as_str()));

        // The API's template listing catches transclusions the raw scan can
        // miss (e.g. templates pulled in by other templates)
        let in_listing = self.data.templates.iter().any(|title| {
            let short = title.rsplit(':').next().unwrap_or(title).to_lowercase();
            known.contains(&short.as_str())
        });

        in_wikitext || in_listing
    }

    fn has_category_keyword(&self, keywords: &[&str]) -> bool {
        self.data.categories.iter().any(|category| {
            let lower = category.to_lowercase();
            keywords.iter().any(|k| lower.contains(k))
        })
    }
}

// ===== Shared structural probes (also used by child extraction) =====

/// The main content area of a rendered page, falling back to the document
/// root for synthetic fixtures
pub(super) fn content_root(doc: &Html) -> Option<ElementRef<'_>> {
    if let Ok(selector) = Selector::parse("#mw-content-text") {
        if let Some(element) = doc.select(&selector).next() {
            return Some(element);
        }
    }
    if let Ok(selector) = Selector::parse("body") {
        return doc.select(&selector).next();
    }
    None
}

/// Finds the dedicated summary/table-of-contents block, if present
pub(super) fn summary_container(doc: &Html) -> Option<ElementRef<'_>> {
    let selector = Selector::parse("div.ws-summary, div#summary, div#toc").ok()?;
    doc.select(&selector).next()
}

/// Finds a heading introducing an editions list, if present
pub(super) fn editions_heading(doc: &Html) -> Option<ElementRef<'_>> {
    let selector = Selector::parse("h2, h3").ok()?;
    doc.select(&selector).find(|heading| {
        let text = heading_text(heading);
        wiki::editions_heading_titles()
            .iter()
            .any(|t| text.eq_ignore_ascii_case(t) || text.starts_with(t))
    })
}

/// Whether the page carries a Wikidata-linked structured-data marker
pub(super) fn has_structured_data_marker(doc: &Html) -> bool {
    if let Ok(selector) = Selector::parse("a[href*=\"wikidata.org\"]") {
        return doc.select(&selector).next().is_some();
    }
    false
}

/// Whether the page carries verse markup with any text content
pub(super) fn has_poem_markup(doc: &Html) -> bool {
    if let Ok(selector) = Selector::parse("div.poem, span.poem, poem") {
        return doc
            .select(&selector)
            .any(|block| block.text().any(|t| !t.trim().is_empty()));
    }
    false
}

/// Readable text of a heading, preferring the `.mw-headline` span and
/// dropping the trailing edit-section bracket
pub(super) fn heading_text(heading: &ElementRef<'_>) -> String {
    let text = if let Ok(selector) = Selector::parse("span.mw-headline") {
        match heading.select(&selector).next() {
            Some(headline) => headline.text().collect::<String>(),
            None => heading.text().collect::<String>(),
        }
    } else {
        heading.text().collect::<String>()
    };

    let text = match text.find('[') {
        Some(pos) => &text[..pos],
        None => &text[..],
    };
    text.trim().to_string()
}

/// Counts list items in the content area and how many carry an internal link
fn link_list_stats(doc: &Html) -> (usize, usize) {
    let Some(root) = content_root(doc) else {
        return (0, 0);
    };

    let (Ok(item_selector), Ok(link_selector)) =
        (Selector::parse("li"), Selector::parse("a[href^=\"/wiki/\"]"))
    else {
        return (0, 0);
    };

    let mut items = 0;
    let mut linked = 0;

    for item in root.select(&item_selector) {
        items += 1;
        if item.select(&link_selector).next().is_some() {
            linked += 1;
        }
    }

    (items, linked)
}
