//! Ordered child extraction for non-leaf pages
//!
//! Collections yield their linked sub-pages in document order, with
//! interleaved headings and standalone bold runs tagged as section-title
//! markers so section boundaries survive extraction. Hubs yield only the
//! links that look like versions of the hub's own work.

use crate::classify::classifier::{
    content_root, editions_heading, heading_text, summary_container,
};
use crate::config::Heuristics;
use crate::wiki;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// One ordered entry extracted from a collection page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionChild {
    /// A link to a candidate member poem
    Poem { title: String },
    /// A section boundary marker
    Section { title: String },
}

/// Extracts the ordered children of a collection page
///
/// The most specific available container wins: the dedicated summary block,
/// then an editions-headed region, then the general content area.
pub fn extract_collection_children(
    doc: &Html,
    page_title: &str,
    heuristics: &Heuristics,
) -> Vec<CollectionChild> {
    if let Some(container) = summary_container(doc) {
        return walk_container(container, page_title, heuristics);
    }

    if let Some(heading) = editions_heading(doc) {
        return walk_editions_region(heading, page_title, heuristics);
    }

    match content_root(doc) {
        Some(root) => walk_container(root, page_title, heuristics),
        None => Vec::new(),
    }
}

/// Extracts version links from a multi-version hub page
///
/// A link counts as a version when its title textually contains the hub's
/// parenthetical-stripped title, or when it is a "/"-delimited subpage of
/// the hub; hub pages mix version links with incidental cross-references.
pub fn extract_hub_children(doc: &Html, hub_title: &str) -> Vec<String> {
    let cleaned = wiki::strip_parenthetical(hub_title).to_lowercase();
    let mut versions = Vec::new();
    let mut seen = HashSet::new();

    let Some(root) = content_root(doc) else {
        return versions;
    };

    let Ok(selector) = Selector::parse("a[href^=\"/wiki/\"]") else {
        return versions;
    };

    for link in root.select(&selector) {
        let Some(title) = valid_link_title(&link, hub_title) else {
            continue;
        };

        let is_version = (!cleaned.is_empty() && title.to_lowercase().contains(&cleaned))
            || wiki::is_subpage_of(&title, hub_title);

        if is_version && seen.insert(title.clone()) {
            versions.push(title);
        }
    }

    versions
}

fn walk_container(
    container: ElementRef<'_>,
    page_title: &str,
    heuristics: &Heuristics,
) -> Vec<CollectionChild> {
    let mut children = Vec::new();
    let mut seen = HashSet::new();

    for node in container.descendants() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };
        visit_element(&element, page_title, heuristics, &mut children, &mut seen);
    }

    children
}

/// Walks the siblings following an editions heading, stopping at the next
/// heading of the same or higher level
fn walk_editions_region(
    heading: ElementRef<'_>,
    page_title: &str,
    heuristics: &Heuristics,
) -> Vec<CollectionChild> {
    let mut children = Vec::new();
    let mut seen = HashSet::new();
    let heading_name = heading.value().name().to_string();

    for sibling in heading.next_siblings() {
        let Some(element) = ElementRef::wrap(sibling) else {
            continue;
        };

        let name = element.value().name();
        if name == "h2" || name == heading_name {
            break;
        }

        for node in element.descendants() {
            let Some(inner) = ElementRef::wrap(node) else {
                continue;
            };
            visit_element(&inner, page_title, heuristics, &mut children, &mut seen);
        }
    }

    children
}

fn visit_element(
    element: &ElementRef<'_>,
    page_title: &str,
    heuristics: &Heuristics,
    children: &mut Vec<CollectionChild>,
    seen: &mut HashSet<String>,
) {
    match element.value().name() {
        "h2" | "h3" | "h4" => {
            let title = heading_text(element);
            if !title.is_empty() && title.chars().count() <= heuristics.max_section_title_chars {
                children.push(CollectionChild::Section { title });
            }
        }
        "b" => {
            if let Some(title) = standalone_bold_text(element, heuristics) {
                children.push(CollectionChild::Section { title });
            }
        }
        "a" => {
            // Links inside section markers belong to the marker, not the list
            if has_marker_ancestor(element) {
                return;
            }
            if let Some(title) = valid_link_title(element, page_title) {
                if seen.insert(title.clone()) {
                    children.push(CollectionChild::Poem { title });
                }
            }
        }
        _ => {}
    }
}

/// Resolves a link element to a valid internal content title
///
/// Rejected: targets outside `/wiki/`, redlinks and self-links, and the
/// navigational/administrative namespaces (category, author, portal, help,
/// project, file, special, book, template).
fn valid_link_title(element: &ElementRef<'_>, page_title: &str) -> Option<String> {
    let href = element.value().attr("href")?;
    if !href.starts_with("/wiki/") {
        return None;
    }

    if element
        .value()
        .classes()
        .any(|class| class == "new" || class == "mw-selflink" || class == "external")
    {
        return None;
    }

    let title = wiki::title_from_href(href)?;
    if title == page_title {
        return None;
    }

    if let Some(namespace) = wiki::namespace_of(&title) {
        if wiki::excluded_link_prefixes().contains(&namespace) {
            return None;
        }
    }

    Some(title)
}

/// A bold run counts as a section marker only when it stands alone: no link
/// inside it, and nothing else in its parent element's text
fn standalone_bold_text(element: &ElementRef<'_>, heuristics: &Heuristics) -> Option<String> {
    let own: String = element.text().collect();
    let own = own.trim();
    if own.is_empty() || own.chars().count() > heuristics.max_section_title_chars {
        return None;
    }

    if let Ok(selector) = Selector::parse("a") {
        if element.select(&selector).next().is_some() {
            return None;
        }
    }

    let parent = element.parent().and_then(ElementRef::wrap)?;
    let parent_text: String = parent.text().collect();
    if parent_text.trim() == own {
        Some(own.to_string())
    } else {
        None
    }
}

fn has_marker_ancestor(element: &ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| matches!(ancestor.value().name(), "h2" | "h3" | "h4" | "b"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str, page_title: &str) -> Vec<CollectionChild> {
        let doc = Html::parse_document(html);
        extract_collection_children(&doc, page_title, &Heuristics::default())
    }

    #[test]
    fn test_summary_block_preferred_over_content() {
        let html = r#"<html><body><div id="mw-content-text">
            <div class="ws-summary"><ul><li><a href="/wiki/A">A</a></li></ul></div>
            <ul><li><a href="/wiki/Elsewhere">Elsewhere</a></li></ul>
        </div></body></html>"#;
        let children = extract(html, "Recueil");
        assert_eq!(
            children,
            vec![CollectionChild::Poem {
                title: "A".to_string()
            }]
        );
    }

    #[test]
    fn test_document_order_with_sections() {
        let html = r#"<html><body><div id="mw-content-text"><div class="ws-summary">
            <h3><span class="mw-headline">Book I</span></h3>
            <ul>
                <li><a href="/wiki/Poem_A">Poem A</a></li>
                <li><a href="/wiki/Poem_B">Poem B</a></li>
            </ul>
            <h3><span class="mw-headline">Book II</span></h3>
            <ul>
                <li><a href="/wiki/Poem_C">Poem C</a></li>
            </ul>
        </div></div></body></html>"#;

        let children = extract(html, "Recueil");
        assert_eq!(
            children,
            vec![
                CollectionChild::Section {
                    title: "Book I".to_string()
                },
                CollectionChild::Poem {
                    title: "Poem A".to_string()
                },
                CollectionChild::Poem {
                    title: "Poem B".to_string()
                },
                CollectionChild::Section {
                    title: "Book II".to_string()
                },
                CollectionChild::Poem {
                    title: "Poem C".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_standalone_bold_is_section_marker() {
        let html = r#"<html><body><div id="mw-content-text"><div class="ws-summary">
            <p><b>Sonnets</b></p>
            <ul><li><a href="/wiki/Sonnet_I">Sonnet I</a></li></ul>
        </div></div></body></html>"#;
        let children = extract(html, "Recueil");
        assert_eq!(
            children,
            vec![
                CollectionChild::Section {
                    title: "Sonnets".to_string()
                },
                CollectionChild::Poem {
                    title: "Sonnet I".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_inline_bold_is_not_a_marker() {
        let html = r#"<html><body><div id="mw-content-text"><div class="ws-summary">
            <p>See the <b>first</b> edition.</p>
            <ul><li><a href="/wiki/Poem_A">Poem A</a></li></ul>
        </div></div></body></html>"#;
        let children = extract(html, "Recueil");
        assert_eq!(
            children,
            vec![CollectionChild::Poem {
                title: "Poem A".to_string()
            }]
        );
    }

    #[test]
    fn test_excluded_namespaces_and_redlinks() {
        let html = r#"<html><body><div id="mw-content-text"><div class="ws-summary"><ul>
            <li><a href="/wiki/Cat%C3%A9gorie:Recueils">cat</a></li>
            <li><a href="/wiki/Auteur:Hugo">author</a></li>
            <li><a href="/wiki/Portail:France">portal</a></li>
            <li><a href="/w/index.php?title=Missing&action=edit&redlink=1" class="new">red</a></li>
            <li><a href="/wiki/Recueil">self</a></li>
            <li><a href="/wiki/Valid_Poem">ok</a></li>
        </ul></div></div></body></html>"#;
        let children = extract(html, "Recueil");
        assert_eq!(
            children,
            vec![CollectionChild::Poem {
                title: "Valid Poem".to_string()
            }]
        );
    }

    #[test]
    fn test_duplicate_links_kept_once() {
        let html = r#"<html><body><div id="mw-content-text"><div class="ws-summary"><ul>
            <li><a href="/wiki/Poem_A">Poem A</a></li>
            <li><a href="/wiki/Poem_A">Poem A again</a></li>
        </ul></div></div></body></html>"#;
        let children = extract(html, "Recueil");
        assert_eq!(children.len(), 1);
    }

    #[test]
    fn test_editions_region_bounded_by_next_heading() {
        let html = r#"<html><body><div id="mw-content-text">
            <h2><span class="mw-headline">Éditions</span></h2>
            <ul><li><a href="/wiki/Le_Lac/1820">1820</a></li></ul>
            <h2><span class="mw-headline">Notes</span></h2>
            <ul><li><a href="/wiki/Not_an_edition">Nope</a></li></ul>
        </div></body></html>"#;
        let children = extract(html, "Le Lac");
        assert_eq!(
            children,
            vec![CollectionChild::Poem {
                title: "Le Lac/1820".to_string()
            }]
        );
    }

    #[test]
    fn test_hub_children_match_title_or_subpage() {
        let html = r#"<html><body><div id="mw-content-text"><ul>
            <li><a href="/wiki/Le_Lac_(1820)">Le Lac (1820)</a></li>
            <li><a href="/wiki/Le_Lac/%C3%89dition_1849">Le Lac/Édition 1849</a></li>
            <li><a href="/wiki/Autre_Po%C3%A8me">Autre Poème</a></li>
        </ul></div></body></html>"#;
        let doc = Html::parse_document(html);
        let versions = extract_hub_children(&doc, "Le Lac");
        assert_eq!(
            versions,
            vec!["Le Lac (1820)".to_string(), "Le Lac/Édition 1849".to_string()]
        );
    }

    #[test]
    fn test_hub_title_parenthetical_stripped_for_matching() {
        let html = r#"<html><body><div id="mw-content-text"><ul>
            <li><a href="/wiki/Ode_au_vent_(1830)">Ode au vent (1830)</a></li>
        </ul></div></body></html>"#;
        let doc = Html::parse_document(html);
        let versions = extract_hub_children(&doc, "Ode au vent (recueil)");
        assert_eq!(versions, vec!["Ode au vent (1830)".to_string()]);
    }
}
