//! Metadata extraction
//!
//! Two sources feed the metadata bag: structured microdata in the rendered
//! header (curator-verified display) and wikitext templates (fallback for
//! pages lacking microdata). On key collision the microdata value wins.

use crate::classify::wikitext::{parse_templates, Template};
use crate::corpus::PoemMetadata;
use scraper::{Html, Selector};

/// Header template names whose parameters carry bibliographic metadata
const HEADER_TEMPLATES: &[&str] = &["titre", "header", "textinfo", "infoédit", "infoedit"];

/// Extracts the metadata bag from a rendered page and its wikitext
pub fn extract_metadata(doc: &Html, wikitext: &str) -> PoemMetadata {
    let mut metadata = template_metadata(wikitext);
    let microdata = microdata_metadata(doc);

    // Rendered microdata takes precedence over wikitext templates
    if microdata.author.is_some() {
        metadata.author = microdata.author;
    }
    if microdata.publication_date.is_some() {
        metadata.publication_date = microdata.publication_date;
    }
    if microdata.source_collection_name.is_some() {
        metadata.source_collection_name = microdata.source_collection_name;
    }
    if microdata.publisher.is_some() {
        metadata.publisher = microdata.publisher;
    }
    if microdata.translator.is_some() {
        metadata.translator = microdata.translator;
    }

    metadata
}

/// Reads `itemprop`-tagged microdata spans from the rendered header
fn microdata_metadata(doc: &Html) -> PoemMetadata {
    PoemMetadata {
        author: itemprop(doc, "author"),
        publication_date: itemprop(doc, "datePublished"),
        source_collection_name: itemprop(doc, "isPartOf"),
        publisher: itemprop(doc, "publisher"),
        translator: itemprop(doc, "translator"),
    }
}

fn itemprop(doc: &Html, name: &str) -> Option<String> {
    let selector = Selector::parse(&format!("[itemprop=\"{}\"]", name)).ok()?;
    doc.select(&selector)
        .map(|element| element.text().collect::<String>().trim().to_string())
        .find(|text| !text.is_empty())
}

/// Scans header templates for bibliographic parameters
fn template_metadata(wikitext: &str) -> PoemMetadata {
    let mut metadata = PoemMetadata::default();

    for template in parse_templates(wikitext) {
        let name = template.name.to_lowercase();
        if !HEADER_TEMPLATES.contains(&name.as_str()) {
            continue;
        }

        fill(&mut metadata.author, &template, &["auteur", "author"]);
        fill(
            &mut metadata.publication_date,
            &template,
            &["date", "année", "year"],
        );
        fill(
            &mut metadata.source_collection_name,
            &template,
            &["recueil", "collection", "ouvrage"],
        );
        fill(
            &mut metadata.publisher,
            &template,
            &["éditeur", "editeur", "publisher"],
        );
        fill(
            &mut metadata.translator,
            &template,
            &["traducteur", "translator"],
        );

        // The common {{Titre|title|author|date}} form carries author and
        // date positionally
        if name == "titre" {
            if metadata.author.is_none() {
                if let Some(author) = template.positional.get(1).filter(|s| !s.is_empty()) {
                    metadata.author = Some(strip_link_markup(author));
                }
            }
            if metadata.publication_date.is_none() {
                if let Some(date) = template.positional.get(2).filter(|s| !s.is_empty()) {
                    metadata.publication_date = Some(strip_link_markup(date));
                }
            }
        }
    }

    metadata
}

fn fill(slot: &mut Option<String>, template: &Template, keys: &[&str]) {
    if slot.is_some() {
        return;
    }
    for key in keys {
        if let Some(value) = template.params.get(*key).filter(|v| !v.is_empty()) {
            *slot = Some(strip_link_markup(value));
            return;
        }
    }
}

/// Unwraps `[[Target|label]]` and `[[Target]]` values down to their label
fn strip_link_markup(value: &str) -> String {
    let inner = value.trim().trim_start_matches("[[").trim_end_matches("]]");
    inner
        .rsplit('|')
        .next()
        .unwrap_or(inner)
        .trim()
        .to_string()
}
