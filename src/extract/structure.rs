//! Verse structure extraction from rendered markup
//!
//! Wikisource renders poem content into `div.poem`/`span.poem` containers
//! (or leaves bare `<poem>` elements in older renderings). Verses map to
//! line breaks, stanzas to blank lines.

use crate::corpus::PoemStructure;
use scraper::{ElementRef, Html, Node, Selector};

/// Extracts stanzas and verses from the rendered markup
///
/// Returns `None` when no poem block exists or every stanza comes out empty.
pub fn extract_poem_structure(doc: &Html) -> Option<PoemStructure> {
    let mut blocks = select_all(doc, "div.poem, span.poem");
    if blocks.is_empty() {
        blocks = select_all(doc, "poem");
    }
    if blocks.is_empty() {
        return None;
    }

    let mut stanzas: Vec<Vec<String>> = Vec::new();
    let mut raw_markers = Vec::new();

    for block in blocks {
        raw_markers.push(opening_marker(&block));

        let text = block_text(&block);
        for raw_stanza in text.split("\n\n") {
            let verses: Vec<String> = raw_stanza
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect();
            if !verses.is_empty() {
                stanzas.push(verses);
            }
        }
    }

    if stanzas.is_empty() {
        return None;
    }

    Some(PoemStructure {
        stanzas,
        raw_markers,
    })
}

fn select_all<'a>(doc: &'a Html, selectors: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(selectors) {
        Ok(selector) => doc.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// Reconstructs the opening tag of a block for the raw-marker audit trail
fn opening_marker(block: &ElementRef<'_>) -> String {
    let name = block.value().name();
    match block.value().attr("class") {
        Some(class) => format!("<{} class=\"{}\">", name, class),
        None => format!("<{}>", name),
    }
}

/// Flattens a block to text, mapping `<br>` to line breaks and nested
/// paragraph starts to stanza breaks while preserving the newlines already
/// present in text nodes
fn block_text(block: &ElementRef<'_>) -> String {
    let mut out = String::new();

    for node in block.descendants() {
        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => match element.name() {
                "br" => out.push('\n'),
                "p" | "div" if !out.is_empty() => out.push_str("\n\n"),
                _ => {}
            },
            _ => {}
        }
    }

    out
}
