//! ExtractedPoem assembly
//!
//! Combines verse structure, merged metadata and the work item's scheduling
//! context into the final output record.

use crate::config::Heuristics;
use crate::corpus::{CollectionContext, ExtractedPoem, HubContext};
use crate::extract::metadata::extract_metadata;
use crate::extract::structure::extract_poem_structure;
use crate::extract::ExtractError;
use crate::gateway::PageData;
use chrono::Utc;
use scraper::Html;
use sha2::{Digest, Sha256};

/// Extracts the full poem record for a page already classified as Poem
///
/// # Arguments
///
/// * `page` - Page metadata and raw wikitext
/// * `doc` - The rendered markup tree
/// * `lang` - Language code of the source project
/// * `collection` - Collection placement, when reached through a collection
/// * `hub` - Hub ancestry, when reached through a multi-version hub
/// * `heuristics` - Source of the collection-segment sanity bound
///
/// # Returns
///
/// * `Ok(ExtractedPoem)` - Complete record, ready for the sink
/// * `Err(ExtractError)` - The page carries no usable verse structure
pub fn extract(
    page: &PageData,
    doc: &Html,
    lang: &str,
    collection: Option<&CollectionContext>,
    hub: Option<&HubContext>,
    heuristics: &Heuristics,
) -> Result<ExtractedPoem, ExtractError> {
    let structure = extract_poem_structure(doc).ok_or(ExtractError::NoVerseStructure)?;
    if structure.is_empty() {
        return Err(ExtractError::EmptyStructure);
    }

    let mut metadata = extract_metadata(doc, &page.wikitext);

    // Fallback collection name from a "/"-delimited parent title segment.
    // The sanity bound guards against misreading a long poem title that
    // merely contains a slash as a collection path.
    if metadata.source_collection_name.is_none() {
        if let Some((parent, _)) = page.title.rsplit_once('/') {
            if !parent.is_empty()
                && parent.chars().count() <= heuristics.max_collection_segment_chars
            {
                metadata.source_collection_name = Some(parent.to_string());
            }
        }
    }

    let normalized_text = structure.normalized_text();

    let mut hasher = Sha256::new();
    hasher.update(page.wikitext.as_bytes());
    let checksum_sha256 = hex::encode(hasher.finalize());

    // Explicit structural context from the live expansion beats the
    // metadata-derived fallback
    let collection_title = collection
        .map(|ctx| ctx.collection.title.clone())
        .or_else(|| metadata.source_collection_name.clone());

    let (hub_page_id, hub_title) = match hub {
        Some(hub) => (hub.page_id, Some(hub.title.clone())),
        // Standalone poems are their own version group
        None => (page.page_id, None),
    };

    Ok(ExtractedPoem {
        page_id: page.page_id,
        revision_id: page.revision_id,
        title: page.title.clone(),
        language: lang.to_string(),
        wikisource_url: page.url.clone(),
        collection_page_id: collection.map(|ctx| ctx.collection.page_id),
        collection_title,
        section_title: collection.and_then(|ctx| ctx.section_title.clone()),
        poem_order: collection.map(|ctx| ctx.poem_order),
        collection_structure: collection
            .filter(|ctx| ctx.is_first)
            .map(|ctx| (*ctx.collection).clone()),
        hub_page_id,
        hub_title,
        metadata,
        structure,
        normalized_text,
        checksum_sha256,
        extraction_timestamp: Utc::now(),
    })
}
