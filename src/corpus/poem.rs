use crate::corpus::collection::Collection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Parsed verse structure of a poem: ordered stanzas of ordered lines, plus
/// the raw opening markers of the source blocks they came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoemStructure {
    pub stanzas: Vec<Vec<String>>,
    #[serde(default)]
    pub raw_markers: Vec<String>,
}

impl PoemStructure {
    /// Flattens the structure into normalized text: verses joined by `\n`,
    /// stanzas separated by a blank line
    pub fn normalized_text(&self) -> String {
        self.stanzas
            .iter()
            .map(|stanza| stanza.join("\n"))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// True when no stanza carries any verse
    pub fn is_empty(&self) -> bool {
        self.stanzas.iter().all(|s| s.is_empty())
    }
}

/// Metadata bag extracted from the page header (microdata) and wikitext
/// templates; every field is best-effort
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoemMetadata {
    pub author: Option<String>,
    pub publication_date: Option<String>,
    pub source_collection_name: Option<String>,
    pub publisher: Option<String>,
    pub translator: Option<String>,
}

/// The final output record for one poem
///
/// `hub_page_id` is always populated: the real hub's identity when the poem
/// was reached through a multi-version hub, the poem's own identity
/// otherwise, so every record carries a usable group key.
/// `collection_structure` is present only on the first poem emitted for its
/// collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedPoem {
    pub page_id: i64,
    pub revision_id: i64,
    pub title: String,
    pub language: String,
    pub wikisource_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_page_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poem_order: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_structure: Option<Collection>,

    pub hub_page_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hub_title: Option<String>,

    pub metadata: PoemMetadata,
    pub structure: PoemStructure,
    pub normalized_text: String,

    pub checksum_sha256: String,
    pub extraction_timestamp: DateTime<Utc>,
}
