//! Wiki title and localization utilities
//!
//! This module handles the string-level conventions of MediaWiki titles and
//! hrefs: percent-decoding, namespace prefixes, subpage paths, and the
//! per-language vocabulary the classifier keys on.

mod lang;
mod title;

pub use lang::{
    author_prefix, category_prefix, collection_category_keywords, disambiguation_templates,
    editions_heading_titles, excluded_link_prefixes, multi_version_category_keywords,
};
pub use title::{
    clean_title, is_subpage_of, namespace_of, percent_decode, strip_parenthetical,
    title_from_href,
};
