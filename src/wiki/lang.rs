//! Per-language wiki vocabulary
//!
//! Namespace prefixes, curator category tags and heading keywords differ per
//! Wikisource project. Unknown languages fall back to the English forms.

/// Localized category namespace prefix (without the trailing colon)
pub fn category_prefix(lang: &str) -> &'static str {
    match lang {
        "fr" => "Catégorie",
        "de" => "Kategorie",
        "es" => "Categoría",
        _ => "Category",
    }
}

/// Localized author namespace prefix (without the trailing colon)
pub fn author_prefix(lang: &str) -> &'static str {
    match lang {
        "fr" => "Auteur",
        "de" => "Autor",
        "es" => "Autor",
        _ => "Author",
    }
}

/// Namespace prefixes whose links are navigational or administrative, never
/// content
///
/// Checked against hrefs in every language at once; a prefix from another
/// project's localization never collides with a real page title followed by
/// a colon in practice, and the cost of the extra comparisons is nil.
pub fn excluded_link_prefixes() -> &'static [&'static str] {
    &[
        "Catégorie",
        "Category",
        "Kategorie",
        "Auteur",
        "Author",
        "Autor",
        "Portail",
        "Portal",
        "Aide",
        "Help",
        "Wikisource",
        "Fichier",
        "File",
        "Spécial",
        "Special",
        "Livre",
        "Book",
        "Modèle",
        "Template",
    ]
}

/// Template names marking a disambiguation page (lowercase comparison)
pub fn disambiguation_templates() -> &'static [&'static str] {
    &["homonymie", "homonymes", "disambiguation", "disambig"]
}

/// Category-name fragments asserting a multi-version hub (lowercase
/// `contains` comparison)
pub fn multi_version_category_keywords() -> &'static [&'static str] {
    &[
        "éditions multiples",
        "versions multiples",
        "multiple versions",
        "multiple editions",
    ]
}

/// Category-name fragments asserting a poetic collection (lowercase
/// `contains` comparison)
pub fn collection_category_keywords() -> &'static [&'static str] {
    &["recueils de poèmes", "recueil de poèmes", "poetry collections", "poetic collection"]
}

/// Heading titles introducing an editions list
pub fn editions_heading_titles() -> &'static [&'static str] {
    &["Éditions", "Editions", "Édition", "Edition"]
}
