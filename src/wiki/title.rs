//! Title normalization helpers
//!
//! Wiki hrefs arrive percent-encoded with underscores for spaces and
//! optional fragments; page titles use spaces and may carry namespace
//! prefixes, "/"-delimited subpage paths and parenthetical disambiguators.

/// Decodes percent-encoded bytes in a wiki href segment
///
/// Malformed escapes are passed through unchanged rather than rejected, since
/// they occasionally appear in hand-written hrefs.
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = bytes.get(i + 1).and_then(|b| (*b as char).to_digit(16));
            let lo = bytes.get(i + 2).and_then(|b| (*b as char).to_digit(16));
            if let (Some(hi), Some(lo)) = (hi, lo) {
                out.push((hi * 16 + lo) as u8);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Extracts a page title from an internal wiki href
///
/// `/wiki/Les_Fleurs_du_mal#Spleen` becomes `Les Fleurs du mal`. Returns
/// `None` for hrefs outside the `/wiki/` namespace or with an empty title.
pub fn title_from_href(href: &str) -> Option<String> {
    let raw = href.strip_prefix("/wiki/")?;
    let raw = raw.split('#').next().unwrap_or("");
    let raw = raw.split('?').next().unwrap_or("");

    let title = percent_decode(raw).replace('_', " ").trim().to_string();
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

/// Returns the namespace prefix of a title, if it has one
///
/// `Auteur:Victor Hugo` yields `Some("Auteur")`; a bare title yields `None`.
pub fn namespace_of(title: &str) -> Option<&str> {
    let (prefix, rest) = title.split_once(':')?;
    if prefix.is_empty() || rest.is_empty() {
        return None;
    }
    Some(prefix)
}

/// Removes parenthetical disambiguators and collapses whitespace
///
/// `Le Lac (Lamartine)` becomes `Le Lac`.
pub fn strip_parenthetical(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut depth = 0usize;

    for c in title.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonical short form of a title: last "/" segment, parentheticals
/// stripped, whitespace collapsed
///
/// Falls back to the trimmed input when stripping leaves nothing.
pub fn clean_title(title: &str) -> String {
    let segment = title.rsplit('/').next().unwrap_or(title);
    let cleaned = strip_parenthetical(segment);
    if cleaned.is_empty() {
        title.trim().to_string()
    } else {
        cleaned
    }
}

/// Whether `child` is a "/"-delimited subpage of `parent`
///
/// `Les Contemplations/Livre premier` is a subpage of `Les Contemplations`.
pub fn is_subpage_of(child: &str, parent: &str) -> bool {
    child
        .strip_prefix(parent)
        .map(|rest| rest.starts_with('/'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_decode_utf8() {
        assert_eq!(percent_decode("Po%C3%A8mes"), "Poèmes");
        assert_eq!(percent_decode("plain"), "plain");
    }

    #[test]
    fn test_percent_decode_malformed_passthrough() {
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("a%ZZb"), "a%ZZb");
    }

    #[test]
    fn test_title_from_href() {
        assert_eq!(
            title_from_href("/wiki/Les_Fleurs_du_mal"),
            Some("Les Fleurs du mal".to_string())
        );
        assert_eq!(
            title_from_href("/wiki/Les_Fleurs_du_mal#Spleen"),
            Some("Les Fleurs du mal".to_string())
        );
        assert_eq!(title_from_href("/w/index.php?title=X"), None);
        assert_eq!(title_from_href("/wiki/"), None);
    }

    #[test]
    fn test_namespace_of() {
        assert_eq!(namespace_of("Auteur:Victor Hugo"), Some("Auteur"));
        assert_eq!(namespace_of("Le Lac"), None);
        assert_eq!(namespace_of(":weird"), None);
    }

    #[test]
    fn test_strip_parenthetical() {
        assert_eq!(strip_parenthetical("Le Lac (Lamartine)"), "Le Lac");
        assert_eq!(strip_parenthetical("Ode (a) (b)"), "Ode");
        assert_eq!(strip_parenthetical("No parens"), "No parens");
    }

    #[test]
    fn test_clean_title_takes_last_segment() {
        assert_eq!(
            clean_title("Les Contemplations/Livre premier/Le Lac (1856)"),
            "Le Lac"
        );
        assert_eq!(clean_title("Simple"), "Simple");
    }

    #[test]
    fn test_clean_title_empty_fallback() {
        assert_eq!(clean_title("(only parens)"), "(only parens)");
    }

    #[test]
    fn test_is_subpage_of() {
        assert!(is_subpage_of(
            "Les Contemplations/Livre premier",
            "Les Contemplations"
        ));
        assert!(!is_subpage_of("Les Contemplations", "Les Contemplations"));
        assert!(!is_subpage_of("Les Contemplations bis", "Les Contemplations"));
    }
}
