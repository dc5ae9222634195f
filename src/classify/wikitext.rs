//! Minimal wikitext scanning
//!
//! Only the features the pipeline needs: template invocations with their
//! parameters, the `<poem>` presence check and `#REDIRECT` targets. This is
//! not a wikitext parser; nesting is handled just enough to split top-level
//! parameters correctly.

use crate::wiki;
use std::collections::HashMap;

/// One template invocation found in wikitext
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub name: String,
    /// `key=value` parameters, keys trimmed
    pub params: HashMap<String, String>,
    /// Unnamed parameters in order
    pub positional: Vec<String>,
}

/// Extracts all top-level template invocations from wikitext
pub fn parse_templates(wikitext: &str) -> Vec<Template> {
    let bytes = wikitext.as_bytes();
    let mut templates = Vec::new();
    let mut i = 0;

    while i + 1 < bytes.len() {
        if bytes[i] == b'{' && bytes[i + 1] == b'{' {
            if let Some(end) = find_closing(bytes, i + 2) {
                if let Some(template) = parse_one(&wikitext[i + 2..end]) {
                    templates.push(template);
                }
                i = end + 2;
                continue;
            }
        }
        i += 1;
    }

    templates
}

/// Finds the byte offset of the `}}` closing a template opened just before
/// `start`, accounting for nested braces
fn find_closing(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 1;
    let mut i = start;

    while i + 1 < bytes.len() {
        if bytes[i] == b'{' && bytes[i + 1] == b'{' {
            depth += 1;
            i += 2;
        } else if bytes[i] == b'}' && bytes[i + 1] == b'}' {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
            i += 2;
        } else {
            i += 1;
        }
    }

    None
}

/// Parses one template body (between `{{` and `}}`)
fn parse_one(body: &str) -> Option<Template> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut link_depth = 0usize;
    let mut current = String::new();

    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                depth += 1;
                current.push_str("{{");
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                depth = depth.saturating_sub(1);
                current.push_str("}}");
            }
            '[' if chars.peek() == Some(&'[') => {
                chars.next();
                link_depth += 1;
                current.push_str("[[");
            }
            ']' if chars.peek() == Some(&']') => {
                chars.next();
                link_depth = link_depth.saturating_sub(1);
                current.push_str("]]");
            }
            '|' if depth == 0 && link_depth == 0 => {
                segments.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    segments.push(current);

    let mut iter = segments.into_iter();
    let name = iter.next()?.trim().to_string();
    if name.is_empty() || name.starts_with('#') {
        return None;
    }

    let mut params = HashMap::new();
    let mut positional = Vec::new();

    for segment in iter {
        match segment.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                params.insert(key.trim().to_string(), value.trim().to_string());
            }
            _ => positional.push(segment.trim().to_string()),
        }
    }

    Some(Template {
        name,
        params,
        positional,
    })
}

/// Whether the wikitext carries a `<poem>` extension tag
pub fn has_poem_tag(wikitext: &str) -> bool {
    wikitext.contains("<poem")
}

/// Extracts the target of a `#REDIRECT [[...]]` page, if this is one
///
/// The target is normalized: pipe label and fragment stripped, underscores
/// replaced with spaces, percent escapes decoded.
pub fn redirect_target(wikitext: &str) -> Option<String> {
    let trimmed = wikitext.trim_start();
    let lower = trimmed.to_lowercase();
    if !(lower.starts_with("#redirect") || lower.starts_with("#redirection")) {
        return None;
    }

    let open = trimmed.find("[[")?;
    let close = trimmed[open + 2..].find("]]")? + open + 2;
    let raw = &trimmed[open + 2..close];

    let raw = raw.split('|').next().unwrap_or("");
    let raw = raw.split('#').next().unwrap_or("");
    let target = wiki::percent_decode(raw).replace('_', " ").trim().to_string();

    if target.is_empty() {
        None
    } else {
        Some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_template() {
        let templates = parse_templates("before {{Homonymie}} after");
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].name, "Homonymie");
    }

    #[test]
    fn test_parse_template_params() {
        let wikitext = "{{Titre|Le Lac|Alphonse de Lamartine|1820}}\n{{Infoédit|éditeur=Gosselin|année = 1839}}";
        let templates = parse_templates(wikitext);
        assert_eq!(templates.len(), 2);

        assert_eq!(
            templates[0].positional,
            vec!["Le Lac", "Alphonse de Lamartine", "1820"]
        );
        assert_eq!(templates[1].params.get("éditeur").unwrap(), "Gosselin");
        assert_eq!(templates[1].params.get("année").unwrap(), "1839");
    }

    #[test]
    fn test_nested_template_stays_one_param() {
        let templates = parse_templates("{{Outer|a={{Inner|x|y}}|b=2}}");
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].params.get("a").unwrap(), "{{Inner|x|y}}");
        assert_eq!(templates[0].params.get("b").unwrap(), "2");
    }

    #[test]
    fn test_piped_link_not_split() {
        let templates = parse_templates("{{T|a=[[Page|label]]}}");
        assert_eq!(templates[0].params.get("a").unwrap(), "[[Page|label]]");
    }

    #[test]
    fn test_parser_functions_skipped() {
        let templates = parse_templates("{{#if:x|y|z}} {{Real}}");
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].name, "Real");
    }

    #[test]
    fn test_unclosed_template_ignored() {
        assert!(parse_templates("{{Broken|never closed").is_empty());
    }

    #[test]
    fn test_has_poem_tag() {
        assert!(has_poem_tag("text <poem>v</poem>"));
        assert!(has_poem_tag("<poem class=\"x\">"));
        assert!(!has_poem_tag("no tag here"));
    }

    #[test]
    fn test_redirect_target() {
        assert_eq!(
            redirect_target("#REDIRECT [[Le Lac (Lamartine)]]"),
            Some("Le Lac (Lamartine)".to_string())
        );
        assert_eq!(
            redirect_target("  #REDIRECTION [[Le_Lac#Strophe 1|le lac]]"),
            Some("Le Lac".to_string())
        );
        assert_eq!(redirect_target("not a redirect"), None);
        assert_eq!(redirect_target("#REDIRECT no link"), None);
    }
}
