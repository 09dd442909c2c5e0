//! Plain-text extraction from diagram labels.

use scraper::Html;

use crate::directive::{Delimiters, TermMapping};

/// Reduce an HTML label fragment to its visible text, trimmed.
///
/// Entities are decoded (`&amp;` → `&`) and tags dropped, so
/// `<b>M</b>[Motor|m_]` becomes `M[Motor|m_]`.
pub fn strip_html(raw: &str) -> String {
    if !raw.contains('<') && !raw.contains('&') {
        return raw.trim().to_string();
    }
    let fragment = Html::parse_fragment(raw);
    fragment
        .root_element()
        .text()
        .collect::<String>()
        .trim()
        .to_string()
}

/// The display name of a label: the head of an instantiation form if there
/// is one, otherwise the whole cleaned text.
pub fn clean_term(raw: &str) -> String {
    match TermMapping::parse(raw, Delimiters::Brackets) {
        Some(mapping) => mapping.head,
        None => strip_html(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_entities() {
        assert_eq!(strip_html("<b>M</b>[Motor|m_]"), "M[Motor|m_]");
        assert_eq!(strip_html("  <div>a &amp; b</div> "), "a & b");
        assert_eq!(strip_html(" plain "), "plain");
    }

    #[test]
    fn cleans_instantiation_labels() {
        assert_eq!(clean_term("<i>Stator</i>[motor_ref|s_]"), "Stator");
        assert_eq!(clean_term("Stator"), "Stator");
    }
}
