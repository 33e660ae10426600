//! Span preprocessing ahead of roster matching

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

use crate::roster::normalize_name;

/// Uppercase surname run directly followed by a capitalized given name
static GLUED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z]+)([A-Z][a-z].*)$").expect("glued-name pattern is valid"));

/// `"SURNAME I"`
static SURNAME_INITIAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z]{2,}) ([A-Z])$").expect("surname-initial pattern is valid"));

/// Split `"HARIMOTOTomokazu"` into `"HARIMOTO Tomokazu"`
///
/// Needs the original casing; run it before uppercasing.
pub fn split_glued(word: &str) -> Cow<'_, str> {
    GLUED.replace(word, "$1 $2")
}

/// Normalize `"COK I"` to `"I COK"`; `"I COK"` and anything else pass through
pub fn reorder_initial(query: &str) -> Cow<'_, str> {
    SURNAME_INITIAL.replace(query, "$2 $1")
}

/// Hyphens to spaces, glued names split, uppercased, whitespace collapsed,
/// initials moved in front
pub fn preprocess(span: &str) -> String {
    let spaced = span.replace('-', " ");
    let split: Vec<Cow<'_, str>> = spaced.split_whitespace().map(split_glued).collect();
    let query = normalize_name(&split.join(" "));
    reorder_initial(&query).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_glued() {
        assert_eq!(split_glued("HARIMOTOTomokazu"), "HARIMOTO Tomokazu");
        assert_eq!(split_glued("OConnor"), "O Connor");
        assert_eq!(split_glued("HARIMOTO"), "HARIMOTO");
        assert_eq!(split_glued("Harimoto"), "Harimoto");
    }

    #[test]
    fn test_reorder_initial() {
        assert_eq!(reorder_initial("COK I"), "I COK");
        assert_eq!(reorder_initial("I COK"), "I COK");
        assert_eq!(reorder_initial("MA LONG"), "MA LONG");
        assert_eq!(reorder_initial("A B"), "A B");
    }

    #[test]
    fn test_preprocess() {
        assert_eq!(preprocess("  lin  yun-ju "), "LIN YUN JU");
        assert_eq!(preprocess("HARIMOTOTomokazu"), "HARIMOTO TOMOKAZU");
        assert_eq!(preprocess("cok i"), "I COK");
        assert_eq!(preprocess("-"), "");
    }
}
