//! Source Filter: raw search documents to normalized, size-bounded sources.

use crate::research::Source;
use crate::search::SearchDocument;

/// Documents with less text than this (in characters) carry too little information.
pub const MIN_CONTENT_CHARS: usize = 200;

/// Retained content is never longer than this many characters.
pub const MAX_CONTENT_CHARS: usize = 1000;

const UNTITLED: &str = "Untitled";

/// Keep documents with at least [`MIN_CONTENT_CHARS`] characters of text and
/// truncate their content to `max_chars`, capped at [`MAX_CONTENT_CHARS`].
/// Order is preserved.
pub fn filter_sources(documents: Vec<SearchDocument>, max_chars: usize) -> Vec<Source> {
    let limit = max_chars.min(MAX_CONTENT_CHARS);

    documents
        .into_iter()
        .filter_map(|doc| {
            let text = doc.text?;
            if text.chars().count() < MIN_CONTENT_CHARS {
                return None;
            }

            Some(Source {
                title: doc.title.unwrap_or_else(|| UNTITLED.to_string()),
                content: truncate_chars(&text, limit),
                url: doc.url,
            })
        })
        .collect()
}

/// First `max` characters of `text`, never splitting a UTF-8 code point.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
