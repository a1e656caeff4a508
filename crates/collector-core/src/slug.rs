//! Key derivation and display-label formatting.
//!
//! Category keys and field names are both derived from human-entered text with
//! [`derive_key`]. [`humanize_label`] goes the other way for column headers and
//! is purely cosmetic.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Derive a slug key from a display name or field label.
///
/// Lower-cases the input and replaces each run of whitespace with a single
/// underscore. Every other character is kept as-is, so leading or trailing
/// whitespace becomes a leading or trailing underscore.
///
/// ```
/// use collector_core::slug::derive_key;
///
/// assert_eq!(derive_key("My Comics"), "my_comics");
/// ```
pub fn derive_key(input: &str) -> String {
    let lowered = input.to_lowercase();
    WHITESPACE_RUN.replace_all(&lowered, "_").into_owned()
}

/// Turn a raw key into a display label.
///
/// Splits on underscores and capital-letter boundaries and title-cases each
/// word: `purchase_price` → `Purchase Price`, `issueNumber` → `Issue Number`,
/// `ISBNCode` → `ISBN Code`.
pub fn humanize_label(key: &str) -> String {
    key.split('_')
        .flat_map(split_case_boundaries)
        .map(|word| capitalize(&word))
        .collect::<Vec<_>>()
        .join(" ")
}

fn split_case_boundaries(segment: &str) -> Vec<String> {
    let chars: Vec<char> = segment.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            // camelCase boundary, or the last capital of an acronym run
            if !prev.is_uppercase() || next_is_lower {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().to_string() + chars.as_str(),
    }
}
