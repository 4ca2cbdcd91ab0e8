//! Label cleanup and article selection.

use super::keywords::{FILLER_WORDS, LABEL_SEPARATORS};

/// Turn a raw classifier label into a lowercase, human-readable phrase.
///
/// `"Golden_Retriever"` becomes `"golden retriever"`, `"web_site"` becomes
/// an empty string. Never fails; garbage in yields an empty or odd phrase.
pub fn normalize_label(label: &str) -> String {
    let label = label.to_lowercase();
    let label = LABEL_SEPARATORS.replace_all(&label, " ");
    let label = FILLER_WORDS.replace_all(&label, "");
    label.trim().to_string()
}

/// Indefinite article for a word, judged by its first letter.
pub fn article_for(word: &str) -> &'static str {
    match word.chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}
