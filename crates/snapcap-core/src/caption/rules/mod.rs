//! Keyword rules that turn classifier labels into caption ingredients.

pub mod context;
pub mod keywords;
pub mod labels;
pub mod scene;

pub use context::{ContextPhrase, DEFAULT_CONTEXT_FLOOR, extract_context};
pub use keywords::{CONTEXT_KEYWORDS, SCENE_KEYWORDS};
pub use labels::{article_for, normalize_label};
pub use scene::{SceneCategory, detect_scene};

/// True when any label contains any keyword as a substring.
///
/// Substring rather than word matching: "seashore" matches "sea" and
/// "beard" matches "bear".
pub(crate) fn contains_any<S: AsRef<str>>(label: S, keywords: &[&str]) -> bool {
    let label = label.as_ref();
    keywords.iter().any(|keyword| label.contains(keyword))
}
