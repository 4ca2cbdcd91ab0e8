//! Keyword tables for scene and context inference.
//!
//! Declaration order is significant: the first matching entry wins.

use lazy_static::lazy_static;
use regex::Regex;

use super::context::ContextPhrase;
use super::scene::SceneCategory;

/// Scene categories in priority order with their trigger keywords.
pub const SCENE_KEYWORDS: &[(SceneCategory, &[&str])] = &[
    (
        SceneCategory::Outdoor,
        &[
            "mountain", "lake", "beach", "ocean", "sea", "valley", "cliff", "park", "forest",
            "tree", "sky", "cloud", "sunset", "sunrise",
        ],
    ),
    (
        SceneCategory::Urban,
        &["building", "street", "city", "skyscraper", "bridge", "tower", "monument"],
    ),
    (
        SceneCategory::Indoor,
        &["room", "furniture", "lamp", "window", "door", "wall", "floor"],
    ),
    (
        SceneCategory::NatureAnimal,
        &[
            "animal", "bird", "dog", "cat", "horse", "leopard", "tiger", "elephant", "bear",
            "wolf", "deer", "rabbit", "fox",
        ],
    ),
    (
        SceneCategory::Water,
        &["boat", "ship", "yacht", "surfboard", "swimming", "diving", "ocean", "lake", "river"],
    ),
    (
        SceneCategory::Transport,
        &["car", "bus", "train", "airplane", "motorcycle", "bicycle", "vehicle"],
    ),
    (
        SceneCategory::Food,
        &["pizza", "burger", "bread", "fruit", "vegetable", "dish", "meal", "food"],
    ),
    (
        SceneCategory::People,
        &["person", "people", "man", "woman", "child", "boy", "girl", "face"],
    ),
];

/// Context groups in priority order with their trigger keywords.
pub const CONTEXT_KEYWORDS: &[(ContextPhrase, &[&str])] = &[
    (ContextPhrase::Outdoors, &["outdoor", "mountain", "sky", "cloud"]),
    (ContextPhrase::InPark, &["park", "grass", "field"]),
    (ContextPhrase::AtBeach, &["beach", "ocean", "sea"]),
    (ContextPhrase::OnStreet, &["street", "road"]),
];

lazy_static! {
    // Filler words in ImageNet labels ("web site", "spider web")
    pub static ref FILLER_WORDS: Regex = Regex::new(r"(?i)\b(?:web|site)\b").unwrap();

    // Separators joining words in raw labels
    pub static ref LABEL_SEPARATORS: Regex = Regex::new(r"[_-]").unwrap();
}
