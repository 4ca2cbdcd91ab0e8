//! Coarse scene inference from normalized labels.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::contains_any;
use super::keywords::SCENE_KEYWORDS;

/// Coarse subject of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneCategory {
    Outdoor,
    Urban,
    Indoor,
    NatureAnimal,
    Water,
    Transport,
    Food,
    People,
    General,
}

impl SceneCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SceneCategory::Outdoor => "outdoor",
            SceneCategory::Urban => "urban",
            SceneCategory::Indoor => "indoor",
            SceneCategory::NatureAnimal => "nature_animal",
            SceneCategory::Water => "water",
            SceneCategory::Transport => "transport",
            SceneCategory::Food => "food",
            SceneCategory::People => "people",
            SceneCategory::General => "general",
        }
    }
}

impl fmt::Display for SceneCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick the scene category for a set of normalized labels.
///
/// Categories are tried in table order and the first one with a keyword
/// inside any label wins, regardless of which label matched or its score.
pub fn detect_scene<S: AsRef<str>>(labels: &[S]) -> SceneCategory {
    SCENE_KEYWORDS
        .iter()
        .find(|(_, keywords)| labels.iter().any(|label| contains_any(label, keywords)))
        .map(|(scene, _)| *scene)
        .unwrap_or(SceneCategory::General)
}
