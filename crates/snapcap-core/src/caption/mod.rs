//! Caption synthesis from ranked classifier predictions.

mod chooser;
mod composer;
pub mod policy;
pub mod rules;
pub mod templates;

pub use chooser::{FixedChooser, SeededChooser, TemplateChooser, ThreadRngChooser, choose_template};
pub use composer::{CaptionComposer, EMPTY_CAPTION, EMPTY_SCENE_CAPTION};
pub use policy::{CaptionInput, CaptionRule, CaptionThresholds};
pub use rules::{ContextPhrase, SceneCategory, article_for, detect_scene, extract_context, normalize_label};
pub use templates::{SlotValues, Strategy, Template, TemplateSet};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Policy rule that produced a caption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptionBranch {
    /// Confident animal subject, nature templates.
    ConfidentAnimal,
    /// Confident outdoor subject with a solid second label, landscape templates.
    ConfidentLandscape,
    TwoObjects,
    SingleWithContext,
    Single,
    /// Three weak labels listed together.
    Featuring,
    Fallback,
    /// No predictions at all.
    Empty,
}

impl CaptionBranch {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptionBranch::ConfidentAnimal => "confident_animal",
            CaptionBranch::ConfidentLandscape => "confident_landscape",
            CaptionBranch::TwoObjects => "two_objects",
            CaptionBranch::SingleWithContext => "single_with_context",
            CaptionBranch::Single => "single",
            CaptionBranch::Featuring => "featuring",
            CaptionBranch::Fallback => "fallback",
            CaptionBranch::Empty => "empty",
        }
    }
}

impl fmt::Display for CaptionBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A composed caption and how it was reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caption {
    /// Final sentence, first letter capitalized.
    pub text: String,
    pub branch: CaptionBranch,
    pub scene: SceneCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextPhrase>,
}

impl fmt::Display for Caption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
