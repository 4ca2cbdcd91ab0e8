//! Setting phrases inferred from secondary predictions.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::contains_any;
use super::keywords::CONTEXT_KEYWORDS;

/// Secondary predictions at or below this score are ignored.
pub const DEFAULT_CONTEXT_FLOOR: f32 = 0.05;

/// Short phrase describing where a photo was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContextPhrase {
    #[serde(rename = "outdoors")]
    Outdoors,
    #[serde(rename = "in a park")]
    InPark,
    #[serde(rename = "at the beach")]
    AtBeach,
    #[serde(rename = "on the street")]
    OnStreet,
}

impl ContextPhrase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextPhrase::Outdoors => "outdoors",
            ContextPhrase::InPark => "in a park",
            ContextPhrase::AtBeach => "at the beach",
            ContextPhrase::OnStreet => "on the street",
        }
    }

    fn for_label(label: &str) -> Option<Self> {
        CONTEXT_KEYWORDS
            .iter()
            .find(|(_, keywords)| contains_any(label, keywords))
            .map(|(phrase, _)| *phrase)
    }
}

impl fmt::Display for ContextPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Find a context phrase among the secondary predictions.
///
/// The top prediction (index 0) is the subject and never contributes.
/// Remaining labels scoring above `floor` are scanned in order; the first
/// one matching a context group decides.
pub fn extract_context<S: AsRef<str>>(labels: &[S], scores: &[f32], floor: f32) -> Option<ContextPhrase> {
    labels
        .iter()
        .zip(scores)
        .skip(1)
        .filter(|(_, score)| **score > floor)
        .find_map(|(label, _)| ContextPhrase::for_label(label.as_ref()))
}
