//! Caption composer.

use tracing::{debug, warn};

use super::chooser::{TemplateChooser, ThreadRngChooser};
use super::policy::{CaptionInput, CaptionThresholds, select_rule};
use super::rules::SceneCategory;
use super::{Caption, CaptionBranch};
use crate::models::prediction::Prediction;

/// Caption for an empty prediction list.
pub const EMPTY_SCENE_CAPTION: &str = "An interesting scene captured in this image";

/// Caption substituted when a rule composes an empty string.
pub const EMPTY_CAPTION: &str = "An interesting image";

/// Turns ranked predictions into a caption.
///
/// Stateless apart from the chooser; one composer can serve concurrent
/// requests.
#[derive(Debug)]
pub struct CaptionComposer<C: TemplateChooser = ThreadRngChooser> {
    chooser: C,
    thresholds: CaptionThresholds,
}

impl CaptionComposer {
    /// Composer with default thresholds and a random chooser.
    pub fn new() -> Self {
        Self::with_chooser(ThreadRngChooser)
    }
}

impl Default for CaptionComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: TemplateChooser> CaptionComposer<C> {
    /// Composer drawing template choices from `chooser`.
    pub fn with_chooser(chooser: C) -> Self {
        Self {
            chooser,
            thresholds: CaptionThresholds::default(),
        }
    }

    /// Set the policy thresholds.
    pub fn with_thresholds(mut self, thresholds: CaptionThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn thresholds(&self) -> &CaptionThresholds {
        &self.thresholds
    }

    /// Compose a caption for predictions ordered by descending score.
    ///
    /// Total: every input, including an empty one, yields a caption.
    pub fn compose(&self, predictions: &[Prediction]) -> Caption {
        let Some(input) = CaptionInput::new(predictions, &self.thresholds) else {
            debug!("No predictions, using empty-scene caption");
            return Caption {
                text: EMPTY_SCENE_CAPTION.to_string(),
                branch: CaptionBranch::Empty,
                scene: SceneCategory::General,
                context: None,
            };
        };

        let rule = select_rule(&input, &self.thresholds);
        let text = match rule.compose(&input, &self.chooser) {
            Ok(text) => text,
            Err(e) => {
                warn!("Template for {} failed ({}), using fallback wording", rule.branch, e);
                format!("{} {}", input.article, input.main())
            }
        };

        debug!(
            "Composed caption via {} (scene: {}, context: {:?}, top: {:.3})",
            rule.branch,
            input.scene,
            input.context,
            input.main_score()
        );

        Caption {
            text: finish(&text),
            branch: rule.branch,
            scene: input.scene,
            context: input.context,
        }
    }

    /// Compose and return only the sentence.
    pub fn caption_text(&self, predictions: &[Prediction]) -> String {
        self.compose(predictions).text
    }
}

/// Capitalize the first character.
fn finish(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => EMPTY_CAPTION.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caption::chooser::{FixedChooser, SeededChooser};
    use crate::caption::rules::ContextPhrase;
    use pretty_assertions::assert_eq;

    fn predictions(items: &[(&str, f32)]) -> Vec<Prediction> {
        items
            .iter()
            .map(|(label, score)| Prediction::labelled(*label, *score))
            .collect()
    }

    fn compose_with(index: usize, items: &[(&str, f32)]) -> Caption {
        CaptionComposer::with_chooser(FixedChooser(index)).compose(&predictions(items))
    }

    #[test]
    fn test_empty_input() {
        let caption = CaptionComposer::new().compose(&[]);
        assert_eq!(caption.text, "An interesting scene captured in this image");
        assert_eq!(caption.branch, CaptionBranch::Empty);
    }

    #[test]
    fn test_confident_animal_templates() {
        let items = [("leopard", 0.85), ("grass", 0.3)];
        let expected = [
            "A leopard in a natural setting",
            "A beautiful leopard captured in this photo",
            "A leopard in a park",
            "A leopard in the wild",
        ];
        for (index, text) in expected.iter().enumerate() {
            let caption = compose_with(index, &items);
            assert_eq!(caption.text, *text);
            assert_eq!(caption.branch, CaptionBranch::ConfidentAnimal);
            assert_eq!(caption.context, Some(ContextPhrase::InPark));
        }
    }

    #[test]
    fn test_confident_animal_vowel_second_label() {
        let items = [("leopard", 0.85), ("ocelot", 0.1)];
        let caption = compose_with(0, &items);
        assert_eq!(caption.text, "A leopard in an natural setting");
        assert_eq!(caption.branch, CaptionBranch::ConfidentAnimal);

        assert_eq!(compose_with(2, &items).text, "A leopard in nature");
    }

    #[test]
    fn test_confident_animal_without_context() {
        let caption = compose_with(2, &[("African_elephant", 0.9)]);
        assert_eq!(caption.text, "An african elephant in nature");
        assert_eq!(caption.scene, SceneCategory::NatureAnimal);

        let caption = compose_with(0, &[("African_elephant", 0.9), ("tusker", 0.04)]);
        assert_eq!(caption.text, "An african elephant in a natural setting");
    }

    #[test]
    fn test_confident_landscape_templates() {
        let items = [("volcano", 0.8), ("mountain", 0.25)];
        let expected = [
            "A scenic view of volcano",
            "A beautiful volcano landscape",
            "Volcano with mountain in the background",
            "A picturesque volcano scene",
        ];
        for (index, text) in expected.iter().enumerate() {
            let caption = compose_with(index, &items);
            assert_eq!(caption.text, *text);
            assert_eq!(caption.branch, CaptionBranch::ConfidentLandscape);
        }
    }

    #[test]
    fn test_golden_retriever_caption() {
        let caption = CaptionComposer::new().compose(&predictions(&[("golden_retriever", 0.85), ("grass", 0.3)]));
        assert!(caption.text.contains("golden retriever"), "{}", caption.text);
        assert_eq!(caption.text, "A photo of a golden retriever and a grass");
        assert_eq!(caption.branch, CaptionBranch::TwoObjects);
    }

    #[test]
    fn test_pizza_two_objects() {
        let caption = CaptionComposer::new().compose(&predictions(&[("pizza", 0.5), ("table", 0.2)]));
        assert_eq!(caption.text, "A photo of a pizza and a table");
        assert_eq!(caption.scene, SceneCategory::Food);
    }

    #[test]
    fn test_single_mountain_does_not_need_second() {
        let expected = ["A mountain", "A mountain in the photo", "This image shows a mountain"];
        for (index, text) in expected.iter().enumerate() {
            let caption = compose_with(index, &[("mountain", 0.95)]);
            assert_eq!(caption.text, *text);
            assert_eq!(caption.branch, CaptionBranch::Single);
            assert_eq!(caption.context, None);
        }
    }

    #[test]
    fn test_single_with_context() {
        let caption = compose_with(0, &[("sports_car", 0.35), ("street_sign", 0.2)]);
        assert_eq!(caption.text, "A sports car on the street");
        assert_eq!(caption.branch, CaptionBranch::SingleWithContext);
    }

    #[test]
    fn test_featuring_and_fallback() {
        let caption = compose_with(0, &[("envelope", 0.2), ("packet", 0.12), ("carton", 0.1)]);
        assert_eq!(caption.text, "An image featuring envelope, packet, and carton");

        let caption = compose_with(0, &[("envelope", 0.2), ("packet", 0.12)]);
        assert_eq!(caption.text, "An envelope");
        assert_eq!(caption.branch, CaptionBranch::Fallback);
    }

    #[test]
    fn test_malformed_label_degrades() {
        let caption = compose_with(0, &[("web_site", 0.9)]);
        assert_eq!(caption.branch, CaptionBranch::Single);
        assert_eq!(caption.text, "A ");
    }

    #[test]
    fn test_branch_independent_of_chooser() {
        let items = predictions(&[("tabby", 0.9), ("Egyptian_cat", 0.05), ("lynx", 0.02)]);
        let seeded = CaptionComposer::with_chooser(SeededChooser::new(7));
        let random = CaptionComposer::new();
        for _ in 0..20 {
            assert_eq!(seeded.compose(&items).branch, CaptionBranch::ConfidentAnimal);
            assert_eq!(random.compose(&items).branch, CaptionBranch::ConfidentAnimal);
        }
    }

    #[test]
    fn test_finish() {
        assert_eq!(finish("a dog"), "A dog");
        assert_eq!(finish("élan"), "Élan");
        assert_eq!(finish(""), EMPTY_CAPTION);
    }

    #[test]
    fn test_composer_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CaptionComposer>();
        assert_send_sync::<CaptionComposer<SeededChooser>>();
    }
}
