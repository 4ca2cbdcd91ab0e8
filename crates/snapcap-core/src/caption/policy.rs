//! Tiered caption policy.
//!
//! Rules are evaluated in order and the first whose predicate holds
//! produces the caption. The last rule always applies.

use serde::{Deserialize, Serialize};

use super::chooser::{TemplateChooser, choose_template};
use super::rules::{
    ContextPhrase, DEFAULT_CONTEXT_FLOOR, SceneCategory, article_for, detect_scene, extract_context,
    normalize_label,
};
use super::templates::{NATURE_ANIMAL, OUTDOOR_SCENE, SINGLE, SlotValues, Template, TemplateSet, phrase, slot};
use super::CaptionBranch;
use crate::error::TemplateError;
use crate::models::prediction::Prediction;

/// Context slot value for confident animal captions without a setting.
const NATURE_CONTEXT: &str = "in nature";

/// Confidence thresholds steering the policy. All comparisons are strict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionThresholds {
    /// Top score above which descriptive scene templates are used.
    pub confident: f32,

    /// Second score required for the landscape templates.
    pub landscape_secondary: f32,

    /// Top score required for a two-object caption.
    pub pair_main: f32,

    /// Second score required for a two-object caption.
    pub pair_secondary: f32,

    /// Top score required for a single-subject caption.
    pub single: f32,

    /// Secondary predictions at or below this score carry no context.
    pub context_floor: f32,
}

impl Default for CaptionThresholds {
    fn default() -> Self {
        Self {
            confident: 0.7,
            landscape_secondary: 0.2,
            pair_main: 0.4,
            pair_secondary: 0.15,
            single: 0.3,
            context_floor: DEFAULT_CONTEXT_FLOOR,
        }
    }
}

/// Everything the rules need, derived once from a non-empty prediction list.
#[derive(Debug, Clone)]
pub struct CaptionInput {
    pub labels: Vec<String>,
    pub scores: Vec<f32>,
    /// Article for the top label.
    pub article: &'static str,
    pub scene: SceneCategory,
    pub context: Option<ContextPhrase>,
}

impl CaptionInput {
    /// `None` when there are no predictions.
    pub fn new(predictions: &[Prediction], thresholds: &CaptionThresholds) -> Option<Self> {
        if predictions.is_empty() {
            return None;
        }

        let labels: Vec<String> = predictions.iter().map(|p| normalize_label(&p.label)).collect();
        let scores: Vec<f32> = predictions.iter().map(|p| p.score).collect();
        let article = article_for(&labels[0]);
        let scene = detect_scene(&labels);
        let context = extract_context(&labels, &scores, thresholds.context_floor);

        Some(Self {
            labels,
            scores,
            article,
            scene,
            context,
        })
    }

    pub fn main(&self) -> &str {
        &self.labels[0]
    }

    pub fn main_score(&self) -> f32 {
        self.scores[0]
    }

    pub fn secondary(&self) -> Option<&str> {
        self.labels.get(1).map(String::as_str)
    }

    pub fn secondary_score(&self) -> Option<f32> {
        self.scores.get(1).copied()
    }

    /// Article of the second label, `"a"` when there is none.
    pub fn secondary_article(&self) -> &'static str {
        self.secondary().map(article_for).unwrap_or("a")
    }

    fn base_slots(&self) -> SlotValues<'_> {
        SlotValues::new()
            .with(slot::ARTICLE, self.article)
            .with(slot::MAIN, self.main())
    }
}

type Predicate = fn(&CaptionInput, &CaptionThresholds) -> bool;
type Action = fn(&CaptionInput, &dyn TemplateChooser) -> Result<String, TemplateError>;

/// One (predicate, action) pair of the policy.
pub struct CaptionRule {
    pub branch: CaptionBranch,
    applies: Predicate,
    compose: Action,
}

impl CaptionRule {
    pub fn applies(&self, input: &CaptionInput, thresholds: &CaptionThresholds) -> bool {
        (self.applies)(input, thresholds)
    }

    pub fn compose(&self, input: &CaptionInput, chooser: &dyn TemplateChooser) -> Result<String, TemplateError> {
        (self.compose)(input, chooser)
    }
}

/// The policy, highest tier first.
pub static RULES: [CaptionRule; 7] = [
    CaptionRule {
        branch: CaptionBranch::ConfidentAnimal,
        applies: |input, t| input.main_score() > t.confident && input.scene == SceneCategory::NatureAnimal,
        compose: compose_confident_animal,
    },
    CaptionRule {
        branch: CaptionBranch::ConfidentLandscape,
        applies: |input, t| {
            input.main_score() > t.confident
                && input.scene == SceneCategory::Outdoor
                && input.secondary_score().is_some_and(|s| s > t.landscape_secondary)
        },
        compose: compose_confident_landscape,
    },
    CaptionRule {
        branch: CaptionBranch::TwoObjects,
        applies: |input, t| {
            input.main_score() > t.pair_main && input.secondary_score().is_some_and(|s| s > t.pair_secondary)
        },
        compose: compose_two_objects,
    },
    CaptionRule {
        branch: CaptionBranch::SingleWithContext,
        applies: |input, t| input.main_score() > t.single && input.context.is_some(),
        compose: compose_single_with_context,
    },
    CaptionRule {
        branch: CaptionBranch::Single,
        applies: |input, t| input.main_score() > t.single,
        compose: compose_single,
    },
    CaptionRule {
        branch: CaptionBranch::Featuring,
        applies: |input, _| input.labels.len() >= 3,
        compose: compose_featuring,
    },
    CaptionRule {
        branch: CaptionBranch::Fallback,
        applies: |_, _| true,
        compose: compose_fallback,
    },
];

/// First rule whose predicate holds.
pub fn select_rule(input: &CaptionInput, thresholds: &CaptionThresholds) -> &'static CaptionRule {
    RULES
        .iter()
        .find(|rule| rule.applies(input, thresholds))
        .unwrap_or(&RULES[RULES.len() - 1])
}

fn render_random(
    set: &TemplateSet,
    values: &SlotValues<'_>,
    chooser: &dyn TemplateChooser,
) -> Result<String, TemplateError> {
    choose_template(set.templates, chooser)
        .unwrap_or(&phrase::FALLBACK)
        .render(values)
}

fn compose_confident_animal(input: &CaptionInput, chooser: &dyn TemplateChooser) -> Result<String, TemplateError> {
    let context = input.context.map(|c| c.as_str()).unwrap_or(NATURE_CONTEXT);
    let values = input
        .base_slots()
        .with(slot::ARTICLE2, input.secondary_article())
        .with(slot::CONTEXT, context);
    render_random(&NATURE_ANIMAL, &values, chooser)
}

fn compose_confident_landscape(input: &CaptionInput, chooser: &dyn TemplateChooser) -> Result<String, TemplateError> {
    let values = input
        .base_slots()
        .with(slot::SECONDARY, input.secondary().unwrap_or_default());
    render_random(&OUTDOOR_SCENE, &values, chooser)
}

fn compose_two_objects(input: &CaptionInput, _: &dyn TemplateChooser) -> Result<String, TemplateError> {
    let template: Template = match input.scene {
        SceneCategory::NatureAnimal | SceneCategory::Outdoor => phrase::PAIR_IN_SCENE,
        SceneCategory::Urban => phrase::PAIR_NEARBY,
        _ => phrase::PAIR_PHOTO,
    };
    let values = input
        .base_slots()
        .with(slot::ARTICLE2, input.secondary_article())
        .with(slot::SECONDARY, input.secondary().unwrap_or_default());
    template.render(&values)
}

fn compose_single_with_context(input: &CaptionInput, _: &dyn TemplateChooser) -> Result<String, TemplateError> {
    let context = input.context.map(|c| c.as_str()).unwrap_or_default();
    phrase::WITH_CONTEXT.render(&input.base_slots().with(slot::CONTEXT, context))
}

fn compose_single(input: &CaptionInput, chooser: &dyn TemplateChooser) -> Result<String, TemplateError> {
    render_random(&SINGLE, &input.base_slots(), chooser)
}

fn compose_featuring(input: &CaptionInput, _: &dyn TemplateChooser) -> Result<String, TemplateError> {
    let values = SlotValues::new()
        .with(slot::MAIN, input.main())
        .with(slot::SECONDARY, input.labels.get(1).map(String::as_str).unwrap_or_default())
        .with(slot::TERTIARY, input.labels.get(2).map(String::as_str).unwrap_or_default());
    phrase::FEATURING.render(&values)
}

fn compose_fallback(input: &CaptionInput, _: &dyn TemplateChooser) -> Result<String, TemplateError> {
    phrase::FALLBACK.render(&input.base_slots())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caption::chooser::FixedChooser;
    use pretty_assertions::assert_eq;

    fn input(predictions: &[(&str, f32)]) -> CaptionInput {
        let predictions: Vec<Prediction> = predictions
            .iter()
            .map(|(label, score)| Prediction::labelled(*label, *score))
            .collect();
        CaptionInput::new(&predictions, &CaptionThresholds::default()).unwrap()
    }

    fn branch(predictions: &[(&str, f32)]) -> CaptionBranch {
        select_rule(&input(predictions), &CaptionThresholds::default()).branch
    }

    #[test]
    fn test_input_derivation() {
        let input = input(&[("Tiger_Cat", 0.8), ("park_bench", 0.1)]);
        assert_eq!(input.labels, vec!["tiger cat", "park bench"]);
        assert_eq!(input.article, "a");
        assert_eq!(input.scene, SceneCategory::Outdoor);
        assert_eq!(input.context, Some(ContextPhrase::InPark));
        assert_eq!(input.secondary_article(), "a");
    }

    #[test]
    fn test_empty_predictions_have_no_input() {
        assert!(CaptionInput::new(&[], &CaptionThresholds::default()).is_none());
    }

    #[test]
    fn test_branch_order() {
        assert_eq!(branch(&[("leopard", 0.9)]), CaptionBranch::ConfidentAnimal);
        assert_eq!(branch(&[("alp", 0.9), ("valley", 0.25)]), CaptionBranch::ConfidentLandscape);
        assert_eq!(branch(&[("pizza", 0.5), ("table", 0.2)]), CaptionBranch::TwoObjects);
        assert_eq!(branch(&[("dog", 0.35), ("grass", 0.1)]), CaptionBranch::SingleWithContext);
        assert_eq!(branch(&[("teapot", 0.35), ("cup", 0.1)]), CaptionBranch::Single);
        assert_eq!(branch(&[("a", 0.2), ("b", 0.2), ("c", 0.1)]), CaptionBranch::Featuring);
        assert_eq!(branch(&[("teapot", 0.2), ("cup", 0.1)]), CaptionBranch::Fallback);
    }

    #[test]
    fn test_confident_outdoor_falls_through() {
        // Outdoor but second score too low for the landscape rule
        assert_eq!(branch(&[("mountain", 0.95), ("alp", 0.2)]), CaptionBranch::TwoObjects);
        // Outdoor with no second prediction at all
        assert_eq!(branch(&[("mountain", 0.95)]), CaptionBranch::Single);
    }

    #[test]
    fn test_confident_general_falls_through() {
        assert_eq!(branch(&[("golden_retriever", 0.85), ("grass", 0.3)]), CaptionBranch::TwoObjects);
    }

    #[test]
    fn test_thresholds_are_strict() {
        assert_eq!(branch(&[("teapot", 0.3)]), CaptionBranch::Fallback);
        assert_eq!(branch(&[("pizza", 0.4), ("table", 0.2)]), CaptionBranch::Single);
    }

    #[test]
    fn test_nan_score_reaches_fallback() {
        assert_eq!(branch(&[("leopard", f32::NAN)]), CaptionBranch::Fallback);
    }

    #[test]
    fn test_two_object_wording_by_scene() {
        let chooser = FixedChooser(0);
        let cases = [
            (vec![("tabby", 0.5), ("lakeside", 0.2)], "a tabby with a lakeside in the scene"),
            (vec![("tabby cat", 0.5), ("ottoman", 0.2)], "a tabby cat with an ottoman in the scene"),
            (vec![("tram", 0.5), ("skyscraper", 0.2)], "a tram with a skyscraper in the scene"),
            (vec![("tram", 0.5), ("tower", 0.2)], "a tram with a tower nearby"),
            (vec![("espresso", 0.5), ("cup", 0.2)], "an photo of an espresso and a cup"),
        ];
        for (predictions, expected) in cases {
            let input = input(&predictions);
            let rule = select_rule(&input, &CaptionThresholds::default());
            assert_eq!(rule.branch, CaptionBranch::TwoObjects);
            assert_eq!(rule.compose(&input, &chooser).unwrap(), expected);
        }
    }

    #[test]
    fn test_featuring_wording() {
        let input = input(&[("spider_web", 0.2), ("barn_spider", 0.2), ("fence", 0.1)]);
        let rule = select_rule(&input, &CaptionThresholds::default());
        assert_eq!(
            rule.compose(&input, &FixedChooser(0)).unwrap(),
            "an image featuring spider, barn spider, and fence"
        );
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = CaptionThresholds {
            single: 0.1,
            ..CaptionThresholds::default()
        };
        let input = input(&[("teapot", 0.2)]);
        assert_eq!(select_rule(&input, &thresholds).branch, CaptionBranch::Single);
    }
}
