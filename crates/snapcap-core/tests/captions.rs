//! Caption behaviour through the public API.

use pretty_assertions::assert_eq;

use snapcap_core::caption::{FixedChooser, extract_context, normalize_label};
use snapcap_core::{CaptionBranch, CaptionComposer, Prediction, SceneCategory, caption::detect_scene};

fn predictions(items: &[(&str, f32)]) -> Vec<Prediction> {
    items
        .iter()
        .map(|(label, score)| Prediction::labelled(*label, *score))
        .collect()
}

#[test]
fn test_empty_predictions() {
    assert_eq!(
        CaptionComposer::new().caption_text(&[]),
        "An interesting scene captured in this image"
    );
}

#[test]
fn test_outdoor_beats_urban() {
    let labels = ["steel arch bridge", "seashore"].map(normalize_label);
    assert_eq!(detect_scene(&labels), SceneCategory::Outdoor);
}

#[test]
fn test_context_only_at_top_is_ignored() {
    let labels = ["seashore", "sandbar"].map(normalize_label);
    assert_eq!(extract_context(&labels, &[0.6, 0.3], 0.05), None);

    let composer = CaptionComposer::with_chooser(FixedChooser(1));
    let caption = composer.compose(&predictions(&[("seashore", 0.35), ("sandbar", 0.1)]));
    assert_eq!(caption.context, None);
    assert_eq!(caption.text, "A seashore in the photo");
}

#[test]
fn test_every_caption_is_capitalized() {
    let cases: &[&[(&str, f32)]] = &[
        &[("leopard", 0.9)],
        &[("volcano", 0.9), ("valley", 0.5)],
        &[("pizza", 0.5), ("table", 0.2)],
        &[("dog", 0.35), ("lawn_mower", 0.2)],
        &[("ashcan", 0.35)],
        &[("a", 0.1), ("b", 0.1), ("c", 0.1)],
        &[("umbrella", 0.1)],
    ];
    for index in 0..4 {
        let composer = CaptionComposer::with_chooser(FixedChooser(index));
        for case in cases {
            let text = composer.caption_text(&predictions(case));
            let first = text.chars().next().unwrap();
            assert!(first.is_uppercase(), "{text:?}");
        }
    }
}

#[test]
fn test_branch_is_deterministic_under_random_wording() {
    let composer = CaptionComposer::new();
    let items = predictions(&[("volcano", 0.9), ("valley", 0.5)]);
    let allowed = [
        "A scenic view of volcano",
        "A beautiful volcano landscape",
        "Volcano with valley in the background",
        "A picturesque volcano scene",
    ];
    for _ in 0..200 {
        let caption = composer.compose(&items);
        assert_eq!(caption.branch, CaptionBranch::ConfidentLandscape);
        assert!(allowed.contains(&caption.text.as_str()), "{}", caption.text);
    }
}

#[test]
fn test_caption_serializes() {
    let caption = CaptionComposer::with_chooser(FixedChooser(0))
        .compose(&predictions(&[("sports_car", 0.35), ("street_sign", 0.2)]));
    let json = serde_json::to_value(&caption).unwrap();
    assert_eq!(json["text"], "A sports car on the street");
    assert_eq!(json["branch"], "single_with_context");
    assert_eq!(json["scene"], "outdoor");
    assert_eq!(json["context"], "on the street");
}
