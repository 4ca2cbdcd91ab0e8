//! WASM bindings for snapcap image captioning.
//!
//! This crate provides WebAssembly bindings for use in browsers and Node.js.

use wasm_bindgen::prelude::*;

use snapcap_core::caption::{article_for as core_article_for, detect_scene as core_detect_scene};
use snapcap_core::{
    CaptionComposer, CaptionGenerator, ClassIndex, ERROR_CAPTION, ImageClassifier, Prediction, SeededChooser,
    TemplateChooser, ThreadRngChooser, TractBackend, rank,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn chooser_for(seed: Option<u64>) -> Box<dyn TemplateChooser> {
    match seed {
        Some(seed) => Box::new(SeededChooser::new(seed)),
        None => Box::new(ThreadRngChooser),
    }
}

fn predictions_from_js(predictions: JsValue) -> Result<Vec<Prediction>, JsValue> {
    let predictions: Vec<Prediction> = serde_wasm_bindgen::from_value(predictions).map_err(to_js_error)?;
    Ok(rank(predictions))
}

/// Compose a caption from `[{label, score}]` predictions.
///
/// Returns `{text, branch, scene, context?}`. Pass a seed for reproducible
/// wording.
#[wasm_bindgen]
pub fn compose_caption(predictions: JsValue, seed: Option<u64>) -> Result<JsValue, JsValue> {
    let predictions = predictions_from_js(predictions)?;
    let caption = CaptionComposer::with_chooser(chooser_for(seed)).compose(&predictions);

    serde_wasm_bindgen::to_value(&caption).map_err(to_js_error)
}

/// Caption text only.
#[wasm_bindgen]
pub fn caption_text(predictions: JsValue, seed: Option<u64>) -> Result<String, JsValue> {
    let predictions = predictions_from_js(predictions)?;
    Ok(CaptionComposer::with_chooser(chooser_for(seed)).caption_text(&predictions))
}

/// Clean a raw classifier label (e.g. "golden_retriever" -> "golden retriever").
#[wasm_bindgen]
pub fn normalize_label(label: &str) -> String {
    snapcap_core::caption::normalize_label(label)
}

/// Scene category name for a list of normalized labels.
#[wasm_bindgen]
pub fn detect_scene(labels: Vec<String>) -> String {
    core_detect_scene(labels.as_slice()).to_string()
}

/// Indefinite article for a word.
#[wasm_bindgen]
pub fn article_for(word: &str) -> String {
    core_article_for(word).to_string()
}

/// In-browser classifier + captioner running an ONNX model with tract.
#[wasm_bindgen]
pub struct ImageCaptioner {
    generator: CaptionGenerator<ImageClassifier<TractBackend>, Box<dyn TemplateChooser>>,
}

#[wasm_bindgen]
impl ImageCaptioner {
    /// Load an NHWC 299x299 ImageNet classifier and its Keras class index.
    #[wasm_bindgen(constructor)]
    pub fn new(model_bytes: &[u8], class_index_json: &str, seed: Option<u64>) -> Result<ImageCaptioner, JsValue> {
        let backend = TractBackend::from_bytes(model_bytes).map_err(to_js_error)?;
        let classes = ClassIndex::from_json(class_index_json).map_err(to_js_error)?;
        let classifier = ImageClassifier::new(backend, classes);

        Ok(Self {
            generator: CaptionGenerator::with_composer(classifier, CaptionComposer::with_chooser(chooser_for(seed))),
        })
    }

    /// Caption encoded image bytes (PNG, JPEG, ...). Never fails; problems
    /// yield "Error processing image".
    #[wasm_bindgen]
    pub fn caption(&self, image_bytes: &[u8]) -> String {
        match image::load_from_memory(image_bytes) {
            Ok(image) => self.generator.caption_image(&image),
            Err(_) => ERROR_CAPTION.to_string(),
        }
    }

    /// Caption with ranked predictions and timing.
    #[wasm_bindgen]
    pub fn describe(&self, image_bytes: &[u8]) -> Result<JsValue, JsValue> {
        let image = image::load_from_memory(image_bytes).map_err(to_js_error)?;
        let described = self.generator.describe_image(&image).map_err(to_js_error)?;

        serde_wasm_bindgen::to_value(&described).map_err(to_js_error)
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn js_predictions(items: &[(&str, f32)]) -> JsValue {
        let predictions: Vec<Prediction> =
            items.iter().map(|(label, score)| Prediction::labelled(*label, *score)).collect();
        serde_wasm_bindgen::to_value(&predictions).unwrap()
    }

    #[wasm_bindgen_test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("Golden_Retriever"), "golden retriever");
        assert_eq!(normalize_label("spider_web"), "spider");
    }

    #[wasm_bindgen_test]
    fn test_detect_scene() {
        let labels = vec!["seashore".to_string(), "steel arch bridge".to_string()];
        assert_eq!(detect_scene(labels), "outdoor");
        assert_eq!(detect_scene(Vec::new()), "general");
    }

    #[wasm_bindgen_test]
    fn test_article_for() {
        assert_eq!(article_for("egg"), "an");
        assert_eq!(article_for("pizza"), "a");
    }

    #[wasm_bindgen_test]
    fn test_caption_text() {
        let text = caption_text(js_predictions(&[("pizza", 0.5), ("table", 0.3)]), None).unwrap();
        assert_eq!(text, "A photo of a pizza and a table");

        let empty = caption_text(js_predictions(&[]), None).unwrap();
        assert_eq!(empty, "An interesting scene captured in this image");
    }

    #[wasm_bindgen_test]
    fn test_compose_caption_seeded() {
        let items = [("volcano", 0.9), ("valley", 0.5)];
        let first = caption_text(js_predictions(&items), Some(3)).unwrap();
        let second = caption_text(js_predictions(&items), Some(3)).unwrap();
        assert_eq!(first, second);

        assert!(compose_caption(js_predictions(&items), Some(3)).unwrap().is_object());
    }

    #[wasm_bindgen_test]
    fn test_compose_caption_rejects_bad_input() {
        assert!(compose_caption(JsValue::from_str("pizza"), None).is_err());
    }
}
