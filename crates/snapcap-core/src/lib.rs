//! Core library for snapcap image captioning.
//!
//! This crate provides:
//! - Caption synthesis from ranked classifier predictions (label cleanup,
//!   scene inference, context phrases, tiered template policy)
//! - A prediction source backed by an ImageNet ONNX classifier
//! - A generator tying the two together for whole-image captioning

pub mod caption;
pub mod classify;
pub mod error;
pub mod generator;
pub mod models;

pub use caption::{
    Caption, CaptionBranch, CaptionComposer, CaptionThresholds, ContextPhrase, FixedChooser,
    SceneCategory, SeededChooser, Strategy, Template, TemplateChooser, TemplateSet,
    ThreadRngChooser,
};
pub use classify::{ClassIndex, ImageClassifier, ImagePreprocessor, PredictionSource, TensorLayout};
pub use error::{ClassifyError, Result, SnapcapError, TemplateError};
pub use generator::{CaptionGenerator, Described, ERROR_CAPTION};
pub use models::config::SnapcapConfig;
pub use models::prediction::{MAX_PREDICTIONS, Prediction, rank};

#[cfg(feature = "native")]
pub use generator::{create_classifier_from_config, create_generator_from_config};

/// Re-export inference types.
pub use snapcap_inference::{InferenceBackend, InferenceError, InputTensor, OutputTensor};

#[cfg(feature = "native")]
pub use snapcap_inference::OrtBackend;

#[cfg(feature = "wasm")]
pub use snapcap_inference::TractBackend;
