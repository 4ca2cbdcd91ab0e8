//! ImageNet class index (class id -> wnid, label).

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::error::ClassifyError;

/// Ordered class vocabulary of a classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassIndex {
    classes: Vec<(String, String)>,
}

impl ClassIndex {
    /// Build from `(wnid, label)` pairs in class-id order.
    pub fn new(classes: Vec<(String, String)>) -> Self {
        Self { classes }
    }

    /// Parse the Keras `imagenet_class_index.json` format:
    /// `{"0": ["n01440764", "tench"], "1": [...], ...}`.
    ///
    /// Keys must cover `0..n` without gaps.
    pub fn from_json(json: &str) -> Result<Self, ClassifyError> {
        let raw: HashMap<String, (String, String)> =
            serde_json::from_str(json).map_err(|e| ClassifyError::ClassIndex(e.to_string()))?;

        let mut indexed = raw
            .into_iter()
            .map(|(key, entry)| {
                key.parse::<usize>()
                    .map(|id| (id, entry))
                    .map_err(|_| ClassifyError::ClassIndex(format!("non-numeric class id '{}'", key)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        indexed.sort_by_key(|(id, _)| *id);

        if let Some(pos) = indexed.iter().enumerate().position(|(pos, (id, _))| pos != *id) {
            return Err(ClassifyError::ClassIndex(format!("missing class id {}", pos)));
        }

        debug!("Loaded class index with {} classes", indexed.len());
        Ok(Self::new(indexed.into_iter().map(|(_, entry)| entry).collect()))
    }

    /// Load a Keras class index file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ClassifyError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ClassifyError::ClassIndex(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// `(wnid, label)` for a class id.
    pub fn get(&self, id: usize) -> Option<(&str, &str)> {
        self.classes
            .get(id)
            .map(|(wnid, label)| (wnid.as_str(), label.as_str()))
    }
}
