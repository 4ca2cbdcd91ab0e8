//! Image preprocessing for Inception-style classifiers.

use image::{DynamicImage, GenericImageView};
use image::imageops::FilterType;
use ndarray::{Array4, ArrayD};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ClassifyError;

/// Memory layout of the input tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorLayout {
    /// `[batch, height, width, channels]`, as exported from Keras.
    Nhwc,
    /// `[batch, channels, height, width]`, as exported from PyTorch.
    Nchw,
}

/// Turns an image into a normalized float tensor.
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    /// Square input edge.
    input_size: u32,
    layout: TensorLayout,
    filter: FilterType,
}

impl ImagePreprocessor {
    /// 299x299 NHWC with nearest-neighbour resizing, matching InceptionV3.
    pub fn new() -> Self {
        Self {
            input_size: 299,
            layout: TensorLayout::Nhwc,
            filter: FilterType::Nearest,
        }
    }

    pub fn with_input_size(mut self, size: u32) -> Self {
        self.input_size = size;
        self
    }

    pub fn with_layout(mut self, layout: TensorLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    pub fn input_size(&self) -> u32 {
        self.input_size
    }

    pub fn layout(&self) -> TensorLayout {
        self.layout
    }

    /// Tensor shape produced by [`preprocess`](Self::preprocess).
    pub fn input_shape(&self) -> [usize; 4] {
        let size = self.input_size as usize;
        match self.layout {
            TensorLayout::Nhwc => [1, size, size, 3],
            TensorLayout::Nchw => [1, 3, size, size],
        }
    }

    /// Resize to the input size, drop alpha and scale pixels to `[-1, 1]`.
    pub fn preprocess(&self, image: &DynamicImage) -> Result<ArrayD<f32>, ClassifyError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 || self.input_size == 0 {
            return Err(ClassifyError::Preprocessing(format!(
                "cannot resize {}x{} image to {}x{}",
                width, height, self.input_size, self.input_size
            )));
        }
        debug!("Preprocessing {}x{} image to {}", width, height, self.input_size);

        // Aspect ratio is not preserved
        let rgb = image
            .resize_exact(self.input_size, self.input_size, self.filter)
            .to_rgb8();

        let size = self.input_size as usize;
        let [_, d1, d2, d3] = self.input_shape();
        let mut tensor = Array4::<f32>::zeros((1, d1, d2, d3));

        for (x, y, pixel) in rgb.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            for c in 0..3 {
                // Inception scaling: x / 127.5 - 1
                let value = pixel[c] as f32 / 127.5 - 1.0;
                match self.layout {
                    TensorLayout::Nhwc => tensor[[0, y, x, c]] = value,
                    TensorLayout::Nchw => tensor[[0, c, y, x]] = value,
                }
            }
        }
        debug_assert_eq!(tensor.len(), size * size * 3);

        Ok(tensor.into_dyn())
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}
