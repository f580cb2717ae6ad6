// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boundary with the semantic segmentation model
//!
//! The model itself lives outside this crate. It is expected to return a label
//! map at the resolution of the analyzed image together with the table that
//! names every label present in the map.

use crate::categories::CategoryTable;
use image::{ImageBuffer, Luma, RgbImage};

/// Per-pixel category indices
pub type LabelMap = ImageBuffer<Luma<u32>, Vec<u32>>;

/// Output of one segmentation call
#[derive(Debug, Clone)]
pub struct Segmentation {
    pub label_map: LabelMap,
    pub categories: CategoryTable,
}

impl Segmentation {
    pub fn new(label_map: LabelMap, categories: CategoryTable) -> Self {
        Self { label_map, categories }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.label_map.dimensions()
    }
}

/// Error reported by a segmentation backend
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct SegmentError(pub String);

/// A semantic segmentation backend
pub trait Segmenter {
    fn segment(&self, image: &RgbImage) -> Result<Segmentation, SegmentError>;
}

/// Widen an 8-bit label image to a label map without rescaling values
pub fn label_map_from_luma8(image: &image::GrayImage) -> LabelMap {
    let (width, height) = image.dimensions();
    LabelMap::from_fn(width, height, |x, y| Luma([image.get_pixel(x, y).0[0] as u32]))
}

/// Widen a 16-bit label image to a label map without rescaling values
pub fn label_map_from_luma16(image: &ImageBuffer<Luma<u16>, Vec<u16>>) -> LabelMap {
    let (width, height) = image.dimensions();
    LabelMap::from_fn(width, height, |x, y| Luma([image.get_pixel(x, y).0[0] as u32]))
}
