// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall measurement from a single photograph
//!
//! A sheet of known size (A4 by default) taped to the wall serves as the
//! scale reference. Given the photo and a per-pixel semantic label map, the
//! pipeline:
//!
//! 1. Builds wall, window and attached-fixture masks from the label map
//! 2. Unions, closes and hole-fills them, then takes the bounding box of the
//!    largest connected component as the wall
//! 3. Searches that region for the brightest quadrilateral with the sheet's
//!    aspect ratio
//! 4. Derives pixels-per-centimeter from the sheet's sides
//! 5. Converts the wall box to centimeters, rounded to half centimeters
//!
//! ```no_run
//! use wallscale_measure::{measure, CategoryTable};
//!
//! let photo = image::open("wall.jpg").unwrap().to_rgb8();
//! let labels = image::open("wall-labels.png").unwrap().to_luma8();
//! let label_map = wallscale_measure::label_map_from_luma8(&labels);
//! let categories = CategoryTable::from_json(r#"{"0": "wall", "8": "window"}"#).unwrap();
//!
//! let result = measure(&photo, &label_map, &categories, false).unwrap();
//! println!("{} x {} cm", result.wall_width_cm, result.wall_height_cm);
//! ```

pub mod calibration;
pub mod categories;
pub mod debug;
pub mod dimensions;
pub mod document_detector;
pub mod error;
pub mod image_ops;
pub mod region;
pub mod segmentation;
pub mod types;

pub use calibration::{calibrate, ScaleCalibration, SheetOrientation};
pub use categories::{
    extract_selected_mask, extract_surface_masks, CategorySet, CategoryTable, MaskSelection, RegionMasks,
    SurfaceMasks,
};
pub use dimensions::resolve_dimensions;
pub use document_detector::{detect_reference_document, order_corners, DocumentDetection};
pub use error::{Failure, FailureKind, MeasureError, Result};
pub use region::{composite_mask, largest_component_bbox, CompositeMask};
pub use segmentation::{label_map_from_luma16, label_map_from_luma8, LabelMap, Segmentation, SegmentError, Segmenter};
pub use types::*;

use image::RgbImage;
use tracing::debug;

/// Measure the wall with the default configuration
pub fn measure(
    image: &RgbImage,
    label_map: &LabelMap,
    categories: &CategoryTable,
    debug: bool,
) -> Result<MeasurementResult> {
    measure_with_config(image, label_map, categories, &MeasureConfig::default(), debug)
}

/// Measure the wall
///
/// `label_map` must have the same dimensions as `image`. With `debug` set the
/// result carries the sheet corners, wall bounds, scale and diagnostic images.
pub fn measure_with_config(
    image: &RgbImage,
    label_map: &LabelMap,
    categories: &CategoryTable,
    config: &MeasureConfig,
    debug: bool,
) -> Result<MeasurementResult> {
    let (image_width, image_height) = image.dimensions();
    let (label_width, label_height) = label_map.dimensions();
    if (label_width, label_height) != (image_width, image_height) {
        return Err(MeasureError::LabelMapMismatch {
            label_width,
            label_height,
            image_width,
            image_height,
        });
    }

    debug!(
        stage = %MeasureStage::AwaitingSegmentation,
        width = image_width,
        height = image_height,
        categories = categories.len(),
        "measurement started"
    );

    let masks = RegionMasks::extract(label_map, categories);
    let composite = composite_mask(&[&masks.wall, &masks.window, &masks.attached], config.close_radius);
    let wall = largest_component_bbox(&composite.filled);
    debug!(stage = %MeasureStage::RegionLocated, ?wall, "wall region located");

    let roi = region::roi_mask(&composite.filled, &wall);
    debug!(stage = %MeasureStage::DocumentSearch, "searching for reference sheet");

    let Some(detection) = detect_reference_document(image, &roi, config) else {
        debug!(stage = %MeasureStage::DocumentNotFound, "no reference sheet candidate");
        return Err(MeasureError::DocumentNotFound);
    };
    debug!(
        stage = %MeasureStage::DocumentFound,
        score = detection.score,
        candidates = detection.candidates,
        "reference sheet found"
    );

    let calibration = calibrate(&detection.quad, &config.reference).inspect_err(|_| {
        debug!(stage = %MeasureStage::CalibrationInvalid, "calibration rejected");
    })?;
    debug!(stage = %MeasureStage::Calibrated, px_per_cm = calibration.px_per_cm);

    let (wall_width_cm, wall_height_cm) = resolve_dimensions(&wall, calibration.px_per_cm, config.rounding_step_cm)
        .inspect_err(|_| {
            debug!(stage = %MeasureStage::DimensionsInvalid, "dimensions rejected");
        })?;
    debug!(
        stage = %MeasureStage::DimensionsResolved,
        wall_width_cm,
        wall_height_cm,
        "measurement complete"
    );

    let debug = debug.then(|| MeasurementDebug {
        a4_corners: detection.quad.corners,
        wall_bounds: wall.to_bounds(),
        px_per_cm: calibration.px_per_cm,
        images: Some(crate::debug::build_debug_images(
            image,
            &masks,
            &composite.combined,
            &detection.quad,
            &wall,
            config.thumbnail_long_side,
        )),
    });

    Ok(MeasurementResult {
        wall_width_cm,
        wall_height_cm,
        debug,
    })
}

/// Segment the photo with `segmenter`, then measure
pub fn measure_with<S: Segmenter + ?Sized>(
    segmenter: &S,
    image: &RgbImage,
    config: &MeasureConfig,
    debug: bool,
) -> Result<MeasurementResult> {
    let segmentation = segmenter
        .segment(image)
        .map_err(|e| MeasureError::Segmentation(e.to_string()))?;
    measure_with_config(image, &segmentation.label_map, &segmentation.categories, config, debug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    struct UniformSegmenter {
        label: u32,
        name: &'static str,
    }

    impl Segmenter for UniformSegmenter {
        fn segment(&self, image: &RgbImage) -> std::result::Result<Segmentation, SegmentError> {
            let (w, h) = image.dimensions();
            let categories: CategoryTable = [(self.label, self.name)].into_iter().collect();
            Ok(Segmentation::new(LabelMap::from_pixel(w, h, Luma([self.label])), categories))
        }
    }

    struct FailingSegmenter;

    impl Segmenter for FailingSegmenter {
        fn segment(&self, _image: &RgbImage) -> std::result::Result<Segmentation, SegmentError> {
            Err(SegmentError("model unavailable".into()))
        }
    }

    fn photo_with_sheet() -> RgbImage {
        let mut image = RgbImage::from_pixel(500, 400, Rgb([90, 90, 90]));
        for y in 140..350 {
            for x in 150..447 {
                image.put_pixel(x, y, Rgb([250, 250, 250]));
            }
        }
        image
    }

    #[test]
    fn test_mismatched_label_map() {
        let image = RgbImage::new(10, 10);
        let label_map = LabelMap::new(10, 5);
        let err = measure(&image, &label_map, &CategoryTable::new(), false).unwrap_err();
        assert!(matches!(err, MeasureError::LabelMapMismatch { .. }));
    }

    #[test]
    fn test_segmenter_failure_is_reported() {
        let err = measure_with(&FailingSegmenter, &RgbImage::new(8, 8), &MeasureConfig::default(), false).unwrap_err();
        assert_eq!(err, MeasureError::Segmentation("model unavailable".into()));
    }

    #[test]
    fn test_measure_with_segmenter() {
        let segmenter = UniformSegmenter { label: 0, name: "wall" };
        let result = measure_with(&segmenter, &photo_with_sheet(), &MeasureConfig::default(), true).unwrap();

        // 500 x 400 px at about 10 px/cm
        assert!((result.wall_width_cm - 50.0).abs() <= 1.0);
        assert!((result.wall_height_cm - 40.0).abs() <= 1.0);
        let debug = result.debug.unwrap();
        assert_eq!(debug.wall_bounds.right, 500);
        assert!(debug.images.is_some());
    }

    #[test]
    fn test_empty_image_reports_missing_sheet() {
        let err = measure(&RgbImage::new(0, 0), &LabelMap::new(0, 0), &CategoryTable::new(), false).unwrap_err();
        assert_eq!(err, MeasureError::DocumentNotFound);
    }

    #[test]
    fn test_no_sheet_on_plain_wall() {
        let segmenter = UniformSegmenter { label: 3, name: "wall" };
        let image = RgbImage::from_pixel(200, 150, Rgb([120, 120, 120]));
        let err = measure_with(&segmenter, &image, &MeasureConfig::default(), false).unwrap_err();
        assert_eq!(err, MeasureError::DocumentNotFound);
    }
}
