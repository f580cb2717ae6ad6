// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Blocking measurement and mask export jobs.
//!
//! Everything here is CPU-bound and runs on the blocking thread pool.

use super::decode::{decode_label_map, decode_photo, parse_categories};
use super::encode::{encode_thumbs, png_base64};
use crate::error::ApiError;
use crate::types::{DebugPayload, MasksResponse, MeasureResponse};
use wallscale_measure::image_ops::{encode_png, rgba_from_binary_mask};
use wallscale_measure::{extract_selected_mask, extract_surface_masks, measure, MaskSelection};

/// Raw inputs of a measurement request.
pub struct MeasureJob {
    pub image: Vec<u8>,
    pub labels: Vec<u8>,
    pub categories: String,
    pub debug: bool,
    pub max_pixels: u64,
}

/// Decode inputs, measure and shape the response.
pub fn run_measurement(job: MeasureJob) -> Result<MeasureResponse, ApiError> {
    let photo = decode_photo(&job.image, job.max_pixels)?;
    let label_map = decode_label_map(&job.labels, job.max_pixels)?;
    let categories = parse_categories(&job.categories)?;

    let result = measure(&photo, &label_map, &categories, job.debug)?;

    let debug = match result.debug {
        Some(debug) => {
            let images = debug
                .images
                .as_ref()
                .ok_or_else(|| ApiError::Internal("debug images missing".into()))?;
            Some(DebugPayload {
                a4_corners: debug.a4_corners,
                wall_bounds: debug.wall_bounds,
                px_per_cm: debug.px_per_cm,
                thumbs: encode_thumbs(images)?,
            })
        }
        None => None,
    };

    Ok(MeasureResponse {
        wall_width_cm: result.wall_width_cm,
        wall_height_cm: result.wall_height_cm,
        debug,
    })
}

/// Single RGBA cut-out mask as PNG bytes.
pub fn run_mask_export(
    labels: &[u8],
    categories: &str,
    selection: MaskSelection,
    custom_labels: Option<&str>,
    max_pixels: u64,
) -> Result<Vec<u8>, ApiError> {
    let label_map = decode_label_map(labels, max_pixels)?;
    let categories = parse_categories(categories)?;

    let mask = extract_selected_mask(&label_map, &categories, selection, custom_labels);
    Ok(encode_png(rgba_from_binary_mask(&mask))?)
}

/// Wall, window, floor and ceiling masks as base64 PNGs.
pub fn run_surface_masks(labels: &[u8], categories: &str, max_pixels: u64) -> Result<MasksResponse, ApiError> {
    let label_map = decode_label_map(labels, max_pixels)?;
    let categories = parse_categories(categories)?;
    let (width, height) = label_map.dimensions();

    let masks = extract_surface_masks(&label_map, &categories);
    Ok(MasksResponse {
        wall: png_base64(masks.wall)?,
        window: png_base64(masks.window)?,
        floor: png_base64(masks.floor)?,
        ceiling: png_base64(masks.ceiling)?,
        width,
        height,
    })
}
