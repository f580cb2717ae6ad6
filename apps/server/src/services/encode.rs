// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! PNG and base64 encoding of masks and debug images.

use crate::error::ApiError;
use crate::types::DebugThumbs;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use wallscale_measure::image_ops::encode_png;
use wallscale_measure::DebugImages;

/// PNG bytes as plain base64.
pub fn png_base64(image: impl Into<DynamicImage>) -> Result<String, ApiError> {
    Ok(STANDARD.encode(encode_png(image)?))
}

/// PNG bytes as a `data:` URL.
pub fn png_data_url(image: impl Into<DynamicImage>) -> Result<String, ApiError> {
    Ok(format!("data:image/png;base64,{}", png_base64(image)?))
}

/// Encode every debug image as a data URL.
pub fn encode_thumbs(images: &DebugImages) -> Result<DebugThumbs, ApiError> {
    Ok(DebugThumbs {
        mask_wall: png_data_url(images.wall_mask.clone())?,
        mask_window: png_data_url(images.window_mask.clone())?,
        mask_attached: png_data_url(images.attached_mask.clone())?,
        mask_combined: png_data_url(images.combined_mask.clone())?,
        a4_overlay: png_data_url(images.overlay.clone())?,
    })
}
