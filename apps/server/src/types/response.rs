// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response types for the API.

use serde::{Deserialize, Serialize};
use wallscale_measure::{Point2D, WallBounds};

/// Measurement response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureResponse {
    /// Wall width in centimeters, a multiple of 0.5.
    pub wall_width_cm: f64,
    /// Wall height in centimeters, a multiple of 0.5.
    pub wall_height_cm: f64,
    /// Present only when `X-Debug` was set.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub debug: Option<DebugPayload>,
}

/// Diagnostic payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugPayload {
    /// Sheet corners clockwise from top-left.
    pub a4_corners: [Point2D; 4],
    pub wall_bounds: WallBounds,
    pub px_per_cm: f64,
    pub thumbs: DebugThumbs,
}

/// Diagnostic images as `data:image/png;base64,...` URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugThumbs {
    pub mask_wall: String,
    pub mask_window: String,
    pub mask_attached: String,
    pub mask_combined: String,
    pub a4_overlay: String,
}

/// All surface masks from one label map, base64 PNG encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasksResponse {
    pub wall: String,
    pub window: String,
    pub floor: String,
    pub ceiling: String,
    pub width: u32,
    pub height: u32,
}
