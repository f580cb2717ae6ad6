// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion of the wall box to rounded centimeters

use crate::error::{MeasureError, Result};
use crate::types::BoundingBox;

/// Round to the nearest multiple of `step`, halves to the even multiple
///
/// A non-positive step leaves the value untouched.
pub fn round_to_step(value: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return value;
    }
    (value / step).round_ties_even() * step
}

/// Wall width and height in centimeters
pub fn resolve_dimensions(bbox: &BoundingBox, px_per_cm: f64, step_cm: f64) -> Result<(f64, f64)> {
    let width_cm = round_to_step(bbox.width as f64 / px_per_cm, step_cm);
    let height_cm = round_to_step(bbox.height as f64 / px_per_cm, step_cm);

    // NaN fails both comparisons, so test for positivity directly
    if !(width_cm > 0.0 && height_cm > 0.0) {
        tracing::warn!(width_cm, height_cm, ?bbox, "non-positive wall dimensions");
        return Err(MeasureError::InvalidDimensions { width_cm, height_cm });
    }

    Ok((width_cm, height_cm))
}
