// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pixel scale from the detected reference sheet

use crate::error::{MeasureError, Result};
use crate::types::{Quadrilateral, ReferenceDocument};
use serde::{Deserialize, Serialize};

/// Which sheet side runs along the horizontal image axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SheetOrientation {
    /// Long side horizontal (landscape)
    LongForward,
    /// Short side horizontal (portrait)
    ShortForward,
}

/// Pixels-per-centimeter derived from one sheet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleCalibration {
    pub px_per_cm: f64,
    pub orientation: SheetOrientation,
    pub width_px: f64,
    pub height_px: f64,
}

/// Orientation whose ratio is closer to `ratio`; ties go to long-forward
pub fn orientation_for_ratio(ratio: f64, reference: &ReferenceDocument) -> SheetOrientation {
    let d_long = (ratio - reference.long_forward_ratio()).abs();
    let d_short = (ratio - reference.short_forward_ratio()).abs();
    if d_long <= d_short {
        SheetOrientation::LongForward
    } else {
        SheetOrientation::ShortForward
    }
}

/// Average the horizontal and vertical pixel scales of the sheet
pub fn calibrate(quad: &Quadrilateral, reference: &ReferenceDocument) -> Result<ScaleCalibration> {
    let (width_px, height_px) = quad.side_estimates();
    let ratio = width_px / height_px.max(1e-6);
    let orientation = orientation_for_ratio(ratio, reference);

    let (horizontal_cm, vertical_cm) = match orientation {
        SheetOrientation::LongForward => (reference.long_cm, reference.short_cm),
        SheetOrientation::ShortForward => (reference.short_cm, reference.long_cm),
    };
    let px_per_cm = 0.5 * (width_px / horizontal_cm + height_px / vertical_cm);

    if !px_per_cm.is_finite() || px_per_cm <= 0.0 {
        tracing::warn!(px_per_cm, width_px, height_px, "invalid sheet scale");
        return Err(MeasureError::InvalidScale { px_per_cm });
    }

    tracing::debug!(px_per_cm, ?orientation, "scale calibrated");
    Ok(ScaleCalibration {
        px_per_cm,
        orientation,
        width_px,
        height_px,
    })
}
