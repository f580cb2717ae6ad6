// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for wall measurement

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for measurement operations
pub type Result<T> = std::result::Result<T, MeasureError>;

/// Errors that can terminate a measurement request
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeasureError {
    /// No quadrilateral candidate survived the geometric filters
    #[error("A4 reference sheet not detected")]
    DocumentNotFound,

    /// Calibration produced a non-finite or non-positive pixels-per-centimeter value
    #[error("Scale computation failed (invalid pxPerCm: {px_per_cm})")]
    InvalidScale { px_per_cm: f64 },

    /// Rounded wall dimensions were not strictly positive
    #[error("Computed non-positive dimensions ({width_cm} x {height_cm} cm)")]
    InvalidDimensions { width_cm: f64, height_cm: f64 },

    /// Label map does not cover the analyzed image pixel for pixel
    #[error("Label map is {label_width}x{label_height} but image is {image_width}x{image_height}")]
    LabelMapMismatch {
        label_width: u32,
        label_height: u32,
        image_width: u32,
        image_height: u32,
    },

    /// The segmentation collaborator failed
    #[error("Segmentation failed: {0}")]
    Segmentation(String),

    /// Debug artifact encoding failed
    #[error("Encoding error: {0}")]
    Encoding(String),
}

/// Failure category reported to the service layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    DocumentNotFound,
    InvalidScale,
    InvalidDimensions,
    InvalidInput,
    Internal,
}

/// Serializable failure value: `{ kind, message }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl MeasureError {
    /// Map the error onto its failure category
    pub fn kind(&self) -> FailureKind {
        match self {
            MeasureError::DocumentNotFound => FailureKind::DocumentNotFound,
            MeasureError::InvalidScale { .. } => FailureKind::InvalidScale,
            MeasureError::InvalidDimensions { .. } => FailureKind::InvalidDimensions,
            MeasureError::LabelMapMismatch { .. } => FailureKind::InvalidInput,
            MeasureError::Segmentation(_) | MeasureError::Encoding(_) => FailureKind::Internal,
        }
    }

    /// Whether a different photograph could plausibly succeed
    pub fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            MeasureError::DocumentNotFound
                | MeasureError::InvalidScale { .. }
                | MeasureError::InvalidDimensions { .. }
        )
    }

    /// User-facing description suitable for display in a client
    pub fn user_message(&self) -> String {
        match self {
            MeasureError::DocumentNotFound => {
                "A4 not detected; ensure a visible A4 sheet on the wall with moderate skew and contrast."
                    .to_string()
            }
            MeasureError::InvalidScale { .. } => {
                "The reference sheet could not be measured reliably. Please retake the photo.".to_string()
            }
            MeasureError::InvalidDimensions { .. } => {
                "The wall could not be measured from this photo. Please retake it with the whole wall in frame."
                    .to_string()
            }
            _ => "Measurement failed. Please try with a different image.".to_string(),
        }
    }

    /// Build the serializable failure value
    pub fn to_failure(&self) -> Failure {
        Failure {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

impl From<&MeasureError> for Failure {
    fn from(err: &MeasureError) -> Self {
        err.to_failure()
    }
}

impl From<image::ImageError> for MeasureError {
    fn from(err: image::ImageError) -> Self {
        MeasureError::Encoding(err.to_string())
    }
}
