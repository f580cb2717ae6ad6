// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for wall measurement

use image::{GrayImage, RgbImage};
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 2D point in pixel coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_nalgebra(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    pub fn from_nalgebra(p: &Point2<f64>) -> Self {
        Self { x: p.x, y: p.y }
    }

    pub fn distance_to(&self, other: &Point2D) -> f64 {
        (other.to_nalgebra() - self.to_nalgebra()).norm()
    }
}

/// Axis-aligned pixel rectangle `(x, y, width, height)`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Box covering a whole `width` x `height` image
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Exclusive right edge
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Edge representation used in debug payloads
    pub fn to_bounds(&self) -> WallBounds {
        WallBounds {
            left: self.x,
            top: self.y,
            right: self.right(),
            bottom: self.bottom(),
        }
    }
}

/// Wall box as `{left, top, right, bottom}`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WallBounds {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

/// Four-corner polygon
///
/// After [`crate::document_detector::order_corners`] the corners are
/// top-left, top-right, bottom-right, bottom-left.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Quadrilateral {
    pub corners: [Point2D; 4],
}

impl Quadrilateral {
    pub fn new(corners: [Point2D; 4]) -> Self {
        Self { corners }
    }

    /// Edge lengths `[e01, e12, e23, e30]`
    pub fn edge_lengths(&self) -> [f64; 4] {
        let c = &self.corners;
        [
            c[0].distance_to(&c[1]),
            c[1].distance_to(&c[2]),
            c[2].distance_to(&c[3]),
            c[3].distance_to(&c[0]),
        ]
    }

    /// Opposite-edge averages `(width_px, height_px)`
    pub fn side_estimates(&self) -> (f64, f64) {
        let [e01, e12, e23, e30] = self.edge_lengths();
        (0.5 * (e01 + e23), 0.5 * (e12 + e30))
    }

    /// Enclosed area using the shoelace formula
    pub fn area(&self) -> f64 {
        let mut area = 0.0;
        for i in 0..4 {
            let j = (i + 1) % 4;
            area += self.corners[i].x * self.corners[j].y;
            area -= self.corners[j].x * self.corners[i].y;
        }
        (area / 2.0).abs()
    }

    fn turn(&self, i: usize) -> f64 {
        let a = self.corners[i].to_nalgebra();
        let b = self.corners[(i + 1) % 4].to_nalgebra();
        let c = self.corners[(i + 2) % 4].to_nalgebra();
        let ab: Vector2<f64> = b - a;
        let bc: Vector2<f64> = c - b;
        ab.perp(&bc)
    }

    /// True when every turn has the same orientation (no collinear corners)
    pub fn is_convex(&self) -> bool {
        let turns: Vec<f64> = (0..4).map(|i| self.turn(i)).collect();
        turns.iter().all(|t| *t > 0.0) || turns.iter().all(|t| *t < 0.0)
    }

    /// Point-in-polygon test for a convex quadrilateral (boundary inclusive)
    pub fn contains(&self, p: &Point2D) -> bool {
        let mut sign = 0.0_f64;
        for i in 0..4 {
            let a = self.corners[i].to_nalgebra();
            let b = self.corners[(i + 1) % 4].to_nalgebra();
            let cross = (b - a).perp(&(p.to_nalgebra() - a));
            if cross == 0.0 {
                continue;
            }
            if sign == 0.0 {
                sign = cross.signum();
            } else if cross.signum() != sign {
                return false;
            }
        }
        true
    }

    /// Integer pixel bounds `(min_x, min_y, max_x, max_y)`, clamped at zero
    pub fn pixel_bounds(&self) -> (u32, u32, u32, u32) {
        let min_x = self.corners.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let min_y = self.corners.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_x = self.corners.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let max_y = self.corners.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
        (
            min_x.floor().max(0.0) as u32,
            min_y.floor().max(0.0) as u32,
            max_x.ceil().max(0.0) as u32,
            max_y.ceil().max(0.0) as u32,
        )
    }
}

/// Physical dimensions of the reference sheet
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ReferenceDocument {
    /// Long side in centimeters
    pub long_cm: f64,
    /// Short side in centimeters
    pub short_cm: f64,
}

impl ReferenceDocument {
    /// ISO 216 A4 sheet, 29.7 cm x 21.0 cm
    pub const A4: ReferenceDocument = ReferenceDocument {
        long_cm: 29.7,
        short_cm: 21.0,
    };

    /// Width/height ratio when the long side runs horizontally
    pub fn long_forward_ratio(&self) -> f64 {
        self.long_cm / self.short_cm
    }

    /// Width/height ratio when the short side runs horizontally
    pub fn short_forward_ratio(&self) -> f64 {
        self.short_cm / self.long_cm
    }
}

impl Default for ReferenceDocument {
    fn default() -> Self {
        Self::A4
    }
}

/// Configuration for the measurement pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasureConfig {
    /// Radius of the square closing element (2 => 5x5)
    pub close_radius: u8,
    /// Gaussian blur sigma applied before edge detection
    pub blur_sigma: f32,
    /// Canny edge detection low threshold
    pub canny_low: f32,
    /// Canny edge detection high threshold
    pub canny_high: f32,
    /// Polygon approximation tolerance as a fraction of contour perimeter
    pub poly_epsilon: f64,
    /// Minimum candidate area as a fraction of image area
    pub min_area_ratio: f64,
    /// Maximum candidate area as a fraction of image area
    pub max_area_ratio: f64,
    /// Minimum estimated side length in pixels
    pub min_side_px: f64,
    /// Weight of the brightness term in the candidate score
    pub brightness_weight: f64,
    /// Candidates must score strictly above this to be accepted
    pub min_score: f64,
    /// Known size of the reference sheet
    pub reference: ReferenceDocument,
    /// Rounding step for reported dimensions in centimeters
    pub rounding_step_cm: f64,
    /// Long side of debug thumbnails in pixels (0 keeps full size)
    pub thumbnail_long_side: u32,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            close_radius: 2,
            blur_sigma: 1.0,
            canny_low: 50.0,
            canny_high: 150.0,
            poly_epsilon: 0.02,
            min_area_ratio: 0.002,
            max_area_ratio: 0.4,
            min_side_px: 10.0,
            brightness_weight: 0.5,
            min_score: -1.0,
            reference: ReferenceDocument::A4,
            rounding_step_cm: 0.5,
            thumbnail_long_side: 512,
        }
    }
}

/// Per-request pipeline states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeasureStage {
    AwaitingSegmentation,
    RegionLocated,
    DocumentSearch,
    DocumentFound,
    Calibrated,
    DimensionsResolved,
    DocumentNotFound,
    CalibrationInvalid,
    DimensionsInvalid,
}

impl MeasureStage {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            MeasureStage::DimensionsResolved
                | MeasureStage::DocumentNotFound
                | MeasureStage::CalibrationInvalid
                | MeasureStage::DimensionsInvalid
        )
    }
}

impl fmt::Display for MeasureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MeasureStage::AwaitingSegmentation => "awaiting_segmentation",
            MeasureStage::RegionLocated => "region_located",
            MeasureStage::DocumentSearch => "document_search",
            MeasureStage::DocumentFound => "document_found",
            MeasureStage::Calibrated => "calibrated",
            MeasureStage::DimensionsResolved => "dimensions_resolved",
            MeasureStage::DocumentNotFound => "document_not_found",
            MeasureStage::CalibrationInvalid => "calibration_invalid",
            MeasureStage::DimensionsInvalid => "dimensions_invalid",
        };
        f.write_str(name)
    }
}

/// Final wall size with optional diagnostics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementResult {
    pub wall_width_cm: f64,
    pub wall_height_cm: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub debug: Option<MeasurementDebug>,
}

/// Diagnostic payload attached when debug output is requested
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementDebug {
    /// Reference sheet corners, clockwise from top-left
    pub a4_corners: [Point2D; 4],
    pub wall_bounds: WallBounds,
    pub px_per_cm: f64,
    /// Intermediate masks and overlay, downscaled to thumbnail size
    #[serde(skip)]
    pub images: Option<DebugImages>,
}

/// Diagnostic images
#[derive(Debug, Clone)]
pub struct DebugImages {
    pub wall_mask: GrayImage,
    pub window_mask: GrayImage,
    pub attached_mask: GrayImage,
    pub combined_mask: GrayImage,
    /// Input photo with the sheet outline and wall box drawn on it
    pub overlay: RgbImage,
}
