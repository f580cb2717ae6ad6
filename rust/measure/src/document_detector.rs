// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reference sheet detection
//!
//! Searches the region of interest for a bright convex quadrilateral whose
//! side ratio matches the reference sheet:
//!
//! 1. Grayscale, histogram equalization, ROI masking, Gaussian blur, Canny
//! 2. Outer contour borders, simplified with Douglas-Peucker at a tolerance
//!    proportional to the perimeter
//! 3. Keep 4-vertex convex polygons inside the area window
//! 4. Score = ratio fit + weighted mean brightness; best score wins, first
//!    seen wins ties
//! 5. Order the winner's corners clockwise from top-left

use crate::image_ops::{apply_mask, canny_edges, equalize, gaussian_blur, to_grayscale};
use crate::types::{MeasureConfig, Point2D, Quadrilateral, ReferenceDocument};
use image::{GrayImage, RgbImage};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::geometry::arc_length;

/// Grayscale and edge images the search runs on
#[derive(Debug, Clone)]
pub struct SearchImages {
    /// Equalized grayscale restricted to the region of interest
    pub gray: GrayImage,
    /// Canny edges of the blurred `gray`
    pub edges: GrayImage,
}

/// A quadrilateral that passed the geometric filters, with its score terms
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate {
    /// Corners in contour order
    pub quad: Quadrilateral,
    pub width_px: f64,
    pub height_px: f64,
    /// Negative distance of the side ratio to the nearer sheet ratio
    pub ratio_score: f64,
    /// Mean intensity inside the quadrilateral, in `[0, 1]`
    pub brightness: f64,
    pub score: f64,
}

/// Winning candidate with canonically ordered corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentDetection {
    /// Top-left, top-right, bottom-right, bottom-left
    pub quad: Quadrilateral,
    pub score: f64,
    /// Number of quadrilaterals that reached scoring
    pub candidates: usize,
}

/// Detect the reference sheet inside `roi`
///
/// Returns `None` when no candidate survives; the caller reports this to the
/// user as a missing sheet.
pub fn detect_reference_document(
    image: &RgbImage,
    roi: &GrayImage,
    config: &MeasureConfig,
) -> Option<DocumentDetection> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return None;
    }

    let search = prepare_search_images(image, roi, config);
    let image_area = width as f64 * height as f64;

    let quads = find_quad_candidates(&search.edges, image_area, config);
    let scored: Vec<ScoredCandidate> = quads
        .iter()
        .filter_map(|quad| score_candidate(quad, &search.gray, roi, config))
        .filter(|candidate| candidate.score > config.min_score)
        .collect();

    tracing::debug!(
        quads = quads.len(),
        scored = scored.len(),
        "reference sheet candidates"
    );

    let candidates = scored.len();
    select_best(scored).map(|best| DocumentDetection {
        quad: Quadrilateral::new(order_corners(&best.quad.corners)),
        score: best.score,
        candidates,
    })
}

/// Equalize, mask, blur and edge-detect the photo
pub fn prepare_search_images(image: &RgbImage, roi: &GrayImage, config: &MeasureConfig) -> SearchImages {
    let gray = equalize(&to_grayscale(image));
    let gray = apply_mask(&gray, roi);
    let blurred = gaussian_blur(&gray, config.blur_sigma);
    let edges = canny_edges(&blurred, config.canny_low, config.canny_high);
    SearchImages { gray, edges }
}

/// Convex 4-vertex polygons from the edge image whose area is in the window
pub fn find_quad_candidates(edges: &GrayImage, image_area: f64, config: &MeasureConfig) -> Vec<Quadrilateral> {
    let min_area = config.min_area_ratio * image_area;
    let max_area = config.max_area_ratio * image_area;

    let contours: Vec<Contour<i32>> = find_contours(edges);

    contours
        .iter()
        .filter(|contour| contour.border_type == BorderType::Outer && contour.points.len() >= 4)
        .filter_map(|contour| {
            let perimeter = arc_length(&contour.points, true);
            let points: Vec<Point2D> = contour
                .points
                .iter()
                .map(|p| Point2D::new(p.x as f64, p.y as f64))
                .collect();
            let polygon = approximate_closed_polygon(&points, config.poly_epsilon * perimeter);
            if polygon.len() != 4 {
                return None;
            }
            let quad = Quadrilateral::new([polygon[0], polygon[1], polygon[2], polygon[3]]);
            if !quad.is_convex() {
                return None;
            }
            let area = quad.area();
            (area >= min_area && area <= max_area).then_some(quad)
        })
        .collect()
}

/// Negative deviation of `ratio` from the nearer of the two sheet ratios
pub fn ratio_score(ratio: f64, reference: &ReferenceDocument) -> f64 {
    let d_long = (ratio - reference.long_forward_ratio()).abs();
    let d_short = (ratio - reference.short_forward_ratio()).abs();
    -d_long.min(d_short)
}

/// Mean of `gray` over pixels inside `quad` and `roi`, normalized to `[0, 1]`
pub fn mean_brightness(quad: &Quadrilateral, gray: &GrayImage, roi: &GrayImage) -> f64 {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return 0.0;
    }
    let (min_x, min_y, max_x, max_y) = quad.pixel_bounds();

    let mut sum = 0u64;
    let mut count = 0u64;
    for y in min_y..=max_y.min(height - 1) {
        for x in min_x..=max_x.min(width - 1) {
            if roi.get_pixel(x, y).0[0] == 0 {
                continue;
            }
            if quad.contains(&Point2D::new(x as f64, y as f64)) {
                sum += gray.get_pixel(x, y).0[0] as u64;
                count += 1;
            }
        }
    }

    if count == 0 {
        0.0
    } else {
        (sum as f64 / count as f64) / 255.0
    }
}

/// Score one quadrilateral; `None` if either side estimate is too short
pub fn score_candidate(
    quad: &Quadrilateral,
    gray: &GrayImage,
    roi: &GrayImage,
    config: &MeasureConfig,
) -> Option<ScoredCandidate> {
    let (width_px, height_px) = quad.side_estimates();
    if width_px < config.min_side_px || height_px < config.min_side_px {
        return None;
    }

    let ratio = width_px / height_px.max(1e-6);
    let ratio_score = ratio_score(ratio, &config.reference);
    let brightness = mean_brightness(quad, gray, roi);

    Some(ScoredCandidate {
        quad: *quad,
        width_px,
        height_px,
        ratio_score,
        brightness,
        score: ratio_score + config.brightness_weight * brightness,
    })
}

/// Highest score wins; on equal scores the earlier candidate is kept
pub fn select_best<I>(candidates: I) -> Option<ScoredCandidate>
where
    I: IntoIterator<Item = ScoredCandidate>,
{
    candidates
        .into_iter()
        .fold(None, |best: Option<ScoredCandidate>, candidate| match best {
            Some(current) if candidate.score > current.score => Some(candidate),
            Some(current) => Some(current),
            None => Some(candidate),
        })
}

fn extreme_index(points: &[Point2D; 4], key: impl Fn(&Point2D) -> f64, largest: bool) -> usize {
    let mut best = 0;
    for i in 1..4 {
        let better = if largest {
            key(&points[i]) > key(&points[best])
        } else {
            key(&points[i]) < key(&points[best])
        };
        if better {
            best = i;
        }
    }
    best
}

/// Order corners as top-left, top-right, bottom-right, bottom-left
///
/// Top-left has the smallest `x + y`, bottom-right the largest; top-right has
/// the smallest `y - x`, bottom-left the largest. Input order is irrelevant.
pub fn order_corners(points: &[Point2D; 4]) -> [Point2D; 4] {
    let sum = |p: &Point2D| p.x + p.y;
    let diff = |p: &Point2D| p.y - p.x;

    let tl = extreme_index(points, sum, false);
    let br = extreme_index(points, sum, true);
    let tr = extreme_index(points, diff, false);
    let bl = extreme_index(points, diff, true);

    [points[tl], points[tr], points[br], points[bl]]
}

/// Simplify a closed contour with Douglas-Peucker
///
/// The contour is split at two mutually distant points so that both split
/// points are genuine vertices, then each half is simplified as an open
/// polyline. The result does not repeat its first point.
pub fn approximate_closed_polygon(points: &[Point2D], epsilon: f64) -> Vec<Point2D> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let farthest_from = |origin: usize| -> usize {
        let mut best = origin;
        let mut best_dist = -1.0;
        for (i, p) in points.iter().enumerate() {
            let d = points[origin].distance_to(p);
            if d > best_dist {
                best_dist = d;
                best = i;
            }
        }
        best
    };

    let b = farthest_from(0);
    let a = farthest_from(b);
    if a == b {
        return vec![points[a]];
    }

    let chain = |from: usize, to: usize| -> Vec<Point2D> {
        let len = (to + n - from) % n;
        (0..=len).map(|k| points[(from + k) % n]).collect()
    };

    let mut first = douglas_peucker(&chain(a, b), epsilon);
    let mut second = douglas_peucker(&chain(b, a), epsilon);
    first.pop();
    second.pop();
    first.extend(second);
    first
}

/// Douglas-Peucker line simplification algorithm (endpoints kept)
fn douglas_peucker(points: &[Point2D], epsilon: f64) -> Vec<Point2D> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let first = &points[0];
    let last = &points[points.len() - 1];

    let mut max_dist = 0.0;
    let mut max_idx = 0;

    for (i, point) in points.iter().enumerate().skip(1).take(points.len() - 2) {
        let dist = perpendicular_distance(point, first, last);
        if dist > max_dist {
            max_dist = dist;
            max_idx = i;
        }
    }

    if max_dist > epsilon {
        let left = douglas_peucker(&points[..=max_idx], epsilon);
        let right = douglas_peucker(&points[max_idx..], epsilon);

        let mut result = left;
        result.pop();
        result.extend(right);
        result
    } else {
        vec![*first, *last]
    }
}

/// Distance from `point` to the line through `line_start` and `line_end`
fn perpendicular_distance(point: &Point2D, line_start: &Point2D, line_end: &Point2D) -> f64 {
    let dx = line_end.x - line_start.x;
    let dy = line_end.y - line_start.y;

    let len = (dx * dx + dy * dy).sqrt();
    if len < 1e-10 {
        return point.distance_to(line_start);
    }

    ((dy * point.x - dx * point.y + line_end.x * line_start.y - line_end.y * line_start.x) / len).abs()
}
