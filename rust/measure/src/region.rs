// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Composite region mask and dominant region location
//!
//! The wall, window and attached-fixture masks are unioned, closed to bridge
//! thin segmentation gaps, and hole-filled so that anything enclosed by the
//! outer boundary (a window frame's interior, a picture on the wall) counts as
//! part of the region. The largest 8-connected component of the result gives
//! the candidate wall bounds.

use crate::categories::MASK_ON;
use crate::image_ops::{invert, morphological_close};
use crate::types::BoundingBox;
use image::{GrayImage, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};
use std::collections::VecDeque;

/// Result of compositing the category masks
#[derive(Debug, Clone)]
pub struct CompositeMask {
    /// Plain union of the input masks
    pub combined: GrayImage,
    /// Union after closing
    pub closed: GrayImage,
    /// Closed union with enclosed holes filled
    pub filled: GrayImage,
}

/// Pixel-wise OR of masks of identical size
///
/// An empty slice yields an empty image.
pub fn union_masks(masks: &[&GrayImage]) -> GrayImage {
    let Some(first) = masks.first() else {
        return GrayImage::new(0, 0);
    };
    let (width, height) = first.dimensions();
    let mut out = GrayImage::new(width, height);

    for mask in masks {
        for (dst, src) in out.pixels_mut().zip(mask.pixels()) {
            if src.0[0] > 0 {
                dst.0[0] = MASK_ON;
            }
        }
    }
    out
}

/// Union, close and hole-fill the region masks
pub fn composite_mask(masks: &[&GrayImage], close_radius: u8) -> CompositeMask {
    let combined = union_masks(masks);
    let closed = morphological_close(&combined, close_radius);
    let filled = fill_holes(&closed).unwrap_or_else(|| {
        tracing::debug!("hole filling skipped, no background on the image border");
        closed.clone()
    });

    CompositeMask {
        combined,
        closed,
        filled,
    }
}

/// Add every background pixel not reachable from the image border
///
/// Background reachability is 4-connected, matching a flood fill on the
/// inverted mask. Returns `None` when no border pixel is background, in which
/// case there is nothing to flood from.
pub fn fill_holes(mask: &GrayImage) -> Option<GrayImage> {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return None;
    }

    let background = invert(mask);
    let is_background = |x: u32, y: u32| background.get_pixel(x, y).0[0] > 0;

    let mut reached = vec![false; (width as usize) * (height as usize)];
    let idx = |x: u32, y: u32| (y as usize) * (width as usize) + x as usize;
    let mut queue = VecDeque::new();

    let border = (0..width)
        .flat_map(|x| [(x, 0), (x, height - 1)])
        .chain((0..height).flat_map(|y| [(0, y), (width - 1, y)]));
    for (x, y) in border {
        if is_background(x, y) && !reached[idx(x, y)] {
            reached[idx(x, y)] = true;
            queue.push_back((x, y));
        }
    }

    if queue.is_empty() {
        return None;
    }

    while let Some((x, y)) = queue.pop_front() {
        let neighbors = [
            (x.wrapping_sub(1), y),
            (x + 1, y),
            (x, y.wrapping_sub(1)),
            (x, y + 1),
        ];
        for (nx, ny) in neighbors {
            if nx >= width || ny >= height {
                continue;
            }
            if !reached[idx(nx, ny)] && is_background(nx, ny) {
                reached[idx(nx, ny)] = true;
                queue.push_back((nx, ny));
            }
        }
    }

    let mut filled = mask.clone();
    for (x, y, pixel) in filled.enumerate_pixels_mut() {
        if !reached[idx(x, y)] {
            pixel.0[0] = MASK_ON;
        }
    }
    Some(filled)
}

/// Per-component statistics gathered from a label image
#[derive(Debug, Clone, Copy)]
struct ComponentStats {
    area: u64,
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
}

/// Bounding box of the largest 8-connected foreground component
///
/// With no foreground at all the whole image is returned. Ties on area go to
/// the component whose first pixel comes first in raster order.
pub fn largest_component_bbox(mask: &GrayImage) -> BoundingBox {
    let (width, height) = mask.dimensions();
    let labels = connected_components(mask, Connectivity::Eight, Luma([0u8]));

    let mut stats: Vec<Option<ComponentStats>> = Vec::new();
    for (x, y, label) in labels.enumerate_pixels() {
        let label = label.0[0] as usize;
        if label == 0 {
            continue;
        }
        if stats.len() <= label {
            stats.resize(label + 1, None);
        }
        stats[label] = Some(match stats[label] {
            Some(s) => ComponentStats {
                area: s.area + 1,
                min_x: s.min_x.min(x),
                min_y: s.min_y.min(y),
                max_x: s.max_x.max(x),
                max_y: s.max_y.max(y),
            },
            None => ComponentStats {
                area: 1,
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
            },
        });
    }

    let best = stats
        .iter()
        .flatten()
        .fold(None::<ComponentStats>, |best, s| match best {
            Some(b) if b.area >= s.area => Some(b),
            _ => Some(*s),
        });

    match best {
        Some(s) => BoundingBox::new(s.min_x, s.min_y, s.max_x - s.min_x + 1, s.max_y - s.min_y + 1),
        None => {
            tracing::debug!(width, height, "no foreground component, using full image bounds");
            BoundingBox::full(width, height)
        }
    }
}

/// Region of interest for the document search: the box clipped to the mask
pub fn roi_mask(filled: &GrayImage, bbox: &BoundingBox) -> GrayImage {
    let (width, height) = filled.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        if bbox.contains(x, y) && filled.get_pixel(x, y).0[0] > 0 {
            Luma([MASK_ON])
        } else {
            Luma([0])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_rect(img: &mut GrayImage, x0: u32, y0: u32, x1: u32, y1: u32) {
        for y in y0..y1 {
            for x in x0..x1 {
                img.put_pixel(x, y, Luma([255]));
            }
        }
    }

    #[test]
    fn test_union_is_pixelwise_or() {
        let mut a = GrayImage::new(3, 1);
        let mut b = GrayImage::new(3, 1);
        a.put_pixel(0, 0, Luma([255]));
        b.put_pixel(2, 0, Luma([255]));
        let union = union_masks(&[&a, &b]);
        assert_eq!(union.as_raw().as_slice(), &[255, 0, 255]);
    }

    #[test]
    fn test_composite_is_idempotent() {
        let mut wall = GrayImage::new(40, 30);
        let mut window = GrayImage::new(40, 30);
        let attached = GrayImage::new(40, 30);
        filled_rect(&mut wall, 5, 5, 35, 25);
        filled_rect(&mut window, 2, 2, 8, 8);

        let first = composite_mask(&[&wall, &window, &attached], 2);
        let second = composite_mask(&[&wall, &window, &attached], 2);

        assert_eq!(first.combined, second.combined);
        assert_eq!(first.filled, second.filled);
    }

    #[test]
    fn test_fill_holes_fills_enclosed_region() {
        // Ring with an unlabeled interior, like a window frame
        let mut mask = GrayImage::new(20, 20);
        filled_rect(&mut mask, 4, 4, 16, 16);
        for y in 7..13 {
            for x in 7..13 {
                mask.put_pixel(x, y, Luma([0]));
            }
        }

        let filled = fill_holes(&mask).unwrap();

        assert_eq!(filled.get_pixel(10, 10).0[0], 255);
        assert_eq!(filled.get_pixel(1, 1).0[0], 0);
        assert_eq!(filled.get_pixel(19, 19).0[0], 0);
    }

    #[test]
    fn test_fill_holes_fallback_on_full_mask() {
        let mask = GrayImage::from_pixel(5, 5, Luma([255]));
        assert!(fill_holes(&mask).is_none());

        let composite = composite_mask(&[&mask], 2);
        assert_eq!(composite.filled, composite.closed);
    }

    #[test]
    fn test_fill_holes_on_empty_mask() {
        let mask = GrayImage::new(5, 5);
        let filled = fill_holes(&mask).unwrap();
        assert!(filled.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn test_largest_component_bbox() {
        let mut mask = GrayImage::new(50, 40);
        filled_rect(&mut mask, 1, 1, 5, 5);
        filled_rect(&mut mask, 10, 8, 40, 30);

        let bbox = largest_component_bbox(&mask);

        assert_eq!(bbox, BoundingBox::new(10, 8, 30, 22));
    }

    #[test]
    fn test_diagonal_pixels_are_connected() {
        let mut mask = GrayImage::new(10, 10);
        mask.put_pixel(2, 2, Luma([255]));
        mask.put_pixel(3, 3, Luma([255]));
        mask.put_pixel(4, 4, Luma([255]));
        mask.put_pixel(8, 1, Luma([255]));

        let bbox = largest_component_bbox(&mask);

        assert_eq!(bbox, BoundingBox::new(2, 2, 3, 3));
    }

    #[test]
    fn test_empty_mask_gives_full_image() {
        let mask = GrayImage::new(64, 48);
        let bbox = largest_component_bbox(&mask);
        assert_eq!(bbox, BoundingBox::full(64, 48));
    }

    #[test]
    fn test_bbox_within_image_bounds() {
        let mut mask = GrayImage::new(32, 24);
        filled_rect(&mut mask, 20, 10, 32, 24);
        filled_rect(&mut mask, 0, 0, 3, 3);

        let bbox = largest_component_bbox(&mask);

        assert!(bbox.right() <= 32);
        assert!(bbox.bottom() <= 24);
        assert_eq!(bbox, BoundingBox::new(20, 10, 12, 14));
    }

    #[test]
    fn test_roi_mask_clips_to_box() {
        let filled = GrayImage::from_pixel(10, 10, Luma([255]));
        let roi = roi_mask(&filled, &BoundingBox::new(2, 2, 3, 3));
        assert_eq!(roi.get_pixel(2, 2).0[0], 255);
        assert_eq!(roi.get_pixel(5, 5).0[0], 0);
    }
}
