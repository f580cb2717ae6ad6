// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Diagnostic overlay and thumbnails

use crate::categories::RegionMasks;
use crate::image_ops::thumbnail;
use crate::types::{BoundingBox, DebugImages, Quadrilateral};
use image::imageops::FilterType;
use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

const SHEET_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const WALL_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

/// Draw the sheet outline and the wall box onto a copy of `image`
pub fn draw_overlay(image: &RgbImage, quad: &Quadrilateral, wall: &BoundingBox) -> RgbImage {
    let mut overlay = image.clone();

    for i in 0..4 {
        let a = quad.corners[i];
        let b = quad.corners[(i + 1) % 4];
        // Two-pixel stroke
        for offset in [0.0f32, 1.0] {
            draw_line_segment_mut(
                &mut overlay,
                (a.x as f32 + offset, a.y as f32),
                (b.x as f32 + offset, b.y as f32),
                SHEET_COLOR,
            );
        }
    }

    if wall.width > 0 && wall.height > 0 {
        let rect = Rect::at(wall.x as i32, wall.y as i32).of_size(wall.width, wall.height);
        draw_hollow_rect_mut(&mut overlay, rect, WALL_COLOR);
        if wall.width > 2 && wall.height > 2 {
            let inner = Rect::at(wall.x as i32 + 1, wall.y as i32 + 1).of_size(wall.width - 2, wall.height - 2);
            draw_hollow_rect_mut(&mut overlay, inner, WALL_COLOR);
        }
    }

    overlay
}

/// Collect the downscaled diagnostic images
pub fn build_debug_images(
    image: &RgbImage,
    masks: &RegionMasks,
    combined: &GrayImage,
    quad: &Quadrilateral,
    wall: &BoundingBox,
    long_side: u32,
) -> DebugImages {
    let overlay = draw_overlay(image, quad, wall);
    let mask_thumb = |mask: &GrayImage| thumbnail(mask, long_side, FilterType::Nearest);

    DebugImages {
        wall_mask: mask_thumb(&masks.wall),
        window_mask: mask_thumb(&masks.window),
        attached_mask: mask_thumb(&masks.attached),
        combined_mask: mask_thumb(combined),
        overlay: thumbnail(&overlay, long_side, FilterType::Triangle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point2D;

    #[test]
    fn test_overlay_marks_sheet_and_wall() {
        let image = RgbImage::new(100, 80);
        let quad = Quadrilateral::new([
            Point2D::new(30.0, 30.0),
            Point2D::new(60.0, 30.0),
            Point2D::new(60.0, 50.0),
            Point2D::new(30.0, 50.0),
        ]);
        let wall = BoundingBox::new(5, 5, 90, 70);

        let overlay = draw_overlay(&image, &quad, &wall);

        assert_eq!(*overlay.get_pixel(45, 30), SHEET_COLOR);
        assert_eq!(*overlay.get_pixel(5, 40), WALL_COLOR);
        assert_eq!(*overlay.get_pixel(20, 20), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_overlay_with_empty_wall_box() {
        let image = RgbImage::new(20, 20);
        let quad = Quadrilateral::new([Point2D::new(2.0, 2.0); 4]);
        let overlay = draw_overlay(&image, &quad, &BoundingBox::new(0, 0, 0, 0));
        assert_eq!(overlay.dimensions(), (20, 20));
    }

    #[test]
    fn test_debug_images_are_thumbnails() {
        let image = RgbImage::new(1024, 512);
        let blank = GrayImage::new(1024, 512);
        let masks = RegionMasks {
            wall: blank.clone(),
            window: blank.clone(),
            attached: blank.clone(),
        };
        let quad = Quadrilateral::new([
            Point2D::new(10.0, 10.0),
            Point2D::new(40.0, 10.0),
            Point2D::new(40.0, 30.0),
            Point2D::new(10.0, 30.0),
        ]);

        let images = build_debug_images(&image, &masks, &blank, &quad, &BoundingBox::full(1024, 512), 256);

        assert_eq!(images.wall_mask.dimensions(), (256, 128));
        assert_eq!(images.overlay.dimensions(), (256, 128));
    }
}
