// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Image processing operations shared by the measurement stages

use crate::error::Result;
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageBuffer, ImageFormat, Luma, Pixel, Rgba, RgbImage, RgbaImage};
use imageproc::distance_transform::Norm;
use imageproc::map::map_pixels;
use imageproc::stats::cumulative_histogram;
use std::io::Cursor;

/// Convert an RGB photo to 8-bit luminance
pub fn to_grayscale(image: &RgbImage) -> GrayImage {
    image::imageops::grayscale(image)
}

/// Histogram equalization mapping the darkest occupied level to 0
///
/// Each level `v` becomes `(cdf[v] - cdf_min) * 255 / (total - cdf_min)`, so
/// a dominant background level is pushed to black instead of near white.
/// Images with a single occupied level are returned unchanged.
pub fn equalize(image: &GrayImage) -> GrayImage {
    let cdf = cumulative_histogram(image).channels[0];
    let total = cdf[255];
    let cdf_min = cdf.iter().copied().find(|&count| count > 0).unwrap_or(0);
    if total == cdf_min {
        return image.clone();
    }

    let scale = 255.0 / (total - cdf_min) as f64;
    let lut: [u8; 256] = std::array::from_fn(|v| {
        let level = cdf[v].saturating_sub(cdf_min) as f64 * scale;
        level.round().min(255.0) as u8
    });
    map_pixels(image, |_, _, Luma([v])| Luma([lut[v as usize]]))
}

/// Apply Gaussian blur for noise reduction; a non-positive sigma is a no-op
pub fn gaussian_blur(image: &GrayImage, sigma: f32) -> GrayImage {
    if sigma <= 0.0 {
        return image.clone();
    }
    imageproc::filter::gaussian_blur_f32(image, sigma)
}

/// Apply Canny edge detection
pub fn canny_edges(image: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    imageproc::edges::canny(image, low_threshold, high_threshold.max(low_threshold))
}

/// Morphological closing with a `(2r+1) x (2r+1)` square element
pub fn morphological_close(image: &GrayImage, radius: u8) -> GrayImage {
    if radius == 0 {
        return image.clone();
    }
    imageproc::morphology::close(image, Norm::LInf, radius)
}

/// Invert a binary image
pub fn invert(image: &GrayImage) -> GrayImage {
    let mut result = image.clone();
    for pixel in result.pixels_mut() {
        pixel.0[0] = 255 - pixel.0[0];
    }
    result
}

/// Keep `image` where `mask` is set, zero elsewhere
pub fn apply_mask(image: &GrayImage, mask: &GrayImage) -> GrayImage {
    let mut result = image.clone();
    for (pixel, m) in result.pixels_mut().zip(mask.pixels()) {
        if m.0[0] == 0 {
            pixel.0[0] = 0;
        }
    }
    result
}

/// White RGBA overlay, transparent where the mask is set
pub fn rgba_from_binary_mask(mask: &GrayImage) -> RgbaImage {
    let (width, height) = mask.dimensions();
    RgbaImage::from_fn(width, height, |x, y| {
        let Luma([v]) = *mask.get_pixel(x, y);
        Rgba([255, 255, 255, if v > 0 { 0 } else { 255 }])
    })
}

/// Encode any 8-bit image as PNG bytes
pub fn encode_png(image: impl Into<DynamicImage>) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image.into().write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

/// Downscale so the long side is at most `long_side` (0 keeps full size)
pub fn thumbnail<P>(
    image: &ImageBuffer<P, Vec<P::Subpixel>>,
    long_side: u32,
    filter: FilterType,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel + 'static,
    P::Subpixel: 'static,
{
    let (width, height) = image.dimensions();
    let long = width.max(height);
    if long_side == 0 || long <= long_side {
        return image.clone();
    }

    let (new_width, new_height) = if width >= height {
        let h = (height as f64 * long_side as f64 / width as f64).round() as u32;
        (long_side, h.max(1))
    } else {
        let w = (width as f64 * long_side as f64 / height as f64).round() as u32;
        (w.max(1), long_side)
    };

    image::imageops::resize(image, new_width, new_height, filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invert() {
        let mut img = GrayImage::new(2, 2);
        img.put_pixel(0, 0, Luma([0]));
        img.put_pixel(1, 1, Luma([255]));

        let inverted = invert(&img);

        assert_eq!(inverted.get_pixel(0, 0).0[0], 255);
        assert_eq!(inverted.get_pixel(1, 1).0[0], 0);
    }

    #[test]
    fn test_equalize_sends_dominant_background_to_black() {
        // 90% wall gray, 10% paper white
        let mut img = GrayImage::from_pixel(10, 10, Luma([90]));
        for x in 0..10 {
            img.put_pixel(x, 0, Luma([250]));
        }

        let equalized = equalize(&img);

        assert_eq!(equalized.get_pixel(5, 5).0[0], 0);
        assert_eq!(equalized.get_pixel(5, 0).0[0], 255);
    }

    #[test]
    fn test_equalize_spreads_levels() {
        let img = GrayImage::from_raw(4, 1, vec![10, 20, 30, 30]).unwrap();
        let equalized = equalize(&img);
        assert_eq!(equalized.as_raw().as_slice(), &[0, 85, 255, 255]);
    }

    #[test]
    fn test_equalize_keeps_uniform_and_empty_images() {
        let uniform = GrayImage::from_pixel(3, 3, Luma([140]));
        assert_eq!(equalize(&uniform), uniform);

        let empty = GrayImage::new(0, 0);
        assert_eq!(equalize(&empty).dimensions(), (0, 0));
    }

    #[test]
    fn test_close_bridges_thin_gap() {
        let mut img = GrayImage::new(30, 20);
        for y in 6..14 {
            for x in 6..24 {
                if x != 15 {
                    img.put_pixel(x, y, Luma([255]));
                }
            }
        }

        let closed = morphological_close(&img, 2);

        assert_eq!(closed.get_pixel(15, 10).0[0], 255);
        assert_eq!(closed.get_pixel(0, 0).0[0], 0);
    }

    #[test]
    fn test_apply_mask() {
        let img = GrayImage::from_pixel(2, 1, Luma([200]));
        let mut mask = GrayImage::new(2, 1);
        mask.put_pixel(1, 0, Luma([255]));

        let masked = apply_mask(&img, &mask);

        assert_eq!(masked.as_raw().as_slice(), &[0, 200]);
    }

    #[test]
    fn test_rgba_overlay_alpha() {
        let mut mask = GrayImage::new(2, 1);
        mask.put_pixel(0, 0, Luma([255]));

        let rgba = rgba_from_binary_mask(&mask);

        assert_eq!(rgba.get_pixel(0, 0).0, [255, 255, 255, 0]);
        assert_eq!(rgba.get_pixel(1, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_thumbnail_keeps_aspect() {
        let img = GrayImage::new(1000, 500);
        let thumb = thumbnail(&img, 200, FilterType::Nearest);
        assert_eq!(thumb.dimensions(), (200, 100));

        let small = thumbnail(&img, 2000, FilterType::Nearest);
        assert_eq!(small.dimensions(), (1000, 500));
    }

    #[test]
    fn test_encode_png_signature() {
        let img = GrayImage::new(4, 4);
        let bytes = encode_png(img).unwrap();
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
