// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoding of uploaded photos, label maps and category tables.

use crate::error::ApiError;
use image::{DynamicImage, ImageReader, RgbImage};
use std::io::Cursor;
use wallscale_measure::{label_map_from_luma16, label_map_from_luma8, CategoryTable, LabelMap};

fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, ApiError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ApiError::InvalidImage(e.to_string()))
}

/// Decode any supported image after checking its header dimensions.
pub fn decode_image(bytes: &[u8], max_pixels: u64) -> Result<DynamicImage, ApiError> {
    let (width, height) = reader(bytes)?
        .into_dimensions()
        .map_err(|e| ApiError::InvalidImage(e.to_string()))?;
    let pixels = width as u64 * height as u64;
    if pixels > max_pixels {
        return Err(ApiError::ImageTooLarge { pixels, max_pixels });
    }

    reader(bytes)?
        .decode()
        .map_err(|e| ApiError::InvalidImage(e.to_string()))
}

/// Decode the photo to 8-bit RGB.
pub fn decode_photo(bytes: &[u8], max_pixels: u64) -> Result<RgbImage, ApiError> {
    Ok(decode_image(bytes, max_pixels)?.to_rgb8())
}

/// Decode an 8- or 16-bit single-channel label image without rescaling ids.
pub fn decode_label_map(bytes: &[u8], max_pixels: u64) -> Result<LabelMap, ApiError> {
    match decode_image(bytes, max_pixels)? {
        DynamicImage::ImageLuma8(gray) => Ok(label_map_from_luma8(&gray)),
        DynamicImage::ImageLuma16(gray) => Ok(label_map_from_luma16(&gray)),
        other => Err(ApiError::InvalidLabelMap(format!(
            "expected 8 or 16-bit grayscale, got {:?}",
            other.color()
        ))),
    }
}

/// Parse a `{"<id>": "<name>"}` category table.
pub fn parse_categories(text: &str) -> Result<CategoryTable, ApiError> {
    CategoryTable::from_json(text).map_err(|e| ApiError::InvalidCategories(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageBuffer, ImageFormat, Luma, Rgb};

    fn png(image: impl Into<DynamicImage>) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        image.into().write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_label_map_keeps_16_bit_ids() {
        let mut labels: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::new(3, 1);
        labels.put_pixel(2, 0, Luma([1200]));
        let map = decode_label_map(&png(DynamicImage::ImageLuma16(labels)), 100).unwrap();
        assert_eq!(map.get_pixel(2, 0).0[0], 1200);
    }

    #[test]
    fn test_color_label_map_is_rejected() {
        let rgb = RgbImage::from_pixel(2, 2, Rgb([1, 2, 3]));
        assert!(matches!(
            decode_label_map(&png(rgb), 100),
            Err(ApiError::InvalidLabelMap(_))
        ));
    }

    #[test]
    fn test_pixel_limit() {
        let gray = GrayImage::new(20, 10);
        let err = decode_photo(&png(gray), 199).unwrap_err();
        assert!(matches!(err, ApiError::ImageTooLarge { pixels: 200, .. }));
    }

    #[test]
    fn test_garbage_is_invalid_image() {
        assert!(matches!(
            decode_photo(b"not an image", 1000),
            Err(ApiError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_categories() {
        let table = parse_categories(r#"{"0": "Wall", "8": "windowpane"}"#).unwrap();
        assert_eq!(table.name(0), Some("wall"));
        assert!(matches!(parse_categories("[1, 2]"), Err(ApiError::InvalidCategories(_))));
    }
}
