// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall measurement endpoint.

use crate::error::ApiError;
use crate::services::{run_measurement, MeasureJob, UploadFields};
use crate::types::{MeasureOptions, MeasureResponse};
use crate::AppState;
use axum::{
    extract::{Multipart, State},
    http::HeaderMap,
    Json,
};
use std::time::Instant;

/// POST /api/v1/measure - Measure the wall in a photo.
///
/// Multipart fields: `image` (photo), `labels` (grayscale label PNG),
/// `categories` (JSON id to name table).
pub async fn measure_wall(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<MeasureResponse>, ApiError> {
    let options = MeasureOptions::from_headers(&headers);
    let mut fields = UploadFields::collect(&mut multipart, state.config.max_upload_bytes()).await?;

    let job = MeasureJob {
        image: fields.take("image")?,
        labels: fields.take("labels")?,
        categories: fields.take_text("categories")?,
        debug: options.debug,
        max_pixels: state.config.max_image_pixels,
    };

    let start = Instant::now();
    let response = tokio::task::spawn_blocking(move || run_measurement(job)).await??;

    tracing::info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        wall_width_cm = response.wall_width_cm,
        wall_height_cm = response.wall_height_cm,
        debug = options.debug,
        "Measured wall"
    );

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{body_json, multipart_request, png_bytes, test_app};
    use axum::http::StatusCode;
    use image::{GrayImage, Luma, Rgb, RgbImage};
    use tower::ServiceExt;

    fn sheet_photo() -> RgbImage {
        let mut image = RgbImage::from_pixel(500, 400, Rgb([90, 90, 90]));
        for y in 140..350 {
            for x in 150..447 {
                image.put_pixel(x, y, Rgb([250, 250, 250]));
            }
        }
        image
    }

    #[tokio::test]
    async fn test_measure_with_debug() {
        let photo = png_bytes(sheet_photo());
        let labels = png_bytes(GrayImage::from_pixel(500, 400, Luma([0])));
        let request = multipart_request(
            "/api/v1/measure",
            &[("x-debug", "1")],
            vec![
                ("image", photo),
                ("labels", labels),
                ("categories", br#"{"0": "wall"}"#.to_vec()),
            ],
        );

        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["wallWidthCm"], 50.0);
        assert_eq!(json["wallHeightCm"], 40.0);
        let overlay = json["debug"]["thumbs"]["a4Overlay"].as_str().unwrap();
        assert!(overlay.starts_with("data:image/png;base64,"));
        assert_eq!(json["debug"]["wallBounds"]["right"], 500);
    }

    #[tokio::test]
    async fn test_missing_sheet_is_unprocessable() {
        let photo = png_bytes(RgbImage::from_pixel(200, 150, Rgb([120, 120, 120])));
        let labels = png_bytes(GrayImage::from_pixel(200, 150, Luma([0])));
        let request = multipart_request(
            "/api/v1/measure",
            &[],
            vec![
                ("image", photo),
                ("labels", labels),
                ("categories", br#"{"0": "wall"}"#.to_vec()),
            ],
        );

        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let json = body_json(response).await;
        assert_eq!(json["code"], "DOCUMENT_NOT_FOUND");
        assert!(json["hint"].as_str().unwrap().contains("A4"));
    }

    #[tokio::test]
    async fn test_missing_labels_field() {
        let photo = png_bytes(RgbImage::new(10, 10));
        let request = multipart_request(
            "/api/v1/measure",
            &[],
            vec![("image", photo), ("categories", b"{}".to_vec())],
        );

        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "MISSING_FIELD");
    }

    #[tokio::test]
    async fn test_label_map_size_mismatch() {
        let photo = png_bytes(RgbImage::new(20, 20));
        let labels = png_bytes(GrayImage::new(10, 20));
        let request = multipart_request(
            "/api/v1/measure",
            &[],
            vec![("image", photo), ("labels", labels), ("categories", b"{}".to_vec())],
        );

        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "LABEL_MAP_MISMATCH");
    }
}
