// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mask export endpoints.

use crate::error::ApiError;
use crate::services::{run_mask_export, run_surface_masks, UploadFields};
use crate::types::{MaskOptions, MasksResponse};
use crate::AppState;
use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};

/// POST /api/v1/mask - One RGBA cut-out mask as PNG.
///
/// Multipart fields: `labels`, `categories`. `X-Mask` picks wall, window,
/// attached or combined; `X-Labels` overrides the selected category set.
pub async fn export_mask(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let options = MaskOptions::from_headers(&headers);
    let mut fields = UploadFields::collect(&mut multipart, state.config.max_upload_bytes()).await?;
    let labels = fields.take("labels")?;
    let categories = fields.take_text("categories")?;
    let max_pixels = state.config.max_image_pixels;

    tracing::debug!(selection = ?options.selection, labels = ?options.labels, "Exporting mask");

    let png = tokio::task::spawn_blocking(move || {
        run_mask_export(
            &labels,
            &categories,
            options.selection,
            options.labels.as_deref(),
            max_pixels,
        )
    })
    .await??;

    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

/// POST /api/v1/masks - Wall, window, floor and ceiling masks in one response.
pub async fn export_surface_masks(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<MasksResponse>, ApiError> {
    let mut fields = UploadFields::collect(&mut multipart, state.config.max_upload_bytes()).await?;
    let labels = fields.take("labels")?;
    let categories = fields.take_text("categories")?;
    let max_pixels = state.config.max_image_pixels;

    let response =
        tokio::task::spawn_blocking(move || run_surface_masks(&labels, &categories, max_pixels)).await??;

    tracing::info!(width = response.width, height = response.height, "Exported surface masks");
    Ok(Json(response))
}
