// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Helpers for driving the router in tests.

use crate::config::Config;
use crate::{build_router, AppState};
use axum::{
    body::{to_bytes, Body},
    http::{header, Request},
    response::Response,
    Router,
};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::sync::Arc;

const BOUNDARY: &str = "wallscale-test-boundary";

pub fn test_app() -> Router {
    let config = Config {
        port: 0,
        max_upload_mb: 5,
        max_image_pixels: 4_000_000,
        request_timeout_secs: 30,
        worker_threads: 1,
        cors_origins: vec!["*".into()],
    };
    build_router(AppState {
        config: Arc::new(config),
    })
}

pub fn png_bytes(image: impl Into<DynamicImage>) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    image.into().write_to(&mut buffer, ImageFormat::Png).unwrap();
    buffer.into_inner()
}

pub fn multipart_request(uri: &str, headers: &[(&str, &str)], fields: Vec<(&str, Vec<u8>)>) -> Request<Body> {
    let mut body = Vec::new();
    for (name, bytes) in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                name, name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(&bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::from(body)).unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
