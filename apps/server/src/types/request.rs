// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request options carried in headers.

use axum::http::HeaderMap;
use wallscale_measure::MaskSelection;

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim)
}

/// Options for a measurement request.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeasureOptions {
    /// Attach the debug payload (`X-Debug: 1`).
    pub debug: bool,
}

impl MeasureOptions {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let debug = header_str(headers, "x-debug")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);
        Self { debug }
    }
}

/// Options for a single-mask export.
#[derive(Debug, Clone, Default)]
pub struct MaskOptions {
    /// Which mask to return (`X-Mask`, default combined).
    pub selection: MaskSelection,
    /// Comma-separated category names overriding the selected set (`X-Labels`).
    pub labels: Option<String>,
}

impl MaskOptions {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let selection = header_str(headers, "x-mask")
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();
        let labels = header_str(headers, "x-labels")
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        Self { selection, labels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_debug_flag() {
        let mut headers = HeaderMap::new();
        assert!(!MeasureOptions::from_headers(&headers).debug);
        headers.insert("x-debug", HeaderValue::from_static("1"));
        assert!(MeasureOptions::from_headers(&headers).debug);
        headers.insert("x-debug", HeaderValue::from_static("False"));
        assert!(!MeasureOptions::from_headers(&headers).debug);
    }

    #[test]
    fn test_mask_options() {
        let mut headers = HeaderMap::new();
        headers.insert("x-mask", HeaderValue::from_static("Window"));
        headers.insert("x-labels", HeaderValue::from_static("window, door"));
        let options = MaskOptions::from_headers(&headers);
        assert_eq!(options.selection, MaskSelection::Window);
        assert_eq!(options.labels.as_deref(), Some("window, door"));

        let options = MaskOptions::from_headers(&HeaderMap::new());
        assert_eq!(options.selection, MaskSelection::Combined);
        assert!(options.labels.is_none());
    }
}
