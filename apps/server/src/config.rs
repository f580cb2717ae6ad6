// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Server configuration loaded from environment variables.

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port to listen on.
    pub port: u16,
    /// Maximum size of a single uploaded file in MB.
    pub max_upload_mb: usize,
    /// Maximum decoded image size in pixels.
    pub max_image_pixels: u64,
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Number of worker threads for parallel mask extraction.
    pub worker_threads: usize,
    /// Allowed CORS origins (comma-separated, or "*" for all).
    pub cors_origins: Vec<String>,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            port: env_or("PORT", 8080),
            max_upload_mb: env_or("MAX_UPLOAD_MB", 50),
            max_image_pixels: env_or("MAX_IMAGE_PIXELS", 50_000_000),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 60),
            worker_threads: env_or("WORKER_THREADS", num_cpus::get()).max(1),
            cors_origins: parse_origins(
                &std::env::var("CORS_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".into()),
            ),
        }
    }

    /// Per-file upload limit in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }

    /// Whether any origin may call the API.
    pub fn cors_allows_any(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_trims_and_drops_blanks() {
        assert_eq!(
            parse_origins(" http://a.test , ,http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[test]
    fn test_upload_limit_in_bytes() {
        let config = Config {
            port: 8080,
            max_upload_mb: 50,
            max_image_pixels: 50_000_000,
            request_timeout_secs: 60,
            worker_threads: 1,
            cors_origins: vec!["*".into()],
        };
        assert_eq!(config.max_upload_bytes(), 52_428_800);
        assert!(config.cors_allows_any());
    }
}
