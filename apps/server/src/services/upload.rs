// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Multipart upload collection.

use crate::error::ApiError;
use axum::extract::Multipart;
use std::collections::HashMap;

/// Named multipart fields of one request.
#[derive(Debug, Default)]
pub struct UploadFields {
    fields: HashMap<String, Vec<u8>>,
}

impl UploadFields {
    /// Read every field, rejecting any larger than `max_bytes`.
    pub async fn collect(multipart: &mut Multipart, max_bytes: usize) -> Result<Self, ApiError> {
        let mut fields = HashMap::new();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            let bytes = field.bytes().await?;
            tracing::debug!(field_name = %name, size = bytes.len(), "Received multipart field");

            if bytes.len() > max_bytes {
                return Err(ApiError::FileTooLarge {
                    max_mb: max_bytes / (1024 * 1024),
                });
            }
            fields.insert(name, bytes.to_vec());
        }

        Ok(Self { fields })
    }

    /// Remove a required, non-empty field.
    pub fn take(&mut self, name: &'static str) -> Result<Vec<u8>, ApiError> {
        match self.fields.remove(name) {
            None => {
                tracing::warn!(field = name, "Missing multipart field");
                Err(ApiError::MissingField(name))
            }
            Some(bytes) if bytes.is_empty() => Err(ApiError::EmptyField(name)),
            Some(bytes) => Ok(bytes),
        }
    }

    /// Remove a required field holding UTF-8 text.
    pub fn take_text(&mut self, name: &'static str) -> Result<String, ApiError> {
        let bytes = self.take(name)?;
        String::from_utf8(bytes).map_err(|e| ApiError::InvalidCategories(e.to_string()))
    }
}

impl From<HashMap<String, Vec<u8>>> for UploadFields {
    fn from(fields: HashMap<String, Vec<u8>>) -> Self {
        Self { fields }
    }
}
