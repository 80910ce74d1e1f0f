// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model upload endpoint and multipart helpers.

use crate::error::ApiError;
use crate::types::UploadResponse;
use crate::AppState;
use axum::{
    extract::{Multipart, State},
    Json,
};
use std::collections::HashMap;

/// Name of the multipart field carrying the model.
pub const FILE_FIELD: &str = "file";

/// A file part pulled out of a multipart body.
#[derive(Debug)]
pub struct UploadedFile {
    /// Client-side file name (may be empty).
    pub file_name: String,
    pub data: Vec<u8>,
}

/// All parts of a multipart form: text fields by name plus the file, if any.
#[derive(Debug, Default)]
pub struct FormData {
    pub fields: HashMap<String, String>,
    pub file: Option<UploadedFile>,
}

impl FormData {
    /// Required text field.
    pub fn text(&self, name: &'static str) -> Result<&str, ApiError> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .ok_or(ApiError::MissingField(name))
    }

    /// Required numeric field.
    pub fn number(&self, name: &'static str) -> Result<f64, ApiError> {
        let raw = self.text(name)?;
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ApiError::InvalidParameter(format!("{} must be a number, got '{}'", name, raw)))
    }
}

/// Read every part of a multipart request.
///
/// A file part with no name and no content is what browsers send when no
/// file was chosen; it counts as no file.
pub async fn read_form(multipart: &mut Multipart) -> Result<FormData, ApiError> {
    let mut form = FormData::default();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        tracing::debug!(field_name = %field_name, "Processing multipart field");

        if field_name == FILE_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await?;
            if file_name.is_empty() && bytes.is_empty() {
                continue;
            }
            tracing::debug!(size = bytes.len(), file_name = %file_name, "Extracted file from multipart");
            form.file = Some(UploadedFile {
                file_name,
                data: bytes.to_vec(),
            });
        } else {
            let value = field.text().await?;
            form.fields.insert(field_name, value);
        }
    }

    Ok(form)
}

/// Extract just the file part from a multipart request.
pub async fn extract_file(multipart: &mut Multipart) -> Result<UploadedFile, ApiError> {
    read_form(multipart).await?.file.ok_or_else(|| {
        tracing::warn!("No 'file' field found in multipart request");
        ApiError::MissingFile
    })
}

/// POST /upload - Store a model and return its generated name.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let file = extract_file(&mut multipart).await?;
    let filename = state.store.save(&file.file_name, &file.data).await?;

    Ok(Json(UploadResponse {
        success: true,
        filename,
    }))
}
