// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request types for the API.

use crate::error::ApiError;
use bipv_lite_geometry::{parse_ghi, try_parse_ghi, NormalMode};
use serde::Deserialize;

/// Query for `GET /api/v1/ghi`.
#[derive(Debug, Clone, Deserialize)]
pub struct GhiQuery {
    pub lat: f64,
    pub lng: f64,
    /// `YYYYMMDD`
    pub date: String,
}

/// Viewer navigation parameters.
///
/// Everything except `model` is optional and kept as raw text, so a bad
/// `ghi` falls back to the default instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewerParams {
    /// Stored model name returned by the upload endpoint.
    pub model: String,
    #[serde(default)]
    pub lat: Option<String>,
    #[serde(default)]
    pub lng: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub ghi: Option<String>,
    /// `mesh-up` (default) or `per-triangle`.
    #[serde(default)]
    pub normals: Option<String>,
}

impl ViewerParams {
    /// GHI to evaluate with (default when absent or unparsable).
    pub fn ghi(&self) -> f64 {
        parse_ghi(self.ghi.as_deref())
    }

    /// Whether [`Self::ghi`] had to fall back to the default.
    pub fn ghi_defaulted(&self) -> bool {
        try_parse_ghi(self.ghi.as_deref()).is_none()
    }

    pub fn lat(&self) -> Option<f64> {
        self.lat.as_deref().and_then(|v| v.trim().parse().ok())
    }

    pub fn lng(&self) -> Option<f64> {
        self.lng.as_deref().and_then(|v| v.trim().parse().ok())
    }

    pub fn normal_mode(&self) -> Result<NormalMode, ApiError> {
        match self.normals.as_deref() {
            None | Some("") => Ok(NormalMode::default()),
            Some(raw) => raw.parse().map_err(ApiError::InvalidParameter),
        }
    }
}
