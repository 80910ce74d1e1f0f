// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response types for the API.

use bipv_lite_geometry::{Mesh, SurfaceEstimate};
use serde::{Deserialize, Serialize};

/// `POST /upload` success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    /// Stored name, used as the viewer's `model` parameter.
    pub filename: String,
}

/// `GET /api/v1/ghi` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GhiResponse {
    pub lat: f64,
    pub lng: f64,
    pub date: String,
    /// kWh/m²/day
    pub ghi: f64,
}

/// `POST /api/v1/submit` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub filename: String,
    pub ghi: f64,
    /// Viewer URL carrying model, lat, lng, date and ghi.
    pub viewer_url: String,
}

/// Estimate for one surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceResult {
    pub mesh_index: usize,
    pub name: String,
    /// m²
    pub area: f64,
    pub incidence: f64,
    /// kWh/day
    pub energy: f64,
    /// Feedback color (RGBA, 0-1).
    pub color: Option<[f32; 4]>,
}

impl SurfaceResult {
    pub fn new(surface: &SurfaceEstimate, mesh: Option<&Mesh>) -> Self {
        Self {
            mesh_index: surface.mesh_index,
            name: surface.name.clone(),
            area: surface.area,
            incidence: surface.incidence,
            energy: surface.energy,
            color: mesh.and_then(|m| m.color),
        }
    }
}

/// Timing for one evaluation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingStats {
    /// Number of meshes in the loaded scene.
    pub total_meshes: usize,
    /// Total number of triangles.
    pub total_triangles: usize,
    /// Time spent reading and parsing the model (ms).
    pub load_time_ms: u64,
    /// Time spent in the estimator (ms).
    pub estimate_time_ms: u64,
    /// Total processing time (ms).
    pub total_time_ms: u64,
}

/// Viewer result: the overlay summary plus the numbers behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateResponse {
    pub model: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub date: Option<String>,
    /// GHI used, kWh/m²/day
    pub ghi: f64,
    /// True when `ghi` was absent or unparsable and the default was used.
    pub ghi_defaulted: bool,
    pub efficiency: f64,
    pub normal_mode: String,
    /// Scene total, kWh/day
    pub total_energy: f64,
    /// m²
    pub total_area: f64,
    /// Meshes skipped for lack of position data.
    pub skipped_meshes: usize,
    /// Two-line overlay text.
    pub summary: String,
    pub surfaces: Vec<SurfaceResult>,
    pub stats: ProcessingStats,
}

/// Server-Sent Event types for the viewer stream.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewerEvent {
    /// Estimate for the loaded model, sent once before any frame.
    Summary {
        estimate: Box<EstimateResponse>,
    },

    /// One frame-loop tick.
    Frame {
        /// Frame number, starting at 0.
        frame: u64,
        /// Milliseconds since the stream started.
        elapsed_ms: u64,
    },

    /// An event could not be encoded.
    Error {
        /// Error message.
        message: String,
    },
}

impl ViewerEvent {
    /// SSE `event:` name.
    pub fn name(&self) -> &'static str {
        match self {
            ViewerEvent::Summary { .. } => "summary",
            ViewerEvent::Frame { .. } => "frame",
            ViewerEvent::Error { .. } => "error",
        }
    }
}
