// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Server configuration loaded from environment variables.

use bipv_lite_geometry::DirectionalLight;

/// NASA POWER daily point endpoint.
pub const DEFAULT_GHI_API_URL: &str = "https://power.larc.nasa.gov/api/temporal/daily/point";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port to listen on.
    pub port: u16,
    /// Directory uploaded models are written to and served from.
    pub upload_dir: String,
    /// Base URL of the GHI point-data API.
    pub ghi_api_url: String,
    /// Maximum request body size in MB.
    pub max_file_size_mb: usize,
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Viewer stream frame rate.
    pub frame_rate_hz: u32,
    /// Position of the directional light the estimator evaluates against.
    pub light: DirectionalLight,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".into())
                .parse()
                .unwrap_or(3000),
            upload_dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".into()),
            ghi_api_url: std::env::var("GHI_API_URL")
                .unwrap_or_else(|_| DEFAULT_GHI_API_URL.into()),
            max_file_size_mb: std::env::var("MAX_FILE_SIZE_MB")
                .unwrap_or_else(|_| "500".into())
                .parse()
                .unwrap_or(500),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "300".into())
                .parse()
                .unwrap_or(300),
            frame_rate_hz: std::env::var("FRAME_RATE_HZ")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&hz| hz > 0)
                .unwrap_or(60),
            light: std::env::var("LIGHT_POSITION")
                .ok()
                .and_then(|v| parse_light(&v))
                .unwrap_or_default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Parse `"x,y,z"` into a light position.
fn parse_light(value: &str) -> Option<DirectionalLight> {
    let coords: Vec<f64> = value
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;
    match coords.as_slice() {
        &[x, y, z] if coords.iter().all(|c| c.is_finite()) => Some(DirectionalLight::new(x, y, z)),
        _ => None,
    }
}
