// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Health check endpoint.

use axum::Json;
use serde::Serialize;

const SERVICE_NAME: &str = "bipv-lite-server";

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub service: &'static str,
}

/// API information response.
#[derive(Debug, Serialize)]
pub struct ApiInfoResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub endpoints: Vec<EndpointInfo>,
}

/// Endpoint information.
#[derive(Debug, Serialize)]
pub struct EndpointInfo {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

/// GET /api/v1/health - Health check endpoint.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        service: SERVICE_NAME,
    })
}

/// GET / - API information endpoint.
pub async fn info() -> Json<ApiInfoResponse> {
    Json(ApiInfoResponse {
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        description: "Building-integrated photovoltaic potential estimator",
        endpoints: vec![
            EndpointInfo {
                method: "GET",
                path: "/api/v1/health",
                description: "Health check endpoint",
            },
            EndpointInfo {
                method: "POST",
                path: "/upload",
                description: "Store a model (multipart field 'file')",
            },
            EndpointInfo {
                method: "GET",
                path: "/uploads/:filename",
                description: "Download a stored model",
            },
            EndpointInfo {
                method: "GET",
                path: "/api/v1/ghi",
                description: "Daily GHI for lat, lng and date (YYYYMMDD)",
            },
            EndpointInfo {
                method: "POST",
                path: "/api/v1/submit",
                description: "GHI lookup then upload; returns the viewer URL",
            },
            EndpointInfo {
                method: "GET",
                path: "/api/v1/viewer",
                description: "Estimate BIPV potential for a stored model",
            },
            EndpointInfo {
                method: "GET",
                path: "/api/v1/viewer/stream",
                description: "Estimate followed by frame events (Server-Sent Events)",
            },
        ],
    })
}
