// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared fixtures: a stub GHI API, test config, multipart and GLB builders.

#![allow(dead_code)]

use axum::{
    body::Body,
    extract::Query,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use bipv_lite_geometry::DirectionalLight;
use bipv_lite_server::{app, config::Config, AppState};
use std::collections::HashMap;
use std::path::Path;
use tempfile::TempDir;

/// Day the stub API has data for.
pub const KNOWN_DATE: &str = "20240601";
/// GHI the stub API reports for [`KNOWN_DATE`].
pub const KNOWN_GHI: f64 = 6.12;
/// Day the stub API reports with the fill value.
pub const MISSING_DATE: &str = "20000101";

const BOUNDARY: &str = "bipv-lite-test-boundary";

/// Start a stub POWER point API on an ephemeral port and return its URL.
pub async fn spawn_ghi_api() -> String {
    async fn point(Query(query): Query<HashMap<String, String>>) -> Response {
        let date = query.get("start").cloned().unwrap_or_default();
        let value = match date.as_str() {
            KNOWN_DATE => KNOWN_GHI,
            MISSING_DATE => -999.0,
            _ => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        };
        Json(serde_json::json!({
            "type": "Feature",
            "properties": {
                "parameter": { "ALLSKY_SFC_SW_DWN": { date: value } }
            }
        }))
        .into_response()
    }

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, Router::new().route("/point", get(point)))
            .await
            .unwrap();
    });
    format!("http://{}/point", addr)
}

/// Config pointing at `upload_dir` and the given GHI API, with the light
/// straight overhead.
pub fn test_config(upload_dir: &Path, ghi_api_url: &str) -> Config {
    Config {
        port: 0,
        upload_dir: upload_dir.to_string_lossy().into_owned(),
        ghi_api_url: ghi_api_url.to_string(),
        max_file_size_mb: 16,
        request_timeout_secs: 30,
        frame_rate_hz: 60,
        light: DirectionalLight::new(0.0, 10.0, 0.0),
    }
}

/// Router over a fresh upload directory and a running stub GHI API.
///
/// The directory is removed when the returned guard is dropped.
pub async fn test_app() -> (Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let ghi_url = spawn_ghi_api().await;
    let state = AppState::new(test_config(dir.path(), &ghi_url)).await;
    (app(state), dir)
}

/// One part of a multipart body.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        field: &'a str,
        filename: &'a str,
        data: &'a [u8],
    },
}

/// Encode parts as `multipart/form-data`.
pub fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                field,
                filename,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        field, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(b"Content-Type: model/gltf-binary\r\n\r\n");
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// `POST` a multipart form to `uri`.
pub fn multipart_request(uri: &str, parts: &[Part]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Files currently in the upload directory.
pub fn stored_files(dir: &Path) -> Vec<String> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// GLB holding a single 2x2 roof panel facing +Y (4 m²).
pub fn roof_glb() -> Vec<u8> {
    let positions: [f32; 12] = [0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 2.0, 0.0, 2.0, 0.0, 0.0, 2.0];
    let indices: [u16; 6] = [0, 2, 1, 0, 3, 2];
    let mut bin = Vec::with_capacity(60);
    for p in positions {
        bin.extend_from_slice(&p.to_le_bytes());
    }
    for i in indices {
        bin.extend_from_slice(&i.to_le_bytes());
    }

    let json = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "name": "roof", "mesh": 0, "translation": [0.0, 12.0, 0.0] }],
        "meshes": [{ "name": "roof", "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1 }] }],
        "buffers": [{ "byteLength": 60 }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 48, "target": 34962 },
            { "buffer": 0, "byteOffset": 48, "byteLength": 12, "target": 34963 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 4, "type": "VEC3",
              "min": [0.0, 0.0, 0.0], "max": [2.0, 0.0, 2.0] },
            { "bufferView": 1, "componentType": 5123, "count": 6, "type": "SCALAR" }
        ]
    }"#;
    glb(json, &bin)
}

/// Pack a JSON document and binary chunk into a GLB container.
pub fn glb(json: &str, bin: &[u8]) -> Vec<u8> {
    let mut json = json.as_bytes().to_vec();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    let mut bin = bin.to_vec();
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let total = 12 + 8 + json.len() + 8 + bin.len();
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(b"JSON");
    out.extend_from_slice(&json);
    out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    out.extend_from_slice(b"BIN\0");
    out.extend_from_slice(&bin);
    out
}
