// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Load a stored model and run the BIPV estimator over it.

use crate::error::ApiError;
use crate::services::storage::UploadStore;
use crate::types::{EstimateResponse, ProcessingStats, SurfaceResult, ViewerParams};
use bipv_lite_geometry::{
    estimate_scene, load_scene, DirectionalLight, EstimationContext, Scene, SceneEstimate,
};
use std::time::Instant;

/// Output of one load + estimate pass.
#[derive(Debug)]
pub struct Evaluation {
    pub scene: Scene,
    pub estimate: SceneEstimate,
    pub load_time_ms: u64,
    pub estimate_time_ms: u64,
}

/// Parse a model and estimate it. CPU-bound; call from a blocking task.
pub fn evaluate(bytes: &[u8], ctx: &EstimationContext) -> Result<Evaluation, bipv_lite_geometry::Error> {
    let load_start = Instant::now();
    let mut scene = load_scene(bytes)?;
    let load_time_ms = load_start.elapsed().as_millis() as u64;

    let estimate_start = Instant::now();
    let estimate = estimate_scene(&mut scene, ctx);
    let estimate_time_ms = estimate_start.elapsed().as_millis() as u64;

    Ok(Evaluation {
        scene,
        estimate,
        load_time_ms,
        estimate_time_ms,
    })
}

/// Evaluate the stored model named in the viewer parameters.
pub async fn estimate_model(
    store: &UploadStore,
    light: DirectionalLight,
    params: &ViewerParams,
) -> Result<EstimateResponse, ApiError> {
    let total_start = Instant::now();

    let ctx = EstimationContext::new(params.ghi())
        .with_light(light)
        .with_normal_mode(params.normal_mode()?);
    let data = store.read(&params.model).await?;
    let size = data.len();

    let evaluation = tokio::task::spawn_blocking(move || evaluate(&data, &ctx))
        .await?
        .map_err(|e| {
            tracing::error!(model = %params.model, error = %e, "Failed to load model");
            ApiError::InvalidModel(e)
        })?;

    let Evaluation {
        scene,
        estimate,
        load_time_ms,
        estimate_time_ms,
    } = evaluation;

    let total_time_ms = total_start.elapsed().as_millis() as u64;
    tracing::info!(
        model = %params.model,
        size,
        meshes = scene.len(),
        ghi = estimate.ghi,
        total = estimate.total,
        total_time_ms,
        "Estimated BIPV potential"
    );

    let surfaces = estimate
        .surfaces
        .iter()
        .map(|s| SurfaceResult::new(s, scene.meshes.get(s.mesh_index)))
        .collect();

    Ok(EstimateResponse {
        model: params.model.clone(),
        lat: params.lat(),
        lng: params.lng(),
        date: params.date.clone(),
        ghi: estimate.ghi,
        ghi_defaulted: params.ghi_defaulted(),
        efficiency: estimate.efficiency,
        normal_mode: estimate.normal_mode.to_string(),
        total_energy: estimate.total,
        total_area: estimate.total_area(),
        skipped_meshes: estimate.skipped,
        summary: estimate.summary(),
        surfaces,
        stats: ProcessingStats {
            total_meshes: scene.len(),
            total_triangles: scene.triangle_count(),
            load_time_ms,
            estimate_time_ms,
            total_time_ms,
        },
    })
}
