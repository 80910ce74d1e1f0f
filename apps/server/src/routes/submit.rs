// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Submit workflow: GHI lookup, then upload, then hand back the viewer URL.

use crate::error::ApiError;
use crate::routes::upload::read_form;
use crate::types::SubmitResponse;
use crate::AppState;
use axum::{
    extract::{Multipart, State},
    Json,
};

/// Viewer URL for a stored model and its GHI.
pub fn viewer_url(filename: &str, lat: f64, lng: f64, date: &str, ghi: f64) -> String {
    format!(
        "/api/v1/viewer?model={}&lat={}&lng={}&date={}&ghi={}",
        filename, lat, lng, date, ghi
    )
}

/// POST /api/v1/submit - Location, date and model in one form.
///
/// The model is only stored once the GHI lookup has succeeded.
pub async fn submit(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SubmitResponse>, ApiError> {
    let form = read_form(&mut multipart).await?;
    let lat = form.number("lat")?;
    let lng = form.number("lng")?;
    let date = form.text("date")?.to_string();
    let file = form.file.ok_or(ApiError::MissingFile)?;

    let Some(ghi) = state.ghi.fetch(lat, lng, &date).await else {
        tracing::warn!(lat, lng, date = %date, "Submit aborted: no GHI");
        return Err(ApiError::GhiUnavailable { lat, lng, date });
    };

    let filename = state.store.save(&file.file_name, &file.data).await?;
    let viewer_url = viewer_url(&filename, lat, lng, &date, ghi);
    tracing::info!(filename = %filename, ghi, "Submit complete");

    Ok(Json(SubmitResponse {
        success: true,
        filename,
        ghi,
        viewer_url,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewer_url_carries_parameters() {
        assert_eq!(
            viewer_url("1717230000000.glb", 52.52, 13.405, "20240601", 6.12),
            "/api/v1/viewer?model=1717230000000.glb&lat=52.52&lng=13.405&date=20240601&ghi=6.12"
        );
    }
}
