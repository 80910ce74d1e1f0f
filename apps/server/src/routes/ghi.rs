// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GHI lookup endpoint.

use crate::error::ApiError;
use crate::types::{GhiQuery, GhiResponse};
use crate::AppState;
use axum::{
    extract::{Query, State},
    Json,
};

/// GET /api/v1/ghi - Daily GHI for a point and date.
pub async fn lookup(
    State(state): State<AppState>,
    Query(query): Query<GhiQuery>,
) -> Result<Json<GhiResponse>, ApiError> {
    let GhiQuery { lat, lng, date } = query;

    match state.ghi.fetch(lat, lng, &date).await {
        Some(ghi) => Ok(Json(GhiResponse { lat, lng, date, ghi })),
        None => Err(ApiError::GhiUnavailable { lat, lng, date }),
    }
}
