// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Viewer endpoints: the estimate as JSON, or as a live event stream.

use crate::error::ApiError;
use crate::services::{estimate_model, FrameLoop, FrameTick};
use crate::types::{EstimateResponse, ViewerEvent, ViewerParams};
use crate::AppState;
use async_stream::stream;
use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::{Stream, StreamExt};
use std::convert::Infallible;
use std::ops::ControlFlow;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_stream::wrappers::ReceiverStream;

/// Frames buffered per client before new ones are dropped.
const FRAME_BUFFER: usize = 8;

/// GET /api/v1/viewer - Evaluate a stored model.
pub async fn view(
    State(state): State<AppState>,
    Query(params): Query<ViewerParams>,
) -> Result<Json<EstimateResponse>, ApiError> {
    let estimate = estimate_model(&state.store, state.config.light, &params).await?;
    Ok(Json(estimate))
}

/// GET /api/v1/viewer/stream - Evaluate a stored model, then stream frames.
///
/// The first event carries the estimate. Frame events follow at the
/// configured rate until the client goes away.
pub async fn stream_view(
    State(state): State<AppState>,
    Query(params): Query<ViewerParams>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let estimate = estimate_model(&state.store, state.config.light, &params).await?;
    let frame_loop = FrameLoop::new(state.config.frame_rate_hz);

    let stream = viewer_events(estimate, frame_loop).map(|event| Ok(to_sse_event(&event)));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Summary first, then one event per frame.
///
/// The frame loop lives as long as the stream: dropping the stream drops
/// the loop handle, which stops the loop.
pub fn viewer_events(
    estimate: EstimateResponse,
    frame_loop: FrameLoop,
) -> impl Stream<Item = ViewerEvent> {
    let (tx, rx) = mpsc::channel::<FrameTick>(FRAME_BUFFER);

    stream! {
        yield ViewerEvent::Summary {
            estimate: Box::new(estimate),
        };

        let _frames = frame_loop.spawn(move |tick| match tx.try_send(tick) {
            Ok(()) | Err(TrySendError::Full(_)) => ControlFlow::Continue(()),
            Err(TrySendError::Closed(_)) => ControlFlow::Break(()),
        });

        let mut ticks = ReceiverStream::new(rx);
        while let Some(tick) = ticks.next().await {
            yield ViewerEvent::Frame {
                frame: tick.frame,
                elapsed_ms: tick.elapsed.as_millis() as u64,
            };
        }
    }
}

fn to_sse_event(event: &ViewerEvent) -> Event {
    match serde_json::to_string(event) {
        Ok(json) => Event::default().event(event.name()).data(json),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to serialize viewer event");
            let fallback = ViewerEvent::Error {
                message: e.to_string(),
            };
            Event::default()
                .event(fallback.name())
                .data(serde_json::to_string(&fallback).unwrap_or_default())
        }
    }
}
