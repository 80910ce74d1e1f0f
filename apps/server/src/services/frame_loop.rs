// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fixed-rate frame loop with an explicit stop hook.
//!
//! The loop runs on its own task and calls the frame callback once per tick.
//! It ends when the callback returns `ControlFlow::Break`, or when its
//! [`FrameLoopHandle`] is stopped or dropped.

use std::ops::ControlFlow;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// One frame of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTick {
    /// Zero-based frame number.
    pub frame: u64,
    /// Time since the loop started.
    pub elapsed: Duration,
}

/// Loop configuration.
#[derive(Debug, Clone, Copy)]
pub struct FrameLoop {
    period: Duration,
}

impl FrameLoop {
    /// Loop ticking `rate_hz` times per second (at least once).
    pub fn new(rate_hz: u32) -> Self {
        Self {
            period: Duration::from_secs_f64(1.0 / rate_hz.max(1) as f64),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start the loop on a new task.
    pub fn spawn<F>(self, mut on_frame: F) -> FrameLoopHandle
    where
        F: FnMut(FrameTick) -> ControlFlow<()> + Send + 'static,
    {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let period = self.period;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let start = Instant::now();
            let mut frame = 0u64;

            loop {
                tokio::select! {
                    biased;
                    // Fires on stop() and when the handle is dropped
                    _ = stop_rx.changed() => break,
                    _ = ticker.tick() => {
                        let tick = FrameTick { frame, elapsed: start.elapsed() };
                        frame += 1;
                        if on_frame(tick).is_break() {
                            break;
                        }
                    }
                }
            }

            tracing::debug!(frames = frame, "Frame loop stopped");
            frame
        });

        FrameLoopHandle {
            stop: stop_tx,
            task,
        }
    }
}

/// Owner of a running loop. Dropping it stops the loop.
#[derive(Debug)]
pub struct FrameLoopHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<u64>,
}

impl FrameLoopHandle {
    /// Whether the loop has already exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the loop and wait for it. Returns the number of frames run.
    pub async fn stop(mut self) -> u64 {
        let _ = self.stop.send(true);
        match (&mut self.task).await {
            Ok(frames) => frames,
            Err(e) => {
                tracing::warn!(error = %e, "Frame loop task failed");
                0
            }
        }
    }
}

impl Drop for FrameLoopHandle {
    fn drop(&mut self) {
        let _ = self.stop.send(true);
    }
}
