// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Service modules: model storage, GHI lookup, estimation and the frame loop.

pub mod estimator;
pub mod frame_loop;
pub mod ghi;
pub mod storage;

pub use estimator::{estimate_model, evaluate, Evaluation};
pub use frame_loop::{FrameLoop, FrameLoopHandle, FrameTick};
pub use ghi::GhiClient;
pub use storage::UploadStore;
