// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or evaluating a scene
#[derive(Error, Debug)]
pub enum Error {
    #[error("glTF import failed: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("Mesh '{mesh}' references vertex {index} but has only {vertex_count} vertices")]
    IndexOutOfRange {
        mesh: String,
        index: u32,
        vertex_count: usize,
    },

    #[error("Node {node} is reachable more than once; the node hierarchy is not a tree")]
    InvalidHierarchy { node: usize },
}
