// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene container: the loaded meshes and the light they are evaluated against.

use crate::mesh::Mesh;
use nalgebra::{Point3, Vector3};

/// Default light position used by the viewer.
pub const DEFAULT_LIGHT_POSITION: [f64; 3] = [5.0, 10.0, 7.5];

/// Directional light. As with most scene graphs, the direction *towards*
/// the light is the normalized position vector (the light targets the origin).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub position: Point3<f64>,
}

impl DirectionalLight {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            position: Point3::new(x, y, z),
        }
    }

    /// Unit vector pointing from the scene towards the light.
    ///
    /// `None` when the light sits at the origin and has no direction.
    pub fn sun_direction(&self) -> Option<Vector3<f64>> {
        self.position.coords.try_normalize(f64::EPSILON)
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        let [x, y, z] = DEFAULT_LIGHT_POSITION;
        Self::new(x, y, z)
    }
}

/// All meshes of a loaded model in traversal order.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub meshes: Vec<Mesh>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_meshes(meshes: Vec<Mesh>) -> Self {
        Self { meshes }
    }

    pub fn push(&mut self, mesh: Mesh) {
        self.meshes.push(mesh);
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(Mesh::triangle_count).sum()
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(Mesh::vertex_count).sum()
    }
}
