// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures

use crate::area::{buffer_area, FLOATS_PER_TRIANGLE};
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

/// Triangle mesh placed in the scene by a world transform
#[derive(Debug, Clone)]
pub struct Mesh {
    /// Node or mesh name from the source model (may be empty)
    pub name: String,
    /// Vertex positions (x, y, z) in local coordinates
    pub positions: Vec<f32>,
    /// Vertex normals (nx, ny, nz); empty until computed or loaded
    pub normals: Vec<f32>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
    /// Local-to-world transform
    pub world: Matrix4<f64>,
    /// Display color (RGBA, 0-1), set by the estimator for visual feedback
    pub color: Option<[f32; 4]>,
}

impl Mesh {
    /// Create a new empty mesh with an identity transform
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
            world: Matrix4::identity(),
            color: None,
        }
    }

    /// Create a mesh with capacity
    pub fn with_capacity(name: impl Into<String>, vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            indices: Vec::with_capacity(index_count),
            ..Self::new(name)
        }
    }

    /// Build a non-indexed mesh from a flat 9-floats-per-triangle buffer
    pub fn from_triangle_buffer(name: impl Into<String>, buffer: &[f32]) -> Self {
        let vertex_count = buffer.len() / 3;
        let mut mesh = Self::with_capacity(name, vertex_count, vertex_count);
        for tri in buffer.chunks_exact(FLOATS_PER_TRIANGLE) {
            let base = mesh.vertex_count() as u32;
            mesh.positions.extend_from_slice(tri);
            mesh.add_triangle(base, base + 1, base + 2);
        }
        mesh
    }

    /// Replace the world transform (builder style)
    pub fn with_world(mut self, world: Matrix4<f64>) -> Self {
        self.world = world;
        self
    }

    /// Add a vertex (position only; normals are derived later)
    #[inline]
    pub fn add_position(&mut self, position: Point3<f64>) {
        self.positions.push(position.x as f32);
        self.positions.push(position.y as f32);
        self.positions.push(position.z as f32);
    }

    /// Add a triangle
    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.push(i0);
        self.indices.push(i1);
        self.indices.push(i2);
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Get triangle count
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if mesh has no position data
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Whether per-vertex normals are present for every vertex
    #[inline]
    pub fn has_normals(&self) -> bool {
        !self.positions.is_empty() && self.normals.len() == self.positions.len()
    }

    #[inline]
    fn vertex(&self, i: u32) -> Point3<f64> {
        let i = i as usize * 3;
        Point3::new(
            self.positions[i] as f64,
            self.positions[i + 1] as f64,
            self.positions[i + 2] as f64,
        )
    }

    /// Index triples whose vertices all exist
    fn valid_triangles(&self) -> impl Iterator<Item = &[u32]> + '_ {
        let vertex_count = self.vertex_count();
        self.indices
            .chunks_exact(3)
            .filter(move |tri| tri.iter().all(|&i| (i as usize) < vertex_count))
    }

    /// Expand the indexed triangles into a flat 9-floats-per-triangle buffer.
    pub fn triangle_buffer(&self) -> Vec<f32> {
        let mut buffer = Vec::with_capacity(self.triangle_count() * FLOATS_PER_TRIANGLE);
        for &i in self.valid_triangles().flatten() {
            let i = i as usize * 3;
            buffer.extend_from_slice(&self.positions[i..i + 3]);
        }
        buffer
    }

    /// Surface area in local coordinates
    pub fn area(&self) -> f64 {
        buffer_area(&self.triangle_buffer())
    }

    /// Triangles transformed to world space
    pub fn world_triangles(&self) -> impl Iterator<Item = [Point3<f64>; 3]> + '_ {
        self.valid_triangles().map(move |tri| {
            [
                self.world.transform_point(&self.vertex(tri[0])),
                self.world.transform_point(&self.vertex(tri[1])),
                self.world.transform_point(&self.vertex(tri[2])),
            ]
        })
    }

    /// Normal matrix: inverse-transpose of the upper-left 3x3 of the world transform.
    ///
    /// Falls back to the plain 3x3 when the transform is singular.
    pub fn normal_matrix(&self) -> Matrix3<f64> {
        let linear: Matrix3<f64> = self.world.fixed_view::<3, 3>(0, 0).into_owned();
        linear
            .try_inverse()
            .map(|inv| inv.transpose())
            .unwrap_or(linear)
    }
}

/// Calculate smooth vertex normals from face normals.
///
/// Vertices not referenced by any non-degenerate triangle get a zero normal.
pub fn calculate_normals(mesh: &mut Mesh) {
    let vertex_count = mesh.vertex_count();
    if vertex_count == 0 {
        return;
    }

    let mut normals = vec![Vector3::zeros(); vertex_count];

    // Accumulate area-weighted face normals
    for tri in mesh.valid_triangles() {
        let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let v0 = mesh.vertex(tri[0]);
        let v1 = mesh.vertex(tri[1]);
        let v2 = mesh.vertex(tri[2]);
        let normal = (v1 - v0).cross(&(v2 - v0));

        normals[i0] += normal;
        normals[i1] += normal;
        normals[i2] += normal;
    }

    mesh.normals.clear();
    mesh.normals.reserve(vertex_count * 3);

    for normal in normals {
        let normalized = normal.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros);
        mesh.normals.push(normalized.x as f32);
        mesh.normals.push(normalized.y as f32);
        mesh.normals.push(normalized.z as f32);
    }
}
