// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! glTF / GLB scene import.
//!
//! Every triangle primitive reachable from the default scene becomes one
//! [`Mesh`] carrying the accumulated node transform. Points and line
//! primitives are not surfaces and are left out.

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::scene::Scene;
use gltf::mesh::Mode;
use nalgebra::Matrix4;
use std::collections::HashSet;

/// Load a scene from an in-memory `.glb` or self-contained `.gltf` file.
pub fn load_scene(bytes: &[u8]) -> Result<Scene> {
    let (document, buffers, _images) = gltf::import_slice(bytes)?;
    let mut scene = Scene::new();

    match document.default_scene().or_else(|| document.scenes().next()) {
        Some(gltf_scene) => visit_nodes(gltf_scene.nodes(), &buffers, &mut scene)?,
        None => {
            // No scene graph: take the meshes as-is in model space
            for mesh in document.meshes() {
                push_mesh(&mesh, &Matrix4::identity(), &buffers, &mut scene)?;
            }
        }
    }

    tracing::debug!(
        meshes = scene.len(),
        vertices = scene.vertex_count(),
        triangles = scene.triangle_count(),
        "Loaded glTF scene"
    );

    Ok(scene)
}

/// Depth-first walk over the node tree, parents before children.
///
/// Nodes must form a tree: a node reached a second time (a cycle, or a node
/// shared between parents) fails the load.
fn visit_nodes<'a>(
    roots: impl Iterator<Item = gltf::Node<'a>>,
    buffers: &[gltf::buffer::Data],
    scene: &mut Scene,
) -> Result<()> {
    let mut stack: Vec<(gltf::Node<'a>, Matrix4<f64>)> =
        roots.map(|node| (node, Matrix4::identity())).collect();
    stack.reverse();
    let mut visited = HashSet::new();

    while let Some((node, parent)) = stack.pop() {
        if !visited.insert(node.index()) {
            return Err(Error::InvalidHierarchy { node: node.index() });
        }

        let local: Matrix4<f64> = Matrix4::from(node.transform().matrix()).cast();
        let world = parent * local;

        if let Some(mesh) = node.mesh() {
            push_mesh(&mesh, &world, buffers, scene)?;
        }

        let children: Vec<gltf::Node<'a>> = node.children().collect();
        stack.extend(children.into_iter().rev().map(|child| (child, world)));
    }
    Ok(())
}

fn push_mesh(
    mesh: &gltf::Mesh,
    world: &Matrix4<f64>,
    buffers: &[gltf::buffer::Data],
    scene: &mut Scene,
) -> Result<()> {
    let base_name = mesh
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("mesh_{}", mesh.index()));
    let primitive_count = mesh.primitives().count();

    for primitive in mesh.primitives() {
        let name = if primitive_count > 1 {
            format!("{}#{}", base_name, primitive.index())
        } else {
            base_name.clone()
        };

        match primitive.mode() {
            Mode::Triangles | Mode::TriangleStrip | Mode::TriangleFan => {}
            mode => {
                tracing::debug!(mesh = %name, ?mode, "Skipping non-surface primitive");
                continue;
            }
        }

        let reader =
            primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

        // A primitive without positions is kept so the estimator can skip it
        let Some(positions) = reader.read_positions() else {
            scene.push(Mesh::new(name).with_world(*world));
            continue;
        };

        let mut out = Mesh::new(name);
        out.positions.extend(positions.flatten());
        if let Some(normals) = reader.read_normals() {
            out.normals.extend(normals.flatten());
        }

        let raw_indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..out.vertex_count() as u32).collect(),
        };
        out.indices = triangulate(primitive.mode(), &raw_indices);

        let vertex_count = out.vertex_count();
        if let Some(&index) = out.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(Error::IndexOutOfRange {
                mesh: out.name,
                index,
                vertex_count,
            });
        }

        scene.push(out.with_world(*world));
    }
    Ok(())
}

/// Convert strip and fan index streams to a plain triangle list.
fn triangulate(mode: Mode, indices: &[u32]) -> Vec<u32> {
    match mode {
        Mode::TriangleStrip => {
            let mut out = Vec::with_capacity(indices.len().saturating_sub(2) * 3);
            for (i, w) in indices.windows(3).enumerate() {
                // Alternate winding to keep faces consistently oriented
                if i % 2 == 0 {
                    out.extend_from_slice(&[w[0], w[1], w[2]]);
                } else {
                    out.extend_from_slice(&[w[1], w[0], w[2]]);
                }
            }
            out
        }
        Mode::TriangleFan => {
            let mut out = Vec::with_capacity(indices.len().saturating_sub(2) * 3);
            if let Some((&first, rest)) = indices.split_first() {
                for w in rest.windows(2) {
                    out.extend_from_slice(&[first, w[0], w[1]]);
                }
            }
            out
        }
        _ => indices.to_vec(),
    }
}
