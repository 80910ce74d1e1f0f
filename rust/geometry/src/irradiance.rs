// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BIPV potential estimation.
//!
//! Each mesh gets one incidence factor against the scene light, and its
//! energy contribution is `ghi * area * incidence * efficiency`. The default
//! [`NormalMode::MeshUp`] treats every mesh as a single flat surface whose
//! orientation is the world-space image of local +Y. [`NormalMode::PerTriangle`]
//! evaluates every triangle on its own instead and has to be asked for.

use crate::area::triangle_area;
use crate::mesh::{calculate_normals, Mesh};
use crate::scene::{DirectionalLight, Scene};
use nalgebra::Vector3;
use std::fmt;
use std::str::FromStr;

/// Panel conversion efficiency (15%).
pub const PANEL_EFFICIENCY: f64 = 0.15;

/// GHI used when the caller does not supply a usable value (kWh/m²/day).
pub const DEFAULT_GHI: f64 = 5.0;

/// How a mesh's facing direction is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalMode {
    /// One representative normal per mesh: local +Y through the normal matrix.
    #[default]
    MeshUp,
    /// World-space face normal and area for every triangle.
    PerTriangle,
}

impl NormalMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NormalMode::MeshUp => "mesh-up",
            NormalMode::PerTriangle => "per-triangle",
        }
    }
}

impl fmt::Display for NormalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NormalMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mesh-up" | "mesh" => Ok(NormalMode::MeshUp),
            "per-triangle" | "triangle" => Ok(NormalMode::PerTriangle),
            other => Err(format!("unknown normal mode '{}'", other)),
        }
    }
}

/// Everything the estimator needs besides the scene itself.
#[derive(Debug, Clone, Copy)]
pub struct EstimationContext {
    /// Global horizontal irradiance, kWh/m²/day
    pub ghi: f64,
    pub light: DirectionalLight,
    pub efficiency: f64,
    pub normal_mode: NormalMode,
}

impl EstimationContext {
    pub fn new(ghi: f64) -> Self {
        Self {
            ghi,
            light: DirectionalLight::default(),
            efficiency: PANEL_EFFICIENCY,
            normal_mode: NormalMode::default(),
        }
    }

    pub fn with_light(mut self, light: DirectionalLight) -> Self {
        self.light = light;
        self
    }

    pub fn with_normal_mode(mut self, normal_mode: NormalMode) -> Self {
        self.normal_mode = normal_mode;
        self
    }
}

impl Default for EstimationContext {
    fn default() -> Self {
        Self::new(DEFAULT_GHI)
    }
}

/// A usable GHI value: finite after trimming, `None` otherwise.
pub fn try_parse_ghi(raw: Option<&str>) -> Option<f64> {
    raw?.trim().parse::<f64>().ok().filter(|ghi| ghi.is_finite())
}

/// Parse a GHI value from a query string parameter.
///
/// Input rejected by [`try_parse_ghi`] yields [`DEFAULT_GHI`].
pub fn parse_ghi(raw: Option<&str>) -> f64 {
    match (try_parse_ghi(raw), raw) {
        (Some(ghi), _) => ghi,
        (None, Some(_)) => {
            tracing::warn!(raw = ?raw, default = DEFAULT_GHI, "Unparsable GHI, using default");
            DEFAULT_GHI
        }
        (None, None) => {
            tracing::warn!(default = DEFAULT_GHI, "No GHI supplied, using default");
            DEFAULT_GHI
        }
    }
}

/// `max(0, normal · sun)`; back-facing surfaces contribute nothing.
#[inline]
pub fn incidence_factor(normal: &Vector3<f64>, sun: &Vector3<f64>) -> f64 {
    normal.dot(sun).max(0.0)
}

/// Estimated daily energy for one surface, kWh/day.
#[inline]
pub fn energy_contribution(ghi: f64, area: f64, incidence: f64, efficiency: f64) -> f64 {
    ghi * area * incidence * efficiency
}

/// World-space image of local +Y, normalized. `None` for degenerate transforms.
pub fn representative_normal(mesh: &Mesh) -> Option<Vector3<f64>> {
    (mesh.normal_matrix() * Vector3::y()).try_normalize(f64::EPSILON)
}

/// Feedback color: hue runs from red (no incidence) to green (full incidence).
pub fn incidence_color(incidence: f64) -> [f32; 4] {
    let [r, g, b] = hsl_to_rgb(incidence.clamp(0.0, 1.0) / 3.0, 1.0, 0.5);
    [r as f32, g as f32, b as f32, 1.0]
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [f64; 3] {
    if s == 0.0 {
        return [l, l, l];
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let channel = |t: f64| {
        let t = t.rem_euclid(1.0);
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    };
    [channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0)]
}

/// Result for one mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceEstimate {
    /// Position of the mesh in the scene
    pub mesh_index: usize,
    pub name: String,
    /// m²
    pub area: f64,
    /// 0..=1; area-weighted mean in per-triangle mode
    pub incidence: f64,
    /// kWh/day
    pub energy: f64,
}

/// Result for a whole scene, produced only once every mesh has been visited.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneEstimate {
    pub ghi: f64,
    pub efficiency: f64,
    pub normal_mode: NormalMode,
    /// Scene total, kWh/day
    pub total: f64,
    pub surfaces: Vec<SurfaceEstimate>,
    /// Meshes without position data
    pub skipped: usize,
}

impl SceneEstimate {
    /// Two-line overlay text: GHI used, then the total to two decimals.
    pub fn summary(&self) -> String {
        format!(
            "GHI: {} kWh/m²/day\nEstimated BIPV Potential: {:.2} kWh/day",
            self.ghi, self.total
        )
    }

    pub fn total_area(&self) -> f64 {
        self.surfaces.iter().map(|s| s.area).sum()
    }
}

/// Walk every mesh, recolor it, and accumulate the scene total.
pub fn estimate_scene(scene: &mut Scene, ctx: &EstimationContext) -> SceneEstimate {
    let sun = ctx.light.sun_direction();
    if sun.is_none() {
        tracing::warn!(light = ?ctx.light.position, "Light has no direction; all incidence is zero");
    }

    let mut surfaces = Vec::with_capacity(scene.len());
    let mut skipped = 0usize;
    let mut total = 0.0;

    for (mesh_index, mesh) in scene.meshes.iter_mut().enumerate() {
        if mesh.is_empty() {
            skipped += 1;
            continue;
        }

        let (area, incidence, energy) = match ctx.normal_mode {
            NormalMode::MeshUp => estimate_mesh_up(mesh, sun.as_ref(), ctx),
            NormalMode::PerTriangle => estimate_per_triangle(mesh, sun.as_ref(), ctx),
        };

        mesh.color = Some(incidence_color(incidence));
        total += energy;
        surfaces.push(SurfaceEstimate {
            mesh_index,
            name: mesh.name.clone(),
            area,
            incidence,
            energy,
        });
    }

    tracing::debug!(
        meshes = surfaces.len(),
        skipped,
        total,
        mode = %ctx.normal_mode,
        "Scene estimate complete"
    );

    SceneEstimate {
        ghi: ctx.ghi,
        efficiency: ctx.efficiency,
        normal_mode: ctx.normal_mode,
        total,
        surfaces,
        skipped,
    }
}

fn estimate_mesh_up(
    mesh: &mut Mesh,
    sun: Option<&Vector3<f64>>,
    ctx: &EstimationContext,
) -> (f64, f64, f64) {
    if !mesh.has_normals() {
        calculate_normals(mesh);
    }

    let incidence = match (representative_normal(mesh), sun) {
        (Some(normal), Some(sun)) => incidence_factor(&normal, sun),
        _ => 0.0,
    };
    let area = mesh.area();
    (area, incidence, energy_contribution(ctx.ghi, area, incidence, ctx.efficiency))
}

fn estimate_per_triangle(
    mesh: &Mesh,
    sun: Option<&Vector3<f64>>,
    ctx: &EstimationContext,
) -> (f64, f64, f64) {
    let mut area = 0.0;
    let mut weighted_incidence = 0.0;

    for [a, b, c] in mesh.world_triangles() {
        let tri_area = triangle_area(&a, &b, &c);
        let normal = (b - a).cross(&(c - a)).try_normalize(f64::EPSILON);
        let incidence = match (normal, sun) {
            (Some(normal), Some(sun)) => incidence_factor(&normal, sun),
            _ => 0.0,
        };
        area += tri_area;
        weighted_incidence += tri_area * incidence;
    }

    let incidence = if area > 0.0 { weighted_incidence / area } else { 0.0 };
    let energy = energy_contribution(ctx.ghi, weighted_incidence, 1.0, ctx.efficiency);
    (area, incidence, energy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix4, Point3};

    /// Horizontal square of the given side in the XZ plane, facing +Y.
    fn square(name: &str, side: f32) -> Mesh {
        let mut mesh = Mesh::new(name);
        for (x, z) in [(0.0, 0.0), (side, 0.0), (side, side), (0.0, side)] {
            mesh.add_position(Point3::new(x as f64, 0.0, z as f64));
        }
        mesh.add_triangle(0, 2, 1);
        mesh.add_triangle(0, 3, 2);
        mesh
    }

    fn overhead() -> EstimationContext {
        EstimationContext::new(5.0).with_light(DirectionalLight::new(0.0, 10.0, 0.0))
    }

    #[test]
    fn test_flat_square_under_overhead_light() {
        let mut scene = Scene::from_meshes(vec![square("roof", 2.0)]);
        let estimate = estimate_scene(&mut scene, &overhead());

        let surface = &estimate.surfaces[0];
        assert_relative_eq!(surface.incidence, 1.0, epsilon = 1e-12);
        assert_relative_eq!(surface.area, 4.0, epsilon = 1e-9);
        assert_relative_eq!(estimate.total, 5.0 * 4.0 * 1.0 * 0.15, epsilon = 1e-9);
    }

    #[test]
    fn test_energy_contribution_reference_value() {
        assert_relative_eq!(energy_contribution(5.0, 10.0, 1.0, PANEL_EFFICIENCY), 7.5, epsilon = 1e-12);
    }

    #[test]
    fn test_perpendicular_normal_contributes_exactly_zero() {
        let sun = Vector3::new(1.0, 0.0, 0.0);
        let incidence = incidence_factor(&Vector3::y(), &sun);
        assert_eq!(incidence, 0.0);
        assert_eq!(energy_contribution(5.0, 10.0, incidence, PANEL_EFFICIENCY), 0.0);

        let ctx = EstimationContext::new(5.0).with_light(DirectionalLight::new(3.0, 0.0, 0.0));
        let mut scene = Scene::from_meshes(vec![square("wall", 1.0)]);
        assert_eq!(estimate_scene(&mut scene, &ctx).total, 0.0);
    }

    #[test]
    fn test_backfacing_clamps_to_zero() {
        let incidence = incidence_factor(&Vector3::y(), &Vector3::new(0.0, -1.0, 0.0));
        assert_eq!(incidence, 0.0);

        // Flip the square upside down: local +Y maps to world -Y
        let flipped = square("soffit", 1.0).with_world(Matrix4::new_rotation(Vector3::new(std::f64::consts::PI, 0.0, 0.0)));
        let mut scene = Scene::from_meshes(vec![flipped]);
        let estimate = estimate_scene(&mut scene, &overhead());
        assert_eq!(estimate.surfaces[0].incidence, 0.0);
        assert_eq!(estimate.total, 0.0);
    }

    #[test]
    fn test_empty_scene_total_is_zero() {
        let mut scene = Scene::new();
        let estimate = estimate_scene(&mut scene, &EstimationContext::default());
        assert_eq!(estimate.total, 0.0);
        assert!(estimate.surfaces.is_empty());
    }

    #[test]
    fn test_mesh_without_positions_is_skipped() {
        let mut scene = Scene::from_meshes(vec![Mesh::new("empty"), square("roof", 1.0)]);
        let estimate = estimate_scene(&mut scene, &overhead());
        assert_eq!(estimate.skipped, 1);
        assert_eq!(estimate.surfaces.len(), 1);
        assert_eq!(estimate.surfaces[0].mesh_index, 1);
        assert!(scene.meshes[0].color.is_none());
    }

    #[test]
    fn test_mesh_up_ignores_actual_triangle_orientation() {
        // A vertical wall in the XY plane still counts as facing +Y in mesh-up mode.
        let wall = Mesh::from_triangle_buffer("wall", &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        let mut scene = Scene::from_meshes(vec![wall]);

        let mesh_up = estimate_scene(&mut scene, &overhead());
        assert_relative_eq!(mesh_up.surfaces[0].incidence, 1.0, epsilon = 1e-12);

        let per_triangle = estimate_scene(&mut scene, &overhead().with_normal_mode(NormalMode::PerTriangle));
        assert_eq!(per_triangle.surfaces[0].incidence, 0.0);
        assert_eq!(per_triangle.total, 0.0);
    }

    #[test]
    fn test_per_triangle_uses_world_scale() {
        let scaled = square("roof", 1.0).with_world(Matrix4::new_scaling(3.0));
        let mut scene = Scene::from_meshes(vec![scaled]);

        let mesh_up = estimate_scene(&mut scene, &overhead());
        assert_relative_eq!(mesh_up.surfaces[0].area, 1.0, epsilon = 1e-9);

        let per_triangle = estimate_scene(&mut scene, &overhead().with_normal_mode(NormalMode::PerTriangle));
        assert_relative_eq!(per_triangle.surfaces[0].area, 9.0, epsilon = 1e-9);
        assert_relative_eq!(per_triangle.total, 5.0 * 9.0 * 0.15, epsilon = 1e-9);
    }

    #[test]
    fn test_estimate_recolors_and_computes_normals() {
        let mut scene = Scene::from_meshes(vec![square("roof", 1.0)]);
        estimate_scene(&mut scene, &overhead());
        let mesh = &scene.meshes[0];
        assert!(mesh.has_normals());
        assert_eq!(mesh.color, Some(incidence_color(1.0)));
    }

    #[test]
    fn test_incidence_color_endpoints() {
        let red = incidence_color(0.0);
        assert_relative_eq!(red[0], 1.0);
        assert_relative_eq!(red[1], 0.0);
        let green = incidence_color(1.0);
        assert_relative_eq!(green[0], 0.0, epsilon = 1e-6);
        assert_relative_eq!(green[1], 1.0);
        assert_relative_eq!(green[2], 0.0);
    }

    #[test]
    fn test_parse_ghi_defaults() {
        assert_eq!(parse_ghi(None), DEFAULT_GHI);
        assert_eq!(parse_ghi(Some("abc")), DEFAULT_GHI);
        assert_eq!(parse_ghi(Some("")), DEFAULT_GHI);
        assert_eq!(parse_ghi(Some("NaN")), DEFAULT_GHI);
        assert_eq!(parse_ghi(Some("6.25")), 6.25);
        assert_eq!(parse_ghi(Some(" 4 ")), 4.0);
        assert_eq!(parse_ghi(Some("0")), 0.0);
    }

    #[test]
    fn test_try_parse_ghi_agrees_with_parse_ghi() {
        for raw in [None, Some(""), Some("abc"), Some("inf"), Some("NaN"), Some("0"), Some(" 6.12 ")] {
            match try_parse_ghi(raw) {
                Some(ghi) => assert_eq!(parse_ghi(raw), ghi),
                None => assert_eq!(parse_ghi(raw), DEFAULT_GHI),
            }
        }
        assert_eq!(try_parse_ghi(Some("inf")), None);
        assert_eq!(try_parse_ghi(Some(" 6.12 ")), Some(6.12));
    }

    #[test]
    fn test_summary_format() {
        let mut scene = Scene::from_meshes(vec![square("roof", 1.0)]);
        let ctx = EstimationContext::new(parse_ghi(Some("not-a-number"))).with_light(DirectionalLight::new(0.0, 1.0, 0.0));
        let summary = estimate_scene(&mut scene, &ctx).summary();
        assert_eq!(summary, "GHI: 5 kWh/m²/day\nEstimated BIPV Potential: 0.75 kWh/day");
    }

    #[test]
    fn test_normal_mode_parse() {
        assert_eq!("per-triangle".parse::<NormalMode>(), Ok(NormalMode::PerTriangle));
        assert_eq!("Mesh-Up".parse::<NormalMode>(), Ok(NormalMode::MeshUp));
        assert!("sideways".parse::<NormalMode>().is_err());
    }
}
