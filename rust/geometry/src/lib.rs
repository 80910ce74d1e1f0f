// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BIPV-Lite Geometry
//!
//! Loads glTF city models into a plain scene description and estimates the
//! building-integrated photovoltaic potential of their surfaces from a daily
//! GHI value, using nalgebra for the vector math.

pub mod area;
pub mod error;
pub mod irradiance;
pub mod loader;
pub mod mesh;
pub mod scene;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point3, Vector3};

pub use area::{buffer_area, indexed_area, triangle_area};
pub use error::{Error, Result};
pub use irradiance::{
    estimate_scene, incidence_factor, parse_ghi, try_parse_ghi, EstimationContext, NormalMode,
    SceneEstimate, SurfaceEstimate, DEFAULT_GHI, PANEL_EFFICIENCY,
};
pub use loader::load_scene;
pub use mesh::{calculate_normals, Mesh};
pub use scene::{DirectionalLight, Scene};
