// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Triangle area sums over flat position buffers.
//!
//! A flat triangle buffer stores nine values per triangle: the x, y, z of
//! each corner in order. Indexed meshes can be measured directly with
//! [`indexed_area`] or expanded first with `Mesh::triangle_buffer`.

use nalgebra::Point3;

/// Number of floats that encode one triangle in a flat buffer.
pub const FLOATS_PER_TRIANGLE: usize = 9;

/// Area of a single triangle: `0.5 * |(b - a) x (c - a)|`.
#[inline]
pub fn triangle_area(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    let edge1 = b - a;
    let edge2 = c - a;
    0.5 * edge1.cross(&edge2).norm()
}

/// Sum of triangle areas in a flat 9-floats-per-triangle buffer.
///
/// Returns 0 for an empty buffer. A trailing group shorter than nine values
/// does not form a triangle and is ignored.
pub fn buffer_area(positions: &[f32]) -> f64 {
    let chunks = positions.chunks_exact(FLOATS_PER_TRIANGLE);
    let remainder = chunks.remainder().len();
    if remainder != 0 {
        tracing::debug!(
            len = positions.len(),
            ignored = remainder,
            "Position buffer has a trailing partial triangle"
        );
    }

    chunks
        .map(|t| {
            triangle_area(
                &point(&t[0..3]),
                &point(&t[3..6]),
                &point(&t[6..9]),
            )
        })
        .sum()
}

/// Sum of triangle areas for an indexed mesh (xyz positions + triangle indices).
///
/// Triangles that reference a vertex past the end of `positions` are skipped,
/// as is a trailing partial index triple.
pub fn indexed_area(positions: &[f32], indices: &[u32]) -> f64 {
    let vertex_count = positions.len() / 3;
    indices
        .chunks_exact(3)
        .filter(|tri| tri.iter().all(|&i| (i as usize) < vertex_count))
        .map(|tri| {
            let v = |i: u32| point(&positions[i as usize * 3..i as usize * 3 + 3]);
            triangle_area(&v(tri[0]), &v(tri[1]), &v(tri[2]))
        })
        .sum()
}

#[inline]
fn point(xyz: &[f32]) -> Point3<f64> {
    Point3::new(xyz[0] as f64, xyz[1] as f64, xyz[2] as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_buffer() {
        assert_eq!(buffer_area(&[]), 0.0);
    }

    #[test]
    fn test_right_triangle_legs() {
        for leg in [1.0f32, 2.5, 10.0, 0.125] {
            let buffer = [0.0, 0.0, 0.0, leg, 0.0, 0.0, 0.0, leg, 0.0];
            let expected = (leg as f64 * leg as f64) / 2.0;
            assert_relative_eq!(buffer_area(&buffer), expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_orientation_does_not_change_area() {
        let ccw = [0.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 0.0, 4.0];
        let cw = [0.0, 0.0, 0.0, 0.0, 0.0, 4.0, 3.0, 0.0, 0.0];
        assert_relative_eq!(buffer_area(&ccw), 6.0);
        assert_relative_eq!(buffer_area(&cw), 6.0);
    }

    #[test]
    fn test_multiple_triangles_sum() {
        // Unit square split along the diagonal
        let buffer = [
            0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, //
            0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 1.0,
        ];
        assert_relative_eq!(buffer_area(&buffer), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_trailing_partial_group_ignored() {
        let mut buffer = vec![0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 2.0, 0.0];
        buffer.extend_from_slice(&[5.0, 5.0, 5.0, 6.0]);
        assert_relative_eq!(buffer_area(&buffer), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_triangle_has_zero_area() {
        let collinear = [0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0];
        assert_relative_eq!(buffer_area(&collinear), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_indexed_matches_flat() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 1.0];
        let indices = [0, 1, 2, 0, 2, 3];
        assert_relative_eq!(indexed_area(&positions, &indices), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_indexed_skips_out_of_range() {
        let positions = [0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 2.0, 0.0];
        let indices = [0, 1, 2, 0, 1, 7];
        assert_relative_eq!(indexed_area(&positions, &indices), 2.0, epsilon = 1e-9);
    }
}
