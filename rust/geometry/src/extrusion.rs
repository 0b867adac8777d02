// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrusion operations - converting 2D profiles to 3D meshes
//!
//! Profiles are swept along their local +Z axis. Callers place the resulting
//! prism in world space with a transform, which keeps the sweep itself free
//! of any scene convention.

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::profile::{Profile2D, Triangulation};
use crate::triangulation::signed_area;
use nalgebra::{Matrix4, Point2, Point3, Vector3};

/// Profiles with less area than this cannot form a solid
const MIN_PROFILE_AREA: f64 = 1e-12;

/// Extrude a 2D profile along the Z axis into a closed prism
///
/// The result has a bottom cap at `z = 0`, a top cap at `z = depth` and one
/// quad per boundary edge, every face wound counter-clockwise when seen from
/// outside. The profile may be given in either orientation.
pub fn extrude_profile(
    profile: &Profile2D,
    depth: f64,
    transform: Option<Matrix4<f64>>,
) -> Result<Mesh> {
    if depth <= 0.0 || !depth.is_finite() {
        return Err(Error::InvalidExtrusion(format!(
            "Depth must be positive, got {}",
            depth
        )));
    }

    if profile.area() < MIN_PROFILE_AREA {
        return Err(Error::InvalidProfile(format!(
            "Profile with {} vertices has no area",
            profile.outer.len()
        )));
    }

    let profile = profile.clone().into_ccw();
    let triangulation = profile.triangulate()?;

    let n = profile.outer.len();
    let mut mesh = Mesh::with_capacity(n * 2 + n * 4, triangulation.indices.len() * 2 + n * 6);

    create_cap_mesh(&triangulation, 0.0, false, &mut mesh);
    create_cap_mesh(&triangulation, depth, true, &mut mesh);
    create_side_walls(&profile.outer, depth, &mut mesh);

    if let Some(mat) = transform {
        apply_transform(&mut mesh, &mat);
    }

    Ok(mesh)
}

/// Create a single-sided rectangle in the local XY plane facing +Z
///
/// Used for zero-thickness surfaces such as floor slabs.
pub fn create_flat_quad(width: f64, height: f64, transform: Option<Matrix4<f64>>) -> Mesh {
    let half_w = width / 2.0;
    let half_h = height / 2.0;
    let normal = Vector3::z();

    let mut mesh = Mesh::with_capacity(4, 6);
    mesh.add_vertex(Point3::new(-half_w, -half_h, 0.0), normal);
    mesh.add_vertex(Point3::new(half_w, -half_h, 0.0), normal);
    mesh.add_vertex(Point3::new(half_w, half_h, 0.0), normal);
    mesh.add_vertex(Point3::new(-half_w, half_h, 0.0), normal);
    mesh.add_triangle(0, 1, 2);
    mesh.add_triangle(0, 2, 3);

    if let Some(mat) = transform {
        apply_transform(&mut mesh, &mat);
    }

    mesh
}

/// Create a cap mesh (top or bottom) from triangulation
///
/// Each triangle is oriented individually, so the winding earcut happens to
/// emit does not matter.
fn create_cap_mesh(triangulation: &Triangulation, z: f64, facing_up: bool, mesh: &mut Mesh) {
    let base_index = mesh.vertex_count() as u32;
    let normal = if facing_up {
        Vector3::z()
    } else {
        -Vector3::z()
    };

    for point in &triangulation.points {
        mesh.add_vertex(Point3::new(point.x, point.y, z), normal);
    }

    for tri in triangulation.indices.chunks_exact(3) {
        let corners: [Point2<f64>; 3] = [
            triangulation.points[tri[0]],
            triangulation.points[tri[1]],
            triangulation.points[tri[2]],
        ];
        let ccw = signed_area(&corners) > 0.0;

        let i0 = base_index + tri[0] as u32;
        let i1 = base_index + tri[1] as u32;
        let i2 = base_index + tri[2] as u32;

        if ccw == facing_up {
            mesh.add_triangle(i0, i1, i2);
        } else {
            mesh.add_triangle(i0, i2, i1);
        }
    }
}

/// Create side walls for a counter-clockwise profile boundary
fn create_side_walls(boundary: &[Point2<f64>], depth: f64, mesh: &mut Mesh) {
    for i in 0..boundary.len() {
        let j = (i + 1) % boundary.len();

        let p0 = &boundary[i];
        let p1 = &boundary[j];

        // Right-hand normal of a CCW edge points out of the solid
        let edge = Vector3::new(p1.x - p0.x, p1.y - p0.y, 0.0);
        let normal = match Vector3::new(edge.y, -edge.x, 0.0).try_normalize(1e-12) {
            Some(n) => n,
            None => continue,
        };

        let idx = mesh.vertex_count() as u32;
        mesh.add_vertex(Point3::new(p0.x, p0.y, 0.0), normal);
        mesh.add_vertex(Point3::new(p1.x, p1.y, 0.0), normal);
        mesh.add_vertex(Point3::new(p1.x, p1.y, depth), normal);
        mesh.add_vertex(Point3::new(p0.x, p0.y, depth), normal);

        mesh.add_triangle(idx, idx + 1, idx + 2);
        mesh.add_triangle(idx, idx + 2, idx + 3);
    }
}

/// Apply transformation matrix to mesh
#[inline]
pub fn apply_transform(mesh: &mut Mesh, transform: &Matrix4<f64>) {
    mesh.positions.chunks_exact_mut(3).for_each(|chunk| {
        let point = Point3::new(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
        let transformed = transform.transform_point(&point);
        chunk[0] = transformed.x as f32;
        chunk[1] = transformed.y as f32;
        chunk[2] = transformed.z as f32;
    });

    // Normals go through the inverse transpose
    let normal_matrix = transform.try_inverse().unwrap_or(*transform).transpose();

    mesh.normals.chunks_exact_mut(3).for_each(|chunk| {
        let normal = Vector3::new(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
        let transformed = (normal_matrix * normal.to_homogeneous())
            .xyz()
            .try_normalize(1e-12)
            .unwrap_or(normal);
        chunk[0] = transformed.x as f32;
        chunk[1] = transformed.y as f32;
        chunk[2] = transformed.z as f32;
    });
}
