// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 3D building generation from classified floor plan contours
//!
//! World space is right-handed with Y up. Plan X becomes world X and plan Y
//! becomes world Z, so profiles are laid out in a local frame whose +Z is
//! rotated onto world +Y before being lifted to the storey elevation.

use crate::contour_model::FloorplanModel;
use crate::error::{FloorplanError, Result};
use crate::types::{
    BuildingParameters, Contour, ContourKind, FloorGroup, GeneratedModel, Point2D, WallSolid,
};
use floorplan3d_geometry::{
    apply_transform, create_flat_quad, create_strip, extrude_profile, Mesh, Profile2D,
};
use nalgebra::{Isometry2, Matrix4, Point2, Vector2, Vector3};
use std::f64::consts::FRAC_PI_2;
use tracing::{debug, info, warn};

/// Line walls shorter than this (world units) are dropped
pub const MIN_WALL_LENGTH: f64 = 0.01;

/// Margin added around the wall footprint on every side of a slab (world units)
pub const FLOOR_PADDING: f64 = 5.0;

/// Generate the storeys of a building from the wall contours of a model
///
/// Content is centered on the world origin using the midpoint of the wall
/// bounding box. Every storey gets one prism per usable wall contour and
/// exactly one floor slab.
pub fn generate(model: &FloorplanModel, params: &BuildingParameters) -> Result<GeneratedModel> {
    params.validate()?;
    let wall_box = model.bounding_box_of_walls()?;

    let center = wall_box.center();
    let offset = Vector2::new(-center.x, -center.y) * params.planar_scale;
    let frame = PlanFrame {
        scale: params.planar_scale,
        offset,
    };

    // Walls are built once at ground level and lifted per storey
    let ground_walls: Vec<WallSolid> = model
        .walls()
        .filter_map(|contour| build_wall(contour, &frame, params))
        .collect();

    if ground_walls.is_empty() {
        return Err(FloorplanError::NoGeometry);
    }

    let slab_width = wall_box.width() * params.planar_scale + FLOOR_PADDING * 2.0;
    let slab_depth = wall_box.height() * params.planar_scale + FLOOR_PADDING * 2.0;

    let floors: Vec<FloorGroup> = (0..params.floor_count)
        .map(|index| {
            let elevation = index as f64 * params.floor_height;
            let lift = Matrix4::new_translation(&Vector3::new(0.0, elevation, 0.0));

            let walls = ground_walls
                .iter()
                .map(|wall| {
                    let mut mesh = wall.mesh.clone();
                    if index > 0 {
                        apply_transform(&mut mesh, &lift);
                    }
                    WallSolid {
                        contour_id: wall.contour_id,
                        kind: wall.kind,
                        mesh,
                    }
                })
                .collect();

            FloorGroup {
                index,
                name: format!("floor_{}", index),
                elevation,
                walls,
                slab: create_flat_quad(slab_width, slab_depth, Some(lift * plan_to_world())),
            }
        })
        .collect();

    let generated = GeneratedModel {
        floors,
        parameters: *params,
        plan_center: center,
    };

    info!(
        floors = params.floor_count,
        walls = generated.wall_count(),
        slabs = generated.slab_count(),
        triangles = generated.triangle_count(),
        skipped = model.wall_count() - ground_walls.len(),
        "Generated building"
    );

    Ok(generated)
}

/// Scale and centering applied to plan coordinates
struct PlanFrame {
    scale: f64,
    offset: Vector2<f64>,
}

impl PlanFrame {
    fn to_world(&self, p: &Point2D) -> Point2<f64> {
        Point2::from(p.to_nalgebra().coords * self.scale + self.offset)
    }
}

/// Rotation taking the local extrusion frame to world space
///
/// Local `(x, y, z)` lands on world `(x, z, -y)`: local +Z (extrusion) is
/// world up and profiles carry `-plan_y` in their Y coordinate.
// Polygon walls therefore sit at world Z = +plan_y like line walls, not at
// the Z = -plan_y of renderers that rotate polygon shapes about X by -90 deg.
fn plan_to_world() -> Matrix4<f64> {
    Matrix4::from_axis_angle(&Vector3::x_axis(), -FRAC_PI_2)
}

/// Profile vertex for a centered, scaled plan point
#[inline]
fn profile_point(p: &Point2<f64>) -> Point2<f64> {
    Point2::new(p.x, -p.y)
}

/// Extrude a single wall contour at ground level
///
/// Degenerate contours are skipped with a log line instead of failing the
/// whole run.
fn build_wall(
    contour: &Contour,
    frame: &PlanFrame,
    params: &BuildingParameters,
) -> Option<WallSolid> {
    let profile = match contour.kind {
        ContourKind::Polygon => polygon_profile(contour, frame),
        ContourKind::Line => line_profile(contour, frame, params.wall_thickness),
    }?;

    match extrude_profile(&profile, params.floor_height, Some(plan_to_world())) {
        Ok(mesh) => Some(WallSolid {
            contour_id: contour.id,
            kind: contour.kind,
            mesh,
        }),
        Err(e) => {
            warn!(id = contour.id, error = %e, "Skipping wall that cannot be extruded");
            None
        }
    }
}

fn polygon_profile(contour: &Contour, frame: &PlanFrame) -> Option<Profile2D> {
    let profile = Profile2D::from_ring(
        contour
            .points
            .iter()
            .map(|p| profile_point(&frame.to_world(p))),
    );

    if profile.outer.len() < 3 {
        debug!(id = contour.id, "Skipping polygon wall with fewer than 3 vertices");
        return None;
    }
    Some(profile)
}

/// Strip of `length x thickness` starting at the first endpoint
fn line_profile(contour: &Contour, frame: &PlanFrame, thickness: f64) -> Option<Profile2D> {
    let (start, end) = match contour.segment() {
        Some(segment) => segment,
        None => {
            debug!(id = contour.id, "Skipping malformed line wall");
            return None;
        }
    };

    let start = frame.to_world(&start);
    let end = frame.to_world(&end);
    let delta = end - start;
    let length = delta.norm();

    if length < MIN_WALL_LENGTH {
        debug!(id = contour.id, length, "Skipping zero-length line wall");
        return None;
    }

    let placement = Isometry2::new(start.coords, delta.y.atan2(delta.x));
    let placed = create_strip(length, thickness).transformed(&placement);

    Some(Profile2D::new(
        placed.outer.iter().map(profile_point).collect(),
    ))
}

/// Merge every storey into one mesh (walls and slabs)
pub fn merge_all(model: &GeneratedModel) -> Mesh {
    let mut merged = Mesh::new();
    for floor in &model.floors {
        merged.merge(&floor.combined_mesh());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ModelSource, PlanBounds};
    use approx::assert_relative_eq;

    fn room(id: u32, x0: f64, y0: f64, x1: f64, y1: f64) -> Contour {
        Contour::polygon(
            id,
            vec![
                Point2D::new(x0, y0),
                Point2D::new(x1, y0),
                Point2D::new(x1, y1),
                Point2D::new(x0, y1),
                Point2D::new(x0, y0),
            ],
        )
    }

    fn model_of(contours: Vec<Contour>) -> FloorplanModel {
        FloorplanModel::new(
            contours,
            PlanBounds {
                width: 200.0,
                height: 200.0,
            },
            ModelSource::Cad,
        )
    }

    fn sample_model() -> FloorplanModel {
        model_of(vec![
            room(0, 10.0, 10.0, 50.0, 40.0),
            Contour::line(1, Point2D::new(10.0, 60.0), Point2D::new(90.0, 60.0)),
            Contour::line(2, Point2D::new(90.0, 10.0), Point2D::new(90.0, 60.0)),
        ])
    }

    #[test]
    fn test_counts_per_floor() {
        let model = sample_model();
        let params = BuildingParameters::new(3.0, 3);

        let generated = generate(&model, &params).unwrap();
        assert_eq!(generated.floors.len(), 3);
        assert_eq!(generated.wall_count(), model.wall_count() * 3);
        assert_eq!(generated.slab_count(), 3);

        for (i, floor) in generated.floors.iter().enumerate() {
            assert_eq!(floor.index, i as u32);
            assert_eq!(floor.name, format!("floor_{}", i));
            assert_relative_eq!(floor.elevation, i as f64 * 3.0);
            let ids: Vec<u32> = floor.walls.iter().map(|w| w.contour_id).collect();
            assert_eq!(ids, vec![0, 1, 2]);
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let model = sample_model();
        let params = BuildingParameters::new(2.8, 2);

        let first = generate(&model, &params).unwrap();
        let second = generate(&model, &params).unwrap();

        assert_eq!(first.wall_count(), second.wall_count());
        assert_eq!(first.triangle_count(), second.triangle_count());
        assert_eq!(first.bounds(), second.bounds());
        assert_eq!(merge_all(&first), merge_all(&second));
    }

    #[test]
    fn test_content_is_centered() {
        let model = model_of(vec![room(0, 10.0, 10.0, 50.0, 40.0)]);
        let generated = generate(&model, &BuildingParameters::default()).unwrap();

        let walls = generated.floors[0].walls[0].mesh.bounds();
        assert_relative_eq!(walls.min.x, -1.0, epsilon = 1e-5);
        assert_relative_eq!(walls.max.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(walls.min.z, -0.75, epsilon = 1e-5);
        assert_relative_eq!(walls.max.z, 0.75, epsilon = 1e-5);
        assert_relative_eq!(walls.min.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(walls.max.y, 2.8, epsilon = 1e-5);
        assert_eq!(generated.plan_center, Point2D::new(30.0, 25.0));
    }

    #[test]
    fn test_line_wall_axes() {
        // Plan X run: length along world X
        let model = model_of(vec![Contour::line(0, Point2D::new(0.0, 0.0), Point2D::new(100.0, 0.0))]);
        let generated = generate(&model, &BuildingParameters::default()).unwrap();
        let b = generated.floors[0].walls[0].mesh.bounds();
        assert_relative_eq!(b.min.x, -2.5, epsilon = 1e-5);
        assert_relative_eq!(b.max.x, 2.5, epsilon = 1e-5);
        assert_relative_eq!(b.min.z, -0.1, epsilon = 1e-5);
        assert_relative_eq!(b.max.z, 0.1, epsilon = 1e-5);

        // Plan Y run: length along world Z
        let model = model_of(vec![Contour::line(0, Point2D::new(0.0, 0.0), Point2D::new(0.0, 100.0))]);
        let generated = generate(&model, &BuildingParameters::default()).unwrap();
        let b = generated.floors[0].walls[0].mesh.bounds();
        assert_relative_eq!(b.max.x - b.min.x, 0.2, epsilon = 1e-5);
        assert_relative_eq!(b.min.z, -2.5, epsilon = 1e-5);
        assert_relative_eq!(b.max.z, 2.5, epsilon = 1e-5);
    }

    #[test]
    fn test_polygon_walls_follow_plan_y() {
        // Room near plan y = 0, line wall at plan y = 100; center y = 50
        let model = model_of(vec![
            room(0, 0.0, 0.0, 10.0, 10.0),
            Contour::line(1, Point2D::new(0.0, 100.0), Point2D::new(10.0, 100.0)),
        ]);
        let generated = generate(&model, &BuildingParameters::default()).unwrap();

        let room = generated.floors[0].walls[0].mesh.bounds();
        assert_relative_eq!(room.min.z, -2.5, epsilon = 1e-5);
        assert_relative_eq!(room.max.z, -2.0, epsilon = 1e-5);

        let line = generated.floors[0].walls[1].mesh.bounds();
        assert_relative_eq!(line.min.z, 2.4, epsilon = 1e-5);
        assert_relative_eq!(line.max.z, 2.6, epsilon = 1e-5);
    }

    #[test]
    fn test_upper_floors_are_lifted() {
        let model = sample_model();
        let generated = generate(&model, &BuildingParameters::new(2.5, 2)).unwrap();

        let upper = &generated.floors[1];
        for wall in &upper.walls {
            let b = wall.mesh.bounds();
            assert_relative_eq!(b.min.y, 2.5, epsilon = 1e-5);
            assert_relative_eq!(b.max.y, 5.0, epsilon = 1e-5);
        }
        let slab = upper.slab.bounds();
        assert_relative_eq!(slab.min.y, 2.5, epsilon = 1e-5);
        assert_relative_eq!(slab.max.y, 2.5, epsilon = 1e-5);
    }

    #[test]
    fn test_slab_size_and_normal() {
        // Wall box 80 x 50 source units -> 4 x 2.5 world units
        let model = sample_model();
        let generated = generate(&model, &BuildingParameters::default()).unwrap();

        let slab = &generated.floors[0].slab;
        let b = slab.bounds();
        assert_relative_eq!(b.max.x - b.min.x, 4.0 + 10.0, epsilon = 1e-5);
        assert_relative_eq!(b.max.z - b.min.z, 2.5 + 10.0, epsilon = 1e-5);
        assert_relative_eq!(b.center().x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(b.center().z, 0.0, epsilon = 1e-5);
        assert_relative_eq!(slab.normals[1], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_no_walls() {
        let mut model = sample_model();
        for id in 0..3 {
            model.toggle_wall(id);
        }
        assert_eq!(
            generate(&model, &BuildingParameters::default()).unwrap_err(),
            FloorplanError::NoWalls
        );
    }

    #[test]
    fn test_zero_length_walls_give_no_geometry() {
        let model = model_of(vec![
            Contour::line(0, Point2D::new(5.0, 5.0), Point2D::new(5.0, 5.0)),
            Contour::line(1, Point2D::new(5.0, 5.0), Point2D::new(5.1, 5.0)),
        ]);
        assert_eq!(
            generate(&model, &BuildingParameters::default()).unwrap_err(),
            FloorplanError::NoGeometry
        );
    }

    #[test]
    fn test_short_walls_skipped_among_valid() {
        let model = model_of(vec![
            Contour::line(0, Point2D::new(5.0, 5.0), Point2D::new(5.0, 5.0)),
            Contour::line(1, Point2D::new(0.0, 0.0), Point2D::new(40.0, 0.0)),
        ]);
        let generated = generate(&model, &BuildingParameters::new(2.8, 2)).unwrap();
        assert_eq!(generated.wall_count(), 2);
        assert!(generated.floors.iter().all(|f| f.walls[0].contour_id == 1));
    }

    #[test]
    fn test_invalid_parameters() {
        let model = sample_model();
        let params = BuildingParameters {
            wall_thickness: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            generate(&model, &params),
            Err(FloorplanError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_non_wall_contours_are_ignored() {
        let mut model = sample_model();
        model.toggle_wall(2);
        let generated = generate(&model, &BuildingParameters::default()).unwrap();
        assert_eq!(generated.wall_count(), 2);
    }
}
