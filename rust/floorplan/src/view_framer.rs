// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Default camera placement for a generated building

use crate::error::{FloorplanError, Result};
use floorplan3d_geometry::Bounds3;
use nalgebra::{Point3, Vector3};
use tracing::debug;

/// Extra room around an exact fit
pub const FIT_PADDING: f64 = 1.5;

/// Closest the camera is ever placed to the content (world units)
pub const MIN_DISTANCE: f64 = 5.0;

/// Camera position used when there is nothing sensible to frame
pub const FALLBACK_POSITION: [f64; 3] = [50.0, 50.0, 50.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    pub position: Point3<f64>,
    pub target: Point3<f64>,
    /// Distance between position and target
    pub distance: f64,
}

impl CameraFrame {
    /// Diagonal view of the origin
    pub fn fallback() -> Self {
        let position = Point3::from(FALLBACK_POSITION);
        Self {
            position,
            target: Point3::origin(),
            distance: position.coords.norm(),
        }
    }
}

impl Default for CameraFrame {
    fn default() -> Self {
        Self::fallback()
    }
}

/// Camera distance at which the largest extent fits a vertical field of view
pub fn fit_distance(bounds: &Bounds3, fov_degrees: f64) -> Result<f64> {
    if !(fov_degrees > 0.0 && fov_degrees < 180.0) {
        return Err(FloorplanError::InvalidParameters(format!(
            "camera fov must be within (0, 180) degrees, got {}",
            fov_degrees
        )));
    }

    let max_dim = bounds.max_extent();
    if bounds.is_empty() || !max_dim.is_finite() || max_dim <= 0.0 {
        return Err(FloorplanError::DegenerateBounds);
    }

    let half_fov = fov_degrees.to_radians() / 2.0;
    let distance = (max_dim / 2.0) / half_fov.tan() * FIT_PADDING;
    Ok(distance.max(MIN_DISTANCE))
}

/// Place the camera on the diagonal of the bounding volume's center
///
/// Never fails: anything that cannot be framed gets [`CameraFrame::fallback`].
pub fn frame(bounds: &Bounds3, fov_degrees: f64) -> CameraFrame {
    match fit_distance(bounds, fov_degrees) {
        Ok(distance) => {
            let target = bounds.center();
            let offset = distance / 3f64.sqrt();
            CameraFrame {
                position: target + Vector3::repeat(offset),
                target,
                distance,
            }
        }
        Err(e) => {
            debug!(error = %e, "Using fallback camera");
            CameraFrame::fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_flat_volume_at_45_degrees() {
        let bounds = Bounds3::from_center_size(Point3::origin(), Vector3::new(10.0, 0.0, 10.0));
        let camera = frame(&bounds, 45.0);

        let expected = 5.0 / (22.5f64).to_radians().tan() * 1.5;
        assert_relative_eq!(camera.distance, expected, epsilon = 1e-9);
        assert!(camera.distance >= MIN_DISTANCE);

        let p = camera.position;
        assert_relative_eq!(p.x, p.y, epsilon = 1e-9);
        assert_relative_eq!(p.y, p.z, epsilon = 1e-9);
        assert_relative_eq!(p.coords.norm(), camera.distance, epsilon = 1e-9);
        assert_eq!(camera.target, Point3::origin());
    }

    #[test]
    fn test_tiny_volume_clamps_distance() {
        let bounds = Bounds3::from_center_size(Point3::new(1.0, 2.0, 3.0), Vector3::new(0.1, 0.1, 0.1));
        let camera = frame(&bounds, 45.0);
        assert_relative_eq!(camera.distance, MIN_DISTANCE);
        assert_relative_eq!((camera.position - camera.target).norm(), MIN_DISTANCE, epsilon = 1e-9);
        assert_relative_eq!(camera.target.y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_bounds_fall_back() {
        assert_eq!(
            fit_distance(&Bounds3::empty(), 45.0).unwrap_err(),
            FloorplanError::DegenerateBounds
        );
        let point = Bounds3::from_center_size(Point3::origin(), Vector3::zeros());
        assert_eq!(
            fit_distance(&point, 45.0).unwrap_err(),
            FloorplanError::DegenerateBounds
        );

        let camera = frame(&point, 45.0);
        assert_eq!(camera, CameraFrame::fallback());
        assert_eq!(camera.position, Point3::new(50.0, 50.0, 50.0));
    }

    #[test]
    fn test_infinite_bounds_fall_back() {
        let bounds = Bounds3::new(
            Point3::new(f64::NEG_INFINITY, 0.0, 0.0),
            Point3::new(f64::INFINITY, 1.0, 1.0),
        );
        assert_eq!(frame(&bounds, 45.0), CameraFrame::fallback());
    }

    #[test]
    fn test_invalid_fov_falls_back() {
        let bounds = Bounds3::from_center_size(Point3::origin(), Vector3::new(4.0, 4.0, 4.0));
        assert!(matches!(
            fit_distance(&bounds, 0.0),
            Err(FloorplanError::InvalidParameters(_))
        ));
        assert_eq!(frame(&bounds, 180.0), CameraFrame::fallback());
    }
}
