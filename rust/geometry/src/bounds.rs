// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned 3D bounding volumes

use nalgebra::{Point3, Vector3};

/// Axis-aligned bounding box in world space
///
/// An empty box has `min` at `+MAX` and `max` at `-MAX` so that the first
/// included point defines it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds3 {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Bounds3 {
    /// Create bounds from explicit corners
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Bounds that contain nothing yet
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::MAX, f64::MAX, f64::MAX),
            max: Point3::new(f64::MIN, f64::MIN, f64::MIN),
        }
    }

    /// Bounds of the given size centered on `center`
    pub fn from_center_size(center: Point3<f64>, size: Vector3<f64>) -> Self {
        let half = size / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// True until at least one point has been included
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Grow to contain `point`
    #[inline]
    pub fn include_point(&mut self, point: &Point3<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// Grow to contain another box
    pub fn union(&mut self, other: &Bounds3) {
        if other.is_empty() {
            return;
        }
        self.include_point(&other.min);
        self.include_point(&other.max);
    }

    /// Extent along each axis (zero for empty bounds)
    pub fn size(&self) -> Vector3<f64> {
        if self.is_empty() {
            return Vector3::zeros();
        }
        self.max - self.min
    }

    /// Midpoint of the box (origin for empty bounds)
    pub fn center(&self) -> Point3<f64> {
        if self.is_empty() {
            return Point3::origin();
        }
        nalgebra::center(&self.min, &self.max)
    }

    /// Largest of the three extents
    pub fn max_extent(&self) -> f64 {
        let size = self.size();
        size.x.max(size.y).max(size.z)
    }
}

impl Default for Bounds3 {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_bounds() {
        let bounds = Bounds3::empty();
        assert!(bounds.is_empty());
        assert_eq!(bounds.size(), Vector3::zeros());
        assert_eq!(bounds.center(), Point3::origin());
    }

    #[test]
    fn test_include_points() {
        let mut bounds = Bounds3::empty();
        bounds.include_point(&Point3::new(-1.0, 0.0, 2.0));
        bounds.include_point(&Point3::new(3.0, 4.0, -2.0));

        assert!(!bounds.is_empty());
        assert_relative_eq!(bounds.size().x, 4.0);
        assert_relative_eq!(bounds.size().y, 4.0);
        assert_relative_eq!(bounds.size().z, 4.0);
        assert_relative_eq!(bounds.center().x, 1.0);
        assert_relative_eq!(bounds.max_extent(), 4.0);
    }

    #[test]
    fn test_union_ignores_empty() {
        let mut bounds = Bounds3::from_center_size(Point3::origin(), Vector3::new(2.0, 2.0, 2.0));
        bounds.union(&Bounds3::empty());
        assert_relative_eq!(bounds.min.x, -1.0);
        assert_relative_eq!(bounds.max.z, 1.0);
    }
}
