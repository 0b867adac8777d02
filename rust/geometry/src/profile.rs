// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D Profile definitions and triangulation

use crate::error::{Error, Result};
use crate::triangulation::{signed_area, triangulate_polygon};
use nalgebra::{Isometry2, Point2};

/// Distance below which consecutive profile vertices are treated as one
const VERTEX_MERGE_TOLERANCE: f64 = 1e-9;

/// Planar profile swept by the extrusion routines
#[derive(Debug, Clone, PartialEq)]
pub struct Profile2D {
    /// Outer boundary, implicitly closed (last vertex connects to first)
    pub outer: Vec<Point2<f64>>,
}

impl Profile2D {
    /// Create a new profile
    pub fn new(outer: Vec<Point2<f64>>) -> Self {
        Self { outer }
    }

    /// Build a profile from a ring that may repeat its first vertex at the end
    ///
    /// Consecutive duplicates and the explicit closing vertex are removed so
    /// that side walls never contain zero-length edges.
    pub fn from_ring(points: impl IntoIterator<Item = Point2<f64>>) -> Self {
        let mut outer: Vec<Point2<f64>> = Vec::new();
        for p in points {
            match outer.last() {
                Some(last) if nalgebra::distance(last, &p) <= VERTEX_MERGE_TOLERANCE => {}
                _ => outer.push(p),
            }
        }
        while outer.len() > 1 {
            let first = outer[0];
            match outer.last() {
                Some(last) if nalgebra::distance(last, &first) <= VERTEX_MERGE_TOLERANCE => {
                    outer.pop();
                }
                _ => break,
            }
        }
        Self { outer }
    }

    /// Signed area of the outer boundary (positive when counter-clockwise)
    pub fn signed_area(&self) -> f64 {
        signed_area(&self.outer)
    }

    /// Absolute area of the outer boundary
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Return the profile with a counter-clockwise outer boundary
    pub fn into_ccw(mut self) -> Self {
        if self.signed_area() < 0.0 {
            self.outer.reverse();
        }
        self
    }

    /// Apply a planar rigid motion to every vertex
    pub fn transformed(&self, isometry: &Isometry2<f64>) -> Self {
        Self {
            outer: self.outer.iter().map(|p| isometry.transform_point(p)).collect(),
        }
    }

    /// Triangulate the profile
    /// Returns triangle indices into `outer`
    pub fn triangulate(&self) -> Result<Triangulation> {
        if self.outer.len() < 3 {
            return Err(Error::InvalidProfile(
                "Profile must have at least 3 vertices".to_string(),
            ));
        }

        let indices = triangulate_polygon(&self.outer)?;

        Ok(Triangulation {
            points: self.outer.clone(),
            indices,
        })
    }
}

/// Triangulated profile result
#[derive(Debug, Clone)]
pub struct Triangulation {
    /// All vertices
    pub points: Vec<Point2<f64>>,
    /// Triangle indices
    pub indices: Vec<usize>,
}

/// Create a rectangular profile centered at the origin
#[inline]
pub fn create_rectangle(width: f64, height: f64) -> Profile2D {
    let half_w = width / 2.0;
    let half_h = height / 2.0;

    Profile2D::new(vec![
        Point2::new(-half_w, -half_h),
        Point2::new(half_w, -half_h),
        Point2::new(half_w, half_h),
        Point2::new(-half_w, half_h),
    ])
}

/// Create a strip profile running from the origin along +X
///
/// `width` is centered on the X axis, so the strip covers
/// `0..length` by `-width/2..width/2`.
#[inline]
pub fn create_strip(length: f64, width: f64) -> Profile2D {
    let half_w = width / 2.0;

    Profile2D::new(vec![
        Point2::new(0.0, -half_w),
        Point2::new(length, -half_w),
        Point2::new(length, half_w),
        Point2::new(0.0, half_w),
    ])
}
