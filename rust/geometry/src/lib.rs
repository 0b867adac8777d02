// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floorplan3d geometry
//!
//! Mesh buffers, planar profiles and prism extrusion used to turn classified
//! floor plan contours into storey geometry. Triangulation goes through
//! earcutr, transforms through nalgebra.

pub mod bounds;
pub mod error;
pub mod extrusion;
pub mod mesh;
pub mod profile;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point2, Point3, Vector2, Vector3};

pub use bounds::Bounds3;
pub use error::{Error, Result};
pub use extrusion::{apply_transform, create_flat_quad, extrude_profile};
pub use mesh::Mesh;
pub use profile::{create_rectangle, create_strip, Profile2D};
pub use triangulation::{signed_area, triangulate_polygon};
