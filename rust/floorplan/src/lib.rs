// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floor plan contour classification and multi-storey 3D reconstruction
//!
//! This crate provides the pipeline for:
//! 1. Normalizing detected line segments or CAD entities into contours
//! 2. Classifying contours as walls and toggling them by picking
//! 3. Extruding wall contours into per-storey prisms and floor slabs
//! 4. Framing the generated building with a default camera
//!
//! # Usage
//!
//! ```rust,ignore
//! use floorplan3d::{
//!     building_generator::generate, source_adapter::from_cad_entities,
//!     view_framer::frame, BuildingParameters, Point2D,
//! };
//!
//! let mut model = from_cad_entities(&entities)?;
//! model.toggle_at(&Point2D::new(120.0, 80.0));
//!
//! let building = generate(&model, &BuildingParameters::new(2.8, 3))?;
//! let camera = frame(&building.bounds(), 45.0);
//! ```

pub mod building_generator;
pub mod config;
pub mod contour_model;
#[cfg(feature = "dxf")]
pub mod dxf_import;
pub mod error;
pub mod session;
pub mod source_adapter;
pub mod types;
pub mod view_framer;

// Re-export commonly used types and functions
pub use building_generator::{generate, merge_all};
pub use config::FloorplanConfig;
pub use contour_model::FloorplanModel;
pub use error::{FloorplanError, Result};
pub use hit_test::pick;
pub use session::Session;
pub use source_adapter::{detect_floor_plan, from_cad_entities, from_detected_lines, LineDetector};
pub use types::{
    BuildingParameters, CadEntity, CadPoint, Contour, ContourKind, DetectedLine, DetectionConfig,
    FloorGroup, GeneratedModel, LineDetection, ModelSource, PlanBounds, PlanRect, Point2D,
    WallSolid,
};
pub use view_framer::{frame, CameraFrame};
