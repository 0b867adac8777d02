// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for floor plan loading and building generation

use thiserror::Error;

/// Result type for floor plan operations
pub type Result<T> = std::result::Result<T, FloorplanError>;

/// Errors that can occur between loading a source and generating a building
///
/// Every variant stems from input content, so callers report them as a status
/// message instead of retrying.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FloorplanError {
    /// No entity of the source yielded usable geometry
    #[error("No usable geometry found in source")]
    SourceEmpty,

    /// No contour is currently marked as a wall
    #[error("No contour is marked as a wall")]
    NoWalls,

    /// Every wall contour was degenerate, nothing could be extruded
    #[error("No wall geometry could be generated; all walls are degenerate")]
    NoGeometry,

    /// Bounding volume has zero or non-finite extent
    #[error("Bounding volume is degenerate")]
    DegenerateBounds,

    #[error("Invalid building parameters: {0}")]
    InvalidParameters(String),

    /// The external detector or parser failed
    #[error("Source error: {0}")]
    Source(String),
}
