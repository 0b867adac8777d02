// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration loaded from environment variables.

use crate::types::{BuildingParameters, DetectionConfig};
use serde::{Deserialize, Serialize};

/// Default vertical field of view of the presenting camera, in degrees
pub const DEFAULT_CAMERA_FOV: f64 = 45.0;

/// Everything a session needs before the first source is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorplanConfig {
    /// Storey height, storey count, scale and line wall thickness.
    pub building: BuildingParameters,
    /// Threshold and minimum length handed to the line detector.
    pub detection: DetectionConfig,
    /// Vertical field of view used for framing, in degrees.
    pub camera_fov_degrees: f64,
}

impl FloorplanConfig {
    /// Load configuration from environment variables.
    ///
    /// Missing or unparsable values fall back to their defaults. Detection
    /// values are clamped into their supported ranges.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parse_or = |key: &str, default: f64| -> f64 {
            lookup(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };
        let parse_u32_or = |key: &str, default: u32| -> u32 {
            lookup(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };

        Self {
            building: BuildingParameters {
                floor_height: parse_or("FLOOR_HEIGHT", defaults.building.floor_height),
                floor_count: parse_u32_or("FLOOR_COUNT", defaults.building.floor_count),
                ..defaults.building
            },
            detection: DetectionConfig {
                threshold: parse_u32_or("LINE_THRESHOLD", defaults.detection.threshold),
                min_line_length: parse_u32_or(
                    "MIN_LINE_LENGTH",
                    defaults.detection.min_line_length,
                ),
            }
            .clamped(),
            camera_fov_degrees: parse_or("CAMERA_FOV", defaults.camera_fov_degrees),
        }
    }
}

impl Default for FloorplanConfig {
    fn default() -> Self {
        Self {
            building: BuildingParameters::default(),
            detection: DetectionConfig::default(),
            camera_fov_degrees: DEFAULT_CAMERA_FOV,
        }
    }
}
