// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Normalization of detected segments and CAD entities into contours

use crate::contour_model::FloorplanModel;
use crate::error::{FloorplanError, Result};
use crate::types::{
    endpoints_coincide, CadEntity, Contour, DetectionConfig, LineDetection, ModelSource,
    PlanBounds, PlanRect, Point2D,
};
use tracing::{debug, info};

/// Margin added around CAD content, as a fraction of its larger extent
pub const CAD_PADDING_RATIO: f64 = 0.1;

/// External raster line detector (edge detection + probabilistic Hough)
///
/// Implementations run on whatever image they were built with; the config is
/// the only thing that changes between runs.
pub trait LineDetector {
    fn detect(&mut self, config: &DetectionConfig) -> Result<LineDetection>;
}

/// Build a model from detected segments
///
/// Each segment becomes one wall line. Coordinates stay in image pixels and
/// the bounds are the image dimensions.
pub fn from_detected_lines(detection: &LineDetection) -> FloorplanModel {
    let contours: Vec<Contour> = detection
        .lines
        .iter()
        .enumerate()
        .map(|(i, line)| Contour::line(i as u32, line.start, line.end))
        .collect();

    info!(
        lines = contours.len(),
        width = detection.image_width,
        height = detection.image_height,
        "Built floor plan from detected lines"
    );

    FloorplanModel::new(
        contours,
        PlanBounds {
            width: detection.image_width as f64,
            height: detection.image_height as f64,
        },
        ModelSource::Detection,
    )
}

/// Run the detector and build a fresh model from its output
pub fn detect_floor_plan(
    detector: &mut dyn LineDetector,
    config: &DetectionConfig,
) -> Result<FloorplanModel> {
    let config = config.clamped();
    debug!(
        threshold = config.threshold,
        min_line_length = config.min_line_length,
        "Running line detection"
    );
    let detection = detector.detect(&config)?;
    Ok(from_detected_lines(&detection))
}

/// Build a model from CAD entities
///
/// Points are shifted so the content minimum lands on `(padding, padding)`
/// with `padding = 0.1 * max(width, height)`. Closed outlines become polygon
/// contours (walls when their area exceeds one square unit), everything open
/// becomes wall lines.
pub fn from_cad_entities(entities: &[CadEntity]) -> Result<FloorplanModel> {
    let all_points: Vec<Vec<Point2D>> = entities.iter().map(CadEntity::points).collect();

    // Single points still widen the extent even though they yield no contour
    let extent =
        PlanRect::from_points(all_points.iter().flatten()).ok_or(FloorplanError::SourceEmpty)?;

    let shapes: Vec<Vec<Point2D>> = all_points
        .into_iter()
        .filter(|points| points.len() >= 2)
        .collect();

    let dropped = entities.len() - shapes.len();
    if dropped > 0 {
        debug!(dropped, "Skipped CAD entities without usable points");
    }
    if shapes.is_empty() {
        return Err(FloorplanError::SourceEmpty);
    }

    let width = extent.width();
    let height = extent.height();
    let padding = width.max(height) * CAD_PADDING_RATIO;

    let mut contours = Vec::with_capacity(shapes.len());
    for shape in shapes {
        let points = normalize_points(&shape, &extent, padding);
        push_cad_contours(&mut contours, points);
    }

    let walls = contours.iter().filter(|c| c.is_wall).count();
    info!(
        entities = entities.len(),
        contours = contours.len(),
        walls,
        width,
        height,
        padding,
        "Built floor plan from CAD entities"
    );

    Ok(FloorplanModel::new(
        contours,
        PlanBounds {
            width: width + padding * 2.0,
            height: height + padding * 2.0,
        },
        ModelSource::Cad,
    ))
}

/// `p' = p - min + padding`
fn normalize_points(points: &[Point2D], extent: &PlanRect, padding: f64) -> Vec<Point2D> {
    points
        .iter()
        .map(|p| Point2D::new(p.x - extent.min_x + padding, p.y - extent.min_y + padding))
        .collect()
}

/// Classify one normalized point list and append its contour(s)
///
/// A list that ends where it starts is a polygon, even a zero-length LINE
/// (which then has no area and is not a wall). Open polylines are split into
/// one line per vertex pair so every line contour keeps exactly two points;
/// zero-length pairs from repeated vertices are skipped.
fn push_cad_contours(contours: &mut Vec<Contour>, points: Vec<Point2D>) {
    if endpoints_coincide(&points) {
        let id = contours.len() as u32;
        contours.push(Contour::polygon(id, points));
        return;
    }

    for pair in points.windows(2) {
        if endpoints_coincide(pair) {
            continue;
        }
        let id = contours.len() as u32;
        contours.push(Contour::line(id, pair[0], pair[1]));
    }
}
