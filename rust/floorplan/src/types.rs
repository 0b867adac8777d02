// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for floor plan contours and generated buildings

use crate::error::{FloorplanError, Result};
use floorplan3d_geometry::{Bounds3, Mesh};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// First and last point closer than this on both axes close a path
pub const CLOSURE_TOLERANCE: f64 = 1e-3;

/// Closed outlines at or below this area (square source units) are slivers
pub const MIN_WALL_AREA: f64 = 1.0;

/// A 2D point (simplified for serialization)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_nalgebra(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    pub fn distance_to(&self, other: &Point2D) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Raw line segment reported by the external line detector (pixel space)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DetectedLine {
    pub start: Point2D,
    pub end: Point2D,
}

impl DetectedLine {
    pub fn new(start: Point2D, end: Point2D) -> Self {
        Self { start, end }
    }
}

/// One run of the external line detector over an image
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LineDetection {
    pub lines: Vec<DetectedLine>,
    /// Source image width in pixels
    pub image_width: u32,
    /// Source image height in pixels
    pub image_height: u32,
}

/// Vertex of a CAD entity; drawings may carry an elevation which is ignored
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CadPoint {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl CadPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub fn flatten(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

/// Typed geometric entity handed over by the CAD parser
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CadEntity {
    /// LWPOLYLINE / POLYLINE, vertices in drawing order
    Polyline { vertices: Vec<CadPoint> },
    /// Two-point LINE
    Line { start: CadPoint, end: CadPoint },
    /// Any entity type the floor plan does not use (text, hatches, ...)
    #[serde(other)]
    Unsupported,
}

impl CadEntity {
    /// Extract the 2D point list of this entity (empty when unsupported)
    pub fn points(&self) -> Vec<Point2D> {
        match self {
            CadEntity::Polyline { vertices } => vertices.iter().map(CadPoint::flatten).collect(),
            CadEntity::Line { start, end } => vec![start.flatten(), end.flatten()],
            CadEntity::Unsupported => Vec::new(),
        }
    }
}

/// Shape variant of a contour
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ContourKind {
    /// Open segment, exactly two points
    Line,
    /// Three or more points, closed or not
    Polygon,
}

/// Where the contours of a model came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModelSource {
    /// Vector entities from a CAD drawing, normalized with a margin
    Cad,
    /// Segments from raster line detection, in image pixels
    Detection,
}

/// A single classified 2D shape
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contour {
    pub id: u32,
    pub points: Vec<Point2D>,
    pub kind: ContourKind,
    /// Shoelace area; zero for lines and for polygons that are not closed
    pub area: f64,
    pub is_wall: bool,
}

impl Contour {
    /// Open two-point contour, a wall by default
    pub fn line(id: u32, start: Point2D, end: Point2D) -> Self {
        Self {
            id,
            points: vec![start, end],
            kind: ContourKind::Line,
            area: 0.0,
            is_wall: true,
        }
    }

    /// Polygon contour; only a closed outline with real area is a wall
    pub fn polygon(id: u32, points: Vec<Point2D>) -> Self {
        let area = if is_closed_path(&points) {
            shoelace_area(&points)
        } else {
            0.0
        };

        Self {
            id,
            points,
            kind: ContourKind::Polygon,
            area,
            is_wall: area > MIN_WALL_AREA,
        }
    }

    /// First and last point coincide within [`CLOSURE_TOLERANCE`]
    pub fn is_closed(&self) -> bool {
        self.kind == ContourKind::Polygon && is_closed_path(&self.points)
    }

    /// Endpoints of a well-formed line contour
    pub fn segment(&self) -> Option<(Point2D, Point2D)> {
        match (self.kind, self.points.as_slice()) {
            (ContourKind::Line, [start, end, ..]) => Some((*start, *end)),
            _ => None,
        }
    }
}

/// True when the path has at least three points and ends where it starts
pub fn is_closed_path(points: &[Point2D]) -> bool {
    points.len() >= 3 && endpoints_coincide(points)
}

/// First and last point within [`CLOSURE_TOLERANCE`] on both axes
///
/// Holds for any single point and for zero-length two-point paths.
pub fn endpoints_coincide(points: &[Point2D]) -> bool {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) => {
            (first.x - last.x).abs() < CLOSURE_TOLERANCE
                && (first.y - last.y).abs() < CLOSURE_TOLERANCE
        }
        _ => false,
    }
}

/// Calculate polygon area using shoelace formula
pub fn shoelace_area(points: &[Point2D]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x * points[j].y;
        area -= points[j].x * points[i].y;
    }

    (area / 2.0).abs()
}

/// Extent of the normalized coordinate space a model is drawn in
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct PlanBounds {
    pub width: f64,
    pub height: f64,
}

/// Axis-aligned rectangle in plan coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PlanRect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl PlanRect {
    /// Smallest rectangle containing every point, `None` for no points
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2D>) -> Option<Self> {
        let mut rect: Option<PlanRect> = None;
        for p in points {
            let r = rect.get_or_insert(PlanRect {
                min_x: p.x,
                min_y: p.y,
                max_x: p.x,
                max_y: p.y,
            });
            r.min_x = r.min_x.min(p.x);
            r.min_y = r.min_y.min(p.y);
            r.max_x = r.max_x.max(p.x);
            r.max_y = r.max_y.max(p.y);
        }
        rect
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point2D {
        Point2D::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

/// Parameters of one extrusion run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BuildingParameters {
    /// Storey height in world units (meters)
    pub floor_height: f64,
    /// Number of identical storeys stacked from elevation 0
    pub floor_count: u32,
    /// World units per source unit
    pub planar_scale: f64,
    /// Thickness given to walls drawn as single lines (world units)
    pub wall_thickness: f64,
}

impl BuildingParameters {
    pub const DEFAULT_FLOOR_HEIGHT: f64 = 2.8;
    pub const DEFAULT_FLOOR_COUNT: u32 = 1;
    pub const MAX_RECOMMENDED_FLOORS: u32 = 20;
    pub const PLANAR_SCALE: f64 = 0.05;
    pub const WALL_THICKNESS: f64 = 0.2;

    pub fn new(floor_height: f64, floor_count: u32) -> Self {
        Self {
            floor_height,
            floor_count,
            ..Default::default()
        }
    }

    /// Total height of the stacked storeys
    pub fn total_height(&self) -> f64 {
        self.floor_height * self.floor_count as f64
    }

    /// Reject values extrusion cannot work with
    ///
    /// Floor counts above [`Self::MAX_RECOMMENDED_FLOORS`] are allowed.
    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, value: f64| {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(FloorplanError::InvalidParameters(format!(
                    "{} must be positive, got {}",
                    name, value
                )))
            }
        };

        positive("floor_height", self.floor_height)?;
        positive("planar_scale", self.planar_scale)?;
        positive("wall_thickness", self.wall_thickness)?;

        if self.floor_count == 0 {
            return Err(FloorplanError::InvalidParameters(
                "floor_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for BuildingParameters {
    fn default() -> Self {
        Self {
            floor_height: Self::DEFAULT_FLOOR_HEIGHT,
            floor_count: Self::DEFAULT_FLOOR_COUNT,
            planar_scale: Self::PLANAR_SCALE,
            wall_thickness: Self::WALL_THICKNESS,
        }
    }
}

/// Tunables forwarded to the external line detector
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DetectionConfig {
    /// Hough accumulator vote threshold
    pub threshold: u32,
    /// Minimum segment length in pixels
    pub min_line_length: u32,
}

impl DetectionConfig {
    pub const THRESHOLD_RANGE: (u32, u32) = (10, 200);
    pub const MIN_LINE_LENGTH_RANGE: (u32, u32) = (5, 100);

    /// Copy with both values pulled into their supported ranges
    pub fn clamped(&self) -> Self {
        Self {
            threshold: self
                .threshold
                .clamp(Self::THRESHOLD_RANGE.0, Self::THRESHOLD_RANGE.1),
            min_line_length: self
                .min_line_length
                .clamp(Self::MIN_LINE_LENGTH_RANGE.0, Self::MIN_LINE_LENGTH_RANGE.1),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold: 50,
            min_line_length: 20,
        }
    }
}

/// Extruded wall solid and the contour it came from
#[derive(Debug, Clone)]
pub struct WallSolid {
    pub contour_id: u32,
    pub kind: ContourKind,
    pub mesh: Mesh,
}

/// All geometry of one storey
#[derive(Debug, Clone)]
pub struct FloorGroup {
    /// Storey index, 0 = ground
    pub index: u32,
    /// Group name handed to the renderer/exporter (`floor_<index>`)
    pub name: String,
    /// Base elevation in world units
    pub elevation: f64,
    pub walls: Vec<WallSolid>,
    pub slab: Mesh,
}

impl FloorGroup {
    /// Walls and slab merged into one buffer
    pub fn combined_mesh(&self) -> Mesh {
        let mut combined = Mesh::new();
        for wall in &self.walls {
            combined.merge(&wall.mesh);
        }
        combined.merge(&self.slab);
        combined
    }
}

/// Output of one extrusion run
#[derive(Debug, Clone)]
pub struct GeneratedModel {
    pub floors: Vec<FloorGroup>,
    /// Snapshot of the parameters the model was built with
    pub parameters: BuildingParameters,
    /// Plan-space point mapped to the world origin
    pub plan_center: Point2D,
}

impl GeneratedModel {
    /// Number of wall prisms over all storeys
    pub fn wall_count(&self) -> usize {
        self.floors.iter().map(|f| f.walls.len()).sum()
    }

    /// Number of floor slabs (one per storey)
    pub fn slab_count(&self) -> usize {
        self.floors.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.floors
            .iter()
            .map(|f| {
                f.walls.iter().map(|w| w.mesh.triangle_count()).sum::<usize>()
                    + f.slab.triangle_count()
            })
            .sum()
    }

    /// Bounding volume of every wall and slab
    pub fn bounds(&self) -> Bounds3 {
        let mut bounds = Bounds3::empty();
        for floor in &self.floors {
            for wall in &floor.walls {
                bounds.union(&wall.mesh.bounds());
            }
            bounds.union(&floor.slab.bounds());
        }
        bounds
    }

    /// Merged mesh of one storey, `None` for an unknown index
    pub fn combined_floor_mesh(&self, index: u32) -> Option<Mesh> {
        self.floors
            .iter()
            .find(|f| f.index == index)
            .map(FloorGroup::combined_mesh)
    }
}
