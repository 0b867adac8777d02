// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Owned collection of classified contours

use crate::error::{FloorplanError, Result};
use crate::hit_test;
use crate::types::{Contour, ModelSource, PlanBounds, PlanRect, Point2D};
use rustc_hash::FxHashMap;
use tracing::debug;

/// Contours of one loaded source plus the extent of their coordinate space
///
/// A model is built once per load and only ever mutated through
/// [`FloorplanModel::toggle_wall`].
#[derive(Debug, Clone)]
pub struct FloorplanModel {
    contours: Vec<Contour>,
    /// Contour id -> position in `contours`
    index: FxHashMap<u32, usize>,
    bounds: PlanBounds,
    source: ModelSource,
}

impl FloorplanModel {
    pub fn new(contours: Vec<Contour>, bounds: PlanBounds, source: ModelSource) -> Self {
        let index = contours
            .iter()
            .enumerate()
            .map(|(pos, contour)| (contour.id, pos))
            .collect();

        Self {
            contours,
            index,
            bounds,
            source,
        }
    }

    /// Contours in insertion order
    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    pub fn get(&self, id: u32) -> Option<&Contour> {
        self.index.get(&id).map(|&pos| &self.contours[pos])
    }

    pub fn bounds(&self) -> PlanBounds {
        self.bounds
    }

    pub fn source(&self) -> ModelSource {
        self.source
    }

    pub fn len(&self) -> usize {
        self.contours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    /// Number of contours currently marked as walls
    pub fn wall_count(&self) -> usize {
        self.walls().count()
    }

    pub fn walls(&self) -> impl Iterator<Item = &Contour> {
        self.contours.iter().filter(|c| c.is_wall)
    }

    /// Flip the wall flag of a contour
    ///
    /// Returns the new flag, or `None` (and changes nothing) for an unknown id.
    pub fn toggle_wall(&mut self, id: u32) -> Option<bool> {
        let pos = *self.index.get(&id)?;
        let contour = &mut self.contours[pos];
        contour.is_wall = !contour.is_wall;
        debug!(id, is_wall = contour.is_wall, "Toggled contour");
        Some(contour.is_wall)
    }

    /// Pick the contour under `point` and toggle it
    ///
    /// Returns the picked id and its new flag.
    pub fn toggle_at(&mut self, point: &Point2D) -> Option<(u32, bool)> {
        let id = hit_test::pick(point, &self.contours)?;
        self.toggle_wall(id).map(|is_wall| (id, is_wall))
    }

    /// Extent of every point of every wall contour
    pub fn bounding_box_of_walls(&self) -> Result<PlanRect> {
        PlanRect::from_points(self.walls().flat_map(|c| c.points.iter()))
            .ok_or(FloorplanError::NoWalls)
    }
}
