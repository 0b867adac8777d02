// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! DXF drawings to CAD entities (LINE, LWPOLYLINE, POLYLINE)

use crate::error::{FloorplanError, Result};
use crate::types::{CadEntity, CadPoint};
use dxf::entities::EntityType;
use dxf::Drawing;
use tracing::debug;

/// Load a DXF file and extract its floor plan entities
pub fn load_dxf(path: &str) -> Result<Vec<CadEntity>> {
    let drawing =
        Drawing::load_file(path).map_err(|e| FloorplanError::Source(format!("{}: {}", path, e)))?;
    Ok(entities_from_drawing(&drawing))
}

/// Convert every entity of a drawing
///
/// Closed polylines get their first vertex repeated at the end so that the
/// closure test sees them as closed. Other entity types map to
/// [`CadEntity::Unsupported`].
pub fn entities_from_drawing(drawing: &Drawing) -> Vec<CadEntity> {
    let entities: Vec<CadEntity> = drawing
        .entities()
        .map(|entity| match &entity.specific {
            EntityType::Line(line) => CadEntity::Line {
                start: CadPoint::new(line.p1.x, line.p1.y),
                end: CadPoint::new(line.p2.x, line.p2.y),
            },
            EntityType::LwPolyline(pl) => polyline(
                pl.vertices.iter().map(|v| CadPoint::new(v.x, v.y)).collect(),
                pl.is_closed(),
            ),
            EntityType::Polyline(pl) => polyline(
                pl.vertices()
                    .map(|v| CadPoint::new(v.location.x, v.location.y))
                    .collect(),
                pl.is_closed(),
            ),
            _ => CadEntity::Unsupported,
        })
        .collect();

    debug!(
        entities = entities.len(),
        unsupported = entities
            .iter()
            .filter(|e| matches!(e, CadEntity::Unsupported))
            .count(),
        "Read DXF entities"
    );
    entities
}

fn polyline(mut vertices: Vec<CadPoint>, closed: bool) -> CadEntity {
    if closed && vertices.len() >= 3 {
        let first = vertices[0];
        if vertices.last() != Some(&first) {
            vertices.push(first);
        }
    }
    CadEntity::Polyline { vertices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{is_closed_path, Point2D};

    #[test]
    fn test_closed_flag_repeats_first_vertex() {
        let square = vec![
            CadPoint::new(0.0, 0.0),
            CadPoint::new(5.0, 0.0),
            CadPoint::new(5.0, 5.0),
            CadPoint::new(0.0, 5.0),
        ];
        let entity = polyline(square.clone(), true);
        let points: Vec<Point2D> = entity.points();
        assert_eq!(points.len(), 5);
        assert!(is_closed_path(&points));

        let open = polyline(square, false);
        assert_eq!(open.points().len(), 4);
    }

    #[test]
    fn test_already_closed_ring_untouched() {
        let ring = vec![
            CadPoint::new(0.0, 0.0),
            CadPoint::new(5.0, 0.0),
            CadPoint::new(5.0, 5.0),
            CadPoint::new(0.0, 0.0),
        ];
        assert_eq!(polyline(ring, true).points().len(), 4);
    }

    #[test]
    fn test_drawing_conversion() {
        use dxf::entities::{Entity, Line};
        use dxf::Point;

        let mut drawing = Drawing::new();
        drawing.add_entity(Entity::new(EntityType::Line(Line::new(
            Point::new(0.0, 0.0, 0.0),
            Point::new(10.0, 0.0, 0.0),
        ))));

        let entities = entities_from_drawing(&drawing);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].points()[1], Point2D::new(10.0, 0.0));
    }
}
