// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host context owning the current floor plan, building and camera
//!
//! A session serializes every mutation through `&mut self`: loads replace the
//! model, toggles edit it in place and generation swaps the building out as a
//! whole.

use crate::building_generator;
use crate::config::FloorplanConfig;
use crate::contour_model::FloorplanModel;
use crate::error::{FloorplanError, Result};
use crate::source_adapter::{self, LineDetector};
use crate::types::{
    BuildingParameters, CadEntity, DetectionConfig, GeneratedModel, LineDetection, Point2D,
};
use crate::view_framer::{self, CameraFrame};
use tracing::{info, warn};

pub struct Session {
    config: FloorplanConfig,
    detector: Option<Box<dyn LineDetector>>,
    model: Option<FloorplanModel>,
    generated: Option<GeneratedModel>,
    camera: CameraFrame,
    status: String,
}

impl Session {
    pub fn new(config: FloorplanConfig) -> Self {
        Self {
            config: FloorplanConfig {
                detection: config.detection.clamped(),
                ..config
            },
            detector: None,
            model: None,
            generated: None,
            camera: CameraFrame::fallback(),
            status: "Ready".to_string(),
        }
    }

    pub fn config(&self) -> &FloorplanConfig {
        &self.config
    }

    pub fn model(&self) -> Option<&FloorplanModel> {
        self.model.as_ref()
    }

    pub fn generated(&self) -> Option<&GeneratedModel> {
        self.generated.as_ref()
    }

    pub fn camera(&self) -> CameraFrame {
        self.camera
    }

    /// Last user-facing status line
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Replace the model with contours from CAD entities
    ///
    /// On failure the previous model stays in place.
    pub fn load_cad(&mut self, entities: &[CadEntity]) -> Result<&FloorplanModel> {
        let model = self.report(source_adapter::from_cad_entities(entities))?;
        self.status = format!(
            "Loaded {} contours from CAD ({} walls)",
            model.len(),
            model.wall_count()
        );
        Ok(self.replace_model(model))
    }

    /// Replace the model with segments an external detector already produced
    pub fn load_detection(&mut self, detection: &LineDetection) -> &FloorplanModel {
        let model = source_adapter::from_detected_lines(detection);
        self.status = format!("Detected {} lines", model.len());
        self.replace_model(model)
    }

    /// Use `detector` for this and every later analysis
    pub fn attach_detector(&mut self, detector: Box<dyn LineDetector>) -> Result<&FloorplanModel> {
        self.detector = Some(detector);
        self.analyze()
    }

    /// Run the attached detector with the current detection config
    pub fn analyze(&mut self) -> Result<&FloorplanModel> {
        let config = self.config.detection;
        let result = match self.detector.as_deref_mut() {
            Some(detector) => source_adapter::detect_floor_plan(detector, &config),
            None => Err(FloorplanError::Source("no image loaded".to_string())),
        };
        let model = self.report(result)?;
        self.status = format!("Detected {} lines", model.len());
        Ok(self.replace_model(model))
    }

    /// Change detection tunables; re-analyzes when a detector is attached
    ///
    /// Re-analysis replaces the model, discarding any manual toggles.
    pub fn set_detection_config(&mut self, config: DetectionConfig) -> Result<()> {
        self.config.detection = config.clamped();
        if self.detector.is_some() {
            self.analyze()?;
        }
        Ok(())
    }

    /// Toggle the contour under a plan-space point
    pub fn toggle_at(&mut self, point: &Point2D) -> Option<(u32, bool)> {
        let model = self.model.as_mut()?;
        let (id, is_wall) = model.toggle_at(point)?;
        self.status = format!(
            "Contour {} {} walls ({} walls)",
            id,
            if is_wall { "added to" } else { "removed from" },
            model.wall_count()
        );
        Some((id, is_wall))
    }

    /// Replace the building parameters used by the next generation
    pub fn set_parameters(&mut self, params: BuildingParameters) -> Result<()> {
        self.report(params.validate())?;
        if params.floor_count > BuildingParameters::MAX_RECOMMENDED_FLOORS {
            warn!(
                floors = params.floor_count,
                max = BuildingParameters::MAX_RECOMMENDED_FLOORS,
                "Floor count above recommended maximum"
            );
        }
        self.config.building = params;
        Ok(())
    }

    /// Build the storeys for the current model and reframe the camera
    ///
    /// The previous building is dropped before the new one is stored. A failed
    /// generation leaves the previous building and camera untouched.
    pub fn generate(&mut self) -> Result<&GeneratedModel> {
        let result = match &self.model {
            Some(model) => building_generator::generate(model, &self.config.building),
            None => Err(FloorplanError::NoWalls),
        };
        let generated = self.report(result)?;

        drop(self.generated.take());
        self.camera = view_framer::frame(&generated.bounds(), self.config.camera_fov_degrees);
        self.status = format!(
            "Generated {} floors with {} walls",
            generated.floors.len(),
            generated.wall_count()
        );
        info!(
            floors = generated.floors.len(),
            walls = generated.wall_count(),
            camera_distance = self.camera.distance,
            "Replaced generated building"
        );

        Ok(self.generated.insert(generated))
    }

    /// Frame the current building again, or the fallback view without one
    pub fn reset_view(&mut self) -> CameraFrame {
        self.camera = match &self.generated {
            Some(generated) => {
                view_framer::frame(&generated.bounds(), self.config.camera_fov_degrees)
            }
            None => CameraFrame::fallback(),
        };
        self.camera
    }

    fn replace_model(&mut self, model: FloorplanModel) -> &FloorplanModel {
        info!(
            contours = model.len(),
            walls = model.wall_count(),
            source = ?model.source(),
            "Replaced floor plan"
        );
        self.model.insert(model)
    }

    /// Turn an error into the status line and pass it on
    fn report<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            warn!(error = %e, "Operation failed");
            self.status = format!("Error: {}", e);
        }
        result
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(FloorplanConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CadPoint, DetectedLine};
    use std::cell::Cell;
    use std::rc::Rc;

    /// Emits one horizontal line per 20 threshold units
    struct StripeDetector {
        runs: Rc<Cell<u32>>,
    }

    impl LineDetector for StripeDetector {
        fn detect(&mut self, config: &DetectionConfig) -> Result<LineDetection> {
            self.runs.set(self.runs.get() + 1);
            let count = config.threshold / 20;
            Ok(LineDetection {
                lines: (0..count)
                    .map(|i| {
                        let y = 10.0 + i as f64 * 40.0;
                        DetectedLine::new(Point2D::new(10.0, y), Point2D::new(300.0, y))
                    })
                    .collect(),
                image_width: 320,
                image_height: 240,
            })
        }
    }

    fn room_entities() -> Vec<CadEntity> {
        vec![
            CadEntity::Polyline {
                vertices: vec![
                    CadPoint::new(0.0, 0.0),
                    CadPoint::new(100.0, 0.0),
                    CadPoint::new(100.0, 80.0),
                    CadPoint::new(0.0, 80.0),
                    CadPoint::new(0.0, 0.0),
                ],
            },
            CadEntity::Line {
                start: CadPoint::new(0.0, 120.0),
                end: CadPoint::new(100.0, 120.0),
            },
        ]
    }

    #[test]
    fn test_regeneration_replaces_building() {
        let mut session = Session::default();
        session.load_cad(&room_entities()).unwrap();
        session
            .set_parameters(BuildingParameters::new(3.0, 2))
            .unwrap();

        assert_eq!(session.generate().unwrap().wall_count(), 4);
        assert_eq!(session.generate().unwrap().floors.len(), 2);
        assert_eq!(session.generated().unwrap().wall_count(), 4);
        assert!(session.status().starts_with("Generated 2 floors"));
    }

    #[test]
    fn test_generate_without_model() {
        let mut session = Session::default();
        assert_eq!(session.generate().unwrap_err(), FloorplanError::NoWalls);
        assert!(session.status().starts_with("Error:"));
        assert_eq!(session.camera(), CameraFrame::fallback());
    }

    #[test]
    fn test_failed_generation_keeps_previous_building() {
        let mut session = Session::default();
        session.load_cad(&room_entities()).unwrap();
        session.generate().unwrap();
        let camera = session.camera();

        // Click inside the room, then on the line
        assert_eq!(session.toggle_at(&Point2D::new(50.0, 50.0)), Some((0, false)));
        assert_eq!(session.toggle_at(&Point2D::new(50.0, 138.0)), Some((1, false)));

        assert_eq!(session.generate().unwrap_err(), FloorplanError::NoWalls);
        assert!(session.generated().is_some());
        assert_eq!(session.camera(), camera);
    }

    #[test]
    fn test_failed_load_keeps_previous_model() {
        let mut session = Session::default();
        session.load_cad(&room_entities()).unwrap();
        assert_eq!(
            session.load_cad(&[CadEntity::Unsupported]).unwrap_err(),
            FloorplanError::SourceEmpty
        );
        assert_eq!(session.model().unwrap().len(), 2);
    }

    #[test]
    fn test_detection_config_reanalyzes() {
        let runs = Rc::new(Cell::new(0));
        let mut session = Session::default();

        let model = session
            .attach_detector(Box::new(StripeDetector { runs: runs.clone() }))
            .unwrap();
        assert_eq!(model.len(), 2);

        session.toggle_at(&Point2D::new(100.0, 12.0));
        assert_eq!(session.model().unwrap().wall_count(), 1);

        session
            .set_detection_config(DetectionConfig {
                threshold: 100,
                min_line_length: 20,
            })
            .unwrap();
        assert_eq!(runs.get(), 2);
        // Fresh model, earlier toggles are gone
        assert_eq!(session.model().unwrap().len(), 5);
        assert_eq!(session.model().unwrap().wall_count(), 5);
    }

    #[test]
    fn test_analyze_without_detector() {
        let mut session = Session::default();
        assert!(matches!(session.analyze(), Err(FloorplanError::Source(_))));
        assert!(session.set_detection_config(DetectionConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let mut session = Session::default();
        assert!(session.set_parameters(BuildingParameters::new(2.8, 0)).is_err());
        assert_eq!(session.config().building, BuildingParameters::default());
    }

    #[test]
    fn test_reset_view() {
        let mut session = Session::default();
        assert_eq!(session.reset_view(), CameraFrame::fallback());

        session.load_detection(&LineDetection {
            lines: vec![DetectedLine::new(Point2D::new(0.0, 0.0), Point2D::new(400.0, 0.0))],
            image_width: 400,
            image_height: 100,
        });
        session.generate().unwrap();
        let framed = session.camera();
        assert_ne!(framed, CameraFrame::fallback());
        assert_eq!(session.reset_view(), framed);
    }
}
