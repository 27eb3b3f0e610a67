use serde::{Deserialize, Serialize};

use super::GeoPoint;
use crate::error::PlannerError;

/// One routing-service instruction.
///
/// Only used to classify speed limits and to find slow-down points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoadStep {
    #[serde(default)]
    pub instruction: String,
    /// Maneuver type code
    #[serde(rename = "type", default)]
    pub maneuver: i64,
    /// Step length (m)
    #[serde(default)]
    pub distance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub road_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub way_type: Option<String>,
}

/// A routing-service section (ORS segment / OSRM leg): a distance plus its steps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoadSection {
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub steps: Vec<RoadStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub road_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub way_type: Option<String>,
}

impl RoadSection {
    /// Road classification label: first step's road type, then its way type, then the
    /// section's own labels.
    pub fn road_label(&self) -> Option<&str> {
        let (road, way) = match self.steps.first() {
            Some(s) if non_empty(&s.road_type).is_some() || non_empty(&s.way_type).is_some() => {
                (non_empty(&s.road_type), non_empty(&s.way_type))
            }
            _ => (non_empty(&self.road_type), non_empty(&self.way_type)),
        };
        road.or(way)
    }
}

fn non_empty(label: &Option<String>) -> Option<&str> {
    label.as_deref().filter(|l| !l.is_empty())
}

/// Fully resolved route data handed to the core
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteData {
    pub points: Vec<GeoPoint>,
    /// One altitude (m) per point
    pub elevations: Vec<f64>,
    /// Flattened steps across all sections
    pub steps: Vec<RoadStep>,
    pub sections: Vec<RoadSection>,
}

impl RouteData {
    /// Route with flat elevation and no step information
    pub fn flat(points: Vec<GeoPoint>) -> Self {
        let elevations = vec![0.0; points.len()];
        Self {
            points,
            elevations,
            steps: Vec::new(),
            sections: Vec::new(),
        }
    }

    pub fn with_elevations(mut self, elevations: Vec<f64>) -> Self {
        self.elevations = align_elevations(&self.points, elevations);
        self
    }

    pub fn with_sections(mut self, sections: Vec<RoadSection>) -> Self {
        self.steps = sections.iter().flat_map(|s| s.steps.iter().cloned()).collect();
        self.sections = sections;
        self
    }

    pub fn leg_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    pub fn has_step_info(&self) -> bool {
        !self.steps.is_empty() && !self.sections.is_empty()
    }

    pub fn check(&self) -> Result<(), PlannerError> {
        if self.points.len() < 2 {
            return Err(PlannerError::InvalidRoute(format!(
                "route needs at least 2 points, got {}",
                self.points.len()
            )));
        }
        Ok(())
    }
}

/// Elevation profile matching `points`: the given samples when the lengths agree,
/// otherwise the flat profile.
pub fn align_elevations(points: &[GeoPoint], elevations: Vec<f64>) -> Vec<f64> {
    if elevations.len() == points.len() && elevations.iter().all(|e| e.is_finite()) {
        elevations
    } else {
        vec![0.0; points.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(n: usize) -> Vec<GeoPoint> {
        (0..n).map(|i| GeoPoint::new(2.0 + i as f64 * 0.01, 48.0)).collect()
    }

    #[test]
    fn test_elevation_mismatch_falls_back_to_flat() {
        let route = RouteData::flat(points(4)).with_elevations(vec![10.0, 20.0]);
        assert_eq!(route.elevations, vec![0.0; 4]);

        let route = RouteData::flat(points(3)).with_elevations(vec![10.0, 20.0, 30.0]);
        assert_eq!(route.elevations, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_route_check() {
        assert!(RouteData::flat(points(1)).check().is_err());
        assert!(RouteData::flat(points(2)).check().is_ok());

        // Elevation gaps are repaired downstream, not rejected
        let mut short_profile = RouteData::flat(points(3));
        short_profile.elevations.pop();
        assert!(short_profile.check().is_ok());
    }

    #[test]
    fn test_road_label_precedence() {
        let section = RoadSection {
            distance: 1000.0,
            steps: vec![RoadStep {
                way_type: Some("primary".into()),
                ..Default::default()
            }],
            road_type: Some("motorway".into()),
            way_type: None,
        };
        assert_eq!(section.road_label(), Some("primary"));

        let bare = RoadSection {
            distance: 1000.0,
            steps: vec![RoadStep::default()],
            road_type: None,
            way_type: Some("residential".into()),
        };
        assert_eq!(bare.road_label(), Some("residential"));

        assert_eq!(RoadSection::default().road_label(), None);

        let blank_step = RoadSection {
            distance: 1000.0,
            steps: vec![RoadStep {
                road_type: Some(String::new()),
                way_type: Some(String::new()),
                ..Default::default()
            }],
            road_type: Some("trunk".into()),
            way_type: None,
        };
        assert_eq!(blank_step.road_label(), Some("trunk"));
    }

    #[test]
    fn test_step_deserialization() {
        let json = r#"{"instruction": "Turn left onto Rue X", "type": 0, "distance": 42.5}"#;
        let step: RoadStep = serde_json::from_str(json).unwrap();
        assert_eq!(step.maneuver, 0);
        assert_eq!(step.distance, 42.5);
        assert!(step.road_type.is_none());
    }

    #[test]
    fn test_sections_flatten_steps() {
        let sections = vec![
            RoadSection {
                distance: 10.0,
                steps: vec![RoadStep::default(), RoadStep::default()],
                ..Default::default()
            },
            RoadSection {
                distance: 5.0,
                steps: vec![RoadStep::default()],
                ..Default::default()
            },
        ];
        let route = RouteData::flat(points(3)).with_sections(sections);
        assert_eq!(route.steps.len(), 3);
        assert!(route.has_step_info());
    }
}
