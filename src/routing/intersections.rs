use serde::{Deserialize, Serialize};
use strum::Display;

use crate::domain::RoadStep;

/// Instruction keywords marking an intersection (English and French).
const INTERSECTION_KEYWORDS: [&str; 32] = [
    "tournez", "tourner", "turn", "tourné", "tournant",
    "roundabout", "rond-point", "rond point", "round-about",
    "bifurquez", "bifurcation", "fork", "bifurquer",
    "u-turn", "demi-tour", "uturn",
    "merge", "mergez", "fusion",
    "jonction", "junction", "join",
    "quittez", "exit", "sortie",
    "continuez", "continue",
    "prenez", "take",
    "intersection", "croisement", "crossing",
];

const ROUNDABOUT_KEYWORDS: [&str; 3] = ["roundabout", "rond-point", "rond point"];

/// Maneuver codes treated as sharp turns
const SHARP_MANEUVER_CODES: [i64; 6] = [1, 2, 3, 4, 5, 6];

/// Sharp maneuvers only slow the car when the step is shorter than this (m)
const SHARP_TURN_MAX_DISTANCE_M: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SlowdownKind {
    Roundabout,
    SharpTurn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlowdownPoint {
    pub kind: SlowdownKind,
    pub step_index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntersectionReport {
    /// Indices of steps whose instruction names an intersection
    pub intersections: Vec<usize>,
    pub slowdown_points: Vec<SlowdownPoint>,
}

/// Heuristic scan of step instructions and maneuver codes.
pub fn detect_intersections(steps: &[RoadStep]) -> IntersectionReport {
    let mut report = IntersectionReport::default();

    for (i, step) in steps.iter().enumerate() {
        let instr = step.instruction.to_lowercase();

        if INTERSECTION_KEYWORDS.iter().any(|k| instr.contains(k)) {
            report.intersections.push(i);
        }

        if ROUNDABOUT_KEYWORDS.iter().any(|k| instr.contains(k)) {
            report.slowdown_points.push(SlowdownPoint {
                kind: SlowdownKind::Roundabout,
                step_index: i,
            });
        }

        if SHARP_MANEUVER_CODES.contains(&step.maneuver) && step.distance < SHARP_TURN_MAX_DISTANCE_M {
            report.slowdown_points.push(SlowdownPoint {
                kind: SlowdownKind::SharpTurn,
                step_index: i,
            });
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(instruction: &str, maneuver: i64, distance: f64) -> RoadStep {
        RoadStep {
            instruction: instruction.to_string(),
            maneuver,
            distance,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_steps() {
        assert_eq!(detect_intersections(&[]), IntersectionReport::default());
    }

    #[test]
    fn test_keywords_in_both_languages() {
        let steps = vec![
            step("Head north on Main Street", 11, 500.0),
            step("Turn right onto Rue de Rivoli", 1, 300.0),
            step("Au rond-point, prenez la 2e sortie", 7, 800.0),
            step("Keep straight", 6, 2000.0),
            step("Railway crossing ahead", 12, 400.0),
        ];
        let report = detect_intersections(&steps);
        assert_eq!(report.intersections, vec![1, 2, 4]);
        assert_eq!(
            report.slowdown_points,
            vec![SlowdownPoint {
                kind: SlowdownKind::Roundabout,
                step_index: 2
            }]
        );
    }

    #[test]
    fn test_sharp_turn_needs_short_step() {
        let steps = vec![
            step("", 3, 99.9),
            step("", 3, 100.0),
            step("", 0, 10.0),
            step("", 7, 10.0),
        ];
        let report = detect_intersections(&steps);
        assert!(report.intersections.is_empty());
        assert_eq!(
            report.slowdown_points,
            vec![SlowdownPoint {
                kind: SlowdownKind::SharpTurn,
                step_index: 0
            }]
        );
    }

    #[test]
    fn test_roundabout_sharp_turn_both_recorded_in_order() {
        let steps = vec![step("Enter the roundabout", 2, 40.0)];
        let report = detect_intersections(&steps);
        assert_eq!(report.intersections, vec![0]);
        let kinds: Vec<_> = report.slowdown_points.iter().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![SlowdownKind::Roundabout, SlowdownKind::SharpTurn]);
    }
}
