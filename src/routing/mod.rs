//! Road classification and per-leg speed assignment.

pub mod intersections;
pub mod road_class;
pub mod speed_profile;

pub use intersections::{detect_intersections, IntersectionReport, SlowdownKind, SlowdownPoint};
pub use road_class::{speed_limit_for_road_type, DEFAULT_LIMIT_KMH};
pub use speed_profile::{
    apply_slowdowns, build_segmented_speeds, profile_for_candidate, SegmentedSpeedSettings,
    SpeedProfile, MIN_ASSIGNED_SPEED_KMH,
};
