/// Fallback limit when no keyword matches (km/h)
pub const DEFAULT_LIMIT_KMH: f64 = 50.0;

#[derive(Debug, Clone, Copy)]
enum RoadLimit {
    /// Legal limit, further capped by the user's ceiling
    Capped(f64),
    /// Urban limit, independent of the user's ceiling
    Fixed(f64),
}

/// Keyword → limit, matched in order against the lower-cased label. First hit wins.
const ROAD_SPEED_TABLE: [(&str, RoadLimit); 8] = [
    ("motorway", RoadLimit::Capped(130.0)),
    ("trunk", RoadLimit::Capped(110.0)),
    ("primary", RoadLimit::Capped(90.0)),
    ("secondary", RoadLimit::Capped(90.0)),
    ("tertiary", RoadLimit::Capped(90.0)),
    ("unclassified", RoadLimit::Fixed(50.0)),
    ("residential", RoadLimit::Fixed(50.0)),
    ("service", RoadLimit::Fixed(30.0)),
];

/// Speed limit (km/h) for a road/way type label.
pub fn speed_limit_for_road_type(road_type: &str, user_max_kmh: f64) -> f64 {
    let label = road_type.to_lowercase();
    if label.is_empty() {
        return DEFAULT_LIMIT_KMH;
    }

    ROAD_SPEED_TABLE
        .iter()
        .find(|(keyword, _)| label.contains(keyword))
        .map(|(_, limit)| match *limit {
            RoadLimit::Capped(kmh) => kmh.min(user_max_kmh),
            RoadLimit::Fixed(kmh) => kmh,
        })
        .unwrap_or(DEFAULT_LIMIT_KMH)
}
