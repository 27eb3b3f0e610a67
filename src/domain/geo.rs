use serde::{Deserialize, Serialize};

/// Mean Earth radius (m)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A route vertex as delivered by routing services: `[lon, lat]` or `[lon, lat, elevation]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
    pub elevation_m: Option<f64>,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self {
            lon,
            lat,
            elevation_m: None,
        }
    }

    pub fn with_elevation(mut self, elevation_m: f64) -> Self {
        self.elevation_m = Some(elevation_m);
        self
    }

    /// Great-circle distance in meters (haversine)
    pub fn distance_m(&self, other: &GeoPoint) -> f64 {
        haversine_m(self.lon, self.lat, other.lon, other.lat)
    }

    pub fn midpoint(&self, other: &GeoPoint) -> GeoPoint {
        GeoPoint::new((self.lon + other.lon) / 2.0, (self.lat + other.lat) / 2.0)
    }
}

impl TryFrom<Vec<f64>> for GeoPoint {
    type Error = String;

    fn try_from(v: Vec<f64>) -> Result<Self, Self::Error> {
        match v.as_slice() {
            [lon, lat] => Ok(GeoPoint::new(*lon, *lat)),
            [lon, lat, elev, ..] => Ok(GeoPoint::new(*lon, *lat).with_elevation(*elev)),
            _ => Err(format!("coordinate needs at least 2 components, got {}", v.len())),
        }
    }
}

impl From<GeoPoint> for Vec<f64> {
    fn from(p: GeoPoint) -> Self {
        match p.elevation_m {
            Some(e) => vec![p.lon, p.lat, e],
            None => vec![p.lon, p.lat],
        }
    }
}

pub fn haversine_m(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// Cumulative along-track distance (m) at every vertex, starting at 0.
pub fn cumulative_distances_m(points: &[GeoPoint]) -> Vec<f64> {
    let mut out = Vec::with_capacity(points.len().max(1));
    out.push(0.0);
    let mut acc = 0.0;
    for pair in points.windows(2) {
        acc += pair[0].distance_m(&pair[1]);
        out.push(acc);
    }
    out
}

/// Evenly spaced straight line between two points, without elevation samples.
///
/// Point count is `max(50, min(500, floor(km) * 10))`.
pub fn densify_straight_line(start: &GeoPoint, end: &GeoPoint) -> Vec<GeoPoint> {
    let d_m = start.distance_m(end);
    let n = ((d_m.max(1.0) / 1000.0) as usize * 10).min(500).max(50);

    (0..n)
        .map(|i| {
            let t = i as f64 / (n - 1) as f64;
            GeoPoint::new(
                start.lon + (end.lon - start.lon) * t,
                start.lat + (end.lat - start.lat) * t,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_paris_lyon() {
        let paris = GeoPoint::new(2.3522, 48.8566);
        let lyon = GeoPoint::new(4.8357, 45.7640);
        let d_km = paris.distance_m(&lyon) / 1000.0;
        assert!((d_km - 392.0).abs() < 3.0, "got {d_km}");
    }

    #[test]
    fn test_zero_distance() {
        let p = GeoPoint::new(2.0, 48.0);
        assert_eq!(p.distance_m(&p), 0.0);
    }

    #[test]
    fn test_coordinate_deserialization() {
        let pts: Vec<GeoPoint> = serde_json::from_str("[[2.0, 48.0], [2.1, 48.1, 35.5]]").unwrap();
        assert_eq!(pts[0].elevation_m, None);
        assert_eq!(pts[1].elevation_m, Some(35.5));

        let bad: Result<Vec<GeoPoint>, _> = serde_json::from_str("[[2.0]]");
        assert!(bad.is_err());
    }

    #[test]
    fn test_cumulative_distances() {
        let pts = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.01),
            GeoPoint::new(0.0, 0.02),
        ];
        let cum = cumulative_distances_m(&pts);
        assert_eq!(cum.len(), 3);
        assert_eq!(cum[0], 0.0);
        assert!((cum[2] - 2.0 * cum[1]).abs() < 1e-6);
    }

    #[test]
    fn test_densify_point_count() {
        // Short hop: floor at 50 points
        let a = GeoPoint::new(2.0, 48.0);
        let b = GeoPoint::new(2.001, 48.0);
        let line = densify_straight_line(&a, &b);
        assert_eq!(line.len(), 50);
        assert_eq!(line[0].lon, a.lon);
        assert!((line[49].lon - b.lon).abs() < 1e-12);
        assert!(line.iter().all(|p| p.elevation_m.is_none()));

        // Paris → Marseille (~660 km): capped at 500
        let paris = GeoPoint::new(2.3522, 48.8566);
        let marseille = GeoPoint::new(5.3698, 43.2965);
        assert_eq!(densify_straight_line(&paris, &marseille).len(), 500);
    }
}
