use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        haversine_km(self, other)
    }
}

/// Resolved coordinates keyed by the city name as entered in the search.
pub type CoordinateMap = HashMap<String, Coordinate>;

/// Great-circle distance on a spherical Earth. No ellipsoid or altitude correction.
pub fn haversine_km(a: &Coordinate, b: &Coordinate) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos()
            * b.latitude.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZURICH: Coordinate = Coordinate {
        latitude: 47.3769,
        longitude: 8.5417,
    };
    const LONDON: Coordinate = Coordinate {
        latitude: 51.5072,
        longitude: -0.1276,
    };

    #[test]
    fn test_zurich_london_distance() {
        let d = haversine_km(&ZURICH, &LONDON);
        assert!((d - 776.0).abs() < 5.0, "got {}", d);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let pairs = [
            (ZURICH, LONDON),
            (Coordinate::new(-33.8688, 151.2093), Coordinate::new(40.7128, -74.006)),
            (Coordinate::new(0.0, 179.9), Coordinate::new(0.0, -179.9)),
        ];
        for (a, b) in pairs {
            assert_eq!(haversine_km(&a, &b), haversine_km(&b, &a));
        }
    }

    #[test]
    fn test_identical_points_are_zero() {
        assert_eq!(haversine_km(&ZURICH, &ZURICH), 0.0);
        assert_eq!(LONDON.distance_km(&LONDON), 0.0);
    }

    #[test]
    fn test_antimeridian_is_short() {
        let d = haversine_km(&Coordinate::new(0.0, 179.9), &Coordinate::new(0.0, -179.9));
        assert!(d < 25.0, "got {}", d);
    }
}
