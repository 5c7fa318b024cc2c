use crate::config::GeometryConfig;
use crate::geo::{Coordinate, CoordinateMap};
use crate::itinerary::Itinerary;
use crate::NomadError;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopPoint {
    pub city: String,
    /// Resolved location of the city.
    pub coordinate: Coordinate,
    /// Where the marker is drawn; differs from `coordinate` for repeated stops.
    pub position: Coordinate,
    /// 1-based position in the route.
    pub sequence: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteGeometry {
    pub line: Vec<Coordinate>,
    pub stops: Vec<StopPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapView {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
}

/// Route line and labelled stops for the given itinerary.
pub fn build_geometry(
    itinerary: &Itinerary,
    coords: &CoordinateMap,
    config: &GeometryConfig,
) -> Result<RouteGeometry, NomadError> {
    let mut line = Vec::with_capacity(itinerary.segments().len() + 1);
    let mut cities = Vec::with_capacity(line.capacity());
    for city in itinerary.cities() {
        let coord = coords
            .get(city)
            .ok_or_else(|| NomadError::UnresolvedCity(city.to_string()))?;
        line.push(*coord);
        cities.push(city);
    }

    let positions = deconflict(&line, config);
    let stops = cities
        .into_iter()
        .zip(line.iter().zip(positions))
        .enumerate()
        .map(|(idx, (city, (coordinate, position)))| StopPoint {
            city: city.to_string(),
            coordinate: *coordinate,
            position,
            sequence: idx + 1,
        })
        .collect();

    Ok(RouteGeometry { line, stops })
}

/// Marker positions for an ordered stop list.
///
/// Stops are grouped by their coordinate rounded to `coincident_precision`
/// decimals. The first stop in a group stays put; the k-th repeat moves
/// `k * coincident_offset_deg` in longitude, odd repeats east and even repeats
/// west. Output depends only on the input order.
pub fn deconflict(points: &[Coordinate], config: &GeometryConfig) -> Vec<Coordinate> {
    let scale = 10f64.powi(config.coincident_precision as i32);
    let mut occurrences: HashMap<(i64, i64), u32> = HashMap::new();

    points
        .iter()
        .map(|p| {
            let key = (
                (p.latitude * scale).round() as i64,
                (p.longitude * scale).round() as i64,
            );
            let seen = occurrences.entry(key).or_insert(0);
            let repeat = *seen;
            *seen += 1;

            if repeat == 0 {
                return *p;
            }
            let side = if repeat % 2 == 1 { 1.0 } else { -1.0 };
            Coordinate::new(
                p.latitude,
                p.longitude + side * config.coincident_offset_deg * repeat as f64,
            )
        })
        .collect()
}

impl RouteGeometry {
    /// GeoJSON FeatureCollection: one LineString plus one Point per stop.
    /// Positions are `[longitude, latitude]`.
    pub fn to_geojson(&self) -> Value {
        let line: Vec<Value> = self
            .line
            .iter()
            .map(|c| json!([c.longitude, c.latitude]))
            .collect();

        let mut features = vec![json!({
            "type": "Feature",
            "properties": { "kind": "route" },
            "geometry": { "type": "LineString", "coordinates": line },
        })];
        features.extend(self.stops.iter().map(|s| {
            json!({
                "type": "Feature",
                "properties": {
                    "kind": "stop",
                    "label": s.sequence.to_string(),
                    "city": s.city,
                },
                "geometry": {
                    "type": "Point",
                    "coordinates": [s.position.longitude, s.position.latitude],
                },
            })
        }));

        json!({ "type": "FeatureCollection", "features": features })
    }
}

/// Camera for the first render: centroid of everything resolved so far.
pub fn initial_view(coords: &CoordinateMap) -> MapView {
    if coords.is_empty() {
        return MapView {
            longitude: 8.54,
            latitude: 47.37,
            zoom: 4.0,
        };
    }
    let n = coords.len() as f64;
    let (lat, lon) = coords
        .values()
        .fold((0.0, 0.0), |(lat, lon), c| (lat + c.latitude, lon + c.longitude));
    MapView {
        longitude: lon / n,
        latitude: lat / n,
        zoom: 3.5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_points_untouched() {
        let pts = vec![Coordinate::new(47.0, 8.0), Coordinate::new(51.0, 0.0)];
        assert_eq!(deconflict(&pts, &GeometryConfig::default()), pts);
    }

    #[test]
    fn test_repeats_alternate_sides() {
        let cfg = GeometryConfig {
            coincident_precision: 3,
            coincident_offset_deg: 0.1,
        };
        let p = Coordinate::new(47.3769, 8.5417);
        let out = deconflict(&[p, p, p, p], &cfg);
        assert_eq!(out[0], p);
        assert!((out[1].longitude - (p.longitude + 0.1)).abs() < 1e-9);
        assert!((out[2].longitude - (p.longitude - 0.2)).abs() < 1e-9);
        assert!((out[3].longitude - (p.longitude + 0.3)).abs() < 1e-9);
        assert!(out.iter().all(|c| c.latitude == p.latitude));
    }

    #[test]
    fn test_near_points_share_key() {
        let cfg = GeometryConfig::default();
        let a = Coordinate::new(47.37690, 8.54170);
        let b = Coordinate::new(47.37692, 8.54168);
        let out = deconflict(&[a, b], &cfg);
        assert_ne!(out[0], out[1]);
    }

    #[test]
    fn test_initial_view() {
        let empty = CoordinateMap::new();
        assert_eq!(initial_view(&empty).zoom, 4.0);

        let mut m = CoordinateMap::new();
        m.insert("A".to_string(), Coordinate::new(40.0, 0.0));
        m.insert("B".to_string(), Coordinate::new(50.0, 10.0));
        let view = initial_view(&m);
        assert!((view.latitude - 45.0).abs() < 1e-9);
        assert!((view.longitude - 5.0).abs() < 1e-9);
        assert_eq!(view.zoom, 3.5);
    }
}
