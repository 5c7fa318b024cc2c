// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz
//
// Regression tests for map geometry: stop labels, coincident-stop offsets,
// and the GeoJSON handed to the map widget.

use chrono::NaiveDate;
use nomad_core::config::{GeometryConfig, SynthesisConfig};
use nomad_core::geo::{Coordinate, CoordinateMap};
use nomad_core::geometry::{build_geometry, deconflict};
use nomad_core::itinerary::{generate_itineraries, Itinerary};
use nomad_core::rng::ReplayRandom;
use nomad_core::search::SearchRequest;
use nomad_core::NomadError;

fn coords() -> CoordinateMap {
    let mut m = CoordinateMap::new();
    m.insert("Zürich".to_string(), Coordinate::new(47.3769, 8.5417));
    m.insert("London".to_string(), Coordinate::new(51.5072, -0.1276));
    m.insert("Paris".to_string(), Coordinate::new(48.8566, 2.3522));
    m
}

fn round_trip() -> Itinerary {
    let req = SearchRequest::builder("Zürich")
        .waypoints(["London", "Paris"])
        .start_date(NaiveDate::from_ymd_opt(2026, 10, 12).unwrap())
        .build()
        .unwrap();
    let mut rng = ReplayRandom::constant(0.5);
    generate_itineraries(&req, &coords(), &SynthesisConfig::default(), &mut rng)
        .unwrap()
        .remove(0)
}

#[test]
fn test_round_trip_stops_are_labelled_in_order() {
    let geo = build_geometry(&round_trip(), &coords(), &GeometryConfig::default()).unwrap();

    assert_eq!(geo.line.len(), 4);
    assert_eq!(geo.line.first(), geo.line.last());
    let labels: Vec<usize> = geo.stops.iter().map(|s| s.sequence).collect();
    assert_eq!(labels, vec![1, 2, 3, 4]);
    let cities: Vec<&str> = geo.stops.iter().map(|s| s.city.as_str()).collect();
    assert_eq!(cities, vec!["Zürich", "London", "Paris", "Zürich"]);
}

#[test]
fn test_return_to_origin_is_offset() {
    let geo = build_geometry(&round_trip(), &coords(), &GeometryConfig::default()).unwrap();
    let first = &geo.stops[0];
    let last = &geo.stops[3];

    assert_eq!(first.coordinate, last.coordinate);
    assert_eq!(first.position, first.coordinate);
    assert_ne!(first.position, last.position);
    // The route line still closes on the real coordinate.
    assert_eq!(geo.line[3], first.coordinate);
}

#[test]
fn test_identical_pair_gets_distinct_positions() {
    let p = Coordinate::new(48.8566, 2.3522);
    let cfg = GeometryConfig::default();
    let a = deconflict(&[p, p], &cfg);
    let b = deconflict(&[p, p], &cfg);

    assert_ne!(a[0], a[1]);
    assert_eq!(a, b);
}

#[test]
fn test_geojson_shape() {
    let geo = build_geometry(&round_trip(), &coords(), &GeometryConfig::default()).unwrap();
    let json = geo.to_geojson();

    assert_eq!(json["type"], "FeatureCollection");
    let features = json["features"].as_array().unwrap();
    assert_eq!(features.len(), 5);
    assert_eq!(features[0]["geometry"]["type"], "LineString");
    // [lng, lat]
    assert_eq!(features[0]["geometry"]["coordinates"][1][0], -0.1276);
    assert_eq!(features[0]["geometry"]["coordinates"][1][1], 51.5072);
    assert_eq!(features[2]["properties"]["label"], "2");
    assert_eq!(features[2]["properties"]["city"], "London");
}

#[test]
fn test_missing_coordinate_is_an_error() {
    let mut partial = coords();
    partial.remove("Paris");
    let err = build_geometry(&round_trip(), &partial, &GeometryConfig::default()).unwrap_err();
    assert_eq!(err, NomadError::UnresolvedCity("Paris".to_string()));
}
