// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::config::GeocoderConfig;
use crate::geo::{Coordinate, CoordinateMap};
use crate::NomadError;
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// City name to best-match coordinate. `Ok(None)` means no match.
pub trait Geocoder: Send + Sync {
    fn lookup(&self, city: &str) -> Result<Option<Coordinate>, GeocodeError>;
}

impl<G: Geocoder + ?Sized> Geocoder for Arc<G> {
    fn lookup(&self, city: &str) -> Result<Option<Coordinate>, GeocodeError> {
        (**self).lookup(city)
    }
}

#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    #[serde(default)]
    results: Vec<OpenMeteoPlace>,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoPlace {
    latitude: f64,
    longitude: f64,
}

/// Open-Meteo city search. Single attempt per lookup, no retry.
pub struct OpenMeteoGeocoder {
    client: reqwest::blocking::Client,
    endpoint: String,
    language: String,
}

impl OpenMeteoGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            language: config.language.clone(),
        })
    }
}

impl Geocoder for OpenMeteoGeocoder {
    fn lookup(&self, city: &str) -> Result<Option<Coordinate>, GeocodeError> {
        debug!("Geocoding city — city={} endpoint={}", city, self.endpoint);
        let response: OpenMeteoResponse = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("name", city),
                ("count", "1"),
                ("language", self.language.as_str()),
                ("format", "json"),
            ])
            .send()?
            .error_for_status()?
            .json()?;

        Ok(response
            .results
            .first()
            .map(|p| Coordinate::new(p.latitude, p.longitude)))
    }
}

#[derive(Debug, Deserialize)]
struct GazetteerRow {
    name: String,
    latitude: f64,
    longitude: f64,
}

/// Offline geocoder backed by a `name,latitude,longitude` CSV file.
/// Lookups ignore case and surrounding whitespace.
#[derive(Debug, Clone, Default)]
pub struct CsvGazetteer {
    places: HashMap<String, Coordinate>,
}

impl CsvGazetteer {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, GeocodeError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, GeocodeError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut places = HashMap::new();
        for row in rdr.deserialize::<GazetteerRow>() {
            let row = row?;
            places.insert(normalize(&row.name), Coordinate::new(row.latitude, row.longitude));
        }
        debug!("Loaded gazetteer — places={}", places.len());
        Ok(Self { places })
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

impl Geocoder for CsvGazetteer {
    fn lookup(&self, city: &str) -> Result<Option<Coordinate>, GeocodeError> {
        Ok(self.places.get(&normalize(city)).copied())
    }
}

/// Shared flag telling in-flight resolution whether its results are still wanted.
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

impl Liveness {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    /// Marks the owning search as stale (view torn down or superseded).
    pub fn cancel(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct CoordinateResolver<G: Geocoder> {
    geocoder: G,
}

impl<G: Geocoder> CoordinateResolver<G> {
    pub fn new(geocoder: G) -> Self {
        Self { geocoder }
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    /// Resolves every unique name concurrently and waits for all lookups to
    /// settle. Names that fail (no match or lookup error) are absent from the
    /// result. Returns `Superseded` if `liveness` was cancelled meanwhile.
    pub fn resolve(
        &self,
        cities: &[String],
        liveness: &Liveness,
    ) -> Result<CoordinateMap, NomadError> {
        let mut seen = HashSet::new();
        let unique: Vec<&str> = cities
            .iter()
            .map(|c| c.as_str())
            .filter(|c| seen.insert(*c))
            .collect();

        info!("Resolving coordinates — cities={}", unique.len());

        let resolved: Vec<(&str, Option<Coordinate>)> = unique
            .into_par_iter()
            .map(|city| match self.geocoder.lookup(city) {
                Ok(Some(coord)) => (city, Some(coord)),
                Ok(None) => {
                    warn!("No geocoding match — city={}", city);
                    (city, None)
                }
                Err(e) => {
                    warn!("Geocoding failed — city={} error={}", city, e);
                    (city, None)
                }
            })
            .collect();

        if !liveness.is_alive() {
            info!("Discarding coordinate results for a stale search");
            return Err(NomadError::Superseded);
        }

        let map: CoordinateMap = resolved
            .into_iter()
            .filter_map(|(city, coord)| coord.map(|c| (city.to_string(), c)))
            .collect();
        debug!("Coordinate resolution settled — resolved={}", map.len());
        Ok(map)
    }
}
