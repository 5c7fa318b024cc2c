use crate::NomadError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Fare share charged for a child relative to an adult.
pub const CHILD_FARE_RATIO: f64 = 0.8;
/// Fare share charged for an infant relative to an adult.
pub const INFANT_FARE_RATIO: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassengerConfig {
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
}

impl Default for PassengerConfig {
    fn default() -> Self {
        Self {
            adults: 1,
            children: 0,
            infants: 0,
        }
    }
}

impl PassengerConfig {
    pub fn new(adults: u32, children: u32, infants: u32) -> Self {
        Self {
            adults,
            children,
            infants,
        }
    }

    pub fn total(&self) -> u32 {
        self.adults + self.children + self.infants
    }

    /// Every booking needs at least one adult.
    pub fn validate(&self) -> Result<(), NomadError> {
        if self.adults < 1 {
            return Err(NomadError::InvalidRequest(
                "at least one adult must travel".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub origin: String,
    pub waypoints: Vec<String>,
    pub final_destination: String,
    pub start_date: NaiveDate,
    pub passengers: PassengerConfig,
}

impl SearchRequest {
    pub fn builder(origin: impl Into<String>) -> SearchRequestBuilder {
        SearchRequestBuilder {
            origin: origin.into(),
            waypoints: Vec::new(),
            final_destination: None,
            start_date: None,
            passengers: PassengerConfig::default(),
        }
    }

    /// Origin, waypoints in request order, then the final destination.
    pub fn route_chain(&self) -> Vec<&str> {
        std::iter::once(self.origin.as_str())
            .chain(self.waypoints.iter().map(|w| w.as_str()))
            .chain(std::iter::once(self.final_destination.as_str()))
            .collect()
    }

    /// Every city the request needs, deduplicated in first-seen order.
    pub fn unique_cities(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.route_chain()
            .into_iter()
            .filter(|c| seen.insert(*c))
            .map(|c| c.to_string())
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct SearchRequestBuilder {
    origin: String,
    waypoints: Vec<String>,
    final_destination: Option<String>,
    start_date: Option<NaiveDate>,
    passengers: PassengerConfig,
}

impl SearchRequestBuilder {
    pub fn waypoint(mut self, city: impl Into<String>) -> Self {
        self.waypoints.push(city.into());
        self
    }

    pub fn waypoints<I, S>(mut self, cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.waypoints.extend(cities.into_iter().map(Into::into));
        self
    }

    pub fn final_destination(mut self, city: impl Into<String>) -> Self {
        self.final_destination = Some(city.into());
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn passengers(mut self, passengers: PassengerConfig) -> Self {
        self.passengers = passengers;
        self
    }

    /// Fills defaults (round trip, today) and checks the request shape.
    pub fn build(self) -> Result<SearchRequest, NomadError> {
        let origin = self.origin.trim().to_string();
        if origin.is_empty() {
            return Err(NomadError::InvalidRequest("origin is empty".to_string()));
        }
        if self.waypoints.len() < 2 {
            return Err(NomadError::InvalidRequest(format!(
                "at least two waypoints are required, got {}",
                self.waypoints.len()
            )));
        }
        if self.waypoints.iter().any(|w| w.trim().is_empty()) {
            return Err(NomadError::InvalidRequest(
                "waypoint names must not be empty".to_string(),
            ));
        }
        self.passengers.validate()?;

        let final_destination = self
            .final_destination
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| origin.clone());

        Ok(SearchRequest {
            origin,
            waypoints: self
                .waypoints
                .into_iter()
                .map(|w| w.trim().to_string())
                .collect(),
            final_destination,
            start_date: self
                .start_date
                .unwrap_or_else(|| chrono::Local::now().date_naive()),
            passengers: self.passengers,
        })
    }
}
