// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::config::{GeometryConfig, NomadConfig};
use crate::geo::CoordinateMap;
use crate::geocode::{CoordinateResolver, Geocoder, Liveness};
use crate::geometry::{build_geometry, initial_view, MapView, RouteGeometry};
use crate::itinerary::{generate_itineraries, Itinerary};
use crate::ranking::{scale_price, RankedItineraries};
use crate::rng::RandomSource;
use crate::search::{PassengerConfig, SearchRequest};
use crate::NomadError;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResultsState {
    ResolvingCoordinates,
    GeneratingItineraries,
    ResolutionFailed,
    ItinerariesReady,
    ItineraryReselected,
}

/// State behind the results view for one search request.
///
/// Coordinates and itineraries are produced once; afterwards only the
/// selection and the passenger mix change, and neither triggers new lookups
/// or new synthesis.
pub struct ResultsSession {
    request: SearchRequest,
    passengers: PassengerConfig,
    liveness: Liveness,
    coordinates: CoordinateMap,
    itineraries: RankedItineraries,
    state: ResultsState,
}

impl ResultsSession {
    pub fn new(request: SearchRequest) -> Self {
        let passengers = request.passengers;
        Self {
            request,
            passengers,
            liveness: Liveness::new(),
            coordinates: CoordinateMap::new(),
            itineraries: RankedItineraries::default(),
            state: ResultsState::ResolvingCoordinates,
        }
    }

    /// Handle to cancel this session's in-flight resolution from elsewhere.
    pub fn liveness(&self) -> Liveness {
        self.liveness.clone()
    }

    /// Resolves coordinates, then generates and ranks itineraries.
    /// A superseded search returns `Superseded` and changes nothing.
    pub fn load<G: Geocoder>(
        &mut self,
        resolver: &CoordinateResolver<G>,
        config: &NomadConfig,
        rng: &mut dyn RandomSource,
    ) -> Result<ResultsState, NomadError> {
        let coords = resolver.resolve(&self.request.unique_cities(), &self.liveness)?;
        self.apply_coordinates(coords, config, rng)
    }

    pub fn apply_coordinates(
        &mut self,
        coords: CoordinateMap,
        config: &NomadConfig,
        rng: &mut dyn RandomSource,
    ) -> Result<ResultsState, NomadError> {
        // A bad configuration is not a resolution failure; leave the session as it was.
        config.synthesis.validate()?;

        self.coordinates = coords;
        self.state = ResultsState::GeneratingItineraries;

        match generate_itineraries(&self.request, &self.coordinates, &config.synthesis, rng) {
            Ok(itineraries) => {
                self.itineraries = RankedItineraries::rank(itineraries);
                self.state = if self.itineraries.is_empty() {
                    ResultsState::ResolutionFailed
                } else {
                    ResultsState::ItinerariesReady
                };
                Ok(self.state)
            }
            Err(NomadError::IncompleteRequest { .. }) => {
                self.itineraries = RankedItineraries::default();
                self.state = ResultsState::ResolutionFailed;
                Ok(self.state)
            }
            Err(e) => {
                self.itineraries = RankedItineraries::default();
                self.state = ResultsState::ResolvingCoordinates;
                Err(e)
            }
        }
    }

    pub fn select(&mut self, id: u32) -> Result<&Itinerary, NomadError> {
        let selected = self.itineraries.select(id)?;
        self.state = ResultsState::ItineraryReselected;
        Ok(selected)
    }

    /// Changes the passenger mix; totals are rescaled, segments are untouched.
    pub fn set_passengers(&mut self, passengers: PassengerConfig) -> Result<(), NomadError> {
        passengers.validate()?;
        self.passengers = passengers;
        Ok(())
    }

    pub fn passengers(&self) -> PassengerConfig {
        self.passengers
    }

    pub fn request(&self) -> &SearchRequest {
        &self.request
    }

    pub fn state(&self) -> ResultsState {
        self.state
    }

    pub fn coordinates(&self) -> &CoordinateMap {
        &self.coordinates
    }

    pub fn itineraries(&self) -> &RankedItineraries {
        &self.itineraries
    }

    pub fn selected(&self) -> Option<&Itinerary> {
        self.itineraries.selected()
    }

    /// Selected itinerary's total scaled to the current passenger mix.
    pub fn display_total(&self) -> Option<u32> {
        self.selected()
            .map(|it| scale_price(it.total_price(), &self.passengers))
    }

    pub fn geometry(&self, config: &GeometryConfig) -> Option<Result<RouteGeometry, NomadError>> {
        self.selected()
            .map(|it| build_geometry(it, &self.coordinates, config))
    }

    pub fn initial_view(&self) -> MapView {
        initial_view(&self.coordinates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use crate::rng::ReplayRandom;
    use chrono::NaiveDate;

    fn session() -> ResultsSession {
        ResultsSession::new(
            SearchRequest::builder("Zürich")
                .waypoints(["London", "Paris"])
                .start_date(NaiveDate::from_ymd_opt(2026, 10, 12).unwrap())
                .build()
                .unwrap(),
        )
    }

    fn coords(with_paris: bool) -> CoordinateMap {
        let mut m = CoordinateMap::new();
        m.insert("Zürich".to_string(), Coordinate::new(47.3769, 8.5417));
        m.insert("London".to_string(), Coordinate::new(51.5072, -0.1276));
        if with_paris {
            m.insert("Paris".to_string(), Coordinate::new(48.8566, 2.3522));
        }
        m
    }

    #[test]
    fn test_states_through_reselection() {
        let mut s = session();
        assert_eq!(s.state(), ResultsState::ResolvingCoordinates);

        let mut rng = ReplayRandom::constant(0.5);
        let state = s
            .apply_coordinates(coords(true), &NomadConfig::default(), &mut rng)
            .unwrap();
        assert_eq!(state, ResultsState::ItinerariesReady);
        assert_eq!(s.selected().map(|i| i.total_price()), Some(158));

        let priciest = s.itineraries().iter().last().map(|i| i.id()).unwrap();
        s.select(priciest).unwrap();
        assert_eq!(s.state(), ResultsState::ItineraryReselected);
        assert_eq!(s.display_total(), Some(398));
    }

    #[test]
    fn test_passenger_change_keeps_segments() {
        let mut s = session();
        let mut rng = ReplayRandom::constant(0.5);
        s.apply_coordinates(coords(true), &NomadConfig::default(), &mut rng)
            .unwrap();
        let before = s.selected().cloned().unwrap();

        s.set_passengers(PassengerConfig::new(2, 1, 1)).unwrap();
        assert_eq!(s.display_total(), Some(474));
        assert_eq!(s.selected(), Some(&before));
    }

    #[test]
    fn test_passenger_edit_without_adult_is_rejected() {
        let mut s = session();
        let mut rng = ReplayRandom::constant(0.5);
        s.apply_coordinates(coords(true), &NomadConfig::default(), &mut rng)
            .unwrap();

        let err = s
            .set_passengers(PassengerConfig::new(0, 0, 0))
            .unwrap_err();
        assert!(matches!(err, NomadError::InvalidRequest(_)));
        assert_eq!(s.passengers(), PassengerConfig::default());
        assert_eq!(s.display_total(), Some(158));
    }

    #[test]
    fn test_bad_config_keeps_session_state() {
        let mut s = session();
        let mut config = NomadConfig::default();
        config.synthesis.airlines.clear();
        let mut rng = ReplayRandom::constant(0.5);

        let err = s.apply_coordinates(coords(true), &config, &mut rng).unwrap_err();
        assert!(matches!(err, NomadError::InvalidConfig(_)));
        assert_eq!(s.state(), ResultsState::ResolvingCoordinates);
        assert!(s.coordinates().is_empty());
        assert!(s.itineraries().is_empty());
    }

    #[test]
    fn test_missing_city_fails_whole_request() {
        let mut s = session();
        let mut rng = ReplayRandom::constant(0.5);
        let state = s
            .apply_coordinates(coords(false), &NomadConfig::default(), &mut rng)
            .unwrap();
        assert_eq!(state, ResultsState::ResolutionFailed);
        assert!(s.itineraries().is_empty());
        assert!(s.display_total().is_none());
        assert!(s.geometry(&GeometryConfig::default()).is_none());
    }
}
