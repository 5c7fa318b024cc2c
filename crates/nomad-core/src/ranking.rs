use crate::itinerary::Itinerary;
use crate::search::{PassengerConfig, CHILD_FARE_RATIO, INFANT_FARE_RATIO};
use crate::NomadError;
use serde::Serialize;

/// Itineraries ordered by total price with exactly one selected (when non-empty).
#[derive(Debug, Clone, Default, Serialize)]
pub struct RankedItineraries {
    items: Vec<Itinerary>,
}

impl RankedItineraries {
    /// Stable ascending sort on total price; equal totals keep generation order.
    /// The cheapest itinerary becomes the selection.
    pub fn rank(mut itineraries: Vec<Itinerary>) -> Self {
        itineraries.sort_by_key(|i| i.total_price());
        for (idx, it) in itineraries.iter_mut().enumerate() {
            it.selected = idx == 0;
        }
        Self { items: itineraries }
    }

    pub fn select(&mut self, id: u32) -> Result<&Itinerary, NomadError> {
        let pos = self
            .items
            .iter()
            .position(|i| i.id() == id)
            .ok_or(NomadError::UnknownItinerary(id))?;
        for (idx, it) in self.items.iter_mut().enumerate() {
            it.selected = idx == pos;
        }
        Ok(&self.items[pos])
    }

    pub fn selected(&self) -> Option<&Itinerary> {
        self.items.iter().find(|i| i.is_selected())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Itinerary> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Display total for a passenger mix; `base` is the single-adult total.
pub fn scale_price(base: u32, passengers: &PassengerConfig) -> u32 {
    let base = base as f64;
    (base * passengers.adults as f64
        + base * CHILD_FARE_RATIO * passengers.children as f64
        + base * INFANT_FARE_RATIO * passengers.infants as f64)
        .round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::FlightSegment;
    use chrono::{NaiveDate, NaiveTime};

    fn itinerary(id: u32, price: u32) -> Itinerary {
        let seg = FlightSegment {
            from: "A".to_string(),
            to: "B".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            departure_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            arrival_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            arrival_day_offset: 0,
            duration_minutes: 60,
            distance_km: 300.0,
            price,
            airline: "NomadAir".to_string(),
            flight_number: "NG-100".to_string(),
        };
        Itinerary::new(id, 0, 0.0, vec![seg])
    }

    #[test]
    fn test_rank_is_ascending_and_stable() {
        let ranked = RankedItineraries::rank(vec![
            itinerary(1, 300),
            itinerary(2, 100),
            itinerary(3, 200),
            itinerary(4, 100),
        ]);
        let ids: Vec<u32> = ranked.iter().map(|i| i.id()).collect();
        assert_eq!(ids, vec![2, 4, 3, 1]);
        assert_eq!(ranked.selected().map(|i| i.id()), Some(2));
    }

    #[test]
    fn test_reselect_keeps_single_selection() {
        let mut ranked = RankedItineraries::rank(vec![itinerary(1, 300), itinerary(2, 100)]);
        ranked.select(1).unwrap();
        assert_eq!(ranked.iter().filter(|i| i.is_selected()).count(), 1);
        assert_eq!(ranked.selected().map(|i| i.id()), Some(1));
        assert_eq!(ranked.select(9).unwrap_err(), NomadError::UnknownItinerary(9));
        assert_eq!(ranked.selected().map(|i| i.id()), Some(1));
    }

    #[test]
    fn test_empty_has_no_selection() {
        let ranked = RankedItineraries::rank(vec![]);
        assert!(ranked.is_empty());
        assert!(ranked.selected().is_none());
    }

    #[test]
    fn test_scale_identity_for_one_adult() {
        for base in [0, 1, 158, 999] {
            assert_eq!(scale_price(base, &PassengerConfig::default()), base);
        }
    }

    #[test]
    fn test_scale_family() {
        // 2*100 + 0.8*100 + 0.2*100
        assert_eq!(scale_price(100, &PassengerConfig::new(2, 1, 1)), 300);
        // 2*158 + 126.4 + 31.6
        assert_eq!(scale_price(158, &PassengerConfig::new(2, 1, 1)), 474);
        // 33*0.8 = 26.4 → 26
        assert_eq!(scale_price(33, &PassengerConfig::new(0, 1, 0)), 26);
    }
}
