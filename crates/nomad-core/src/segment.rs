use crate::config::SynthesisConfig;
use crate::geo::{haversine_km, Coordinate};
use crate::rng::RandomSource;
use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSegment {
    pub from: String,
    pub to: String,
    pub date: NaiveDate,
    pub departure_time: NaiveTime,
    pub arrival_time: NaiveTime,
    /// Days between departure and arrival (0 unless the flight crosses midnight).
    pub arrival_day_offset: i64,
    pub duration_minutes: u32,
    pub distance_km: f64,
    /// Whole units of the base currency.
    pub price: u32,
    pub airline: String,
    pub flight_number: String,
}

impl FlightSegment {
    /// e.g. `"1h 25m"`
    pub fn duration_label(&self) -> String {
        format!("{}h {}m", self.duration_minutes / 60, self.duration_minutes % 60)
    }

    /// e.g. `"Mon, 12 Oct"`
    pub fn date_label(&self) -> String {
        self.date.format("%a, %d %b").to_string()
    }
}

/// Everything needed to synthesize one leg. Coordinates must already be resolved.
#[derive(Debug, Clone)]
pub struct LegRequest<'a> {
    pub index: usize,
    pub from: &'a str,
    pub to: &'a str,
    pub from_coord: Coordinate,
    pub to_coord: Coordinate,
    pub date: NaiveDate,
    pub price_modifier: f64,
}

/// Derives duration, schedule and price for one leg.
///
/// Samples are drawn in a fixed order (departure hour, departure minute,
/// price jitter, airline) so a replayed source reproduces the segment exactly.
pub fn synthesize_segment(
    leg: &LegRequest<'_>,
    config: &SynthesisConfig,
    rng: &mut dyn RandomSource,
) -> FlightSegment {
    let distance_km = haversine_km(&leg.from_coord, &leg.to_coord);
    let duration_minutes =
        (distance_km / config.cruise_speed_kmh * 60.0).round() as u32 + config.ground_buffer_minutes;

    let departure_time = draw_departure(config, rng);
    let (arrival_time, overflow_secs) =
        departure_time.overflowing_add_signed(Duration::minutes(duration_minutes as i64));

    let jitter = (rng.next_f64() * 2.0 - 1.0) * config.jitter_amplitude;
    let raw_price =
        (config.base_fare + distance_km * config.per_km_rate + leg.price_modifier + jitter).round();
    let price = if raw_price < config.min_price as f64 {
        log::debug!(
            "Clamping synthesized price — leg={}->{} raw={} min={}",
            leg.from,
            leg.to,
            raw_price,
            config.min_price
        );
        config.min_price
    } else {
        raw_price as u32
    };

    let airline_idx = ((rng.next_f64() * config.airlines.len() as f64) as usize)
        .min(config.airlines.len().saturating_sub(1));
    let airline = config
        .airlines
        .get(airline_idx)
        .cloned()
        .unwrap_or_else(|| "NomadAir".to_string());

    FlightSegment {
        from: leg.from.to_string(),
        to: leg.to.to_string(),
        date: leg.date,
        departure_time,
        arrival_time,
        arrival_day_offset: overflow_secs / 86_400,
        duration_minutes,
        distance_km,
        price,
        airline,
        flight_number: format!("{}-{}", config.flight_number_prefix, 100 + leg.index),
    }
}

fn draw_departure(config: &SynthesisConfig, rng: &mut dyn RandomSource) -> NaiveTime {
    let start = config.departure_window_start_hour;
    let span = config
        .departure_window_end_hour
        .saturating_sub(start)
        .max(1);
    let hour = (start + (rng.next_f64() * span as f64) as u32).min(23);
    let minute = ((rng.next_f64() * 60.0) as u32).min(59);
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}
