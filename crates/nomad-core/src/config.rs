// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::NomadError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_AIRLINES: [&str; 6] = [
    "NomadAir",
    "Swiss",
    "Lufthansa",
    "Air France",
    "British Airways",
    "easyJet",
];

/// Constants that drive segment synthesis and itinerary variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    pub airlines: Vec<String>,
    pub flight_number_prefix: String,
    pub cruise_speed_kmh: f64,
    pub ground_buffer_minutes: u32,
    pub base_fare: f64,
    pub per_km_rate: f64,
    pub jitter_amplitude: f64,
    /// Clamp for synthesized leg prices (large negative tiers/jitter).
    pub min_price: u32,
    /// Departure hours are drawn from `[start, end)`.
    pub departure_window_start_hour: u32,
    pub departure_window_end_hour: u32,
    pub leg_day_offsets: Vec<i64>,
    pub extra_leg_spacing_days: i64,
    pub primary_price_tiers: Vec<f64>,
    pub alternate_price_tiers: Vec<f64>,
    pub max_path_orderings: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            airlines: DEFAULT_AIRLINES.iter().map(|s| s.to_string()).collect(),
            flight_number_prefix: "NG".to_string(),
            cruise_speed_kmh: 850.0,
            ground_buffer_minutes: 30,
            base_fare: 50.0,
            per_km_rate: 0.08,
            jitter_amplitude: 20.0,
            min_price: 1,
            departure_window_start_hour: 6,
            departure_window_end_hour: 20,
            leg_day_offsets: vec![0, 3, 7],
            extra_leg_spacing_days: 4,
            primary_price_tiers: vec![-40.0, 0.0, 40.0],
            alternate_price_tiers: vec![-25.0, 25.0],
            max_path_orderings: 2,
        }
    }
}

impl SynthesisConfig {
    /// Day offset from the start date for leg `index`.
    pub fn leg_day_offset(&self, index: usize) -> i64 {
        if let Some(offset) = self.leg_day_offsets.get(index) {
            return *offset;
        }
        match self.leg_day_offsets.last() {
            Some(last) => {
                let beyond = (index + 1 - self.leg_day_offsets.len()) as i64;
                last + beyond * self.extra_leg_spacing_days
            }
            None => index as i64 * self.extra_leg_spacing_days,
        }
    }

    pub fn validate(&self) -> Result<(), NomadError> {
        if self.airlines.is_empty() {
            return Err(NomadError::InvalidConfig(
                "airline roster is empty".to_string(),
            ));
        }
        if self.cruise_speed_kmh <= 0.0 || !self.cruise_speed_kmh.is_finite() {
            return Err(NomadError::InvalidConfig(format!(
                "cruise speed must be positive, got {}",
                self.cruise_speed_kmh
            )));
        }
        if self.departure_window_start_hour >= self.departure_window_end_hour
            || self.departure_window_end_hour > 24
        {
            return Err(NomadError::InvalidConfig(format!(
                "departure window {}..{} is empty or past midnight",
                self.departure_window_start_hour, self.departure_window_end_hour
            )));
        }
        if self.max_path_orderings == 0 {
            return Err(NomadError::InvalidConfig(
                "max_path_orderings must be at least 1".to_string(),
            ));
        }
        check_tiers("primary_price_tiers", &self.primary_price_tiers)?;
        if self.max_path_orderings > 1 {
            check_tiers("alternate_price_tiers", &self.alternate_price_tiers)?;
        }
        Ok(())
    }
}

// Every ordering needs a cheap and a premium variant.
fn check_tiers(name: &str, tiers: &[f64]) -> Result<(), NomadError> {
    let min = tiers.iter().copied().fold(f64::INFINITY, f64::min);
    let max = tiers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if tiers.len() < 2 || min >= max {
        return Err(NomadError::InvalidConfig(format!(
            "{} needs at least one low and one high tier, got {:?}",
            name, tiers
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Decimal places used to decide whether two stops coincide.
    pub coincident_precision: u32,
    /// Longitude shift (degrees) per repeat of a coincident stop.
    pub coincident_offset_deg: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            coincident_precision: 3,
            coincident_offset_deg: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub endpoint: String,
    pub language: String,
    pub timeout_secs: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            language: "en".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NomadConfig {
    pub synthesis: SynthesisConfig,
    pub geometry: GeometryConfig,
    pub geocoder: GeocoderConfig,
}

#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config_path: crate::get_config_root().join("nomad_config.json"),
        }
    }

    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<NomadConfig> {
        if !self.config_path.exists() {
            log::debug!(
                "No config file, using defaults — path={}",
                self.config_path.display()
            );
            return Ok(NomadConfig::default());
        }

        let content =
            fs::read_to_string(&self.config_path).context("Failed to read nomad_config.json")?;
        let config: NomadConfig =
            serde_json::from_str(&content).context("Failed to parse nomad_config.json")?;
        config.synthesis.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &NomadConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
        }

        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize config")?;
        fs::write(&self.config_path, content).context("Failed to write nomad_config.json")
    }
}
