// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

pub mod config;
pub mod display;
pub mod geo;
pub mod geocode;
pub mod geometry;
pub mod itinerary;
pub mod ranking;
pub mod results;
pub mod rng;
pub mod search;
pub mod segment;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NomadError {
    #[error("Invalid search request: {0}")]
    InvalidRequest(String),
    #[error("Could not resolve coordinates for: {}", missing.join(", "))]
    IncompleteRequest { missing: Vec<String> },
    #[error("City has no resolved coordinate: {0}")]
    UnresolvedCity(String),
    #[error("Search was superseded before coordinate resolution finished")]
    Superseded,
    #[error("No itinerary with id {0}")]
    UnknownItinerary(u32),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root directory for persisted settings (`nomad_config.json`).
/// Falls back to the working directory when no home directory is known.
pub fn get_config_root() -> PathBuf {
    directories::ProjectDirs::from("org", "nomad", "Nomad-Route")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_request_message_lists_cities() {
        let err = NomadError::IncompleteRequest {
            missing: vec!["Atlantis".to_string(), "El Dorado".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Could not resolve coordinates for: Atlantis, El Dorado"
        );
    }
}
