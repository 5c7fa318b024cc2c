// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::config::SynthesisConfig;
use crate::geo::CoordinateMap;
use crate::rng::RandomSource;
use crate::search::SearchRequest;
use crate::segment::{synthesize_segment, FlightSegment, LegRequest};
use crate::NomadError;
use chrono::Duration;
use serde::Serialize;
use std::collections::HashMap;

/// One complete candidate trip. The total is always derived from the segments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Itinerary {
    id: u32,
    /// 0 is the waypoint order as entered; higher values are permutations.
    path_ordering: usize,
    price_tier: f64,
    segments: Vec<FlightSegment>,
    total_price: u32,
    pub(crate) selected: bool,
}

impl Itinerary {
    pub fn new(id: u32, path_ordering: usize, price_tier: f64, segments: Vec<FlightSegment>) -> Self {
        let total_price = segments.iter().map(|s| s.price).sum();
        Self {
            id,
            path_ordering,
            price_tier,
            segments,
            total_price,
            selected: false,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn path_ordering(&self) -> usize {
        self.path_ordering
    }

    pub fn price_tier(&self) -> f64 {
        self.price_tier
    }

    pub fn segments(&self) -> &[FlightSegment] {
        &self.segments
    }

    pub fn total_price(&self) -> u32 {
        self.total_price
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn total_duration_minutes(&self) -> u32 {
        self.segments.iter().map(|s| s.duration_minutes).sum()
    }

    /// Cities in flying order: origin, then each leg's destination.
    pub fn cities(&self) -> Vec<&str> {
        self.segments
            .first()
            .map(|s| s.from.as_str())
            .into_iter()
            .chain(self.segments.iter().map(|s| s.to.as_str()))
            .collect()
    }
}

/// Waypoint orderings to synthesize: the entered order first, then the
/// permutations that follow it lexicographically, ranking cities by first
/// appearance. Repeated waypoints share a rank, so every emitted city
/// sequence is distinct and generation stops as soon as `max` is reached.
pub fn path_orderings(waypoints: &[String], max: usize) -> Vec<Vec<String>> {
    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    let mut ranks: Vec<usize> = Vec::with_capacity(waypoints.len());
    let mut names: Vec<&str> = Vec::new();
    for w in waypoints {
        let next = first_seen.len();
        let rank = *first_seen.entry(w.as_str()).or_insert_with(|| {
            names.push(w.as_str());
            next
        });
        ranks.push(rank);
    }

    let mut orderings = Vec::new();
    while orderings.len() < max {
        orderings.push(ranks.iter().map(|&r| names[r].to_string()).collect());
        if !next_permutation(&mut ranks) {
            break;
        }
    }
    orderings
}

fn next_permutation(v: &mut [usize]) -> bool {
    if v.len() < 2 {
        return false;
    }
    let mut i = v.len() - 1;
    while i > 0 && v[i - 1] >= v[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let mut j = v.len() - 1;
    while v[j] <= v[i - 1] {
        j -= 1;
    }
    v.swap(i - 1, j);
    v[i..].reverse();
    true
}

/// Builds every itinerary variant for a request whose cities are all resolved.
///
/// This is the pure half of a search: no I/O, and with a replayed or seeded
/// random source the output is fully reproducible. Returns
/// `IncompleteRequest` when any city of the request is missing from `coords`;
/// partial routes are never produced.
pub fn generate_itineraries(
    request: &SearchRequest,
    coords: &CoordinateMap,
    config: &SynthesisConfig,
    rng: &mut dyn RandomSource,
) -> Result<Vec<Itinerary>, NomadError> {
    config.validate()?;

    let missing: Vec<String> = request
        .unique_cities()
        .into_iter()
        .filter(|c| !coords.contains_key(c))
        .collect();
    if !missing.is_empty() {
        log::warn!(
            "Skipping itinerary generation, unresolved cities — missing={:?}",
            missing
        );
        return Err(NomadError::IncompleteRequest { missing });
    }

    let mut itineraries = Vec::new();
    let mut next_id = 1u32;

    for (ordering_idx, ordering) in path_orderings(&request.waypoints, config.max_path_orderings)
        .iter()
        .enumerate()
    {
        let tiers = if ordering_idx == 0 {
            &config.primary_price_tiers
        } else {
            &config.alternate_price_tiers
        };

        let chain: Vec<&str> = std::iter::once(request.origin.as_str())
            .chain(ordering.iter().map(|c| c.as_str()))
            .chain(std::iter::once(request.final_destination.as_str()))
            .collect();

        for &tier in tiers {
            let mut segments = Vec::with_capacity(chain.len() - 1);
            for (index, pair) in chain.windows(2).enumerate() {
                let (from, to) = (pair[0], pair[1]);
                let from_coord = *coords
                    .get(from)
                    .ok_or_else(|| NomadError::UnresolvedCity(from.to_string()))?;
                let to_coord = *coords
                    .get(to)
                    .ok_or_else(|| NomadError::UnresolvedCity(to.to_string()))?;
                let date = request
                    .start_date
                    .checked_add_signed(Duration::days(config.leg_day_offset(index)))
                    .unwrap_or(request.start_date);

                let leg = LegRequest {
                    index,
                    from,
                    to,
                    from_coord,
                    to_coord,
                    date,
                    price_modifier: tier,
                };
                segments.push(synthesize_segment(&leg, config, rng));
            }

            itineraries.push(Itinerary::new(next_id, ordering_idx, tier, segments));
            next_id += 1;
        }
    }

    log::info!(
        "Generated itineraries — origin={} waypoints={} count={}",
        request.origin,
        request.waypoints.len(),
        itineraries.len()
    );
    Ok(itineraries)
}
