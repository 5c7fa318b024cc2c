// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use nomad_core::config::{ConfigManager, NomadConfig};
use nomad_core::display::{CurrencyDisplay, RateTable};
use nomad_core::geocode::{CoordinateResolver, CsvGazetteer, Geocoder, OpenMeteoGeocoder};
use nomad_core::results::{ResultsSession, ResultsState};
use nomad_core::rng::{RandomSource, SeededRandom, ThreadRandom};
use nomad_core::search::{PassengerConfig, SearchRequest};
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to nomad_config.json
    #[arg(short, long, env = "NOMAD_CONFIG")]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and rank multi-city itineraries
    Search {
        /// Departure city
        #[arg(long)]
        from: String,
        /// Waypoint city, in visiting order (repeat at least twice)
        #[arg(long = "via", required = true, num_args = 1)]
        via: Vec<String>,
        /// Final destination (defaults to the departure city)
        #[arg(long)]
        to: Option<String>,
        /// First travel day, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, default_value_t = 1)]
        adults: u32,
        #[arg(long, default_value_t = 0)]
        children: u32,
        #[arg(long, default_value_t = 0)]
        infants: u32,
        /// Seed for reproducible prices and schedules
        #[arg(long)]
        seed: Option<u64>,
        /// Offline gazetteer CSV (name,latitude,longitude)
        #[arg(long, env = "NOMAD_GAZETTEER")]
        gazetteer: Option<PathBuf>,
        /// Itinerary id to select instead of the cheapest
        #[arg(long)]
        select: Option<u32>,
        /// Display currency
        #[arg(long, default_value = "CHF")]
        currency: String,
        /// Exchange rates JSON ({"rates": {"CHF": 0.8, ...}})
        #[arg(long)]
        rates: Option<PathBuf>,
        /// Write the selected route as GeoJSON
        #[arg(long)]
        geojson: Option<PathBuf>,
        /// Print the ranked itineraries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Great-circle distance between two cities
    Distance {
        from: String,
        to: String,
        #[arg(long, env = "NOMAD_GAZETTEER")]
        gazetteer: Option<PathBuf>,
    },
    /// Show or initialise the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration to disk
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .context("Failed to initialise logging")?;

    let manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new(),
    };
    log::debug!("Using configuration — path={}", manager.path().display());

    match cli.command {
        Commands::Search {
            from,
            via,
            to,
            date,
            adults,
            children,
            infants,
            seed,
            gazetteer,
            select,
            currency,
            rates,
            geojson,
            json,
        } => {
            let config = manager.load()?;
            let mut builder = SearchRequest::builder(from)
                .waypoints(via)
                .passengers(PassengerConfig::new(adults, children, infants));
            if let Some(to) = to {
                builder = builder.final_destination(to);
            }
            if let Some(date) = date {
                builder = builder.start_date(date);
            }
            let request = builder.build()?;
            log::info!(
                "Searching — origin={} waypoints={} destination={} date={}",
                request.origin,
                request.waypoints.join(","),
                request.final_destination,
                request.start_date
            );

            let resolver = CoordinateResolver::new(make_geocoder(&config, gazetteer)?);
            let mut rng: Box<dyn RandomSource> = match seed {
                Some(seed) => Box::new(SeededRandom::new(seed)),
                None => Box::new(ThreadRandom::default()),
            };

            let mut session = ResultsSession::new(request);
            let state = session.load(&resolver, &config, rng.as_mut())?;
            if state == ResultsState::ResolutionFailed {
                log::warn!(
                    "Search produced no itineraries — cities={}",
                    session.request().unique_cities().join(",")
                );
                println!("No itineraries found.");
                return Ok(());
            }
            if let Some(id) = select {
                session.select(id)?;
            }

            let rate_table = match rates {
                Some(path) => {
                    let content = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read rates file {:?}", path))?;
                    serde_json::from_str::<RateTable>(&content)
                        .context("Failed to parse rates file")?
                }
                None => RateTable::default(),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(session.itineraries())?);
            } else {
                print_session(&session, &rate_table, &currency);
            }

            if let Some(path) = geojson {
                if let Some(geometry) = session.geometry(&config.geometry) {
                    let geometry = geometry?;
                    std::fs::write(&path, serde_json::to_string_pretty(&geometry.to_geojson())?)
                        .with_context(|| format!("Failed to write GeoJSON to {:?}", path))?;
                    log::info!("Wrote route GeoJSON — path={}", path.display());
                    println!("Route written to {:?}", path);
                }
            }
        }
        Commands::Distance {
            from,
            to,
            gazetteer,
        } => {
            let config = manager.load()?;
            let geocoder = make_geocoder(&config, gazetteer)?;
            let a = geocoder
                .lookup(&from)?
                .ok_or_else(|| anyhow::anyhow!("Could not resolve '{}'", from))?;
            let b = geocoder
                .lookup(&to)?
                .ok_or_else(|| anyhow::anyhow!("Could not resolve '{}'", to))?;
            println!("{} -> {}: {:.1} km", from, to, a.distance_km(&b));
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let config = manager.load()?;
                println!("# {}", manager.path().display());
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
            ConfigAction::Init => {
                manager.save(&NomadConfig::default())?;
                println!("Wrote default configuration to {}", manager.path().display());
            }
        },
    }

    Ok(())
}

fn make_geocoder(config: &NomadConfig, gazetteer: Option<PathBuf>) -> Result<Arc<dyn Geocoder>> {
    let geocoder: Arc<dyn Geocoder> = match gazetteer {
        Some(path) => {
            log::debug!("Using offline gazetteer — path={}", path.display());
            Arc::new(
                CsvGazetteer::from_path(&path)
                    .with_context(|| format!("Failed to load gazetteer {:?}", path))?,
            )
        }
        None => {
            log::debug!("Using online geocoder — endpoint={}", config.geocoder.endpoint);
            Arc::new(OpenMeteoGeocoder::new(&config.geocoder)?)
        }
    };
    Ok(geocoder)
}

fn print_session(session: &ResultsSession, rates: &RateTable, currency: &str) {
    let passengers = session.passengers();
    println!(
        "{} itineraries • {} passenger(s)",
        session.itineraries().len(),
        passengers.total()
    );
    for it in session.itineraries().iter() {
        let marker = if it.is_selected() { "[x]" } else { "[ ]" };
        println!(
            "{} #{} {}  {}",
            marker,
            it.id(),
            it.cities().join(" → "),
            rates.format(it.total_price(), currency)
        );
    }

    let Some(selected) = session.selected() else {
        return;
    };
    println!();
    for seg in selected.segments() {
        let next_day = if seg.arrival_day_offset > 0 {
            format!(" +{}", seg.arrival_day_offset)
        } else {
            String::new()
        };
        println!(
            "{} → {}  {}  {}-{}{}  ({})  {} {}  {}",
            seg.from,
            seg.to,
            seg.date_label(),
            seg.departure_time.format("%H:%M"),
            seg.arrival_time.format("%H:%M"),
            next_day,
            seg.duration_label(),
            seg.airline,
            seg.flight_number,
            rates.format(seg.price, currency)
        );
    }
    let flight_minutes = selected.total_duration_minutes();
    println!(
        "Total flight time: {}h {}m",
        flight_minutes / 60,
        flight_minutes % 60
    );
    if let Some(total) = session.display_total() {
        println!("Total Price: {}", rates.format(total, currency));
    }
}
