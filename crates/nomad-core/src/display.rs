use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Currency all synthesized prices are expressed in.
pub const BASE_CURRENCY: &str = "CHF";
/// Shown when an airline logo cannot be found.
pub const FALLBACK_LOGO: &str = "icon:plane";

#[derive(Error, Debug)]
pub enum LogoError {
    #[error("Logo lookup failed for {airline}: {reason}")]
    Lookup { airline: String, reason: String },
}

pub trait LogoProvider {
    fn logo_url(&self, airline: &str) -> Result<Option<String>, LogoError>;
}

/// Logo for an airline, or [`FALLBACK_LOGO`]. Failures are never surfaced.
pub fn logo_or_fallback(provider: &dyn LogoProvider, airline: &str) -> String {
    match provider.logo_url(airline) {
        Ok(Some(url)) => url,
        Ok(None) => FALLBACK_LOGO.to_string(),
        Err(e) => {
            log::debug!("Using fallback logo — airline={} error={}", airline, e);
            FALLBACK_LOGO.to_string()
        }
    }
}

pub trait CurrencyDisplay {
    /// `amount` is in [`BASE_CURRENCY`]; returns a display string in `currency`.
    fn format(&self, amount: u32, currency: &str) -> String;
}

/// Exchange rates relative to an arbitrary reference, keyed by ISO code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateTable {
    pub rates: HashMap<String, f64>,
}

impl RateTable {
    pub fn new(rates: HashMap<String, f64>) -> Self {
        Self { rates }
    }
}

impl CurrencyDisplay for RateTable {
    fn format(&self, amount: u32, currency: &str) -> String {
        if self.rates.is_empty() {
            return format!("{} {}", BASE_CURRENCY, amount);
        }
        let rate_base = self.rates.get(BASE_CURRENCY).copied().unwrap_or(1.0);
        let rate_target = self.rates.get(currency).copied().unwrap_or(1.0);
        let converted = amount as f64 * (rate_target / rate_base);
        format!("{} {}", currency, converted.round() as i64)
    }
}
