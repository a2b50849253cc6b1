use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Free-text place name, always trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceQuery(String);

impl PlaceQuery {
    /// Returns `None` for empty or whitespace-only input.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() { None } else { Some(Self(trimmed.to_string())) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlaceQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the provider is queried by.
#[derive(Debug, Clone, PartialEq)]
pub enum Locator {
    Coordinate(Coordinate),
    Place(PlaceQuery),
}

impl Locator {
    /// Query parameters selecting the location on the provider endpoints.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        match self {
            Locator::Coordinate(c) => {
                vec![("lat", c.latitude.to_string()), ("lon", c.longitude.to_string())]
            }
            Locator::Place(q) => vec![("q", q.as_str().to_string())],
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Coordinate(c) => write!(f, "({:.4}, {:.4})", c.latitude, c.longitude),
            Locator::Place(q) => write!(f, "'{q}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location_name: String,
    pub temperature_c: f64,
    pub description: String,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
}

impl CurrentConditions {
    pub fn rounded_temperature(&self) -> i64 {
        round_half_up(self.temperature_c)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    /// UNIX seconds.
    pub timestamp: i64,
    pub temperature_c: f64,
    pub description: String,
    pub humidity_pct: u8,
}

impl ForecastSample {
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }

    /// Short weekday name ("Mon", "Tue", ...) in UTC.
    pub fn weekday_label(&self) -> String {
        self.time()
            .map(|t| t.format("%a").to_string())
            .unwrap_or_else(|| "?".to_string())
    }

    pub fn rounded_temperature(&self) -> i64 {
        round_half_up(self.temperature_c)
    }
}

/// Up to three daily samples following today, oldest first.
pub type FutureSummary = Vec<ForecastSample>;

/// Simulated "past" card.
///
/// This is NOT historical data: the free provider tier has no history, so the
/// card is approximated from the first three daily forecast samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PastSummary {
    /// Unrounded average; see [`PastSummary::rounded_temperature`].
    pub temperature_c: f64,
    pub description: String,
    pub humidity_pct: u8,
}

impl PastSummary {
    pub fn rounded_temperature(&self) -> i64 {
        round_half_up(self.temperature_c)
    }
}

/// Everything the three cards render. Current and past only exist together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherView {
    pub current: CurrentConditions,
    pub past: PastSummary,
    pub future: FutureSummary,
}

/// Rounds .5 towards positive infinity, so -2.5 becomes -2.
///
/// Compares the fractional part instead of adding 0.5, which would carry
/// values just below .5 (0.49999999999999994) over to the next integer.
pub fn round_half_up(value: f64) -> i64 {
    let floor = value.floor();
    if value - floor >= 0.5 { floor as i64 + 1 } else { floor as i64 }
}
