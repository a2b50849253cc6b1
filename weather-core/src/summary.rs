//! Derives the "next days" and simulated "past" cards from raw forecast samples.
//!
//! The provider returns 3-hourly samples, so every 8th sample is taken as the
//! representative of one day. Input is assumed sorted by time, ascending.

use crate::{
    error::WeatherError,
    model::{ForecastSample, FutureSummary, PastSummary},
};

/// 24h / 3h forecast resolution.
pub const DAILY_STRIDE: usize = 8;

/// Number of days after today shown on the future card.
pub const FUTURE_DAYS: usize = 3;

/// Number of daily samples averaged into the past card.
pub const PAST_WINDOW: usize = 3;

/// One sample per day: indices 0, 8, 16, ...
pub fn daily_samples(samples: &[ForecastSample]) -> Vec<ForecastSample> {
    samples.iter().step_by(DAILY_STRIDE).cloned().collect()
}

/// Daily samples 1..=3. Empty when there is no day after today.
pub fn future_summary(daily: &[ForecastSample]) -> FutureSummary {
    daily.iter().skip(1).take(FUTURE_DAYS).cloned().collect()
}

/// Simulated past card: average temperature over the first three daily
/// samples, description and humidity of the first one.
pub fn past_summary(daily: &[ForecastSample]) -> Result<PastSummary, WeatherError> {
    if daily.len() < PAST_WINDOW {
        return Err(WeatherError::InsufficientData { daily: daily.len() });
    }

    let window = &daily[..PAST_WINDOW];
    let avg = window.iter().map(|s| s.temperature_c).sum::<f64>() / PAST_WINDOW as f64;
    let first = &window[0];

    Ok(PastSummary {
        temperature_c: avg,
        description: first.description.clone(),
        humidity_pct: first.humidity_pct,
    })
}

pub fn summarize(
    samples: &[ForecastSample],
) -> Result<(FutureSummary, PastSummary), WeatherError> {
    let daily = daily_samples(samples);
    let past = past_summary(&daily)?;
    Ok((future_summary(&daily), past))
}
