use weather_core::{AppState, Phase, WeatherView};

/// Text for whatever the state currently shows.
pub fn render_state(state: &AppState) -> String {
    match (state.phase(), state.weather()) {
        (Phase::Loading, _) => "Loading...".to_string(),
        (Phase::Error, _) => format!("Error: {}", state.error().unwrap_or("unknown error")),
        (Phase::Ready, Some(view)) => render_cards(view),
        _ => "Nothing to show yet.".to_string(),
    }
}

/// The three cards: simulated past, now, next days.
pub fn render_cards(view: &WeatherView) -> String {
    let past = &view.past;
    let current = &view.current;

    let next_days = if view.future.is_empty() {
        "  no forecast beyond today\n".to_string()
    } else {
        view.future
            .iter()
            .map(|day| format!("  {}  {}°\n", day.weekday_label(), day.rounded_temperature()))
            .collect()
    };

    format!(
        "[ Last week (simulated) ]\n  {}°C\n  {}\n  Avg humidity: {}%\n\n\
         [ Now: {} ]\n  {}°C\n  {}\n  Humidity {}%   Wind {} m/s\n\n\
         [ Next days ]\n{next_days}",
        past.rounded_temperature(),
        past.description,
        past.humidity_pct,
        current.location_name,
        current.rounded_temperature(),
        current.description,
        current.humidity_pct,
        current.wind_speed_mps,
    )
}
