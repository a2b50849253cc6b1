use thiserror::Error;

/// Everything that can end a weather query.
///
/// Each variant is terminal for the query that produced it; the controller
/// turns it into the user-visible error string via `Display`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    /// The host has no way of telling us where the device is.
    #[error("Geolocation not supported")]
    Unsupported,

    /// The user did not grant access to the device location.
    #[error("Location permission denied")]
    PermissionDenied,

    /// Non-success status in the provider payload, or a transport/parse failure.
    #[error("{0}")]
    Provider(String),

    /// The forecast horizon is too short to derive the past card.
    #[error("Not enough forecast data to summarize ({daily} daily samples, need 3)")]
    InsufficientData { daily: usize },

    /// Missing or unusable configuration, e.g. no API key.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl WeatherError {
    pub(crate) const GENERIC_PROVIDER_MESSAGE: &'static str = "Failed to fetch weather";

    /// Provider failure without a structured message from the payload.
    pub fn provider_generic() -> Self {
        Self::Provider(Self::GENERIC_PROVIDER_MESSAGE.to_string())
    }
}
