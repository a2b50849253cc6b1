//! Device location as a single-shot async operation.
//!
//! A terminal host has no browser-style geolocation prompt, so the
//! "capability" is whatever the configuration grants: a fixed coordinate,
//! an IP-based lookup, or nothing at all.

use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    config::{GeolocationConfig, GeolocationSource},
    error::WeatherError,
    model::Coordinate,
};

#[async_trait]
pub trait LocationResolver: Send + Sync + Debug {
    /// Ask the host for the current position once. No retries.
    async fn resolve_by_gps(&self) -> Result<Coordinate, WeatherError>;
}

/// Position supplied up front; `None` means the host has no location capability.
#[derive(Debug, Clone, Default)]
pub struct FixedLocation {
    coordinate: Option<Coordinate>,
}

impl FixedLocation {
    pub fn new(coordinate: Option<Coordinate>) -> Self {
        Self { coordinate }
    }
}

#[async_trait]
impl LocationResolver for FixedLocation {
    async fn resolve_by_gps(&self) -> Result<Coordinate, WeatherError> {
        self.coordinate.ok_or(WeatherError::Unsupported)
    }
}

/// The user declined location access.
#[derive(Debug, Clone, Default)]
pub struct DeniedLocation;

#[async_trait]
impl LocationResolver for DeniedLocation {
    async fn resolve_by_gps(&self) -> Result<Coordinate, WeatherError> {
        Err(WeatherError::PermissionDenied)
    }
}

/// Approximate position from an ip-api compatible endpoint.
#[derive(Debug, Clone)]
pub struct IpGeolocation {
    url: String,
    http: Client,
}

impl IpGeolocation {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, WeatherError> {
        let http = Client::builder().timeout(timeout).build().map_err(|e| {
            WeatherError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self { url: url.into(), http })
    }
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    message: Option<String>,
}

#[async_trait]
impl LocationResolver for IpGeolocation {
    async fn resolve_by_gps(&self) -> Result<Coordinate, WeatherError> {
        debug!("looking up device location via {}", self.url);

        let parsed: IpLookupResponse = match self.http.get(&self.url).send().await {
            Ok(res) => res.json().await.map_err(|e| {
                warn!("IP geolocation returned an unreadable body: {e}");
                WeatherError::Unsupported
            })?,
            Err(e) => {
                warn!("IP geolocation request failed: {e}");
                return Err(WeatherError::Unsupported);
            }
        };

        match (parsed.status.as_str(), parsed.lat, parsed.lon) {
            ("success", Some(lat), Some(lon)) => Ok(Coordinate::new(lat, lon)),
            _ => {
                warn!(
                    "IP geolocation failed: status={} message={}",
                    parsed.status,
                    parsed.message.as_deref().unwrap_or("-")
                );
                Err(WeatherError::Unsupported)
            }
        }
    }
}

/// Construct the resolver the configuration asks for.
pub fn resolver_from_config(
    config: &GeolocationConfig,
    timeout: Duration,
) -> Result<Box<dyn LocationResolver>, WeatherError> {
    if !config.allowed {
        return Ok(Box::new(DeniedLocation));
    }

    let boxed: Box<dyn LocationResolver> = match config.source {
        GeolocationSource::Fixed => Box::new(FixedLocation::new(config.fixed_coordinate())),
        GeolocationSource::Ip => Box::new(IpGeolocation::new(config.ip_lookup_url(), timeout)?),
        GeolocationSource::None => Box::new(FixedLocation::new(None)),
    };

    Ok(boxed)
}
