use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{
    error::WeatherError,
    model::{CurrentConditions, ForecastSample, Locator},
};

use super::WeatherClient;

const CURRENT_ENDPOINT: &str = "weather";
const FORECAST_ENDPOINT: &str = "forecast";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(
        api_key: String,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let http = Client::builder().timeout(timeout).build().map_err(|e| {
            WeatherError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// GET `{base_url}/{endpoint}` and decode the payload once its `cod` says success.
    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        locator: &Locator,
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("OpenWeather {endpoint} request for {locator}");

        let mut query = locator.query_params();
        query.push(("units", "metric".to_string()));
        query.push(("appid", self.api_key.clone()));

        let res = self.http.get(&url).query(&query).send().await.map_err(|e| {
            warn!("Failed to send request to OpenWeather ({endpoint}): {e}");
            WeatherError::provider_generic()
        })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            warn!("Failed to read OpenWeather {endpoint} response body: {e}");
            WeatherError::provider_generic()
        })?;

        let envelope: OwEnvelope = serde_json::from_str(&body).map_err(|e| {
            warn!(
                "OpenWeather {endpoint} returned non-JSON body (HTTP {status}): {e}: {}",
                truncate_body(&body)
            );
            WeatherError::provider_generic()
        })?;

        let success = match &envelope.cod {
            Some(cod) => cod.is_success(),
            None => status.is_success(),
        };

        if !success {
            warn!(
                "OpenWeather {endpoint} request failed with HTTP {status}: {}",
                truncate_body(&body)
            );
            return Err(envelope.into_error());
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!("Failed to parse OpenWeather {endpoint} JSON: {e}");
            WeatherError::provider_generic()
        })
    }
}

/// `cod` is a number on `/weather` success and a string elsewhere.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OwCode {
    Number(i64),
    Text(String),
}

impl OwCode {
    fn is_success(&self) -> bool {
        match self {
            OwCode::Number(n) => *n == 200,
            OwCode::Text(s) => s.trim() == "200",
        }
    }
}

/// Fields present on every payload, success or not.
#[derive(Debug, Deserialize)]
struct OwEnvelope {
    cod: Option<OwCode>,
    // A string on errors, a number on forecast success.
    #[serde(default)]
    message: Option<serde_json::Value>,
}

impl OwEnvelope {
    fn into_error(self) -> WeatherError {
        match self.message {
            Some(serde_json::Value::String(msg)) if !msg.trim().is_empty() => {
                WeatherError::Provider(msg)
            }
            _ => WeatherError::provider_generic(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

fn first_description(weather: &[OwWeather]) -> String {
    weather
        .first()
        .map(|w| w.description.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}

#[async_trait]
impl WeatherClient for OpenWeatherClient {
    async fn fetch_current(&self, locator: &Locator) -> Result<CurrentConditions, WeatherError> {
        let parsed: OwCurrentResponse = self.get(CURRENT_ENDPOINT, locator).await?;

        Ok(CurrentConditions {
            description: first_description(&parsed.weather),
            location_name: parsed.name,
            temperature_c: parsed.main.temp,
            humidity_pct: parsed.main.humidity,
            wind_speed_mps: parsed.wind.speed,
        })
    }

    async fn fetch_forecast(
        &self,
        locator: &Locator,
    ) -> Result<Vec<ForecastSample>, WeatherError> {
        let parsed: OwForecastResponse = self.get(FORECAST_ENDPOINT, locator).await?;
        debug!("OpenWeather forecast returned {} samples", parsed.list.len());

        Ok(parsed
            .list
            .into_iter()
            .map(|entry| ForecastSample {
                timestamp: entry.dt,
                temperature_c: entry.main.temp,
                description: first_description(&entry.weather),
                humidity_pct: entry.main.humidity,
            })
            .collect())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
