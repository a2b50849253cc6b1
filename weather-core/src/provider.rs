use crate::{
    Config,
    error::WeatherError,
    model::{CurrentConditions, ForecastSample, Locator},
    provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Read-only access to a weather data provider.
#[async_trait]
pub trait WeatherClient: Send + Sync + Debug {
    async fn fetch_current(&self, locator: &Locator) -> Result<CurrentConditions, WeatherError>;

    /// Raw forecast samples, ordered by time ascending.
    async fn fetch_forecast(&self, locator: &Locator)
    -> Result<Vec<ForecastSample>, WeatherError>;
}

/// Construct the OpenWeather client from config. Fails fast without an API key.
pub fn client_from_config(config: &Config) -> Result<Box<dyn WeatherClient>, WeatherError> {
    let api_key = config.require_api_key()?;
    let client = OpenWeatherClient::new(api_key.to_owned(), config.base_url(), config.timeout())?;
    Ok(Box::new(client))
}
