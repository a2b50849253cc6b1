//! Core library for the `weathercards` client.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Device location resolution
//! - The OpenWeather client (current conditions, 5-day forecast)
//! - Derivation of the "next days" and simulated "past" cards
//! - The app controller: owned state plus the transitions that mutate it
//!
//! It is used by `weathercards-cli`, but any presentation layer that can read
//! an [`AppState`] and call the controller actions can drive it.

pub mod config;
pub mod controller;
pub mod error;
pub mod location;
pub mod model;
pub mod provider;
pub mod summary;

pub use config::{Config, GeolocationConfig, GeolocationSource};
pub use controller::{AppController, AppState, Phase, Query, QueryOutcome};
pub use error::WeatherError;
pub use location::{LocationResolver, resolver_from_config};
pub use model::{
    Coordinate, CurrentConditions, ForecastSample, FutureSummary, Locator, PastSummary,
    PlaceQuery, WeatherView,
};
pub use provider::{WeatherClient, client_from_config};
