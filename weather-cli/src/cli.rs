use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, InquireError, Password, Select, Text};
use weather_core::{
    AppController, AppState, Config, Coordinate, GeolocationSource, LocationResolver, Phase,
    client_from_config, location::FixedLocation, resolver_from_config,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weathercards", version, about = "Past, current and upcoming weather")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the OpenWeather API key and device location access.
    Configure,

    /// Show the weather cards once, for a city or the device location.
    Show {
        /// City name; the device location is used when absent.
        city: Option<String>,

        /// Device latitude, overriding the configured geolocation.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Device longitude, overriding the configured geolocation.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Print the app state as JSON instead of cards.
        #[arg(long)]
        json: bool,
    },

    /// Search cities interactively; `:gps`, `:retry` and `:quit` are commands.
    Interactive {
        /// Start in manual mode instead of loading the device location.
        #[arg(long)]
        no_gps: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, lat, lon, json } => {
                let device = lat.zip(lon).map(|(lat, lon)| Coordinate::new(lat, lon));
                show(city, device, json).await
            }
            Command::Interactive { no_gps } => interactive(!no_gps).await,
        }
    }
}

fn build_controller(config: &Config, device: Option<Coordinate>) -> anyhow::Result<AppController> {
    let client = client_from_config(config)?;
    tracing::debug!(source = ?config.geolocation.source, "building controller");
    let resolver: Box<dyn LocationResolver> = match device {
        Some(coordinate) => Box::new(FixedLocation::new(Some(coordinate))),
        None => resolver_from_config(&config.geolocation, config.timeout())?,
    };

    Ok(AppController::new(Arc::from(resolver), Arc::from(client)))
}

async fn show(city: Option<String>, device: Option<Coordinate>, json: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let mut app = build_controller(&config, device)?;

    let state = match city {
        Some(city) => app.submit_search(&city).await,
        None => app.mount().await,
    };

    print_state(state, json)?;

    if state.phase() == Phase::Error {
        bail!("{}", state.error().unwrap_or("weather query failed"));
    }
    Ok(())
}

fn print_state(state: &AppState, json: bool) -> anyhow::Result<()> {
    if json {
        let text =
            serde_json::to_string_pretty(state).context("Failed to serialize app state")?;
        println!("{text}");
    } else if state.phase() != Phase::Error {
        println!("{}", render::render_state(state));
    }
    Ok(())
}

async fn interactive(use_gps: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let mut app = build_controller(&config, None)?.with_gps(use_gps);

    if let Some(query) = app.begin_mount() {
        println!("{}", render::render_state(app.state()));
        let outcome = query.run().await;
        app.apply(outcome);
    }
    println!("{}", render::render_state(app.state()));

    loop {
        let input = match Text::new("City (:gps, :retry, :quit):").prompt() {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        let state = match input.trim() {
            ":quit" | ":q" => break,
            ":gps" => app.use_device_location().await,
            ":retry" => app.retry().await,
            // Blank submissions are ignored.
            "" => continue,
            text => app.submit_search(text).await,
        };

        println!("{}", render::render_state(state));
    }

    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load_file()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()?;
    if !api_key.trim().is_empty() {
        config.api_key = Some(api_key.trim().to_string());
    }

    config.geolocation.allowed = Confirm::new("Allow access to the device location?")
        .with_default(config.geolocation.allowed)
        .prompt()?;

    if config.geolocation.allowed {
        let sources = vec![
            GeolocationSource::Ip,
            GeolocationSource::Fixed,
            GeolocationSource::None,
        ];
        let labels: Vec<&str> = sources.iter().map(|s| source_label(*s)).collect();
        let picked = Select::new("Where does the device location come from?", labels)
            .prompt()?;
        config.geolocation.source = sources
            .into_iter()
            .find(|s| source_label(*s) == picked)
            .unwrap_or_default();

        if config.geolocation.source == GeolocationSource::Fixed {
            config.geolocation.latitude = Some(CustomType::<f64>::new("Latitude:").prompt()?);
            config.geolocation.longitude = Some(CustomType::<f64>::new("Longitude:").prompt()?);
        }
    }

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

fn source_label(source: GeolocationSource) -> &'static str {
    match source {
        GeolocationSource::Ip => "ip (look up from public IP address)",
        GeolocationSource::Fixed => "fixed (enter coordinates now)",
        GeolocationSource::None => "none (no device location)",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn show_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from(["weathercards", "show", "--lat", "-33.9", "--lon", "18.4"])
            .expect("valid args");

        match cli.command {
            Command::Show { city, lat, lon, json } => {
                assert!(city.is_none());
                assert_eq!(lat, Some(-33.9));
                assert_eq!(lon, Some(18.4));
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn show_requires_both_coordinates() {
        assert!(Cli::try_parse_from(["weathercards", "show", "--lat", "1.0"]).is_err());
    }

    #[test]
    fn show_with_city_and_json() {
        let cli = Cli::try_parse_from(["weathercards", "show", "New York", "--json"])
            .expect("valid args");
        assert!(matches!(
            cli.command,
            Command::Show { city: Some(ref c), json: true, .. } if c == "New York"
        ));
    }

    #[test]
    fn build_controller_fails_fast_without_api_key() {
        let err = build_controller(&Config::default(), None).unwrap_err();
        assert!(err.to_string().contains("No OpenWeather API key configured"));
    }
}
