//! App state and the transitions that mutate it.
//!
//! Every query moves through three steps:
//! 1. `begin_*` bumps the query generation and enters `Loading`,
//! 2. [`Query::run`] does the network work without touching the state,
//! 3. [`AppController::apply`] lands the outcome, unless a newer query has
//!    been started in the meantime.
//!
//! Nothing is cancelled; superseded outcomes are simply dropped in step 3.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    error::WeatherError,
    location::LocationResolver,
    model::{CurrentConditions, ForecastSample, Locator, PastSummary, PlaceQuery, WeatherView},
    provider::WeatherClient,
    summary,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Error,
}

/// Read-only snapshot handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppState {
    weather: Option<WeatherView>,
    loading: bool,
    error: Option<String>,
    search_text: String,
    use_gps: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            weather: None,
            loading: false,
            error: None,
            search_text: String::new(),
            use_gps: true,
        }
    }
}

impl AppState {
    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.error.is_some() {
            Phase::Error
        } else if self.weather.is_some() {
            Phase::Ready
        } else {
            Phase::Idle
        }
    }

    pub fn weather(&self) -> Option<&WeatherView> {
        self.weather.as_ref()
    }

    pub fn current(&self) -> Option<&CurrentConditions> {
        self.weather.as_ref().map(|w| &w.current)
    }

    pub fn past(&self) -> Option<&PastSummary> {
        self.weather.as_ref().map(|w| &w.past)
    }

    pub fn future(&self) -> &[ForecastSample] {
        self.weather.as_ref().map(|w| w.future.as_slice()).unwrap_or_default()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn use_gps(&self) -> bool {
        self.use_gps
    }
}

#[derive(Debug, Clone)]
enum Target {
    Device,
    Place(PlaceQuery),
}

/// One in-flight query. Owns everything it needs, so several may run at once.
#[derive(Debug)]
pub struct Query {
    generation: u64,
    target: Target,
    resolver: Arc<dyn LocationResolver>,
    client: Arc<dyn WeatherClient>,
}

#[derive(Debug)]
pub struct QueryOutcome {
    generation: u64,
    result: Result<WeatherView, WeatherError>,
}

impl QueryOutcome {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn result(&self) -> &Result<WeatherView, WeatherError> {
        &self.result
    }
}

impl Query {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub async fn run(self) -> QueryOutcome {
        let result = self.fetch().await;
        QueryOutcome { generation: self.generation, result }
    }

    async fn fetch(&self) -> Result<WeatherView, WeatherError> {
        let locator = match &self.target {
            Target::Device => Locator::Coordinate(self.resolver.resolve_by_gps().await?),
            Target::Place(q) => Locator::Place(q.clone()),
        };

        // Forecast only after current succeeded.
        let current = self.client.fetch_current(&locator).await?;
        let samples = self.client.fetch_forecast(&locator).await?;
        let (future, past) = summary::summarize(&samples)?;

        Ok(WeatherView { current, past, future })
    }
}

#[derive(Debug)]
pub struct AppController {
    state: AppState,
    generation: u64,
    // Last submitted search; `search_text` may have been edited since.
    last_search: Option<PlaceQuery>,
    resolver: Arc<dyn LocationResolver>,
    client: Arc<dyn WeatherClient>,
}

impl AppController {
    pub fn new(resolver: Arc<dyn LocationResolver>, client: Arc<dyn WeatherClient>) -> Self {
        Self {
            state: AppState::default(),
            generation: 0,
            last_search: None,
            resolver,
            client,
        }
    }

    /// Start in manual (search) mode instead of GPS mode.
    pub fn with_gps(mut self, use_gps: bool) -> Self {
        self.state.use_gps = use_gps;
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Input binding; never starts a query.
    pub fn set_search_text(&mut self, text: &str) {
        self.state.search_text = text.to_string();
    }

    /// On mount the GPS path runs only in GPS mode.
    pub fn begin_mount(&mut self) -> Option<Query> {
        self.state.use_gps.then(|| self.begin(Target::Device))
    }

    pub fn begin_device_location(&mut self) -> Query {
        self.state.use_gps = true;
        self.begin(Target::Device)
    }

    /// `None` for blank text: no transition, nothing to run.
    pub fn begin_search(&mut self, text: &str) -> Option<Query> {
        let query = PlaceQuery::parse(text)?;
        self.state.search_text = query.as_str().to_string();
        self.state.use_gps = false;
        self.last_search = Some(query.clone());
        Some(self.begin(Target::Place(query)))
    }

    /// Re-run whichever path is active. In manual mode this repeats the last
    /// submitted search, not unsubmitted input; `None` if nothing was submitted.
    pub fn begin_retry(&mut self) -> Option<Query> {
        if self.state.use_gps {
            return Some(self.begin(Target::Device));
        }
        let query = self.last_search.clone()?;
        Some(self.begin(Target::Place(query)))
    }

    fn begin(&mut self, target: Target) -> Query {
        self.generation += 1;
        self.state.loading = true;
        self.state.error = None;
        debug!("query #{} started: {:?}", self.generation, target);

        Query {
            generation: self.generation,
            target,
            resolver: Arc::clone(&self.resolver),
            client: Arc::clone(&self.client),
        }
    }

    /// Land an outcome. Returns `false` when it belongs to a superseded query.
    pub fn apply(&mut self, outcome: QueryOutcome) -> bool {
        if outcome.generation != self.generation {
            warn!(
                "discarding stale outcome of query #{} (latest is #{})",
                outcome.generation, self.generation
            );
            return false;
        }

        self.state.loading = false;
        match outcome.result {
            Ok(view) => {
                info!("query #{} ready: {}", outcome.generation, view.current.location_name);
                self.state.error = None;
                self.state.weather = Some(view);
            }
            Err(err) => {
                warn!("query #{} failed: {err}", outcome.generation);
                self.state.error = Some(err.to_string());
            }
        }
        true
    }

    async fn drive(&mut self, query: Option<Query>) -> &AppState {
        if let Some(query) = query {
            let outcome = query.run().await;
            self.apply(outcome);
        }
        &self.state
    }

    pub async fn mount(&mut self) -> &AppState {
        let query = self.begin_mount();
        self.drive(query).await
    }

    pub async fn submit_search(&mut self, text: &str) -> &AppState {
        let query = self.begin_search(text);
        self.drive(query).await
    }

    pub async fn use_device_location(&mut self) -> &AppState {
        let query = self.begin_device_location();
        self.drive(Some(query)).await
    }

    pub async fn retry(&mut self) -> &AppState {
        let query = self.begin_retry();
        self.drive(query).await
    }
}
