//! Integration tests for OpenWeatherClient using wiremock.

use std::{sync::Arc, time::Duration};

use weather_core::{
    AppController, Coordinate, Locator, Phase, PlaceQuery, WeatherClient, WeatherError,
    location::FixedLocation, provider::openweather::OpenWeatherClient,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> OpenWeatherClient {
    OpenWeatherClient::new("TEST_KEY".to_string(), &server.uri(), Duration::from_secs(5))
        .unwrap()
}

fn berlin() -> Locator {
    Locator::Place(PlaceQuery::parse("Berlin").unwrap())
}

fn current_body() -> serde_json::Value {
    serde_json::json!({
        "cod": 200,
        "name": "Berlin",
        "dt": 1_700_000_000,
        "main": { "temp": 12.6, "feels_like": 11.0, "humidity": 71 },
        "weather": [{ "id": 500, "main": "Rain", "description": "light rain" }],
        "wind": { "speed": 4.1, "deg": 250 }
    })
}

/// `len` 3-hourly entries; daily representatives carry 20, 21, 22, ...
fn forecast_body(len: usize) -> serde_json::Value {
    let list: Vec<serde_json::Value> = (0..len)
        .map(|i| {
            serde_json::json!({
                "dt": 1_700_000_000 + i as i64 * 10_800,
                "main": { "temp": 20.0 + (i / 8) as f64, "humidity": 50 + i },
                "weather": [{ "description": format!("entry {i}") }],
                "wind": { "speed": 1.0 }
            })
        })
        .collect();

    serde_json::json!({
        "cod": "200",
        "message": 0,
        "cnt": len,
        "list": list,
        "city": { "name": "Berlin", "country": "DE" }
    })
}

#[tokio::test]
async fn test_fetch_current_by_name() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Berlin"))
        .and(query_param("units", "metric"))
        .and(query_param("appid", "TEST_KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
        .expect(1)
        .mount(&server)
        .await;

    let current = client(&server).fetch_current(&berlin()).await.unwrap();

    assert_eq!(current.location_name, "Berlin");
    assert_eq!(current.temperature_c, 12.6);
    assert_eq!(current.rounded_temperature(), 13);
    assert_eq!(current.description, "light rain");
    assert_eq!(current.humidity_pct, 71);
    assert_eq!(current.wind_speed_mps, 4.1);
}

#[tokio::test]
async fn test_fetch_current_by_coordinates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", "52.52"))
        .and(query_param("lon", "13.4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
        .expect(1)
        .mount(&server)
        .await;

    let locator = Locator::Coordinate(Coordinate::new(52.52, 13.4));
    let current = client(&server).fetch_current(&locator).await.unwrap();

    assert_eq!(current.location_name, "Berlin");
}

#[tokio::test]
async fn test_city_not_found_uses_payload_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .mount(&server)
        .await;

    let err = client(&server).fetch_current(&berlin()).await.unwrap_err();

    assert_eq!(err, WeatherError::Provider("city not found".into()));
}

#[tokio::test]
async fn test_payload_status_wins_over_transport_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "cod": 401,
            "message": "Invalid API key."
        })))
        .mount(&server)
        .await;

    let err = client(&server).fetch_current(&berlin()).await.unwrap_err();

    assert_eq!(err.to_string(), "Invalid API key.");
}

#[tokio::test]
async fn test_unparsable_body_is_generic_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let err = client(&server).fetch_current(&berlin()).await.unwrap_err();

    assert_eq!(err.to_string(), "Failed to fetch weather");
}

#[tokio::test]
async fn test_unreachable_server_is_generic_provider_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let client = OpenWeatherClient::new("K".into(), &uri, Duration::from_secs(2)).unwrap();
    let err = client.fetch_current(&berlin()).await.unwrap_err();

    assert_eq!(err, WeatherError::Provider("Failed to fetch weather".into()));
}

#[tokio::test]
async fn test_fetch_forecast_maps_samples_in_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("q", "Berlin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(40)))
        .mount(&server)
        .await;

    let samples = client(&server).fetch_forecast(&berlin()).await.unwrap();

    assert_eq!(samples.len(), 40);
    assert_eq!(samples[0].timestamp, 1_700_000_000);
    assert_eq!(samples[8].temperature_c, 21.0);
    assert_eq!(samples[3].description, "entry 3");
    assert!(samples.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
}

#[tokio::test]
async fn test_controller_end_to_end_against_mock_provider() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", "52.52"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("lat", "52.52"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(40)))
        .mount(&server)
        .await;

    let resolver = Arc::new(FixedLocation::new(Some(Coordinate::new(52.52, 13.4))));
    let mut app = AppController::new(resolver, Arc::new(client(&server)));

    let state = app.mount().await;

    assert_eq!(state.phase(), Phase::Ready);
    assert_eq!(state.current().unwrap().location_name, "Berlin");
    assert_eq!(state.past().unwrap().rounded_temperature(), 21);
    assert_eq!(state.past().unwrap().description, "entry 0");
    let future: Vec<f64> = state.future().iter().map(|s| s.temperature_c).collect();
    assert_eq!(future, vec![21.0, 22.0, 23.0]);
}

#[tokio::test]
async fn test_forecast_not_requested_after_failed_current() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(40)))
        .expect(0)
        .mount(&server)
        .await;

    let mut app =
        AppController::new(Arc::new(FixedLocation::default()), Arc::new(client(&server)));

    let state = app.submit_search("Nowhere").await;

    assert_eq!(state.phase(), Phase::Error);
    assert_eq!(state.error(), Some("city not found"));
}

#[tokio::test]
async fn test_failing_forecast_after_current_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "forecast gone"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut app =
        AppController::new(Arc::new(FixedLocation::default()), Arc::new(client(&server)));

    let state = app.submit_search("Berlin").await;

    assert_eq!(state.phase(), Phase::Error);
    assert_eq!(state.error(), Some("forecast gone"));
    assert!(state.current().is_none());
    assert!(state.past().is_none());
}
