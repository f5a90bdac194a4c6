//! Integration tests for WeatherProvider using wiremock.
//!
//! These tests verify the request shape and the normalization of the
//! Open-Meteo response against a mock HTTP server.

use citymap_weather::{WeatherError, WeatherProvider};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a forecast body
fn forecast_body(current: f64, code: i32) -> serde_json::Value {
    serde_json::json!({
        "latitude": 51.5,
        "longitude": -0.12,
        "timezone": "Europe/London",
        "current_weather": { "temperature": current, "weathercode": code },
        "daily": {
            "time": ["2026-10-19", "2026-10-20"],
            "weathercode": [3, 80],
            "temperature_2m_max": [17.5, 15.2],
            "temperature_2m_min": [9.1, 8.8]
        }
    })
}

#[tokio::test]
async fn test_fetch_forecast_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("latitude", "51.5074"))
        .and(query_param("longitude", "-0.1278"))
        .and(query_param(
            "daily",
            "weathercode,temperature_2m_max,temperature_2m_min",
        ))
        .and(query_param("current_weather", "true"))
        .and(query_param("timezone", "auto"))
        .and(query_param("forecast_days", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(21.4, 0)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = WeatherProvider::with_base_url(mock_server.uri()).unwrap();
    let forecast = provider.fetch_forecast(51.5074, -0.1278).await.unwrap();

    assert_eq!(forecast.current.temp, 21);
    assert_eq!(forecast.current.description, "Clear sky");
    assert_eq!(forecast.today.max, 18);
    assert_eq!(forecast.today.min, 9);
    assert_eq!(forecast.today.description, "Overcast");
    assert_eq!(forecast.tomorrow.max, 15);
    assert_eq!(forecast.tomorrow.description, "Slight rain showers");
}

#[tokio::test]
async fn test_fetch_forecast_unknown_code_uses_fallback() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(-3.5, 999)))
        .mount(&mock_server)
        .await;

    let provider = WeatherProvider::with_base_url(mock_server.uri()).unwrap();
    let forecast = provider.fetch_forecast(0.0, 0.0).await.unwrap();

    assert_eq!(forecast.current.temp, -3);
    assert_eq!(forecast.current.description, "Unknown");
    assert_eq!(forecast.current.icon, "🤷");
}

#[tokio::test]
async fn test_non_success_status_is_network_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let provider = WeatherProvider::with_base_url(mock_server.uri()).unwrap();
    let err = provider.fetch_forecast(35.6762, 139.6503).await.unwrap_err();

    assert!(matches!(err, WeatherError::Status(503)), "unexpected error: {}", err);
    assert!(!err.is_data_error());
}

#[tokio::test]
async fn test_malformed_body_is_data_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "current_weather": { "temperature": "warm" }
        })))
        .mount(&mock_server)
        .await;

    let provider = WeatherProvider::with_base_url(mock_server.uri()).unwrap();
    let err = provider.fetch_forecast(48.8566, 2.3522).await.unwrap_err();

    assert!(err.is_data_error(), "expected data error, got: {}", err);
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() {
    // Nothing listens on port 9 (discard) on test hosts
    let provider = WeatherProvider::with_base_url("http://127.0.0.1:9").unwrap();
    let err = provider.fetch_forecast(48.8566, 2.3522).await.unwrap_err();

    assert!(matches!(err, WeatherError::Network(_)), "unexpected error: {}", err);
}

#[tokio::test]
async fn test_identical_requests_are_not_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(10.0, 1)))
        .expect(2)
        .mount(&mock_server)
        .await;

    let provider = WeatherProvider::with_base_url(mock_server.uri()).unwrap();
    provider.fetch_forecast(52.52, 13.405).await.unwrap();
    provider.fetch_forecast(52.52, 13.405).await.unwrap();
    // MockServer verifies `expect(2)` on drop
}
