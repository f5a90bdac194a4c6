//! Open-Meteo forecast client.

use crate::types::{
    round_temperature, CurrentConditions, DailyOutlook, Forecast, WeatherError,
    WeatherInterpretation,
};
use chrono::{NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;

/// Open-Meteo API base URL
pub const DEFAULT_API_BASE: &str = "https://api.open-meteo.com/v1";

const USER_AGENT: &str = "citymap/0.1.0";
const DAILY_FIELDS: &str = "weathercode,temperature_2m_max,temperature_2m_min";

#[derive(Debug, Deserialize)]
struct ApiResponse {
    current_weather: ApiCurrentWeather,
    daily: ApiDaily,
}

#[derive(Debug, Deserialize)]
struct ApiCurrentWeather {
    temperature: f64,
    weathercode: i32,
}

#[derive(Debug, Deserialize)]
struct ApiDaily {
    #[serde(default)]
    time: Vec<String>,
    weathercode: Vec<i32>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
}

impl ApiDaily {
    fn outlook(&self, index: usize) -> Result<DailyOutlook, WeatherError> {
        let missing = |field: &str| {
            WeatherError::Data(format!("daily.{} has no entry for day {}", field, index))
        };

        let code = *self.weathercode.get(index).ok_or_else(|| missing("weathercode"))?;
        let max = *self
            .temperature_2m_max
            .get(index)
            .ok_or_else(|| missing("temperature_2m_max"))?;
        let min = *self
            .temperature_2m_min
            .get(index)
            .ok_or_else(|| missing("temperature_2m_min"))?;
        let date = self
            .time
            .get(index)
            .and_then(|t| NaiveDate::parse_from_str(t, "%Y-%m-%d").ok());

        let interp = WeatherInterpretation::from_wmo_code(code);
        Ok(DailyOutlook {
            date,
            max: round_temperature(max),
            min: round_temperature(min),
            description: interp.description.to_string(),
            icon: interp.icon.to_string(),
        })
    }
}

impl ApiResponse {
    fn into_forecast(self) -> Result<Forecast, WeatherError> {
        let interp = WeatherInterpretation::from_wmo_code(self.current_weather.weathercode);
        let current = CurrentConditions {
            temp: round_temperature(self.current_weather.temperature),
            description: interp.description.to_string(),
            icon: interp.icon.to_string(),
        };

        Ok(Forecast {
            current,
            today: self.daily.outlook(0)?,
            tomorrow: self.daily.outlook(1)?,
            fetched_at: Utc::now(),
        })
    }
}

/// Forecast client. Cheap to clone; every call is an independent request
/// (no caching, no retry).
#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: String,
}

impl WeatherProvider {
    /// Client for the public Open-Meteo endpoint
    pub fn new() -> Result<Self, WeatherError> {
        Self::with_base_url(DEFAULT_API_BASE)
    }

    /// Client for an Open-Meteo compatible endpoint, e.g. a mock server
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, WeatherError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch current conditions plus today's and tomorrow's outlook.
    ///
    /// Fails with [`WeatherError::Network`] or [`WeatherError::Status`] when
    /// the call does not complete successfully and [`WeatherError::Data`]
    /// when the body does not match the expected shape.
    pub async fn fetch_forecast(&self, lat: f64, lon: f64) -> Result<Forecast, WeatherError> {
        let url = format!("{}/forecast", self.base_url);
        tracing::debug!("Fetching forecast for {}, {}", lat, lon);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("current_weather", "true".to_string()),
                ("timezone", "auto".to_string()),
                ("forecast_days", "2".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Forecast request for {}, {} failed with {}", lat, lon, status);
            return Err(WeatherError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let parsed: ApiResponse =
            serde_json::from_str(&body).map_err(|e| WeatherError::Data(e.to_string()))?;

        let forecast = parsed.into_forecast()?;
        tracing::info!(
            "Forecast for {}, {}: {}°C {}",
            lat,
            lon,
            forecast.current.temp,
            forecast.current.description
        );
        Ok(forecast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_body() -> &'static str {
        r#"{
            "latitude": 51.5,
            "longitude": -0.12,
            "current_weather": {"temperature": 21.4, "weathercode": 2, "windspeed": 9.0},
            "daily": {
                "time": ["2026-10-19", "2026-10-20"],
                "weathercode": [61, 999],
                "temperature_2m_max": [23.6, 18.5],
                "temperature_2m_min": [12.2, 9.49]
            }
        }"#
    }

    #[test]
    fn test_normalizes_all_three_periods() {
        let parsed: ApiResponse = serde_json::from_str(sample_body()).unwrap();
        let forecast = parsed.into_forecast().unwrap();

        assert_eq!(forecast.current.temp, 21);
        assert_eq!(forecast.current.description, "Partly cloudy");

        assert_eq!(forecast.today.max, 24);
        assert_eq!(forecast.today.min, 12);
        assert_eq!(forecast.today.description, "Slight rain");
        assert_eq!(forecast.today.date, NaiveDate::from_ymd_opt(2026, 10, 19));

        assert_eq!(forecast.tomorrow.max, 19);
        assert_eq!(forecast.tomorrow.min, 9);
        assert_eq!(forecast.tomorrow.description, "Unknown");
    }

    #[test]
    fn test_short_daily_arrays_are_data_errors() {
        let body = r#"{
            "current_weather": {"temperature": 10.0, "weathercode": 0},
            "daily": {
                "weathercode": [0],
                "temperature_2m_max": [11.0],
                "temperature_2m_min": [4.0]
            }
        }"#;
        let parsed: ApiResponse = serde_json::from_str(body).unwrap();
        let err = parsed.into_forecast().unwrap_err();
        assert!(err.is_data_error());
        assert!(err.to_string().contains("day 1"));
    }

    #[test]
    fn test_missing_time_leaves_date_empty() {
        let body = r#"{
            "current_weather": {"temperature": 10.0, "weathercode": 0},
            "daily": {
                "weathercode": [0, 1],
                "temperature_2m_max": [11.0, 12.0],
                "temperature_2m_min": [4.0, 5.0]
            }
        }"#;
        let parsed: ApiResponse = serde_json::from_str(body).unwrap();
        let forecast = parsed.into_forecast().unwrap();
        assert!(forecast.today.date.is_none());
        assert_eq!(forecast.tomorrow.description, "Mainly clear");
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let provider = WeatherProvider::with_base_url("http://localhost:9000/v1/").unwrap();
        assert_eq!(provider.base_url(), "http://localhost:9000/v1");
    }
}
