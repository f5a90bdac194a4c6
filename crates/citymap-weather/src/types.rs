use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Human-readable interpretation of a WMO weather code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeatherInterpretation {
    pub description: &'static str,
    pub icon: &'static str,
}

impl WeatherInterpretation {
    const fn new(description: &'static str, icon: &'static str) -> Self {
        Self { description, icon }
    }

    /// Entry returned for codes outside the known table
    pub const UNKNOWN: Self = Self::new("Unknown", "🤷");

    /// Convert a WMO weather code to its description and icon.
    /// Never fails: unknown codes map to [`WeatherInterpretation::UNKNOWN`].
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            0 => Self::new("Clear sky", "☀️"),
            1 => Self::new("Mainly clear", "🌤️"),
            2 => Self::new("Partly cloudy", "⛅"),
            3 => Self::new("Overcast", "☁️"),
            45 => Self::new("Fog", "🌫️"),
            48 => Self::new("Depositing rime fog", "🌫️"),
            51 => Self::new("Light drizzle", "💧"),
            53 => Self::new("Moderate drizzle", "💧"),
            55 => Self::new("Dense drizzle", "💧"),
            56 => Self::new("Light freezing drizzle", "🧊"),
            57 => Self::new("Dense freezing drizzle", "🧊"),
            61 => Self::new("Slight rain", "🌧️"),
            63 => Self::new("Moderate rain", "🌧️"),
            65 => Self::new("Heavy rain", "🌧️"),
            66 => Self::new("Light freezing rain", "🧊"),
            67 => Self::new("Heavy freezing rain", "🧊"),
            71 => Self::new("Slight snow fall", "🌨️"),
            73 => Self::new("Moderate snow fall", "🌨️"),
            75 => Self::new("Heavy snow fall", "❄️"),
            77 => Self::new("Snow grains", "🌨️"),
            80 => Self::new("Slight rain showers", "🌦️"),
            81 => Self::new("Moderate rain showers", "🌦️"),
            82 => Self::new("Violent rain showers", "⛈️"),
            85 => Self::new("Slight snow showers", "🌨️"),
            86 => Self::new("Heavy snow showers", "❄️"),
            95 => Self::new("Thunderstorm", "⛈️"),
            96 => Self::new("Thunderstorm with slight hail", "⛈️"),
            99 => Self::new("Thunderstorm with heavy hail", "⛈️"),
            _ => Self::UNKNOWN,
        }
    }
}

/// Round to the nearest whole degree, halves rounding up (21.5 -> 22, -2.5 -> -2).
pub fn round_temperature(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Conditions right now
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp: i32,
    pub description: String,
    pub icon: String,
}

/// High/low outlook for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyOutlook {
    pub date: Option<NaiveDate>,
    pub max: i32,
    pub min: i32,
    pub description: String,
    pub icon: String,
}

/// Normalized three-period forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub current: CurrentConditions,
    pub today: DailyOutlook,
    pub tomorrow: DailyOutlook,
    pub fetched_at: DateTime<Utc>,
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// The HTTP call did not complete
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The provider answered with a non-2xx status
    #[error("Weather API returned status {0}")]
    Status(u16),
    /// The body did not have the expected shape
    #[error("Data error: {0}")]
    Data(String),
}

impl WeatherError {
    /// True when the response arrived but could not be understood
    pub fn is_data_error(&self) -> bool {
        matches!(self, Self::Data(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network(e) if e.is_timeout())
    }
}
