//! Weather client for CityMap
//!
//! Fetches a three-period forecast (now, today, tomorrow) from the
//! Open-Meteo API and normalizes WMO weather codes into a description and
//! an icon.

pub mod provider;
pub mod types;

pub use provider::{WeatherProvider, DEFAULT_API_BASE};
pub use types::*;
