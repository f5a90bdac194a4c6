use crate::services::weather_service::ForecastError;
use citymap_core::{AppError, NetworkError, WeatherError};

impl From<ForecastError> for AppError {
    fn from(e: ForecastError) -> Self {
        match e {
            ForecastError::Network(s) => AppError::Network(NetworkError::ConnectionFailed(s)),
            ForecastError::Timeout => AppError::Network(NetworkError::Timeout),
            ForecastError::Status(status) => AppError::Network(NetworkError::ServerError {
                status,
                message: format!("Weather API returned HTTP {}", status),
            }),
            ForecastError::Data(s) => AppError::Weather(WeatherError::DataError(s)),
            ForecastError::NotInitialized => AppError::Weather(WeatherError::ServiceUnavailable),
        }
    }
}
