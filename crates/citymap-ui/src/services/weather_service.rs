//! Weather backend: async forecast fetching for map popups.
//! All network work runs off the UI thread; results sent via mpsc.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use citymap_core::Coordinate;
use citymap_weather::{Forecast, WeatherProvider};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Error type for forecast operations
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastError {
    Network(String),
    Timeout,
    Status(u16),
    Data(String),
    NotInitialized,
}

impl std::fmt::Display for ForecastError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForecastError::Network(s) => write!(f, "Weather error: {}", s),
            ForecastError::Timeout => write!(f, "Weather error: request timed out"),
            ForecastError::Status(code) => write!(f, "Weather error: HTTP {}", code),
            ForecastError::Data(s) => write!(f, "Weather data error: {}", s),
            ForecastError::NotInitialized => write!(f, "Weather service not initialized"),
        }
    }
}

impl std::error::Error for ForecastError {}

impl From<citymap_weather::WeatherError> for ForecastError {
    fn from(e: citymap_weather::WeatherError) -> Self {
        use citymap_weather::WeatherError as E;
        match e {
            E::Network(err) if err.is_timeout() => ForecastError::Timeout,
            E::Network(err) => ForecastError::Network(err.to_string()),
            E::Status(code) => ForecastError::Status(code),
            E::Data(s) => ForecastError::Data(s),
        }
    }
}

/// Identifies one forecast request issued by the popup controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

/// A forecast to fetch, with the token the controller cancels when the
/// popup that asked for it is superseded or closed.
#[derive(Debug, Clone)]
pub struct ForecastRequest {
    pub id: RequestId,
    pub at: Coordinate,
    pub cancel: CancellationToken,
}

/// Messages sent from async operations back to the UI thread
#[derive(Debug)]
pub enum WeatherServiceMessage {
    /// Result of fetching a forecast
    ForecastDone {
        id: RequestId,
        result: Result<Forecast, ForecastError>,
    },
}

/// Request a forecast asynchronously.
///
/// The request runs to completion unless the app shuts down first. If its
/// token was cancelled in the meantime the result is dropped instead of
/// being sent; otherwise `ForecastDone` is sent on the channel.
pub fn request_forecast(
    tx: &Sender<WeatherServiceMessage>,
    runtime: &tokio::runtime::Handle,
    provider: Option<Arc<WeatherProvider>>,
    mut shutdown: broadcast::Receiver<()>,
    request: ForecastRequest,
) {
    let tx = tx.clone();
    let provider = match provider {
        Some(p) => p,
        None => {
            let _ = tx.send(WeatherServiceMessage::ForecastDone {
                id: request.id,
                result: Err(ForecastError::NotInitialized),
            });
            return;
        }
    };

    runtime.spawn(async move {
        let result = tokio::select! {
            result = provider.fetch_forecast(request.at.lat, request.at.lon) => {
                result.map_err(ForecastError::from)
            }
            _ = shutdown.recv() => {
                tracing::debug!("Forecast {:?} abandoned on shutdown", request.id);
                return;
            }
        };

        if request.cancel.is_cancelled() {
            tracing::debug!("Forecast {:?} superseded, dropping result", request.id);
            return;
        }

        if let Err(e) = &result {
            tracing::warn!("Forecast {:?} failed: {}", request.id, e);
        }
        let _ = tx.send(WeatherServiceMessage::ForecastDone {
            id: request.id,
            result,
        });
    });
}
