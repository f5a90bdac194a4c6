//! Marker/popup controller.
//!
//! Owns the single active popup. A marker click closes whatever popup is
//! open, opens a new one in the loading state and hands back a forecast
//! request for the caller to dispatch. Forecast results are applied only
//! when they belong to the popup that is still active.

use citymap_core::{AppError, City};
use citymap_weather::{DailyOutlook, Forecast};
use maud::{html, Markup};
use tokio_util::sync::CancellationToken;

use crate::map::{MapWidget, PopupId, PopupOptions};
use crate::services::{ForecastError, ForecastRequest, RequestId};

/// Popup state for one marker
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PopupState {
    #[default]
    Idle,
    Loading,
    Loaded(Forecast),
    /// User-facing error text shown inline in the popup
    Failed(String),
}

static IDLE: PopupState = PopupState::Idle;

#[derive(Debug)]
struct ActivePopup {
    popup: PopupId,
    request: RequestId,
    cancel: CancellationToken,
    city: City,
    state: PopupState,
}

#[derive(Debug, Default)]
pub struct PopupController {
    active: Option<ActivePopup>,
    next_request: u64,
    options: PopupOptions,
}

impl PopupController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a loading popup for `city`, closing any other popup first.
    /// Returns the forecast request the caller must dispatch.
    pub fn on_marker_click(&mut self, widget: &mut dyn MapWidget, city: &City) -> ForecastRequest {
        self.close_active(widget);

        let popup = widget.open_popup(city.coordinate(), &render_loading(city), self.options);
        self.next_request += 1;
        let request = ForecastRequest {
            id: RequestId(self.next_request),
            at: city.coordinate(),
            cancel: CancellationToken::new(),
        };

        self.active = Some(ActivePopup {
            popup,
            request: request.id,
            cancel: request.cancel.clone(),
            city: city.clone(),
            state: PopupState::Loading,
        });

        tracing::info!("Opened popup for {} (request {:?})", city.title, request.id);
        request
    }

    /// Apply a forecast result. Returns false when the result belongs to a
    /// popup that has since been replaced or closed; such results are dropped.
    pub fn on_forecast(
        &mut self,
        widget: &mut dyn MapWidget,
        id: RequestId,
        result: Result<Forecast, ForecastError>,
    ) -> bool {
        let active = match self.active.as_mut() {
            Some(active) if active.request == id => active,
            _ => {
                tracing::debug!("Dropping stale forecast result {:?}", id);
                return false;
            }
        };

        match result {
            Ok(forecast) => {
                widget.set_popup_html(active.popup, &render_forecast(&active.city, &forecast));
                active.state = PopupState::Loaded(forecast);
            }
            Err(e) => {
                tracing::warn!("Forecast for {} failed: {}", active.city.title, e);
                let message = AppError::from(e).user_message().to_string();
                widget.set_popup_html(active.popup, &render_error(&active.city, &message));
                active.state = PopupState::Failed(message);
            }
        }
        true
    }

    /// Click on the map outside any marker
    pub fn on_background_click(&mut self, widget: &mut dyn MapWidget) {
        self.close_active(widget);
    }

    /// The widget closed a popup on its own
    pub fn on_popup_closed(&mut self, popup: PopupId) {
        if self.active.as_ref().is_some_and(|a| a.popup == popup) {
            if let Some(active) = self.active.take() {
                active.cancel.cancel();
                tracing::debug!("Popup for {} dismissed", active.city.title);
            }
        }
    }

    /// Close the active popup and cancel its request. Called on unmount.
    pub fn teardown(&mut self, widget: &mut dyn MapWidget) {
        self.close_active(widget);
    }

    fn close_active(&mut self, widget: &mut dyn MapWidget) {
        if let Some(active) = self.active.take() {
            active.cancel.cancel();
            widget.close_popup(active.popup);
            tracing::debug!("Closed popup for {}", active.city.title);
        }
    }

    /// State of the active popup, `Idle` when none is open
    pub fn state(&self) -> &PopupState {
        self.active.as_ref().map(|a| &a.state).unwrap_or(&IDLE)
    }

    /// State of the popup for the marker of `slug`
    pub fn state_for(&self, slug: &str) -> &PopupState {
        match &self.active {
            Some(active) if active.city.slug == slug => &active.state,
            _ => &IDLE,
        }
    }

    pub fn active_city(&self) -> Option<&City> {
        self.active.as_ref().map(|a| &a.city)
    }

    pub fn active_popup(&self) -> Option<PopupId> {
        self.active.as_ref().map(|a| a.popup)
    }

    pub fn active_request(&self) -> Option<RequestId> {
        self.active.as_ref().map(|a| a.request)
    }
}

fn render_header(city: &City) -> Markup {
    html! {
        h3 { (city.title) }
        p { "Lat: " (format!("{:.4}", city.lat)) ", Lon: " (format!("{:.4}", city.lon)) }
    }
}

fn render_loading(city: &City) -> String {
    html! {
        (render_header(city))
        p class="loading" { "Loading forecast…" }
    }
    .into_string()
}

fn render_day(label: &str, day: &DailyOutlook) -> Markup {
    html! {
        p class="day" {
            strong { (label) }
            " " (day.icon) " " (day.max) "° / " (day.min) "° · " (day.description)
        }
    }
}

fn render_forecast(city: &City, forecast: &Forecast) -> String {
    html! {
        (render_header(city))
        div class="forecast" {
            p class="now" {
                (forecast.current.icon) " " (forecast.current.temp) "°C · "
                (forecast.current.description)
            }
            (render_day("Today", &forecast.today))
            (render_day("Tomorrow", &forecast.tomorrow))
        }
    }
    .into_string()
}

fn render_error(city: &City, message: &str) -> String {
    html! {
        (render_header(city))
        p class="error" { (message) }
    }
    .into_string()
}
