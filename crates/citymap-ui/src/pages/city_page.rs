//! City page: the map with one marker per city and the weather popup.
//!
//! The page lives on the UI thread. Widget events and forecast results
//! arrive on channels and are applied by [`CityPage::poll`].

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use citymap_core::{catalog, AppError, City, Coordinate, MapConfig};

use crate::app_services::AppServices;
use crate::map::{MapEvent, MapStatus, MapSurface, MapWidget};
use crate::models::{selected_city, PopupController, PopupState};
use crate::services::{request_forecast, WeatherServiceMessage};

pub struct CityPage<W: MapWidget> {
    surface: MapSurface<W>,
    controller: PopupController,
    map_events: Receiver<MapEvent>,
    forecast_tx: Sender<WeatherServiceMessage>,
    forecast_rx: Receiver<WeatherServiceMessage>,
    services: Arc<AppServices>,
    selected: Option<&'static City>,
    banner: Option<String>,
}

impl<W: MapWidget> CityPage<W> {
    pub fn new(widget: W, config: MapConfig, services: Arc<AppServices>) -> Self {
        let (_, map_events) = mpsc::channel();
        let (forecast_tx, forecast_rx) = mpsc::channel();
        Self {
            surface: MapSurface::new(widget, config),
            controller: PopupController::new(),
            map_events,
            forecast_tx,
            forecast_rx,
            services,
            selected: None,
            banner: None,
        }
    }

    /// Mount the map for the `:city` route parameter. Unknown or missing
    /// slugs show the world view. Configuration problems end up in the
    /// banner; the page itself stays usable.
    pub fn mount(&mut self, slug: Option<&str>) {
        self.selected = selected_city(slug);
        if slug.is_some() && self.selected.is_none() {
            tracing::warn!("Unknown city {:?}, showing world view", slug);
        }
        self.initialize();
    }

    fn initialize(&mut self) {
        // Fresh channel per instance so events from a destroyed map never leak in
        let (events_tx, events_rx) = mpsc::channel();
        self.map_events = events_rx;

        let container = self.surface.config().container_id.clone();
        match self.surface.initialize(Some(&container), self.selected, events_tx) {
            Ok(_) => self.banner = None,
            Err(e) => {
                tracing::warn!("Map not initialized: {}", e);
                self.banner = Some(e.user_message().to_string());
            }
        }
    }

    /// Apply pending widget events and forecast results. Returns the number
    /// of messages handled.
    pub fn poll(&mut self) -> usize {
        let mut handled = 0;

        while let Ok(event) = self.map_events.try_recv() {
            self.handle_map_event(event);
            handled += 1;
        }

        while let Ok(message) = self.forecast_rx.try_recv() {
            match message {
                WeatherServiceMessage::ForecastDone { id, result } => {
                    self.controller.on_forecast(self.surface.widget_mut(), id, result);
                }
            }
            handled += 1;
        }

        handled
    }

    fn handle_map_event(&mut self, event: MapEvent) {
        match event {
            MapEvent::Loaded if self.is_failed() => {
                tracing::debug!("Ignoring load event on failed map");
            }
            MapEvent::Loaded => {
                self.surface.mark_loaded();
                self.place_markers();
            }
            MapEvent::Error(message) => {
                self.controller.teardown(self.surface.widget_mut());
                let error = self.surface.mark_failed(message);
                self.banner = Some(AppError::from(error).user_message().to_string());
            }
            MapEvent::MarkerClicked(_) if self.is_failed() => {
                tracing::debug!("Ignoring marker click on failed map");
            }
            MapEvent::MarkerClicked(id) => {
                let Some(city) = self
                    .surface
                    .city_for_marker(id)
                    .and_then(citymap_core::find_by_slug)
                else {
                    tracing::debug!("Click on unknown marker {:?}", id);
                    return;
                };
                let request = self.controller.on_marker_click(self.surface.widget_mut(), city);
                request_forecast(
                    &self.forecast_tx,
                    &self.services.runtime(),
                    self.services.weather_provider(),
                    self.services.subscribe_shutdown(),
                    request,
                );
            }
            MapEvent::BackgroundClicked => {
                self.controller.on_background_click(self.surface.widget_mut());
            }
            MapEvent::PopupClosed(popup) => {
                self.controller.on_popup_closed(popup);
            }
        }
    }

    fn place_markers(&mut self) {
        let Some(handle) = self.surface.handle() else {
            return;
        };
        if let Err(e) = self.surface.place_markers(handle, catalog(), self.selected) {
            tracing::warn!("Failed to place markers: {}", e);
        }
    }

    /// The route parameter changed while the page is mounted: fly to the
    /// new city, re-flag its marker and close any open popup.
    pub fn select_city(&mut self, slug: Option<&str>) {
        self.selected = selected_city(slug);
        self.controller.teardown(self.surface.widget_mut());

        let Some(handle) = self.surface.handle() else {
            return;
        };

        let config = self.surface.config();
        let duration = Duration::from_millis(config.fly_duration_ms);
        let (at, zoom) = match self.selected {
            Some(city) => (city.coordinate(), config.city_zoom),
            None => {
                let [lon, lat] = config.world_center;
                (Coordinate::new(lat, lon), config.world_zoom)
            }
        };
        self.surface.fly_to(handle, at, zoom, duration);

        if *self.surface.status() == MapStatus::Ready {
            self.place_markers();
        }
    }

    /// Recreate the map instance after a failure. Returns false if the map
    /// was not in a state that needs reloading.
    pub fn reload(&mut self) -> bool {
        let needs_reload = self.is_failed() || self.surface.handle().is_none();
        if !needs_reload {
            return false;
        }

        tracing::info!("Reloading map");
        self.controller.teardown(self.surface.widget_mut());
        if let Some(handle) = self.surface.handle() {
            self.surface.destroy(handle);
        }
        self.initialize();
        true
    }

    /// Close the popup and release the map instance
    pub fn unmount(&mut self) {
        self.controller.teardown(self.surface.widget_mut());
        if let Some(handle) = self.surface.handle() {
            self.surface.destroy(handle);
        }
    }

    pub fn selected(&self) -> Option<&'static City> {
        self.selected
    }

    /// Non-fatal error shown above the map
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.surface.status(), MapStatus::Failed(_))
    }

    pub fn is_loading(&self) -> bool {
        *self.surface.status() == MapStatus::Loading
    }

    pub fn status(&self) -> &MapStatus {
        self.surface.status()
    }

    pub fn popup_state(&self) -> &PopupState {
        self.controller.state()
    }

    pub fn controller(&self) -> &PopupController {
        &self.controller
    }

    pub fn surface(&self) -> &MapSurface<W> {
        &self.surface
    }

    pub fn widget(&self) -> &W {
        self.surface.widget()
    }

    pub fn widget_mut(&mut self) -> &mut W {
        self.surface.widget_mut()
    }
}

impl<W: MapWidget> Drop for CityPage<W> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::HeadlessMap;
    use citymap_core::find_by_slug;

    fn config() -> MapConfig {
        MapConfig {
            access_token: "pk.test".to_string(),
            ..MapConfig::default()
        }
    }

    fn page(widget: HeadlessMap, config: MapConfig) -> CityPage<HeadlessMap> {
        CityPage::new(widget, config, AppServices::new().unwrap())
    }

    #[test]
    fn mount_centers_on_routed_city_and_places_markers() {
        let mut page = page(HeadlessMap::new(), config());
        page.mount(Some("sydney"));
        assert!(page.is_loading());

        page.poll();

        assert_eq!(*page.status(), MapStatus::Ready);
        let widget = page.widget();
        assert_eq!(widget.markers().len(), catalog().len());
        assert_eq!(widget.markers().values().filter(|m| m.selected).count(), 1);
        let sydney = find_by_slug("sydney").unwrap();
        assert_eq!(widget.camera().unwrap().center, sydney.coordinate());
        assert_eq!(widget.camera().unwrap().zoom, 10.0);
    }

    #[test]
    fn unknown_slug_shows_world_view() {
        let mut page = page(HeadlessMap::new(), config());
        page.mount(Some("atlantis"));
        page.poll();

        assert!(page.selected().is_none());
        let camera = page.widget().camera().unwrap();
        assert_eq!(camera.center, Coordinate::new(35.0, 10.0));
        assert_eq!(camera.zoom, 1.5);
        assert!(page.widget().markers().values().all(|m| !m.selected));
    }

    #[test]
    fn missing_token_sets_banner_without_mounting() {
        let mut page = page(HeadlessMap::new(), MapConfig::default());
        page.mount(Some("london"));
        page.poll();

        assert!(page.banner().unwrap().contains("access token"));
        assert!(!page.widget().is_mounted());
        assert_eq!(*page.status(), MapStatus::Unmounted);
    }

    #[test]
    fn widget_error_fails_instance_and_reload_recovers() {
        let mut page = page(HeadlessMap::failing("style 401"), config());
        page.mount(None);
        page.poll();

        assert!(matches!(page.status(), MapStatus::Failed(_)));
        assert!(page.banner().is_some());
        assert!(page.reload());
        assert_eq!(page.widget().mount_count(), 2);
    }

    #[test]
    fn reload_is_noop_when_healthy() {
        let mut page = page(HeadlessMap::new(), config());
        page.mount(None);
        page.poll();

        assert!(!page.reload());
        assert_eq!(page.widget().mount_count(), 1);
    }

    #[test]
    fn select_city_flies_and_reflags_marker() {
        let mut page = page(HeadlessMap::new(), config());
        page.mount(Some("london"));
        page.poll();

        page.select_city(Some("tokyo"));

        let tokyo = find_by_slug("tokyo").unwrap();
        let camera = page.widget().camera().unwrap();
        assert_eq!(camera.center, tokyo.coordinate());
        assert_eq!(camera.duration, Duration::from_millis(2000));
        assert_eq!(page.widget().markers().len(), catalog().len());
        let marker = page.surface().marker_for_city("tokyo").unwrap();
        assert!(page.widget().markers()[&marker].selected);
    }

    #[test]
    fn marker_click_without_provider_fails_inline() {
        let mut page = page(HeadlessMap::new(), config());
        page.mount(Some("lagos"));
        page.poll();

        let marker = page.surface().marker_for_city("cairo").unwrap();
        page.widget().click_marker(marker);
        page.poll();

        assert!(matches!(page.popup_state(), PopupState::Failed(_)));
        assert_eq!(page.widget().popups().len(), 1);
    }

    #[test]
    fn background_click_closes_popup() {
        let mut page = page(HeadlessMap::new(), config());
        page.mount(None);
        page.poll();

        let marker = page.surface().marker_for_city("rome").unwrap();
        page.widget().click_marker(marker);
        page.poll();
        page.widget().click_background();
        page.poll();

        assert!(page.widget().popups().is_empty());
        assert_eq!(*page.popup_state(), PopupState::Idle);
    }

    #[test]
    fn load_after_error_places_no_markers() {
        let mut page = page(HeadlessMap::manual(), config());
        page.mount(None);
        page.widget().fail("style 401");
        page.widget().finish_loading();
        page.poll();

        assert!(page.is_failed());
        assert!(page.widget().markers().is_empty());
        assert_eq!(page.surface().marker_count(), 0);
    }

    #[test]
    fn marker_click_on_failed_map_is_ignored() {
        let mut page = page(HeadlessMap::manual(), config());
        page.mount(None);
        page.widget().finish_loading();
        page.poll();
        let marker = page.surface().marker_for_city("rome").unwrap();

        page.widget().fail("tiles unavailable");
        page.widget().click_marker(marker);
        page.poll();

        assert!(page.is_failed());
        assert!(page.widget().popups().is_empty());
        assert_eq!(*page.popup_state(), PopupState::Idle);
    }

    #[test]
    fn manual_widget_stays_loading_until_load_event() {
        let mut page = page(HeadlessMap::manual(), config());
        page.mount(Some("istanbul"));
        page.poll();

        assert!(page.is_loading());
        assert!(page.widget().markers().is_empty());

        page.widget().finish_loading();
        page.poll();

        assert_eq!(*page.status(), MapStatus::Ready);
        assert_eq!(page.widget().markers().len(), catalog().len());
    }

    #[test]
    fn widget_side_dismiss_resets_popup() {
        let mut page = page(HeadlessMap::new(), config());
        page.mount(None);
        page.poll();

        let marker = page.surface().marker_for_city("beijing").unwrap();
        page.widget().click_marker(marker);
        page.poll();
        let popup = page.controller().active_popup().unwrap();

        page.widget_mut().dismiss_popup(popup);
        page.poll();

        assert!(page.widget().popups().is_empty());
        assert_eq!(*page.popup_state(), PopupState::Idle);
        assert!(page.controller().active_city().is_none());
    }

    #[test]
    fn unmount_releases_map() {
        let mut page = page(HeadlessMap::new(), config());
        page.mount(None);
        page.poll();

        page.unmount();

        assert!(!page.widget().is_mounted());
        assert!(page.widget().markers().is_empty());
        assert!(page.surface().handle().is_none());
    }
}
