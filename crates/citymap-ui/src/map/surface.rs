//! Map surface: owns one widget instance per page mount and the markers
//! placed on it.

use std::sync::mpsc::Sender;
use std::time::Duration;

use citymap_core::{AppError, City, Coordinate, MapConfig, MapError};

use super::widget::{CameraMove, ControlPosition, MapEvent, MapOptions, MapWidget, MarkerId};

/// Identifies one live map instance. A new handle is issued per initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapHandle(u64);

/// Lifecycle of the map instance
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MapStatus {
    #[default]
    Unmounted,
    /// Widget created, waiting for its load event
    Loading,
    Ready,
    /// Terminal for this instance; a reload creates a new one
    Failed(MapError),
}

#[derive(Debug, Clone, PartialEq)]
struct PlacedMarker {
    id: MarkerId,
    slug: String,
}

pub struct MapSurface<W: MapWidget> {
    widget: W,
    config: MapConfig,
    handle: Option<MapHandle>,
    generation: u64,
    status: MapStatus,
    markers: Vec<PlacedMarker>,
}

impl<W: MapWidget> MapSurface<W> {
    pub fn new(widget: W, config: MapConfig) -> Self {
        Self {
            widget,
            config,
            handle: None,
            generation: 0,
            status: MapStatus::Unmounted,
            markers: Vec::new(),
        }
    }

    /// Create the map instance, centered on `center_hint` if given.
    ///
    /// Calling this while an instance is live returns the existing handle
    /// and leaves the widget untouched.
    pub fn initialize(
        &mut self,
        container: Option<&str>,
        center_hint: Option<&City>,
        events: Sender<MapEvent>,
    ) -> Result<MapHandle, AppError> {
        if let Some(handle) = self.handle {
            tracing::debug!("Map already initialized, ignoring duplicate initialization");
            return Ok(handle);
        }

        let access_token = self.config.access_token()?.to_string();

        let container = container
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(MapError::MissingContainer)?;

        let (center, zoom) = match center_hint {
            Some(city) => (city.coordinate(), self.config.city_zoom),
            None => {
                let [lon, lat] = self.config.world_center;
                (Coordinate::new(lat, lon), self.config.world_zoom)
            }
        };

        let options = MapOptions {
            container: container.to_string(),
            access_token,
            style_url: self.config.style_url.clone(),
            center,
            zoom,
            navigation_control: Some(ControlPosition::TopRight),
        };

        self.widget.mount(&options, events)?;

        self.generation += 1;
        let handle = MapHandle(self.generation);
        self.handle = Some(handle);
        self.status = MapStatus::Loading;

        tracing::info!(
            "Map initialized in #{} at {:.4}, {:.4} (zoom {})",
            container,
            center.lat,
            center.lon,
            zoom
        );
        Ok(handle)
    }

    /// Tear down the live instance. Stale handles are ignored.
    pub fn destroy(&mut self, handle: MapHandle) {
        if self.handle != Some(handle) {
            tracing::debug!("Ignoring destroy for stale map handle {:?}", handle);
            return;
        }

        for marker in self.markers.drain(..) {
            self.widget.remove_marker(marker.id);
        }
        self.widget.unmount();
        self.handle = None;
        self.status = MapStatus::Unmounted;
        tracing::info!("Map destroyed");
    }

    /// Replace all markers with one per city. Never leaves markers from an
    /// earlier call behind. A failed instance gets no markers.
    pub fn place_markers(
        &mut self,
        handle: MapHandle,
        cities: &[City],
        selected: Option<&City>,
    ) -> Result<Vec<MarkerId>, MapError> {
        if self.handle != Some(handle) {
            return Err(MapError::NotInitialized);
        }
        if let MapStatus::Failed(error) = &self.status {
            return Err(error.clone());
        }

        for marker in self.markers.drain(..) {
            self.widget.remove_marker(marker.id);
        }

        let selected_slug = selected.map(|c| c.slug.as_str());
        let mut ids = Vec::with_capacity(cities.len());
        for city in cities {
            let id = self
                .widget
                .add_marker(city.coordinate(), Some(city.slug.as_str()) == selected_slug);
            self.markers.push(PlacedMarker {
                id,
                slug: city.slug.clone(),
            });
            ids.push(id);
        }

        tracing::debug!("Placed {} markers", ids.len());
        Ok(ids)
    }

    /// Animate the camera to `at`. Fire-and-forget; does nothing without a live map.
    pub fn fly_to(&mut self, handle: MapHandle, at: Coordinate, zoom: f64, duration: Duration) {
        if self.handle != Some(handle) {
            tracing::debug!("fly_to ignored: map not initialized");
            return;
        }
        self.widget.fly_to(CameraMove {
            center: at,
            zoom,
            duration,
        });
    }

    /// Record the widget's load event
    pub fn mark_loaded(&mut self) {
        if self.status == MapStatus::Loading {
            self.status = MapStatus::Ready;
        }
    }

    /// Record a widget failure. The instance stays failed until destroyed.
    pub fn mark_failed(&mut self, message: impl Into<String>) -> MapError {
        let error = MapError::Widget(message.into());
        tracing::error!("{}", error);
        self.status = MapStatus::Failed(error.clone());
        error
    }

    /// Slug of the city a marker belongs to
    pub fn city_for_marker(&self, id: MarkerId) -> Option<&str> {
        self.markers
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.slug.as_str())
    }

    pub fn marker_for_city(&self, slug: &str) -> Option<MarkerId> {
        self.markers.iter().find(|m| m.slug == slug).map(|m| m.id)
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn handle(&self) -> Option<MapHandle> {
        self.handle
    }

    pub fn status(&self) -> &MapStatus {
        &self.status
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }
}
