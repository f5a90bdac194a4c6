//! In-memory map widget.
//!
//! Keeps markers, popups and the camera in plain collections so the page
//! can run without a renderer (command line, tests). User interaction is
//! simulated with [`HeadlessMap::click_marker`] and friends, which emit the
//! same events a real widget would.

use std::collections::BTreeMap;
use std::sync::mpsc::Sender;

use citymap_core::{Coordinate, MapError};

use super::widget::{
    CameraMove, MapEvent, MapOptions, MapWidget, MarkerId, PopupId, PopupOptions,
};

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessMarker {
    pub at: Coordinate,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessPopup {
    pub at: Coordinate,
    pub html: String,
    pub options: PopupOptions,
}

/// How the simulated widget behaves on mount
#[derive(Debug, Clone, PartialEq, Default)]
enum LoadBehavior {
    #[default]
    Load,
    Fail(String),
    Manual,
}

#[derive(Debug, Default)]
pub struct HeadlessMap {
    behavior: LoadBehavior,
    options: Option<MapOptions>,
    events: Option<Sender<MapEvent>>,
    camera: Option<CameraMove>,
    markers: BTreeMap<MarkerId, HeadlessMarker>,
    popups: BTreeMap<PopupId, HeadlessPopup>,
    next_id: u64,
    mount_count: usize,
}

impl HeadlessMap {
    /// Widget that reports `Loaded` as soon as it is mounted
    pub fn new() -> Self {
        Self::default()
    }

    /// Widget that reports an error instead of loading
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            behavior: LoadBehavior::Fail(message.into()),
            ..Self::default()
        }
    }

    /// Widget that stays loading until [`HeadlessMap::finish_loading`]
    pub fn manual() -> Self {
        Self {
            behavior: LoadBehavior::Manual,
            ..Self::default()
        }
    }

    fn emit(&self, event: MapEvent) {
        match &self.events {
            Some(tx) => {
                if tx.send(event).is_err() {
                    tracing::debug!("Map event dropped: receiver is gone");
                }
            }
            None => tracing::debug!("Map event {:?} ignored: widget not mounted", event),
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn finish_loading(&self) {
        self.emit(MapEvent::Loaded);
    }

    pub fn fail(&self, message: impl Into<String>) {
        self.emit(MapEvent::Error(message.into()));
    }

    /// Simulate a click on a marker. Unknown ids are ignored like a click
    /// on empty map would be for a real widget.
    pub fn click_marker(&self, id: MarkerId) {
        if self.markers.contains_key(&id) {
            self.emit(MapEvent::MarkerClicked(id));
        } else {
            self.emit(MapEvent::BackgroundClicked);
        }
    }

    pub fn click_background(&self) {
        self.emit(MapEvent::BackgroundClicked);
    }

    /// Simulate the user closing a popup from the widget side
    pub fn dismiss_popup(&mut self, id: PopupId) {
        if self.popups.remove(&id).is_some() {
            self.emit(MapEvent::PopupClosed(id));
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.options.is_some()
    }

    pub fn mount_count(&self) -> usize {
        self.mount_count
    }

    pub fn options(&self) -> Option<&MapOptions> {
        self.options.as_ref()
    }

    pub fn camera(&self) -> Option<&CameraMove> {
        self.camera.as_ref()
    }

    pub fn markers(&self) -> &BTreeMap<MarkerId, HeadlessMarker> {
        &self.markers
    }

    pub fn popups(&self) -> &BTreeMap<PopupId, HeadlessPopup> {
        &self.popups
    }

    /// The only open popup, if exactly one is open
    pub fn single_popup(&self) -> Option<&HeadlessPopup> {
        match self.popups.len() {
            1 => self.popups.values().next(),
            _ => None,
        }
    }
}

impl MapWidget for HeadlessMap {
    fn mount(&mut self, options: &MapOptions, events: Sender<MapEvent>) -> Result<(), MapError> {
        if options.container.trim().is_empty() {
            return Err(MapError::MissingContainer);
        }

        self.options = Some(options.clone());
        self.events = Some(events);
        self.camera = Some(CameraMove {
            center: options.center,
            zoom: options.zoom,
            duration: std::time::Duration::ZERO,
        });
        self.mount_count += 1;

        match &self.behavior {
            LoadBehavior::Load => self.emit(MapEvent::Loaded),
            LoadBehavior::Fail(message) => self.emit(MapEvent::Error(message.clone())),
            LoadBehavior::Manual => {}
        }
        Ok(())
    }

    fn unmount(&mut self) {
        self.options = None;
        self.events = None;
        self.camera = None;
        self.markers.clear();
        self.popups.clear();
    }

    fn add_marker(&mut self, at: Coordinate, selected: bool) -> MarkerId {
        let id = MarkerId(self.next_id());
        self.markers.insert(id, HeadlessMarker { at, selected });
        id
    }

    fn remove_marker(&mut self, id: MarkerId) {
        self.markers.remove(&id);
    }

    fn open_popup(&mut self, at: Coordinate, html: &str, options: PopupOptions) -> PopupId {
        let id = PopupId(self.next_id());
        self.popups.insert(
            id,
            HeadlessPopup {
                at,
                html: html.to_string(),
                options,
            },
        );
        id
    }

    fn set_popup_html(&mut self, id: PopupId, html: &str) {
        if let Some(popup) = self.popups.get_mut(&id) {
            popup.html = html.to_string();
        }
    }

    fn close_popup(&mut self, id: PopupId) {
        self.popups.remove(&id);
    }

    fn fly_to(&mut self, camera: CameraMove) {
        self.camera = Some(camera);
    }
}
