//! Seam between the map surface and the rendering widget.
//!
//! The widget is an external collaborator: it draws the basemap, places
//! markers and popups, animates the camera and reports what happened via
//! [`MapEvent`]s sent on the channel handed to [`MapWidget::mount`].

use std::sync::mpsc::Sender;
use std::time::Duration;

use citymap_core::{Coordinate, MapError};

/// Marker handle issued by the widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub u64);

/// Popup handle issued by the widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PopupId(pub u64);

/// Corner for the zoom/rotate control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Everything the widget needs to create a map instance
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub container: String,
    pub access_token: String,
    pub style_url: String,
    pub center: Coordinate,
    pub zoom: f64,
    pub navigation_control: Option<ControlPosition>,
}

/// Popup presentation options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopupOptions {
    /// Pixel offset from the anchor
    pub offset: f64,
    pub close_button: bool,
}

impl Default for PopupOptions {
    fn default() -> Self {
        Self {
            offset: 25.0,
            close_button: false,
        }
    }
}

/// Animated camera move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMove {
    pub center: Coordinate,
    pub zoom: f64,
    pub duration: Duration,
}

/// Events emitted by the widget
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Style and tiles finished loading
    Loaded,
    /// Tile, style or network failure
    Error(String),
    MarkerClicked(MarkerId),
    /// Click on the map outside any marker or popup
    BackgroundClicked,
    /// Popup closed by the widget itself (close button, escape key)
    PopupClosed(PopupId),
}

/// Primitives the map surface and popup controller depend on
pub trait MapWidget {
    /// Create the map instance. Events are delivered on `events` until
    /// [`MapWidget::unmount`] is called.
    fn mount(&mut self, options: &MapOptions, events: Sender<MapEvent>) -> Result<(), MapError>;

    /// Destroy the map instance and release listeners
    fn unmount(&mut self);

    fn add_marker(&mut self, at: Coordinate, selected: bool) -> MarkerId;

    fn remove_marker(&mut self, id: MarkerId);

    fn open_popup(&mut self, at: Coordinate, html: &str, options: PopupOptions) -> PopupId;

    fn set_popup_html(&mut self, id: PopupId, html: &str);

    fn close_popup(&mut self, id: PopupId);

    /// Start a camera animation. Returns immediately.
    fn fly_to(&mut self, camera: CameraMove);
}
