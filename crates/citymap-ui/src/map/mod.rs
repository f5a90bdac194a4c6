//! Map surface and the widget seam it drives.

pub mod headless;
pub mod surface;
pub mod widget;

pub use headless::{HeadlessMap, HeadlessMarker, HeadlessPopup};
pub use surface::{MapHandle, MapStatus, MapSurface};
pub use widget::{
    CameraMove, ControlPosition, MapEvent, MapOptions, MapWidget, MarkerId, PopupId, PopupOptions,
};
