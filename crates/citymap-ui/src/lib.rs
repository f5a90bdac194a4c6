//! View layer for CityMap: map surface, popup controller, sidebar, router
//! and the pages that tie them together.

pub mod app_services;
pub mod error_mapping;
pub mod map;
pub mod models;
pub mod pages;
pub mod router;
pub mod services;

pub use app_services::AppServices;
pub use map::{HeadlessMap, MapEvent, MapStatus, MapSurface, MapWidget};
pub use models::{PopupController, PopupState, SidebarModel};
pub use pages::{CityPage, Page, Shell, HOME_MAP_LINK};
pub use router::Route;
