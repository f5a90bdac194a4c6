pub mod popup_model;
pub mod sidebar_model;

pub use popup_model::{PopupController, PopupState};
pub use sidebar_model::{filter, selected_city, SidebarModel};
