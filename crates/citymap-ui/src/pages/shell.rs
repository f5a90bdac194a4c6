//! Page/layout shell: sidebar on the left, routed page on the right.

use std::sync::Arc;

use citymap_core::MapConfig;

use crate::app_services::AppServices;
use crate::map::MapWidget;
use crate::models::SidebarModel;
use crate::router::Route;

use super::city_page::CityPage;

/// Where the landing page's "open the map" link points
pub const HOME_MAP_LINK: &str = "/cities/start";

pub enum Page<W: MapWidget> {
    Home,
    City(CityPage<W>),
}

pub struct Shell<W: MapWidget, F: FnMut() -> W> {
    services: Arc<AppServices>,
    map_config: MapConfig,
    new_widget: F,
    sidebar: SidebarModel,
    route: Route,
    page: Page<W>,
}

impl<W: MapWidget, F: FnMut() -> W> Shell<W, F> {
    /// `new_widget` creates the map widget each time a city page mounts
    pub fn new(services: Arc<AppServices>, map_config: MapConfig, new_widget: F) -> Self {
        Self {
            services,
            map_config,
            new_widget,
            sidebar: SidebarModel::new(),
            route: Route::Home,
            page: Page::Home,
        }
    }

    /// Resolve `path` and show the matching page. Unmatched paths fall
    /// back to the landing page.
    pub fn navigate(&mut self, path: &str) -> &Route {
        let route = Route::parse(path).unwrap_or_else(|| {
            tracing::warn!("No page for {:?}, showing home", path);
            Route::Home
        });
        tracing::info!("Navigating to {}", route.path());

        match &route {
            Route::Home => {
                self.sidebar.set_selected(None);
                // Dropping the city page tears it down
                self.page = Page::Home;
            }
            Route::City { slug } => {
                self.sidebar.set_selected(Some(slug.as_str()));
                match &mut self.page {
                    Page::City(page) => page.select_city(Some(slug.as_str())),
                    Page::Home => {
                        let mut page = CityPage::new(
                            (self.new_widget)(),
                            self.map_config.clone(),
                            self.services.clone(),
                        );
                        page.mount(Some(slug.as_str()));
                        self.page = Page::City(page);
                    }
                }
            }
        }

        self.route = route;
        &self.route
    }

    /// A sidebar link was clicked
    pub fn select_from_sidebar(&mut self, slug: &str) -> bool {
        match self.sidebar.select(slug) {
            Some(path) => {
                self.navigate(&path);
                true
            }
            None => false,
        }
    }

    /// Pump the current page's event queues
    pub fn poll(&mut self) -> usize {
        match &mut self.page {
            Page::City(page) => page.poll(),
            Page::Home => 0,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn page(&self) -> &Page<W> {
        &self.page
    }

    pub fn city_page(&self) -> Option<&CityPage<W>> {
        match &self.page {
            Page::City(page) => Some(page),
            Page::Home => None,
        }
    }

    pub fn city_page_mut(&mut self) -> Option<&mut CityPage<W>> {
        match &mut self.page {
            Page::City(page) => Some(page),
            Page::Home => None,
        }
    }

    pub fn sidebar(&self) -> &SidebarModel {
        &self.sidebar
    }

    pub fn sidebar_mut(&mut self) -> &mut SidebarModel {
        &mut self.sidebar
    }
}
