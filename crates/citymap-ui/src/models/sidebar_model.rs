//! City directory sidebar: filter box plus the list of city links.

use citymap_core::{catalog, find_by_slug, City};

/// Cities whose title contains `query`, case-insensitively, in catalog
/// order. A blank query matches everything.
pub fn filter<'a>(cities: &'a [City], query: &str) -> Vec<&'a City> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return cities.iter().collect();
    }
    cities
        .iter()
        .filter(|city| city.title.to_lowercase().contains(&needle))
        .collect()
}

/// Resolve the `:city` route parameter. Unknown slugs resolve to `None`.
pub fn selected_city(route_param: Option<&str>) -> Option<&'static City> {
    route_param.and_then(find_by_slug)
}

#[derive(Debug, Default)]
pub struct SidebarModel {
    query: String,
    selected: Option<&'static City>,
}

impl SidebarModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        tracing::trace!("Sidebar filter set to {:?}", self.query);
    }

    /// Cities currently listed
    pub fn visible(&self) -> Vec<&'static City> {
        filter(catalog(), &self.query)
    }

    pub fn selected(&self) -> Option<&'static City> {
        self.selected
    }

    /// Sync the highlighted entry with the current route
    pub fn set_selected(&mut self, route_param: Option<&str>) {
        self.selected = selected_city(route_param);
    }

    /// Index of the selected entry within the visible list, if it is
    /// listed, so the view can scroll it into view.
    pub fn scroll_target(&self) -> Option<usize> {
        let selected = self.selected?;
        self.visible()
            .iter()
            .position(|city| city.slug == selected.slug)
    }

    /// A link was activated. Returns the path to navigate to.
    pub fn select(&mut self, slug: &str) -> Option<String> {
        let city = find_by_slug(slug)?;
        self.selected = Some(city);
        Some(city.path())
    }

    pub fn is_selected(&self, slug: &str) -> bool {
        self.selected.is_some_and(|city| city.slug == slug)
    }
}
