//! Path routing for the two pages.

/// A resolved route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    City { slug: String },
}

impl Route {
    /// Parse a URL path. Query strings, fragments and trailing slashes are
    /// ignored. Returns `None` for paths no page handles.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim();

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Some(Route::Home),
            ["cities", slug] => Some(Route::City {
                slug: (*slug).to_string(),
            }),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::City { slug } => format!("/cities/{}", slug),
        }
    }
}
