//! Static catalog of the cities shown on the map.
//!
//! The catalog is built once on first access and never changes afterwards.
//! Slugs are derived from titles, so the route segment for a city is always
//! `slugify(title)`.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// True if latitude is within [-90, 90] and longitude within [-180, 180].
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

/// A city entry in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct City {
    pub title: String,
    pub slug: String,
    pub lat: f64,
    pub lon: f64,
}

impl City {
    fn new(title: &str, lat: f64, lon: f64) -> Self {
        Self {
            title: title.to_string(),
            slug: slugify(title),
            lat,
            lon,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }

    /// Route path for this city, e.g. `/cities/new-york-city`.
    pub fn path(&self) -> String {
        format!("/cities/{}", self.slug)
    }
}

/// Lowercase the title and collapse each run of whitespace into one hyphen.
pub fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

static CATALOG: LazyLock<Vec<City>> = LazyLock::new(|| {
    vec![
        City::new("Lagos", 6.5244, 3.3792),
        City::new("Tokyo", 35.6762, 139.6503),
        City::new("Paris", 48.8566, 2.3522),
        City::new("New York City", 40.7128, -74.006),
        City::new("London", 51.5074, -0.1278),
        City::new("Dubai", 25.2048, 55.2708),
        City::new("Sydney", -33.8688, 151.2093),
        City::new("Rio de Janeiro", -22.9068, -43.1729),
        City::new("Cairo", 30.0444, 31.2357),
        City::new("Mumbai", 19.076, 72.8777),
        City::new("Berlin", 52.52, 13.405),
        City::new("Cape Town", -33.9249, 18.4241),
        City::new("Toronto", 43.6532, -79.3832),
        City::new("Rome", 41.9028, 12.4964),
        City::new("Beijing", 39.9042, 116.4074),
        City::new("Mexico City", 19.4326, -99.1332),
        City::new("Moscow", 55.7558, 37.6176),
        City::new("Istanbul", 41.0082, 28.9784),
        City::new("Buenos Aires", -34.6118, -58.396),
        City::new("Seoul", 37.5665, 126.978),
        City::new("Amsterdam", 52.3676, 4.9041),
    ]
});

/// All cities, in display order.
pub fn catalog() -> &'static [City] {
    &CATALOG
}

/// Exact slug lookup.
pub fn find_by_slug(slug: &str) -> Option<&'static City> {
    CATALOG.iter().find(|c| c.slug == slug)
}
