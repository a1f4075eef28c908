mod mapbox;
mod synthetic;

use async_trait::async_trait;
use serde::Serialize;

pub use mapbox::MapboxPlaceSearch;
pub use synthetic::{SyntheticPlaceDirectory, fallback_places};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// One nearby healthcare provider or facility.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    pub name: String,
    pub address: String,
    pub category: String,
    pub lat: f64,
    pub lng: f64,
    pub distance_km: f64,
}

/// Geocoding collaborator. Result count is never guaranteed; callers degrade
/// to the synthetic directory instead of treating empty as an error.
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    async fn search_nearby(
        &self,
        category: &str,
        origin: GeoPoint,
        radius_km: f64,
        limit: usize,
    ) -> anyhow::Result<Vec<Place>>;
}

const EARTH_RADIUS_KM: f64 = 6371.0;

pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_of_identical_points_is_zero() {
        let point = GeoPoint { lat: 48.2, lng: 16.4 };
        assert!(haversine_km(point, point).abs() < 1e-9);
    }

    #[test]
    fn haversine_matches_one_equator_degree() {
        let a = GeoPoint { lat: 0.0, lng: 0.0 };
        let b = GeoPoint { lat: 0.0, lng: 1.0 };
        let distance = haversine_km(a, b);
        assert!((110.0..112.5).contains(&distance), "got {distance}");
    }

    #[test]
    fn haversine_is_symmetric() {
        let a = GeoPoint { lat: 52.52, lng: 13.40 };
        let b = GeoPoint { lat: 48.85, lng: 2.35 };
        let there = haversine_km(a, b);
        let back = haversine_km(b, a);
        assert!((there - back).abs() < 1e-9);
        assert!((800.0..1000.0).contains(&there), "got {there}");
    }
}
