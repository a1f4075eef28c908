use async_trait::async_trait;

use super::{GeoPoint, Place, PlaceSearch};

/// Fixed placeholder entries keeping the nearby flow usable when no map
/// token is configured or the live search comes back empty.
pub fn fallback_places(origin: GeoPoint) -> Vec<Place> {
    let entries: [(&str, &str, &str, f64, f64, f64); 3] = [
        (
            "Dr. Sarah Johnson",
            "General Physician",
            "123 Medical Center, Downtown",
            1.1,
            0.004,
            0.006,
        ),
        (
            "Dr. Michael Chen",
            "Cardiologist",
            "456 Health Avenue, Westside",
            1.9,
            -0.009,
            0.012,
        ),
        (
            "Dr. Emily Williams",
            "Pediatrician",
            "789 Care Boulevard, Northside",
            2.4,
            0.015,
            -0.010,
        ),
    ];

    entries
        .into_iter()
        .map(
            |(name, category, address, distance_km, lat_offset, lng_offset)| Place {
                name: name.to_owned(),
                address: address.to_owned(),
                category: category.to_owned(),
                lat: origin.lat + lat_offset,
                lng: origin.lng + lng_offset,
                distance_km,
            },
        )
        .collect()
}

#[derive(Debug, Default)]
pub struct SyntheticPlaceDirectory;

#[async_trait]
impl PlaceSearch for SyntheticPlaceDirectory {
    async fn search_nearby(
        &self,
        _category: &str,
        origin: GeoPoint,
        _radius_km: f64,
        limit: usize,
    ) -> anyhow::Result<Vec<Place>> {
        let mut places = fallback_places(origin);
        places.truncate(limit);
        Ok(places)
    }
}
