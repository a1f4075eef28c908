use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{GeoPoint, Place, PlaceSearch, haversine_km};

const CATEGORY_SEARCH_LIMIT: usize = 15;
const BROADER_SEARCH_LIMIT: usize = 10;
const BROADER_TERMS: &[&str] = &["hospital", "clinic", "medical center"];

/// Mapbox-backed provider search. A category pass over the Search Box API
/// first; when that yields nothing within the radius, a broader pass over
/// the geocoding POI index, term by term, deduplicated by feature id.
#[derive(Debug, Clone)]
pub struct MapboxPlaceSearch {
    client: Client,
    access_token: String,
}

impl MapboxPlaceSearch {
    pub fn new(access_token: String) -> Self {
        Self {
            client: Client::new(),
            access_token,
        }
    }

    async fn category_pass(&self, category: &str, origin: GeoPoint) -> anyhow::Result<Vec<Place>> {
        let url = format!("https://api.mapbox.com/search/searchbox/v1/category/{category}");
        let response = self
            .client
            .get(url)
            .query(&[
                ("proximity", format!("{},{}", origin.lng, origin.lat)),
                ("access_token", self.access_token.clone()),
                ("limit", CATEGORY_SEARCH_LIMIT.to_string()),
            ])
            .send()
            .await
            .map_err(|error| {
                warn!(?error, "mapbox category request failed");
                error
            })?
            .error_for_status()
            .map_err(|error| {
                warn!(?error, "mapbox category search returned error status");
                error
            })?
            .json::<CategoryResponse>()
            .await?;

        debug!(
            category,
            feature_count = response.features.len(),
            "mapbox category pass done"
        );

        let places = response
            .features
            .into_iter()
            .map(|feature| {
                let [lng, lat] = feature.geometry.coordinates;
                let address = feature
                    .properties
                    .full_address
                    .or(feature.properties.place_formatted)
                    .unwrap_or_default();
                Place {
                    name: feature.properties.name,
                    address,
                    category: category.to_owned(),
                    lat,
                    lng,
                    distance_km: haversine_km(origin, GeoPoint { lat, lng }),
                }
            })
            .collect();

        Ok(places)
    }

    async fn broader_pass(&self, origin: GeoPoint) -> anyhow::Result<Vec<Place>> {
        let mut by_id: HashMap<String, Place> = HashMap::new();

        for term in BROADER_TERMS {
            let encoded = term.replace(' ', "%20");
            let url =
                format!("https://api.mapbox.com/geocoding/v5/mapbox.places/{encoded}.json");
            let response = self
                .client
                .get(url)
                .query(&[
                    ("proximity", format!("{},{}", origin.lng, origin.lat)),
                    ("access_token", self.access_token.clone()),
                    ("types", "poi".to_owned()),
                    ("limit", BROADER_SEARCH_LIMIT.to_string()),
                ])
                .send()
                .await?
                .error_for_status()?
                .json::<GeocodingResponse>()
                .await?;

            debug!(
                term,
                feature_count = response.features.len(),
                "mapbox broader pass term done"
            );

            for feature in response.features {
                let [lng, lat] = feature.center;
                let address = feature
                    .properties
                    .address
                    .clone()
                    .unwrap_or_else(|| feature.place_name.clone());
                by_id.entry(feature.id.clone()).or_insert(Place {
                    name: feature.text,
                    address,
                    category: (*term).to_owned(),
                    lat,
                    lng,
                    distance_km: haversine_km(origin, GeoPoint { lat, lng }),
                });
            }
        }

        Ok(by_id.into_values().collect())
    }
}

#[async_trait]
impl PlaceSearch for MapboxPlaceSearch {
    async fn search_nearby(
        &self,
        category: &str,
        origin: GeoPoint,
        radius_km: f64,
        limit: usize,
    ) -> anyhow::Result<Vec<Place>> {
        let mut places = self.category_pass(category, origin).await?;
        places.retain(|place| place.distance_km <= radius_km);

        if places.is_empty() {
            info!(category, radius_km, "no category results, broadening search");
            places = self.broader_pass(origin).await?;
        }

        places.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        places.truncate(limit);

        info!(result_count = places.len(), "mapbox nearby search done");
        Ok(places)
    }
}

#[derive(Debug, Deserialize)]
struct CategoryResponse {
    #[serde(default)]
    features: Vec<CategoryFeature>,
}

#[derive(Debug, Deserialize)]
struct CategoryFeature {
    properties: CategoryProperties,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct CategoryProperties {
    name: String,
    #[serde(default)]
    full_address: Option<String>,
    #[serde(default)]
    place_formatted: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    coordinates: [f64; 2],
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    features: Vec<GeocodingFeature>,
}

#[derive(Debug, Deserialize)]
struct GeocodingFeature {
    id: String,
    text: String,
    place_name: String,
    #[serde(default)]
    properties: GeocodingProperties,
    center: [f64; 2],
}

#[derive(Debug, Default, Deserialize)]
struct GeocodingProperties {
    #[serde(default)]
    address: Option<String>,
}
