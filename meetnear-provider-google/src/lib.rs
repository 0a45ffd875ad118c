//! Places provider implementation backed by the Google Places web API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use meetnear_core::{
    config::Settings,
    model::{Location, LocationFilter, Place, PlaceId, PlaceResults},
    ports::{PlacesPort, PortError},
};

const STATUS_OK: &str = "OK";
const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";
const STATUS_NOT_FOUND: &str = "NOT_FOUND";

/// Response from /place/nearbysearch and /place/textsearch
#[derive(Debug, Deserialize)]
struct SearchResponse {
    status: String,

    #[serde(default)]
    error_message: Option<String>,

    #[serde(default)]
    html_attributions: Vec<String>,

    #[serde(default)]
    next_page_token: Option<String>,

    #[serde(default)]
    results: Vec<SearchResult>,
}

/// Single place from a search response
#[derive(Debug, Deserialize)]
struct SearchResult {
    place_id: String,
    name: String,

    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    photo_reference: String,

    #[serde(default)]
    html_attributions: Vec<String>,
}

/// Response from /place/details; only the status matters for validity checks
#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,

    #[serde(default)]
    error_message: Option<String>,
}

/// Places port talking to Google Places.
pub struct GooglePlacesPort {
    client: Client,
    base_url: String,
    api_key: String,
    default_radius_meters: u32,
}

impl GooglePlacesPort {
    /// Create a new places port bound to the given HTTP client and settings.
    #[must_use]
    pub fn new(client: Client, settings: &Settings) -> Self {
        Self {
            client,
            base_url: settings.places_base_url.trim_end_matches('/').to_owned(),
            api_key: settings.google_api_key.clone(),
            default_radius_meters: settings.default_radius_meters,
        }
    }

    fn search_request(&self, location: &Location, filter: &LocationFilter) -> RequestBuilder {
        let mut req = match location {
            Location::Coordinates(point) => {
                let radius = filter.radius_meters.unwrap_or(self.default_radius_meters);
                self.client
                    .get(format!("{}/place/nearbysearch/json", self.base_url))
                    .query(&[
                        ("location", format!("{},{}", point.lat, point.lng)),
                        ("radius", radius.to_string()),
                    ])
            }
            Location::Text(text) => {
                let req = self
                    .client
                    .get(format!("{}/place/textsearch/json", self.base_url))
                    .query(&[("query", text.trim())]);
                match filter.radius_meters {
                    Some(radius) => req.query(&[("radius", radius.to_string())]),
                    None => req,
                }
            }
        };

        if let Some(place_type) = filter
            .place_type
            .as_deref()
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
        {
            req = req.query(&[("type", place_type)]);
        }

        req.query(&[("key", self.api_key.as_str())])
    }
}

#[async_trait]
impl PlacesPort for GooglePlacesPort {
    async fn find_nearby_places(
        &self,
        location: &Location,
        filter: &LocationFilter,
    ) -> Result<PlaceResults, PortError> {
        let resp = fetch_json::<SearchResponse>(self.search_request(location, filter)).await?;
        debug!(%location, status = %resp.status, results = resp.results.len(), "places search");

        if resp.status != STATUS_OK && resp.status != STATUS_ZERO_RESULTS {
            return Err(PortError::Provider {
                status: resp.status,
                message: resp.error_message,
            });
        }

        let places: Vec<Place> = resp.results.into_iter().map(to_place).collect();

        Ok(PlaceResults::new(
            resp.html_attributions.join(" "),
            resp.next_page_token,
            places,
        ))
    }

    async fn check_place_validity(&self, place_id: &PlaceId) -> Result<bool, PortError> {
        let req = self
            .client
            .get(format!("{}/place/details/json", self.base_url))
            .query(&[
                ("placeid", place_id.0.as_str()),
                ("fields", "place_id"),
                ("key", self.api_key.as_str()),
            ]);

        let resp = fetch_json::<DetailsResponse>(req).await?;
        debug!(%place_id, status = %resp.status, "place details");

        match resp.status.as_str() {
            STATUS_OK => Ok(true),
            STATUS_NOT_FOUND | STATUS_ZERO_RESULTS => Ok(false),
            _ => Err(PortError::Provider {
                status: resp.status,
                message: resp.error_message,
            }),
        }
    }
}

/// Build the places port as a shareable trait object.
#[must_use]
pub fn places_port(client: Client, settings: &Settings) -> Arc<dyn PlacesPort> {
    Arc::new(GooglePlacesPort::new(client, settings))
}

/// Build an HTTP client honouring the configured timeout.
///
/// # Errors
///
/// Returns [`PortError::Network`] when the TLS backend cannot be initialised.
pub fn http_client(settings: &Settings) -> Result<Client, PortError> {
    Client::builder()
        .user_agent(concat!("meetnear/", env!("CARGO_PKG_VERSION")))
        .timeout(settings.http_timeout())
        .build()
        .map_err(PortError::from)
}

/// The first photo, if any, supplies the photo reference and its attribution.
fn to_place(result: SearchResult) -> Place {
    let place = Place::new(result.place_id, result.name);
    match result.photos.into_iter().next() {
        Some(photo) => place.with_photo(photo.photo_reference, photo.html_attributions.join(" ")),
        None => place,
    }
}

// Small helper to fetch and decode JSON with status handling.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, PortError> {
    req.send()
        .await
        .map_err(PortError::from)?
        .error_for_status()
        .map_err(PortError::from)?
        .json()
        .await
        .map_err(PortError::from)
}
