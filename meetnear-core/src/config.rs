//! Runtime settings and configuration errors.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::collaborators::Collaborator;

/// Default base URL of the Google Maps web services.
pub const DEFAULT_PLACES_BASE_URL: &str = "https://maps.googleapis.com/maps/api";
/// Default database file.
pub const DEFAULT_DATABASE_PATH: &str = "meetnear.db";
/// Search radius used when a location filter names none.
pub const DEFAULT_RADIUS_METERS: u32 = 5_000;
/// Default HTTP timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

const API_KEY_SETTING: &str = "GOOGLE_API_KEY";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
/// Errors raised while assembling the service or its settings.
pub enum ConfigError {
    /// A collaborator was not supplied.
    #[error("Invalid {0} collaborator passed to meetups service")]
    MissingCollaborator(Collaborator),
    /// A required setting is absent.
    #[error("Missing required setting {0}")]
    MissingSetting(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Settings shared by the collaborator implementations.
pub struct Settings {
    /// Key for the Google Places API.
    pub google_api_key: String,
    /// Base URL of the places web service, without a trailing slash.
    pub places_base_url: String,
    /// Radius applied when a search names none.
    pub default_radius_meters: u32,
    /// Timeout for each places request, in seconds.
    pub http_timeout_secs: u64,
}

impl Settings {
    /// Settings with defaults for everything but the API key.
    #[must_use]
    pub fn with_api_key<K: Into<String>>(google_api_key: K) -> Self {
        Self {
            google_api_key: google_api_key.into(),
            places_base_url: DEFAULT_PLACES_BASE_URL.to_owned(),
            default_radius_meters: DEFAULT_RADIUS_METERS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }

    /// Default settings for a key that may be missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSetting`] when the key is absent or blank.
    pub fn require_api_key(google_api_key: Option<&str>) -> Result<Self, ConfigError> {
        google_api_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(Self::with_api_key)
            .ok_or(ConfigError::MissingSetting(API_KEY_SETTING))
    }

    /// Point the places provider at another base URL.
    #[must_use]
    pub fn with_places_base_url(mut self, url: &str) -> Self {
        url.trim_end_matches('/').clone_into(&mut self.places_base_url);
        self
    }

    /// Timeout for each places request.
    #[must_use]
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
