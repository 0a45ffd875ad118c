use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use meetnear_core::{
    Location,
    config::{
        ConfigError, DEFAULT_DATABASE_PATH, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_PLACES_BASE_URL,
        DEFAULT_RADIUS_METERS, Settings,
    },
};

/// Find meetups near a place and manage RSVPs.
#[derive(Debug, Parser)]
#[command(name = "meetnear", version, about, long_about = None)]
pub(crate) struct Cli {
    /// SQLite database file holding meetups and users
    #[arg(long, global = true, env = "MEETNEAR_DATABASE", default_value = DEFAULT_DATABASE_PATH)]
    pub database: String,

    /// Log level used when RUST_LOG is unset
    #[arg(long, global = true, env = "MEETNEAR_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Google Places API key; required by every command except add-user
    #[arg(long, global = true, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the places web service
    #[arg(long, global = true, env = "MEETNEAR_PLACES_URL", default_value = DEFAULT_PLACES_BASE_URL)]
    pub places_url: String,

    /// Radius in meters for searches that name none
    #[arg(long, global = true, env = "MEETNEAR_SEARCH_RADIUS", default_value_t = DEFAULT_RADIUS_METERS)]
    pub default_radius: u32,

    /// Timeout for each places request, in seconds
    #[arg(long, global = true, env = "MEETNEAR_HTTP_TIMEOUT", default_value_t = DEFAULT_HTTP_TIMEOUT_SECS)]
    pub http_timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Provider settings from the parsed options.
    pub(crate) fn settings(&self) -> Result<Settings, ConfigError> {
        let mut settings = Settings::require_api_key(self.api_key.as_deref())?
            .with_places_base_url(&self.places_url);
        settings.default_radius_meters = self.default_radius;
        settings.http_timeout_secs = self.http_timeout;
        Ok(settings)
    }
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// List places near a location with the meetups scheduled there
    Find {
        /// "lat,lng" or free text such as "Austin, TX"
        location: String,
        /// Only places of this provider type, e.g. "cafe"
        #[arg(long)]
        place_type: Option<String>,
        /// Search radius in meters
        #[arg(long)]
        radius: Option<u32>,
        /// Only meetups of this type
        #[arg(long)]
        meetup_type: Option<String>,
        /// Earliest start (RFC 3339); defaults to now
        #[arg(long)]
        from: Option<DateTime<Utc>>,
        /// Latest end (RFC 3339); defaults to a week after --from
        #[arg(long)]
        to: Option<DateTime<Utc>>,
    },
    /// Schedule a meetup at a place
    Create {
        /// Provider place id
        #[arg(long)]
        place: String,
        #[arg(long)]
        name: String,
        #[arg(long = "type")]
        meetup_type: String,
        /// User id of the creator
        #[arg(long)]
        creator: i64,
        /// Start time (RFC 3339)
        #[arg(long)]
        start: DateTime<Utc>,
        /// End time (RFC 3339)
        #[arg(long)]
        end: Option<DateTime<Utc>>,
    },
    /// Join a meetup
    Rsvp {
        #[arg(long)]
        meetup: i64,
        #[arg(long)]
        user: i64,
    },
    /// Leave a meetup
    Unrsvp {
        #[arg(long)]
        meetup: i64,
        #[arg(long)]
        user: i64,
    },
    /// Register a user
    AddUser {
        username: String,
    },
}

/// Treat "lat,lng" as coordinates and anything else as text.
pub(crate) fn parse_location(input: &str) -> Location {
    let trimmed = input.trim();
    if let Some((lat, lng)) = trimmed.split_once(',')
        && let (Ok(lat), Ok(lng)) = (lat.trim().parse::<f64>(), lng.trim().parse::<f64>())
    {
        return Location::at(lat, lng);
    }
    Location::Text(trimmed.to_owned())
}
