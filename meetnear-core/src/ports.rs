//! Traits describing collaborator capabilities and the errors they report.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Error as ReqwestError;

use crate::model::{Location, LocationFilter, Meetup, MeetupId, PlaceId, PlaceResults, UserId};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to collaborator backends.
pub enum PortError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// The places provider answered with a status other than success.
    #[error("Places provider returned status {status}")]
    Provider {
        /// Upstream status string, e.g. `REQUEST_DENIED`.
        status: String,
        /// Optional message sent along with the status.
        message: Option<String>,
    },
    /// A store query or statement failed.
    #[error("Error occurred in database operation: {0}")]
    DataOperation(String),
    /// No meetup exists with the given identifier.
    #[error("Invalid meetup id: {0}")]
    MeetupNotFound(MeetupId),
    /// The user is not on the meetup's attendee list.
    #[error("User {user} is not attending meetup {meetup}")]
    NotAttending {
        /// Meetup that was targeted.
        meetup: MeetupId,
        /// User that was to be removed.
        user: UserId,
    },
    /// Internal collaborator error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[async_trait]
/// Capabilities of a places provider.
pub trait PlacesPort: Send + Sync {
    /// Look up places near `location`.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Provider`] when the provider reports a failure status,
    /// or another [`PortError`] when the request cannot be completed.
    async fn find_nearby_places(
        &self,
        location: &Location,
        filter: &LocationFilter,
    ) -> Result<PlaceResults, PortError>;

    /// Check whether `place_id` refers to an existing place.
    ///
    /// Returns `Ok(false)` when the provider reports the place as not found.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] for any other provider failure.
    async fn check_place_validity(&self, place_id: &PlaceId) -> Result<bool, PortError>;
}

#[async_trait]
/// Capabilities of the meetups store.
pub trait MeetupsPort: Send + Sync {
    /// Fetch meetups located at any of `place_ids`.
    ///
    /// `from` defaults to the current time and `to` to one week after `from`.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::DataOperation`] when the query fails.
    async fn query_meetups(
        &self,
        place_ids: &[PlaceId],
        meetup_type: Option<&str>,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Meetup>, PortError>;

    /// Persist a new meetup; the store assigns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::DataOperation`] when the insert fails.
    async fn insert_meetup(&self, meetup: &Meetup) -> Result<MeetupId, PortError>;

    /// Append `user_id` to the attendees of `meetup_id`.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::MeetupNotFound`] when the meetup does not exist.
    async fn add_attendee(&self, meetup_id: MeetupId, user_id: UserId) -> Result<(), PortError>;

    /// Remove `user_id` from the attendees of `meetup_id`.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::MeetupNotFound`] when the meetup does not exist and
    /// [`PortError::NotAttending`] when the user is not an attendee.
    async fn remove_attendee(
        &self,
        meetup_id: MeetupId,
        user_id: UserId,
    ) -> Result<(), PortError>;
}

#[async_trait]
/// Capabilities of the users store.
pub trait UsersPort: Send + Sync {
    /// Check whether `user_id` belongs to a registered user.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::DataOperation`] when the lookup fails.
    async fn check_user_validity(&self, user_id: UserId) -> Result<bool, PortError>;
}
