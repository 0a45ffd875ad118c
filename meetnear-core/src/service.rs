//! Meetup coordination service combining the places, meetups, and users collaborators.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::collaborators::{Collaborators, CollaboratorsBuilder};
use crate::config::ConfigError;
use crate::model::{
    Location, LocationFilter, Meetup, MeetupFilter, MeetupId, MeetupLocations, PlaceId, UserId,
};
use crate::ports::{MeetupsPort, PlacesPort, PortError, UsersPort};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Attendee operations whose not-found failures are reported to callers.
pub enum Operation {
    /// Joining a meetup.
    Rsvp,
    /// Leaving a meetup.
    UnRsvp,
}

impl fmt::Display for Operation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Rsvp => "rsvp",
            Operation::UnRsvp => "unRsvp",
        };
        write!(formatter, "{name}")
    }
}

#[derive(thiserror::Error, Debug)]
/// Errors surfaced by [`MeetupService`].
pub enum ServiceError {
    /// The places provider does not know the place.
    #[error("Invalid place id passed to createMeetup")]
    InvalidPlaceId(PlaceId),
    /// The users store does not know the user.
    #[error("Invalid user id passed to rsvp")]
    InvalidUserId(UserId),
    /// The meetups store does not know the meetup.
    #[error("Invalid meetup id passed to {operation}")]
    InvalidMeetupId {
        /// Identifier that was not found.
        meetup: MeetupId,
        /// Operation that was attempted.
        operation: Operation,
    },
    /// Any other collaborator failure, unchanged.
    #[error(transparent)]
    Port(#[from] PortError),
}

/// Public entry point for searching, creating, and joining meetups.
pub struct MeetupService {
    places: Arc<dyn PlacesPort>,
    meetups: Arc<dyn MeetupsPort>,
    users: Arc<dyn UsersPort>,
}

impl MeetupService {
    /// Create a new service bound to the provided collaborators.
    #[must_use]
    pub fn new(collaborators: Collaborators) -> Self {
        let Collaborators {
            places,
            meetups,
            users,
        } = collaborators;
        Self {
            places,
            meetups,
            users,
        }
    }

    /// Create a service from a builder that may still lack collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCollaborator`] naming the missing collaborator.
    pub fn try_from_builder(builder: CollaboratorsBuilder) -> Result<Self, ConfigError> {
        builder.build().map(Self::new)
    }

    /// Find places near `location` together with the meetups scheduled at each.
    ///
    /// `None` filters behave exactly like their empty defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Port`] with the collaborator's error when either
    /// the places lookup or the meetups query fails.
    pub async fn find_meetup_locations(
        &self,
        location: &Location,
        location_filter: Option<&LocationFilter>,
        meetup_filter: Option<&MeetupFilter>,
    ) -> Result<MeetupLocations, ServiceError> {
        let no_location_filter = LocationFilter::default();
        let no_meetup_filter = MeetupFilter::default();
        let location_filter = location_filter.unwrap_or(&no_location_filter);
        let meetup_filter = meetup_filter.unwrap_or(&no_meetup_filter);

        let results = self
            .places
            .find_nearby_places(location, location_filter)
            .await?;
        let place_ids = results.place_ids();
        debug!(%location, places = place_ids.len(), "found nearby places");

        let meetups = self
            .meetups
            .query_meetups(
                &place_ids,
                meetup_filter.meetup_type.as_deref(),
                meetup_filter.from,
                meetup_filter.to,
            )
            .await?;
        debug!(meetups = meetups.len(), "queried meetups for places");

        Ok(MeetupLocations::join(results, &meetups))
    }

    /// Create a meetup at `place_id` with `creator` as its only attendee.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidPlaceId`] when the places provider reports
    /// the place as unknown; nothing is inserted in that case. Collaborator
    /// failures are returned as [`ServiceError::Port`].
    pub async fn create_meetup(
        &self,
        place_id: &PlaceId,
        name: &str,
        meetup_type: &str,
        creator: UserId,
        start_date: DateTime<Utc>,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<MeetupId, ServiceError> {
        if !self.places.check_place_validity(place_id).await? {
            warn!(%place_id, "rejected meetup for unknown place");
            return Err(ServiceError::InvalidPlaceId(place_id.clone()));
        }

        let meetup = Meetup::new(
            name,
            meetup_type,
            start_date,
            end_date,
            place_id.clone(),
            creator,
        );
        let id = self.meetups.insert_meetup(&meetup).await?;
        info!(meetup = %id, %place_id, %creator, "created meetup");
        Ok(id)
    }

    /// Add `user_id` to the attendees of `meetup_id`.
    ///
    /// Membership is not pre-checked; repeated calls are handled by the store.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidUserId`] when the user is unknown (the
    /// store is not touched), [`ServiceError::InvalidMeetupId`] when the meetup
    /// does not exist, and [`ServiceError::Port`] for anything else.
    pub async fn rsvp(&self, meetup_id: MeetupId, user_id: UserId) -> Result<(), ServiceError> {
        if !self.users.check_user_validity(user_id).await? {
            warn!(user = %user_id, meetup = %meetup_id, "rejected rsvp for unknown user");
            return Err(ServiceError::InvalidUserId(user_id));
        }

        self.meetups
            .add_attendee(meetup_id, user_id)
            .await
            .map_err(|err| translate_not_found(err, Operation::Rsvp))?;
        info!(user = %user_id, meetup = %meetup_id, "added attendee");
        Ok(())
    }

    /// Remove `user_id` from the attendees of `meetup_id`.
    ///
    /// The user id is not validated.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidMeetupId`] when the meetup does not exist
    /// and [`ServiceError::Port`] for anything else, including
    /// [`PortError::NotAttending`].
    pub async fn un_rsvp(&self, meetup_id: MeetupId, user_id: UserId) -> Result<(), ServiceError> {
        self.meetups
            .remove_attendee(meetup_id, user_id)
            .await
            .map_err(|err| translate_not_found(err, Operation::UnRsvp))?;
        info!(user = %user_id, meetup = %meetup_id, "removed attendee");
        Ok(())
    }
}

fn translate_not_found(err: PortError, operation: Operation) -> ServiceError {
    match err {
        PortError::MeetupNotFound(meetup) => ServiceError::InvalidMeetupId { meetup, operation },
        other => ServiceError::Port(other),
    }
}
