//! Assembly of the collaborators the coordination service depends on.

use std::fmt;
use std::sync::Arc;

use crate::config::ConfigError;
use crate::ports::{MeetupsPort, PlacesPort, UsersPort};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The three collaborators of the coordination service.
pub enum Collaborator {
    /// Places provider.
    Places,
    /// Meetups store.
    Meetups,
    /// Users store.
    Users,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Collaborator::Places => "places",
            Collaborator::Meetups => "meetups",
            Collaborator::Users => "users",
        };
        write!(formatter, "{name}")
    }
}

/// Complete set of collaborator implementations.
#[derive(Clone)]
pub struct Collaborators {
    /// Places provider.
    pub places: Arc<dyn PlacesPort>,
    /// Meetups store.
    pub meetups: Arc<dyn MeetupsPort>,
    /// Users store.
    pub users: Arc<dyn UsersPort>,
}

/// Incrementally collects collaborators and checks that none is missing.
///
/// Capability sets are enforced by the port traits; `build` only has to
/// verify that every collaborator was supplied.
#[derive(Default)]
pub struct CollaboratorsBuilder {
    places: Option<Arc<dyn PlacesPort>>,
    meetups: Option<Arc<dyn MeetupsPort>>,
    users: Option<Arc<dyn UsersPort>>,
}

impl CollaboratorsBuilder {
    /// Start with no collaborators.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply the places provider.
    #[must_use]
    pub fn places(mut self, places: Arc<dyn PlacesPort>) -> Self {
        self.places = Some(places);
        self
    }

    /// Supply the meetups store.
    #[must_use]
    pub fn meetups(mut self, meetups: Arc<dyn MeetupsPort>) -> Self {
        self.meetups = Some(meetups);
        self
    }

    /// Supply the users store.
    #[must_use]
    pub fn users(mut self, users: Arc<dyn UsersPort>) -> Self {
        self.users = Some(users);
        self
    }

    /// Finish assembly.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCollaborator`] naming the first missing
    /// collaborator, checked in the order places, meetups, users.
    pub fn build(self) -> Result<Collaborators, ConfigError> {
        let places = self
            .places
            .ok_or(ConfigError::MissingCollaborator(Collaborator::Places))?;
        let meetups = self
            .meetups
            .ok_or(ConfigError::MissingCollaborator(Collaborator::Meetups))?;
        let users = self
            .users
            .ok_or(ConfigError::MissingCollaborator(Collaborator::Users))?;
        Ok(Collaborators {
            places,
            meetups,
            users,
        })
    }
}
