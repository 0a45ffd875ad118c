//! Domain data structures for places, meetups, and the search aggregate.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier for a place known to the places provider.
pub struct PlaceId(pub String);

impl fmt::Display for PlaceId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl From<&str> for PlaceId {
    fn from(raw: &str) -> Self {
        PlaceId(raw.to_owned())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier assigned to a meetup by the meetups store.
pub struct MeetupId(pub i64);

impl fmt::Display for MeetupId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier for a registered user.
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A registered user.
pub struct User {
    /// Unique identifier.
    pub id: UserId,
    /// Display name.
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Point of interest returned by the places provider.
pub struct Place {
    /// Provider identifier, usable as a meetup location.
    pub id: PlaceId,
    /// Human-friendly name.
    pub name: String,
    /// Reference to the first photo of the place, if any.
    pub photo_id: Option<String>,
    /// Attribution markup that must accompany the photo.
    pub photo_attribution_html: Option<String>,
}

impl Place {
    /// Construct a place without photo information.
    #[must_use]
    pub fn new<I: Into<String>, N: Into<String>>(id: I, name: N) -> Self {
        Self {
            id: PlaceId(id.into()),
            name: name.into(),
            photo_id: None,
            photo_attribution_html: None,
        }
    }

    /// Attach photo reference and attribution.
    #[must_use]
    pub fn with_photo<P: Into<String>, A: Into<String>>(mut self, photo_id: P, attribution: A) -> Self {
        self.photo_id = Some(photo_id.into());
        self.photo_attribution_html = Some(attribution.into());
        self
    }
}

impl From<Place> for Vec<Place> {
    fn from(place: Place) -> Self {
        vec![place]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One page of places returned by a nearby search.
pub struct PlaceResults {
    /// Attribution markup required by the provider's terms.
    pub attribution_html: String,
    /// Token for fetching the next page, when the provider has more results.
    pub next_page_token: Option<String>,
    /// Matching places; empty when nothing matched.
    pub places: Vec<Place>,
}

impl PlaceResults {
    /// Build a result page from a single place or a list of places.
    ///
    /// A bare [`Place`] becomes a one-element list.
    #[must_use]
    pub fn new<A, P>(attribution_html: A, next_page_token: Option<String>, places: P) -> Self
    where
        A: Into<String>,
        P: Into<Vec<Place>>,
    {
        Self {
            attribution_html: attribution_html.into(),
            next_page_token,
            places: places.into(),
        }
    }

    /// Build a result page that carries no places.
    #[must_use]
    pub fn empty<A: Into<String>>(attribution_html: A) -> Self {
        Self::new(attribution_html, None, Vec::new())
    }

    /// Identifiers of all places on this page, in order.
    #[must_use]
    pub fn place_ids(&self) -> Vec<PlaceId> {
        self.places.iter().map(|place| place.id.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Scheduled social event tied to one place.
pub struct Meetup {
    /// Store-assigned identifier; `None` until persisted.
    pub id: Option<MeetupId>,
    /// Title of the meetup.
    pub name: String,
    /// Free-form category used for filtering.
    #[serde(rename = "type")]
    pub meetup_type: String,
    /// Start of the meetup.
    pub start_date: DateTime<Utc>,
    /// Optional end of the meetup.
    pub end_date: Option<DateTime<Utc>>,
    /// Place the meetup happens at.
    pub location: PlaceId,
    /// User who created the meetup.
    pub creator: UserId,
    /// Users attending, the creator included.
    pub attendees: Vec<UserId>,
}

impl Meetup {
    /// Construct an unsaved meetup whose only attendee is its creator.
    #[must_use]
    pub fn new<N: Into<String>, T: Into<String>>(
        name: N,
        meetup_type: T,
        start_date: DateTime<Utc>,
        end_date: Option<DateTime<Utc>>,
        location: PlaceId,
        creator: UserId,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            meetup_type: meetup_type.into(),
            start_date,
            end_date,
            location,
            creator,
            attendees: vec![creator],
        }
    }

    /// Set the store-assigned identifier.
    #[must_use]
    pub fn with_id(mut self, id: MeetupId) -> Self {
        self.id = Some(id);
        self
    }

    /// Replace the attendee list.
    #[must_use]
    pub fn with_attendees(mut self, attendees: Vec<UserId>) -> Self {
        self.attendees = attendees;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A place together with the meetups scheduled there.
pub struct MeetupLocation {
    /// The place.
    pub place: Place,
    /// Meetups whose location is this place.
    pub meetups: Vec<Meetup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Search response joining nearby places with their meetups.
pub struct MeetupLocations {
    /// Attribution markup from the places query.
    pub attribution_html: String,
    /// One entry per place, in provider order.
    pub locations: Vec<MeetupLocation>,
}

impl MeetupLocations {
    /// Group `meetups` under the places of `results`.
    ///
    /// Each meetup lands under the place whose id equals its location; meetups
    /// at places outside `results` are left out.
    #[must_use]
    pub fn join(results: PlaceResults, meetups: &[Meetup]) -> Self {
        let locations = results
            .places
            .into_iter()
            .map(|place| {
                let at_place = meetups
                    .iter()
                    .filter(|meetup| meetup.location == place.id)
                    .cloned()
                    .collect();
                MeetupLocation {
                    place,
                    meetups: at_place,
                }
            })
            .collect();

        Self {
            attribution_html: results.attribution_html,
            locations,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Latitude/longitude pair in decimal degrees.
pub struct Coordinates {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Where to search for places.
pub enum Location {
    /// A point on the map.
    Coordinates(Coordinates),
    /// Free text such as a city name or address.
    Text(String),
}

impl Location {
    /// Build a coordinate location.
    #[must_use]
    pub fn at(lat: f64, lng: f64) -> Self {
        Location::Coordinates(Coordinates { lat, lng })
    }
}

impl From<&str> for Location {
    fn from(text: &str) -> Self {
        Location::Text(text.to_owned())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Coordinates(Coordinates { lat, lng }) => write!(formatter, "{lat},{lng}"),
            Location::Text(text) => formatter.write_str(text),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Restrictions applied to the places query. The default restricts nothing.
pub struct LocationFilter {
    /// Provider place type, e.g. `cafe` or `park`.
    pub place_type: Option<String>,
    /// Search radius in meters; providers fall back to their own default.
    pub radius_meters: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Restrictions applied to the meetups query. The default restricts nothing.
pub struct MeetupFilter {
    /// Only meetups of this type.
    pub meetup_type: Option<String>,
    /// Earliest start date; stores default to "now".
    pub from: Option<DateTime<Utc>>,
    /// Latest end date; stores default to one week after `from`.
    pub to: Option<DateTime<Utc>>,
}
