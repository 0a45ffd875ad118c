//! SQLite implementation of the meetups store.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rusqlite::types::Value;
use rusqlite::{OptionalExtension, Row, params, params_from_iter};
use tracing::debug;

use meetnear_core::{
    model::{Meetup, MeetupId, PlaceId, UserId},
    ports::{MeetupsPort, PortError},
};

use crate::db::{Database, data_error};

const MEETUP_SELECT_SQL: &str = "SELECT
    id,
    name,
    type,
    start_date,
    end_date,
    location,
    creator,
    attendees
FROM meetups";

/// Length of the query window when no end date is given.
const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Meetups store persisting to SQLite.
#[derive(Clone)]
pub struct SqliteMeetupsStore {
    db: Database,
}

impl SqliteMeetupsStore {
    /// Create a store on top of the shared database handle.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Load a single meetup by id.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::DataOperation`] when the lookup fails or the row
    /// holds malformed data.
    pub async fn meetup(&self, id: MeetupId) -> Result<Option<Meetup>, PortError> {
        let row = self
            .db
            .with_conn(move |conn| {
                conn.query_row(
                    &format!("{MEETUP_SELECT_SQL} WHERE id = ?1;"),
                    [id.0],
                    read_row,
                )
                .optional()
            })
            .await?;
        row.map(MeetupRow::into_meetup).transpose()
    }

    async fn attendees(&self, meetup_id: MeetupId) -> Result<Vec<UserId>, PortError> {
        let raw = self
            .db
            .with_conn(move |conn| {
                conn.query_row(
                    "SELECT attendees FROM meetups WHERE id = ?1;",
                    [meetup_id.0],
                    |row| row.get::<_, String>(0),
                )
                .optional()
            })
            .await?;
        let raw = raw.ok_or(PortError::MeetupNotFound(meetup_id))?;
        parse_attendees(&raw)
    }

    async fn store_attendees(
        &self,
        meetup_id: MeetupId,
        attendees: &[UserId],
    ) -> Result<(), PortError> {
        let encoded = encode_attendees(attendees)?;
        let changed = self
            .db
            .with_conn(move |conn| {
                conn.execute(
                    "UPDATE meetups SET attendees = ?1 WHERE id = ?2;",
                    params![encoded, meetup_id.0],
                )
            })
            .await?;
        if changed == 0 {
            return Err(PortError::MeetupNotFound(meetup_id));
        }
        Ok(())
    }
}

#[async_trait]
impl MeetupsPort for SqliteMeetupsStore {
    async fn query_meetups(
        &self,
        place_ids: &[PlaceId],
        meetup_type: Option<&str>,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Meetup>, PortError> {
        if place_ids.is_empty() {
            return Ok(Vec::new());
        }

        let from = from.unwrap_or_else(Utc::now);
        let to = to.unwrap_or(from + Duration::days(DEFAULT_WINDOW_DAYS));

        let placeholders = vec!["?"; place_ids.len()].join(", ");
        let mut sql = format!(
            "{MEETUP_SELECT_SQL}
             WHERE location IN ({placeholders})
               AND start_date >= ?
               AND COALESCE(end_date, start_date) <= ?"
        );
        let mut bind_values: Vec<Value> = place_ids
            .iter()
            .map(|id| Value::Text(id.0.clone()))
            .collect();
        bind_values.push(Value::Integer(from.timestamp_millis()));
        bind_values.push(Value::Integer(to.timestamp_millis()));

        if let Some(meetup_type) = meetup_type {
            sql.push_str(" AND type = ?");
            bind_values.push(Value::Text(meetup_type.to_owned()));
        }
        sql.push_str(" ORDER BY start_date ASC, id ASC;");

        let rows = self
            .db
            .with_conn(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params_from_iter(bind_values), read_row)?;
                rows.collect::<rusqlite::Result<Vec<MeetupRow>>>()
            })
            .await?;
        debug!(places = place_ids.len(), rows = rows.len(), "queried meetups");

        rows.into_iter().map(MeetupRow::into_meetup).collect()
    }

    async fn insert_meetup(&self, meetup: &Meetup) -> Result<MeetupId, PortError> {
        let attendees = encode_attendees(&meetup.attendees)?;
        let name = meetup.name.clone();
        let meetup_type = meetup.meetup_type.clone();
        let start_date = meetup.start_date.timestamp_millis();
        let end_date = meetup.end_date.map(|end| end.timestamp_millis());
        let location = meetup.location.0.clone();
        let creator = meetup.creator.0;
        let id = self
            .db
            .with_conn(move |conn| {
                conn.execute(
                    "INSERT INTO meetups (
                        name,
                        type,
                        start_date,
                        end_date,
                        location,
                        creator,
                        attendees
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                    params![
                        name,
                        meetup_type,
                        start_date,
                        end_date,
                        location,
                        creator,
                        attendees,
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await?;
        debug!(meetup = id, location = %meetup.location, "inserted meetup");
        Ok(MeetupId(id))
    }

    async fn add_attendee(&self, meetup_id: MeetupId, user_id: UserId) -> Result<(), PortError> {
        let mut attendees = self.attendees(meetup_id).await?;
        if attendees.contains(&user_id) {
            return Ok(());
        }
        attendees.push(user_id);
        self.store_attendees(meetup_id, &attendees).await
    }

    async fn remove_attendee(
        &self,
        meetup_id: MeetupId,
        user_id: UserId,
    ) -> Result<(), PortError> {
        let mut attendees = self.attendees(meetup_id).await?;
        if !attendees.contains(&user_id) {
            return Err(PortError::NotAttending {
                meetup: meetup_id,
                user: user_id,
            });
        }
        attendees.retain(|attendee| *attendee != user_id);
        self.store_attendees(meetup_id, &attendees).await
    }
}

/// Raw column values, converted to a [`Meetup`] outside the connection lock.
struct MeetupRow {
    id: i64,
    name: String,
    meetup_type: String,
    start_date: i64,
    end_date: Option<i64>,
    location: String,
    creator: i64,
    attendees: String,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<MeetupRow> {
    Ok(MeetupRow {
        id: row.get("id")?,
        name: row.get("name")?,
        meetup_type: row.get("type")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        location: row.get("location")?,
        creator: row.get("creator")?,
        attendees: row.get("attendees")?,
    })
}

impl MeetupRow {
    fn into_meetup(self) -> Result<Meetup, PortError> {
        let start_date = from_millis(self.start_date, "start_date")?;
        let end_date = self
            .end_date
            .map(|millis| from_millis(millis, "end_date"))
            .transpose()?;
        let attendees = parse_attendees(&self.attendees)?;

        Ok(Meetup::new(
            self.name,
            self.meetup_type,
            start_date,
            end_date,
            PlaceId(self.location),
            UserId(self.creator),
        )
        .with_id(MeetupId(self.id))
        .with_attendees(attendees))
    }
}

fn from_millis(millis: i64, column: &str) -> Result<DateTime<Utc>, PortError> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        PortError::DataOperation(format!("invalid timestamp `{millis}` in meetups.{column}"))
    })
}

fn parse_attendees(raw: &str) -> Result<Vec<UserId>, PortError> {
    serde_json::from_str::<Vec<i64>>(raw)
        .map(|ids| ids.into_iter().map(UserId).collect())
        .map_err(|err| {
            PortError::DataOperation(format!("invalid attendee list in meetups.attendees: {err}"))
        })
}

fn encode_attendees(attendees: &[UserId]) -> Result<String, PortError> {
    let ids: Vec<i64> = attendees.iter().map(|user| user.0).collect();
    serde_json::to_string(&ids).map_err(data_error)
}
