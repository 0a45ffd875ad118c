//! Command-line front end for meetnear: find meetups near a place, create them, and RSVP.

mod cli;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use meetnear_core::{
    CollaboratorsBuilder, LocationFilter, MeetupFilter, MeetupId, MeetupService, PlaceId, UserId,
};
use meetnear_provider_google as google;
use meetnear_store_sqlite::{Database, SqliteMeetupsStore, SqliteUsersStore};

use crate::cli::{Cli, Command, parse_location};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let db = Database::open(&cli.database)
        .with_context(|| format!("failed to open database {}", cli.database))?;

    run(&cli, db).await
}

async fn run(cli: &Cli, db: Database) -> Result<()> {
    let users = SqliteUsersStore::new(db.clone());

    match &cli.command {
        // Registering users needs neither the places provider nor the service.
        Command::AddUser { username } => print_json(&users.add_user(username).await?),
        Command::Find {
            location,
            place_type,
            radius,
            meetup_type,
            from,
            to,
        } => {
            let location_filter = LocationFilter {
                place_type: place_type.clone(),
                radius_meters: *radius,
            };
            let meetup_filter = MeetupFilter {
                meetup_type: meetup_type.clone(),
                from: *from,
                to: *to,
            };
            let found = service(cli, db, users)?
                .find_meetup_locations(
                    &parse_location(location),
                    Some(&location_filter),
                    Some(&meetup_filter),
                )
                .await?;
            print_json(&found)
        }
        Command::Create {
            place,
            name,
            meetup_type,
            creator,
            start,
            end,
        } => {
            let id = service(cli, db, users)?
                .create_meetup(
                    &PlaceId(place.clone()),
                    name,
                    meetup_type,
                    UserId(*creator),
                    *start,
                    *end,
                )
                .await?;
            print_json(&json!({ "id": id }))
        }
        Command::Rsvp { meetup, user } => {
            service(cli, db, users)?
                .rsvp(MeetupId(*meetup), UserId(*user))
                .await?;
            print_json(&json!({ "meetup": meetup, "user": user, "attending": true }))
        }
        Command::Unrsvp { meetup, user } => {
            service(cli, db, users)?
                .un_rsvp(MeetupId(*meetup), UserId(*user))
                .await?;
            print_json(&json!({ "meetup": meetup, "user": user, "attending": false }))
        }
    }
}

/// Wire the Google provider and the SQLite stores into a service.
fn service(cli: &Cli, db: Database, users: SqliteUsersStore) -> Result<MeetupService> {
    let settings = cli.settings().context("failed to load settings")?;
    debug!(places = %settings.places_base_url, radius = settings.default_radius_meters, "loaded settings");

    let client = google::http_client(&settings)?;
    let service = MeetupService::try_from_builder(
        CollaboratorsBuilder::new()
            .places(google::places_port(client, &settings))
            .meetups(Arc::new(SqliteMeetupsStore::new(db)))
            .users(Arc::new(users)),
    )?;
    Ok(service)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
