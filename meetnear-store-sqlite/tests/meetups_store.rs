use chrono::{DateTime, Duration, TimeZone, Utc};
use meetnear_core::{Meetup, MeetupId, MeetupsPort, PlaceId, PortError, UserId, UsersPort};
use meetnear_store_sqlite::{Database, SqliteMeetupsStore, SqliteUsersStore};

fn stores() -> (SqliteMeetupsStore, SqliteUsersStore) {
    let db = Database::open_in_memory().expect("in-memory database");
    (SqliteMeetupsStore::new(db.clone()), SqliteUsersStore::new(db))
}

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0)
        .single()
        .expect("valid date")
}

fn meetup(place: &str, meetup_type: &str, start: DateTime<Utc>) -> Meetup {
    Meetup::new(
        format!("{meetup_type} at {place}"),
        meetup_type,
        start,
        Some(start + Duration::hours(2)),
        PlaceId::from(place),
        UserId(1),
    )
}

#[tokio::test]
async fn insert_assigns_ids_and_keeps_creator_as_attendee() {
    let (meetups, _users) = stores();

    let first = meetups
        .insert_meetup(&meetup("p1", "chess", at(2, 18)))
        .await
        .expect("insert first");
    let second = meetups
        .insert_meetup(&meetup("p1", "chess", at(3, 18)))
        .await
        .expect("insert second");
    assert_ne!(first, second);

    let loaded = meetups.meetup(first).await.expect("lookup").expect("meetup exists");
    assert_eq!(loaded.id, Some(first));
    assert_eq!(loaded.attendees, vec![UserId(1)]);
    assert_eq!(loaded.start_date, at(2, 18));
    assert_eq!(loaded.end_date, Some(at(2, 20)));
}

#[tokio::test]
async fn query_filters_by_place_type_and_window() {
    let (meetups, _users) = stores();
    for (place, meetup_type, start) in [
        ("p1", "chess", at(2, 18)),
        ("p2", "running", at(4, 7)),
        ("p3", "chess", at(4, 18)),
        ("p1", "chess", at(20, 18)),
    ] {
        meetups
            .insert_meetup(&meetup(place, meetup_type, start))
            .await
            .expect("insert");
    }
    let places = [PlaceId::from("p1"), PlaceId::from("p2")];

    let in_window = meetups
        .query_meetups(&places, None, Some(at(1, 0)), Some(at(8, 0)))
        .await
        .expect("query");
    let names: Vec<&str> = in_window.iter().map(|found| found.name.as_str()).collect();
    assert_eq!(names, vec!["chess at p1", "running at p2"]);

    let only_running = meetups
        .query_meetups(&places, Some("running"), Some(at(1, 0)), Some(at(8, 0)))
        .await
        .expect("query");
    assert_eq!(only_running.len(), 1);
    assert_eq!(
        only_running.first().map(|found| found.meetup_type.as_str()),
        Some("running")
    );
}

#[tokio::test]
async fn query_window_defaults_to_one_week_from_start() {
    let (meetups, _users) = stores();
    meetups
        .insert_meetup(&meetup("p1", "chess", at(5, 18)))
        .await
        .expect("insert inside week");
    meetups
        .insert_meetup(&meetup("p1", "chess", at(12, 18)))
        .await
        .expect("insert after week");

    let found = meetups
        .query_meetups(&[PlaceId::from("p1")], None, Some(at(1, 0)), None)
        .await
        .expect("query");

    assert_eq!(found.len(), 1);
    assert_eq!(found.first().map(|hit| hit.start_date), Some(at(5, 18)));
}

#[tokio::test]
async fn query_without_places_returns_nothing() {
    let (meetups, _users) = stores();
    meetups
        .insert_meetup(&meetup("p1", "chess", at(2, 18)))
        .await
        .expect("insert");

    let found = meetups
        .query_meetups(&[], None, Some(at(1, 0)), Some(at(8, 0)))
        .await
        .expect("query");

    assert!(found.is_empty(), "no places means no meetups");
}

#[tokio::test]
async fn attendees_can_join_and_leave() {
    let (meetups, _users) = stores();
    let id = meetups
        .insert_meetup(&meetup("p1", "chess", at(2, 18)))
        .await
        .expect("insert");

    meetups.add_attendee(id, UserId(2)).await.expect("join");
    meetups.add_attendee(id, UserId(2)).await.expect("join twice");
    let joined = meetups.meetup(id).await.expect("lookup").expect("exists");
    assert_eq!(joined.attendees, vec![UserId(1), UserId(2)]);

    meetups.remove_attendee(id, UserId(1)).await.expect("leave");
    let left = meetups.meetup(id).await.expect("lookup").expect("exists");
    assert_eq!(left.attendees, vec![UserId(2)]);
}

#[tokio::test]
async fn attendee_changes_on_missing_meetups_report_not_found() {
    let (meetups, _users) = stores();

    let add = meetups.add_attendee(MeetupId(404), UserId(2)).await;
    assert!(
        matches!(add, Err(PortError::MeetupNotFound(MeetupId(404)))),
        "unexpected result: {add:?}"
    );

    let remove = meetups.remove_attendee(MeetupId(404), UserId(2)).await;
    assert!(
        matches!(remove, Err(PortError::MeetupNotFound(MeetupId(404)))),
        "unexpected result: {remove:?}"
    );
}

#[tokio::test]
async fn removing_a_non_attendee_is_reported() {
    let (meetups, _users) = stores();
    let id = meetups
        .insert_meetup(&meetup("p1", "chess", at(2, 18)))
        .await
        .expect("insert");

    let result = meetups.remove_attendee(id, UserId(3)).await;

    assert!(
        matches!(result, Err(PortError::NotAttending { user: UserId(3), .. })),
        "unexpected result: {result:?}"
    );
}

#[tokio::test]
async fn user_validity_reflects_registered_users() {
    let (_meetups, users) = stores();
    let alice = users.add_user("alice").await.expect("register");

    assert!(users.check_user_validity(alice.id).await.expect("check"), "alice exists");
    assert!(
        !users.check_user_validity(UserId(999)).await.expect("check"),
        "unknown id is invalid"
    );
    assert_eq!(users.user(alice.id).await.expect("lookup"), Some(alice));
}

#[tokio::test]
async fn duplicate_usernames_fail_as_data_operations() {
    let (_meetups, users) = stores();
    users.add_user("bob").await.expect("register");

    let err = users.add_user("bob").await.expect_err("duplicate");

    assert!(matches!(err, PortError::DataOperation(_)), "unexpected error: {err:?}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stores_are_usable_from_spawned_tasks() {
    let (meetups, users) = stores();
    let id = meetups
        .insert_meetup(&meetup("p1", "chess", at(2, 18)))
        .await
        .expect("insert");

    for user in 2..=4 {
        let store = meetups.clone();
        tokio::spawn(async move { store.add_attendee(id, UserId(user)).await })
            .await
            .expect("task joins")
            .expect("join meetup");
    }
    let registered = tokio::spawn(async move { users.add_user("carol").await })
        .await
        .expect("task joins")
        .expect("register");

    let joined = meetups.meetup(id).await.expect("lookup").expect("exists");
    assert_eq!(
        joined.attendees,
        vec![UserId(1), UserId(2), UserId(3), UserId(4)]
    );
    assert_eq!(registered.username, "carol");
}
