//! HTTP-level integration tests for appointments and bookings.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, login, post_json_auth, signup, signup_and_login};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

fn failing_fields(json: &serde_json::Value) -> Vec<String> {
    json["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap().to_string())
        .collect()
}

fn window(title: &str, start: &str, end: &str) -> serde_json::Value {
    json!({
        "title": title,
        "start_time": format!("2026-03-14T{start}:00Z"),
        "end_time": format!("2026-03-14T{end}:00Z"),
    })
}

// ---------------------------------------------------------------------------
// End-to-end flow
// ---------------------------------------------------------------------------

/// Signup → login → create 10:00–11:00 → 10:30–11:30 conflicts → 11:00–12:00 succeeds.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_end_to_end_overlap_flow(pool: PgPool) {
    signup(common::build_test_app(pool.clone()), "A", "a@x.com", "secret123").await;
    let session = login(common::build_test_app(pool.clone()), "a@x.com", "secret123").await;
    let token = session["access_token"].as_str().unwrap();

    let first = post_json_auth(
        common::build_test_app(pool.clone()),
        "/appointments",
        window("Standup", "10:00", "11:00"),
        token,
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let first = body_json(first).await;
    assert_eq!(first["duration_secs"], 3600);
    assert_eq!(first["user_id"], session["user"]["id"]);
    assert_eq!(first["join_code"].as_str().unwrap().len(), 6);

    let clash = post_json_auth(
        common::build_test_app(pool.clone()),
        "/appointments",
        window("Clash", "10:30", "11:30"),
        token,
    )
    .await;
    assert_eq!(clash.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(clash).await["code"], "CONFLICT");

    let adjacent = post_json_auth(
        common::build_test_app(pool.clone()),
        "/appointments",
        window("Follow-up", "11:00", "12:00"),
        token,
    )
    .await;
    assert_eq!(adjacent.status(), StatusCode::CREATED);

    let mine = get_auth(common::build_test_app(pool), "/appointments/my", token).await;
    assert_eq!(mine.status(), StatusCode::OK);
    let titles: Vec<String> = body_json(mine)
        .await
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["Standup", "Follow-up"]);
}

// ---------------------------------------------------------------------------
// Create validation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_end_before_start_returns_400(pool: PgPool) {
    let (_, token) = signup_and_login(&pool, "a@x.com").await;

    let response = post_json_auth(
        common::build_test_app(pool),
        "/appointments",
        window("Backwards", "11:00", "10:00"),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(failing_fields(&json), vec!["end_time"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_empty_body_lists_every_missing_field(pool: PgPool) {
    let (_, token) = signup_and_login(&pool, "a@x.com").await;

    let response =
        post_json_auth(common::build_test_app(pool), "/appointments", json!({}), &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(failing_fields(&json), vec!["end_time", "start_time", "title"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_blank_title_and_backwards_range_are_reported_together(pool: PgPool) {
    let (_, token) = signup_and_login(&pool, "a@x.com").await;

    let response = post_json_auth(
        common::build_test_app(pool),
        "/appointments",
        window("", "11:00", "10:00"),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(failing_fields(&json), vec!["end_time", "title"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_zero_length_appointment_is_accepted(pool: PgPool) {
    let (_, token) = signup_and_login(&pool, "a@x.com").await;

    let response = post_json_auth(
        common::build_test_app(pool),
        "/appointments",
        window("Ping", "09:00", "09:00"),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["duration_secs"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mismatched_duration_returns_400(pool: PgPool) {
    let (_, token) = signup_and_login(&pool, "a@x.com").await;

    let mut body = window("Sync", "10:00", "11:00");
    body["duration_secs"] = json!(1800);
    let response =
        post_json_auth(common::build_test_app(pool), "/appointments", body, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(failing_fields(&body_json(response).await), vec!["duration_secs"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_overlap_is_per_owner(pool: PgPool) {
    let (_, alice) = signup_and_login(&pool, "alice@x.com").await;
    let (_, bob) = signup_and_login(&pool, "bob@x.com").await;

    for token in [&alice, &bob] {
        let response = post_json_auth(
            common::build_test_app(pool.clone()),
            "/appointments",
            window("Same slot", "10:00", "11:00"),
            token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}

// ---------------------------------------------------------------------------
// Attendees and registration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_join_and_list_attendees(pool: PgPool) {
    let (_, owner) = signup_and_login(&pool, "owner@x.com").await;
    let (guest_id, guest) = signup_and_login(&pool, "guest@x.com").await;

    let created = post_json_auth(
        common::build_test_app(pool.clone()),
        "/appointments",
        window("Demo", "14:00", "15:00"),
        &owner,
    )
    .await;
    let created = body_json(created).await;
    let appointment_id = created["id"].as_str().unwrap();
    let join_code = created["join_code"].as_str().unwrap();
    let attendees_uri = format!("/appointments/{appointment_id}/users");

    let empty = get_auth(common::build_test_app(pool.clone()), &attendees_uri, &owner).await;
    assert_eq!(empty.status(), StatusCode::OK);
    assert_eq!(body_json(empty).await, json!([]));

    let joined = post_json_auth(
        common::build_test_app(pool.clone()),
        "/appointments/join",
        json!({ "join_code": join_code.to_lowercase() }),
        &guest,
    )
    .await;
    assert_eq!(joined.status(), StatusCode::CREATED);
    let booking = body_json(joined).await;
    assert_eq!(booking["appointment_id"], created["id"]);
    assert_eq!(booking["start_time"], created["start_time"]);

    let again = post_json_auth(
        common::build_test_app(pool.clone()),
        "/appointments/join",
        json!({ "join_code": join_code }),
        &guest,
    )
    .await;
    assert_eq!(again.status(), StatusCode::CONFLICT);

    let own = post_json_auth(
        common::build_test_app(pool.clone()),
        "/appointments/join",
        json!({ "join_code": join_code }),
        &owner,
    )
    .await;
    assert_eq!(own.status(), StatusCode::BAD_REQUEST);

    let attendees = get_auth(common::build_test_app(pool.clone()), &attendees_uri, &owner).await;
    let attendees = body_json(attendees).await;
    assert_eq!(attendees.as_array().unwrap().len(), 1);
    assert_eq!(attendees[0]["id"], guest_id.as_str());
    assert!(attendees[0].get("password_hash").is_none());

    let registered = get_auth(common::build_test_app(pool), "/appointments/registered", &guest).await;
    let registered = body_json(registered).await;
    assert_eq!(registered.as_array().unwrap().len(), 1);
    assert_eq!(registered[0]["id"], created["id"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_join_code_returns_404(pool: PgPool) {
    let (_, token) = signup_and_login(&pool, "guest@x.com").await;

    let response = post_json_auth(
        common::build_test_app(pool),
        "/appointments/join",
        json!({ "join_code": "ZZZZZZ" }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_attendees_of_missing_appointment_returns_404(pool: PgPool) {
    let (_, token) = signup_and_login(&pool, "a@x.com").await;

    let uri = format!("/appointments/{}/users", Uuid::new_v4());
    let response = get_auth(common::build_test_app(pool), &uri, &token).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}
