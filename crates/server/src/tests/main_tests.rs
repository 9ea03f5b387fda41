use super::*;
use axum::{body, body::Body, http::Request};
use shared::domain::SignupStatus;
use storage::GymStore;
use tower::ServiceExt;

async fn test_app() -> (Router, Storage) {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.seed_sample_exercises().await.expect("seed");
    let app = build_router(
        Arc::new(AppState {
            api: ApiContext {
                storage: storage.clone(),
            },
        }),
        16 * 1024,
    );
    (app, storage)
}

async fn json_body<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

fn json_request(method: &str, uri: &str, value: serde_json::Value) -> Request<Body> {
    let payload = value.to_string();
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("content-length", payload.len())
        .body(Body::from(payload))
        .expect("request")
}

#[tokio::test]
async fn healthz_reports_ok_when_storage_is_ready() {
    let (app, _storage) = test_app().await;
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn exercise_lookup_is_case_insensitive() {
    let (app, _storage) = test_app().await;
    let request = Request::get("/exercises/lp-02")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let exercise: Exercise = json_body(response).await;
    assert_eq!(exercise.code, "LP-02");
    assert_eq!(exercise.machine, "Leg Press (LP-02)");
}

#[tokio::test]
async fn unknown_exercise_is_404_with_error_body() {
    let (app, _storage) = test_app().await;
    let request = Request::get("/exercises/ZZ-99")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let err: ApiError = json_body(response).await;
    assert!(matches!(err.code, ErrorCode::NotFound));
}

#[tokio::test]
async fn lists_seeded_exercises() {
    let (app, _storage) = test_app().await;
    let request = Request::get("/exercises")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let exercises: Vec<Exercise> = json_body(response).await;
    let codes: Vec<&str> = exercises.iter().map(|e| e.code.as_str()).collect();
    assert_eq!(codes, vec!["BP-01", "LP-02", "PL-01"]);
}

#[tokio::test]
async fn adding_an_existing_code_conflicts() {
    let (app, _storage) = test_app().await;
    let request = json_request(
        "POST",
        "/exercises",
        serde_json::json!({
            "code": "bp-01",
            "machine": "Bench",
            "video_url": "https://video.example/bp",
            "instructions": "Press."
        }),
    );
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn signup_is_stored_pending_and_status_can_change() {
    let (app, storage) = test_app().await;
    let request = json_request(
        "POST",
        "/signups",
        serde_json::json!({
            "name": "Dana",
            "email": "dana@example.com",
            "trainer": "Kateryna",
            "datetime": "2026-10-20T18:30",
            "exercise_code": "bp-01"
        }),
    );
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let created: SignupCreatedResponse = json_body(response).await;

    let stored = storage
        .list_signups_by_trainer("Kateryna")
        .await
        .expect("list");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].status, SignupStatus::Pending);
    assert_eq!(stored[0].exercise_code.as_deref(), Some("BP-01"));

    let update = json_request(
        "PATCH",
        &format!("/signups/{}/status", created.signup_id.0),
        serde_json::json!({ "status": "confirmed" }),
    );
    let response = app.clone().oneshot(update).await.expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let listed = Request::get("/signups?email=dana@example.com")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(listed).await.expect("response");
    let signups: Vec<TrainerSignup> = json_body(response).await;
    assert_eq!(signups[0].status, SignupStatus::Confirmed);
}

#[tokio::test]
async fn signup_with_blank_field_is_rejected() {
    let (app, storage) = test_app().await;
    let request = json_request(
        "POST",
        "/signups",
        serde_json::json!({
            "name": "Dana",
            "email": "dana@example.com",
            "trainer": "Ivan",
            "datetime": ""
        }),
    );
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let err: ApiError = json_body(response).await;
    assert_eq!(err.message, "datetime is required");
    assert!(storage
        .list_signups_by_trainer("Ivan")
        .await
        .expect("list")
        .is_empty());
}

#[tokio::test]
async fn status_update_for_missing_signup_is_404() {
    let (app, _storage) = test_app().await;
    let update = json_request(
        "PATCH",
        "/signups/999/status",
        serde_json::json!({ "status": "cancelled" }),
    );
    let response = app.oneshot(update).await.expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let (app, _storage) = test_app().await;
    let request = json_request(
        "POST",
        "/signups",
        serde_json::json!({
            "name": "x".repeat(32 * 1024),
            "email": "dana@example.com",
            "trainer": "Ivan",
            "datetime": "2026-10-20T18:30"
        }),
    );
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
