use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use server_api::{
    add_exercise, find_exercise, list_exercises, list_signups, submit_signup,
    update_signup_status, ApiContext,
};
use shared::{
    domain::{Exercise, NewExercise, NewSignup, SignupId, TrainerSignup},
    error::{ApiError, ErrorCode},
    protocol::{
        ExerciseCreatedResponse, SignupCreatedResponse, SignupListQuery,
        UpdateSignupStatusRequest,
    },
};
use storage::Storage;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;

use app_state::AppState;
use config::{load_settings, normalize_database_url};

type HttpResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let database_url = normalize_database_url(&settings.database_url);
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    if settings.seed_sample_data {
        storage.seed_sample_exercises().await?;
    }

    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(Arc::new(state), settings.max_body_bytes);

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "gym guide server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/exercises", get(http_list_exercises).post(http_add_exercise))
        .route("/exercises/:code", get(http_get_exercise))
        .route("/signups", get(http_list_signups).post(http_submit_signup))
        .route("/signups/:signup_id/status", patch(http_update_signup_status))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reject(err: ApiError) -> (StatusCode, Json<ApiError>) {
    if matches!(err.code, ErrorCode::Internal) {
        error!(message = %err.message, "request failed");
    }
    (status_for(err.code), Json(err))
}

async fn healthz(State(state): State<Arc<AppState>>) -> HttpResult<&'static str> {
    state.api.storage.health_check().await.map_err(|e| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError::new(ErrorCode::Internal, e.to_string())),
        )
    })?;
    Ok("ok")
}

async fn http_list_exercises(State(state): State<Arc<AppState>>) -> HttpResult<Json<Vec<Exercise>>> {
    let exercises = list_exercises(&state.api).await.map_err(reject)?;
    Ok(Json(exercises))
}

async fn http_get_exercise(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> HttpResult<Json<Exercise>> {
    let exercise = find_exercise(&state.api, &code).await.map_err(reject)?;
    Ok(Json(exercise))
}

async fn http_add_exercise(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewExercise>,
) -> HttpResult<Json<ExerciseCreatedResponse>> {
    let exercise_id = add_exercise(&state.api, req).await.map_err(reject)?;
    Ok(Json(ExerciseCreatedResponse { exercise_id }))
}

async fn http_submit_signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewSignup>,
) -> HttpResult<Json<SignupCreatedResponse>> {
    let signup_id = submit_signup(&state.api, req).await.map_err(reject)?;
    Ok(Json(SignupCreatedResponse { signup_id }))
}

async fn http_list_signups(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SignupListQuery>,
) -> HttpResult<Json<Vec<TrainerSignup>>> {
    let signups = list_signups(&state.api, q).await.map_err(reject)?;
    Ok(Json(signups))
}

async fn http_update_signup_status(
    State(state): State<Arc<AppState>>,
    Path(signup_id): Path<i64>,
    Json(req): Json<UpdateSignupStatusRequest>,
) -> HttpResult<StatusCode> {
    update_signup_status(&state.api, SignupId(signup_id), req.status)
        .await
        .map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
