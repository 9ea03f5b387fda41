//! JSON bodies exchanged between the HTTP server and its clients.

use serde::{Deserialize, Serialize};

use crate::domain::{ExerciseId, SignupId, SignupStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseCreatedResponse {
    pub exercise_id: ExerciseId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupCreatedResponse {
    pub signup_id: SignupId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSignupStatusRequest {
    pub status: SignupStatus,
}

/// Filter for `GET /signups`; exactly one of the fields is expected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupListQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trainer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

pub fn exercises_route() -> &'static str {
    "/exercises"
}

pub fn signups_route() -> &'static str {
    "/signups"
}

pub fn signup_status_route(signup_id: SignupId) -> String {
    format!("/signups/{}/status", signup_id.0)
}
