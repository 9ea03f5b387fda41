use shared::{
    domain::{
        Exercise, ExerciseId, NewExercise, NewSignup, SignupId, SignupStatus, TrainerSignup,
    },
    error::{ApiError, ErrorCode},
    machine_code,
    protocol::SignupListQuery,
};
use storage::{GymStore, Storage};
use tracing::{debug, info};

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub async fn find_exercise(ctx: &ApiContext, code: &str) -> Result<Exercise, ApiError> {
    let code = machine_code::canonical(code);
    let exercise = ctx
        .storage
        .get_exercise_by_code(&code)
        .await
        .map_err(internal)?;
    debug!(%code, found = exercise.is_some(), "exercise lookup");
    exercise.ok_or_else(|| ApiError::not_found(format!("no exercise found for code: {code}")))
}

pub async fn list_exercises(ctx: &ApiContext) -> Result<Vec<Exercise>, ApiError> {
    ctx.storage.list_exercises().await.map_err(internal)
}

pub async fn add_exercise(ctx: &ApiContext, exercise: NewExercise) -> Result<ExerciseId, ApiError> {
    let exercise = exercise
        .validate()
        .map_err(|err| ApiError::validation(err.to_string()))?;
    let code = &exercise.code;

    let existing = ctx
        .storage
        .get_exercise_by_code(code)
        .await
        .map_err(internal)?;
    if existing.is_some() {
        return Err(ApiError::new(
            ErrorCode::Conflict,
            format!("exercise {code} already exists"),
        ));
    }

    let exercise_id = ctx
        .storage
        .insert_exercise(&exercise)
        .await
        .map_err(internal)?;
    info!(exercise_id = exercise_id.0, "exercise added");
    Ok(exercise_id)
}

pub async fn submit_signup(ctx: &ApiContext, signup: NewSignup) -> Result<SignupId, ApiError> {
    let signup = signup
        .validate()
        .map_err(|err| ApiError::validation(err.to_string()))?;
    let signup_id = ctx
        .storage
        .submit_signup(&signup)
        .await
        .map_err(internal)?;
    info!(
        signup_id = signup_id.0,
        trainer = %signup.trainer,
        exercise_code = signup.exercise_code.as_deref().unwrap_or("-"),
        "trainer signup received"
    );
    Ok(signup_id)
}

pub async fn update_signup_status(
    ctx: &ApiContext,
    signup_id: SignupId,
    status: SignupStatus,
) -> Result<(), ApiError> {
    let updated = ctx
        .storage
        .update_signup_status(signup_id, status)
        .await
        .map_err(internal)?;
    if !updated {
        return Err(ApiError::not_found(format!(
            "signup {} not found",
            signup_id.0
        )));
    }
    info!(signup_id = signup_id.0, %status, "signup status updated");
    Ok(())
}

pub async fn list_signups(
    ctx: &ApiContext,
    query: SignupListQuery,
) -> Result<Vec<TrainerSignup>, ApiError> {
    let trainer = query.trainer.as_deref().map(str::trim).filter(|v| !v.is_empty());
    let email = query.email.as_deref().map(str::trim).filter(|v| !v.is_empty());
    match (trainer, email) {
        (Some(trainer), None) => ctx
            .storage
            .list_signups_by_trainer(trainer)
            .await
            .map_err(internal),
        (None, Some(email)) => ctx
            .storage
            .list_signups_by_email(email)
            .await
            .map_err(internal),
        _ => Err(ApiError::validation(
            "filter signups by exactly one of trainer or email",
        )),
    }
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}
