use shared::domain::{NewSignup, SignupId, SignupValidationError};
use storage::GymStore;
use thiserror::Error;
use tracing::info;

pub const SIGNUP_CONFIRMATION: &str =
    "Thank you! Your request was sent. The trainer will contact you.";

#[derive(Debug, Error)]
pub enum SignupError {
    #[error(transparent)]
    Invalid(#[from] SignupValidationError),
    #[error("failed to submit signup: {0}")]
    Store(#[source] anyhow::Error),
}

/// Signup form prefilled for the machine currently on screen.
pub fn form_for(exercise_code: Option<&str>) -> NewSignup {
    NewSignup {
        exercise_code: exercise_code.map(str::to_string),
        ..NewSignup::default()
    }
}

/// Validates the form locally and only then hands it to the store, which
/// records it as pending.
pub async fn submit(store: &dyn GymStore, form: NewSignup) -> Result<SignupId, SignupError> {
    let signup = form.validate()?;
    let signup_id = store
        .submit_signup(&signup)
        .await
        .map_err(SignupError::Store)?;
    info!(signup_id = signup_id.0, trainer = %signup.trainer, "trainer signup submitted");
    Ok(signup_id)
}
