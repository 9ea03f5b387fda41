use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::machine_code;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(ExerciseId);
id_newtype!(SignupId);

/// Trainers offered on the signup form, first entry is the form default.
pub const TRAINERS: [&str; 3] = ["Olena", "Ivan", "Kateryna"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub exercise_id: ExerciseId,
    pub code: String,
    pub machine: String,
    pub video_url: String,
    pub instructions: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExercise {
    pub code: String,
    pub machine: String,
    pub video_url: String,
    pub instructions: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignupStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl SignupStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SignupStatus::Pending => "pending",
            SignupStatus::Confirmed => "confirmed",
            SignupStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SignupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown signup status '{0}'")]
pub struct UnknownSignupStatus(pub String);

impl FromStr for SignupStatus {
    type Err = UnknownSignupStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(SignupStatus::Pending),
            "confirmed" => Ok(SignupStatus::Confirmed),
            "cancelled" => Ok(SignupStatus::Cancelled),
            _ => Err(UnknownSignupStatus(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainerSignup {
    pub signup_id: SignupId,
    pub name: String,
    pub email: String,
    pub trainer: String,
    pub datetime: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_code: Option<String>,
    pub status: SignupStatus,
    pub created_at: DateTime<Utc>,
}

/// A trainer booking request as entered on the signup form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSignup {
    pub name: String,
    pub email: String,
    pub trainer: String,
    pub datetime: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_code: Option<String>,
}

impl Default for NewSignup {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            trainer: TRAINERS[0].to_string(),
            datetime: String::new(),
            exercise_code: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExerciseValidationError {
    #[error("{field} is required")]
    MissingField { field: &'static str },
}

impl NewExercise {
    /// Trims every field and canonicalizes the code; all four are required.
    pub fn validate(self) -> Result<Self, ExerciseValidationError> {
        let missing = |field| ExerciseValidationError::MissingField { field };
        let code = machine_code::canonical(&self.code);
        if code.is_empty() {
            return Err(missing("code"));
        }
        Ok(Self {
            code,
            machine: required(self.machine).ok_or_else(|| missing("machine"))?,
            video_url: required(self.video_url).ok_or_else(|| missing("video_url"))?,
            instructions: required(self.instructions).ok_or_else(|| missing("instructions"))?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignupValidationError {
    #[error("{field} is required")]
    MissingField { field: &'static str },
}

impl NewSignup {
    /// Checks that every required field is present and returns the trimmed
    /// request. A blank exercise code is dropped and a present one is
    /// stored in canonical form.
    pub fn validate(self) -> Result<Self, SignupValidationError> {
        let missing = |field| SignupValidationError::MissingField { field };
        let name = required(self.name).ok_or_else(|| missing("name"))?;
        let email = required(self.email).ok_or_else(|| missing("email"))?;
        let trainer = required(self.trainer).ok_or_else(|| missing("trainer"))?;
        let datetime = required(self.datetime).ok_or_else(|| missing("datetime"))?;
        let exercise_code = self
            .exercise_code
            .map(|code| machine_code::canonical(&code))
            .filter(|code| !code.is_empty());

        Ok(Self {
            name,
            email,
            trainer,
            datetime,
            exercise_code,
        })
    }
}

fn required(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
