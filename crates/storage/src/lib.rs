use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{debug, info};

use shared::{
    domain::{
        Exercise, ExerciseId, NewExercise, NewSignup, SignupId, SignupStatus, TrainerSignup,
    },
    machine_code,
};

mod seed;

pub use seed::sample_exercises;

/// The persistence operations the gym guide consumes. Implemented by the
/// SQLite [`Storage`] on the server side and by an HTTP client for remote
/// callers.
#[async_trait]
pub trait GymStore: Send + Sync {
    /// Looks up an exercise by machine code, ignoring case. `Ok(None)` is
    /// the regular "no such machine" answer.
    async fn get_exercise_by_code(&self, code: &str) -> Result<Option<Exercise>>;
    async fn insert_exercise(&self, exercise: &NewExercise) -> Result<ExerciseId>;
    async fn list_exercises(&self) -> Result<Vec<Exercise>>;
    /// Stores a signup with status `pending`. Callers validate first.
    async fn submit_signup(&self, signup: &NewSignup) -> Result<SignupId>;
    /// Returns `false` when no signup has the given id.
    async fn update_signup_status(&self, signup_id: SignupId, status: SignupStatus)
        -> Result<bool>;
    async fn list_signups_by_trainer(&self, trainer: &str) -> Result<Vec<TrainerSignup>>;
    async fn list_signups_by_email(&self, email: &str) -> Result<Vec<TrainerSignup>>;
}

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

const SIGNUP_COLUMNS: &str =
    "id, name, email, trainer, datetime, exercise_code, status, created_at";

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Every connection to `sqlite::memory:` opens its own database.
        let max_connections = if is_memory_url(database_url) { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// Inserts the sample exercises when the catalog is empty. Safe to run
    /// on every startup; returns how many rows were added.
    pub async fn seed_sample_exercises(&self) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM exercises LIMIT 1")
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_some() {
            debug!("exercise catalog already populated; skipping seed");
            return Ok(0);
        }

        let mut inserted = 0;
        for exercise in sample_exercises() {
            let result = sqlx::query(
                "INSERT INTO exercises (code, machine, video_url, instructions)
                 VALUES (?, ?, ?, ?)
                 ON CONFLICT(code) DO NOTHING",
            )
            .bind(machine_code::canonical(&exercise.code))
            .bind(&exercise.machine)
            .bind(&exercise.video_url)
            .bind(&exercise.instructions)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to seed exercise {}", exercise.code))?;
            inserted += result.rows_affected() as usize;
        }
        tx.commit().await?;

        info!(inserted, "seeded sample exercises");
        Ok(inserted)
    }

    pub async fn get_signup(&self, signup_id: SignupId) -> Result<Option<TrainerSignup>> {
        let row = sqlx::query(&format!(
            "SELECT {SIGNUP_COLUMNS} FROM trainer_signups WHERE id = ?"
        ))
        .bind(signup_id.0)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(signup_from_row).transpose()
    }

    async fn list_signups_where(&self, column: &str, value: &str) -> Result<Vec<TrainerSignup>> {
        let rows = sqlx::query(&format!(
            "SELECT {SIGNUP_COLUMNS} FROM trainer_signups WHERE {column} = ? ORDER BY id DESC"
        ))
        .bind(value)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(signup_from_row).collect()
    }
}

#[async_trait]
impl GymStore for Storage {
    async fn get_exercise_by_code(&self, code: &str) -> Result<Option<Exercise>> {
        let row = sqlx::query(
            "SELECT id, code, machine, video_url, instructions FROM exercises WHERE code = ?",
        )
        .bind(machine_code::canonical(code))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(exercise_from_row))
    }

    async fn insert_exercise(&self, exercise: &NewExercise) -> Result<ExerciseId> {
        let exercise = exercise.clone().validate()?;
        let code = &exercise.code;
        let rec = sqlx::query(
            "INSERT INTO exercises (code, machine, video_url, instructions)
             VALUES (?, ?, ?, ?)
             RETURNING id",
        )
        .bind(code)
        .bind(&exercise.machine)
        .bind(&exercise.video_url)
        .bind(&exercise.instructions)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("failed to insert exercise {code}"))?;
        Ok(ExerciseId(rec.get::<i64, _>(0)))
    }

    async fn list_exercises(&self) -> Result<Vec<Exercise>> {
        let rows = sqlx::query(
            "SELECT id, code, machine, video_url, instructions FROM exercises ORDER BY code ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(exercise_from_row).collect())
    }

    async fn submit_signup(&self, signup: &NewSignup) -> Result<SignupId> {
        let rec = sqlx::query(
            "INSERT INTO trainer_signups (name, email, trainer, datetime, exercise_code, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(&signup.name)
        .bind(&signup.email)
        .bind(&signup.trainer)
        .bind(&signup.datetime)
        .bind(signup.exercise_code.as_deref().map(machine_code::canonical))
        .bind(SignupStatus::Pending.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(SignupId(rec.get::<i64, _>(0)))
    }

    async fn update_signup_status(
        &self,
        signup_id: SignupId,
        status: SignupStatus,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE trainer_signups SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(signup_id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_signups_by_trainer(&self, trainer: &str) -> Result<Vec<TrainerSignup>> {
        self.list_signups_where("trainer", trainer).await
    }

    async fn list_signups_by_email(&self, email: &str) -> Result<Vec<TrainerSignup>> {
        self.list_signups_where("email", email).await
    }
}

fn exercise_from_row(row: &SqliteRow) -> Exercise {
    Exercise {
        exercise_id: ExerciseId(row.get::<i64, _>("id")),
        code: row.get::<String, _>("code"),
        machine: row.get::<String, _>("machine"),
        video_url: row.get::<String, _>("video_url"),
        instructions: row.get::<String, _>("instructions"),
    }
}

fn signup_from_row(row: &SqliteRow) -> Result<TrainerSignup> {
    let raw_status: String = row.try_get("status")?;
    let status = raw_status
        .parse::<SignupStatus>()
        .map_err(|err| anyhow!("corrupt signup row: {err}"))?;
    Ok(TrainerSignup {
        signup_id: SignupId(row.try_get::<i64, _>("id")?),
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        trainer: row.try_get("trainer")?,
        datetime: row.try_get("datetime")?,
        exercise_code: row.try_get("exercise_code")?,
        status,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.starts_with("sqlite::memory:") || database_url.contains("mode=memory")
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if is_memory_url(database_url) || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
