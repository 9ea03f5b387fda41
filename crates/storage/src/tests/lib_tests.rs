use super::*;

fn signup(name: &str, email: &str, trainer: &str) -> NewSignup {
    NewSignup {
        name: name.into(),
        email: email.into(),
        trainer: trainer.into(),
        datetime: "2026-10-20T18:30".into(),
        exercise_code: None,
    }
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("gym.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );
}

#[tokio::test]
async fn finds_seeded_exercise_ignoring_case() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.seed_sample_exercises().await.expect("seed");

    let exercise = storage
        .get_exercise_by_code("lp-02")
        .await
        .expect("lookup")
        .expect("leg press");
    assert_eq!(exercise.code, "LP-02");
    assert_eq!(exercise.machine, "Leg Press (LP-02)");
}

#[tokio::test]
async fn unknown_code_is_not_an_error() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.seed_sample_exercises().await.expect("seed");

    let missing = storage.get_exercise_by_code("ZZ-99").await.expect("lookup");
    assert!(missing.is_none());
}

#[tokio::test]
async fn seeding_twice_inserts_once() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert_eq!(storage.seed_sample_exercises().await.expect("seed"), 3);
    assert_eq!(storage.seed_sample_exercises().await.expect("reseed"), 0);
    assert_eq!(storage.list_exercises().await.expect("list").len(), 3);
}

#[tokio::test]
async fn seed_skips_catalog_with_admin_entries() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage
        .insert_exercise(&NewExercise {
            code: "rw-07".into(),
            machine: "Rowing Machine".into(),
            video_url: "https://video.example/rw".into(),
            instructions: "Drive with the legs first.".into(),
        })
        .await
        .expect("insert");

    assert_eq!(storage.seed_sample_exercises().await.expect("seed"), 0);
    let codes: Vec<String> = storage
        .list_exercises()
        .await
        .expect("list")
        .into_iter()
        .map(|e| e.code)
        .collect();
    assert_eq!(codes, vec!["RW-07".to_string()]);
}

#[tokio::test]
async fn duplicate_exercise_code_is_rejected() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.seed_sample_exercises().await.expect("seed");

    let err = storage
        .insert_exercise(&NewExercise {
            code: "bp-01".into(),
            machine: "Another Bench".into(),
            video_url: "https://video.example/bp".into(),
            instructions: "n/a".into(),
        })
        .await
        .expect_err("unique code");
    assert!(err.to_string().contains("BP-01"));
}

#[tokio::test]
async fn exercise_with_blank_code_is_not_stored() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");

    let err = storage
        .insert_exercise(&NewExercise {
            code: "   ".into(),
            machine: "".into(),
            video_url: "".into(),
            instructions: "".into(),
        })
        .await
        .expect_err("blank code");
    assert_eq!(err.to_string(), "code is required");
    assert!(storage.list_exercises().await.expect("list").is_empty());
}

#[tokio::test]
async fn inserted_exercise_is_trimmed_and_canonical() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");

    storage
        .insert_exercise(&NewExercise {
            code: " lp-03 ".into(),
            machine: " Leg Curl ".into(),
            video_url: "https://video.example/lc".into(),
            instructions: "Curl slowly.".into(),
        })
        .await
        .expect("insert");
    let stored = storage
        .get_exercise_by_code("LP-03")
        .await
        .expect("lookup")
        .expect("exercise");
    assert_eq!(stored.machine, "Leg Curl");
}

#[tokio::test]
async fn submitted_signup_starts_pending() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let mut request = signup("Dana", "dana@example.com", "Olena");
    request.exercise_code = Some("lp-02".into());

    let signup_id = storage.submit_signup(&request).await.expect("submit");
    let stored = storage
        .get_signup(signup_id)
        .await
        .expect("load")
        .expect("signup");
    assert_eq!(stored.status, SignupStatus::Pending);
    assert_eq!(stored.exercise_code.as_deref(), Some("LP-02"));
    assert_eq!(stored.trainer, "Olena");
}

#[tokio::test]
async fn status_update_reports_missing_signup() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let signup_id = storage
        .submit_signup(&signup("Dana", "dana@example.com", "Ivan"))
        .await
        .expect("submit");

    assert!(storage
        .update_signup_status(signup_id, SignupStatus::Confirmed)
        .await
        .expect("update"));
    assert!(!storage
        .update_signup_status(SignupId(signup_id.0 + 100), SignupStatus::Cancelled)
        .await
        .expect("update missing"));

    let stored = storage
        .get_signup(signup_id)
        .await
        .expect("load")
        .expect("signup");
    assert_eq!(stored.status, SignupStatus::Confirmed);
}

#[tokio::test]
async fn lists_signups_by_trainer_and_email_newest_first() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let first = storage
        .submit_signup(&signup("Dana", "dana@example.com", "Ivan"))
        .await
        .expect("first");
    let second = storage
        .submit_signup(&signup("Dana", "dana@example.com", "Kateryna"))
        .await
        .expect("second");
    let third = storage
        .submit_signup(&signup("Lev", "lev@example.com", "Ivan"))
        .await
        .expect("third");

    let ivan: Vec<SignupId> = storage
        .list_signups_by_trainer("Ivan")
        .await
        .expect("by trainer")
        .into_iter()
        .map(|s| s.signup_id)
        .collect();
    assert_eq!(ivan, vec![third, first]);

    let dana: Vec<SignupId> = storage
        .list_signups_by_email("dana@example.com")
        .await
        .expect("by email")
        .into_iter()
        .map(|s| s.signup_id)
        .collect();
    assert_eq!(dana, vec![second, first]);
}
