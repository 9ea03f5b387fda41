use shared::domain::{NewSignup, SignupStatus};
use storage::{GymStore, Storage};

#[tokio::test]
async fn seeded_file_database_survives_reopen() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let database_url = format!(
        "sqlite://{}",
        temp_root
            .path()
            .join("gym.db")
            .to_string_lossy()
            .replace('\\', "/")
    );

    let storage = Storage::new(&database_url).await.expect("db");
    assert_eq!(storage.seed_sample_exercises().await.expect("seed"), 3);
    let signup_id = storage
        .submit_signup(&NewSignup {
            name: "Mira".into(),
            email: "mira@example.com".into(),
            trainer: "Olena".into(),
            datetime: "2026-11-02T07:00".into(),
            exercise_code: Some("PL-01".into()),
        })
        .await
        .expect("signup");
    storage.pool().close().await;

    let reopened = Storage::new(&database_url).await.expect("reopen");
    assert_eq!(reopened.seed_sample_exercises().await.expect("reseed"), 0);
    let treadmill = reopened
        .get_exercise_by_code("pl-01")
        .await
        .expect("lookup")
        .expect("treadmill");
    assert_eq!(treadmill.machine, "Treadmill (PL-01)");

    let signups = reopened
        .list_signups_by_email("mira@example.com")
        .await
        .expect("signups");
    assert_eq!(signups.len(), 1);
    assert_eq!(signups[0].signup_id, signup_id);
    assert_eq!(signups[0].status, SignupStatus::Pending);
}
