use shared::domain::NewExercise;

/// Exercises installed by the first-start bootstrap.
pub fn sample_exercises() -> Vec<NewExercise> {
    vec![
        NewExercise {
            code: "LP-02".into(),
            machine: "Leg Press (LP-02)".into(),
            video_url: "https://www.youtube.com/embed/8BcPHWGQO44".into(),
            instructions: "Place your feet shoulder-width on the platform, keep your back pressed \
                to the seat, lower slowly and push evenly with both legs. Breathe out on the push. \
                Avoid locking the knees."
                .into(),
        },
        NewExercise {
            code: "BP-01".into(),
            machine: "Bench Press (BP-01)".into(),
            video_url: "https://www.youtube.com/embed/vthMCtgVtFw".into(),
            instructions: "Lie flat on the bench, plant your feet, grip slightly wider than \
                shoulder-width, lower the bar to mid-chest and press up explosively while \
                exhaling. Keep scapulae retracted."
                .into(),
        },
        NewExercise {
            code: "PL-01".into(),
            machine: "Treadmill (PL-01)".into(),
            video_url: "https://www.youtube.com/embed/5X3r1s5x46s".into(),
            instructions: "Use a controlled warm-up, maintain upright posture, short quick arm \
                swings and avoid leaning forward. Start slow then increase speed gradually."
                .into(),
        },
    ]
}
