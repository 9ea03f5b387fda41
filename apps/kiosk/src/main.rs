use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use client_core::{
    lookup::{self, Lookup},
    signup::{self, SIGNUP_CONFIRMATION},
    ExerciseView, HttpGymStore, LineScanner, ScanController, ScanSettings, SessionEvent,
};
use shared::{
    domain::{Exercise, TRAINERS},
    machine_code,
};
use tokio::{io::BufReader, sync::broadcast::error::RecvError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, env = "KIOSK_SERVER_URL", default_value = "http://127.0.0.1:8080")]
    server_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Looks up a scanned payload or a typed machine code.
    Lookup { payload: String },
    /// Reads scanner payloads from stdin, one per line, until input closes.
    Scan {
        #[arg(long, default_value_t = 300)]
        poll_interval_ms: u64,
    },
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        datetime: String,
        #[arg(long)]
        trainer: Option<String>,
        /// Machine code the visitor was looking at.
        #[arg(long)]
        code: Option<String>,
    },
    Trainers,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let store = Arc::new(HttpGymStore::new(&args.server_url)?);

    match args.command {
        Command::Lookup { payload } => {
            let code = lookup_code(&payload)?;
            let view = match lookup::find_by_code(store.as_ref(), &code).await? {
                Lookup::Found(exercise) => ExerciseView::Found(exercise),
                Lookup::NotFound { code } => ExerciseView::NotFound(code),
            };
            if let Some(text) = render_view(&view) {
                println!("{text}");
            }
        }
        Command::Scan { poll_interval_ms } => {
            let scanner = LineScanner::new(BufReader::new(tokio::io::stdin()));
            let controller = ScanController::with_settings(
                Arc::new(scanner),
                store,
                ScanSettings {
                    poll_interval: std::time::Duration::from_millis(poll_interval_ms),
                },
            );
            scan_loop(controller).await;
        }
        Command::Signup {
            name,
            email,
            datetime,
            trainer,
            code,
        } => {
            let mut form = signup::form_for(code.as_deref());
            form.name = name;
            form.email = email;
            form.datetime = datetime;
            if let Some(trainer) = trainer {
                form.trainer = trainer;
            }
            signup::submit(store.as_ref(), form).await?;
            println!("{SIGNUP_CONFIRMATION}");
        }
        Command::Trainers => {
            for trainer in TRAINERS {
                println!("{trainer}");
            }
        }
    }

    Ok(())
}

/// Prints every resolved exercise and rearms the scanner, until the scan
/// ends in an error (including the scanner input closing).
async fn scan_loop(controller: Arc<ScanController>) {
    let mut events = controller.subscribe();
    controller.start().await;
    info!("kiosk scanning");

    loop {
        match events.recv().await {
            Ok(SessionEvent::ExerciseChanged(view)) => {
                if let Some(text) = render_view(&view) {
                    println!("{text}");
                    controller.start().await;
                }
            }
            Ok(SessionEvent::SessionChanged(session)) => {
                if let Some(message) = session.error_message() {
                    println!("{message}");
                    return;
                }
            }
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "kiosk missed session events"),
            Err(RecvError::Closed) => return,
        }
    }
}

/// Normalized machine code for a lookup; blank input is refused.
fn lookup_code(payload: &str) -> Result<String> {
    let code = machine_code::normalize(payload);
    if code.is_empty() {
        bail!("enter a machine code or a scanned QR link");
    }
    Ok(code)
}

/// Text for a settled exercise view; `None` while nothing is resolved yet.
fn render_view(view: &ExerciseView) -> Option<String> {
    match view {
        ExerciseView::None | ExerciseView::Loading(_) => None,
        ExerciseView::Found(exercise) => Some(render_exercise(exercise)),
        ExerciseView::NotFound(code) => Some(format!("No exercise found for code {code}.")),
        ExerciseView::Failed(message) => Some(message.clone()),
    }
}

fn render_exercise(exercise: &Exercise) -> String {
    format!(
        "{}\n  code: {}\n  video: {}\n\n{}",
        exercise.machine, exercise.code, exercise.video_url, exercise.instructions
    )
}
