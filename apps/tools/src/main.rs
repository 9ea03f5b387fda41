use anyhow::{bail, Result};
use clap::{ArgGroup, Parser, Subcommand};
use shared::domain::{NewExercise, SignupId, SignupStatus, TrainerSignup};
use storage::{GymStore, Storage};

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://./data/gym_guide.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Installs the sample catalog into an empty database.
    Seed,
    AddExercise {
        code: String,
        machine: String,
        video_url: String,
        instructions: String,
    },
    ListExercises,
    #[command(group(ArgGroup::new("filter").required(true).args(["trainer", "email"])))]
    Signups {
        #[arg(long)]
        trainer: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    SetStatus {
        signup_id: i64,
        status: SignupStatus,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::Seed => {
            let inserted = storage.seed_sample_exercises().await?;
            println!("seeded exercises={inserted}");
        }
        Command::AddExercise {
            code,
            machine,
            video_url,
            instructions,
        } => {
            let exercise_id = storage
                .insert_exercise(&NewExercise {
                    code,
                    machine,
                    video_url,
                    instructions,
                })
                .await?;
            println!("created exercise_id={}", exercise_id.0);
        }
        Command::ListExercises => {
            for exercise in storage.list_exercises().await? {
                println!("{}\t{}\t{}", exercise.code, exercise.machine, exercise.video_url);
            }
        }
        Command::Signups { trainer, email } => {
            let signups = match (trainer, email) {
                (Some(trainer), _) => storage.list_signups_by_trainer(&trainer).await?,
                (None, Some(email)) => storage.list_signups_by_email(&email).await?,
                (None, None) => bail!("pass --trainer or --email"),
            };
            for signup in &signups {
                print_signup(signup);
            }
        }
        Command::SetStatus { signup_id, status } => {
            if !storage
                .update_signup_status(SignupId(signup_id), status)
                .await?
            {
                bail!("signup {signup_id} not found");
            }
            println!("signup_id={signup_id} status={status}");
        }
    }

    Ok(())
}

fn print_signup(signup: &TrainerSignup) {
    println!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}",
        signup.signup_id.0,
        signup.status,
        signup.trainer,
        signup.datetime,
        signup.name,
        signup.email,
        signup.exercise_code.as_deref().unwrap_or("-"),
    );
}
