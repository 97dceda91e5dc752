//! Plansmith CLI — the main entry point.
//!
//! Commands:
//! - `onboard`  — Write the default config
//! - `generate` — Turn a request (plus optional documents) into a stored schedule
//! - `users`    — Manage accounts
//! - `show`     — Print a user's stored schedule
//! - `doctor`   — Diagnose configuration, provider, and database

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "plansmith",
    about = "Plansmith — turn free-text requests into validated weekly schedules",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Onboard,

    /// Generate a schedule and save it for a user
    Generate {
        /// The user to save the schedule for
        #[arg(short, long)]
        user: i64,

        /// Documents (.txt, .md) to ground the schedule in; repeatable
        #[arg(short, long = "doc")]
        docs: Vec<PathBuf>,

        /// Print the weekday schedule without saving it
        #[arg(long)]
        dry_run: bool,

        /// The scheduling request
        prompt: String,
    },

    /// Manage users
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },

    /// Show a user's stored schedule
    Show {
        #[arg(short, long)]
        user: i64,
    },

    /// Diagnose system health
    Doctor,
}

#[derive(Subcommand)]
enum UsersAction {
    /// Create a user and print its ID
    Add { username: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Generate {
            user,
            docs,
            dry_run,
            prompt,
        } => commands::generate::run(user, docs, dry_run, prompt).await?,
        Commands::Users { action } => match action {
            UsersAction::Add { username } => commands::users::add(username).await?,
        },
        Commands::Show { user } => commands::show::run(user).await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
