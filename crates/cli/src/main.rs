//! Crowdfund CLI - database maintenance.
//!
//! # Usage
//!
//! ```bash
//! # Apply schema migrations and create the session table
//! cf-cli migrate
//!
//! # Apply schema migrations only
//! cf-cli migrate --skip-sessions
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "cf-cli")]
#[command(author, version, about = "Crowdfund CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        /// Do not create the session store table
        #[arg(long)]
        skip_sessions: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::migrate::MigrationError> {
    match cli.command {
        Commands::Migrate { skip_sessions } => commands::migrate::run(!skip_sessions).await,
    }
}
