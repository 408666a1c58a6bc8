//! Console front end for Folio gamebooks.

mod commands;

use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::DataArgs;

#[derive(Parser)]
#[command(
    name = "folio",
    about = "Folio: play dice-driven gamebooks in the terminal",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(flatten)]
    data: DataArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Roll a new character
    Create {
        /// Character name (default: Adventurer)
        name: Option<String>,
    },

    /// Play from the character's current page
    Play,

    /// Show the adventure sheet
    Stats,

    /// Delete the saved character
    Delete {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Check the story and enemy files for broken links
    Check,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Create { name } => commands::create::run(&cli.data, name.as_deref()),
        Commands::Play => commands::play::run(&cli.data),
        Commands::Stats => commands::stats::run(&cli.data),
        Commands::Delete { yes } => commands::delete::run(&cli.data, yes),
        Commands::Check => commands::check::run(&cli.data),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
