//! CLI frontend for the Transfer Tycoon scenario engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tt",
    about = "Transfer Tycoon: transfer-center call training scenarios",
    version,
    propagate_version = true
)]
struct Cli {
    /// Session config file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the scenarios in a directory
    List {
        /// Directory containing Scenario<N>.json files
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one scenario's element tree and timing table
    Show {
        /// Scenario id
        id: u32,

        /// Directory containing Scenario<N>.json files
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Load every scenario and report problems
    Check {
        /// Directory containing Scenario<N>.json files
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Play a scenario at the terminal
    Play {
        /// Scenario id
        id: u32,

        /// Directory containing Scenario<N>.json files
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Learner id written into the session record
        #[arg(long)]
        learner: Option<String>,

        /// Difficulty tag written into the session record
        #[arg(long)]
        difficulty: Option<String>,

        /// Directory session records are written to
        #[arg(long)]
        records: Option<PathBuf>,

        /// Session report printed on quit: json, text
        #[arg(long, default_value = "json")]
        export: String,
    },
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::List { dir, json } => commands::list::run(&dir, json),
        Commands::Show { id, dir } => commands::show::run(&dir, id),
        Commands::Check { dir } => commands::check::run(&dir),
        Commands::Play {
            id,
            dir,
            learner,
            difficulty,
            records,
            export,
        } => commands::load_config(cli.config.as_deref())
            .map(|config| commands::apply_overrides(config, learner, difficulty, records))
            .and_then(|config| commands::play::run(&dir, id, config, &export)),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
