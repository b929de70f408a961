use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

#[derive(Parser)]
#[command(name = "stillwater-cli", version, about = "Stillwater journaling companion CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Local user identity
    User {
        #[command(subcommand)]
        action: commands::user::UserAction,
    },
    /// Journal entries
    Entry {
        #[command(subcommand)]
        action: commands::entry::EntryAction,
    },
    /// Analysis results
    Evaluation {
        #[command(subcommand)]
        action: commands::evaluation::EvaluationAction,
    },
    /// Energy state, weekly rhythm and today's reflections
    Dashboard {
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Achievement progress
    Achievements {
        /// Only show one category
        #[arg(long, value_enum)]
        category: Option<commands::achievements::CategoryFilter>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Five-week activity heatmap
    Heatmap {
        /// Print the grid as JSON
        #[arg(long)]
        json: bool,
    },
    /// Cumulative stats
    Stats {
        /// Recompute from entries and unlock earned achievements
        #[arg(long)]
        recalculate: bool,
    },
    /// Talk to the companion
    Chat {
        #[command(subcommand)]
        action: commands::chat::ChatAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("STILLWATER_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::User { action } => commands::user::run(action),
        Commands::Entry { action } => commands::entry::run(action),
        Commands::Evaluation { action } => commands::evaluation::run(action),
        Commands::Dashboard { json } => commands::dashboard::run(json),
        Commands::Achievements { category, json } => commands::achievements::run(category, json),
        Commands::Heatmap { json } => commands::heatmap::run(json),
        Commands::Stats { recalculate } => commands::stats::run(recalculate),
        Commands::Chat { action } => commands::chat::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
