//! quizkit CLI — take multiple-choice quizzes in the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use quizkit_core::model::QuizMode;

mod commands;

#[derive(Parser)]
#[command(name = "quizkit", version, about = "Timed multiple-choice quizzes from JSON question sets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a quiz interactively
    Take {
        /// Question source: http(s) URL, data URL, or local JSON file
        #[arg(long)]
        source: String,

        /// Display name for the question set
        #[arg(long)]
        name: Option<String>,

        /// Quiz mode: study (instant feedback) or exam
        #[arg(long, default_value = "study")]
        mode: QuizMode,

        /// Number of questions (default: all)
        #[arg(long)]
        count: Option<String>,

        /// Shuffle questions before picking
        #[arg(long)]
        shuffle: bool,

        /// Time limit in minutes (default: untimed)
        #[arg(long, conflicts_with = "timed")]
        time_limit: Option<String>,

        /// Use the configured default time limit
        #[arg(long)]
        timed: bool,

        /// Write an HTML review page here when done
        #[arg(long)]
        report: Option<PathBuf>,

        /// Write JSON results here when done
        #[arg(long)]
        json: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check that a question set loads
    Validate {
        /// Question source: URL, data URL, local JSON file, or - for stdin
        #[arg(long)]
        source: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List predefined question sets
    Sources {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and sample question set
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("quizkit=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            source,
            name,
            mode,
            count,
            shuffle,
            time_limit,
            timed,
            report,
            json,
            config,
        } => {
            commands::take::execute(commands::take::TakeArgs {
                source,
                name,
                mode,
                count,
                shuffle,
                time_limit,
                timed,
                report,
                json,
                config,
            })
            .await
        }
        Commands::Validate { source, config } => commands::validate::execute(source, config).await,
        Commands::Sources { config } => commands::sources::execute(config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
