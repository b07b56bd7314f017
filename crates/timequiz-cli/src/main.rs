//! timequiz CLI: timed multiple-choice quizzes in the terminal.

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

mod clock;
mod commands;
mod config;

#[derive(Parser)]
#[command(name = "timequiz", version, about = "Timed multiple-choice quizzes")]
struct Cli {
    /// Quiz file or directory of quiz files
    #[arg(long, global = true)]
    bank: Option<PathBuf>,

    /// Directory for saved progress and results
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a quiz, resuming saved progress if any
    Play {
        /// Quiz to start when there is nothing to resume
        #[arg(long)]
        quiz: Option<String>,
    },

    /// Show the score card of the last quiz, or of explicit counts
    Results {
        /// Number of correct answers
        #[arg(long, requires_all = ["incorrect", "total"])]
        correct: Option<u32>,

        /// Number of incorrect answers
        #[arg(long, requires_all = ["correct", "total"])]
        incorrect: Option<u32>,

        /// Number of questions in the quiz
        #[arg(long, requires_all = ["correct", "incorrect"])]
        total: Option<u32>,

        /// Mark the quiz as ended by the timer
        #[arg(long, requires = "total")]
        timed_out: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Review each answer of the last quiz
    Review {
        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// List available quizzes
    List,

    /// Validate quiz files
    Validate,

    /// Discard saved progress and results
    Reset,

    /// Create starter config and example quiz
    Init,
}

/// Paths and limits after merging config file, environment and flags.
pub struct Settings {
    pub bank: PathBuf,
    pub data_dir: PathBuf,
    pub duration_secs: u32,
}

fn settings(cli: &Cli) -> Result<Settings> {
    let config = config::load_config_from(cli.config.as_deref())?;
    Ok(Settings {
        bank: cli.bank.clone().unwrap_or(config.bank_dir),
        data_dir: cli.data_dir.clone().unwrap_or(config.data_dir),
        duration_secs: config.duration_secs,
    })
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Init = cli.command {
        return commands::init::execute();
    }

    let settings = settings(&cli)?;
    match cli.command {
        Commands::Play { quiz } => commands::play::execute(&settings, quiz).await,
        Commands::Results {
            correct,
            incorrect,
            total,
            timed_out,
            json,
        } => {
            let counts = match (correct, incorrect, total) {
                (Some(c), Some(i), Some(t)) => Some((c, i, t)),
                _ => None,
            };
            commands::results::execute(&settings, counts, timed_out, json)
        }
        Commands::Review { json } => commands::review::execute(&settings, json),
        Commands::List => commands::list::execute(&settings),
        Commands::Validate => commands::validate::execute(&settings),
        Commands::Reset => commands::reset::execute(&settings),
        Commands::Init => commands::init::execute(),
    }
}

/// `RUST_LOG` directives plus `timequiz=info`.
fn env_filter() -> EnvFilter {
    let filter = EnvFilter::from_default_env();
    match "timequiz=info".parse::<Directive>() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directive_survives_rust_log() {
        std::env::set_var("RUST_LOG", "warn");
        let filter = env_filter().to_string();
        std::env::remove_var("RUST_LOG");

        assert!(filter.contains("timequiz=info"), "got {filter}");
        assert!(filter.contains("warn"), "got {filter}");
    }
}
