//! drillbook CLI: adaptive recall quizzes from flat-file question banks.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "drillbook", version, about = "Adaptive recall quizzes")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Workspace directory (overrides the config file)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Learner name (overrides the config file)
    #[arg(long, global = true)]
    learner: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a quiz, reading one answer per line from stdin
    Quiz {
        /// Number of questions (default: quiz_size from the config)
        #[arg(long)]
        count: Option<usize>,

        /// Only ask questions carrying all of these tags (comma-separated)
        #[arg(long)]
        tags: Option<String>,

        /// Also draw from questions carrying all of these tags; repeatable
        #[arg(long)]
        also: Vec<String>,

        /// Seed for the question shuffle
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show mastery per tag
    Progress {
        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show every recorded response
    History {
        /// Only include questions carrying all of these tags (comma-separated)
        #[arg(long)]
        tags: Option<String>,
    },

    /// Load the workspace and check the question banks
    Validate,

    /// Create a starter config and example question bank
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("drillbook=info")),
        )
        .init();

    let cli = Cli::parse();
    let global = commands::GlobalArgs {
        config: cli.config,
        root: cli.root,
        learner: cli.learner,
    };

    let result = match cli.command {
        Commands::Quiz {
            count,
            tags,
            also,
            seed,
        } => commands::quiz::execute(&global, count, tags, also, seed),
        Commands::Progress { format } => commands::progress::execute(&global, format),
        Commands::History { tags } => commands::history::execute(&global, tags),
        Commands::Validate => commands::validate::execute(&global),
        Commands::Init => commands::init::execute(&global),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
