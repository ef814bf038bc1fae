//! learnlens CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "learnlens",
    version,
    about = "Learning insights from assessment and study-session data"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the insight report for one student
    Student {
        /// Student id (e.g. "STU001")
        #[arg(long)]
        id: String,

        /// Directory with students / assessments / study_sessions tables
        #[arg(long)]
        data: Option<PathBuf>,

        /// Output directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, md, all (comma-separated)
        #[arg(long, default_value = "json")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Generate class-level insights
    Class {
        /// Directory with students / assessments / study_sessions tables
        #[arg(long)]
        data: Option<PathBuf>,

        /// Output directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, md, all (comma-separated)
        #[arg(long, default_value = "json")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Generate reports for every student plus the class view
    Batch {
        /// Directory with students / assessments / study_sessions tables
        #[arg(long)]
        data: Option<PathBuf>,

        /// Output directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Max concurrent student reports
        #[arg(long)]
        parallelism: Option<usize>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check a data directory for schema problems
    Validate {
        /// Directory with students / assessments / study_sessions tables
        #[arg(long)]
        data: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and sample data set
    Init,
}

#[tokio::main]
async fn main() {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "learnlens=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Student {
            id,
            data,
            output,
            format,
            config,
        } => commands::student::execute(id, data, output, format, config),
        Commands::Class {
            data,
            output,
            format,
            config,
        } => commands::class::execute(data, output, format, config),
        Commands::Batch {
            data,
            output,
            parallelism,
            config,
        } => commands::batch::execute(data, output, parallelism, config).await,
        Commands::Validate { data, config } => commands::validate::execute(data, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
