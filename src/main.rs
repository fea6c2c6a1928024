use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vulngate::commands;

// Use mimalloc as global allocator for improved performance.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Policy-driven vulnerability-suppression evaluator.
#[derive(Parser)]
#[command(name = "vulngate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate findings against a suppression policy and gate the run.
    ///
    /// Classifies each finding as suppressed, expired, patched, or
    /// unmatched, prints a report, and exits 1 when expired or unmatched
    /// findings at or above the severity threshold are present.
    Evaluate(commands::evaluate::EvaluateArgs),

    /// Validate a suppression policy document without evaluating findings.
    Validate(commands::validate::ValidateArgs),
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays clean for JSON output.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "vulngate=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Evaluate(args) => commands::evaluate::run(&args)?,
        Commands::Validate(args) => commands::validate::run(&args)?,
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
