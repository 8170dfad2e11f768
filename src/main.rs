use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use feedsnap::config::Config;
use feedsnap::output::OutputVariant;
use feedsnap::pipeline;

#[derive(Parser, Debug)]
#[command(
    name = "feedsnap",
    about = "Fetch an RSS/Atom feed and write its articles as a JSON snapshot"
)]
struct Args {
    /// TOML config file (defaults apply to every missing key; the file must exist)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the snapshot here instead of the configured path
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Record shape of the snapshot
    #[arg(long, value_enum)]
    variant: Option<OutputVariant>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Logs go to stderr; RUST_LOG controls verbosity
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => Config::default(),
    };
    if let Some(output) = args.output {
        config.output_path = output;
    }
    if let Some(variant) = args.variant {
        config.variant = variant;
    }

    let summary = pipeline::run(&config).await?;

    println!(
        "Wrote {} articles to {}",
        summary.articles,
        summary.output_path.display()
    );
    Ok(())
}
