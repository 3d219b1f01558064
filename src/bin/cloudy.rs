//! `cloudy` command line.
//!
//! ```sh
//! cloudy generate --sobjects Account,Contact --alias uat --output src/sobjects
//! ```
//!
//! Secrets are read from the environment (a `.env` file in the working
//! directory or one of its parents is loaded first). Log level follows
//! `RUST_LOG`, defaulting to `info`.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cloudy_sf::codegen::{Generator, DEFAULT_OUTPUT_DIR};
use cloudy_sf::config::{CloudyConfig, CONFIG_FILE, DEFAULT_ALIAS};

#[derive(Debug, Parser)]
#[command(name = "cloudy", version, about = "Salesforce SObject tooling")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate typed Rust models from SObject describe metadata.
    Generate(GenerateArgs),
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Comma-separated SObject names. Defaults to the config's `sobjects`.
    #[arg(long, short = 's', value_delimiter = ',')]
    sobjects: Vec<String>,

    /// Config alias to log in with.
    #[arg(long, short = 'a', default_value = DEFAULT_ALIAS)]
    alias: String,

    /// Path to the config file.
    #[arg(long, short = 'c', default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Output directory. Defaults to the config's `output_dir`, then `sobjects`.
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match dotenvy::dotenv() {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) => warn!("no .env loaded: {e}"),
    }

    let cli = Cli::parse();
    match cli.command {
        Command::Generate(args) => generate(args).await,
    }
}

async fn generate(args: GenerateArgs) -> anyhow::Result<()> {
    let config = CloudyConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    let sobjects = if args.sobjects.is_empty() {
        config.sobjects.clone()
    } else {
        args.sobjects
    };
    if sobjects.is_empty() {
        bail!(
            "no sobject names: pass --sobjects or set \"sobjects\" in {}",
            args.config.display()
        );
    }

    let output = args
        .output
        .or_else(|| config.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

    let credentials = config
        .login(&args.alias)
        .with_context(|| format!("resolving alias {}", args.alias))?
        .authenticate()
        .await
        .context("login failed")?;
    let client = credentials.client()?;

    let generator = Generator::new(client, output);
    let written = generator.generate_all(&sobjects).await?;
    info!(
        files = written.len(),
        output = %generator.output_dir().display(),
        "generation complete"
    );

    Ok(())
}
