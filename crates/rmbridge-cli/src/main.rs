//! CLI entry point - the composition root.
//!
//! Loads `.env`, installs logging, resolves configuration and dispatches to
//! handlers. Errors are printed once here and turned into exit codes.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use rmbridge_cli::progress::DownloadProgress;
use rmbridge_cli::{Cli, CliError, Commands, bootstrap, handlers};

#[tokio::main]
async fn main() {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = bootstrap::build_config(&cli, |key| std::env::var(key).ok())?;
    tracing::debug!(?config, "Resolved configuration");

    match cli.command {
        Commands::Setup => handlers::setup::execute(config).await,
        Commands::Status => {
            handlers::status::execute(&config);
            Ok(())
        }
        Commands::Paths => Ok(handlers::paths::execute(&config)?),
        command => {
            let progress = DownloadProgress::new();
            let client = bootstrap::client(config, &progress)?;
            let result = match command {
                Commands::Mkdir { classification } => {
                    handlers::remote::mkdir(&client, &classification).await
                }
                Commands::Put {
                    file,
                    directory,
                    name,
                } => handlers::remote::put(&client, &file, &directory, name.as_deref()).await,
                Commands::Ls { path } => handlers::remote::ls(&client, &path).await,
                Commands::Mv { from, to } => handlers::remote::mv(&client, &from, &to).await,
                Commands::Setup | Commands::Status | Commands::Paths => Ok(()),
            };
            progress.finish();
            result
        }
    }
}
