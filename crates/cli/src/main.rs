//! # Trellis CLI
//!
//! Command-line interface for the Trellis project-management service.
//!
//! ## Usage
//!
//! ```bash
//! trellis serve                  # Start the API server (runs migrations first)
//! trellis migrate --status       # List applied and pending migrations
//! trellis admin create --email root@example.com --full-name Root
//! trellis --help
//! ```

mod commands;
mod config;
mod server;

use auth::secrecy::SecretString;
use clap::{CommandFactory as _, Parser};
use error::Result;
use migration::DatabaseConfig;
use tracing::info;

use crate::{
    commands::{AdminAction, Commands},
    config::AppConfig,
};

/// Trellis - project management API
#[derive(Parser, Debug)]
#[command(name = "trellis")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level or filter directive (debug, info, warn, error)
    #[arg(short = 'L', long, env = "RUST_LOG", default_value = "info", global = true)]
    log_level: String,

    /// Output format (json, pretty, compact)
    #[arg(short, long, env = "TRELLIS_LOG_FORMAT", default_value = "json", global = true)]
    log_format: String,

    /// Also write logs to this file, rotated daily
    #[arg(long, env = "TRELLIS_LOG_FILE", global = true)]
    log_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // Completion scripts go to stdout and must not be mixed with log lines.
    let _guard = if matches!(cli.command, Commands::Completions(_)) {
        None
    }
    else {
        let guard = logging::init(&cli.log_level, &cli.log_format, cli.log_file.as_deref())
            .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;
        info!(target: "app", version = env!("CARGO_PKG_VERSION"), "Trellis CLI starting");
        Some(guard)
    };

    match cli.command {
        Commands::Serve(args) => server::serve(AppConfig::from_env()?, &args).await?,
        Commands::Migrate(args) => commands::migrate::migrate(&DatabaseConfig::from_env()?, &args).await?,
        Commands::Validate(args) => commands::validate::validate(&AppConfig::from_env()?, args.connect).await?,
        Commands::Admin(args) => {
            match args.action {
                AdminAction::Create {
                    email,
                    full_name,
                    password,
                } => {
                    let db = DatabaseConfig::from_env()?.connect().await?;
                    let outcome = commands::admin::create_admin(
                        &db,
                        &email,
                        &full_name,
                        SecretString::from(password),
                        None,
                    )
                    .await?;
                    println!("{outcome:?}");
                },
            }
        },
        Commands::Completions(args) => {
            commands::completions::completions(args.shell, &mut Cli::command(), &mut std::io::stdout());
        },
    }
    Ok(())
}
