//! # CLI Commands
//!
//! Subcommands of the `trellis` binary and their arguments.

pub mod admin;
pub mod completions;
pub mod migrate;
pub mod validate;

use clap::{Args, Subcommand};

/// Available commands for the Trellis CLI
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the API server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),

    /// Verify configuration
    Validate(ValidateArgs),

    /// Manage administrator accounts
    Admin(AdminArgs),
}

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Server host to bind to
    #[arg(long, env = "TRELLIS_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Server port to bind to
    #[arg(short, long, env = "TRELLIS_PORT", default_value = "3000")]
    pub port: u16,

    /// Do not apply pending migrations on startup
    #[arg(long)]
    pub skip_migrations: bool,
}

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// List applied and pending migrations without changing anything
    #[arg(long, conflicts_with = "rollback")]
    pub status: bool,

    /// Roll back applied migrations instead of applying pending ones
    #[arg(long)]
    pub rollback: bool,

    /// Number of migrations to roll back
    #[arg(long, default_value = "1", requires = "rollback")]
    pub steps: u32,
}

/// Arguments for the completions command
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Also connect to the database and Redis
    #[arg(long)]
    pub connect: bool,
}

/// Arguments for the admin command
#[derive(Args, Debug)]
pub struct AdminArgs {
    #[command(subcommand)]
    pub action: AdminAction,
}

#[derive(Subcommand, Debug)]
pub enum AdminAction {
    /// Create an administrator, or promote and reactivate an existing account
    Create {
        #[arg(long)]
        email:     String,
        #[arg(long)]
        full_name: String,
        /// Password of a new account; ignored when the account exists
        #[arg(long, env = "TRELLIS_ADMIN_PASSWORD", hide_env_values = true)]
        password:  String,
    },
}
