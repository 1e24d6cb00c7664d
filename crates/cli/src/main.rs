//! # Rally CLI
//!
//! Command-line interface for the rally volunteer coordination backend.
//!
//! ## Usage
//!
//! ```bash
//! rally serve    # Start the API server (runs migrations automatically)
//! rally migrate  # Run database migrations
//! rally --help   # Show help
//! ```

use clap::{Args, CommandFactory as _, Parser, Subcommand};
use error::Result;
use migration::MigratorTrait;

/// Rally - volunteer event coordination backend
#[derive(Parser, Debug)]
#[command(name = "rally")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (debug, info, warn, error)
    #[arg(short = 'L', long, env = "RUST_LOG", default_value = "info")]
    log_level: String,

    /// Output format (json, pretty, compact)
    #[arg(short, long, env = "RALLY_LOG_FORMAT", default_value = "pretty")]
    log_format: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the API server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),

    /// Verify configuration
    Validate,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Server host to bind to
    #[arg(long, env = "RALLY_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Server port to bind to
    #[arg(short, long, env = "RALLY_PORT", default_value = "3000")]
    port: u16,

    /// Base URL of the postal-code lookup service
    #[arg(long, env = "RALLY_ADDRESS_LOOKUP_URL")]
    address_lookup_url: Option<String>,
}

#[derive(Args, Debug)]
struct MigrateArgs {
    /// Rollback the last migration
    #[arg(long)]
    rollback: bool,
}

#[derive(Args, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: clap_complete::Shell,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    logging::init(&cli.log_level, &cli.log_format, None)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    logging::info!(target: "app", command = ?cli.command, "Rally CLI starting...");

    match cli.command {
        Commands::Serve(args) => serve(&args).await?,
        Commands::Migrate(args) => migrate(&args).await?,
        Commands::Completions(args) => completions(&args)?,
        Commands::Validate => validate()?,
    }

    Ok(())
}

async fn serve(args: &ServeArgs) -> Result<()> {
    let db_config = migration::db::load_config_from_env();
    logging::info!(target: "serve",
        host = %db_config.host,
        port = %db_config.port,
        database = %db_config.database,
        "Connecting to database..."
    );
    let db = db_config
        .connect()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;

    logging::info!(target: "serve", "Running database migrations...");
    migration::Migrator::up(&db, None)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    let mut state = server::AppState::new(db);
    if let Some(url) = &args.address_lookup_url {
        let lookup = engine::external::HttpAddressLookup::new(url.clone());
        state = state.with_address_lookup(std::sync::Arc::new(lookup));
    }
    let app = server::create_app_router(state);

    let address = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", address, e))?;
    logging::info!(target: "serve", address = %address, "API server listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;
    Ok(())
}

async fn migrate(args: &MigrateArgs) -> Result<()> {
    let db = migration::db::connect_from_env()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;

    if args.rollback {
        logging::info!(target: "migrate", "Rolling back the last migration...");
        migration::Migrator::down(&db, None)
            .await
            .map_err(|e| anyhow::anyhow!("Rollback failed: {}", e))?;
        logging::info!(target: "migrate", "Rollback completed successfully");
        return Ok(());
    }

    migration::Migrator::up(&db, None)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    logging::info!(target: "migrate", "Migrations completed successfully");
    Ok(())
}

fn completions(args: &CompletionsArgs) -> Result<()> {
    clap_complete::generate(args.shell, &mut Cli::command(), "rally", &mut std::io::stdout());
    Ok(())
}

fn validate() -> Result<()> {
    let config = migration::db::load_config_from_env();
    logging::info!(target: "validate",
        host = %config.host,
        port = %config.port,
        database = %config.database,
        ssl_mode = %config.ssl_mode.as_str(),
        "Database configuration loaded"
    );
    logging::info!(target: "validate", "Configuration is valid");
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_parse_serve() {
        let cli = Cli::parse_from(["rally", "serve", "--host", "127.0.0.1", "--port", "8080"]);
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.host, "127.0.0.1");
                assert_eq!(args.port, 8080);
            },
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_validate() {
        let cli = Cli::parse_from(["rally", "validate"]);
        match cli.command {
            Commands::Validate => {},
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["rally", "validate"]);
        assert_eq!(cli.log_level, "info");
        assert_eq!(cli.log_format, "pretty");
    }

    #[test]
    fn test_migrate_rollback() {
        let cli = Cli::parse_from(["rally", "migrate", "--rollback"]);
        match cli.command {
            Commands::Migrate(args) => assert!(args.rollback),
            _ => panic!("Expected Migrate command"),
        }
    }

    #[test]
    fn test_cli_command_factory() {
        let cmd = Cli::command();
        assert_eq!(cmd.get_name(), "rally");
    }

    #[test]
    fn test_completions_returns_ok() {
        let args = CompletionsArgs {
            shell: clap_complete::Shell::Bash,
        };
        assert!(completions(&args).is_ok());
    }
}
