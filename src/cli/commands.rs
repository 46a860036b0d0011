//! CLI command implementations

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use crate::http_server::{HttpServer, ServerConfig};
use crate::observability::init_logging;
use crate::store::{init_collection, open_store};

/// Main CLI entry point
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve(args) => serve(args.into()),
        Command::Init { database_url } => init(&database_url),
    }
}

/// Create an empty collection.
///
/// Refuses to touch an existing collection file.
pub fn init(database_url: &str) -> CliResult<()> {
    match init_collection(database_url)? {
        Some(path) => println!("Initialized todo collection at {}", path.display()),
        None => println!("Nothing to initialize for {}", database_url),
    }
    Ok(())
}

/// Open the store and serve HTTP until shutdown
pub fn serve(config: ServerConfig) -> CliResult<()> {
    init_logging(config.mode)
        .map_err(|e| CliError::boot_failed(format!("Failed to install logger: {}", e)))?;

    let store = open_store(&config.database_url)?;
    let server = HttpServer::new(config, store);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}
