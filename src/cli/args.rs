//! CLI argument definitions using clap
//!
//! Commands:
//! - todo-api serve [--host] [--port] [--mode] [--database-url]
//! - todo-api init [--database-url]
//!
//! Every flag falls back to its environment variable.

use clap::{Args, Parser, Subcommand};

use crate::http_server::{RunMode, ServerConfig};

/// Todo List API - CRUD over HTTP for todo items
#[derive(Parser, Debug)]
#[command(name = "todo-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Create an empty todo collection for the configured database
    Init {
        /// Store location: memory:// or file://<path>
        #[arg(long, env = "DATABASE_URL", default_value = "memory://")]
        database_url: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Run mode: development echoes internal error text to clients
    #[arg(long, env = "APP_ENV", default_value = "production")]
    pub mode: RunMode,

    /// Store location: memory:// or file://<path>
    #[arg(long, env = "DATABASE_URL", default_value = "memory://")]
    pub database_url: String,
}

impl From<ServeArgs> for ServerConfig {
    fn from(args: ServeArgs) -> Self {
        Self {
            host: args.host,
            port: args.port,
            mode: args.mode,
            database_url: args.database_url,
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
