//! HTTP server command

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use repoapi_core::Settings;
use repoapi_server::{run_server, AppState, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Config file (default: ~/.repoapi/config.toml)
    #[arg(long, short = 'c', env = "REPOAPI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout: u64,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let settings = Settings::load(args.config.as_deref()).context("Failed to load settings")?;

    if !settings.repo_root.is_dir() {
        tracing::warn!(
            repo_root = %settings.repo_root.display(),
            "repository root does not exist yet"
        );
    }

    let config = ServerConfig {
        bind_addr: args.bind,
        cors_permissive: args.cors_permissive,
        timeout: Duration::from_secs(args.timeout),
    };

    tracing::info!("Starting repoapi server on {}", args.bind);

    // Blocks until shutdown
    run_server(AppState::from_settings(settings), config)
        .await
        .context("Server error")?;

    Ok(())
}
