//! pairgate backend
//!
//! Serves the pair-programming HTTP API: chat, working-context files,
//! command execution, and model selection.

use clap::Parser;
use pairgate_backend::{api, config::Config};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pairgate", version, about = "HTTP API for an AI pair-programming assistant")]
struct Cli {
    /// Start the HTTP API server
    #[arg(long)]
    api: bool,

    /// Host to bind
    #[arg(long, env = "PAIRGATE_HOST")]
    host: Option<String>,

    /// Port to bind
    #[arg(long, env = "PAIRGATE_PORT")]
    port: Option<u16>,

    /// Workspace directory files and commands are confined to
    #[arg(long)]
    workspace: Option<PathBuf>,

    /// Directory for settings and chat history
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Model name
    #[arg(long)]
    model: Option<String>,

    /// Model provider
    #[arg(long)]
    provider: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn apply(self, config: &mut Config) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(workspace) = self.workspace {
            config.workspace.root = workspace;
        }
        if let Some(data_dir) = self.data_dir {
            config.persistence.data_dir = data_dir;
        }
        if let Some(model) = self.model {
            config.model.model = model;
        }
        if let Some(provider) = self.provider {
            config.model.provider = provider;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "pairgate_backend=debug,tower_http=debug"
    } else {
        "pairgate_backend=info,tower_http=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    if !cli.api {
        anyhow::bail!("only API mode is available; start the gateway with --api");
    }

    // Load configuration
    let mut config = Config::from_env();
    cli.apply(&mut config);
    info!("Configuration loaded: {:?}", config);

    let host = config.server.host.clone();
    let port = config.server.port;
    let addr = config.server_addr();

    let state = api::RouterState::initialize(config).await?;
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?;
    info!("🚀 Server running on http://{}", listener.local_addr()?);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Setup graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Handle graceful shutdown signals (Ctrl+C, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "pairgate", "--api", "--host", "0.0.0.0", "--port", "9000", "--model", "gpt-4-32k",
        ]);
        assert!(cli.api);

        let mut config = Config::from_env();
        let provider = config.model.provider.clone();
        cli.apply(&mut config);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.model.model, "gpt-4-32k");
        assert_eq!(config.model.provider, provider);
    }

    #[test]
    fn test_cli_api_flag_defaults_off() {
        let cli = Cli::parse_from(["pairgate"]);
        assert!(!cli.api);
    }
}
