//! JWT auth backend plugin server.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────┐
//!                        │                 PLUGIN SERVER                     │
//!                        │                                                   │
//!   GET /v1/auth/jwt/ui  │  ┌─────────┐   ┌──────────┐   ┌────────────────┐ │
//!   ─────────────────────┼─▶│  http   │──▶│ logical  │──▶│   framework    │ │
//!                        │  │ server  │   │ Request  │   │ Backend router │ │
//!                        │  └─────────┘   └──────────┘   └───────┬────────┘ │
//!                        │                                       │          │
//!                        │                                       ▼          │
//!                        │  ┌─────────┐   ┌──────────┐   ┌────────────────┐ │
//!   ◀────────────────────┼──│response │◀──│ logical  │◀──│  jwt::path_ui  │ │
//!     200 text/html      │  │ mapping │   │ Response │   │ (reads file)   │ │
//!                        │  └─────────┘   └──────────┘   └────────────────┘ │
//!                        │                                                   │
//!                        │  config · observability · lifecycle               │
//!                        └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use jwt_auth_backend::config::{load_config, PluginConfig};
use jwt_auth_backend::observability::{logging, metrics};
use jwt_auth_backend::{jwt, HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "jwt-auth-backend")]
#[command(about = "JWT auth backend with a diagnostic UI endpoint", long_about = None)]
struct Args {
    /// Path to a TOML config file; built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => PluginConfig::default(),
    };

    logging::init(&config.observability)?;

    tracing::info!("jwt-auth-backend v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        mount = %config.mount.path,
        ui_file = %config.ui.file_path.display(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let backend = jwt::factory(&config.ui)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, backend);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
