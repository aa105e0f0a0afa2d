//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use jwt_auth_backend::config::PluginConfig;
use jwt_auth_backend::{jwt, HttpServer, Shutdown};
use tokio::net::TcpListener;

/// Fresh directory under the system temp dir.
pub fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("jwt-it-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Start a server on an ephemeral port serving `ui_file` at `/v1/auth/jwt/ui`.
pub async fn start_server(ui_file: &Path) -> (SocketAddr, Shutdown) {
    let mut config = PluginConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.ui.file_path = ui_file.to_path_buf();
    config.timeouts.request_secs = 5;

    let backend = jwt::factory(&config.ui).unwrap();
    let server = HttpServer::new(config, backend);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
