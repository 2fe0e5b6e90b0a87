//! Server instance management

use std::net::SocketAddr;

use anyhow::{Result, anyhow};
use extrelay_api::RelayClient;
use extrelay_engine::Relay;
use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::RelayConfig;
use crate::handlers::{AppState, create_router};

/// Relay HTTP server, configured but not yet listening.
pub struct RelayServer {
    config: RelayConfig,
    relay: Relay,
}

impl RelayServer {
    /// Validate `config` and wire the relay onto its HTTP collaborators.
    pub fn new(config: RelayConfig) -> Result<Self> {
        config.validate().map_err(|error| anyhow!("invalid relay config: {error}"))?;
        let client = RelayClient::new(&config.http)?;
        let relay = Relay::over_http(client, config.routes(), config.callback_url.clone());
        Ok(Self { config, relay })
    }

    /// Bind the configured address and serve in the background.
    pub async fn start(self) -> Result<RunningRelayServer> {
        let address = self.config.socket_addr()?;
        let listener = tokio::net::TcpListener::bind(address)
            .await
            .map_err(|error| anyhow!("failed to bind {address}: {error}"))?;
        self.serve(listener)
    }

    /// Serve on an already bound listener in the background.
    pub fn serve(self, listener: tokio::net::TcpListener) -> Result<RunningRelayServer> {
        let bound_address = listener.local_addr()?;
        let functions = self.config.functions.len();
        let router = create_router(AppState::new(self.relay));

        let cancellation_token = CancellationToken::new();
        let server_handle = tokio::spawn({
            let shutdown = cancellation_token.child_token();
            async move {
                if let Err(error) = axum::serve(listener, router)
                    .with_graceful_shutdown(async move {
                        shutdown.cancelled().await;
                    })
                    .await
                {
                    error!(%error, "relay server stopped with an error");
                }
            }
        });

        info!(address = %bound_address, functions, "relay listening");
        Ok(RunningRelayServer {
            bind_address: bound_address,
            cancellation_token,
            server_handle,
        })
    }
}

/// Runtime handle for a running relay server.
#[derive(Debug)]
pub struct RunningRelayServer {
    bind_address: SocketAddr,
    cancellation_token: CancellationToken,
    server_handle: JoinHandle<()>,
}

impl RunningRelayServer {
    /// Return the bound socket address for the running server.
    pub fn bound_address(&self) -> SocketAddr {
        self.bind_address
    }

    /// Stop accepting connections and wait for in-flight requests to finish.
    pub async fn stop(self) -> Result<()> {
        self.cancellation_token.cancel();
        self.server_handle
            .await
            .map_err(|error| anyhow!("relay server task failed: {error}"))
    }
}

/// Wait for Ctrl+C or, on unix, SIGTERM.
pub async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.map_err(|error| anyhow!("install Ctrl+C handler: {error}")) };

    #[cfg(unix)]
    let terminate = async {
        let mut terminate =
            signal::unix::signal(signal::unix::SignalKind::terminate()).map_err(|error| anyhow!("install TERM handler: {error}"))?;
        terminate.recv().await;
        Ok::<(), anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        result = ctrl_c => result?,
        result = terminate => result?,
    }
    info!("received shutdown signal");
    Ok(())
}
