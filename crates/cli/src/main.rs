use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use extrelay_server::{RelayConfig, RelayServer, shutdown_signal};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Relay extension triggers between storage adapters and transformation services.
#[derive(Debug, Parser)]
#[command(name = "extrelay", version, about)]
struct Args {
    /// Path to the relay configuration file (JSON).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Address to listen on; overrides the config file and EXTRELAY_HOST.
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on; overrides the config file and EXTRELAY_PORT.
    #[arg(long)]
    port: Option<u16>,
}

impl Args {
    fn apply(self, config: &mut RelayConfig) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = RelayConfig::load(args.config.as_deref())?;
    init_tracing(&config.log_level);
    args.apply(&mut config);

    let running = RelayServer::new(config)?.start().await?;
    shutdown_signal().await?;
    info!("stopping relay");
    running.stop().await
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
