mod api;
mod constants;

use std::{net::SocketAddr, sync::Arc};

use clap::Parser;
use starnotary_core::{
    constants::{GENESIS_SEED, VERIFICATION_WINDOW_SECS},
    Blockchain, ChainConfig, Secp256k1Verifier, SystemClock,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api::{router, AppState};
use crate::constants::{DEFAULT_LISTEN, DEFAULT_LOG_FILTER};

#[derive(Parser, Debug)]
#[command(name = "starnotary-node")]
#[command(about = "In-memory star notary chain served over HTTP")]
struct Args {
    /// Address to listen on, e.g. 127.0.0.1:8200
    #[arg(long, env = "STARNOTARY_LISTEN", default_value = DEFAULT_LISTEN)]
    listen: String,

    /// Seconds a signed ownership message stays valid
    #[arg(long, env = "STARNOTARY_WINDOW_SECS", default_value_t = VERIFICATION_WINDOW_SECS)]
    verification_window_secs: u64,

    /// Payload stored in the genesis block
    #[arg(long, default_value = GENESIS_SEED)]
    genesis_seed: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let args = Args::parse();
    let config = ChainConfig {
        verification_window_secs: args.verification_window_secs,
        genesis_seed: args.genesis_seed,
    };
    let chain = Blockchain::new(Secp256k1Verifier, SystemClock, config)?;
    let state = AppState {
        chain: Arc::new(chain),
    };

    let addr: SocketAddr = args.listen.parse()?;
    info!("starnotary-node listening on http://{addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("starnotary-node stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}
