use std::sync::Arc;

use clap::Parser;
use salabot_core::cdp::CdpLauncher;
use salabot_core::engine::EngineConfig;
use salabot_server::state::SessionRegistry;
use salabot_server::ws::{AppState, router};
use salabot_server::{cli::Cli, logging};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    if let Err(err) = serve(cli).await {
        error!(target = "salabot", error = %err, "server failed");
        std::process::exit(1);
    }
}

async fn serve(cli: Cli) -> anyhow::Result<()> {
    let mut engine = EngineConfig::default();
    if let Some(url) = cli.login_url {
        engine.login_url = url;
    }

    let state = AppState {
        registry: Arc::new(SessionRegistry::new()),
        engine: Arc::new(engine),
        launcher: Arc::new(CdpLauncher::new(!cli.headed)),
    };

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(target = "salabot", %addr, "listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
