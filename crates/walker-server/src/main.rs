//! Visualization server for the random walkers model.

mod api;
mod page;
mod protocol;
mod session;
mod telemetry;
mod ws;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use walker_core::ServerConfig;
use walker_world::{agent_portrayal, CanvasGrid};

#[derive(Parser, Debug)]
#[command(name = "walker-server")]
#[command(about = "Random walkers on a toroidal grid, with a browser visualization")]
struct Cli {
    /// JSON configuration file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to bind the web server
    #[arg(long)]
    bind: Option<String>,

    /// Port to bind the web server
    #[arg(long)]
    port: Option<u16>,

    /// Number of walkers
    #[arg(long)]
    agents: Option<usize>,

    /// Grid width (also sizes the canvas)
    #[arg(long)]
    width: Option<i32>,

    /// Grid height (also sizes the canvas)
    #[arg(long)]
    height: Option<i32>,

    /// Random seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    fn into_config(self) -> Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => ServerConfig::default(),
        };

        if let Some(bind) = self.bind {
            config.bind_address = bind;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(agents) = self.agents {
            config.model.num_agents = agents;
        }
        if let Some(width) = self.width {
            config.model.width = width;
            config.canvas.grid_width = width;
        }
        if let Some(height) = self.height {
            config.model.height = height;
            config.canvas.grid_height = height;
        }
        if self.seed.is_some() {
            config.model.seed = self.seed;
        }
        config.json_logs |= self.json_logs;

        config.model.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Cli::parse().into_config()?;

    // Initialize telemetry
    telemetry::init_telemetry(&config)?;

    info!(
        "Starting {} with {} agents on a {}x{} grid",
        config.name, config.model.num_agents, config.model.width, config.model.height
    );

    let canvas = CanvasGrid::from_config(agent_portrayal, &config.canvas);
    let page: Arc<str> = page::render_page(&config, &canvas).into();
    let session = Arc::new(session::Session::new(config.model.clone(), canvas)?);

    let app = api::router(api::AppState { session, page });

    // Start server
    let addr = config.address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Interface starting at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Shutdown telemetry
    telemetry::shutdown_telemetry();

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
