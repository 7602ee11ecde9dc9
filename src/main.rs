//! vicat-keys HTTP server.
//!
//! Opens the state document, bootstraps the admin on first boot, starts the
//! hourly session sweep and serves the request surface until Ctrl-C.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use vicat_keys::api::{self, AppState};
use vicat_keys::config::{default_data_path, DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME};
use vicat_keys::crypto::credential::HashCost;
use vicat_keys::{logging, sweeper, KeyServer, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "vicat-keys", version)]
#[command(about = "Redeem-code key distribution server")]
struct Args {
    /// Server socket bind address
    #[arg(long, env = "VICAT_BIND", default_value = "127.0.0.1:3000")]
    bind: SocketAddr,

    /// Path of the JSON state document
    #[arg(long = "data", env = "VICAT_DATA_PATH")]
    data_path: Option<PathBuf>,

    /// Admin username created on first boot
    #[arg(long, env = "VICAT_ADMIN_USERNAME", default_value = DEFAULT_ADMIN_USERNAME)]
    admin_username: String,

    /// Admin password created on first boot
    #[arg(
        long,
        env = "VICAT_ADMIN_PASSWORD",
        default_value = DEFAULT_ADMIN_PASSWORD,
        hide_env_values = true
    )]
    admin_password: String,

    /// Argon2 memory cost in KiB
    #[arg(long, env = "VICAT_HASH_MEMORY_KIB", default_value_t = HashCost::default().memory_kib)]
    hash_memory_kib: u32,

    /// Argon2 passes over memory
    #[arg(long, env = "VICAT_HASH_ITERATIONS", default_value_t = HashCost::default().iterations)]
    hash_iterations: u32,

    /// Seconds between expired-session sweeps
    #[arg(long, env = "VICAT_SWEEP_SECS", default_value_t = 3600)]
    sweep_secs: u64,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            bind: self.bind,
            data_path: self.data_path.unwrap_or_else(default_data_path),
            admin_username: self.admin_username,
            admin_password: self.admin_password,
            hash_cost: HashCost {
                memory_kib: self.hash_memory_kib,
                iterations: self.hash_iterations,
                ..HashCost::default()
            },
            sweep_interval: Duration::from_secs(self.sweep_secs),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before clap reads the environment
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    logging::init();

    let config = args.into_config();
    let server = Arc::new(
        KeyServer::open(&config)
            .with_context(|| format!("failed to open state at {}", config.data_path.display()))?,
    );

    if config.admin_password == DEFAULT_ADMIN_PASSWORD {
        tracing::warn!(
            "Admin password is the built-in default; set VICAT_ADMIN_PASSWORD before first boot"
        );
    }

    let sweeper = sweeper::spawn(Arc::clone(&server), config.sweep_interval);
    let app = api::create_router(AppState { server });

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!(
        bind = %config.bind,
        data = %config.data_path.display(),
        "vicat-keys listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    sweeper.abort();
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
