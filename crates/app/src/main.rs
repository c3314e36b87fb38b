mod cors;
mod domains;
mod platforms;
mod problem;
mod router;
mod seed;
mod status;
mod telemetry;

use std::{net::SocketAddr, sync::Arc};

use chrono::Utc;
use tokio::signal;
use tracing::{info, warn};

use domain_radar_dns::{AvailabilityChecker, HickoryProbe, DEFAULT_DEADLINE};
use domain_radar_storage::Database;
use domain_radar_util::{load_env_file, AppConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    load_env_file();
    let config = AppConfig::from_env()?;

    telemetry::init_tracing(&config)?;
    let metrics = telemetry::init_metrics();

    let database = Database::connect(&config.database_url).await?;
    database.run_migrations().await?;
    seed::seed_default_platforms(&database, Utc::now()).await?;

    let checker = AvailabilityChecker::new(Arc::new(HickoryProbe::from_system(DEFAULT_DEADLINE)));
    let state = router::AppState::new(metrics, database.clone(), checker);
    let app = router::app_router(state).layer(cors::cors_layer(&config.cors_origins));

    let addr: SocketAddr = config.bind_addr;
    info!(stage = "app", %addr, env = %config.environment.as_str(), "starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    database.close().await;
    info!(stage = "app", "storage connection closed");
    served.map_err(|err| err.into())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(stage = "app", error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(stage = "app", error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!(stage = "app", "shutdown signal received, draining server");
}
