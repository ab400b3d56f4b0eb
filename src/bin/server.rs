//! FleetOps HTTP server binary.
//!
//! # Usage
//!
//! ```bash
//! fleetops-server
//! ```
//!
//! # Environment
//!
//! - `HOST` / `PORT`: bind address (default 0.0.0.0:3000)
//! - `RUST_LOG`: log level (default info)
//! - `REPOSITORY_TYPE`: "firestore" or "local" (see also repository.toml)
//! - `FIRESTORE_PROJECT_ID` and friends: Firestore backend settings
//! - `FLEETOPS_TOKENS`: comma-separated `token:role[:vehicle]` entries for
//!   the static verifier, e.g. `s3cret:admin,v100tok:driver:V-100`
//! - `FLEETOPS_LENIENT_READS`: "1"/"true" to treat partition transport
//!   failures as empty results instead of failing statistics requests

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use fleetops::auth::StaticTokenVerifier;
use fleetops::db::factory::RepositoryFactory;
use fleetops::http::{create_router, AppState};
use fleetops::services::statistics::StatisticsOptions;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_level = env::var("RUST_LOG")
        .ok()
        .and_then(|level| level.parse::<Level>().ok())
        .unwrap_or(Level::INFO);
    FmtSubscriber::builder().with_max_level(log_level).init();

    info!("Starting FleetOps HTTP server");

    let repository = RepositoryFactory::from_default_config()?;
    match repository.health_check().await {
        Ok(true) => info!("Repository is healthy"),
        Ok(false) => warn!("Repository reports unhealthy; continuing anyway"),
        Err(err) => warn!("Repository health check failed: {}", err),
    }

    let verifier = match env::var("FLEETOPS_TOKENS") {
        Ok(spec) => {
            let verifier = StaticTokenVerifier::from_spec(&spec).map_err(anyhow::Error::msg)?;
            if verifier.is_empty() {
                warn!("FLEETOPS_TOKENS is set but contains no entries");
            }
            verifier
        }
        Err(_) => {
            warn!("FLEETOPS_TOKENS is not set; all authenticated endpoints will reject requests");
            StaticTokenVerifier::new()
        }
    };

    let mut options = StatisticsOptions::default();
    let lenient = env::var("FLEETOPS_LENIENT_READS")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if lenient {
        warn!("Lenient read mode enabled: partition transport failures count as empty");
        options.lenient_transport = true;
    }

    let state = AppState::new(repository, Arc::new(verifier)).with_statistics_options(options);
    let app = create_router(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(3000);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
