#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

use hookbox::api::MgmtState;
use hookbox::config::Config;
use hookbox::{AppBuilder, storage, telemetry};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::watch;
use tracing::Instrument;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    let telemetry_guard = telemetry::init_telemetry(&config.telemetry)?;

    hookbox::setup_panic_hook();

    let boot_span = tracing::info_span!("boot_server");
    let (api_listener, mgmt_listener, app_router, mgmt_app, pool, shutdown_rx) = async {
        // Phase 1: Infrastructure Setup
        let pool = storage::init_pool(&config.database).await?;
        hookbox::run_migrations(&pool).await?;

        if config.webhook.secret_bytes().is_none() {
            tracing::warn!("WEBHOOK_SECRET is not set; every webhook will be rejected with 401");
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        hookbox::spawn_signal_handler(shutdown_tx);

        // Phase 2: Component Wiring
        let app = AppBuilder::new(config.clone()).with_database(pool.clone()).build()?;

        // Phase 3: Listeners and Routers
        let app_router = hookbox::api::app_router(&config, app.services);
        let mgmt_app = hookbox::api::mgmt_router(
            MgmtState { health_service: app.health_service, registry: app.registry },
            app.http_metrics,
        );

        let api_addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
        let mgmt_addr: SocketAddr = format!("{}:{}", config.server.host, config.server.mgmt_port).parse()?;

        let api_listener = tokio::net::TcpListener::bind(api_addr).await?;
        let mgmt_listener = tokio::net::TcpListener::bind(mgmt_addr).await?;

        tracing::info!(address = %api_addr, "listening");
        tracing::info!(address = %mgmt_addr, "management server listening");

        Ok::<_, anyhow::Error>((api_listener, mgmt_listener, app_router, mgmt_app, pool, shutdown_rx))
    }
    .instrument(boot_span)
    .await?;

    // Phase 4: Serve until a shutdown signal arrives
    let mut api_rx = shutdown_rx.clone();
    let api_server = axum::serve(api_listener, app_router).with_graceful_shutdown(async move {
        let _ = api_rx.wait_for(|&s| s).await;
    });

    let mut mgmt_rx = shutdown_rx.clone();
    let mgmt_server = axum::serve(mgmt_listener, mgmt_app).with_graceful_shutdown(async move {
        let _ = mgmt_rx.wait_for(|&s| s).await;
    });

    let servers = async { tokio::try_join!(api_server, mgmt_server) };
    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs);
    let mut deadline_rx = shutdown_rx.clone();
    let deadline = async move {
        let _ = deadline_rx.wait_for(|&s| s).await;
        tokio::time::sleep(shutdown_timeout).await;
    };

    // Phase 5: Graceful Shutdown
    tokio::select! {
        res = servers => {
            if let Err(e) = res {
                tracing::error!(error = %e, "Server error");
            }
        }
        () = deadline => {
            tracing::warn!("Timeout waiting for in-flight requests to finish.");
        }
    }

    pool.close().await;
    tracing::info!("Shutdown complete");

    telemetry_guard.shutdown();
    Ok(())
}
