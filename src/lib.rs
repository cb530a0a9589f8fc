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

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod storage;
pub mod telemetry;

use crate::api::ServiceContainer;
use crate::api::metrics::HttpMetrics;
use crate::config::Config;
use crate::services::health_service::HealthService;
use crate::services::ingest_service::IngestService;
use crate::services::query_service::QueryService;
use crate::services::signature_service::SignatureVerifier;
use crate::storage::DbPool;
use crate::storage::message_repo::MessageRepository;
use prometheus::Registry;
use tokio::sync::watch;

/// Applies pending schema migrations.
///
/// # Errors
/// Returns an error if a migration fails to apply.
pub async fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    sqlx::migrate!().run(pool).await?;
    Ok(())
}

/// Everything the two routers need, wired against one pool and one metrics registry.
#[derive(Debug)]
pub struct App {
    pub services: ServiceContainer,
    pub health_service: HealthService,
    pub registry: Registry,
    pub http_metrics: HttpMetrics,
}

#[derive(Debug)]
pub struct AppBuilder {
    config: Config,
    pool: Option<DbPool>,
    registry: Registry,
}

impl AppBuilder {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config, pool: None, registry: Registry::new() }
    }

    #[must_use]
    pub fn with_database(mut self, pool: DbPool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Wires services and registers their metrics.
    ///
    /// # Errors
    /// Returns an error if no database was supplied or a collector fails to register.
    pub fn build(self) -> anyhow::Result<App> {
        let pool = self.pool.ok_or_else(|| anyhow::anyhow!("Database pool is required"))?;
        let registry = self.registry;

        let repo = MessageRepository::new();
        let verifier = SignatureVerifier::new(self.config.webhook.secret_bytes());
        let secret_configured = verifier.is_configured();

        let ingest_service = IngestService::new(pool.clone(), repo.clone(), verifier, &registry)?;
        let query_service = QueryService::new(pool.clone(), repo);
        let health_service = HealthService::new(pool, secret_configured, self.config.health.clone(), &registry)?;

        // The API and management listeners report into the same collectors.
        let http_metrics = HttpMetrics::new(&registry)?;

        Ok(App {
            services: ServiceContainer { ingest_service, query_service, http_metrics: http_metrics.clone() },
            health_service,
            registry,
            http_metrics,
        })
    }
}

/// Flips `shutdown_tx` to `true` on Ctrl-C or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => {},
            () = terminate => {},
        }

        tracing::info!("Shutdown signal received, draining connections");
        let _ = shutdown_tx.send(true);
    });
}

/// Routes panics through `tracing` so they reach the structured log.
pub fn setup_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info.location().map(|l| format!("{}:{}", l.file(), l.line())).unwrap_or_default();
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());

        tracing::error!(panic.location = %location, panic.payload = %payload, "Process panicked");
    }));
}
