use crate::config::HealthConfig;
use crate::storage::DbPool;
use prometheus::{IntGaugeVec, Opts, Registry};
use std::time::Duration;
use tokio::time::timeout;

#[derive(Clone, Debug)]
pub(crate) struct Metrics {
    pub(crate) status: IntGaugeVec,
}

impl Metrics {
    fn new(registry: &Registry) -> prometheus::Result<Self> {
        let status = IntGaugeVec::new(
            Opts::new("health_status", "Status of health checks (1 for ok, 0 for error)"),
            &["component"],
        )?;
        registry.register(Box::new(status.clone()))?;
        Ok(Self { status })
    }

    fn record(&self, component: &str, ok: bool) {
        self.status.with_label_values(&[component]).set(i64::from(ok));
    }
}

#[derive(Clone, Debug)]
pub struct HealthService {
    pool: DbPool,
    secret_configured: bool,
    config: HealthConfig,
    metrics: Metrics,
}

impl HealthService {
    /// # Errors
    /// Returns `prometheus::Error` if the health gauge cannot be registered.
    pub fn new(
        pool: DbPool,
        secret_configured: bool,
        config: HealthConfig,
        registry: &Registry,
    ) -> prometheus::Result<Self> {
        Ok(Self { pool, secret_configured, config, metrics: Metrics::new(registry)? })
    }

    /// Checks database connectivity.
    ///
    /// # Errors
    /// Returns a string describing the failure if the database is unreachable.
    pub async fn check_db(&self) -> Result<(), String> {
        let db_timeout = Duration::from_millis(self.config.db_timeout_ms);

        let res = match timeout(db_timeout, sqlx::query("SELECT 1").execute(&self.pool)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(format!("Database connection failed: {e:?}")),
            Err(_) => Err("Database connection timed out".to_string()),
        };

        self.metrics.record("database", res.is_ok());
        res
    }

    /// Checks that a webhook secret was configured.
    ///
    /// # Errors
    /// Returns a string describing the failure if no secret is set.
    pub fn check_secret(&self) -> Result<(), String> {
        let res = if self.secret_configured { Ok(()) } else { Err("WEBHOOK_SECRET is not configured".to_string()) };

        self.metrics.record("secret", res.is_ok());
        res
    }
}
