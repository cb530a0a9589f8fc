use clap::{Args, Parser, ValueEnum};

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    #[command(flatten)]
    pub database: DatabaseConfig,

    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub webhook: WebhookConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,

    #[command(flatten)]
    pub health: HealthConfig,
}

#[derive(Clone, Debug, Args)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    #[arg(long = "database-url", env = "DATABASE_URL", default_value = "sqlite:///data/app.db")]
    pub url: String,

    /// Maximum number of pooled connections
    #[arg(long = "database-max-connections", env = "DATABASE_MAX_CONNECTIONS", default_value_t = 8)]
    pub max_connections: u32,

    /// Seconds to wait for a free connection before failing
    #[arg(long = "database-acquire-timeout-secs", env = "DATABASE_ACQUIRE_TIMEOUT_SECS", default_value_t = 5)]
    pub acquire_timeout_secs: u64,

    /// Milliseconds a writer waits on a locked database before giving up
    #[arg(long = "database-busy-timeout-ms", env = "DATABASE_BUSY_TIMEOUT_MS", default_value_t = 5000)]
    pub busy_timeout_ms: u64,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port for the public API
    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Port for health probes and metrics
    #[arg(long, env = "MGMT_PORT", default_value_t = 9090)]
    pub mgmt_port: u16,

    /// Seconds to wait for in-flight requests during shutdown
    #[arg(long, env = "SHUTDOWN_TIMEOUT_SECS", default_value_t = 5)]
    pub shutdown_timeout_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct WebhookConfig {
    /// Shared secret used to verify the X-Signature header
    #[arg(long = "webhook-secret", env = "WEBHOOK_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Largest accepted webhook body in bytes
    #[arg(long = "webhook-max-body-bytes", env = "WEBHOOK_MAX_BODY_BYTES", default_value_t = 1_048_576)]
    pub max_body_bytes: usize,
}

impl WebhookConfig {
    /// Returns the secret bytes, treating an empty value as unset.
    #[must_use]
    pub fn secret_bytes(&self) -> Option<&[u8]> {
        self.secret.as_deref().filter(|s| !s.is_empty()).map(str::as_bytes)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    #[default]
    Json,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// Default log filter when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,

    /// OTLP/gRPC collector endpoint for trace export
    #[arg(long, env = "OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct HealthConfig {
    /// Timeout for the readiness database ping
    #[arg(long = "health-db-timeout-ms", env = "HEALTH_DB_TIMEOUT_MS", default_value_t = 2000)]
    pub db_timeout_ms: u64,
}

impl Config {
    #[must_use]
    pub fn load() -> Self {
        Self::parse()
    }
}
