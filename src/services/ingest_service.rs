use crate::domain::message::{InsertOutcome, Timestamp};
use crate::domain::validation::validate;
use crate::error::{AppError, Result};
use crate::services::signature_service::SignatureVerifier;
use crate::storage::DbPool;
use crate::storage::message_repo::MessageRepository;
use prometheus::{IntCounterVec, Opts, Registry};

#[derive(Clone, Debug)]
pub(crate) struct Metrics {
    pub(crate) outcomes_total: IntCounterVec,
}

impl Metrics {
    fn new(registry: &Registry) -> prometheus::Result<Self> {
        let outcomes_total =
            IntCounterVec::new(Opts::new("webhook_requests_total", "Total webhook requests by result"), &["result"])?;
        registry.register(Box::new(outcomes_total.clone()))?;
        Ok(Self { outcomes_total })
    }
}

/// How an answered webhook request was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Created,
    Duplicate,
    InvalidSignature,
    ValidationError,
}

impl IngestOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Duplicate => "duplicate",
            Self::InvalidSignature => "invalid_signature",
            Self::ValidationError => "validation_error",
        }
    }

    /// Classifies a finished ingestion. Infrastructure failures have no classification.
    #[must_use]
    pub fn classify(result: &Result<IngestReceipt>) -> Option<Self> {
        match result {
            Ok(IngestReceipt { outcome: InsertOutcome::Created, .. }) => Some(Self::Created),
            Ok(IngestReceipt { outcome: InsertOutcome::AlreadyExists, .. }) => Some(Self::Duplicate),
            Err(AppError::InvalidSignature) => Some(Self::InvalidSignature),
            Err(AppError::Validation(_)) => Some(Self::ValidationError),
            Err(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReceipt {
    pub message_id: String,
    pub outcome: InsertOutcome,
}

#[derive(Clone, Debug)]
pub struct IngestService {
    pool: DbPool,
    repo: MessageRepository,
    verifier: SignatureVerifier,
    metrics: Metrics,
}

impl IngestService {
    /// # Errors
    /// Returns `prometheus::Error` if the service metrics cannot be registered.
    pub fn new(
        pool: DbPool,
        repo: MessageRepository,
        verifier: SignatureVerifier,
        registry: &Registry,
    ) -> prometheus::Result<Self> {
        Ok(Self { pool, repo, verifier, metrics: Metrics::new(registry)? })
    }

    /// Verifies, validates and stores one webhook body.
    ///
    /// The signature is checked on the raw bytes before anything parses them. First inserts and
    /// duplicates both succeed; the receipt tells them apart for logging.
    ///
    /// # Errors
    /// Returns `AppError::InvalidSignature` if the signature is missing or wrong.
    /// Returns `AppError::Validation` if the body is not a valid message.
    /// Returns `AppError::Database` if the message cannot be stored.
    #[tracing::instrument(err(level = "debug"), skip_all, fields(body_len = raw_body.len()))]
    pub async fn ingest(&self, raw_body: &[u8], signature: Option<&str>) -> Result<IngestReceipt> {
        let result = self.run(raw_body, signature).await;

        if let Some(outcome) = IngestOutcome::classify(&result) {
            self.metrics.outcomes_total.with_label_values(&[outcome.as_str()]).inc();
        }

        result
    }

    async fn run(&self, raw_body: &[u8], signature: Option<&str>) -> Result<IngestReceipt> {
        if !self.verifier.verify(raw_body, signature) {
            return Err(AppError::InvalidSignature);
        }

        let message = validate(raw_body)?;

        let mut conn = self.pool.acquire().await?;
        let outcome = self.repo.insert(&mut conn, &message, &Timestamp::now()).await?;

        match outcome {
            InsertOutcome::Created => tracing::debug!(message_id = %message.message_id(), "Message stored"),
            InsertOutcome::AlreadyExists => {
                tracing::debug!(message_id = %message.message_id(), "Duplicate message ignored");
            }
        }

        Ok(IngestReceipt { message_id: message.message_id, outcome })
    }
}
