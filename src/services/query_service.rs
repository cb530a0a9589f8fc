use crate::domain::message::{MessageFilter, MessagePage, MessageStats, Pagination};
use crate::error::Result;
use crate::storage::DbPool;
use crate::storage::message_repo::MessageRepository;

#[derive(Clone, Debug)]
pub struct QueryService {
    pool: DbPool,
    repo: MessageRepository,
}

impl QueryService {
    #[must_use]
    pub const fn new(pool: DbPool, repo: MessageRepository) -> Self {
        Self { pool, repo }
    }

    /// Lists one page of messages matching `filter`, with the total match count.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn list_messages(&self, filter: &MessageFilter, pagination: Pagination) -> Result<MessagePage> {
        let mut tx = self.pool.begin().await?;
        let page = self.repo.query(&mut tx, filter, pagination).await?;
        tx.commit().await?;

        tracing::debug!(returned = page.messages.len(), total = page.total, "Messages listed");
        Ok(page)
    }

    /// Computes aggregate statistics over every stored message.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn stats(&self) -> Result<MessageStats> {
        let mut tx = self.pool.begin().await?;
        let stats = self.repo.stats(&mut tx).await?;
        tx.commit().await?;
        Ok(stats)
    }
}
