use crate::domain::message::{
    InsertOutcome, Message, MessageFilter, MessagePage, MessageStats, Pagination, TOP_SENDERS_LIMIT, Timestamp,
};
use crate::error::Result;
use crate::storage::records::{MessageRecord, SenderCountRecord, StatsRecord};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

#[derive(Clone, Debug, Default)]
pub struct MessageRepository {}

impl MessageRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// Stores a message unless one with the same id already exists.
    ///
    /// The primary key decides the outcome, so concurrent inserts of one id produce exactly
    /// one `Created`. An existing record is never touched.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the insert fails.
    #[tracing::instrument(level = "debug", skip(self, conn, message), fields(message_id = %message.message_id))]
    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        message: &Message,
        received_at: &Timestamp,
    ) -> Result<InsertOutcome> {
        let result = sqlx::query(
            r"
            INSERT INTO messages (message_id, sender, recipient, ts, text, received_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(message_id) DO NOTHING
            ",
        )
        .bind(message.message_id.as_str())
        .bind(message.sender.as_str())
        .bind(message.recipient.as_str())
        .bind(message.timestamp.as_str())
        .bind(message.text.as_deref())
        .bind(received_at.as_str())
        .execute(conn)
        .await?;

        if result.rows_affected() == 1 { Ok(InsertOutcome::Created) } else { Ok(InsertOutcome::AlreadyExists) }
    }

    /// Counts the records matching `filter` and fetches one ordered window of them.
    ///
    /// Run it inside a transaction so the count and the page come from the same snapshot.
    ///
    /// # Errors
    /// Returns `AppError::Database` if either query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub async fn query(
        &self,
        conn: &mut SqliteConnection,
        filter: &MessageFilter,
        pagination: Pagination,
    ) -> Result<MessagePage> {
        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM messages");
        push_filter(&mut count_query, filter);
        let total = count_query.build_query_scalar::<i64>().fetch_one(&mut *conn).await?;

        let mut page_query = QueryBuilder::<Sqlite>::new("SELECT message_id, sender, recipient, ts, text FROM messages");
        push_filter(&mut page_query, filter);
        page_query
            .push(" ORDER BY ts ASC, message_id ASC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let records = page_query.build_query_as::<MessageRecord>().fetch_all(&mut *conn).await?;

        Ok(MessagePage { messages: records.into_iter().map(Into::into).collect(), total })
    }

    /// Aggregates counts, the busiest senders and the covered time range.
    ///
    /// # Errors
    /// Returns `AppError::Database` if a query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub async fn stats(&self, conn: &mut SqliteConnection) -> Result<MessageStats> {
        let totals = sqlx::query_as::<_, StatsRecord>(
            r"
            SELECT COUNT(*) AS total_messages,
                   COUNT(DISTINCT sender) AS distinct_senders,
                   MIN(ts) AS first_ts,
                   MAX(ts) AS last_ts
            FROM messages
            ",
        )
        .fetch_one(&mut *conn)
        .await?;

        let top_senders = sqlx::query_as::<_, SenderCountRecord>(
            r"
            SELECT sender, COUNT(*) AS count
            FROM messages
            GROUP BY sender
            ORDER BY count DESC, sender ASC
            LIMIT ?
            ",
        )
        .bind(TOP_SENDERS_LIMIT)
        .fetch_all(&mut *conn)
        .await?;

        Ok(MessageStats {
            total_messages: totals.total_messages,
            distinct_senders: totals.distinct_senders,
            top_senders: top_senders.into_iter().map(Into::into).collect(),
            first_timestamp: totals.first_ts.map(Timestamp::from_canonical),
            last_timestamp: totals.last_ts.map(Timestamp::from_canonical),
        })
    }
}

/// Appends the conjunctive WHERE clause for `filter`.
fn push_filter<'a>(builder: &mut QueryBuilder<'a, Sqlite>, filter: &'a MessageFilter) {
    let mut keyword = " WHERE ";
    if let Some(sender) = &filter.sender {
        builder.push(keyword).push("sender = ").push_bind(sender.as_str());
        keyword = " AND ";
    }
    if let Some(since) = &filter.since {
        builder.push(keyword).push("ts >= ").push_bind(since.as_str());
        keyword = " AND ";
    }
    if let Some(needle) = &filter.text_contains {
        // NULL text makes instr() NULL, so messages without text never match.
        builder.push(keyword).push("instr(lower(text), lower(").push_bind(needle.as_str()).push(")) > 0");
    }
}
