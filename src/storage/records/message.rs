use crate::domain::message::{Message, SenderCount, Timestamp};

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct MessageRecord {
    pub(crate) message_id: String,
    pub(crate) sender: String,
    pub(crate) recipient: String,
    pub(crate) ts: String,
    pub(crate) text: Option<String>,
}

impl From<MessageRecord> for Message {
    fn from(record: MessageRecord) -> Self {
        Self {
            message_id: record.message_id,
            sender: record.sender,
            recipient: record.recipient,
            timestamp: Timestamp::from_canonical(record.ts),
            text: record.text,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SenderCountRecord {
    pub(crate) sender: String,
    pub(crate) count: i64,
}

impl From<SenderCountRecord> for SenderCount {
    fn from(record: SenderCountRecord) -> Self {
        Self { sender: record.sender, count: record.count }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct StatsRecord {
    pub(crate) total_messages: i64,
    pub(crate) distinct_senders: i64,
    pub(crate) first_ts: Option<String>,
    pub(crate) last_ts: Option<String>,
}
