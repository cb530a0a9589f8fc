use crate::domain::message::{MessageStats, SenderCount};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SenderCountResponse {
    pub from: String,
    pub count: i64,
}

impl From<SenderCount> for SenderCountResponse {
    fn from(entry: SenderCount) -> Self {
        Self { from: entry.sender, count: entry.count }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_messages: i64,
    pub senders_count: i64,
    pub messages_per_sender: Vec<SenderCountResponse>,
    pub first_message_ts: Option<String>,
    pub last_message_ts: Option<String>,
}

impl From<MessageStats> for StatsResponse {
    fn from(stats: MessageStats) -> Self {
        Self {
            total_messages: stats.total_messages,
            senders_count: stats.distinct_senders,
            messages_per_sender: stats.top_senders.into_iter().map(Into::into).collect(),
            first_message_ts: stats.first_timestamp.map(|ts| ts.to_string()),
            last_message_ts: stats.last_timestamp.map(|ts| ts.to_string()),
        }
    }
}
