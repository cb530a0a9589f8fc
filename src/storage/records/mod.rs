pub mod message;

pub(crate) use message::{MessageRecord, SenderCountRecord, StatsRecord};
