use crate::domain::message::{DEFAULT_PAGE_LIMIT, Message, MessageFilter, MessagePage, Pagination, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct IngestResponse {
    pub status: String,
}

impl IngestResponse {
    #[must_use]
    pub fn ok() -> Self {
        Self { status: "ok".into() }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message_id: String,
    pub from: String,
    pub to: String,
    pub ts: String,
    pub text: Option<String>,
}

impl From<Message> for MessageResponse {
    fn from(msg: Message) -> Self {
        Self {
            message_id: msg.message_id,
            from: msg.sender,
            to: msg.recipient,
            ts: msg.timestamp.to_string(),
            text: msg.text,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListMessagesResponse {
    pub data: Vec<MessageResponse>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl ListMessagesResponse {
    #[must_use]
    pub fn new(page: MessagePage, pagination: Pagination) -> Self {
        Self {
            data: page.messages.into_iter().map(Into::into).collect(),
            total: page.total,
            limit: pagination.limit(),
            offset: pagination.offset(),
        }
    }
}

/// Query string of `GET /messages`, kept as text so bad values are reported by name.
#[derive(Debug, Default, Deserialize)]
pub struct ListMessagesParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub from: Option<String>,
    pub since: Option<String>,
    pub q: Option<String>,
}

impl ListMessagesParams {
    /// Parses and bounds-checks the parameters. Empty filter values mean "no filter".
    ///
    /// # Errors
    /// Returns a description of the first invalid parameter.
    pub fn parse(self) -> Result<(MessageFilter, Pagination), String> {
        let limit = parse_integer("limit", self.limit.as_deref())?.unwrap_or(DEFAULT_PAGE_LIMIT);
        let offset = parse_integer("offset", self.offset.as_deref())?.unwrap_or(0);
        let pagination = Pagination::new(limit, offset)?;

        let since = match non_empty(self.since) {
            Some(raw) => Some(
                Timestamp::parse_normalized(&raw).map_err(|_| "since must be an ISO-8601 timestamp".to_string())?,
            ),
            None => None,
        };

        let filter = MessageFilter { sender: non_empty(self.from), since, text_contains: non_empty(self.q) };
        Ok((filter, pagination))
    }
}

fn parse_integer(name: &str, raw: Option<&str>) -> Result<Option<i64>, String> {
    raw.map(|value| value.trim().parse::<i64>().map_err(|_| format!("{name} must be an integer"))).transpose()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ListMessagesParams {
        let mut params = ListMessagesParams::default();
        for (key, value) in pairs {
            let value = Some((*value).to_string());
            match *key {
                "limit" => params.limit = value,
                "offset" => params.offset = value,
                "from" => params.from = value,
                "since" => params.since = value,
                "q" => params.q = value,
                other => unreachable!("unknown key {other}"),
            }
        }
        params
    }

    #[test]
    fn test_defaults() {
        let (filter, pagination) = params(&[]).parse().expect("defaults are valid");
        assert_eq!(filter, MessageFilter::default());
        assert_eq!(pagination.limit(), 50);
        assert_eq!(pagination.offset(), 0);
    }

    #[test]
    fn test_filters_are_parsed() {
        let (filter, pagination) = params(&[
            ("limit", "2"),
            ("offset", "4"),
            ("from", "+14155550100"),
            ("since", "2025-01-15T10:00:00Z"),
            ("q", "hello"),
        ])
        .parse()
        .expect("valid params");

        assert_eq!(pagination.limit(), 2);
        assert_eq!(pagination.offset(), 4);
        assert_eq!(filter.sender.as_deref(), Some("+14155550100"));
        assert_eq!(filter.since.as_ref().map(Timestamp::as_str), Some("2025-01-15T10:00:00.000000Z"));
        assert_eq!(filter.text_contains.as_deref(), Some("hello"));
    }

    #[test]
    fn test_empty_filters_are_ignored() {
        let (filter, _) = params(&[("from", ""), ("since", ""), ("q", "")]).parse().expect("valid params");
        assert_eq!(filter, MessageFilter::default());
    }

    #[test]
    fn test_out_of_range_is_rejected_not_clamped() {
        assert!(params(&[("limit", "0")]).parse().is_err());
        assert!(params(&[("limit", "101")]).parse().is_err());
        assert!(params(&[("offset", "-1")]).parse().is_err());
    }

    #[test]
    fn test_non_integers_are_rejected() {
        let err = params(&[("limit", "ten")]).parse().expect_err("must fail");
        assert_eq!(err, "limit must be an integer");
        assert!(params(&[("offset", "1.5")]).parse().is_err());
        assert!(params(&[("since", "last week")]).parse().is_err());
    }
}
