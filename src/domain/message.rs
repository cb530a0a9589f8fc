use serde::Serialize;
use std::fmt;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

pub const MAX_TEXT_CHARS: usize = 4096;
pub const DEFAULT_PAGE_LIMIT: i64 = 50;
pub const MAX_PAGE_LIMIT: i64 = 100;
pub const TOP_SENDERS_LIMIT: i64 = 10;

/// A UTC instant kept in its canonical storage form.
///
/// The canonical form is fixed-width (`YYYY-MM-DDTHH:MM:SS.ffffffZ`), so comparing two
/// timestamps as text gives the same answer as comparing them as instants.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Timestamp(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampError {
    Malformed,
    NotUtc,
}

impl Timestamp {
    /// Parses an RFC 3339 instant that must already be in UTC (`Z` or `+00:00`).
    ///
    /// # Errors
    /// Returns `TimestampError::Malformed` if the value is not RFC 3339 and
    /// `TimestampError::NotUtc` if it carries a non-zero offset.
    pub fn parse_utc(value: &str) -> Result<Self, TimestampError> {
        let parsed = OffsetDateTime::parse(value, &Rfc3339).map_err(|_| TimestampError::Malformed)?;
        if parsed.offset() != UtcOffset::UTC {
            return Err(TimestampError::NotUtc);
        }
        Self::from_datetime(parsed)
    }

    /// Parses an RFC 3339 instant with any offset and normalizes it to UTC.
    ///
    /// # Errors
    /// Returns `TimestampError::Malformed` if the value is not RFC 3339 or its UTC equivalent
    /// falls outside the representable date range.
    pub fn parse_normalized(value: &str) -> Result<Self, TimestampError> {
        let parsed = OffsetDateTime::parse(value, &Rfc3339).map_err(|_| TimestampError::Malformed)?;
        let utc = parsed.checked_to_offset(UtcOffset::UTC).ok_or(TimestampError::Malformed)?;
        Self::from_datetime(utc)
    }

    #[must_use]
    pub fn now() -> Self {
        // Formatting only fails for components the description cannot render. Every field here is
        // numeric and the current year is within 0..=9999, so the fallback is unreachable.
        Self::from_datetime(OffsetDateTime::now_utc()).unwrap_or_else(|_| Self(String::new()))
    }

    /// Wraps a value read back from storage, where it was written in canonical form.
    pub(crate) const fn from_canonical(value: String) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_datetime(dt: OffsetDateTime) -> Result<Self, TimestampError> {
        let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z");
        dt.format(format).map(Self).map_err(|_| TimestampError::Malformed)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated inbound message. Only `validation::validate` and the store build these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub(crate) message_id: String,
    pub(crate) sender: String,
    pub(crate) recipient: String,
    pub(crate) timestamp: Timestamp,
    pub(crate) text: Option<String>,
}

impl Message {
    #[must_use]
    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    #[must_use]
    pub fn sender(&self) -> &str {
        &self.sender
    }

    #[must_use]
    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    #[must_use]
    pub const fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Created,
    AlreadyExists,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageFilter {
    pub sender: Option<String>,
    pub since: Option<Timestamp>,
    pub text_contains: Option<String>,
}

/// A window over the ordered result set. Only in-range values can be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    limit: i64,
    offset: i64,
}

impl Pagination {
    /// Builds a window, rejecting a limit outside `1..=100` or a negative offset.
    ///
    /// # Errors
    /// Returns a description of the violated bound.
    pub fn new(limit: i64, offset: i64) -> Result<Self, String> {
        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(format!("limit must be between 1 and {MAX_PAGE_LIMIT}"));
        }
        if offset < 0 {
            return Err("offset must be greater than or equal to 0".into());
        }
        Ok(Self { limit, offset })
    }

    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.limit
    }

    #[must_use]
    pub const fn offset(&self) -> i64 {
        self.offset
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self { limit: DEFAULT_PAGE_LIMIT, offset: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePage {
    pub messages: Vec<Message>,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderCount {
    pub sender: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageStats {
    pub total_messages: i64,
    pub distinct_senders: i64,
    pub top_senders: Vec<SenderCount>,
    pub first_timestamp: Option<Timestamp>,
    pub last_timestamp: Option<Timestamp>,
}
