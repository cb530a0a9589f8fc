use crate::domain::message::{MAX_TEXT_CHARS, Message, Timestamp, TimestampError};
use serde::Deserialize;
use thiserror::Error;

/// Body of a webhook request as it arrives on the wire.
///
/// Every field is optional here so that a missing field is reported by name instead of
/// surfacing as a generic deserialization failure.
#[derive(Debug, Deserialize)]
struct WebhookPayload {
    message_id: Option<String>,
    from: Option<String>,
    to: Option<String>,
    ts: Option<String>,
    text: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("body is not a valid message object: {0}")]
    Malformed(String),
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
    #[error("{0} must be an E.164 number ('+' followed by digits)")]
    InvalidPhoneNumber(&'static str),
    #[error("ts must be an ISO-8601 timestamp")]
    InvalidTimestamp,
    #[error("ts must be in UTC")]
    NonUtcTimestamp,
    #[error("text must be at most {MAX_TEXT_CHARS} characters, got {0}")]
    TextTooLong(usize),
}

impl ValidationError {
    /// The wire name of the offending field, when a single field is at fault.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        match self {
            Self::Malformed(_) => None,
            Self::MissingField(field) | Self::EmptyField(field) | Self::InvalidPhoneNumber(field) => Some(field),
            Self::InvalidTimestamp | Self::NonUtcTimestamp => Some("ts"),
            Self::TextTooLong(_) => Some("text"),
        }
    }
}

/// Parses and validates a raw webhook body.
///
/// Checks run in field order (`message_id`, `from`, `to`, `ts`, `text`) and stop at the first
/// violation.
///
/// # Errors
/// Returns the first `ValidationError` encountered.
pub fn validate(raw_payload: &[u8]) -> Result<Message, ValidationError> {
    let payload: WebhookPayload =
        serde_json::from_slice(raw_payload).map_err(|e| ValidationError::Malformed(e.to_string()))?;

    let message_id = payload.message_id.ok_or(ValidationError::MissingField("message_id"))?;
    if message_id.is_empty() {
        return Err(ValidationError::EmptyField("message_id"));
    }

    let sender = require_e164(payload.from, "from")?;
    let recipient = require_e164(payload.to, "to")?;

    let ts = payload.ts.ok_or(ValidationError::MissingField("ts"))?;
    let timestamp = Timestamp::parse_utc(&ts).map_err(|e| match e {
        TimestampError::Malformed => ValidationError::InvalidTimestamp,
        TimestampError::NotUtc => ValidationError::NonUtcTimestamp,
    })?;

    if let Some(text) = &payload.text {
        let chars = text.chars().count();
        if chars > MAX_TEXT_CHARS {
            return Err(ValidationError::TextTooLong(chars));
        }
    }

    Ok(Message { message_id, sender, recipient, timestamp, text: payload.text })
}

fn require_e164(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    let value = value.ok_or(ValidationError::MissingField(field))?;
    if is_e164(&value) { Ok(value) } else { Err(ValidationError::InvalidPhoneNumber(field)) }
}

/// Returns true for `+` followed by one or more ASCII digits and nothing else.
#[must_use]
pub fn is_e164(value: &str) -> bool {
    value.strip_prefix('+').is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}
