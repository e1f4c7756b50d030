//! Turning whatever the webhook returned into something displayable.
//!
//! The backend has no fixed schema.  A reply may arrive under one of several
//! field names, as an empty body, as plain text, or as an error object.
//! [`InboundResponse::parse`] classifies the body and [`normalize`] applies an
//! ordered list of [`ExtractorRule`]s to it.  The result is always a [`Reply`];
//! raw payloads are never shown to the user.

use serde_json::{Map, Value};

/// The placeholder a webhook returns when a job was accepted but has no content yet.
pub const WORKFLOW_STARTED: &str = "Workflow was started";

/// Maximum number of characters kept from a non-JSON text reply.
pub const RAW_TEXT_LIMIT: usize = 200;

/// A successful response body, classified.
#[derive(Clone, Debug, PartialEq)]
pub enum InboundResponse {
    /// The body was empty or whitespace.
    Empty,
    /// The body parsed as JSON.
    Json(Value),
    /// The body was not JSON; holds at most [`RAW_TEXT_LIMIT`] characters.
    Text(String),
}

impl InboundResponse {
    pub fn parse(body: &str) -> Self {
        if body.trim().is_empty() {
            return InboundResponse::Empty;
        }
        match serde_json::from_str::<Value>(body) {
            Ok(value) => InboundResponse::Json(value),
            Err(err) => {
                log::debug!("response is not JSON ({err}); using raw text");
                InboundResponse::Text(body.chars().take(RAW_TEXT_LIMIT).collect())
            }
        }
    }
}

/// What to render for a successful response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Reply text from the bot.
    Text(String),
    /// An error reported inside a successful response; rendered with a prefix.
    Error(String),
    /// The backend accepted the message but said nothing.
    Acknowledged,
    /// Nothing usable came back; the bot is presumably still working.
    StillWorking,
}

/// How a matched field is rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyKind {
    Text,
    Error,
}

/// Selects a reply from one field of a response object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtractorRule {
    pub field: &'static str,
    pub kind: ReplyKind,
    /// A value that does not count as a reply when found in this field.
    pub placeholder: Option<&'static str>,
}

impl ExtractorRule {
    pub const fn text(field: &'static str) -> Self {
        Self {
            field,
            kind: ReplyKind::Text,
            placeholder: None,
        }
    }

    pub const fn error(field: &'static str) -> Self {
        Self {
            field,
            kind: ReplyKind::Error,
            placeholder: None,
        }
    }

    pub const fn except(mut self, placeholder: &'static str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    /// Applies the rule to one response object.
    ///
    /// Only non-empty strings match.
    pub fn extract(&self, object: &Map<String, Value>) -> Option<Reply> {
        let value = object.get(self.field)?.as_str()?;
        if value.is_empty() || Some(value) == self.placeholder {
            return None;
        }
        Some(match self.kind {
            ReplyKind::Text => Reply::Text(value.to_string()),
            ReplyKind::Error => Reply::Error(value.to_string()),
        })
    }
}

/// The rules used by [`normalize`], highest priority first.
pub const DEFAULT_RULES: &[ExtractorRule] = &[
    ExtractorRule::text("output"),
    ExtractorRule::text("text"),
    ExtractorRule::text("result"),
    ExtractorRule::text("message").except(WORKFLOW_STARTED),
    ExtractorRule::error("error"),
];

/// Normalizes a response with [`DEFAULT_RULES`].
pub fn normalize(response: &InboundResponse) -> Reply {
    normalize_with(response, DEFAULT_RULES)
}

/// Normalizes a response with an explicit rule list.
///
/// A JSON array is judged by its first element.  Plain text is treated as if
/// it had arrived in the `message` field, so the placeholder exclusion still
/// applies to it.
pub fn normalize_with(response: &InboundResponse, rules: &[ExtractorRule]) -> Reply {
    match response {
        InboundResponse::Empty => Reply::Acknowledged,
        InboundResponse::Text(text) => {
            let mut object = Map::new();
            object.insert("message".to_string(), Value::String(text.clone()));
            apply_rules(&object, rules)
        }
        InboundResponse::Json(Value::Object(object)) => apply_rules(object, rules),
        InboundResponse::Json(Value::Array(items)) => match items.first() {
            Some(Value::Object(object)) => apply_rules(object, rules),
            _ => Reply::StillWorking,
        },
        InboundResponse::Json(other) => {
            log::debug!("unrecognized response shape: {other}");
            Reply::StillWorking
        }
    }
}

fn apply_rules(object: &Map<String, Value>, rules: &[ExtractorRule]) -> Reply {
    rules
        .iter()
        .find_map(|rule| rule.extract(object))
        .unwrap_or_else(|| {
            log::debug!("no reply field in response: {object:?}");
            Reply::StillWorking
        })
}
