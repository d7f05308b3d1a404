//! Submission notes and their author fields.
//!
//! OpenReview has stored authors two ways over the years. Early venues kept
//! a free-text `authors` string next to an `author_emails` string; later ones
//! keep parallel `authors`/`authorids` lists. [`Submission::author_field`]
//! decides which shape a note uses, once, at ingestion.

use miette::Diagnostic;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Broken invariants in submission content. Always fatal.
#[derive(Debug, Error, Diagnostic)]
pub enum SubmissionError {
    #[error("submission {note_id}: legacy string `authors` field alongside `authorids`")]
    #[diagnostic(
        code(census::submission::legacy_authorids),
        help(
            "A string-valued `authors` field marks the legacy format, which never carries \
             `authorids`. The venue data is inconsistent and cannot be interpreted safely."
        )
    )]
    LegacyAuthorIds { note_id: String },

    #[error("submission {note_id}: missing `{field}` field")]
    #[diagnostic(
        code(census::submission::missing_field),
        help("Check that the configured invitation points at a submission invitation.")
    )]
    MissingField { note_id: String, field: String },

    #[error("submission {note_id}: `{field}` is not {expected}")]
    #[diagnostic(
        code(census::submission::invalid_field),
        help("The note content does not match any known author layout.")
    )]
    InvalidField {
        note_id: String,
        field: String,
        expected: String,
    },
}

pub type SubmissionResult<T> = std::result::Result<T, SubmissionError>;

/// One submission note as returned by `/notes`.
#[derive(Debug, Clone, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub content: Map<String, Value>,
}

/// The author layout of a submission, resolved once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorField {
    /// `authors` was a single string; identifiers come from `author_emails`.
    Legacy { emails: String },
    /// `authors` was a list; identifiers come from `authorids` or `authors`.
    Listed { ids: Vec<String> },
}

impl AuthorField {
    /// Author identifiers carried by this field.
    ///
    /// The legacy layout yields exactly one pseudo-identifier: the raw
    /// `author_emails` string.
    pub fn identifiers(&self) -> Vec<String> {
        match self {
            AuthorField::Legacy { emails } => vec![emails.clone()],
            AuthorField::Listed { ids } => ids.clone(),
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, AuthorField::Legacy { .. })
    }
}

impl Submission {
    /// Build a submission from a note id and a content object.
    pub fn new(id: impl Into<String>, content: Value) -> Self {
        let content = match content {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            id: id.into(),
            content,
        }
    }

    /// Content value for `key`, with API v2 `{"value": ...}` wrappers removed.
    fn field(&self, key: &str) -> Option<&Value> {
        self.content.get(key).map(unwrap_value)
    }

    /// Resolve the author layout, checking the legacy-format invariant.
    pub fn author_field(&self) -> SubmissionResult<AuthorField> {
        match self.field("authors") {
            Some(Value::String(_)) => {
                if self.content.contains_key("authorids") {
                    return Err(SubmissionError::LegacyAuthorIds {
                        note_id: self.id.clone(),
                    });
                }
                match self.field("author_emails") {
                    Some(Value::String(emails)) => Ok(AuthorField::Legacy {
                        emails: emails.clone(),
                    }),
                    Some(_) => Err(self.invalid("author_emails", "a string")),
                    None => Err(self.missing("author_emails")),
                }
            }
            Some(Value::Array(authors)) => {
                let ids = match self.field("authorids") {
                    Some(Value::Array(ids)) => self.strings("authorids", ids)?,
                    Some(_) => return Err(self.invalid("authorids", "a list of strings")),
                    None => self.strings("authors", authors)?,
                };
                Ok(AuthorField::Listed { ids })
            }
            Some(_) => Err(self.invalid("authors", "a string or a list of strings")),
            None => Err(self.missing("authors")),
        }
    }

    fn strings(&self, field: &str, values: &[Value]) -> SubmissionResult<Vec<String>> {
        values
            .iter()
            .map(|v| match v {
                Value::String(s) => Ok(s.clone()),
                _ => Err(self.invalid(field, "a list of strings")),
            })
            .collect()
    }

    fn missing(&self, field: &str) -> SubmissionError {
        SubmissionError::MissingField {
            note_id: self.id.clone(),
            field: field.into(),
        }
    }

    fn invalid(&self, field: &str, expected: &str) -> SubmissionError {
        SubmissionError::InvalidField {
            note_id: self.id.clone(),
            field: field.into(),
            expected: expected.into(),
        }
    }
}

fn unwrap_value(v: &Value) -> &Value {
    match v {
        Value::Object(map) if map.len() == 1 && map.contains_key("value") => &map["value"],
        other => other,
    }
}
