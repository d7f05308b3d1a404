//! Author profiles and preferred-name selection.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ProfileError {
    #[error("profile {profile_id} has no names")]
    #[diagnostic(
        code(census::profile::empty_names),
        help("The directory guarantees at least one name per profile; this record is corrupt.")
    )]
    EmptyNames { profile_id: String },
}

pub type ProfileResult<T> = std::result::Result<T, ProfileError>;

/// One name variant on a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameEntry {
    #[serde(default)]
    pub first: Option<String>,
    #[serde(default)]
    pub middle: Option<String>,
    #[serde(default)]
    pub last: Option<String>,
    #[serde(default)]
    pub preferred: Option<bool>,
}

/// The chosen `(first, middle, last)` of an author, copied verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTriple {
    pub first: Option<String>,
    pub middle: Option<String>,
    pub last: Option<String>,
}

impl From<&NameEntry> for NameTriple {
    fn from(entry: &NameEntry) -> Self {
        Self {
            first: entry.first.clone(),
            middle: entry.middle.clone(),
            last: entry.last.clone(),
        }
    }
}

/// A directory profile, reduced to what the census reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthorProfile {
    pub id: String,
    pub names: Vec<NameEntry>,
    /// Declared gender, verbatim. May be blank.
    pub gender: Option<String>,
}

#[derive(Deserialize)]
struct RawProfile {
    #[serde(default)]
    id: String,
    #[serde(default)]
    content: RawContent,
}

#[derive(Default, Deserialize)]
struct RawContent {
    #[serde(default)]
    names: Vec<NameEntry>,
    #[serde(default)]
    gender: Option<Value>,
}

impl<'de> Deserialize<'de> for AuthorProfile {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawProfile::deserialize(deserializer)?;
        // Newer payloads wrap scalars as {"value": ...}; non-string genders are ignored.
        let gender = raw.content.gender.and_then(|v| match v {
            Value::String(s) => Some(s),
            Value::Object(mut map) => match map.remove("value") {
                Some(Value::String(s)) => Some(s),
                _ => None,
            },
            _ => None,
        });
        Ok(AuthorProfile {
            id: raw.id,
            names: raw.content.names,
            gender,
        })
    }
}

impl AuthorProfile {
    /// The first name entry flagged preferred, else the first entry.
    pub fn preferred_name(&self) -> ProfileResult<NameTriple> {
        self.names
            .iter()
            .find(|n| n.preferred == Some(true))
            .or_else(|| self.names.first())
            .map(NameTriple::from)
            .ok_or_else(|| ProfileError::EmptyNames {
                profile_id: self.id.clone(),
            })
    }

    /// The declared gender, if present and not blank.
    pub fn declared_gender(&self) -> Option<&str> {
        self.gender.as_deref().filter(|g| !g.trim().is_empty())
    }
}
