//! Per-author output records.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::gender::{Categorization, GenderCategory};
use crate::profile::NameTriple;

/// One line of the output file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorRecord {
    pub first: Option<String>,
    pub middle: Option<String>,
    pub last: Option<String>,
    pub author_id: String,
    /// Declared gender verbatim, `null` when predicted.
    pub gender: Option<String>,
    pub gender_category: GenderCategory,
}

impl AuthorRecord {
    pub fn new(author_id: impl Into<String>, name: NameTriple, gender: Categorization) -> Self {
        Self {
            first: name.first,
            middle: name.middle,
            last: name.last,
            author_id: author_id.into(),
            gender: gender.declared,
            gender_category: gender.category,
        }
    }
}

/// Record counts per category tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTally {
    counts: BTreeMap<String, usize>,
}

impl CategoryTally {
    pub fn record(&mut self, category: &GenderCategory) {
        *self.counts.entry(category.to_string()).or_default() += 1;
    }

    pub fn get(&self, tag: &str) -> usize {
        self.counts.get(tag).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

impl<'a> FromIterator<&'a AuthorRecord> for CategoryTally {
    fn from_iter<I: IntoIterator<Item = &'a AuthorRecord>>(iter: I) -> Self {
        let mut tally = CategoryTally::default();
        for record in iter {
            tally.record(&record.gender_category);
        }
        tally
    }
}

impl fmt::Display for CategoryTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (tag, count) in &self.counts {
            writeln!(f, "  {tag:<20} {count}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn jo_doe() -> AuthorRecord {
        AuthorRecord::new(
            "a@x.com",
            NameTriple {
                first: Some("Jo".into()),
                middle: Some(String::new()),
                last: Some("Doe".into()),
            },
            Categorization {
                declared: Some("Female".into()),
                category: GenderCategory::Female,
            },
        )
    }

    #[test]
    fn serializes_flat_record() {
        let value = serde_json::to_value(jo_doe()).unwrap();
        assert_eq!(
            value,
            json!({
                "first": "Jo",
                "middle": "",
                "last": "Doe",
                "author_id": "a@x.com",
                "gender": "Female",
                "gender_category": "female"
            })
        );
    }

    #[test]
    fn predicted_record_has_null_gender() {
        let record = AuthorRecord::new(
            "~Alex_Roe1",
            NameTriple {
                first: Some("Alex".into()),
                ..Default::default()
            },
            Categorization {
                declared: None,
                category: GenderCategory::LowConfidence,
            },
        );
        let value = serde_json::to_value(record).unwrap();
        assert_eq!(value["gender"], serde_json::Value::Null);
        assert_eq!(value["middle"], serde_json::Value::Null);
        assert_eq!(value["gender_category"], "gz|low_conf");
    }

    #[test]
    fn tally_counts_by_tag() {
        let mut low = jo_doe();
        low.gender_category = GenderCategory::LowConfidence;
        let records = [jo_doe(), jo_doe(), low];
        let tally: CategoryTally = records.iter().collect();
        assert_eq!(tally.get("female"), 2);
        assert_eq!(tally.get("gz|low_conf"), 1);
        assert_eq!(tally.get("male"), 0);
        assert_eq!(tally.total(), 3);
        assert!(tally.to_string().contains("female"));
    }
}
