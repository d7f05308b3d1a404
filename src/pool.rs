//! Author identifier aggregation across venues.

use std::collections::{BTreeMap, BTreeSet};

use crate::directory::Directory;
use crate::error::CensusResult;

/// Deduplicated author identifiers, kept in lexicographic order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorPool {
    ids: BTreeSet<String>,
}

impl AuthorPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add identifiers; duplicates collapse. Returns how many were new.
    pub fn extend<I, S>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let before = self.ids.len();
        self.ids.extend(ids.into_iter().map(Into::into));
        self.ids.len() - before
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Identifiers in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn into_sorted(self) -> Vec<String> {
        self.ids.into_iter().collect()
    }
}

/// Counts from one pool collection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub venues: usize,
    pub submissions: usize,
    pub legacy_submissions: usize,
}

/// Walk every venue's submissions and gather their author identifiers.
///
/// Any fetch failure or author-field inconsistency aborts the pass.
pub fn collect_pool<D: Directory>(
    directory: &D,
    venues: &BTreeMap<String, String>,
) -> CensusResult<(AuthorPool, PoolStats)> {
    let mut pool = AuthorPool::new();
    let mut stats = PoolStats::default();

    for (year, invitation) in venues {
        let mut seen = 0usize;
        let mut added = 0usize;
        for note in directory.submissions(invitation) {
            let note = note?;
            let field = note.author_field()?;
            if field.is_legacy() {
                stats.legacy_submissions += 1;
            }
            added += pool.extend(field.identifiers());
            seen += 1;
        }
        tracing::info!(year = %year, invitation = %invitation, submissions = seen, new_authors = added, "collected venue");
        stats.venues += 1;
        stats.submissions += seen;
    }

    Ok((pool, stats))
}
