//! The census run: collect identifiers, resolve profiles, categorize, write.
//!
//! All run state lives in locals threaded between the stages. Any error
//! aborts before the output file is touched, so a failed run never leaves a
//! partial result behind.

use std::path::PathBuf;

use crate::config::CensusConfig;
use crate::directory::{Directory, ProfileLookup};
use crate::error::CensusResult;
use crate::gender::Categorizer;
use crate::output::write_records;
use crate::pool::{AuthorPool, PoolStats, collect_pool};
use crate::predict::GenderPredictor;
use crate::record::{AuthorRecord, CategoryTally};

const PROGRESS_EVERY: usize = 100;

/// Profiles resolved from a pool, in identifier order.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub records: Vec<AuthorRecord>,
    /// Identifiers with no profile, dropped from the output.
    pub not_found: Vec<String>,
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub pool: PoolStats,
    pub identifiers: usize,
    pub resolved: usize,
    pub not_found: usize,
    pub tally: CategoryTally,
    pub output: PathBuf,
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Venues: {}  Submissions: {} ({} legacy)",
            self.pool.venues, self.pool.submissions, self.pool.legacy_submissions
        )?;
        writeln!(
            f,
            "Authors: {} identifiers, {} resolved, {} without profile",
            self.identifiers, self.resolved, self.not_found
        )?;
        writeln!(f, "Categories ({} records):", self.tally.total())?;
        write!(f, "{}", self.tally)?;
        write!(f, "Output: {}", self.output.display())
    }
}

/// One census over a directory and a predictor.
pub struct Census<D, P> {
    config: CensusConfig,
    directory: D,
    categorizer: Categorizer<P>,
}

impl<D: Directory, P: GenderPredictor> Census<D, P> {
    pub fn new(config: CensusConfig, directory: D, predictor: P) -> Self {
        let categorizer = Categorizer::new(predictor, config.confidence_threshold);
        Self {
            config,
            directory,
            categorizer,
        }
    }

    /// Gather the identifier pool for every configured venue.
    pub fn collect_pool(&self) -> CensusResult<(AuthorPool, PoolStats)> {
        collect_pool(&self.directory, &self.config.venues)
    }

    /// Resolve and categorize every identifier, in sorted order.
    pub fn resolve(&self, pool: AuthorPool) -> CensusResult<Resolution> {
        let total = pool.len();
        let mut resolution = Resolution::default();

        for (i, author_id) in pool.into_sorted().into_iter().enumerate() {
            if (i + 1) % PROGRESS_EVERY == 0 {
                tracing::info!(done = i + 1, total, "resolving profiles");
            }

            let profile = match self.directory.profile(&author_id)? {
                ProfileLookup::Found(profile) => profile,
                ProfileLookup::NotFound => {
                    tracing::debug!(author_id = %author_id, "no profile, skipping");
                    resolution.not_found.push(author_id);
                    continue;
                }
            };

            let name = profile.preferred_name()?;
            let gender = self
                .categorizer
                .categorize(&profile, name.first.as_deref())?;
            tracing::info!(author_id = %author_id, category = %gender.category, "{}", gender.category);

            resolution
                .records
                .push(AuthorRecord::new(author_id, name, gender));
        }

        Ok(resolution)
    }

    /// Run every stage and write the output file.
    pub fn run(&self) -> CensusResult<RunReport> {
        let (pool, pool_stats) = self.collect_pool()?;
        let identifiers = pool.len();
        tracing::info!(identifiers, "author pool collected");

        let resolution = self.resolve(pool)?;
        write_records(&self.config.output, &resolution.records)?;

        Ok(RunReport {
            pool: pool_stats,
            identifiers,
            resolved: resolution.records.len(),
            not_found: resolution.not_found.len(),
            tally: resolution.records.iter().collect(),
            output: self.config.output.clone(),
        })
    }
}
