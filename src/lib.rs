// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # author-census
//!
//! Collects the authors of conference submissions from OpenReview and
//! assigns each a gender category, from the profile's declared gender or,
//! failing that, from a genderize.io prediction on the first name.
//!
//! ## Pipeline
//!
//! - **Fetch** (`directory`, `submission`): paginated submissions per venue,
//!   author fields resolved into [`submission::AuthorField`]
//! - **Aggregate** (`pool`): one sorted, deduplicated identifier set
//! - **Resolve** (`directory`): [`directory::ProfileLookup`] per identifier
//! - **Categorize** (`profile`, `gender`, `predict`): preferred name and
//!   [`gender::GenderCategory`]
//! - **Write** (`record`, `output`): JSON array of [`record::AuthorRecord`]
//!
//! ## Library usage
//!
//! ```no_run
//! use author_census::census::Census;
//! use author_census::config::CensusConfig;
//! use author_census::directory::OpenReviewClient;
//! use author_census::predict::GenderizeClient;
//!
//! let config = CensusConfig::default();
//! let directory = OpenReviewClient::new(&config.directory);
//! let predictor = GenderizeClient::new(&config.predictor);
//! let report = Census::new(config, directory, predictor).run().unwrap();
//! println!("{report}");
//! ```

pub mod census;
pub mod config;
pub mod directory;
pub mod error;
pub mod gender;
pub mod output;
pub mod pool;
pub mod predict;
pub mod profile;
pub mod record;
pub mod submission;
