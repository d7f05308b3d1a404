//! Rich diagnostic error types for author-census.
//!
//! Each stage defines its own error type with miette `#[diagnostic]` derives;
//! [`CensusError`] wraps them so the binary can report any failure with its
//! code and help text intact.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;
use crate::directory::DirectoryError;
use crate::gender::GenderError;
use crate::output::OutputError;
use crate::predict::PredictError;
use crate::profile::ProfileError;
use crate::submission::SubmissionError;

/// Top-level error type. Every variant aborts the run.
#[derive(Debug, Error, Diagnostic)]
pub enum CensusError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Submission(#[from] SubmissionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Gender(#[from] GenderError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Output(#[from] OutputError),
}

impl From<PredictError> for CensusError {
    fn from(e: PredictError) -> Self {
        CensusError::Gender(GenderError::Predict(e))
    }
}

pub type CensusResult<T> = std::result::Result<T, CensusError>;
