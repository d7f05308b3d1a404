//! Name-based gender prediction.
//!
//! The census consults a predictor only when a profile declares no usable
//! gender. [`GenderPredictor`] is the seam; [`GenderizeClient`] is the
//! genderize.io implementation used by the binary.

pub mod genderize;

use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;

pub use genderize::GenderizeClient;

/// Errors from the prediction service. All are fatal for the run.
#[derive(Debug, Error, Diagnostic)]
pub enum PredictError {
    #[error("gender prediction request failed: {message}")]
    #[diagnostic(
        code(census::predict::request),
        help("Check network access to the prediction service (predictor.base_url).")
    )]
    Request { message: String },

    #[error("gender prediction service returned HTTP {status}: {message}")]
    #[diagnostic(
        code(census::predict::status),
        help(
            "HTTP 429 means the daily quota is exhausted; set predictor.api_key \
             or rerun tomorrow."
        )
    )]
    Status { status: u16, message: String },

    #[error("failed to decode gender prediction: {message}")]
    #[diagnostic(
        code(census::predict::decode),
        help("The service answered with an unexpected payload.")
    )]
    Decode { message: String },
}

pub type PredictResult<T> = std::result::Result<T, PredictError>;

/// A single-name prediction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Prediction {
    #[serde(default)]
    pub name: String,
    /// Predicted label, `None` when the service has no data for the name.
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub probability: f64,
    /// Number of samples behind the prediction.
    #[serde(default)]
    pub count: u64,
}

impl Prediction {
    pub fn new(name: &str, gender: Option<&str>, probability: f64) -> Self {
        Self {
            name: name.to_string(),
            gender: gender.map(str::to_string),
            probability,
            count: 0,
        }
    }
}

/// Predicts a gender label from a first name.
pub trait GenderPredictor {
    fn predict(&self, first_name: &str) -> PredictResult<Prediction>;
}

impl<P: GenderPredictor + ?Sized> GenderPredictor for &P {
    fn predict(&self, first_name: &str) -> PredictResult<Prediction> {
        (**self).predict(first_name)
    }
}
