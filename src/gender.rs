//! Gender categorization.
//!
//! A profile's declared gender, when present and not blank, is mapped
//! through [`GENDER_MAP`] by exact literal match. Otherwise the first name
//! is sent to a [`GenderPredictor`] and the answer is kept only when its
//! probability clears the configured threshold.

use std::fmt;

use miette::Diagnostic;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::predict::{GenderPredictor, PredictError, Prediction};
use crate::profile::AuthorProfile;

#[derive(Debug, Error, Diagnostic)]
pub enum GenderError {
    #[error("unmapped declared gender: \"{value}\"")]
    #[diagnostic(
        code(census::gender::unmapped),
        help(
            "Every declared value must appear in the category table \
             (Male/male/M, Female/female, Non-Binary, Unspecified/Not Specified). \
             Extend the table rather than guessing a category."
        )
    )]
    Unmapped { value: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Predict(#[from] PredictError),
}

pub type GenderResult<T> = std::result::Result<T, GenderError>;

/// Canonical category assigned to an author.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GenderCategory {
    Male,
    Female,
    AllOtherGenders,
    /// Declared as unspecified. Never sent to the predictor.
    NeedsPrediction,
    /// Predicted with enough confidence; holds the service's raw label.
    Predicted(String),
    /// Predicted below the threshold, or the service had no label.
    LowConfidence,
}

impl fmt::Display for GenderCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenderCategory::Male => f.write_str("male"),
            GenderCategory::Female => f.write_str("female"),
            GenderCategory::AllOtherGenders => f.write_str("all_other_genders"),
            GenderCategory::NeedsPrediction => f.write_str("needs_prediction"),
            GenderCategory::Predicted(label) => write!(f, "gz|{label}"),
            GenderCategory::LowConfidence => f.write_str("gz|low_conf"),
        }
    }
}

impl Serialize for GenderCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Declared literals and the category each maps to. Matching is exact.
pub const GENDER_MAP: &[(&str, GenderCategory)] = &[
    ("Male", GenderCategory::Male),
    ("male", GenderCategory::Male),
    ("M", GenderCategory::Male),
    ("Female", GenderCategory::Female),
    ("female", GenderCategory::Female),
    ("Non-Binary", GenderCategory::AllOtherGenders),
    ("Unspecified", GenderCategory::NeedsPrediction),
    ("Not Specified", GenderCategory::NeedsPrediction),
];

/// Default minimum probability for trusting a predicted label.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.95;

/// Map a declared gender literal to its category.
pub fn categorize_declared(value: &str) -> GenderResult<GenderCategory> {
    GENDER_MAP
        .iter()
        .find(|(literal, _)| *literal == value)
        .map(|(_, category)| category.clone())
        .ok_or_else(|| GenderError::Unmapped {
            value: value.to_string(),
        })
}

/// Classify a prediction against `threshold`.
pub fn classify_prediction(prediction: &Prediction, threshold: f64) -> GenderCategory {
    match &prediction.gender {
        Some(label) if prediction.probability >= threshold => {
            GenderCategory::Predicted(label.clone())
        }
        _ => GenderCategory::LowConfidence,
    }
}

/// Outcome of categorizing one profile.
#[derive(Debug, Clone, PartialEq)]
pub struct Categorization {
    /// Declared gender verbatim, `None` on the prediction path.
    pub declared: Option<String>,
    pub category: GenderCategory,
}

/// Applies the declared-then-predicted decision procedure.
pub struct Categorizer<P> {
    predictor: P,
    threshold: f64,
}

impl<P: GenderPredictor> Categorizer<P> {
    pub fn new(predictor: P, threshold: f64) -> Self {
        Self {
            predictor,
            threshold,
        }
    }

    /// Categorize `profile`, predicting from `first_name` if nothing usable is declared.
    pub fn categorize(
        &self,
        profile: &AuthorProfile,
        first_name: Option<&str>,
    ) -> GenderResult<Categorization> {
        if let Some(declared) = profile.declared_gender() {
            let category = categorize_declared(declared)?;
            return Ok(Categorization {
                declared: Some(declared.to_string()),
                category,
            });
        }

        // A profile without a first name still asks the service, as `name=`.
        // genderize.io answers that with a null label (low confidence); a
        // rejection aborts the run like any other prediction failure.
        let name = first_name.unwrap_or_default();
        let prediction = self.predictor.predict(name)?;
        Ok(Categorization {
            declared: None,
            category: classify_prediction(&prediction, self.threshold),
        })
    }
}
