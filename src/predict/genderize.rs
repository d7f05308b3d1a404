//! genderize.io client.
//!
//! One blocking `GET /?name=<first>` per call. No batching and no retries:
//! a failed or throttled request aborts the run.

use std::time::Duration;

use super::{GenderPredictor, PredictError, PredictResult, Prediction};
use crate::config::PredictorConfig;

/// Blocking client for the genderize.io single-name endpoint.
pub struct GenderizeClient {
    base_url: String,
    api_key: Option<String>,
    http: ureq::Agent,
}

impl GenderizeClient {
    pub fn new(config: &PredictorConfig) -> Self {
        let http = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            http,
        }
    }

    /// Query pairs sent for `first_name`.
    fn query_pairs<'a>(&'a self, first_name: &'a str) -> Vec<(&'static str, &'a str)> {
        let mut pairs = vec![("name", first_name)];
        if let Some(key) = &self.api_key {
            pairs.push(("apikey", key.as_str()));
        }
        pairs
    }
}

impl GenderPredictor for GenderizeClient {
    fn predict(&self, first_name: &str) -> PredictResult<Prediction> {
        let url = format!("{}/", self.base_url);
        let request = self
            .query_pairs(first_name)
            .into_iter()
            .fold(self.http.get(&url), |req, (k, v)| req.query(k, v));

        let body = match request.call() {
            Ok(resp) => resp.into_string().map_err(|e| PredictError::Decode {
                message: e.to_string(),
            })?,
            Err(ureq::Error::Status(status, resp)) => {
                let message = resp.into_string().unwrap_or_default();
                return Err(PredictError::Status { status, message });
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(PredictError::Request {
                    message: transport.to_string(),
                });
            }
        };

        let prediction = decode_prediction(&body)?;
        tracing::debug!(
            name = first_name,
            gender = prediction.gender.as_deref().unwrap_or("-"),
            probability = prediction.probability,
            samples = prediction.count,
            "genderize prediction"
        );
        Ok(prediction)
    }
}

/// Decode a genderize.io response body.
pub fn decode_prediction(body: &str) -> PredictResult<Prediction> {
    serde_json::from_str(body).map_err(|e| PredictError::Decode {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_confident_prediction() {
        let p = decode_prediction(
            r#"{"count":1125,"name":"Alex","gender":"male","probability":0.97}"#,
        )
        .unwrap();
        assert_eq!(p.gender.as_deref(), Some("male"));
        assert_eq!(p.probability, 0.97);
        assert_eq!(p.count, 1125);
    }

    #[test]
    fn decodes_unknown_name() {
        let p = decode_prediction(r#"{"count":0,"name":"Zqx","gender":null,"probability":0.0}"#)
            .unwrap();
        assert_eq!(p.gender, None);
        assert_eq!(p.probability, 0.0);
    }

    #[test]
    fn rejects_non_json() {
        assert!(matches!(
            decode_prediction("<html>").unwrap_err(),
            PredictError::Decode { .. }
        ));
    }

    #[test]
    fn api_key_is_sent_only_when_configured() {
        let anonymous = GenderizeClient::new(&PredictorConfig::default());
        assert_eq!(anonymous.query_pairs("Alex"), vec![("name", "Alex")]);

        let keyed = GenderizeClient::new(&PredictorConfig {
            api_key: Some("k3y".into()),
            ..Default::default()
        });
        assert_eq!(
            keyed.query_pairs("Alex"),
            vec![("name", "Alex"), ("apikey", "k3y")]
        );
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = GenderizeClient::new(&PredictorConfig {
            base_url: "https://api.genderize.io/".into(),
            ..Default::default()
        });
        assert_eq!(client.base_url, "https://api.genderize.io");
    }
}
