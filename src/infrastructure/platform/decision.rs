//! REST client for the personalization decision engine.

use crate::domain::services::{DecisionRequest, DecisionService, LookupError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const SERVICE: &str = "decision";

#[derive(Deserialize)]
struct DecisionResponse {
    #[serde(rename = "variantId")]
    variant_id: Option<String>,
}

/// Calls the decision engine's personalize endpoint, one call per experiment
/// execution. The configured timeout is applied per request.
pub struct HttpDecisionService {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpDecisionService {
    pub fn new(http: reqwest::Client, endpoint: String, api_key: String) -> Self {
        Self {
            http,
            endpoint,
            api_key,
        }
    }
}

#[async_trait]
impl DecisionService for HttpDecisionService {
    async fn decide(
        &self,
        request: &DecisionRequest,
        timeout: Duration,
    ) -> Result<Option<String>, LookupError> {
        let body = json!({
            "channel": request.channel,
            "currency": request.currency,
            "friendlyId": request.friendly_id,
            "params": request.params,
            "language": request.locale,
            "pageVariantIds": request.candidate_variant_ids,
            "geo": request.geo,
        });

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| LookupError::request(SERVICE, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::request(
                SERVICE,
                format!("decision engine returned {}", status),
            ));
        }

        let decision: DecisionResponse = response
            .json()
            .await
            .map_err(|e| LookupError::decode(SERVICE, e.to_string()))?;

        debug!(
            "Decision for {}: {:?}",
            request.friendly_id, decision.variant_id
        );
        Ok(decision.variant_id)
    }
}
