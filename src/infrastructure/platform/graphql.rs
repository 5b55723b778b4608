//! Shared GraphQL transport for content-platform queries.

use crate::domain::services::LookupError;
use serde_json::{Value, json};

/// Minimal GraphQL-over-HTTP client.
///
/// Posts `{query, variables}` to the platform endpoint with API-key
/// authentication and unwraps the `data` envelope. GraphQL-level errors are
/// surfaced as [`LookupError::Decode`].
#[derive(Clone)]
pub struct GraphQlClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GraphQlClient {
    pub fn new(http: reqwest::Client, endpoint: String, api_key: String) -> Self {
        Self {
            http,
            endpoint,
            api_key,
        }
    }

    /// Executes a query and returns the `data` payload.
    ///
    /// # Errors
    ///
    /// - [`LookupError::Request`] on transport failures or non-success status
    /// - [`LookupError::Decode`] on GraphQL errors or a missing `data` field
    pub async fn query(
        &self,
        service: &'static str,
        query: &str,
        variables: Value,
    ) -> Result<Value, LookupError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| LookupError::request(service, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::request(
                service,
                format!("platform returned {}", status),
            ));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| LookupError::decode(service, e.to_string()))?;

        if let Some(errors) = body.get("errors").and_then(Value::as_array)
            && !errors.is_empty()
        {
            return Err(LookupError::decode(
                service,
                format!("GraphQL errors: {}", Value::Array(errors.clone())),
            ));
        }

        body.get("data")
            .cloned()
            .ok_or_else(|| LookupError::decode(service, "response has no data field"))
    }
}
