//! GraphQL client for the authored redirect list.

use super::graphql::GraphQlClient;
use crate::domain::entities::RedirectRule;
use crate::domain::services::{LookupError, RedirectLookup};
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

const SERVICE: &str = "redirect-lookup";

const REDIRECTS_QUERY: &str = r#"
query RedirectsQuery($siteName: String!) {
  site {
    siteInfo(site: $siteName) {
      redirects {
        pattern
        target
        redirectType
        isQueryStringPreserved
        locale
      }
    }
  }
}
"#;

/// Fetches the redirect rule list from the content platform's site query.
pub struct GraphQlRedirectLookup {
    client: GraphQlClient,
}

impl GraphQlRedirectLookup {
    pub fn new(client: GraphQlClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RedirectLookup for GraphQlRedirectLookup {
    async fn fetch_redirects(&self, site_name: &str) -> Result<Vec<RedirectRule>, LookupError> {
        let data = self
            .client
            .query(SERVICE, REDIRECTS_QUERY, json!({ "siteName": site_name }))
            .await?;

        let redirects = data
            .pointer("/site/siteInfo/redirects")
            .cloned()
            .ok_or_else(|| LookupError::decode(SERVICE, "response has no redirects field"))?;

        let rules: Vec<RedirectRule> = serde_json::from_value(redirects)
            .map_err(|e| LookupError::decode(SERVICE, e.to_string()))?;

        debug!("Fetched {} redirect rules for site {}", rules.len(), site_name);
        metrics::counter!("remote_fetches_total", "lookup" => "redirects").increment(1);
        Ok(rules)
    }
}
