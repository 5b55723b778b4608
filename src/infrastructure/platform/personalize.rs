//! GraphQL client for page personalization info.

use super::graphql::GraphQlClient;
use crate::domain::entities::PersonalizeInfo;
use crate::domain::services::{LookupError, PersonalizeLookup};
use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

const SERVICE: &str = "personalize-lookup";

const PERSONALIZE_QUERY: &str = r#"
query PersonalizeQuery($siteName: String!, $language: String!, $routePath: String!) {
  layout(site: $siteName, routePath: $routePath, language: $language) {
    item {
      personalization {
        variantIds
        executions {
          friendlyId
          variantIds
        }
      }
    }
  }
}
"#;

/// Fetches personalization info from the content platform's layout query.
pub struct GraphQlPersonalizeLookup {
    client: GraphQlClient,
}

impl GraphQlPersonalizeLookup {
    pub fn new(client: GraphQlClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PersonalizeLookup for GraphQlPersonalizeLookup {
    async fn get_personalize_info(
        &self,
        path: &str,
        locale: &str,
        site_name: &str,
    ) -> Result<Option<PersonalizeInfo>, LookupError> {
        let data = self
            .client
            .query(
                SERVICE,
                PERSONALIZE_QUERY,
                json!({
                    "siteName": site_name,
                    "language": locale,
                    "routePath": path,
                }),
            )
            .await?;

        metrics::counter!("remote_fetches_total", "lookup" => "personalize").increment(1);

        // An unknown route resolves to a null item rather than an error.
        let personalization = match data.pointer("/layout/item/personalization") {
            Some(Value::Null) | None => {
                debug!("No personalize info for {} ({}, {})", path, locale, site_name);
                return Ok(None);
            }
            Some(value) => value.clone(),
        };

        let info: PersonalizeInfo = serde_json::from_value(personalization)
            .map_err(|e| LookupError::decode(SERVICE, e.to_string()))?;

        debug!(
            "Fetched personalize info for {}: {} variants, {} executions",
            path,
            info.variant_ids.len(),
            info.executions.len()
        );
        Ok(Some(info))
    }
}
