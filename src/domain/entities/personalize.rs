//! Personalization entities fetched from the content platform and the visitor
//! context forwarded to decision calls.

use serde::{Deserialize, Serialize};

/// Personalization configuration for a single path/locale/site combination.
///
/// Read-only once fetched; cached as a complete snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizeInfo {
    /// All variant IDs configured for the page, in authored order.
    pub variant_ids: Vec<String>,
    /// One execution per personalization experiment on the page.
    #[serde(default)]
    pub executions: Vec<PersonalizeExecution>,
}

impl PersonalizeInfo {
    /// Returns true when the page has no personalization configured.
    pub fn is_empty(&self) -> bool {
        self.variant_ids.is_empty()
    }
}

/// A single experiment to evaluate for the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizeExecution {
    /// Human-readable experiment identifier.
    pub friendly_id: String,
    /// Candidate variants for this execution. A decision identifying a
    /// variant outside this set is discarded.
    pub variant_ids: Vec<String>,
}

/// UTM parameters and referer extracted from the incoming request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,
}

/// Visitor geo context, typically forwarded by the fronting CDN.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}
