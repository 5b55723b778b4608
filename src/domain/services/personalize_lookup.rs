//! Contract for fetching page personalization info.

use crate::domain::entities::PersonalizeInfo;
use crate::domain::services::LookupError;
use async_trait::async_trait;

/// Fetches personalization configuration for a page from the content
/// platform.
///
/// # Implementations
///
/// - [`crate::infrastructure::platform::GraphQlPersonalizeLookup`] - GraphQL client
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PersonalizeLookup: Send + Sync {
    /// Fetches personalization info for the page at `path`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(info))` when the page exists and carries personalization data
    /// - `Ok(None)` when the platform has no entry for the page
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the platform is unreachable or returns an
    /// unexpected payload.
    async fn get_personalize_info(
        &self,
        path: &str,
        locale: &str,
        site_name: &str,
    ) -> Result<Option<PersonalizeInfo>, LookupError>;
}
