//! Contract for fetching the authored redirect list.

use crate::domain::entities::RedirectRule;
use crate::domain::services::LookupError;
use async_trait::async_trait;

/// Fetches the complete redirect rule list for a site from the content
/// platform.
///
/// The returned list is an ordered snapshot: rule order is a tie-break rule
/// during matching and must be preserved.
///
/// # Implementations
///
/// - [`crate::infrastructure::platform::GraphQlRedirectLookup`] - GraphQL client
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RedirectLookup: Send + Sync {
    /// Fetches all redirect rules authored for `site_name`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] when the platform is unreachable or returns an
    /// unexpected payload. Callers treat this as fatal to the current lookup
    /// and pass the request through.
    async fn fetch_redirects(&self, site_name: &str) -> Result<Vec<RedirectRule>, LookupError>;
}
