//! Shared application state.

use crate::application::personalization::PersonalizeOrchestrator;
use crate::application::redirects::RedirectResolver;
use crate::config::SecretSource;
use crate::infrastructure::cache::CacheService;
use std::sync::Arc;

/// State shared by every handler and middleware layer.
///
/// Cloning is cheap: all heavy members sit behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<dyn CacheService>,
    pub redirects: Arc<RedirectResolver>,
    pub personalize: Arc<PersonalizeOrchestrator>,

    pub site_name: String,
    /// Lowercased locales the site serves.
    pub site_locales: Vec<String>,
    pub default_locale: String,

    pub expire_secret: String,
    pub secret_source: SecretSource,
}
