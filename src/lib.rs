//! # Content Edge
//!
//! Request-time edge middleware for a headless content platform: authored
//! redirects, per-visitor personalization rewrites, and a tag-addressable
//! runtime cache over the platform lookups that power both.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer
//! separation:
//!
//! - **Domain Layer** ([`domain`]) - Redirect and personalization entities
//!   plus the lookup/decision service traits
//! - **Application Layer** ([`application`]) - The matching engine, the
//!   personalization orchestrator, and the cache-or-fetch primitive
//! - **Infrastructure Layer** ([`infrastructure`]) - Cache backends and
//!   platform HTTP clients
//! - **API Layer** ([`api`]) - Request middleware, invalidation endpoint,
//!   and route composition
//!
//! ## Request Flow
//!
//! Every content request passes through two middleware layers before
//! reaching the origin: redirects (301/302 answers or in-place server
//! transfers) and personalization (variant identification and internal path
//! rewrite). Both feed from the runtime cache; the
//! `POST /api/expire-remote-cache` endpoint drops cached entries by tag
//! after a publish.
//!
//! ## Quick Start
//!
//! ```bash
//! # Set required environment variables
//! export EXPIRE_REMOTE_CACHE_SECRET="..."
//! export SITE_NAME="my-site"
//! export EDGE_ENDPOINT="https://edge.example.com/graphql"
//! export EDGE_API_KEY="..."
//! export DECISION_ENDPOINT="https://decide.example.com/v2"
//! export REDIS_URL="redis://localhost:6379"  # Optional
//!
//! # Start the service
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via
//! [`config::Config`]. See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod server;
pub mod state;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::personalization::{
        PersonalizeOrchestrator, PersonalizeOutcome, PersonalizeRequest, PersonalizeSettings,
        SkipReason,
    };
    pub use crate::application::redirects::{RedirectMatcher, RedirectResolver};
    pub use crate::domain::entities::{
        PersonalizeInfo, RedirectMatch, RedirectRule, RedirectType,
    };
    pub use crate::error::AppError;
    pub use crate::state::AppState;
}
