//! Trait definitions for the middleware's external collaborators.
//!
//! These traits abstract the content platform's lookup APIs and the
//! personalization decision engine. Concrete HTTP implementations live in
//! `crate::infrastructure::platform`; mock implementations are auto-generated
//! via `mockall` for unit tests.
//!
//! # Available Contracts
//!
//! - [`RedirectLookup`] - Fetches the authored redirect list for a site
//! - [`PersonalizeLookup`] - Fetches personalization info for a page
//! - [`DecisionService`] - Resolves a variant for one experiment execution

pub mod decision;
pub mod personalize_lookup;
pub mod redirect_lookup;

pub use decision::{DecisionRequest, DecisionService};
pub use personalize_lookup::PersonalizeLookup;
pub use redirect_lookup::RedirectLookup;

#[cfg(test)]
pub use decision::MockDecisionService;
#[cfg(test)]
pub use personalize_lookup::MockPersonalizeLookup;
#[cfg(test)]
pub use redirect_lookup::MockRedirectLookup;

/// Errors surfaced by remote collaborators.
///
/// Lookup failures are fatal to the current lookup only: callers log them and
/// fall back to a pass-through response, never an error page.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("request to {service} failed: {message}")]
    Request { service: &'static str, message: String },

    #[error("unexpected {service} response: {message}")]
    Decode { service: &'static str, message: String },
}

impl LookupError {
    pub fn request(service: &'static str, message: impl Into<String>) -> Self {
        Self::Request {
            service,
            message: message.into(),
        }
    }

    pub fn decode(service: &'static str, message: impl Into<String>) -> Self {
        Self::Decode {
            service,
            message: message.into(),
        }
    }
}
