//! HTTP clients for the content platform and the decision engine.
//!
//! Thin clients only: query shape and authentication, no business logic.
//!
//! - [`GraphQlClient`] - Shared GraphQL transport
//! - [`GraphQlRedirectLookup`] - Fetches the authored redirect list
//! - [`GraphQlPersonalizeLookup`] - Fetches page personalization info
//! - [`HttpDecisionService`] - Per-execution variant decision calls

mod decision;
mod graphql;
mod personalize;
mod redirects;

pub use decision::HttpDecisionService;
pub use graphql::GraphQlClient;
pub use personalize::GraphQlPersonalizeLookup;
pub use redirects::GraphQlRedirectLookup;
