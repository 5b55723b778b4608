//! HTTP layer: request middleware, API handlers, and route composition.
//!
//! # Modules
//!
//! - [`dto`] - Response serialization types
//! - [`handlers`] - API request handlers
//! - [`middleware`] - Redirect/personalization middleware and protection layers
//! - [`routes`] - Route configuration and layer ordering

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
