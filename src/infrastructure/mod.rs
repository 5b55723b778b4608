//! Infrastructure layer: cache backends and content-platform clients.
//!
//! Implements the domain contracts against concrete technology:
//!
//! - [`cache`] - Runtime cache backends (Redis, in-memory, no-op)
//! - [`platform`] - HTTP/GraphQL clients for the content platform

pub mod cache;
pub mod platform;
