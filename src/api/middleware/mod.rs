//! HTTP middleware for request routing and protection.
//!
//! The content pipeline runs redirects first, then personalization, so a
//! server transfer lands on its target path before variants are identified.

pub mod personalize;
pub mod rate_limit;
pub mod redirects;
pub mod tracing;
