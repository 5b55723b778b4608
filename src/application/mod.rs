//! Application layer: matching and orchestration logic.
//!
//! - [`cached`] - Generic cache-or-fetch wrapper shared by both lookups
//! - [`redirects`] - URL normalization, pattern compilation, and the matching engine
//! - [`personalization`] - Decision fan-out and personalized path rewriting

pub mod cached;
pub mod personalization;
pub mod redirects;
