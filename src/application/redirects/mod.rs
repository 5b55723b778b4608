//! Redirect matching engine and its cache-backed resolver.
//!
//! - [`pattern`] - Classification and compilation of authored patterns
//! - [`matcher`] - The matching algorithm (literal and regex branches)
//! - [`resolver`] - Cache-or-fetch of the rule list plus matcher invocation

pub mod matcher;
pub mod pattern;
pub mod resolver;

pub use matcher::{RedirectMatcher, normalize_request_url, split_locale};
pub use pattern::{PatternCache, compile_pattern, is_literal_url};
pub use resolver::RedirectResolver;
