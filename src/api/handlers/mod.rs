//! HTTP request handlers.

pub mod expire_cache;
pub mod health;

pub use expire_cache::{expire_cache_handler, method_not_allowed_handler};
pub use health::health_handler;
