//! Data Transfer Objects for API responses.

pub mod expire;
pub mod health;
