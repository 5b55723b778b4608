//! Response envelope for the cache invalidation endpoint.

use serde::{Deserialize, Serialize};

/// Uniform JSON envelope for invalidation responses.
///
/// Errors use the same shape with `success: false` (see
/// [`crate::error::AppError`]).
#[derive(Debug, Serialize, Deserialize)]
pub struct ExpireResponse {
    pub success: bool,
    pub message: String,
}
