//! Contract for the personalization decision engine.

use crate::domain::entities::{ExperienceParams, Geo};
use crate::domain::services::LookupError;
use async_trait::async_trait;
use std::time::Duration;

/// One decision call: everything the engine needs to resolve a variant for a
/// single experiment execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionRequest {
    pub channel: String,
    pub currency: String,
    /// Human-readable experiment identifier.
    pub friendly_id: String,
    pub params: ExperienceParams,
    pub locale: String,
    /// Candidate variants declared by the execution. The engine may only
    /// identify one of these; anything else is discarded by the caller.
    pub candidate_variant_ids: Vec<String>,
    pub geo: Option<Geo>,
}

/// Resolves personalization variants for individual experiment executions.
///
/// Calls are issued concurrently by the orchestrator, one per execution, each
/// bounded by `timeout`. A timed-out or failed call degrades to "no variant
/// identified" for that execution only.
///
/// # Implementations
///
/// - [`crate::infrastructure::platform::HttpDecisionService`] - REST client
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DecisionService: Send + Sync {
    /// Asks the engine which variant (if any) applies to the visitor.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(variant_id))` when the engine identified a variant
    /// - `Ok(None)` when no variant applies
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] on transport or payload errors; the caller
    /// treats both the error and an elapsed `timeout` as `None`.
    async fn decide(
        &self,
        request: &DecisionRequest,
        timeout: Duration,
    ) -> Result<Option<String>, LookupError>;
}
