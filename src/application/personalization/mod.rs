//! Personalization orchestration.
//!
//! - [`rewrite`] - Personalized variant path construction
//! - [`service`] - Skip conditions, decision fan-out, and the rewrite outcome

pub mod rewrite;
pub mod service;

pub use rewrite::personalized_rewrite;
pub use service::{
    PersonalizeOrchestrator, PersonalizeOutcome, PersonalizeRequest, PersonalizeSettings,
    SkipReason,
};
