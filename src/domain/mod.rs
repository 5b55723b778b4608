//! Domain layer containing the middleware's data model and collaborator contracts.
//!
//! This module defines the entities exchanged with the content platform and the
//! trait contracts for every external collaborator, independent of infrastructure
//! concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Redirect rules, personalization info, and request context data
//! - [`services`] - Trait definitions for remote lookups and decision calls
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure or presentation layers
//! - Collaborator traits define contracts implemented by the infrastructure layer
//! - Matching and orchestration logic lives in [`crate::application`]

pub mod entities;
pub mod services;
