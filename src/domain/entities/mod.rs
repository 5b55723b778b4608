//! Core domain entities representing the middleware data model.
//!
//! Entities are plain data structures without business logic. Everything here
//! is (de)serializable because rule lists and personalization info round-trip
//! through the runtime cache as JSON.
//!
//! # Entity Types
//!
//! - [`RedirectRule`] - An authored redirect definition fetched from the platform
//! - [`RedirectMatch`] - The immutable result of matching a rule against a request
//! - [`PersonalizeInfo`] - Personalization configuration for a page
//! - [`ExperienceParams`] / [`Geo`] - Visitor context forwarded to decision calls

pub mod personalize;
pub mod redirect;

pub use personalize::{ExperienceParams, Geo, PersonalizeExecution, PersonalizeInfo};
pub use redirect::{RedirectMatch, RedirectRule, RedirectType};
