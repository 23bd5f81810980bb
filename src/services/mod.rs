//! Service layer
//!
//! Business logic sitting between the store and the HTTP handlers.

pub mod organisation;

pub use organisation::OrganisationService;
