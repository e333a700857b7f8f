//! API client domain
//!
//! An API client is the routable identity embedded in every key's cleartext.
//! One client is created per issued key; it belongs to exactly one company.

mod entity;
mod validation;

pub use entity::{ApiClient, ApiClientId};
pub use validation::{validate_label, ApiClientValidationError};
