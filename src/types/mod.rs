//! SAML 2.0 types and data structures.
//!
//! Typed SAML objects as produced by an external XML layer. This crate
//! consumes them as inputs to validation; parsing, marshalling and DOM
//! binding are out of scope.

mod assertion;
mod authn_request;
mod constants;
mod metadata;
mod response;
mod status;

pub use assertion::*;
pub use authn_request::*;
pub use constants::*;
pub use metadata::*;
pub use response::*;
pub use status::*;
