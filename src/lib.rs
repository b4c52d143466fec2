//! SAML 2.0 Response and Assertion validation.
//!
//! This crate validates inbound SAML 2.0 protocol messages against a set of
//! trust and freshness rules, and authorizes scoped identity attributes
//! against IdP-declared scope extensions:
//!
//! - **Response/Assertion validation** - composite validators running a fixed,
//!   ordered list of checks (ID, version, freshness, issuer, signature trust,
//!   destination, request correlation) with strict or aggregating semantics
//! - **Scope matching** - authorization of `local@domain` attribute values
//!   against literal and regular-expression scope declarations from metadata
//! - **Replay checking** - detection of re-submitted message IDs
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`types`] - Typed SAML objects (responses, assertions, metadata) as
//!   produced by an external XML layer
//! - [`context`] - The per-message [`ValidationContext`] parameter carrier
//! - [`validation`] - Individual checks and the composite validators
//! - [`signature`] - Contracts for the external signature trust engine
//! - [`scope`] - Scoped attribute authorization
//! - [`replay`] - Message replay checking
//! - [`error`] - Error types for validation outcomes
//!
//! # Example
//!
//! ```rust,ignore
//! use saml2_validation::{ResponseValidator, ValidationContext};
//!
//! let validator = ResponseValidator::new(trust_engine, prevalidator);
//! let mut context = ValidationContext::builder()
//!     .expected_issuer("https://idp.example.com")
//!     .receive_url("https://sp.example.com/acs")
//!     .build();
//! validator.check(&response, &mut context)?;
//! ```
//!
//! Validation is stateless: validators borrow themselves immutably and write
//! only into the per-call context, so any number of messages may be validated
//! concurrently against shared trust collaborators.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod context;
pub mod error;
pub mod replay;
pub mod scope;
pub mod signature;
pub mod types;
pub mod validation;

pub use context::{ValidationContext, ValidationContextBuilder};
pub use error::{
    AssertionValidationError, MessageReplayError, MetadataError, ResponseValidationError,
    SignatureProfileError, TrustEngineError, ValidationError, ValidationResultError,
};
pub use validation::{AssertionValidator, CheckResult, ResponseValidator, Validity};
