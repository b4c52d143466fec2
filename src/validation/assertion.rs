//! Composite validation of SAML Assertions.

use std::sync::Arc;

use chrono::Utc;

use crate::context::ValidationContext;
use crate::error::AssertionValidationError;
use crate::signature::{SignaturePrevalidator, SignatureTrustEngine};
use crate::types::Assertion;

use super::{checks, record, CheckResult, SignableObject, Validity};

/// Composite validator for SAML `Assertion` elements.
///
/// Runs the checks in a fixed order: ID, version, issue instant, issuer,
/// signature and conditions. When the context carries the issue instant of
/// the enclosing response, the assertion's issue instant is checked against
/// it instead of against the receive window.
pub struct AssertionValidator {
    trust_engine: Arc<dyn SignatureTrustEngine>,
    prevalidator: Arc<dyn SignaturePrevalidator>,
}

type Check = fn(&AssertionValidator, &Assertion, &ValidationContext) -> CheckResult;

impl AssertionValidator {
    const CHECKS: [Check; 6] = [
        Self::check_id,
        Self::check_version,
        Self::check_issue_instant,
        Self::check_issuer,
        Self::check_signature,
        Self::check_conditions,
    ];

    /// Creates a validator using the given signature collaborators.
    pub fn new(
        trust_engine: Arc<dyn SignatureTrustEngine>,
        prevalidator: Arc<dyn SignaturePrevalidator>,
    ) -> Self {
        Self {
            trust_engine,
            prevalidator,
        }
    }

    /// Validates an assertion, returning the overall verdict.
    ///
    /// Failure messages accumulate in `context` in check order. In strict
    /// mode the run stops at the first check that is not valid.
    pub fn validate(&self, assertion: &Assertion, context: &mut ValidationContext) -> Validity {
        tracing::debug!(id = %assertion.id, issuer = %assertion.issuer, "validating Assertion");
        let mut verdict = Validity::Valid;
        for check in Self::CHECKS {
            let result = check(self, assertion, context);
            verdict = record(context, verdict, result);
            if context.is_strict() && verdict != Validity::Valid {
                break;
            }
        }
        verdict
    }

    /// Validates an assertion, returning an error carrying the rejected
    /// assertion when the verdict is not valid.
    ///
    /// # Errors
    ///
    /// Returns an [`AssertionValidationError`] holding the verdict, the
    /// accumulated failure messages and the assertion itself.
    pub fn check(
        &self,
        assertion: &Assertion,
        context: &mut ValidationContext,
    ) -> Result<(), AssertionValidationError> {
        let verdict = self.validate(assertion, context);
        if verdict == Validity::Valid {
            Ok(())
        } else {
            Err(AssertionValidationError::new(
                verdict,
                context.failures().to_vec(),
                Assertion::object_name(),
                assertion.clone(),
            ))
        }
    }

    fn check_id(&self, assertion: &Assertion, _context: &ValidationContext) -> CheckResult {
        checks::check_id(assertion)
    }

    fn check_version(&self, assertion: &Assertion, _context: &ValidationContext) -> CheckResult {
        checks::check_version(assertion)
    }

    /// An assertion issued as part of a response may not be issued after
    /// the response itself. Standalone assertions fall back to the receive
    /// window check.
    fn check_issue_instant(
        &self,
        assertion: &Assertion,
        context: &ValidationContext,
    ) -> CheckResult {
        if let Some(response_instant) = context.response_issue_instant() {
            let skew = context.allowed_clock_skew();
            if assertion.issue_instant > response_instant + skew {
                return CheckResult::invalid(format!(
                    "Assertion issue instant ({}) is after the issue instant of the Response containing it ({response_instant})",
                    assertion.issue_instant
                ));
            }
            return CheckResult::Valid;
        }
        checks::check_freshness(assertion.issue_instant, Assertion::object_name(), context)
    }

    fn check_issuer(&self, assertion: &Assertion, context: &ValidationContext) -> CheckResult {
        checks::check_issuer(assertion, context)
    }

    fn check_signature(&self, assertion: &Assertion, context: &ValidationContext) -> CheckResult {
        checks::check_signature(
            assertion,
            self.trust_engine.as_ref(),
            self.prevalidator.as_ref(),
            context,
        )
    }

    /// The validity window of the Conditions element, when present, must
    /// cover the evaluation time, with the allowed clock skew applied at
    /// both ends. Without a receive instant the current time is used.
    fn check_conditions(&self, assertion: &Assertion, context: &ValidationContext) -> CheckResult {
        let Some(conditions) = assertion.conditions.as_ref() else {
            return CheckResult::Valid;
        };
        let now = context.receive_instant().unwrap_or_else(Utc::now);
        let skew = context.allowed_clock_skew();

        if let Some(not_before) = conditions.not_before {
            if now + skew < not_before {
                return CheckResult::invalid(format!(
                    "Assertion is not yet valid - Conditions.NotBefore: {not_before}, evaluation time: {now}"
                ));
            }
        }
        if let Some(not_on_or_after) = conditions.not_on_or_after {
            if now - skew >= not_on_or_after {
                return CheckResult::invalid(format!(
                    "Assertion has expired - Conditions.NotOnOrAfter: {not_on_or_after}, evaluation time: {now}"
                ));
            }
        }
        CheckResult::Valid
    }
}
