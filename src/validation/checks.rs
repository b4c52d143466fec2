//! Check implementations shared by the composite validators.

use chrono::{DateTime, Utc};

use crate::context::ValidationContext;
use crate::signature::{CriteriaSet, KeyUsage, SignaturePrevalidator, SignatureTrustEngine};
use crate::types::SAML_VERSION;

use super::{CheckResult, SignableObject};

/// The object must carry a non-empty ID attribute.
pub(super) fn check_id<S: SignableObject>(object: &S) -> CheckResult {
    if object.id().is_empty() {
        CheckResult::invalid(format!("Missing ID attribute in {}", S::object_name()))
    } else {
        CheckResult::Valid
    }
}

/// The object must declare SAML version 2.0.
pub(super) fn check_version<S: SignableObject>(object: &S) -> CheckResult {
    if object.version() == SAML_VERSION {
        CheckResult::Valid
    } else {
        CheckResult::invalid(format!("Invalid SAML version in {}", S::object_name()))
    }
}

/// The object's issue instant must lie within the accepted receive window.
///
/// The instant may not be older than the maximum message age (plus the
/// allowed clock skew) relative to the receive instant, and may not lie
/// further into the future than the allowed clock skew. Without a receive
/// instant the check cannot be evaluated.
pub(super) fn check_freshness(
    issue_instant: DateTime<Utc>,
    object_name: &str,
    context: &ValidationContext,
) -> CheckResult {
    let Some(receive_instant) = context.receive_instant() else {
        return CheckResult::soft_failure(
            context,
            format!(
                "Could not evaluate issue instant of {object_name} - no receive instant available"
            ),
        );
    };
    let skew = context.allowed_clock_skew();
    let max_age = context.max_age_received_message();

    if issue_instant < receive_instant - max_age - skew {
        return CheckResult::invalid(format!(
            "Received {object_name} is too old - issue-instant: {issue_instant}, receive time: {receive_instant}"
        ));
    }
    if issue_instant > receive_instant + skew {
        return CheckResult::invalid(format!(
            "Issue instant of {object_name} ({issue_instant}) is after the receive time ({receive_instant}) and exceeds the allowed clock skew"
        ));
    }
    CheckResult::Valid
}

/// The object must declare an issuer, matching the expected issuer from
/// the context.
///
/// With no expected issuer configured the comparison is skipped, but a
/// blank issuer still fails.
pub(super) fn check_issuer<S: SignableObject>(
    object: &S,
    context: &ValidationContext,
) -> CheckResult {
    if object.issuer().is_empty() {
        return CheckResult::invalid(format!("Missing Issuer element in {}", S::object_name()));
    }
    let Some(expected) = context.expected_issuer() else {
        tracing::warn!(
            object = S::object_name(),
            "no expected issuer set - issuer of the message will not be checked"
        );
        return CheckResult::Valid;
    };
    if object.issuer() == expected {
        CheckResult::Valid
    } else {
        CheckResult::invalid(format!(
            "Issuer of {} ({}) did not match expected issuer ({expected})",
            S::object_name(),
            object.issuer()
        ))
    }
}

/// The object's signature, if present or required, must validate.
///
/// An unsigned object passes unless the context requires a signature. A
/// present signature is first checked structurally by the prevalidator and
/// then evaluated by the trust engine, against the context's criteria set or
/// one derived from the object's issuer.
pub(super) fn check_signature<S: SignableObject>(
    object: &S,
    trust_engine: &dyn SignatureTrustEngine,
    prevalidator: &dyn SignaturePrevalidator,
    context: &ValidationContext,
) -> CheckResult {
    let Some(signature) = object.signature() else {
        if context.signature_required() {
            return CheckResult::invalid(format!(
                "{} is not signed, but signature validation is required",
                S::object_name()
            ));
        }
        tracing::debug!(
            object = S::object_name(),
            "object is not signed and no signature is required"
        );
        return CheckResult::Valid;
    };

    if let Err(defect) = prevalidator.validate(signature) {
        return CheckResult::invalid(format!(
            "Signature on {} does not conform to the signature profile: {defect}",
            S::object_name()
        ));
    }

    let derived;
    let criteria = match context.signature_validation_criteria() {
        Some(criteria) => criteria,
        None => {
            derived = CriteriaSet::new()
                .entity_id(object.issuer())
                .usage(KeyUsage::Signing);
            &derived
        }
    };

    match trust_engine.validate(signature, criteria) {
        Ok(true) => CheckResult::Valid,
        Ok(false) => CheckResult::invalid(format!(
            "Signature on {} is invalid or not trusted",
            S::object_name()
        )),
        Err(error) => CheckResult::indeterminate(format!(
            "Unable to evaluate trust of signature on {}: {error}",
            S::object_name()
        )),
    }
}
