//! Composite validation of SAML Response messages.

use std::sync::Arc;

use crate::context::ValidationContext;
use crate::error::ResponseValidationError;
use crate::signature::{SignaturePrevalidator, SignatureTrustEngine};
use crate::types::Response;

use super::{checks, record, CheckResult, SignableObject, Validity};

/// Composite validator for SAML `Response` messages.
///
/// Runs the checks in a fixed order: ID, version, issue instant, issuer,
/// signature, destination and request correlation. The validator itself is
/// stateless; all per-message state lives in the [`ValidationContext`].
pub struct ResponseValidator {
    trust_engine: Arc<dyn SignatureTrustEngine>,
    prevalidator: Arc<dyn SignaturePrevalidator>,
}

type Check = fn(&ResponseValidator, &Response, &ValidationContext) -> CheckResult;

impl ResponseValidator {
    /// The checks, in invocation order. Later checks - the trust engine call
    /// in particular - are never invoked once a strict run has failed.
    const CHECKS: [Check; 7] = [
        Self::check_id,
        Self::check_version,
        Self::check_issue_instant,
        Self::check_issuer,
        Self::check_signature,
        Self::check_destination,
        Self::check_in_response_to,
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

    /// Validates a response, returning the overall verdict.
    ///
    /// Failure messages accumulate in `context` in check order. In strict
    /// mode the run stops at the first check that is not valid.
    pub fn validate(&self, response: &Response, context: &mut ValidationContext) -> Validity {
        tracing::debug!(id = %response.id, issuer = %response.issuer, "validating Response");
        let mut verdict = Validity::Valid;
        for check in Self::CHECKS {
            let result = check(self, response, context);
            verdict = record(context, verdict, result);
            if context.is_strict() && verdict != Validity::Valid {
                break;
            }
        }
        verdict
    }

    /// Validates a response, returning an error carrying the rejected
    /// response when the verdict is not valid.
    ///
    /// # Errors
    ///
    /// Returns a [`ResponseValidationError`] holding the verdict, the
    /// accumulated failure messages and the response itself.
    pub fn check(
        &self,
        response: &Response,
        context: &mut ValidationContext,
    ) -> Result<(), ResponseValidationError> {
        let verdict = self.validate(response, context);
        if verdict == Validity::Valid {
            Ok(())
        } else {
            Err(ResponseValidationError::new(
                verdict,
                context.failures().to_vec(),
                Response::object_name(),
                response.clone(),
            ))
        }
    }

    fn check_id(&self, response: &Response, _context: &ValidationContext) -> CheckResult {
        checks::check_id(response)
    }

    fn check_version(&self, response: &Response, _context: &ValidationContext) -> CheckResult {
        checks::check_version(response)
    }

    fn check_issue_instant(
        &self,
        response: &Response,
        context: &ValidationContext,
    ) -> CheckResult {
        checks::check_freshness(response.issue_instant, Response::object_name(), context)
    }

    fn check_issuer(&self, response: &Response, context: &ValidationContext) -> CheckResult {
        checks::check_issuer(response, context)
    }

    fn check_signature(&self, response: &Response, context: &ValidationContext) -> CheckResult {
        checks::check_signature(
            response,
            self.trust_engine.as_ref(),
            self.prevalidator.as_ref(),
            context,
        )
    }

    /// A Destination attribute, when present, must match the URL on which
    /// the response was received.
    fn check_destination(&self, response: &Response, context: &ValidationContext) -> CheckResult {
        let Some(destination) = response.destination.as_deref() else {
            return CheckResult::Valid;
        };
        let Some(receive_url) = context.receive_url() else {
            return CheckResult::soft_failure(
                context,
                "Could not evaluate Destination attribute of Response - no receive URL available",
            );
        };
        if destination == receive_url {
            CheckResult::Valid
        } else {
            CheckResult::invalid(format!(
                "Destination attribute ({destination}) of Response does not match the URL on which the response was received ({receive_url})"
            ))
        }
    }

    /// The InResponseTo attribute must match the ID of the request that the
    /// response answers.
    fn check_in_response_to(
        &self,
        response: &Response,
        context: &ValidationContext,
    ) -> CheckResult {
        let expected = context.authn_request_id();
        match (response.in_response_to.as_deref(), expected) {
            (Some(in_response_to), Some(expected)) => {
                if in_response_to == expected {
                    CheckResult::Valid
                } else {
                    CheckResult::invalid(format!(
                        "InResponseTo attribute ({in_response_to}) of Response does not match the ID of the AuthnRequest ({expected})"
                    ))
                }
            }
            (Some(in_response_to), None) => CheckResult::soft_failure(
                context,
                format!(
                    "Could not evaluate InResponseTo attribute ({in_response_to}) of Response - no AuthnRequest ID available"
                ),
            ),
            (None, Some(expected)) => CheckResult::invalid(format!(
                "Missing InResponseTo attribute in Response - expected ({expected})"
            )),
            (None, None) => CheckResult::Valid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrustEngineError;
    use crate::signature::{CriteriaSet, Signature};
    use crate::types::AuthnRequest;
    use chrono::{Duration, Utc};

    struct FixedTrust(Result<bool, TrustEngineError>);

    impl SignatureTrustEngine for FixedTrust {
        fn validate(
            &self,
            _signature: &Signature,
            _criteria: &CriteriaSet,
        ) -> Result<bool, TrustEngineError> {
            self.0.clone()
        }
    }

    struct AcceptAll;

    impl SignaturePrevalidator for AcceptAll {
        fn validate(&self, _signature: &Signature) -> Result<(), crate::error::SignatureProfileError> {
            Ok(())
        }
    }

    fn validator(trust: Result<bool, TrustEngineError>) -> ResponseValidator {
        ResponseValidator::new(Arc::new(FixedTrust(trust)), Arc::new(AcceptAll))
    }

    fn base_context(request: &AuthnRequest) -> ValidationContext {
        ValidationContext::builder()
            .expected_issuer("https://idp.example.com")
            .receive_instant(Utc::now())
            .receive_url("https://sp.example.com/acs")
            .authn_request_id(request.id.clone())
            .build()
    }

    fn signed_response(request: &AuthnRequest) -> Response {
        Response::success("https://idp.example.com")
            .in_response_to(request.id.clone())
            .with_destination("https://sp.example.com/acs")
            .with_signature(Signature::new("#_id"))
    }

    #[test]
    fn fully_valid_response() {
        let request = AuthnRequest::new("https://sp.example.com");
        let response = signed_response(&request);
        let mut context = base_context(&request);

        let verdict = validator(Ok(true)).validate(&response, &mut context);
        assert_eq!(verdict, Validity::Valid);
        assert!(context.failures().is_empty());
        assert!(validator(Ok(true)).check(&response, &mut base_context(&request)).is_ok());
    }

    #[test]
    fn untrusted_signature_is_invalid() {
        let request = AuthnRequest::new("https://sp.example.com");
        let response = signed_response(&request);
        let mut context = base_context(&request);

        let err = validator(Ok(false))
            .check(&response, &mut context)
            .unwrap_err();
        assert_eq!(err.validity(), Validity::Invalid);
        assert!(err.message().contains("invalid or not trusted"));
        assert_eq!(err.object().id, response.id);
    }

    #[test]
    fn trust_engine_failure_is_indeterminate() {
        let request = AuthnRequest::new("https://sp.example.com");
        let response = signed_response(&request);
        let mut context = base_context(&request);

        let verdict = validator(Err(TrustEngineError::Resolver("metadata down".to_string())))
            .validate(&response, &mut context);
        assert_eq!(verdict, Validity::Indeterminate);
    }

    #[test]
    fn lenient_run_aggregates_all_failures() {
        let request = AuthnRequest::new("https://sp.example.com");
        let mut response = signed_response(&request);
        response.version = "1.1".to_string();
        response.issuer = "https://evil.example.com".to_string();
        let mut context = base_context(&request);

        let verdict = validator(Ok(true)).validate(&response, &mut context);
        assert_eq!(verdict, Validity::Invalid);
        // Both the version and the issuer failure are reported, in order.
        assert_eq!(context.failures().len(), 2);
        assert!(context.failures()[0].contains("SAML version"));
        assert!(context.failures()[1].contains("Issuer"));
    }

    #[test]
    fn strict_run_stops_at_first_failure() {
        let request = AuthnRequest::new("https://sp.example.com");
        let mut response = signed_response(&request);
        response.version = "1.1".to_string();
        response.issuer = "https://evil.example.com".to_string();

        let mut context = ValidationContext::builder()
            .strict_validation(true)
            .expected_issuer("https://idp.example.com")
            .receive_instant(Utc::now())
            .receive_url("https://sp.example.com/acs")
            .authn_request_id(request.id.clone())
            .build();

        let verdict = validator(Ok(true)).validate(&response, &mut context);
        assert_eq!(verdict, Validity::Invalid);
        assert_eq!(context.failures().len(), 1);
        assert!(context.failures()[0].contains("SAML version"));
    }

    #[test]
    fn stale_response_is_invalid() {
        let request = AuthnRequest::new("https://sp.example.com");
        let response = signed_response(&request)
            .with_issue_instant(Utc::now() - Duration::minutes(10));
        let mut context = base_context(&request);

        let verdict = validator(Ok(true)).validate(&response, &mut context);
        assert_eq!(verdict, Validity::Invalid);
        assert!(context.failures()[0].contains("too old"));
    }

    #[test]
    fn destination_mismatch_is_invalid() {
        let request = AuthnRequest::new("https://sp.example.com");
        let response = signed_response(&request)
            .with_destination("https://elsewhere.example.com/acs");
        let mut context = base_context(&request);

        let verdict = validator(Ok(true)).validate(&response, &mut context);
        assert_eq!(verdict, Validity::Invalid);
    }

    #[test]
    fn correlation_mismatch_is_invalid() {
        let request = AuthnRequest::new("https://sp.example.com");
        let response = signed_response(&request).in_response_to("_someoneelse");
        let mut context = base_context(&request);

        let verdict = validator(Ok(true)).validate(&response, &mut context);
        assert_eq!(verdict, Validity::Invalid);
        assert!(context
            .failures()
            .iter()
            .any(|m| m.contains("InResponseTo")));
    }

    #[test]
    fn missing_correlation_id_is_soft() {
        let request = AuthnRequest::new("https://sp.example.com");
        let response = signed_response(&request);
        let mut context = ValidationContext::builder()
            .expected_issuer("https://idp.example.com")
            .receive_instant(Utc::now())
            .receive_url("https://sp.example.com/acs")
            .build();

        let verdict = validator(Ok(true)).validate(&response, &mut context);
        assert_eq!(verdict, Validity::Indeterminate);
    }

    #[test]
    fn correlation_id_from_request_object() {
        let request = AuthnRequest::new("https://sp.example.com");
        let response = signed_response(&request);
        let mut context = ValidationContext::builder()
            .expected_issuer("https://idp.example.com")
            .receive_instant(Utc::now())
            .receive_url("https://sp.example.com/acs")
            .authn_request(request)
            .build();

        let verdict = validator(Ok(true)).validate(&response, &mut context);
        assert_eq!(verdict, Validity::Valid);
    }
}
