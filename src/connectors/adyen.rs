//! Adyen classic Hosted Payment Pages gateway.
//!
//! Adyen HPP is an off-site gateway: no request is sent from the merchant
//! backend. The purchase call only assembles and signs the redirect fields;
//! the shopper's browser performs the actual POST.

pub mod transformers;

use base64::Engine;
use error_stack::ResultExt;
use secrecy::ExposeSecret;

use crate::{
    consts,
    crypto::{self, VerifySignature},
    errors::{CustomResult, ValidationError},
};
use transformers as adyen;

// Hosted Payment Pages (single). The multi-page flow lives at
// `hpp/select.shtml` and is not wired up here.
const ADYEN_HPP_TEST_ENDPOINT: &str = "https://test.adyen.com/hpp/pay.shtml";
const ADYEN_HPP_LIVE_ENDPOINT: &str = "https://live.adyen.com/hpp/pay.shtml";

/// The Adyen HPP gateway value.
///
/// Holds the skin configuration and produces one redirect instruction per
/// purchase. Builds are pure; callers must not mutate a shared configuration
/// concurrently with an in-flight build.
#[derive(Clone, Debug, Default)]
pub struct Adyen {
    config: adyen::AdyenConfig,
}

impl Adyen {
    /// Create a gateway from a skin configuration.
    pub fn new(config: adyen::AdyenConfig) -> Self {
        Self { config }
    }

    /// Connector identifier.
    pub fn id(&self) -> &'static str {
        "adyen"
    }

    /// Skin configuration this gateway was created with.
    pub fn config(&self) -> &adyen::AdyenConfig {
        &self.config
    }

    fn base_url(&self) -> &'static str {
        if self.config.test_mode {
            ADYEN_HPP_TEST_ENDPOINT
        } else {
            ADYEN_HPP_LIVE_ENDPOINT
        }
    }

    /// Assemble and sign the redirect fields for one purchase.
    ///
    /// Validation of the required inputs (`secret`, `amount`) happens before
    /// any signature computation.
    pub fn purchase(
        &self,
        request: &adyen::AdyenPurchaseRequest,
    ) -> CustomResult<adyen::AdyenPurchaseResponse, ValidationError> {
        let session = adyen::AdyenPaymentSession::try_from((&self.config, request))?;
        tracing::debug!(
            merchant_reference = %session.merchant_reference,
            payment_amount = %session.payment_amount,
            currency = %session.currency_code,
            "built hpp payment session"
        );
        Ok(adyen::AdyenPurchaseResponse::new(
            self.base_url(),
            session.form_fields(),
        ))
    }

    /// Verify the `merchantSig` Adyen attached to the result redirect.
    ///
    /// Returns `Ok(false)` on a signature mismatch; callers must treat that
    /// as an authentication failure, never as a soft error.
    pub fn verify_callback(
        &self,
        fields: &adyen::AdyenCallbackFields,
    ) -> CustomResult<bool, ValidationError> {
        let secret =
            self.config
                .secret
                .as_ref()
                .ok_or(ValidationError::MissingRequiredField {
                    field_name: "secret".to_string(),
                })?;
        let signature = consts::BASE64_ENGINE
            .decode(fields.merchant_sig.as_bytes())
            .change_context(ValidationError::IncorrectValueProvided {
                field_name: "merchantSig",
            })?;
        let verified = crypto::HmacSha1
            .verify_signature(
                secret.expose_secret().as_bytes(),
                &signature,
                fields.signing_payload().as_bytes(),
            )
            .change_context(ValidationError::InvalidValue {
                message: "callback signature verification failed".to_string(),
            })?;
        if !verified {
            tracing::warn!(
                psp_reference = %fields.psp_reference,
                merchant_reference = %fields.merchant_reference,
                "hpp callback signature mismatch"
            );
        }
        Ok(verified)
    }
}
