//! Request and response shaping for the HPP redirect flow.

use std::collections::HashMap;

use base64::Engine;
use error_stack::ResultExt;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{
    consts,
    crypto::{self, SignMessage},
    enums::Currency,
    errors::{CryptoError, CustomResult, ValidationError},
    request::{Method, RedirectForm},
    types::{MinorUnit, StringMajorUnit},
};

/// Skin configuration for the HPP gateway.
///
/// All fields are optional at set time; presence of the required ones is
/// checked when a purchase is built, not here.
#[derive(Clone, Debug)]
pub struct AdyenConfig {
    /// The merchant account to process payments with.
    pub merchant_account: Option<String>,
    /// The skin to use. An account can carry several skins for different
    /// branding.
    pub skin_code: Option<String>,
    /// The shared secret configured in the skin. Known only to the merchant
    /// and Adyen.
    pub secret: Option<SecretString>,
    /// Date by which the ordered goods must be shipped, `YYYY-MM-DD`.
    pub ship_before_date: Option<String>,
    /// Final time by which the payment must be made,
    /// `YYYY-MM-DDThh:mm:ssTZD`.
    pub session_validity: Option<String>,
    /// Default merchant reference for purchases that do not supply one.
    pub merchant_reference: Option<String>,
    /// Locale of the payment form, e.g. `en_GB` or `fr`.
    pub shopper_locale: Option<String>,
    /// Shopper email, used by Adyen's velocity fraud checks.
    pub shopper_email: Option<String>,
    /// ID uniquely identifying the shopper in the merchant's system.
    pub shopper_reference: Option<String>,
    /// Comma-separated whitelist of payment methods shown in the skin.
    pub allowed_methods: Option<String>,
    /// Comma-separated blacklist of payment methods removed from the skin.
    pub blocked_methods: Option<String>,
    /// Explicit shopper country, overriding Adyen's IP-based mapping. Not
    /// part of the signing data.
    pub country_code: Option<String>,
    /// Whether to redirect to the test or the live hosted pages.
    pub test_mode: bool,
}

impl Default for AdyenConfig {
    fn default() -> Self {
        Self {
            merchant_account: None,
            skin_code: None,
            secret: None,
            ship_before_date: None,
            session_validity: None,
            merchant_reference: None,
            shopper_locale: None,
            shopper_email: None,
            shopper_reference: None,
            allowed_methods: None,
            blocked_methods: None,
            country_code: None,
            test_mode: true,
        }
    }
}

impl AdyenConfig {
    /// An empty configuration, defaulting to test mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the merchant account.
    pub fn with_merchant_account(mut self, value: impl Into<String>) -> Self {
        self.merchant_account = Some(value.into());
        self
    }

    /// Set the skin code.
    pub fn with_skin_code(mut self, value: impl Into<String>) -> Self {
        self.skin_code = Some(value.into());
        self
    }

    /// Set the shared secret configured in the skin.
    pub fn with_secret(mut self, value: impl Into<String>) -> Self {
        self.secret = Some(SecretString::new(value.into()));
        self
    }

    /// Set the ship-before date.
    pub fn with_ship_before_date(mut self, value: impl Into<String>) -> Self {
        self.ship_before_date = Some(value.into());
        self
    }

    /// Set the session validity deadline.
    pub fn with_session_validity(mut self, value: impl Into<String>) -> Self {
        self.session_validity = Some(value.into());
        self
    }

    /// Set the default merchant reference.
    pub fn with_merchant_reference(mut self, value: impl Into<String>) -> Self {
        self.merchant_reference = Some(value.into());
        self
    }

    /// Set the payment form locale.
    pub fn with_shopper_locale(mut self, value: impl Into<String>) -> Self {
        self.shopper_locale = Some(value.into());
        self
    }

    /// Set the shopper email.
    pub fn with_shopper_email(mut self, value: impl Into<String>) -> Self {
        self.shopper_email = Some(value.into());
        self
    }

    /// Set the shopper reference.
    pub fn with_shopper_reference(mut self, value: impl Into<String>) -> Self {
        self.shopper_reference = Some(value.into());
        self
    }

    /// Set the allowed payment methods filter.
    pub fn with_allowed_methods(mut self, value: impl Into<String>) -> Self {
        self.allowed_methods = Some(value.into());
        self
    }

    /// Set the blocked payment methods filter.
    pub fn with_blocked_methods(mut self, value: impl Into<String>) -> Self {
        self.blocked_methods = Some(value.into());
        self
    }

    /// Set the explicit shopper country code.
    pub fn with_country_code(mut self, value: impl Into<String>) -> Self {
        self.country_code = Some(value.into());
        self
    }

    /// Switch between the test and live hosted pages.
    pub fn with_test_mode(mut self, value: bool) -> Self {
        self.test_mode = value;
        self
    }
}

/// One purchase to redirect a shopper for.
#[derive(Clone, Debug)]
pub struct AdyenPurchaseRequest {
    /// Amount in major units, e.g. `"20.00"`.
    pub amount: StringMajorUnit,
    /// Transaction currency.
    pub currency: Currency,
    /// Merchant reference for this purchase; falls back to the configured
    /// default when absent.
    pub merchant_reference: Option<String>,
}

/// The payment session fields of a single purchase redirect.
///
/// The first ten fields are the signed portion. Absent optional values are
/// carried as empty strings, never omitted, so every field occupies a fixed
/// position in the signed concatenation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdyenPaymentSession {
    /// Amount in minor units.
    pub payment_amount: MinorUnit,
    /// Transaction currency.
    pub currency_code: Currency,
    /// Ship-before date.
    pub ship_before_date: String,
    /// Merchant reference.
    pub merchant_reference: String,
    /// Skin code.
    pub skin_code: String,
    /// Merchant account.
    pub merchant_account: String,
    /// Session validity deadline.
    pub session_validity: String,
    /// Shopper reference.
    pub shopper_reference: String,
    /// Allowed payment methods filter.
    pub allowed_methods: String,
    /// Blocked payment methods filter.
    pub blocked_methods: String,
    /// Base64-encoded HMAC-SHA1 over the signed fields. Included alongside,
    /// never inside, the signed payload.
    pub merchant_sig: String,
    /// Shopper email; not part of the signing data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shopper_email: Option<String>,
    /// Payment form locale; not part of the signing data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shopper_locale: Option<String>,
    /// Explicit shopper country; not part of the signing data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

impl TryFrom<(&AdyenConfig, &AdyenPurchaseRequest)> for AdyenPaymentSession {
    type Error = error_stack::Report<ValidationError>;

    fn try_from(
        (config, request): (&AdyenConfig, &AdyenPurchaseRequest),
    ) -> Result<Self, Self::Error> {
        // Required inputs are checked before any signature work.
        let secret = config
            .secret
            .as_ref()
            .ok_or(ValidationError::MissingRequiredField {
                field_name: "secret".to_string(),
            })?;
        let payment_amount = request.amount.to_minor_unit(request.currency)?;

        let mut session = Self {
            payment_amount,
            currency_code: request.currency,
            ship_before_date: config.ship_before_date.clone().unwrap_or_default(),
            merchant_reference: request
                .merchant_reference
                .clone()
                .or_else(|| config.merchant_reference.clone())
                .unwrap_or_default(),
            skin_code: config.skin_code.clone().unwrap_or_default(),
            merchant_account: config.merchant_account.clone().unwrap_or_default(),
            session_validity: config.session_validity.clone().unwrap_or_default(),
            shopper_reference: config.shopper_reference.clone().unwrap_or_default(),
            allowed_methods: config.allowed_methods.clone().unwrap_or_default(),
            blocked_methods: config.blocked_methods.clone().unwrap_or_default(),
            merchant_sig: String::new(),
            shopper_email: config.shopper_email.clone(),
            shopper_locale: config.shopper_locale.clone(),
            country_code: config.country_code.clone(),
        };
        session.merchant_sig = session
            .generate_signature(secret)
            .change_context(ValidationError::InvalidValue {
                message: "merchant signature computation failed".to_string(),
            })?;
        Ok(session)
    }
}

impl AdyenPaymentSession {
    /// The signed fields concatenated without delimiter, in the exact order
    /// the skin recomputes the digest over. This order is load-bearing.
    fn signing_payload(&self) -> String {
        format!(
            "{}{}{}{}{}{}{}{}{}{}",
            self.payment_amount,
            self.currency_code,
            self.ship_before_date,
            self.merchant_reference,
            self.skin_code,
            self.merchant_account,
            self.session_validity,
            self.shopper_reference,
            self.allowed_methods,
            self.blocked_methods,
        )
    }

    fn generate_signature(&self, secret: &SecretString) -> CustomResult<String, CryptoError> {
        let digest = crypto::HmacSha1.sign_message(
            secret.expose_secret().as_bytes(),
            self.signing_payload().as_bytes(),
        )?;
        Ok(consts::BASE64_ENGINE.encode(digest))
    }

    /// The full outbound field mapping: the ten signed fields, the
    /// signature, and the unsigned extras when present.
    pub fn form_fields(&self) -> HashMap<String, String> {
        let mut fields = HashMap::from([
            ("paymentAmount".to_string(), self.payment_amount.to_string()),
            ("currencyCode".to_string(), self.currency_code.to_string()),
            ("shipBeforeDate".to_string(), self.ship_before_date.clone()),
            (
                "merchantReference".to_string(),
                self.merchant_reference.clone(),
            ),
            ("skinCode".to_string(), self.skin_code.clone()),
            (
                "merchantAccount".to_string(),
                self.merchant_account.clone(),
            ),
            (
                "sessionValidity".to_string(),
                self.session_validity.clone(),
            ),
            (
                "shopperReference".to_string(),
                self.shopper_reference.clone(),
            ),
            ("allowedMethods".to_string(), self.allowed_methods.clone()),
            ("blockedMethods".to_string(), self.blocked_methods.clone()),
            ("merchantSig".to_string(), self.merchant_sig.clone()),
        ]);
        if let Some(shopper_email) = &self.shopper_email {
            fields.insert("shopperEmail".to_string(), shopper_email.clone());
        }
        if let Some(shopper_locale) = &self.shopper_locale {
            fields.insert("shopperLocale".to_string(), shopper_locale.clone());
        }
        if let Some(country_code) = &self.country_code {
            fields.insert("countryCode".to_string(), country_code.clone());
        }
        fields
    }
}

/// Off-site purchase response.
///
/// The purchase is never successful at this point; success or failure is
/// only known once Adyen sends the shopper back.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdyenPurchaseResponse {
    endpoint: String,
    form_fields: HashMap<String, String>,
}

impl AdyenPurchaseResponse {
    pub(crate) fn new(endpoint: impl Into<String>, form_fields: HashMap<String, String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            form_fields,
        }
    }

    /// Always `false`: the shopper has not paid yet.
    pub fn is_successful(&self) -> bool {
        false
    }

    /// Always `true`: the shopper must be sent to the hosted pages.
    pub fn is_redirect(&self) -> bool {
        true
    }

    /// Hosted payment page to redirect to.
    pub fn redirect_url(&self) -> &str {
        &self.endpoint
    }

    /// Always `POST`.
    pub fn redirect_method(&self) -> Method {
        Method::Post
    }

    /// The outbound field mapping, exactly as built.
    pub fn redirect_data(&self) -> &HashMap<String, String> {
        &self.form_fields
    }

    /// The redirect as a single instruction for the rendering layer.
    pub fn redirect_form(&self) -> RedirectForm {
        RedirectForm {
            endpoint: self.endpoint.clone(),
            method: self.redirect_method(),
            form_fields: self.form_fields.clone(),
        }
    }
}

/// Fields Adyen appends to the merchant return URL after the shopper
/// completes (or abandons) the hosted payment flow.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdyenCallbackFields {
    /// Outcome of the payment session, e.g. `AUTHORISED` or `CANCELLED`.
    #[serde(default)]
    pub auth_result: String,
    /// Adyen's reference for the payment.
    #[serde(default)]
    pub psp_reference: String,
    /// The merchant reference the session was created with.
    #[serde(default)]
    pub merchant_reference: String,
    /// The skin that served the session.
    #[serde(default)]
    pub skin_code: String,
    /// Opaque data echoed back if it was supplied at session time.
    #[serde(default)]
    pub merchant_return_data: String,
    /// Adyen's signature over the result fields.
    #[serde(default)]
    pub merchant_sig: String,
}

impl AdyenCallbackFields {
    /// Parse the query string of the merchant return URL.
    pub fn from_query(query: &str) -> CustomResult<Self, ValidationError> {
        serde_urlencoded::from_str(query).change_context(ValidationError::InvalidValue {
            message: "malformed callback query".to_string(),
        })
    }

    /// Adyen's own signing order for result redirects.
    pub(crate) fn signing_payload(&self) -> String {
        format!(
            "{}{}{}{}{}",
            self.auth_result,
            self.psp_reference,
            self.merchant_reference,
            self.skin_code,
            self.merchant_return_data,
        )
    }
}

#[cfg(test)]
mod adyen_session_tests {
    #![allow(clippy::unwrap_used)]
    use super::{AdyenConfig, AdyenPaymentSession, AdyenPurchaseRequest};
    use crate::{enums::Currency, errors::ValidationError, types::StringMajorUnit};

    fn reference_config() -> AdyenConfig {
        AdyenConfig::new()
            .with_merchant_account("TestMerchant")
            .with_skin_code("testskin")
            .with_secret("mysecret")
            .with_ship_before_date("2024-01-01")
            .with_session_validity("2024-01-01T00:00:00Z")
            .with_merchant_reference("ref1")
            .with_shopper_reference("shopper1")
            .with_allowed_methods("")
            .with_blocked_methods("")
    }

    fn reference_request() -> AdyenPurchaseRequest {
        AdyenPurchaseRequest {
            amount: StringMajorUnit::new("20.00"),
            currency: Currency::EUR,
            merchant_reference: None,
        }
    }

    fn build(config: &AdyenConfig, request: &AdyenPurchaseRequest) -> AdyenPaymentSession {
        AdyenPaymentSession::try_from((config, request)).unwrap()
    }

    #[test]
    fn test_reference_signature() {
        let session = build(&reference_config(), &reference_request());

        assert_eq!(session.payment_amount.get_amount_as_i64(), 2000);
        assert_eq!(session.currency_code, Currency::EUR);
        assert_eq!(
            session.signing_payload(),
            "2000EUR2024-01-01ref1testskinTestMerchant2024-01-01T00:00:00Zshopper1"
        );
        // Base64(HMAC-SHA1(payload, "mysecret")), computed independently.
        assert_eq!(session.merchant_sig, "cwZ0lGcEM53r8Ymf1jhOoz7wGCM=");
    }

    #[test]
    fn test_signature_is_deterministic() {
        let first = build(&reference_config(), &reference_request());
        let second = build(&reference_config(), &reference_request());

        assert_eq!(first, second);
    }

    #[test]
    fn test_changing_one_signed_field_changes_signature() {
        let baseline = build(&reference_config(), &reference_request());
        let changed = build(
            &reference_config().with_merchant_reference("ref2"),
            &reference_request(),
        );

        assert_eq!(changed.merchant_sig, "xaQhxrryMYm3WM9rmObwYznTDvw=");
        assert_ne!(baseline.merchant_sig, changed.merchant_sig);
    }

    #[test]
    fn test_request_reference_overrides_configured_default() {
        let request = AdyenPurchaseRequest {
            merchant_reference: Some("ref2".to_string()),
            ..reference_request()
        };
        let session = build(&reference_config(), &request);

        assert_eq!(session.merchant_reference, "ref2");
        assert_eq!(session.merchant_sig, "xaQhxrryMYm3WM9rmObwYznTDvw=");
    }

    #[test]
    fn test_missing_secret_fails_validation() {
        let mut config = reference_config();
        config.secret = None;

        let err = AdyenPaymentSession::try_from((&config, &reference_request())).unwrap_err();
        assert!(matches!(
            err.current_context(),
            ValidationError::MissingRequiredField { field_name } if field_name == "secret"
        ));
    }

    #[test]
    fn test_missing_amount_fails_validation() {
        let request = AdyenPurchaseRequest {
            amount: StringMajorUnit::new(""),
            ..reference_request()
        };

        let err = AdyenPaymentSession::try_from((&reference_config(), &request)).unwrap_err();
        assert!(matches!(
            err.current_context(),
            ValidationError::MissingRequiredField { field_name } if field_name == "amount"
        ));
    }

    #[test]
    fn test_absent_optionals_sign_as_empty_strings() {
        let config = AdyenConfig::new()
            .with_merchant_account("TestMerchant")
            .with_secret("mysecret");
        let session = build(&config, &reference_request());

        // Every signed field still occupies its position.
        assert_eq!(session.signing_payload(), "2000EURTestMerchant");
        assert_eq!(session.allowed_methods, "");
        assert_eq!(session.blocked_methods, "");
    }

    #[test]
    fn test_shopper_email_maps_from_email_not_locale() {
        let config = reference_config()
            .with_shopper_email("shopper@example.com")
            .with_shopper_locale("nl_NL");
        let fields = build(&config, &reference_request()).form_fields();

        assert_eq!(
            fields.get("shopperEmail").map(String::as_str),
            Some("shopper@example.com")
        );
        assert_eq!(
            fields.get("shopperLocale").map(String::as_str),
            Some("nl_NL")
        );
    }

    #[test]
    fn test_form_fields_carry_signed_set_and_signature() {
        let fields = build(&reference_config(), &reference_request()).form_fields();

        assert_eq!(fields.get("paymentAmount").map(String::as_str), Some("2000"));
        assert_eq!(fields.get("currencyCode").map(String::as_str), Some("EUR"));
        assert_eq!(
            fields.get("merchantSig").map(String::as_str),
            Some("cwZ0lGcEM53r8Ymf1jhOoz7wGCM=")
        );
        // Unsigned extras are omitted, not empty, when unset.
        assert!(!fields.contains_key("shopperLocale"));
        assert!(!fields.contains_key("countryCode"));
        assert!(!fields.contains_key("shopperEmail"));
    }

    #[test]
    fn test_session_serializes_with_wire_field_names() {
        let session = build(&reference_config(), &reference_request());
        let value = serde_json::to_value(&session).unwrap();

        assert_eq!(value["paymentAmount"], 2000);
        assert_eq!(value["currencyCode"], "EUR");
        assert_eq!(value["merchantSig"], "cwZ0lGcEM53r8Ymf1jhOoz7wGCM=");
        assert!(value.get("shopperLocale").is_none());
    }

    #[test]
    fn test_zero_decimal_currency_amount() {
        let request = AdyenPurchaseRequest {
            amount: StringMajorUnit::new("10"),
            currency: Currency::JPY,
            merchant_reference: None,
        };
        let session = build(&reference_config(), &request);

        assert_eq!(session.payment_amount.get_amount_as_i64(), 10);
    }
}
