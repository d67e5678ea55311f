//! Signed redirect forms for the eSewa payment gateway.
//!
//! eSewa's ePay v2 checkout is browser-driven: the client POSTs an HTML
//! form to the gateway, the shopper pays there, and the gateway redirects
//! back to a success or failure URL. The form carries an HMAC-SHA256
//! signature (base64) over a comma-joined subset of its fields, computed
//! with the merchant secret. This module builds that form; verifying the
//! gateway's own callbacks is out of scope.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// The fields covered by the signature, in signing order. eSewa requires
/// this exact list and ordering for the v2 form endpoint.
const SIGNED_FIELD_NAMES: &str = "total_amount,transaction_uuid,product_code";

/// Errors that can occur while building a payment form.
#[derive(thiserror::Error, Debug)]
pub enum PaymentError {
    /// The merchant secret was rejected as an HMAC key.
    #[error("gateway secret was rejected as an HMAC key")]
    InvalidSecret,
}

/// Where and how to reach the gateway: form endpoint, merchant product
/// code, signing secret, and the URLs the shopper lands on afterwards.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// The gateway endpoint the form POSTs to.
    pub form_url: String,
    /// Merchant product code registered with the gateway.
    pub product_code: String,
    /// Merchant secret used to sign the form.
    pub secret_key: String,
    /// Where the gateway sends the shopper after a successful payment.
    pub success_url: String,
    /// Where the gateway sends the shopper after a failed payment.
    pub failure_url: String,
}

impl GatewayConfig {
    /// The eSewa RC (testing) environment, with the merchant code and
    /// secret published in eSewa's integration docs.
    #[must_use]
    pub fn sandbox(success_url: impl Into<String>, failure_url: impl Into<String>) -> Self {
        Self {
            form_url: "https://rc-epay.esewa.com.np/api/epay/main/v2/form".to_owned(),
            product_code: "EPAYTEST".to_owned(),
            secret_key: "8gBm/:&EnhH.1/q".to_owned(),
            success_url: success_url.into(),
            failure_url: failure_url.into(),
        }
    }

    /// Build a signed form for `total`, minting a fresh v4 transaction id.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::InvalidSecret`] when the configured secret
    /// cannot key the HMAC.
    pub fn form(&self, total: Decimal) -> Result<PaymentForm, PaymentError> {
        self.form_with_transaction(total, Uuid::new_v4().to_string())
    }

    /// Build a signed form for `total` with a caller-chosen transaction id.
    ///
    /// The id must be unique per payment attempt; the gateway rejects
    /// replays. [`GatewayConfig::form`] is the usual entry point.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::InvalidSecret`] when the configured secret
    /// cannot key the HMAC.
    pub fn form_with_transaction(
        &self,
        total: Decimal,
        transaction_uuid: String,
    ) -> Result<PaymentForm, PaymentError> {
        let total = total.to_string();
        let payload = signing_payload(&total, &transaction_uuid, &self.product_code);
        let signature = sign(&self.secret_key, &payload)?;

        let fields = vec![
            ("amount", total.clone()),
            ("tax_amount", "0".to_owned()),
            ("total_amount", total),
            ("transaction_uuid", transaction_uuid.clone()),
            ("product_code", self.product_code.clone()),
            ("product_service_charge", "0".to_owned()),
            ("product_delivery_charge", "0".to_owned()),
            ("success_url", self.success_url.clone()),
            ("failure_url", self.failure_url.clone()),
            ("signed_field_names", SIGNED_FIELD_NAMES.to_owned()),
            ("signature", signature),
        ];

        Ok(PaymentForm {
            action_url: self.form_url.clone(),
            transaction_uuid,
            fields,
        })
    }
}

/// A ready-to-POST gateway form: an action URL plus named fields,
/// signature included.
#[derive(Debug, Clone)]
pub struct PaymentForm {
    action_url: String,
    transaction_uuid: String,
    fields: Vec<(&'static str, String)>,
}

impl PaymentForm {
    /// The URL the form POSTs to.
    #[must_use]
    pub fn action_url(&self) -> &str {
        &self.action_url
    }

    /// The transaction id baked into this form.
    #[must_use]
    pub fn transaction_uuid(&self) -> &str {
        &self.transaction_uuid
    }

    /// All form fields in submission order.
    #[must_use]
    pub fn fields(&self) -> &[(&'static str, String)] {
        &self.fields
    }

    /// Look up a single field value by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value.as_str())
    }
}

fn signing_payload(total_amount: &str, transaction_uuid: &str, product_code: &str) -> String {
    format!(
        "total_amount={total_amount},transaction_uuid={transaction_uuid},product_code={product_code}"
    )
}

fn sign(secret: &str, payload: &str) -> Result<String, PaymentError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| PaymentError::InvalidSecret)?;
    mac.update(payload.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sandbox() -> GatewayConfig {
        GatewayConfig::sandbox(
            "https://shop.example.com/payment-success",
            "https://shop.example.com/payment-failure",
        )
    }

    #[test]
    fn test_signing_payload_format() {
        assert_eq!(
            signing_payload("110", "241028-102030", "EPAYTEST"),
            "total_amount=110,transaction_uuid=241028-102030,product_code=EPAYTEST"
        );
    }

    #[test]
    fn test_sign_is_deterministic_base64() {
        let a = sign("secret", "payload").unwrap();
        let b = sign("secret", "payload").unwrap();
        assert_eq!(a, b);
        // HMAC-SHA256 output is 32 bytes, 44 chars in padded base64
        assert_eq!(a.len(), 44);
        assert_eq!(BASE64.decode(&a).unwrap().len(), 32);
    }

    #[test]
    fn test_sign_varies_with_inputs() {
        let base = sign("secret", "payload").unwrap();
        assert_ne!(sign("secret", "payload2").unwrap(), base);
        assert_ne!(sign("other", "payload").unwrap(), base);
    }

    #[test]
    fn test_form_field_set_and_order() {
        let form = sandbox()
            .form_with_transaction(Decimal::new(11000, 2), "tx-1".to_owned())
            .unwrap();

        let names: Vec<&str> = form.fields().iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            [
                "amount",
                "tax_amount",
                "total_amount",
                "transaction_uuid",
                "product_code",
                "product_service_charge",
                "product_delivery_charge",
                "success_url",
                "failure_url",
                "signed_field_names",
                "signature",
            ]
        );

        assert_eq!(form.field("amount"), form.field("total_amount"));
        assert_eq!(form.field("amount"), Some("110.00"));
        assert_eq!(form.field("tax_amount"), Some("0"));
        assert_eq!(form.field("product_code"), Some("EPAYTEST"));
        assert_eq!(
            form.field("signed_field_names"),
            Some("total_amount,transaction_uuid,product_code")
        );
        assert_eq!(
            form.field("success_url"),
            Some("https://shop.example.com/payment-success")
        );
        assert_eq!(form.action_url(), "https://rc-epay.esewa.com.np/api/epay/main/v2/form");
    }

    #[test]
    fn test_form_signature_matches_direct_signing() {
        let config = sandbox();
        let form = config
            .form_with_transaction(Decimal::from(110), "tx-1".to_owned())
            .unwrap();

        let expected = sign(
            &config.secret_key,
            &signing_payload("110", "tx-1", "EPAYTEST"),
        )
        .unwrap();
        assert_eq!(form.field("signature"), Some(expected.as_str()));
    }

    #[test]
    fn test_form_mints_unique_transactions() {
        let config = sandbox();
        let one = config.form(Decimal::from(10)).unwrap();
        let two = config.form(Decimal::from(10)).unwrap();
        assert_ne!(one.transaction_uuid(), two.transaction_uuid());
        assert_ne!(one.field("signature"), two.field("signature"));
        assert_eq!(one.transaction_uuid(), one.field("transaction_uuid").unwrap());
    }
}
