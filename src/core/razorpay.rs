use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::core::config::RazorpayConfig;
use crate::core::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Thin client over the gateway's Orders API. The gateway is the source of
/// truth for an order's existence; nothing is persisted locally when an
/// order is minted.
pub struct RazorpayClient {
    http: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: Secret<String>,
}

/// Reconciliation metadata attached to every order.
#[derive(Debug, Serialize)]
pub struct OrderNotes {
    pub plan_type: String,
    pub period: String,
    pub user_id: String,
}

/// The gateway's order record, as returned by the Orders API.
#[derive(Debug, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

#[derive(Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
    notes: &'a OrderNotes,
}

impl RazorpayClient {
    pub fn new(config: &RazorpayConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
        }
    }

    /// Public key id, safe to hand to the checkout widget.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Mint an order at the gateway. One outbound call; the amount has
    /// already been computed from the authoritative catalog by the caller.
    pub async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
        notes: &OrderNotes,
    ) -> Result<GatewayOrder, AppError> {
        let body = CreateOrderBody {
            amount,
            currency,
            receipt,
            notes,
        };

        let response = self
            .http
            .post(format!("{}/orders", self.base_url))
            .basic_auth(&self.key_id, Some(self.key_secret.expose_secret()))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AppError::gateway_error("Payment gateway is unreachable", e)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                detail = %detail,
                "Gateway rejected the order request"
            );
            return Err(AppError::gateway_error(
                "Payment gateway rejected the order request",
                format!("{}: {}", status, detail),
            ));
        }

        response.json::<GatewayOrder>().await.map_err(|e| {
            AppError::gateway_error("Payment gateway returned an unreadable order", e)
        })
    }

    pub fn verify_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> bool {
        verify_payment_signature(order_id, payment_id, signature, self.key_secret.expose_secret())
    }
}

/// Recompute `HMAC-SHA256(secret, orderId + "|" + paymentId)` and compare
/// against the gateway-supplied hex signature in constant time. Mismatch is
/// a plain `false`; the caller decides how to report it.
pub fn verify_payment_signature(
    order_id: &str,
    payment_id: &str,
    signature: &str,
    key_secret: &str,
) -> bool {
    let mut mac = match HmacSha256::new_from_slice(key_secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());

    let expected = hex::encode(mac.finalize().into_bytes());

    subtle::ConstantTimeEq::ct_eq(expected.as_bytes(), signature.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use claim::{assert_err, assert_ok};
    use quickcheck_macros::quickcheck;
    use secrecy::Secret;
    use wiremock::matchers::{basic_auth, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sign(order_id: &str, payment_id: &str, secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn client_for(server_url: &str) -> RazorpayClient {
        RazorpayClient::new(&RazorpayConfig {
            key_id: "rzp_test_key".to_string(),
            key_secret: Secret::new("rzp_test_secret".to_string()),
            api_base_url: server_url.to_string(),
        })
    }

    #[test]
    fn genuine_signature_verifies() {
        let signature = sign("order_abc", "pay_def", "secret");
        assert!(verify_payment_signature(
            "order_abc",
            "pay_def",
            &signature,
            "secret"
        ));
    }

    #[test]
    fn signature_over_other_identifiers_fails() {
        let signature = sign("order_abc", "pay_def", "secret");
        assert!(!verify_payment_signature(
            "order_other",
            "pay_def",
            &signature,
            "secret"
        ));
        assert!(!verify_payment_signature(
            "order_abc",
            "pay_other",
            &signature,
            "secret"
        ));
    }

    #[test]
    fn signature_under_wrong_secret_fails() {
        let signature = sign("order_abc", "pay_def", "secret");
        assert!(!verify_payment_signature(
            "order_abc",
            "pay_def",
            &signature,
            "another-secret"
        ));
    }

    #[test]
    fn every_single_bit_mutation_fails() {
        let signature = sign("order_abc", "pay_def", "secret");
        let bytes = signature.as_bytes();

        for byte_index in 0..bytes.len() {
            for bit in 0..8 {
                let mut mutated = bytes.to_vec();
                mutated[byte_index] ^= 1 << bit;
                // Mutations that leave ASCII are representable as a
                // signature string; the rest could never reach us.
                if let Ok(mutated) = String::from_utf8(mutated) {
                    assert!(
                        !verify_payment_signature("order_abc", "pay_def", &mutated, "secret"),
                        "bit {} of byte {} slipped through",
                        bit,
                        byte_index
                    );
                }
            }
        }
    }

    #[quickcheck]
    fn recomputed_signature_always_verifies(order_id: String, payment_id: String) -> bool {
        // Identifiers containing the separator could alias another pair;
        // the gateway never emits them and they are skipped here.
        if order_id.contains('|') || payment_id.contains('|') {
            return true;
        }
        let signature = sign(&order_id, &payment_id, "secret");
        verify_payment_signature(&order_id, &payment_id, &signature, "secret")
    }

    #[quickcheck]
    fn truncated_signature_never_verifies(cut: usize) -> bool {
        let signature = sign("order_abc", "pay_def", "secret");
        let cut = cut % signature.len();
        !verify_payment_signature("order_abc", "pay_def", &signature[..cut], "secret")
    }

    #[tokio::test]
    async fn create_order_hits_the_orders_endpoint_with_basic_auth() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/orders"))
            .and(basic_auth("rzp_test_key", "rzp_test_secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "order_MkzpTg4qPc",
                "amount": 5499,
                "currency": "INR",
                "status": "created"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let notes = OrderNotes {
            plan_type: "pro".into(),
            period: "quarterly".into(),
            user_id: "42".into(),
        };

        let order = client.create_order(5499, "INR", "receipt_1", &notes).await;
        let order = assert_ok!(order);
        assert_eq!(order.id, "order_MkzpTg4qPc");
        assert_eq!(order.amount, 5499);
        assert_eq!(order.currency, "INR");
    }

    #[tokio::test]
    async fn gateway_rejection_surfaces_as_gateway_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/orders"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": { "description": "Authentication failed" }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let notes = OrderNotes {
            plan_type: "basic".into(),
            period: "monthly".into(),
            user_id: "1".into(),
        };

        let error = assert_err!(client.create_order(999, "INR", "receipt_2", &notes).await);
        assert_eq!(error.error_type, crate::core::AppErrorType::GatewayError);
        // The upstream body never leaks into the user-facing message.
        assert_eq!(error.message(), "Payment gateway rejected the order request");
    }
}
