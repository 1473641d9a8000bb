use serde::{Deserialize, Serialize};

// The payment endpoints speak the gateway's camelCase dialect; the rest of
// the API stays snake_case.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub plan_type: String, // basic, pro
    pub period: String,    // monthly, quarterly, 6months, 1year
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order_id: String,
    /// Amount in the smallest currency unit, as charged at the gateway.
    pub amount: i64,
    pub currency: String,
    /// Public gateway key the client hands to the checkout widget.
    pub key_id: String,
}

/// Gateway completion callback, relayed by the client. Untrusted until the
/// signature check passes.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    pub plan_type: Option<String>,
    pub period: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentResponse {
    pub plan_type: String,
    pub period: String,
    pub renewal_date: chrono::NaiveDate,
    pub account_status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_request_uses_gateway_field_names() {
        let body = r#"{
            "razorpayOrderId": "order_abc",
            "razorpayPaymentId": "pay_def",
            "razorpaySignature": "deadbeef",
            "planType": "pro",
            "period": "quarterly"
        }"#;

        let request: VerifyPaymentRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.razorpay_order_id, "order_abc");
        assert_eq!(request.razorpay_payment_id, "pay_def");
        assert_eq!(request.plan_type.as_deref(), Some("pro"));
    }

    #[test]
    fn order_response_exposes_key_id() {
        let response = CreateOrderResponse {
            order_id: "order_abc".into(),
            amount: 5499,
            currency: "INR".into(),
            key_id: "rzp_test_key".into(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["orderId"], "order_abc");
        assert_eq!(json["keyId"], "rzp_test_key");
        assert_eq!(json["amount"], 5499);
    }
}
