use serde::Deserialize;

use crate::models::payments::{CreateOrderResponse, VerifyPaymentRequest};
use crate::models::plans::{BillingPeriod, PlanTier};

use super::orchestrator::GatewayCallback;
use super::CheckoutError;

/// The orchestrator's view of the backend: the two payment round trips,
/// nothing else. Display pricing comes from the shared catalog, not from
/// an endpoint.
pub struct PaymentsApi {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    message: String,
}

#[derive(Deserialize)]
struct VerifyEnvelope {
    success: bool,
    #[serde(default)]
    message: String,
}

impl PaymentsApi {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub async fn create_order(
        &self,
        plan_type: PlanTier,
        period: BillingPeriod,
    ) -> Result<CreateOrderResponse, CheckoutError> {
        let response = self
            .http
            .post(format!("{}/payments/create-order", self.base_url))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({
                "planType": plan_type.as_str(),
                "period": period.as_str(),
            }))
            .send()
            .await
            .map_err(|_| CheckoutError::Network)?;

        if !response.status().is_success() {
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .map(|e| e.message)
                .unwrap_or_else(|_| "Failed to create order".to_string());
            return Err(CheckoutError::OrderRejected(message));
        }

        response
            .json::<CreateOrderResponse>()
            .await
            .map_err(|_| CheckoutError::Network)
    }

    pub async fn verify_payment(
        &self,
        callback: &GatewayCallback,
        plan_type: PlanTier,
        period: BillingPeriod,
    ) -> Result<(), CheckoutError> {
        let body = VerifyPaymentRequest {
            razorpay_order_id: callback.order_id.clone(),
            razorpay_payment_id: callback.payment_id.clone(),
            razorpay_signature: callback.signature.clone(),
            plan_type: Some(plan_type.as_str().to_string()),
            period: Some(period.as_str().to_string()),
        };

        let response = self
            .http
            .post(format!("{}/payments/verify-payment", self.base_url))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|_| CheckoutError::Network)?;

        if !response.status().is_success() {
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .map(|e| e.message)
                .unwrap_or_else(|_| "Payment verification failed".to_string());
            return Err(CheckoutError::VerificationFailed(message));
        }

        let envelope = response
            .json::<VerifyEnvelope>()
            .await
            .map_err(|_| CheckoutError::Network)?;

        // A 200 without success=true is still a failure; the server's word
        // is the only one that counts.
        if !envelope.success {
            return Err(CheckoutError::VerificationFailed(if envelope.message.is_empty() {
                "Payment verification failed".to_string()
            } else {
                envelope.message
            }));
        }

        Ok(())
    }
}
