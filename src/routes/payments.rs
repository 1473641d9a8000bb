use crate::core::jwt_auth::JwtClaims;
use crate::core::razorpay::{OrderNotes, RazorpayClient};
use crate::core::AppError;
use crate::core::AppSuccessResponse;
use crate::db;
use crate::models::payments::{
    CreateOrderRequest, CreateOrderResponse, VerifyPaymentRequest, VerifyPaymentResponse,
};
use crate::models::plans::{price_of, BillingPeriod, PlanTier};

use actix_web::{post, web, HttpResponse, Result};
use sqlx::MySqlPool;
use std::str::FromStr;
use uuid::Uuid;

#[tracing::instrument(name = "Create Payment Order", skip(razorpay, claims, request))]
#[post("/create-order")]
pub async fn create_order(
    razorpay: web::Data<RazorpayClient>,
    claims: JwtClaims,
    request: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id()?;

    // Validate the selection before anything leaves the process.
    let plan_type = PlanTier::from_str(&request.plan_type).map_err(AppError::bad_request)?;
    let period = BillingPeriod::from_str(&request.period).map_err(AppError::bad_request)?;

    // The amount always comes from the catalog, never from the client.
    let price = price_of(plan_type, period);

    let receipt = format!("receipt_{}", Uuid::new_v4().simple());
    let notes = OrderNotes {
        plan_type: plan_type.as_str().to_string(),
        period: period.as_str().to_string(),
        user_id: user_id.to_string(),
    };

    let order = razorpay
        .create_order(price.amount, "INR", &receipt, &notes)
        .await?;

    Ok(HttpResponse::Ok().json(CreateOrderResponse {
        order_id: order.id,
        amount: order.amount,
        currency: order.currency,
        key_id: razorpay.key_id().to_string(),
    }))
}

#[tracing::instrument(name = "Verify Payment", skip(pool, razorpay, claims, request))]
#[post("/verify-payment")]
pub async fn verify_payment(
    pool: web::Data<MySqlPool>,
    razorpay: web::Data<RazorpayClient>,
    claims: JwtClaims,
    request: web::Json<VerifyPaymentRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id()?;

    if request.razorpay_order_id.is_empty()
        || request.razorpay_payment_id.is_empty()
        || request.razorpay_signature.is_empty()
    {
        return Err(AppError::bad_request("Missing payment details"));
    }

    // The orchestrator re-supplies the selection; orders are not persisted
    // locally, so the update cannot be applied without it.
    let (plan_type, period) = match (&request.plan_type, &request.period) {
        (Some(plan_type), Some(period)) => (
            PlanTier::from_str(plan_type).map_err(AppError::bad_request)?,
            BillingPeriod::from_str(period).map_err(AppError::bad_request)?,
        ),
        _ => return Err(AppError::bad_request("Missing plan details")),
    };

    if !razorpay.verify_signature(
        &request.razorpay_order_id,
        &request.razorpay_payment_id,
        &request.razorpay_signature,
    ) {
        tracing::warn!(
            order_id = %request.razorpay_order_id,
            payment_id = %request.razorpay_payment_id,
            user_id = user_id,
            "Rejected payment callback with an invalid signature"
        );
        return Err(AppError::signature_mismatch());
    }

    let user = db::users::apply_verified_payment(
        &pool,
        user_id,
        &request.razorpay_payment_id,
        &request.razorpay_order_id,
        plan_type,
        period,
    )
    .await?;

    Ok(HttpResponse::Ok().json(AppSuccessResponse {
        success: true,
        data: VerifyPaymentResponse {
            plan_type: user.plan_type.unwrap_or_default(),
            period: user.subscription_duration.unwrap_or_default(),
            renewal_date: user.renewal_date.unwrap_or_else(|| chrono::Utc::now().date_naive()),
            account_status: user.account_status,
        },
        message: "Payment verified successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{
        AppConfig, JwtAuthConfig, MySqlConfig, PaintosWebServerConfig, RazorpayConfig,
    };
    use crate::core::jwt_auth::generate_jwt_token;
    use actix_web::{test, App};
    use secrecy::Secret;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> AppConfig {
        AppConfig {
            paintos_server_config: PaintosWebServerConfig {
                host: "127.0.0.1".into(),
                port: 0,
            },
            mysql: MySqlConfig {
                username: "paintos".into(),
                password: Secret::new("paintos".into()),
                host: "127.0.0.1".into(),
                port: 3306,
                database_name: "paintos".into(),
            },
            jwt_auth_config: JwtAuthConfig {
                secret: Secret::new("test-jwt-secret-for-handlers".into()),
                token_expiration_time: 24,
            },
            razorpay: RazorpayConfig {
                key_id: "rzp_test_key".into(),
                key_secret: Secret::new("rzp_test_secret".into()),
                api_base_url: "http://127.0.0.1:0".into(),
            },
        }
    }

    fn bearer_token(config: &AppConfig) -> String {
        let claims = JwtClaims {
            sub: "42".into(),
            email: "buyer@example.com".into(),
            role: "user".into(),
            exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
        };
        generate_jwt_token(&claims, &config.jwt_auth_config).unwrap()
    }

    #[actix_web::test]
    async fn create_order_returns_the_catalog_amount_and_key_id() {
        let server = MockServer::start().await;

        // The gateway must receive the catalog amount, not anything the
        // client said.
        Mock::given(method("POST"))
            .and(path("/orders"))
            .and(body_partial_json(serde_json::json!({"amount": 5499})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "order_test_1",
                "amount": 5499,
                "currency": "INR"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = test_config();
        config.razorpay.api_base_url = server.uri();
        let razorpay = RazorpayClient::new(&config.razorpay);
        let token = bearer_token(&config);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(config))
                .app_data(web::Data::new(razorpay))
                .service(create_order),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/create-order")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(serde_json::json!({"planType": "pro", "period": "quarterly"}))
            .to_request();

        let body: serde_json::Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(body["orderId"], "order_test_1");
        assert_eq!(body["amount"], 5499);
        assert_eq!(body["currency"], "INR");
        assert_eq!(body["keyId"], "rzp_test_key");
    }

    #[actix_web::test]
    async fn unknown_tier_is_rejected_before_any_gateway_call() {
        let server = MockServer::start().await;

        // Zero expected calls: validation must fail first.
        Mock::given(method("POST"))
            .and(path("/orders"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut config = test_config();
        config.razorpay.api_base_url = server.uri();
        let razorpay = RazorpayClient::new(&config.razorpay);
        let token = bearer_token(&config);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(config))
                .app_data(web::Data::new(razorpay))
                .service(create_order),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/create-order")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(serde_json::json!({"planType": "enterprise", "period": "monthly"}))
            .to_request();

        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn create_order_requires_a_token() {
        let config = test_config();
        let razorpay = RazorpayClient::new(&config.razorpay);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(config))
                .app_data(web::Data::new(razorpay))
                .service(create_order),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/create-order")
            .set_json(serde_json::json!({"planType": "basic", "period": "monthly"}))
            .to_request();

        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }
}
