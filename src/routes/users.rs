use crate::core::jwt_auth::{generate_jwt_token, JwtClaims};
use crate::core::AppConfig;
use crate::core::AppError;
use crate::core::{AppErrorResponse, AppSuccessResponse};
use crate::db::users;
use crate::models::users::{
    AccountStatus, LoginRequest, LoginResponse, RegisterRequest, UserProfile,
};
use actix_web::{get, post, web, HttpResponse, Result};
use chrono::{Duration, Utc};
use sqlx::MySqlPool;
use unicode_segmentation::UnicodeSegmentation;
use validator::Validate;

#[tracing::instrument(name = "Register User", skip(pool, request))]
#[post("/register")]
pub async fn register(
    pool: web::Data<MySqlPool>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    if let Err(errors) = request.validate() {
        return Ok(HttpResponse::BadRequest().json(AppErrorResponse {
            success: false,
            message: flatten_validation_errors(&errors),
        }));
    }

    // Grapheme count, not bytes: names are user-visible unicode.
    let name_length = request.name.graphemes(true).count();
    if name_length == 0 || name_length > 256 {
        return Ok(HttpResponse::BadRequest().json(AppErrorResponse {
            success: false,
            message: "Name must be between 1 and 256 characters".to_string(),
        }));
    }

    // Check if email already exists
    if users::email_exists(&pool, &request.email).await? {
        return Ok(HttpResponse::BadRequest().json(AppErrorResponse {
            success: false,
            message: "A user with this email address already exists".to_string(),
        }));
    }

    let user = users::create_user(&pool, &request).await?;
    let user_profile = UserProfile::from(user);

    Ok(HttpResponse::Created().json(AppSuccessResponse {
        success: true,
        data: user_profile,
        message: "User registered successfully".to_string(),
    }))
}

#[tracing::instrument(name = "User Login", skip(pool, config, request))]
#[post("/login")]
pub async fn login(
    pool: web::Data<MySqlPool>,
    config: web::Data<AppConfig>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    // Get user by email
    let user = match users::get_user_by_email(&pool, &request.email).await {
        Ok(user) => user,
        Err(_) => {
            return Ok(HttpResponse::Unauthorized().json(AppErrorResponse {
                success: false,
                message: "Email or password is incorrect".to_string(),
            }));
        }
    };

    // Verify password
    if !users::verify_password(&request.password, &user.password).await? {
        return Ok(HttpResponse::Unauthorized().json(AppErrorResponse {
            success: false,
            message: "Email or password is incorrect".to_string(),
        }));
    }

    // Disabled accounts cannot sign in
    if user.account_status == AccountStatus::Disabled.as_str() {
        return Ok(HttpResponse::Unauthorized().json(AppErrorResponse {
            success: false,
            message: "This account has been disabled".to_string(),
        }));
    }

    // Generate JWT token
    let expires_at = Utc::now() + Duration::hours(config.jwt_auth_config.token_expiration_time);
    let claims = JwtClaims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        role: user.role.clone(),
        exp: expires_at.timestamp() as usize,
    };

    let token = generate_jwt_token(&claims, &config.jwt_auth_config)?;
    let user_profile = UserProfile::from(user);

    let response = LoginResponse {
        user: user_profile,
        token,
        expires_at,
    };

    Ok(HttpResponse::Ok().json(AppSuccessResponse {
        success: true,
        data: response,
        message: "Login successful".to_string(),
    }))
}

#[tracing::instrument(name = "Get User Profile", skip(pool, claims))]
#[get("/profile")]
pub async fn get_profile(
    pool: web::Data<MySqlPool>,
    claims: JwtClaims,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id()?;

    let user = users::get_user_by_id(&pool, user_id).await?;
    let user_profile = UserProfile::from(user);

    Ok(HttpResponse::Ok().json(AppSuccessResponse {
        success: true,
        data: user_profile,
        message: "Profile retrieved successfully".to_string(),
    }))
}

fn flatten_validation_errors(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|field_errors| field_errors.iter())
        .filter_map(|error| error.message.as_ref().map(|m| m.to_string()))
        .collect::<Vec<_>>()
        .join("; ")
}
