use crate::core::jwt_auth::JwtClaims;
use crate::core::AppError;
use crate::core::{to_csv, AppErrorResponse, AppSuccessResponse};
use crate::db::users;
use crate::models::users::{AccountStatus, AdminUpdateUserRequest, MessageResponse, UserProfile};
use actix_web::{delete, get, put, web, HttpResponse, Result};
use sqlx::MySqlPool;
use std::str::FromStr;

fn require_admin(claims: &JwtClaims) -> Option<HttpResponse> {
    if claims.role != "admin" {
        return Some(HttpResponse::Forbidden().json(AppErrorResponse {
            success: false,
            message: "Access denied. Admin role required.".to_string(),
        }));
    }
    None
}

#[tracing::instrument(name = "List Registered Users", skip(pool, claims))]
#[get("/users")]
pub async fn list_registered_users(
    pool: web::Data<MySqlPool>,
    claims: JwtClaims,
) -> Result<HttpResponse, AppError> {
    if let Some(forbidden) = require_admin(&claims) {
        return Ok(forbidden);
    }

    let profiles: Vec<UserProfile> = users::list_users(&pool)
        .await?
        .into_iter()
        .map(UserProfile::from)
        .collect();

    Ok(HttpResponse::Ok().json(AppSuccessResponse {
        success: true,
        data: profiles,
        message: "Users retrieved successfully".to_string(),
    }))
}

#[tracing::instrument(name = "Admin Update User", skip(pool, claims, request))]
#[put("/users/{user_id}")]
pub async fn update_user(
    pool: web::Data<MySqlPool>,
    claims: JwtClaims,
    path: web::Path<i32>,
    request: web::Json<AdminUpdateUserRequest>,
) -> Result<HttpResponse, AppError> {
    if let Some(forbidden) = require_admin(&claims) {
        return Ok(forbidden);
    }

    let user_id = path.into_inner();

    // Validate enumerated fields before touching the row
    if let Some(role) = &request.role {
        if !["admin", "user"].contains(&role.as_str()) {
            return Ok(HttpResponse::BadRequest().json(AppErrorResponse {
                success: false,
                message: "Invalid role. Must be 'admin' or 'user'.".to_string(),
            }));
        }
    }

    if let Some(status) = &request.account_status {
        if AccountStatus::from_str(status).is_err() {
            return Ok(HttpResponse::BadRequest().json(AppErrorResponse {
                success: false,
                message:
                    "Invalid account status. Must be 'active', 'pending_approval' or 'disabled'."
                        .to_string(),
            }));
        }
    }

    if let Some(plan_type) = &request.plan_type {
        if crate::models::plans::PlanTier::from_str(plan_type).is_err() {
            return Ok(HttpResponse::BadRequest().json(AppErrorResponse {
                success: false,
                message: "Invalid plan type. Must be 'basic' or 'pro'.".to_string(),
            }));
        }
    }

    if let Some(period) = &request.subscription_duration {
        if crate::models::plans::BillingPeriod::from_str(period).is_err() {
            return Ok(HttpResponse::BadRequest().json(AppErrorResponse {
                success: false,
                message: "Invalid subscription duration.".to_string(),
            }));
        }
    }

    let user = users::admin_update_user(&pool, user_id, &request).await?;

    Ok(HttpResponse::Ok().json(AppSuccessResponse {
        success: true,
        data: UserProfile::from(user),
        message: "User updated successfully".to_string(),
    }))
}

#[tracing::instrument(name = "Admin Delete User", skip(pool, claims))]
#[delete("/users/{user_id}")]
pub async fn delete_user(
    pool: web::Data<MySqlPool>,
    claims: JwtClaims,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    if let Some(forbidden) = require_admin(&claims) {
        return Ok(forbidden);
    }

    let user_id = path.into_inner();
    users::delete_user(&pool, user_id).await?;

    Ok(HttpResponse::Ok().json(AppSuccessResponse {
        success: true,
        data: MessageResponse {
            message: "User deleted successfully".to_string(),
        },
        message: "User deleted successfully".to_string(),
    }))
}

#[tracing::instrument(name = "Export Users CSV", skip(pool, claims))]
#[get("/users/export/csv")]
pub async fn export_users_csv(
    pool: web::Data<MySqlPool>,
    claims: JwtClaims,
) -> Result<HttpResponse, AppError> {
    if let Some(forbidden) = require_admin(&claims) {
        return Ok(forbidden);
    }

    let users = users::list_users(&pool).await?;

    let rows: Vec<Vec<String>> = users
        .into_iter()
        .map(|user| {
            vec![
                user.id.to_string(),
                user.name,
                user.email,
                user.role,
                user.domain.unwrap_or_default(),
                user.plan_type.unwrap_or_default(),
                user.account_status,
                user.created_at.to_string(),
            ]
        })
        .collect();

    let csv = to_csv(
        &[
            "id",
            "name",
            "email",
            "role",
            "domain",
            "plan_type",
            "account_status",
            "created_at",
        ],
        &rows,
    );

    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((
            "Content-Disposition",
            "attachment; filename=\"users.csv\"",
        ))
        .body(csv))
}
