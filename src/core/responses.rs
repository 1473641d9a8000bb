use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use anyhow::Error;
use serde::Serialize;
use std::fmt::{Display, Formatter};

#[derive(Debug, PartialEq)]
pub enum AppErrorType {
    NotFoundError,
    DbError,
    AuthError,
    PayloadValidationError,
    /// Upstream payment provider unreachable or rejecting the request.
    GatewayError,
    /// Callback signature did not match the recomputed HMAC.
    SignatureMismatch,
    /// Gateway payment id was already applied once.
    AlreadyProcessed,
    InternalServerError,
    ForbiddenError,
}

#[derive(Debug, PartialEq)]
pub struct AppError {
    pub error_type: AppErrorType,
    pub message: Option<String>,
    pub cause: Option<String>,
}

#[derive(Serialize)]
pub struct AppErrorResponse {
    pub success: bool,
    pub message: String,
}

impl AppError {
    pub fn message(&self) -> String {
        match &*self {
            AppError {
                message: Some(message),
                ..
            } => message.clone(),

            AppError {
                message: None,
                error_type: AppErrorType::NotFoundError,
                ..
            } => "The requested item was not found".to_string(),
            _ => "An unexpected error has occurred".to_string(),
        }
    }

    pub fn db_error(error: impl ToString) -> AppError {
        AppError {
            cause: Some(error.to_string()),
            error_type: AppErrorType::DbError,
            message: Some(error.to_string()),
        }
    }

    pub fn not_found(error: impl ToString) -> AppError {
        AppError {
            cause: Some(error.to_string()),
            error_type: AppErrorType::NotFoundError,
            message: Some(error.to_string()),
        }
    }

    pub fn forbidden_error(error: impl ToString) -> AppError {
        AppError {
            cause: Some(error.to_string()),
            error_type: AppErrorType::ForbiddenError,
            message: Some(error.to_string()),
        }
    }

    pub fn unauthorized(error: impl ToString) -> AppError {
        AppError {
            cause: Some(error.to_string()),
            error_type: AppErrorType::AuthError,
            message: Some(error.to_string()),
        }
    }

    pub fn bad_request(error: impl ToString) -> AppError {
        AppError {
            cause: Some(error.to_string()),
            error_type: AppErrorType::PayloadValidationError,
            message: Some(error.to_string()),
        }
    }

    /// Upstream detail goes in `cause` (logged); the response body only
    /// ever carries the sanitized `message`.
    pub fn gateway_error(message: impl ToString, cause: impl ToString) -> AppError {
        AppError {
            cause: Some(cause.to_string()),
            error_type: AppErrorType::GatewayError,
            message: Some(message.to_string()),
        }
    }

    pub fn signature_mismatch() -> AppError {
        AppError {
            cause: None,
            error_type: AppErrorType::SignatureMismatch,
            message: Some("Invalid signature".to_string()),
        }
    }

    pub fn already_processed(payment_id: &str) -> AppError {
        AppError {
            cause: Some(format!("payment {} already applied", payment_id)),
            error_type: AppErrorType::AlreadyProcessed,
            message: Some("This payment has already been processed".to_string()),
        }
    }

    pub fn internal_error(error: impl ToString) -> AppError {
        AppError {
            cause: Some(error.to_string()),
            error_type: AppErrorType::InternalServerError,
            message: Some(error.to_string()),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: Error) -> Self {
        AppError {
            message: None,
            cause: Some(error.to_string()),
            error_type: AppErrorType::DbError,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        AppError {
            cause: Some(error.to_string()),
            error_type: AppErrorType::DbError,
            message: Some(error.to_string()),
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self.error_type {
            AppErrorType::AuthError => StatusCode::UNAUTHORIZED,
            AppErrorType::DbError | AppErrorType::InternalServerError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppErrorType::NotFoundError => StatusCode::NOT_FOUND,
            AppErrorType::PayloadValidationError | AppErrorType::SignatureMismatch => {
                StatusCode::BAD_REQUEST
            }
            AppErrorType::GatewayError => StatusCode::BAD_GATEWAY,
            AppErrorType::AlreadyProcessed => StatusCode::CONFLICT,
            AppErrorType::ForbiddenError => StatusCode::FORBIDDEN,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(AppErrorResponse {
            success: false,
            message: self.message(),
        })
    }
}

#[derive(Serialize)]
pub struct AppSuccessResponse<T> {
    pub success: bool,
    pub data: T,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(
            AppError::bad_request("bad plan").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::gateway_error("gateway down", "connection refused").status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::signature_mismatch().status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::already_processed("pay_123").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::not_found("no such user").status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn gateway_cause_stays_out_of_the_message() {
        let error = AppError::gateway_error(
            "Payment gateway rejected the order request",
            "401 invalid api key rzp_live_secret",
        );
        assert_eq!(error.message(), "Payment gateway rejected the order request");
    }
}
