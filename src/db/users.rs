use crate::core::AppError;
use crate::db::payments;
use crate::models::plans::{BillingPeriod, PlanTier};
use crate::models::users::{AccountStatus, AdminUpdateUserRequest, RegisterRequest, User};
use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{Months, NaiveDate, Utc};
use sqlx::MySqlPool;

const USER_COLUMNS: &str = "id, name, email, password, role, mobile, company_name, domain, \
     number_of_users, plan_type, subscription_duration, renewal_date, account_status, \
     created_at, updated_at";

pub async fn create_user(pool: &MySqlPool, request: &RegisterRequest) -> Result<User, AppError> {
    let now = Utc::now().naive_utc();

    // Hash the password
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(request.password.as_bytes(), &salt)
        .map_err(|_| AppError::internal_error("Failed to hash password"))?
        .to_string();

    let result = sqlx::query(
        r#"
        INSERT INTO tbl_users (name, email, password, role, mobile, company_name, account_status, created_at, updated_at)
        VALUES (?, ?, ?, 'user', ?, ?, 'active', ?, ?)
        "#,
    )
    .bind(&request.name)
    .bind(&request.email)
    .bind(&password_hash)
    .bind(&request.mobile)
    .bind(&request.company_name)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(AppError::db_error)?;

    let user_id = result.last_insert_id() as i32;

    get_user_by_id(pool, user_id).await
}

pub async fn get_user_by_email(pool: &MySqlPool, email: &str) -> Result<User, AppError> {
    let query = format!("SELECT {} FROM tbl_users WHERE email = ?", USER_COLUMNS);

    sqlx::query_as::<_, User>(&query)
        .bind(email)
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::not_found("User not found"),
            e => AppError::db_error(e),
        })
}

pub async fn get_user_by_id(pool: &MySqlPool, user_id: i32) -> Result<User, AppError> {
    let query = format!("SELECT {} FROM tbl_users WHERE id = ?", USER_COLUMNS);

    sqlx::query_as::<_, User>(&query)
        .bind(user_id)
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::not_found("User not found"),
            e => AppError::db_error(e),
        })
}

pub async fn list_users(pool: &MySqlPool) -> Result<Vec<User>, AppError> {
    let query = format!(
        "SELECT {} FROM tbl_users ORDER BY created_at DESC",
        USER_COLUMNS
    );

    sqlx::query_as::<_, User>(&query)
        .fetch_all(pool)
        .await
        .map_err(AppError::db_error)
}

pub async fn email_exists(pool: &MySqlPool, email: &str) -> Result<bool, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tbl_users WHERE email = ?")
        .bind(email)
        .fetch_one(pool)
        .await
        .map_err(AppError::db_error)?;

    Ok(count > 0)
}

pub async fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::internal_error("Invalid password"))?;

    let argon2 = Argon2::default();
    Ok(argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub async fn admin_update_user(
    pool: &MySqlPool,
    user_id: i32,
    request: &AdminUpdateUserRequest,
) -> Result<User, AppError> {
    let now = Utc::now().naive_utc();
    let current = get_user_by_id(pool, user_id).await?;

    let password_hash = match &request.password {
        Some(password) => {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(password.as_bytes(), &salt)
                .map_err(|_| AppError::internal_error("Failed to hash password"))?
                .to_string()
        }
        None => current.password.clone(),
    };

    // Merge semantics: omitted fields keep their stored value.
    let name = request.name.as_deref().unwrap_or(&current.name);
    let email = request.email.as_deref().unwrap_or(&current.email);
    let role = request.role.as_deref().unwrap_or(&current.role);
    let domain = request.domain.as_deref().or(current.domain.as_deref());
    let number_of_users = request.number_of_users.or(current.number_of_users);
    let plan_type = request.plan_type.as_deref().or(current.plan_type.as_deref());
    let subscription_duration = request
        .subscription_duration
        .as_deref()
        .or(current.subscription_duration.as_deref());
    let account_status = request
        .account_status
        .as_deref()
        .unwrap_or(&current.account_status);
    let renewal_date = request.renewal_date.or(current.renewal_date);

    sqlx::query(
        r#"
        UPDATE tbl_users
        SET name = ?, email = ?, password = ?, role = ?, domain = ?, number_of_users = ?,
            plan_type = ?, subscription_duration = ?, account_status = ?, renewal_date = ?,
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(&password_hash)
    .bind(role)
    .bind(domain)
    .bind(number_of_users)
    .bind(plan_type)
    .bind(subscription_duration)
    .bind(account_status)
    .bind(renewal_date)
    .bind(now)
    .bind(user_id)
    .execute(pool)
    .await
    .map_err(AppError::db_error)?;

    get_user_by_id(pool, user_id).await
}

pub async fn delete_user(pool: &MySqlPool, user_id: i32) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM tbl_users WHERE id = ?")
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(AppError::db_error)?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("User not found"));
    }

    Ok(())
}

/// The subscription fields written after a verified payment. Split out so
/// the date arithmetic and status rule are testable without a database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionUpdate {
    pub plan_type: PlanTier,
    pub period: BillingPeriod,
    pub renewal_date: NaiveDate,
    pub account_status: AccountStatus,
}

impl SubscriptionUpdate {
    /// Renewal lands one billing period after `today`, calendar-aware:
    /// month arithmetic clamps to the last day of a shorter month rather
    /// than counting fixed-length days. Payment success always yields
    /// `pending_approval`; activation is a manual admin step.
    pub fn for_payment(
        plan_type: PlanTier,
        period: BillingPeriod,
        today: NaiveDate,
    ) -> Result<Self, AppError> {
        let renewal_date = today
            .checked_add_months(Months::new(period.months()))
            .ok_or_else(|| AppError::internal_error("Renewal date out of range"))?;

        Ok(SubscriptionUpdate {
            plan_type,
            period,
            renewal_date,
            account_status: AccountStatus::PendingApproval,
        })
    }
}

/// Apply a verified payment to the user's subscription state.
///
/// Caller contract: the callback signature has already been verified. The
/// ledger insert and the subscription write commit together, so a replayed
/// payment id fails with `AlreadyProcessed` before any state changes.
pub async fn apply_verified_payment(
    pool: &MySqlPool,
    user_id: i32,
    payment_id: &str,
    order_id: &str,
    plan_type: PlanTier,
    period: BillingPeriod,
) -> Result<User, AppError> {
    let today = Utc::now().date_naive();
    let update = SubscriptionUpdate::for_payment(plan_type, period, today)?;
    let now = Utc::now().naive_utc();

    let mut db_transaction = pool.begin().await.map_err(AppError::db_error)?;

    payments::record_processed_payment(&mut db_transaction, payment_id, order_id, user_id).await?;

    let result = sqlx::query(
        r#"
        UPDATE tbl_users
        SET plan_type = ?, subscription_duration = ?, renewal_date = ?, account_status = ?,
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(update.plan_type.as_str())
    .bind(update.period.as_str())
    .bind(update.renewal_date)
    .bind(update.account_status.as_str())
    .bind(now)
    .bind(user_id)
    .execute(db_transaction.as_mut())
    .await
    .map_err(AppError::db_error)?;

    if result.rows_affected() == 0 {
        // Dropping the transaction rolls the ledger insert back.
        return Err(AppError::not_found("User not found"));
    }

    db_transaction.commit().await.map_err(AppError::db_error)?;

    get_user_by_id(pool, user_id).await
}
