use chrono::Utc;
use sqlx::{MySql, Transaction};

use crate::core::AppError;

/// Append a gateway payment id to the processed-payments ledger.
///
/// The UNIQUE key on `razorpay_payment_id` makes this the at-most-once
/// guard for the whole payment application: a replayed callback trips the
/// unique violation here, before any subscription fields are touched.
pub async fn record_processed_payment(
    db_transaction: &mut Transaction<'_, MySql>,
    payment_id: &str,
    order_id: &str,
    user_id: i32,
) -> Result<(), AppError> {
    let now = Utc::now().naive_utc();

    sqlx::query(
        r#"
        INSERT INTO tbl_processed_payments (razorpay_payment_id, razorpay_order_id, user_id, applied_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(payment_id)
    .bind(order_id)
    .bind(user_id)
    .bind(now)
    .execute(db_transaction.as_mut())
    .await
    .map_err(|e| {
        if e.as_database_error()
            .map(|db| db.is_unique_violation())
            .unwrap_or(false)
        {
            AppError::already_processed(payment_id)
        } else {
            AppError::db_error(e)
        }
    })?;

    Ok(())
}
