use chrono::Utc;
use sqlx::MySqlPool;
use std::time::Duration;
use tracing::{error, info};

/// Background job that disables accounts whose renewal date has passed
pub async fn start_renewal_expiry_checker(pool: MySqlPool) {
    info!("Starting renewal expiry checker background job");

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(3600)); // Run every hour

        loop {
            interval.tick().await;

            if let Err(e) = check_and_disable_lapsed_accounts(&pool).await {
                error!("Failed to check lapsed accounts: {}", e);
            }
        }
    });
}

/// Check and disable accounts past their renewal date
async fn check_and_disable_lapsed_accounts(pool: &MySqlPool) -> Result<(), sqlx::Error> {
    let now = Utc::now().naive_utc();
    let today = Utc::now().date_naive();

    // Only active accounts lapse automatically; pending_approval stays in
    // the admin's queue.
    let result = sqlx::query(
        r#"
        UPDATE tbl_users
        SET account_status = 'disabled', updated_at = ?
        WHERE account_status = 'active'
        AND renewal_date IS NOT NULL
        AND renewal_date < ?
        "#,
    )
    .bind(now)
    .bind(today)
    .execute(pool)
    .await?;

    let rows_affected = result.rows_affected();

    if rows_affected > 0 {
        info!("Disabled {} lapsed account(s)", rows_affected);
    }

    Ok(())
}

/// Manual trigger for the same sweep (can be called from an admin endpoint)
pub async fn disable_lapsed_accounts_now(pool: &MySqlPool) -> Result<u64, sqlx::Error> {
    let now = Utc::now().naive_utc();
    let today = Utc::now().date_naive();

    let result = sqlx::query(
        r#"
        UPDATE tbl_users
        SET account_status = 'disabled', updated_at = ?
        WHERE account_status = 'active'
        AND renewal_date IS NOT NULL
        AND renewal_date < ?
        "#,
    )
    .bind(now)
    .bind(today)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
