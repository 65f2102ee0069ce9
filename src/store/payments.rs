/// Payment method queries

use chrono::Utc;
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::Payment;

pub async fn create_payment(
    pool: &PgPool,
    payment_name: &str,
    payment_type: &str,
) -> Result<Payment, AppError> {
    let payment = sqlx::query_as::<_, Payment>(
        r#"
        INSERT INTO payments (payment_name, payment_type, created_at)
        VALUES ($1, $2, $3)
        RETURNING id, payment_name, payment_type, created_at
        "#,
    )
    .bind(payment_name)
    .bind(payment_type)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(payment)
}

/// Overwrite name and type. `None` if no payment has this id.
pub async fn update_payment(
    pool: &PgPool,
    id: i64,
    payment_name: &str,
    payment_type: &str,
) -> Result<Option<Payment>, AppError> {
    let payment = sqlx::query_as::<_, Payment>(
        r#"
        UPDATE payments
        SET payment_name = $1, payment_type = $2
        WHERE id = $3
        RETURNING id, payment_name, payment_type, created_at
        "#,
    )
    .bind(payment_name)
    .bind(payment_type)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(payment)
}

pub async fn delete_payment(pool: &PgPool, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM payments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn payment_exists(pool: &PgPool, id: i64) -> Result<bool, AppError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM payments WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await?;

    Ok(exists)
}

/// All payment methods, by name
pub async fn list_payments(pool: &PgPool) -> Result<Vec<Payment>, AppError> {
    let payments = sqlx::query_as::<_, Payment>(
        r#"
        SELECT id, payment_name, payment_type, created_at
        FROM payments
        ORDER BY payment_name ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(payments)
}
