/// Payment period queries
///
/// Date ordering (`start_date < end_date`) is checked by the route layer and
/// enforced again by a CHECK constraint on the table.

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::Periode;

pub async fn create_periode(
    pool: &PgPool,
    periode_name: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Periode, AppError> {
    let periode = sqlx::query_as::<_, Periode>(
        r#"
        INSERT INTO periodes (periode_name, start_date, end_date, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id, periode_name, start_date, end_date, created_at
        "#,
    )
    .bind(periode_name)
    .bind(start_date)
    .bind(end_date)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(periode)
}

pub async fn update_periode(
    pool: &PgPool,
    id: i64,
    periode_name: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Option<Periode>, AppError> {
    let periode = sqlx::query_as::<_, Periode>(
        r#"
        UPDATE periodes
        SET periode_name = $1, start_date = $2, end_date = $3
        WHERE id = $4
        RETURNING id, periode_name, start_date, end_date, created_at
        "#,
    )
    .bind(periode_name)
    .bind(start_date)
    .bind(end_date)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(periode)
}

pub async fn delete_periode(pool: &PgPool, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM periodes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn periode_exists(pool: &PgPool, id: i64) -> Result<bool, AppError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM periodes WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await?;

    Ok(exists)
}

pub async fn list_periodes(pool: &PgPool) -> Result<Vec<Periode>, AppError> {
    let periodes = sqlx::query_as::<_, Periode>(
        r#"
        SELECT id, periode_name, start_date, end_date, created_at
        FROM periodes
        ORDER BY start_date ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(periodes)
}
