/// Transaction queries
///
/// Every read joins the reporter, the confirming admin, the payment method
/// and the period so handlers can return the nested `TransactionOut` shape
/// in one round trip.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::{Payment, Periode, SimpleUser, TransactionOut, TransactionStatus};

const SELECT_TRANSACTION: &str = r#"
    SELECT
        t.id, t.amount::FLOAT8 AS amount, t.transaction_date, t.bukti_transfer_url,
        t.status, t.reported_date, t.created_at, t.updated_at,
        t.reported_by_id, r.fullname AS reporter_fullname, r.email AS reporter_email,
        r.user_type AS reporter_user_type,
        t.confirmed_by_id, c.fullname AS confirmer_fullname, c.email AS confirmer_email,
        c.user_type AS confirmer_user_type,
        t.payment_id, p.payment_name, p.payment_type, p.created_at AS payment_created_at,
        t.periode_id, pe.periode_name, pe.start_date AS periode_start_date,
        pe.end_date AS periode_end_date, pe.created_at AS periode_created_at
    FROM transactions t
    LEFT JOIN users r ON r.id = t.reported_by_id
    LEFT JOIN users c ON c.id = t.confirmed_by_id
    LEFT JOIN payments p ON p.id = t.payment_id
    LEFT JOIN periodes pe ON pe.id = t.periode_id
"#;

/// Filters for `list_transactions`. `None` fields are not applied.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub reported_by_id: Option<i64>,
    pub periode_id: Option<i64>,
    pub status: Option<TransactionStatus>,
    pub payment_id: Option<i64>,
}

pub struct NewTransaction {
    pub amount: f64,
    pub transaction_date: DateTime<Utc>,
    pub bukti_transfer_url: Option<String>,
    pub periode_id: i64,
    pub payment_id: i64,
    pub reported_by_id: i64,
}

#[derive(sqlx::FromRow)]
struct TransactionRow {
    id: i64,
    amount: f64,
    transaction_date: DateTime<Utc>,
    bukti_transfer_url: Option<String>,
    status: String,
    reported_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    reported_by_id: i64,
    reporter_fullname: Option<String>,
    reporter_email: Option<String>,
    reporter_user_type: Option<String>,
    confirmed_by_id: Option<i64>,
    confirmer_fullname: Option<String>,
    confirmer_email: Option<String>,
    confirmer_user_type: Option<String>,
    payment_id: i64,
    payment_name: Option<String>,
    payment_type: Option<String>,
    payment_created_at: Option<DateTime<Utc>>,
    periode_id: i64,
    periode_name: Option<String>,
    periode_start_date: Option<NaiveDate>,
    periode_end_date: Option<NaiveDate>,
    periode_created_at: Option<DateTime<Utc>>,
}

fn simple_user(
    id: i64,
    fullname: Option<String>,
    email: Option<String>,
    user_type: Option<String>,
) -> SimpleUser {
    SimpleUser {
        id,
        fullname,
        email,
        user_type: user_type.and_then(|t| t.parse().ok()),
    }
}

impl TryFrom<TransactionRow> for TransactionOut {
    type Error = AppError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<TransactionStatus>()
            .map_err(|e| AppError::Internal(format!("Invalid transaction row {}: {}", row.id, e)))?;

        let reported_by = Some(simple_user(
            row.reported_by_id,
            row.reporter_fullname,
            row.reporter_email,
            row.reporter_user_type,
        ));

        let confirmed_by = row.confirmed_by_id.map(|id| {
            simple_user(
                id,
                row.confirmer_fullname,
                row.confirmer_email,
                row.confirmer_user_type,
            )
        });

        let payment = match (row.payment_name, row.payment_type, row.payment_created_at) {
            (Some(payment_name), Some(payment_type), Some(created_at)) => Some(Payment {
                id: row.payment_id,
                payment_name,
                payment_type,
                created_at,
            }),
            _ => None,
        };

        let periode = match (
            row.periode_name,
            row.periode_start_date,
            row.periode_end_date,
            row.periode_created_at,
        ) {
            (Some(periode_name), Some(start_date), Some(end_date), Some(created_at)) => {
                Some(Periode {
                    id: row.periode_id,
                    periode_name,
                    start_date,
                    end_date,
                    created_at,
                })
            }
            _ => None,
        };

        Ok(TransactionOut {
            id: row.id,
            amount: row.amount,
            transaction_date: row.transaction_date,
            bukti_transfer_url: row.bukti_transfer_url,
            status,
            reported_date: row.reported_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
            reported_by,
            confirmed_by,
            payment,
            periode,
        })
    }
}

pub async fn get_transaction(pool: &PgPool, id: i64) -> Result<Option<TransactionOut>, AppError> {
    let query = format!("{} WHERE t.id = $1", SELECT_TRANSACTION);

    sqlx::query_as::<_, TransactionRow>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .map(TransactionOut::try_from)
        .transpose()
}

/// Record a member's report. New transactions always start as `sent`.
pub async fn create_transaction(
    pool: &PgPool,
    new: NewTransaction,
) -> Result<TransactionOut, AppError> {
    let now = Utc::now();

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO transactions (amount, reported_date, reported_by_id, transaction_date,
                                  status, bukti_transfer_url, periode_id, payment_id,
                                  created_at)
        VALUES ($1::FLOAT8, $2, $3, $4, $5, $6, $7, $8, $2)
        RETURNING id
        "#,
    )
    .bind(new.amount)
    .bind(now)
    .bind(new.reported_by_id)
    .bind(new.transaction_date)
    .bind(TransactionStatus::Sent.as_str())
    .bind(&new.bukti_transfer_url)
    .bind(new.periode_id)
    .bind(new.payment_id)
    .fetch_one(pool)
    .await?;

    tracing::info!(transaction_id = id, reported_by = new.reported_by_id, "Transaction recorded");

    get_transaction(pool, id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("Transaction {} vanished after insert", id)))
}

/// Set the status and record who confirmed it. `None` if the id is unknown.
pub async fn update_status(
    pool: &PgPool,
    id: i64,
    status: TransactionStatus,
    confirmed_by_id: i64,
) -> Result<Option<TransactionOut>, AppError> {
    let updated: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE transactions
        SET status = $1, confirmed_by_id = $2, updated_at = $3
        WHERE id = $4
        RETURNING id
        "#,
    )
    .bind(status.as_str())
    .bind(confirmed_by_id)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match updated {
        Some(id) => get_transaction(pool, id).await,
        None => Ok(None),
    }
}

pub async fn delete_transaction(pool: &PgPool, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM transactions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Transactions matching every set filter, newest first
pub async fn list_transactions(
    pool: &PgPool,
    filter: &TransactionFilter,
) -> Result<Vec<TransactionOut>, AppError> {
    let query = format!(
        r#"{}
        WHERE ($1::BIGINT IS NULL OR t.reported_by_id = $1)
          AND ($2::BIGINT IS NULL OR t.periode_id = $2)
          AND ($3::TEXT IS NULL OR t.status = $3)
          AND ($4::BIGINT IS NULL OR t.payment_id = $4)
        ORDER BY t.created_at DESC, t.id DESC
        "#,
        SELECT_TRANSACTION
    );

    sqlx::query_as::<_, TransactionRow>(&query)
        .bind(filter.reported_by_id)
        .bind(filter.periode_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.payment_id)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(TransactionOut::try_from)
        .collect()
}
