/// Transaction Routes
///
/// Members report transactions and see only their own; admins see all,
/// change status and delete.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::require_role;
use crate::error::{AppError, ErrorContext, ValidationError};
use crate::models::{Role, TransactionStatus, User};
use crate::response::{ok_without_data, ApiResponse};
use crate::store::transactions::{self, NewTransaction, TransactionFilter};
use crate::store::{payments, periodes};

/// Largest amount a NUMERIC(12,2) column holds
const MAX_AMOUNT: f64 = 9_999_999_999.99;
const MAX_URL_LENGTH: usize = 500;

#[derive(Deserialize)]
pub struct CreateTransactionRequest {
    pub amount: f64,
    pub transaction_date: DateTime<Utc>,
    pub bukti_transfer_url: Option<String>,
    pub periode_id: i64,
    pub payment_id: i64,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: TransactionStatus,
}

#[derive(Deserialize)]
pub struct TransactionQuery {
    pub periode_id: Option<i64>,
    pub status: Option<TransactionStatus>,
    pub payment_id: Option<i64>,
}

/// Amounts are stored with two decimals, so they are rounded to whole cents
/// here and must still be positive afterwards.
fn validate_amount(amount: f64) -> Result<f64, ValidationError> {
    if !amount.is_finite() || amount > MAX_AMOUNT {
        return Err(ValidationError::InvalidFormat("amount".to_string()));
    }

    let cents = (amount * 100.0).round();
    if cents < 1.0 {
        return Err(ValidationError::InvalidFormat("amount".to_string()));
    }
    Ok(cents / 100.0)
}

fn validate_proof_url(url: &Option<String>) -> Result<Option<String>, ValidationError> {
    match url.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(url) if url.chars().count() > MAX_URL_LENGTH => Err(ValidationError::TooLong(
            "bukti_transfer_url".to_string(),
            MAX_URL_LENGTH,
        )),
        Some(url) => Ok(Some(url.to_string())),
    }
}

/// Members are always restricted to the transactions they reported.
fn filter_for(user: &User, query: &TransactionQuery) -> TransactionFilter {
    TransactionFilter {
        reported_by_id: (!user.has_role(Role::Admin)).then_some(user.id),
        periode_id: query.periode_id,
        status: query.status,
        payment_id: query.payment_id,
    }
}

/// POST /transactions
///
/// The caller becomes the reporter; the status starts as `sent`.
///
/// # Errors
/// - 404: Unknown periode or payment method
/// - 422: Non-positive amount or invalid body
pub async fn create_transaction(
    form: web::Json<CreateTransactionRequest>,
    current_user: web::ReqData<User>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let amount = validate_amount(form.amount)?;
    let bukti_transfer_url = validate_proof_url(&form.bukti_transfer_url)?;

    if !periodes::periode_exists(&pool, form.periode_id).await? {
        return Err(AppError::not_found("Periode not found"));
    }
    if !payments::payment_exists(&pool, form.payment_id).await? {
        return Err(AppError::not_found("Payment not found"));
    }

    let transaction = transactions::create_transaction(
        &pool,
        NewTransaction {
            amount,
            transaction_date: form.transaction_date,
            bukti_transfer_url,
            periode_id: form.periode_id,
            payment_id: form.payment_id,
            reported_by_id: current_user.id,
        },
    )
    .await?;

    Ok(ApiResponse::ok("Transaction submitted successfully", transaction))
}

/// PUT /transactions/{id}/status
pub async fn update_transaction_status(
    path: web::Path<i64>,
    form: web::Json<UpdateStatusRequest>,
    current_user: web::ReqData<User>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    require_role(&current_user, Role::Admin)
        .map_err(|_| AppError::forbidden("Only admin can update transaction status"))?;

    let transaction_id = path.into_inner();
    let context = ErrorContext::new("transaction_status_update").with_user_id(current_user.id);

    let transaction =
        match transactions::update_status(&pool, transaction_id, form.status, current_user.id)
            .await
        {
            Ok(Some(transaction)) => transaction,
            Ok(None) => return Err(AppError::not_found("Transaction not found")),
            Err(e) => {
                context.log_error(&e);
                return Err(e);
            }
        };

    tracing::info!(
        request_id = %context.request_id,
        transaction_id,
        status = %transaction.status,
        "Transaction status updated"
    );

    Ok(ApiResponse::ok(
        format!("Transaction status updated to {}", transaction.status),
        transaction,
    ))
}

/// GET /transactions?periode_id=&status=&payment_id=
///
/// Newest first. Admins see every transaction, members only their own.
pub async fn list_transactions(
    query: web::Query<TransactionQuery>,
    current_user: web::ReqData<User>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let filter = filter_for(&current_user, &query);
    let all = transactions::list_transactions(&pool, &filter).await?;

    Ok(ApiResponse::ok("Transactions fetched successfully", all))
}

/// DELETE /transactions/{id}
pub async fn delete_transaction(
    path: web::Path<i64>,
    current_user: web::ReqData<User>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    require_role(&current_user, Role::Admin)
        .map_err(|_| AppError::forbidden("Only admin can delete transactions"))?;

    let transaction_id = path.into_inner();
    if !transactions::delete_transaction(&pool, transaction_id).await? {
        return Err(AppError::not_found("Transaction not found"));
    }

    tracing::info!(transaction_id, admin_id = current_user.id, "Transaction deleted");

    Ok(ok_without_data("Transaction deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, role: Role) -> User {
        let now = Utc::now();
        User {
            id,
            fullname: "Test".to_string(),
            username: format!("user{}", id),
            email: format!("user{}@example.com", id),
            phone_number: None,
            password_hash: String::new(),
            user_type: role,
            is_active: true,
            domisili: None,
            image_profile_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn query() -> TransactionQuery {
        TransactionQuery {
            periode_id: Some(2),
            status: Some(TransactionStatus::Sent),
            payment_id: None,
        }
    }

    #[test]
    fn test_members_only_see_their_own() {
        let filter = filter_for(&user(5, Role::Member), &query());

        assert_eq!(filter.reported_by_id, Some(5));
        assert_eq!(filter.periode_id, Some(2));
        assert_eq!(filter.status, Some(TransactionStatus::Sent));
        assert_eq!(filter.payment_id, None);
    }

    #[test]
    fn test_admins_see_everyone() {
        let filter = filter_for(&user(1, Role::Admin), &query());

        assert_eq!(filter.reported_by_id, None);
        assert_eq!(filter.periode_id, Some(2));
    }

    #[test]
    fn test_amount_validation() {
        assert_eq!(validate_amount(150000.0), Ok(150000.0));
        assert!(validate_amount(0.0).is_err());
        assert!(validate_amount(-10.0).is_err());
        assert!(validate_amount(f64::NAN).is_err());
        assert!(validate_amount(1e13).is_err());
    }

    #[test]
    fn test_sub_cent_amounts() {
        assert!(validate_amount(0.004).is_err());
        assert!(validate_amount(0.0049).is_err());
        assert_eq!(validate_amount(0.006), Ok(0.01));
        assert_eq!(validate_amount(0.01), Ok(0.01));
        assert_eq!(validate_amount(12.3456), Ok(12.35));
    }

    #[test]
    fn test_proof_url_blank_is_absent() {
        assert_eq!(validate_proof_url(&None), Ok(None));
        assert_eq!(validate_proof_url(&Some("  ".to_string())), Ok(None));
        assert_eq!(
            validate_proof_url(&Some(" https://cdn.example.com/a.png ".to_string())),
            Ok(Some("https://cdn.example.com/a.png".to_string()))
        );
        assert!(validate_proof_url(&Some("x".repeat(501))).is_err());
    }
}
