/// Payment Method Routes
///
/// Any authenticated user can list payment methods; only admins change them.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::require_role;
use crate::error::AppError;
use crate::models::{Role, User};
use crate::response::{ok_without_data, ApiResponse};
use crate::store::payments;
use crate::validators::is_valid_label;

const MAX_PAYMENT_NAME: usize = 100;
const MAX_PAYMENT_TYPE: usize = 50;

#[derive(Deserialize)]
pub struct PaymentRequest {
    pub payment_name: String,
    pub payment_type: String,
}

impl PaymentRequest {
    fn validated(&self) -> Result<(String, String), AppError> {
        let name = is_valid_label("payment_name", &self.payment_name, MAX_PAYMENT_NAME)?;
        let kind = is_valid_label("payment_type", &self.payment_type, MAX_PAYMENT_TYPE)?;
        Ok((name, kind))
    }
}

/// POST /payments
pub async fn create_payment(
    form: web::Json<PaymentRequest>,
    current_user: web::ReqData<User>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    require_role(&current_user, Role::Admin)
        .map_err(|_| AppError::forbidden("Only admin can create payments"))?;

    let (name, kind) = form.validated()?;

    let payment = payments::create_payment(&pool, &name, &kind)
        .await
        .map_err(|e| e.on_duplicate("Payment name already exists"))?;

    tracing::info!(payment_id = payment.id, admin_id = current_user.id, "Payment method created");

    Ok(ApiResponse::ok("Payment method created successfully", payment))
}

/// PUT /payments/{id}
pub async fn update_payment(
    path: web::Path<i64>,
    form: web::Json<PaymentRequest>,
    current_user: web::ReqData<User>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    require_role(&current_user, Role::Admin)
        .map_err(|_| AppError::forbidden("Only admin can update payments"))?;

    let (name, kind) = form.validated()?;

    let payment = payments::update_payment(&pool, path.into_inner(), &name, &kind)
        .await
        .map_err(|e| e.on_duplicate("Payment name already exists"))?
        .ok_or_else(|| AppError::not_found("Payment not found"))?;

    Ok(ApiResponse::ok("Payment updated successfully", payment))
}

/// DELETE /payments/{id}
///
/// Fails with 409 while transactions still reference the payment method.
pub async fn delete_payment(
    path: web::Path<i64>,
    current_user: web::ReqData<User>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    require_role(&current_user, Role::Admin)
        .map_err(|_| AppError::forbidden("Only admin can delete payments"))?;

    let payment_id = path.into_inner();
    if !payments::delete_payment(&pool, payment_id).await? {
        return Err(AppError::not_found("Payment not found"));
    }

    tracing::info!(payment_id, admin_id = current_user.id, "Payment method deleted");

    Ok(ok_without_data("Payment deleted successfully"))
}

/// GET /payments
pub async fn list_payments(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let all = payments::list_payments(&pool).await?;

    Ok(ApiResponse::ok("Payments fetched successfully", all))
}
