/// Payment Period Routes

use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::require_role;
use crate::error::AppError;
use crate::models::{Role, User};
use crate::response::{ok_without_data, ApiResponse};
use crate::store::periodes;
use crate::validators::is_valid_label;

const MAX_PERIODE_NAME: usize = 50;

#[derive(Deserialize)]
pub struct PeriodeRequest {
    pub periode_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl PeriodeRequest {
    fn validated_name(&self) -> Result<String, AppError> {
        Ok(is_valid_label("periode_name", &self.periode_name, MAX_PERIODE_NAME)?)
    }

    fn check_range(&self) -> Result<(), AppError> {
        if self.start_date >= self.end_date {
            return Err(AppError::bad_request("start_date must be before end_date"));
        }
        Ok(())
    }
}

/// POST /periodes
///
/// # Errors
/// - 400: `start_date` is not before `end_date`
/// - 409: Name already used
pub async fn create_periode(
    form: web::Json<PeriodeRequest>,
    current_user: web::ReqData<User>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    require_role(&current_user, Role::Admin)
        .map_err(|_| AppError::forbidden("Only admin can create periode"))?;

    let name = form.validated_name()?;
    form.check_range()?;

    let periode = periodes::create_periode(&pool, &name, form.start_date, form.end_date)
        .await
        .map_err(|e| e.on_duplicate("Periode name already exists"))?;

    tracing::info!(periode_id = periode.id, admin_id = current_user.id, "Periode created");

    Ok(ApiResponse::ok("Periode created successfully", periode))
}

/// PUT /periodes/{id}
pub async fn update_periode(
    path: web::Path<i64>,
    form: web::Json<PeriodeRequest>,
    current_user: web::ReqData<User>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    require_role(&current_user, Role::Admin)
        .map_err(|_| AppError::forbidden("Only admin can update periode"))?;

    let periode_id = path.into_inner();
    let name = form.validated_name()?;

    if !periodes::periode_exists(&pool, periode_id).await? {
        return Err(AppError::not_found("Periode not found"));
    }
    form.check_range()?;

    let periode = periodes::update_periode(&pool, periode_id, &name, form.start_date, form.end_date)
        .await
        .map_err(|e| e.on_duplicate("Periode name already exists"))?
        .ok_or_else(|| AppError::not_found("Periode not found"))?;

    Ok(ApiResponse::ok("Periode updated successfully", periode))
}

/// DELETE /periodes/{id}
pub async fn delete_periode(
    path: web::Path<i64>,
    current_user: web::ReqData<User>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    require_role(&current_user, Role::Admin)
        .map_err(|_| AppError::forbidden("Only admin can delete periode"))?;

    let periode_id = path.into_inner();
    if !periodes::delete_periode(&pool, periode_id).await? {
        return Err(AppError::not_found("Periode not found"));
    }

    tracing::info!(periode_id, admin_id = current_user.id, "Periode deleted");

    Ok(ok_without_data("Periode deleted successfully"))
}

/// GET /periodes
pub async fn list_periodes(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let all = periodes::list_periodes(&pool).await?;

    Ok(ApiResponse::ok("Periodes fetched successfully", all))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(start: (i32, u32, u32), end: (i32, u32, u32)) -> PeriodeRequest {
        PeriodeRequest {
            periode_name: "2024-Q1".to_string(),
            start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
        }
    }

    #[test]
    fn test_range_must_be_increasing() {
        assert!(request((2024, 1, 1), (2024, 3, 31)).check_range().is_ok());
        assert!(matches!(
            request((2024, 3, 31), (2024, 1, 1)).check_range(),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            request((2024, 1, 1), (2024, 1, 1)).check_range(),
            Err(AppError::BadRequest(_))
        ));
    }
}
