use actix_web::{web, HttpResponse};

use crate::auth::{require_role, require_self_or_role};
use crate::error::AppError;
use crate::models::{Role, User};
use crate::response::ApiResponse;
use crate::store::UserStore;

/// GET /users
///
/// Admin only. Newest accounts first.
pub async fn list_users(
    current_user: web::ReqData<User>,
    users: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    require_role(&current_user, Role::Admin)?;

    let all = users.list().await?;

    Ok(ApiResponse::ok("Users fetched successfully", all))
}

/// GET /users/{id}
///
/// Members may read their own record; admins may read any.
pub async fn get_user(
    path: web::Path<i64>,
    current_user: web::ReqData<User>,
    users: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    require_self_or_role(&current_user, user_id, Role::Admin)?;

    let user = users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(ApiResponse::ok("User fetched successfully", user))
}
