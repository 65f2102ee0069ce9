/// Authentication Routes
///
/// Registration, login, access token refresh, logout, the caller's profile
/// and admin deletion of users.
///
/// Refresh and logout read the refresh token from the
/// `Authorization: Bearer` header; every other protected route expects an
/// access token there.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{bearer_token, hash_password, require_role, verify_password, TokenService};
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError, ErrorContext};
use crate::models::{NewUser, Role, User};
use crate::response::{ok_without_data, ApiResponse};
use crate::store::UserStore;
use crate::validators::{
    is_valid_email, is_valid_fullname, is_valid_phone_number, is_valid_username,
};

/// User registration request
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub fullname: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub phone_number: Option<String>,
    pub domisili: Option<String>,
    pub user_type: Option<Role>,
    pub image_profile_url: Option<String>,
}

/// User login request
///
/// `identifier` is matched against email, username and phone number.
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "email")]
    pub identifier: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub user: User,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

const TOKEN_TYPE: &str = "bearer";

/// Treat blank optional strings as absent.
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// POST /auth/register
///
/// # Errors
/// - 400: Email already registered / username already taken
/// - 422: Invalid body or field format
pub async fn register(
    form: web::Json<RegisterRequest>,
    users: web::Data<dyn UserStore>,
    auth_config: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_registration");

    let email = is_valid_email(&form.email)?;
    let username = is_valid_username(&form.username)?;
    let fullname = is_valid_fullname(&form.fullname)?;
    let phone_number = non_blank(&form.phone_number)
        .map(is_valid_phone_number)
        .transpose()?;

    if users.find_by_email(&email).await?.is_some() {
        return Err(AppError::bad_request("Email already registered"));
    }
    if users.find_by_username(&username).await?.is_some() {
        return Err(AppError::bad_request("Username already taken"));
    }

    let password_hash = hash_password(&form.password, auth_config.password_hash_cost)?;

    let user = users
        .insert(NewUser {
            fullname,
            username,
            email,
            phone_number,
            password_hash,
            user_type: form.user_type.unwrap_or_default(),
            domisili: non_blank(&form.domisili).map(str::to_string),
            image_profile_url: non_blank(&form.image_profile_url).map(str::to_string),
        })
        .await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = user.id,
        role = %user.user_type,
        "User registered successfully"
    );

    Ok(ApiResponse::ok("User registered successfully", user))
}

/// POST /auth/login
///
/// Unknown identifiers and wrong passwords get the same 401. The active flag
/// is only checked once the password matched.
pub async fn login(
    form: web::Json<LoginRequest>,
    users: web::Data<dyn UserStore>,
    tokens: web::Data<TokenService>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login");

    let user = users
        .find_by_identifier(form.identifier.trim())
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(&form.password, &user.password_hash) {
        return Err(AuthError::InvalidCredentials.into());
    }

    if !user.is_active {
        return Err(AuthError::AccountInactive.into());
    }

    let access_token = tokens.issue_access(&user.email, tokens.access_ttl())?;
    let refresh_token = tokens.issue_refresh(&user.email, tokens.refresh_ttl())?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = user.id,
        "User logged in successfully"
    );

    Ok(ApiResponse::ok(
        "Login successful",
        LoginResponse {
            access_token,
            refresh_token,
            token_type: TOKEN_TYPE,
            user,
        },
    ))
}

/// POST /auth/refresh
///
/// Issues a new access token for a valid, unrevoked refresh token. The
/// refresh token itself is not rotated.
pub async fn refresh(
    req: HttpRequest,
    tokens: web::Data<TokenService>,
) -> Result<HttpResponse, AppError> {
    let refresh_token = bearer_token(req.headers())?;
    let claims = tokens.verify_refresh(&refresh_token).await?;

    let access_token = tokens.issue_access(&claims.sub, tokens.access_ttl())?;

    tracing::info!(subject = %claims.sub, "Access token refreshed");

    Ok(ApiResponse::ok(
        "Token refreshed successfully",
        RefreshResponse {
            access_token,
            token_type: TOKEN_TYPE,
        },
    ))
}

/// POST /auth/logout
///
/// Revokes the presented refresh token. Any correctly signed refresh token
/// is accepted, including one that is already revoked or expired. Expired
/// tokens are not stored since they can no longer be used. Access tokens stay
/// valid until they expire.
pub async fn logout(
    req: HttpRequest,
    tokens: web::Data<TokenService>,
) -> Result<HttpResponse, AppError> {
    let refresh_token = bearer_token(req.headers())?;
    let claims = tokens.decode_refresh_allow_expired(&refresh_token)?;

    if !claims.is_expired() {
        tokens.revoke(&refresh_token).await?;
    }

    tracing::info!(subject = %claims.sub, "User logged out");

    Ok(ok_without_data("Logged out successfully"))
}

/// GET /auth/profile
pub async fn profile(current_user: web::ReqData<User>) -> HttpResponse {
    ApiResponse::ok("Profile fetched successfully", current_user.into_inner())
}

/// DELETE /auth/delete/{user_id}
///
/// # Errors
/// - 403: Caller is not an admin
/// - 404: No such user
/// - 400: Admin targets their own account
pub async fn delete_user(
    path: web::Path<i64>,
    current_user: web::ReqData<User>,
    users: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    let context = ErrorContext::new("user_deletion").with_user_id(current_user.id);

    require_role(&current_user, Role::Admin)
        .map_err(|_| AppError::forbidden("Only admin users can delete other users"))?;

    let target = users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    if target.id == current_user.id {
        return Err(AppError::bad_request(
            "Admin cannot delete their own account",
        ));
    }

    if !users.delete(target.id).await? {
        return Err(AppError::not_found("User not found"));
    }

    tracing::info!(
        request_id = %context.request_id,
        admin_id = current_user.id,
        deleted_user_id = target.id,
        "User deleted"
    );

    Ok(ok_without_data("User deleted successfully"))
}
