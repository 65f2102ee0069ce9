/// Access Control Guard
///
/// Resolves a bearer access token to the `User` it was issued for and checks
/// role and ownership rules. The guard only reads: it never refreshes or
/// revokes tokens.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use std::sync::Arc;

use crate::auth::tokens::TokenService;
use crate::error::{AppError, AuthError};
use crate::models::{Role, User};
use crate::store::UserStore;

pub struct AccessGuard {
    tokens: Arc<TokenService>,
    users: Arc<dyn UserStore>,
}

impl AccessGuard {
    pub fn new(tokens: Arc<TokenService>, users: Arc<dyn UserStore>) -> Self {
        Self { tokens, users }
    }

    /// Verify an access token and load its subject
    ///
    /// Tokens are not invalidated when their user is deleted, so a valid token
    /// for a missing user yields `NotFound`.
    pub async fn authenticate(&self, raw_token: &str) -> Result<User, AppError> {
        let claims = self.tokens.verify_access(raw_token)?;

        self.users
            .find_by_email(&claims.sub)
            .await?
            .ok_or_else(|| {
                tracing::warn!(subject = %claims.sub, "Token subject no longer exists");
                AppError::not_found("User not found")
            })
    }
}

pub fn require_role(user: &User, role: Role) -> Result<(), AppError> {
    if user.has_role(role) {
        Ok(())
    } else {
        Err(AppError::forbidden(format!(
            "Only {} can access this endpoint",
            role
        )))
    }
}

/// Allow the user acting on their own record, or anyone holding `role`.
pub fn require_self_or_role(user: &User, target_id: i64, role: Role) -> Result<(), AppError> {
    if user.id == target_id || user.has_role(role) {
        Ok(())
    } else {
        Err(AppError::forbidden(
            "You are not allowed to access this resource",
        ))
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let (scheme, token) = value.trim().split_once(' ').ok_or(AuthError::MissingToken)?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    Ok(token.to_string())
}
