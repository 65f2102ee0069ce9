/// Bearer Authentication Middleware
///
/// Resolves the `Authorization: Bearer` access token through the
/// `AccessGuard` and injects the authenticated `User` into request extensions
/// for handlers to read with `web::ReqData<User>`.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use std::sync::Arc;

use crate::auth::{bearer_token, AccessGuard};
use crate::error::AppError;

/// Must wrap every route that requires an authenticated user.
pub struct AuthMiddleware {
    guard: Arc<AccessGuard>,
}

impl AuthMiddleware {
    pub fn new(guard: Arc<AccessGuard>) -> Self {
        Self { guard }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            guard: self.guard.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    guard: Arc<AccessGuard>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = bearer_token(req.headers());
        let service = self.service.clone();
        let guard = self.guard.clone();

        Box::pin(async move {
            let token = token.map_err(|e| {
                tracing::warn!(path = %req.path(), "Missing or invalid Authorization header");
                Error::from(AppError::from(e))
            })?;

            let user = guard.authenticate(&token).await?;

            tracing::debug!(user_id = user.id, role = %user.user_type, "Access token accepted");
            req.extensions_mut().insert(user);

            service.call(req).await
        })
    }
}
