/// Middleware module
///
/// Bearer token authentication for protected scopes.

mod auth_middleware;

pub use auth_middleware::AuthMiddleware;
