use actix_web::dev::Server;
use actix_web::middleware::{Logger, NormalizePath};
use actix_web::{web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{AccessGuard, RevocationStore, TokenService};
use crate::configuration::AuthSettings;
use crate::error::{AppError, ValidationError};
use crate::logger::LoggerMiddleware;
use crate::middleware::AuthMiddleware;
use crate::routes::{
    create_payment, create_periode, create_transaction, delete_payment, delete_periode,
    delete_transaction, delete_user, get_user, list_payments, list_periodes, list_transactions,
    list_users, live, login, logout, profile, refresh, register, root, update_payment,
    update_periode, update_transaction_status,
};
use crate::store::UserStore;

/// Malformed JSON bodies are validation failures (422), not actix's default 400.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::from(ValidationError::InvalidBody(err.to_string())).into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        AppError::from(ValidationError::InvalidBody(err.to_string())).into()
    })
}

pub fn run(
    listener: TcpListener,
    connection: PgPool,
    users: Arc<dyn UserStore>,
    revocations: Arc<dyn RevocationStore>,
    auth_config: AuthSettings,
) -> Result<Server, std::io::Error> {
    let tokens = Arc::new(TokenService::new(&auth_config, revocations));
    let guard = Arc::new(AccessGuard::new(tokens.clone(), users.clone()));

    let connection = web::Data::new(connection);
    let tokens = web::Data::from(tokens);
    let users: web::Data<dyn UserStore> = web::Data::from(users);
    let auth_config = web::Data::new(auth_config);

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(Logger::default())
            .wrap(LoggerMiddleware)
            .wrap(NormalizePath::trim())

            // Shared state
            .app_data(json_config())
            .app_data(query_config())
            .app_data(connection.clone())
            .app_data(tokens.clone())
            .app_data(users.clone())
            .app_data(auth_config.clone())

            // Public routes
            .route("/", web::get().to(root))
            .route("/api/health/live", web::get().to(live))
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(register))
                    .route("/login", web::post().to(login))
                    .route("/refresh", web::post().to(refresh))
                    .route("/logout", web::post().to(logout))
                    .service(
                        web::resource("/profile")
                            .wrap(AuthMiddleware::new(guard.clone()))
                            .route(web::get().to(profile)),
                    )
                    .service(
                        web::resource("/delete/{user_id}")
                            .wrap(AuthMiddleware::new(guard.clone()))
                            .route(web::delete().to(delete_user)),
                    ),
            )

            // Protected routes (access token required)
            .service(
                web::scope("/users")
                    .wrap(AuthMiddleware::new(guard.clone()))
                    .route("", web::get().to(list_users))
                    .route("/{user_id}", web::get().to(get_user)),
            )
            .service(
                web::scope("/payments")
                    .wrap(AuthMiddleware::new(guard.clone()))
                    .route("", web::get().to(list_payments))
                    .route("", web::post().to(create_payment))
                    .route("/{payment_id}", web::put().to(update_payment))
                    .route("/{payment_id}", web::delete().to(delete_payment)),
            )
            .service(
                web::scope("/periodes")
                    .wrap(AuthMiddleware::new(guard.clone()))
                    .route("", web::get().to(list_periodes))
                    .route("", web::post().to(create_periode))
                    .route("/{periode_id}", web::put().to(update_periode))
                    .route("/{periode_id}", web::delete().to(delete_periode)),
            )
            .service(
                web::scope("/transactions")
                    .wrap(AuthMiddleware::new(guard.clone()))
                    .route("", web::get().to(list_transactions))
                    .route("", web::post().to(create_transaction))
                    .route(
                        "/{transaction_id}/status",
                        web::put().to(update_transaction_status),
                    )
                    .route("/{transaction_id}", web::delete().to(delete_transaction)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
