use actix_web::{web, App, HttpServer};
use actix_web::dev::Server;
use sqlx::PgPool;
use std::net::TcpListener;

use crate::auth::SigningKeys;
use crate::configuration::JwtSettings;
use crate::logger::RequestLogger;
use crate::middleware::JwtAuthentication;
use crate::routes::{account, health_check, login, logout, refresh, register};

pub fn run(
    listener: TcpListener,
    connection: PgPool,
    jwt_config: JwtSettings,
    keys: SigningKeys,
) -> Result<Server, std::io::Error> {
    let connection = web::Data::new(connection);
    let jwt_config_data = web::Data::new(jwt_config);
    let keys_data = web::Data::new(keys.clone());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(JwtAuthentication::new(keys.clone()))
            .wrap(RequestLogger)

            // Shared state
            .app_data(connection.clone())
            .app_data(jwt_config_data.clone())
            .app_data(keys_data.clone())

            // Public liveness probe
            .route("/health_check", web::get().to(health_check))

            // Authentication endpoints. login/refresh/register are public;
            // logout and account require a validated access token.
            .service(
                web::scope("/api/v1/auth")
                    .route("/register", web::post().to(register))
                    .route("/login", web::post().to(login))
                    .route("/refresh", web::get().to(refresh))
                    .route("/logout", web::post().to(logout))
                    .route("/account", web::get().to(account)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
