use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::prepare_decoy_digest;
use crate::configuration::Settings;
use crate::logger::LoggerMiddleware;
use crate::middleware::JwtMiddleware;
use crate::routes::{
    create_user, get_current_user, health_check, login, polka_webhook, refresh, reset, revoke,
    update_user,
};
use crate::store::CredentialStore;

pub fn run(
    listener: TcpListener,
    store: Arc<dyn CredentialStore>,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    if !prepare_decoy_digest() {
        tracing::warn!("Decoy password digest unavailable; unknown-email logins will answer faster");
    }

    let store = web::Data::from(store);
    let jwt_config = web::Data::new(settings.jwt);
    let application = web::Data::new(settings.application);

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(Logger::default())
            .wrap(LoggerMiddleware)

            // Shared state
            .app_data(store.clone())
            .app_data(jwt_config.clone())
            .app_data(application.clone())

            // Public routes
            .route("/api/healthz", web::get().to(health_check))
            .route("/api/users", web::post().to(create_user))
            .route("/api/login", web::post().to(login))
            .route("/api/refresh", web::post().to(refresh))
            .route("/api/revoke", web::post().to(revoke))

            // Routes that authenticate inline (access token or API key)
            .route("/api/users", web::put().to(update_user))
            .route("/api/polka/webhooks", web::post().to(polka_webhook))

            // Protected routes (require JWT authentication)
            .service(
                web::scope("/api/me")
                    .wrap(JwtMiddleware::new(&jwt_config.secret))
                    .route("", web::get().to(get_current_user)),
            )

            // Admin, gated to the dev platform
            .route("/admin/reset", web::post().to(reset))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
