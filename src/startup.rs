use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;

use crate::auth::SessionService;
use crate::configuration::ApplicationSettings;
use crate::logger::LoggerMiddleware;
use crate::routes::{create_user, health_check, login, refresh, reset, revoke, update_user};

pub fn run(
    listener: TcpListener,
    sessions: SessionService,
    application: ApplicationSettings,
) -> Result<Server, std::io::Error> {
    let sessions = web::Data::new(sessions);
    let application = web::Data::new(application);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(LoggerMiddleware)

            // Shared state
            .app_data(sessions.clone())
            .app_data(application.clone())

            .route("/api/healthz", web::get().to(health_check))

            // Accounts
            .service(
                web::resource("/api/users")
                    .route(web::post().to(create_user))
                    .route(web::put().to(update_user)),
            )

            // Sessions
            .route("/api/login", web::post().to(login))
            .route("/api/refresh", web::post().to(refresh))
            .route("/api/revoke", web::post().to(revoke))

            .route("/admin/reset", web::post().to(reset))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
