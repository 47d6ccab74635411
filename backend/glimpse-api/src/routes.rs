//! Route table for the HTTP surface. Everything except registration,
//! sign-in and the health probes sits behind the JWT middleware.

use actix_web::web;

use crate::handlers;
use crate::middleware::jwt_auth::JwtAuthMiddleware;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(handlers::auth::register))
                    .route("/login", web::post().to(handlers::auth::login))
                    .route("/federated", web::post().to(handlers::auth::federated))
                    .route(
                        "/password-reset",
                        web::post().to(handlers::auth::password_reset),
                    )
                    .service(
                        web::resource("/password")
                            .wrap(JwtAuthMiddleware)
                            .route(web::post().to(handlers::auth::change_password)),
                    ),
            )
            .service(
                web::scope("/feed")
                    .route("/public", web::get().to(handlers::feed::get_public_feed))
                    .service(
                        web::resource("")
                            .wrap(JwtAuthMiddleware)
                            .route(web::get().to(handlers::feed::get_feed)),
                    ),
            )
            .service(
                web::scope("/posts")
                    .wrap(JwtAuthMiddleware)
                    .route("", web::post().to(handlers::posts::create_post))
                    .route("/{id}", web::delete().to(handlers::posts::delete_post))
                    .route("/{id}/like", web::post().to(handlers::posts::like_post))
                    .route("/{id}/like", web::delete().to(handlers::posts::unlike_post))
                    .route(
                        "/{id}/comments",
                        web::get().to(handlers::posts::list_comments),
                    )
                    .route(
                        "/{id}/comments",
                        web::post().to(handlers::posts::create_comment),
                    ),
            )
            .service(
                // fixed segments before the `{username}` catch-all
                web::scope("/users")
                    .wrap(JwtAuthMiddleware)
                    .route("/me", web::get().to(handlers::users::get_me))
                    .route("/me", web::patch().to(handlers::users::update_me))
                    .route("/me/photo", web::put().to(handlers::users::set_photo))
                    .route("/suggestions", web::get().to(handlers::users::suggestions))
                    .route("/{username}", web::get().to(handlers::users::get_profile)),
            )
            .service(
                web::scope("/friends")
                    .wrap(JwtAuthMiddleware)
                    .route("/requests", web::get().to(handlers::friends::list_requests))
                    .route(
                        "/requests/{recipient}",
                        web::post().to(handlers::friends::send_request),
                    )
                    .route(
                        "/requests/{sender}/accept",
                        web::post().to(handlers::friends::accept_request),
                    )
                    .route(
                        "/requests/{sender}",
                        web::delete().to(handlers::friends::deny_request),
                    ),
            )
            .service(
                web::scope("/media")
                    .wrap(JwtAuthMiddleware)
                    .route("/upload", web::post().to(handlers::media::upload)),
            ),
    )
    .service(
        web::scope("/health")
            .route("", web::get().to(handlers::health::health))
            .route("/live", web::get().to(handlers::health::liveness))
            .route("/ready", web::get().to(handlers::health::readiness)),
    );
}
