use actix_web::dev::Server;
use actix_web::{guard, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::TokenService;
use crate::configuration::JwtSettings;
use crate::logger::LoggerMiddleware;
use crate::middleware::{AdminMiddleware, JwtMiddleware};
use crate::routes::{
    create_user, delete_me, delete_user, get_me, get_user, health_check, list_users, login,
    logout, refresh, update_me, update_user,
};
use crate::user_store::UserStore;

pub fn run(
    listener: TcpListener,
    users: Arc<dyn UserStore>,
    jwt_config: JwtSettings,
) -> Result<Server, std::io::Error> {
    let tokens = TokenService::new(jwt_config, users.clone());
    let users_data: web::Data<dyn UserStore> = web::Data::from(users);
    let tokens_data = web::Data::new(tokens.clone());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(LoggerMiddleware)

            // Shared state
            .app_data(users_data.clone())
            .app_data(tokens_data.clone())

            // Public routes
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/auth")
                    .route("/login", web::post().to(login))
                    .route("/refresh", web::post().to(refresh))
                    .service(
                        web::resource("/logout")
                            .wrap(JwtMiddleware::new(tokens.clone()))
                            .route(web::post().to(logout)),
                    ),
            )
            .service(
                web::scope("/users")
                    // registration; the guard lets GET /users fall through
                    // to the admin scope below
                    .service(
                        web::resource("")
                            .guard(guard::Post())
                            .route(web::post().to(create_user)),
                    )
                    // any authenticated user, acting on themselves
                    .service(
                        web::scope("/me")
                            .wrap(JwtMiddleware::new(tokens.clone()))
                            .route("", web::get().to(get_me))
                            .route("", web::put().to(update_me))
                            .route("", web::delete().to(delete_me)),
                    )
                    // admin only; AdminMiddleware runs after JwtMiddleware
                    .service(
                        web::scope("")
                            .wrap(AdminMiddleware)
                            .wrap(JwtMiddleware::new(tokens.clone()))
                            .route("", web::get().to(list_users))
                            .route("/{user_id}", web::get().to(get_user))
                            .route("/{user_id}", web::put().to(update_user))
                            .route("/{user_id}", web::delete().to(delete_user)),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
