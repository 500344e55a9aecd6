use std::io;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use mini_jira::{auth::AuthMiddleware, auth::TokenService, config::Config, db, routes};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    let pool = db::init(&config.database_url)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    let tokens = web::Data::new(TokenService::new(&config));

    log::info!("Starting Mini Jira API at {}", config.server_url());

    let bind_addr = (config.server_host.clone(), config.server_port);
    let config = web::Data::new(config);
    let pool = web::Data::new(pool);

    HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .app_data(tokens.clone())
            .app_data(config.clone())
            .wrap(AuthMiddleware)
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind(bind_addr)?
    .run()
    .await
}
