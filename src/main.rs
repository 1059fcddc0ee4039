use std::io;

use actix_web::{middleware, web, App, HttpServer};

mod config;
mod db;
mod error;
mod handlers;
mod models;
mod query;
mod recipes;
mod schema;

use crate::config::Config;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(io::Error::other)?;

    // set up database connection pool
    let pool = db::build_pool(&config).map_err(io::Error::other)?;
    {
        let mut conn = pool.get().map_err(io::Error::other)?;
        db::initialize_schema(&mut conn).map_err(io::Error::other)?;
    }
    log::info!("database ready at {}", config.database_url);

    let circuit_breaker = web::Data::new(failsafe::Config::new().build());
    let pool = web::Data::new(pool);

    log::info!("starting HTTP server at http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .app_data(circuit_breaker.clone())
            .wrap(middleware::Logger::default())
            .configure(handlers::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
